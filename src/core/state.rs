//! # Generation State
//!
//! The single in-memory entity behind the view. No TUI types here;
//! presentation state lives in the `tui` module.
//!
//! ```text
//! GenerationState
//! ├── prompt_text: String                // editable input, cleared on success
//! ├── in_flight: Option<RequestId>       // Some(_) exactly while pending
//! ├── result: Option<PreloadedImage>     // set on success
//! ├── error_message: Option<String>      // set on failure
//! ├── status_message: String             // title bar text
//! └── generator_name: String             // which capability is wired in
//! ```
//!
//! State changes only happen through `update(state, action)` in action.rs.
//! At most one of `result` / `error_message` is ever set, and both are
//! cleared when a submission starts.

use std::fmt;

use uuid::Uuid;

use crate::generation::PreloadedImage;

/// Identifies one submission. Completions carrying any other id are stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestId(Uuid);

impl RequestId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What the main area shows. Exactly one at a time.
#[derive(Debug, PartialEq)]
pub enum Surface<'a> {
    Error(&'a str),
    Image(&'a PreloadedImage),
    Loading,
    Idle,
}

#[derive(Debug)]
pub struct GenerationState {
    pub prompt_text: String,
    pub(crate) in_flight: Option<RequestId>,
    pub(crate) result: Option<PreloadedImage>,
    pub(crate) error_message: Option<String>,
    pub status_message: String,
    pub generator_name: String,
}

impl GenerationState {
    pub fn new(generator_name: impl Into<String>) -> Self {
        Self {
            prompt_text: String::new(),
            in_flight: None,
            result: None,
            error_message: None,
            status_message: String::from("Describe an image and press Enter"),
            generator_name: generator_name.into(),
        }
    }

    pub fn is_pending(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn in_flight(&self) -> Option<RequestId> {
        self.in_flight
    }

    pub fn result(&self) -> Option<&PreloadedImage> {
        self.result.as_ref()
    }

    pub fn result_image_url(&self) -> Option<&str> {
        self.result.as_ref().map(|image| image.url.as_str())
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    /// Whether the submit control is enabled.
    pub fn can_submit(&self) -> bool {
        !self.is_pending() && !self.prompt_text.trim().is_empty()
    }

    pub fn surface(&self) -> Surface<'_> {
        if let Some(message) = &self.error_message {
            Surface::Error(message)
        } else if let Some(image) = &self.result {
            Surface::Image(image)
        } else if self.is_pending() {
            Surface::Loading
        } else {
            Surface::Idle
        }
    }
}
