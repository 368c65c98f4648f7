//! # TUI Components
//!
//! This module contains all UI components for the terminal interface.
//!
//! ## Component Architecture
//!
//! ### Stateless Components (Props-Based Rendering)
//!
//! Display components that receive all data as props:
//! - `TitleBar`: app name, generator, status message
//! - `ErrorBanner`: failure message in the main area
//! - `Spinner`: loading indicator while a request is pending
//! - `ImagePanel`: half-block preview plus image metadata
//! - `SubmitButton`: enabled/disabled "Generate" control
//!
//! ### Stateful Components (Event-Driven)
//!
//! - `InputBox`: single-line prompt field with horizontal scroll
//!
//! Components receive external data as props, never by reaching into
//! `GenerationState` themselves. `ui.rs` decides which ones to show.
//!
//! ## Module Structure
//!
//! ```text
//! components/
//! ├── mod.rs            (this file)
//! ├── title_bar.rs
//! ├── error_banner.rs
//! ├── spinner.rs
//! ├── image_panel.rs
//! ├── submit_button.rs
//! └── input_box/
//! ```

mod error_banner;
mod image_panel;
pub mod input_box;
mod spinner;
mod submit_button;
mod title_bar;

pub use error_banner::ErrorBanner;
pub use image_panel::ImagePanel;
pub use input_box::{InputBox, InputEvent};
pub use spinner::Spinner;
pub use submit_button::{BUTTON_WIDTH, SubmitButton};
pub use title_bar::TitleBar;
