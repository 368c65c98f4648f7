//! Imagine library exports for testing

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

pub mod core;
pub mod generation;
pub mod tui;

#[cfg(test)]
pub mod test_support;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// HTTP endpoint answering `{success, imageUrl, error}`
    #[default]
    Endpoint,
    /// OpenAI Images API
    #[value(name = "openai")]
    OpenAi,
}
