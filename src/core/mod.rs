//! # Core Application Logic
//!
//! This module contains Imagine's business logic.
//! It knows nothing about any specific UI technology.
//!
//! ```text
//!                    ┌──────────────────────────┐
//!                    │          CORE            │
//!                    │   (this module)          │
//!                    │                          │
//!                    │  • State (one request)   │
//!                    │  • Action / update()     │
//!                    │  • Pipeline (async I/O)  │
//!                    │  • Controller (glue)     │
//!                    └────────────┬─────────────┘
//!                                 │
//!                  ┌──────────────┴──────────────┐
//!                  ▼                             ▼
//!           ┌────────────┐                ┌────────────┐
//!           │    TUI     │                │  One-shot  │
//!           │  Adapter   │                │    CLI     │
//!           │ (ratatui)  │                │  (--prompt)│
//!           └────────────┘                └────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`state`]: `GenerationState`, the single request/render entity
//! - [`action`]: `Action`, `Effect` and the `update()` reducer
//! - [`pipeline`]: fetch → verify-loadable, run as a cancellable task
//! - [`controller`]: owns the state and performs effects
//! - [`headless`]: one-shot run for `--prompt`
//! - [`config`]: file/env/CLI settings

pub mod action;
pub mod config;
pub mod controller;
pub mod headless;
pub mod pipeline;
pub mod state;
