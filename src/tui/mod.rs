//! # TUI Adapter
//!
//! The ratatui-specific layer. Handles terminal I/O, renders the UI,
//! and translates keyboard events into controller calls.
//!
//! This is the only module that knows about ratatui and crossterm.
//!
//! ## Redraw Strategy
//!
//! The event loop uses conditional redraw to avoid unnecessary work:
//!
//! - **Pending**: draws every ~80ms so the spinner animates.
//! - **Otherwise**: sleeps up to 500ms, only redraws on events, terminal
//!   resize, or a completion arriving from the pipeline.
//!
//! A `SteadyBlock` cursor style is used instead of a blinking cursor because
//! ratatui's `set_cursor_position` resets the terminal's blink timer on every
//! `draw()` call, making blinking cursors appear erratic during continuous redraws.

mod component;
mod components;
mod event;
mod ui;

use log::{debug, info, warn};
use std::io::stdout;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossterm::cursor::{Hide, SetCursorStyle, Show};
use crossterm::event::{DisableBracketedPaste, EnableBracketedPaste};
use crossterm::execute;

use crate::core::action::{Action, Effect};
use crate::core::config::ResolvedConfig;
use crate::core::controller::Controller;
use crate::core::pipeline::Pipeline;
use crate::core::state::GenerationState;
use crate::generation::{HttpPreloader, ImageGenerator};
use crate::tui::component::EventHandler;
use crate::tui::components::{InputBox, InputEvent};
use crate::tui::event::{TuiEvent, poll_event_immediate, poll_event_timeout};

/// TUI-specific presentation state (not part of core business logic)
pub struct TuiState {
    pub input_box: InputBox,
}

impl Default for TuiState {
    fn default() -> Self {
        Self::new()
    }
}

impl TuiState {
    pub fn new() -> Self {
        Self {
            input_box: InputBox::new(),
        }
    }

    /// Pulls props from core state: lock the input while pending and pick
    /// up prompt changes made by the core (cleared after a success).
    pub fn sync(&mut self, state: &GenerationState) {
        self.input_box.disabled = state.is_pending();
        if self.input_box.buffer != state.prompt_text {
            self.input_box.set_text(state.prompt_text.clone());
        }
    }
}

struct TerminalModeGuard;

impl TerminalModeGuard {
    fn new() -> std::io::Result<Self> {
        execute!(
            stdout(),
            EnableBracketedPaste,
            Show,                        // Show cursor for input editing
            SetCursorStyle::SteadyBlock, // Non-blinking: avoids blink timer reset from continuous redraws
        )?;
        info!("Terminal modes enabled (bracketed paste, steady block cursor)");
        Ok(Self)
    }
}

impl Drop for TerminalModeGuard {
    fn drop(&mut self) {
        let _ = execute!(
            stdout(),
            DisableBracketedPaste,
            SetCursorStyle::DefaultUserShape,
            Hide
        );
    }
}

/// Runs the interactive view until the user quits.
///
/// Must be called from within a tokio runtime. In-flight work is cancelled
/// before the terminal is restored.
pub fn run(config: &ResolvedConfig, generator: Arc<dyn ImageGenerator>) -> std::io::Result<()> {
    let pipeline = Pipeline::new(generator, Arc::new(HttpPreloader::new(config.max_image_bytes)))
        .with_timeout(config.request_timeout);
    let mut controller = Controller::new(Arc::new(pipeline));
    let mut tui = TuiState::new();

    let mut terminal = ratatui::init();
    let terminal_mode_guard = TerminalModeGuard::new();
    if let Err(e) = &terminal_mode_guard {
        warn!("Failed to enable terminal modes: {}", e);
    }

    let result = event_loop(&mut terminal, &mut controller, &mut tui);

    controller.shutdown();
    drop(terminal_mode_guard);
    ratatui::restore();
    result
}

fn event_loop(
    terminal: &mut ratatui::DefaultTerminal,
    controller: &mut Controller,
    tui: &mut TuiState,
) -> std::io::Result<()> {
    let start_time = Instant::now();
    let mut needs_redraw = true; // Force first frame

    loop {
        tui.sync(controller.state());

        let animating = controller.state().is_pending();
        if animating {
            needs_redraw = true;
        }

        if needs_redraw {
            let spinner_frame = (start_time.elapsed().as_secs_f32() * 12.0) as usize;
            terminal.draw(|f| ui::draw_ui(f, controller.state(), tui, spinner_frame))?;
            needs_redraw = false;
        }

        // Short poll while the spinner runs (~12fps), long when idle
        let timeout = if animating {
            Duration::from_millis(80)
        } else {
            Duration::from_millis(500)
        };
        let first_event = poll_event_timeout(timeout)?;
        if first_event.is_some() {
            needs_redraw = true;
        }

        // Process first event + drain everything else pending before next draw
        let mut pending_events = Vec::new();
        pending_events.extend(first_event);
        while let Some(event) = poll_event_immediate()? {
            pending_events.push(event);
        }

        for event in pending_events {
            match event {
                TuiEvent::Quit => {
                    if controller.dispatch(Action::Quit) == Effect::Quit {
                        info!("Quit requested");
                        return Ok(());
                    }
                }
                // Resize just needs a redraw (already flagged above)
                TuiEvent::Resize => {}
                _ => handle_input_event(controller, tui, &event),
            }
        }

        // Fold in completions from background tasks
        if controller.process_completions() > 0 {
            needs_redraw = true;
        }
    }
}

fn handle_input_event(controller: &mut Controller, tui: &mut TuiState, event: &TuiEvent) {
    let Some(input_event) = tui.input_box.handle_event(event) else {
        return;
    };
    match input_event {
        InputEvent::ContentChanged => {
            controller.edit_prompt(tui.input_box.buffer.clone());
        }
        InputEvent::Submit => match controller.submit() {
            Ok(request_id) => debug!("Submitted request {}", request_id),
            Err(reason) => debug!("Submit ignored: {}", reason),
        },
    }
    // Keep the input locked from the very next event on
    tui.sync(controller.state());
}
