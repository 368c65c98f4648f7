//! # SubmitButton Component
//!
//! The "Generate" control next to the prompt. Enter is the actual trigger;
//! the button shows whether a submit would be accepted right now.

use crate::tui::component::Component;
use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, BorderType, Paragraph};

/// Columns reserved for the button in the footer row.
pub const BUTTON_WIDTH: u16 = 17;

pub struct SubmitButton {
    pub enabled: bool,
    pub pending: bool,
}

impl SubmitButton {
    pub fn new(enabled: bool, pending: bool) -> Self {
        Self { enabled, pending }
    }

    pub fn label(&self) -> &'static str {
        if self.pending { "Generating..." } else { "Generate" }
    }
}

impl Component for SubmitButton {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let style = if self.enabled {
            Style::default().fg(Color::Black).bg(Color::Magenta).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::DIM)
        };
        let border_style = if self.enabled {
            Style::default().fg(Color::Magenta)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        let button = Paragraph::new(self.label())
            .alignment(Alignment::Center)
            .style(style)
            .block(
                Block::bordered()
                    .border_type(BorderType::Rounded)
                    .border_style(border_style),
            );
        frame.render_widget(button, area);
    }
}
