//! # InputBox Component
//!
//! Single-line prompt field.
//!
//! ## Responsibilities
//!
//! - Capture text input (typing, paste, backspace/delete, cursor movement)
//! - Emit `Submit` on Enter when the prompt is non-blank
//! - Scroll horizontally so the cursor stays visible
//! - Show a placeholder when empty and lock itself while `disabled`
//!
//! ## State Management
//!
//! The buffer mirrors `GenerationState::prompt_text`. Edits emit
//! `ContentChanged` so the parent can forward the new text to the core;
//! when the core clears the prompt (on success) the parent calls
//! `set_text`. Submitting never clears the buffer itself.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, BorderType, Paragraph};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::tui::component::{Component, EventHandler};
use crate::tui::event::TuiEvent;

pub const PLACEHOLDER: &str = "Describe the image you want to generate...";

/// Border width on each side of the bordered block
const BORDER_OFFSET: u16 = 1;

/// High-level events emitted by the InputBox
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// User pressed Enter on a non-blank prompt
    Submit,
    /// Text content changed
    ContentChanged,
}

/// Text input component.
///
/// # Props
///
/// - `disabled`: true while a request is pending
///
/// # State
///
/// - `buffer`: current text
/// - `cursor`: byte offset into `buffer`
/// - `scroll`: display columns hidden to the left
pub struct InputBox {
    pub buffer: String,
    pub disabled: bool,
    cursor: usize,
    scroll: usize,
}

impl Default for InputBox {
    fn default() -> Self {
        Self::new()
    }
}

impl InputBox {
    pub fn new() -> Self {
        Self {
            buffer: String::new(),
            disabled: false,
            cursor: 0,
            scroll: 0,
        }
    }

    /// Replace the buffer from outside, cursor at the end.
    pub fn set_text(&mut self, text: String) {
        self.buffer = text;
        self.cursor = self.buffer.len();
        self.scroll = 0;
    }

    fn cursor_column(&self) -> usize {
        self.buffer[..self.cursor].width()
    }

    /// Keep the cursor column inside `[scroll, scroll + inner_width)`.
    fn update_scroll(&mut self, inner_width: usize) {
        let column = self.cursor_column();
        if column < self.scroll {
            self.scroll = column;
        } else if inner_width > 0 && column >= self.scroll + inner_width {
            self.scroll = column + 1 - inner_width;
        }
    }

    fn visible_text(&self, inner_width: usize) -> String {
        let mut column = 0;
        let mut visible = String::new();
        for ch in self.buffer.chars() {
            let width = ch.width().unwrap_or(0);
            if column < self.scroll {
                column += width;
                continue;
            }
            if column + width > self.scroll + inner_width {
                break;
            }
            visible.push(ch);
            column += width;
        }
        visible
    }
}

impl Component for InputBox {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let inner_width = area.width.saturating_sub(2 * BORDER_OFFSET) as usize;
        self.update_scroll(inner_width);

        let (title, border_style) = if self.disabled {
            ("Prompt (locked while generating)", Style::default().fg(Color::DarkGray))
        } else {
            ("Prompt", Style::default().fg(Color::Green))
        };
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(border_style)
            .title(title);

        let paragraph = if self.buffer.is_empty() {
            Paragraph::new(PLACEHOLDER).style(
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::ITALIC),
            )
        } else {
            let style = if self.disabled {
                Style::default().fg(Color::DarkGray)
            } else {
                Style::default()
            };
            Paragraph::new(self.visible_text(inner_width)).style(style)
        };
        frame.render_widget(paragraph.block(block), area);

        if !self.disabled {
            let column = (self.cursor_column() - self.scroll) as u16;
            frame.set_cursor_position((
                area.x + BORDER_OFFSET + column,
                area.y + BORDER_OFFSET,
            ));
        }
    }
}

impl EventHandler for InputBox {
    type Event = InputEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        if self.disabled {
            return None;
        }
        match event {
            TuiEvent::InputChar(c) => {
                self.buffer.insert(self.cursor, *c);
                self.cursor += c.len_utf8();
                Some(InputEvent::ContentChanged)
            }
            TuiEvent::Paste(text) => {
                self.buffer.insert_str(self.cursor, text);
                self.cursor += text.len();
                Some(InputEvent::ContentChanged)
            }
            TuiEvent::Backspace => (self.cursor > 0).then(|| {
                let prev = prev_char_boundary(&self.buffer, self.cursor);
                self.buffer.drain(prev..self.cursor);
                self.cursor = prev;
                InputEvent::ContentChanged
            }),
            TuiEvent::Delete => (self.cursor < self.buffer.len()).then(|| {
                let next = next_char_boundary(&self.buffer, self.cursor);
                self.buffer.drain(self.cursor..next);
                InputEvent::ContentChanged
            }),
            TuiEvent::ClearLine => (!self.buffer.is_empty()).then(|| {
                self.buffer.clear();
                self.cursor = 0;
                self.scroll = 0;
                InputEvent::ContentChanged
            }),
            // Pure cursor moves change nothing the core cares about
            TuiEvent::CursorLeft => {
                self.cursor = prev_char_boundary(&self.buffer, self.cursor);
                None
            }
            TuiEvent::CursorRight => {
                self.cursor = next_char_boundary(&self.buffer, self.cursor);
                None
            }
            TuiEvent::CursorHome => {
                self.cursor = 0;
                None
            }
            TuiEvent::CursorEnd => {
                self.cursor = self.buffer.len();
                None
            }
            TuiEvent::Submit => (!self.buffer.trim().is_empty()).then_some(InputEvent::Submit),
            _ => None,
        }
    }
}

/// Byte offset of the character boundary before `pos`.
fn prev_char_boundary(text: &str, pos: usize) -> usize {
    text[..pos]
        .char_indices()
        .next_back()
        .map(|(i, _)| i)
        .unwrap_or(0)
}

/// Byte offset of the character boundary after `pos`.
fn next_char_boundary(text: &str, pos: usize) -> usize {
    text[pos..]
        .char_indices()
        .nth(1)
        .map(|(i, _)| pos + i)
        .unwrap_or(text.len())
}
