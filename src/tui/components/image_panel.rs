//! # ImagePanel Component
//!
//! Renders the generated image in the main area.
//!
//! Terminals can't show pixels, so the preview is drawn with upper
//! half-block characters: each cell carries two vertically stacked pixels,
//! the top one as foreground and the bottom one as background. Below the
//! preview go the image dimensions and its URL.

use image::RgbImage;
use image::imageops::{self, FilterType};
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, BorderType, Paragraph};

use crate::generation::PreloadedImage;
use crate::tui::component::Component;

const HALF_BLOCK: &str = "▀";

pub struct ImagePanel<'a> {
    pub image: &'a PreloadedImage,
}

impl<'a> ImagePanel<'a> {
    pub fn new(image: &'a PreloadedImage) -> Self {
        Self { image }
    }
}

impl Component for ImagePanel<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::Magenta))
            .title("Generated artwork");
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let [preview_area, meta_area] =
            Layout::vertical([Constraint::Min(0), Constraint::Length(2)]).areas(inner);

        draw_preview(frame, preview_area, &self.image.preview);

        let meta = Paragraph::new(vec![
            Line::from(self.image.summary()),
            Line::styled(self.image.url.as_str(), Style::default().fg(Color::Cyan)),
        ])
        .alignment(Alignment::Center);
        frame.render_widget(meta, meta_area);
    }
}

/// Largest size that fits `(width, height)` into `(max_width, max_height)`
/// while keeping the aspect ratio. Never returns a zero dimension.
pub fn fit(width: u32, height: u32, max_width: u32, max_height: u32) -> (u32, u32) {
    if width == 0 || height == 0 || max_width == 0 || max_height == 0 {
        return (0, 0);
    }
    let scale = f64::min(
        max_width as f64 / width as f64,
        max_height as f64 / height as f64,
    );
    let fitted_width = ((width as f64 * scale).floor() as u32).clamp(1, max_width);
    let fitted_height = ((height as f64 * scale).floor() as u32).clamp(1, max_height);
    (fitted_width, fitted_height)
}

fn draw_preview(frame: &mut Frame, area: Rect, preview: &RgbImage) {
    let (width, height) = fit(
        preview.width(),
        preview.height(),
        area.width as u32,
        area.height as u32 * 2,
    );
    if width == 0 || height == 0 {
        return;
    }
    let scaled = imageops::resize(preview, width, height, FilterType::Triangle);

    let cell_rows = height.div_ceil(2);
    let left = area.x + (area.width - width as u16) / 2;
    let top = area.y + (area.height - cell_rows as u16) / 2;

    let buffer = frame.buffer_mut();
    for row in 0..cell_rows {
        for col in 0..width {
            let upper = scaled.get_pixel(col, row * 2);
            // Odd heights leave the last cell's lower half empty
            let lower = (row * 2 + 1 < height).then(|| scaled.get_pixel(col, row * 2 + 1));

            if let Some(cell) = buffer.cell_mut((left + col as u16, top + row as u16)) {
                cell.set_symbol(HALF_BLOCK);
                cell.set_fg(Color::Rgb(upper[0], upper[1], upper[2]));
                if let Some(lower) = lower {
                    cell.set_bg(Color::Rgb(lower[0], lower[1], lower[2]));
                }
            }
        }
    }
}
