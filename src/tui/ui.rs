use crate::core::state::{GenerationState, Surface};
use crate::tui::TuiState;
use crate::tui::component::Component;
use crate::tui::components::{
    BUTTON_WIDTH, ErrorBanner, ImagePanel, Spinner, SubmitButton, TitleBar,
};

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout};

pub fn draw_ui(frame: &mut Frame, state: &GenerationState, tui: &mut TuiState, spinner_frame: usize) {
    use Constraint::{Length, Min};
    let layout = Layout::vertical([Length(1), Min(0), Length(3)]);
    let [title_area, main_area, footer_area] = layout.areas(frame.area());
    let [input_area, button_area] =
        Layout::horizontal([Min(0), Length(BUTTON_WIDTH)]).areas(footer_area);

    // Main area - error, image, spinner, or nothing
    match state.surface() {
        Surface::Error(message) => ErrorBanner::new(message).render(frame, main_area),
        Surface::Image(image) => ImagePanel::new(image).render(frame, main_area),
        Surface::Loading => Spinner::new(spinner_frame).render(frame, main_area),
        Surface::Idle => {}
    }

    TitleBar::new(&state.generator_name, &state.status_message).render(frame, title_area);
    tui.input_box.render(frame, input_area);
    SubmitButton::new(state.can_submit(), state.is_pending()).render(frame, button_area);
}
