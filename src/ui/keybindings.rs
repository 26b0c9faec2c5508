use crate::app::AppState;
use crate::domain::{ListState, UiMode};
use crate::ui::styles::hint_style;
use ratatui::{layout::Rect, text::{Line, Span}, widgets::Paragraph, Frame};

fn hints_for(app: &AppState) -> &'static [&'static str] {
    match app.ui_mode {
        UiMode::EditingQuery => &["type to search   ", "Backspace delete   ", "Enter/Esc done"],
        UiMode::AddingTask | UiMode::EditingTask => {
            &["Tab next field   ", "Enter save   ", "Esc cancel"]
        }
        UiMode::ConfirmDelete => &["y delete   ", "n/Esc keep"],
        UiMode::SwitchingMeeting => &["type meeting id   ", "Enter switch   ", "Esc cancel"],
        UiMode::Normal if app.list_state == ListState::Preview => &[
            " ↑/↓ select   ",
            "Enter add all   ",
            "a add selected   ",
            "Esc discard   ",
            "M meeting   ",
            "q quit",
        ],
        UiMode::Normal => &[
            " ↑/↓ select   ",
            "Space done   ",
            "a add   ",
            "e edit   ",
            "d delete   ",
            "/ search   ",
            "f done-filter   ",
            "l limit   ",
            "s sort   ",
            "[ ] back/fwd   ",
            "r reload   ",
            "g generate   ",
            "M meeting   ",
            "q quit",
        ],
    }
}

/// Render the keybindings hint bar
pub fn render_keybindings(f: &mut Frame, app: &AppState, area: Rect) {
    let hints = Line::from(
        hints_for(app)
            .iter()
            .map(|hint| Span::raw(*hint))
            .collect::<Vec<_>>(),
    );

    let paragraph = Paragraph::new(hints).style(hint_style());
    f.render_widget(paragraph, area);
}
