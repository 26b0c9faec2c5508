pub mod details_pane;
pub mod header_pane;
pub mod input_form;
pub mod keybindings;
pub mod layout;
pub mod list_pane;
pub mod modal;
pub mod styles;

use crate::app::AppState;
use crate::domain::UiMode;
use details_pane::render_details_pane;
use header_pane::render_header_pane;
use input_form::render_input_form;
use keybindings::render_keybindings;
use layout::create_layout;
use list_pane::render_list_pane;
use modal::{render_confirm_delete_modal, render_meeting_prompt};
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use styles::{hint_style, toast_style};

/// Main render function - draws the entire UI
pub fn render(f: &mut Frame, app: &AppState) {
    let size = f.size();
    let layout = create_layout(size);

    render_keybindings(f, app, layout.keybindings_area);
    render_header_pane(f, app, layout.header_area);
    render_list_pane(f, app, layout.list_area);
    render_details_pane(f, app, layout.details_area);
    render_status_line(f, app, layout.status_area);

    match app.ui_mode {
        UiMode::AddingTask | UiMode::EditingTask => render_input_form(f, app, size),
        UiMode::ConfirmDelete => render_confirm_delete_modal(f, app, size),
        UiMode::SwitchingMeeting => render_meeting_prompt(f, app, size),
        UiMode::Normal | UiMode::EditingQuery => {}
    }
}

/// Toast when one is showing, otherwise a quiet status line
fn render_status_line(f: &mut Frame, app: &AppState, area: Rect) {
    let paragraph = match &app.toast {
        Some(toast) => Paragraph::new(Line::from(Span::raw(format!(" {} ", toast.message))))
            .style(toast_style(toast.kind)),
        None => {
            let mut status = String::from(" ");
            if app.generating {
                status.push_str("generating... ");
            }
            if app.loading {
                status.push_str("loading... ");
            }
            Paragraph::new(status).style(hint_style())
        }
    };
    f.render_widget(paragraph, area);
}
