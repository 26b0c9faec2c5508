use crate::app::AppState;
use crate::domain::UiMode;
use crate::ui::{
    layout::create_modal_area,
    styles::{modal_bg_style, modal_title_style},
};
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

fn render_box(f: &mut Frame, area: Rect, title: &str, lines: Vec<Line>) {
    let modal_area = create_modal_area(area);

    // Clear the area behind the modal
    f.render_widget(Clear, modal_area);

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(Span::styled(title.to_string(), modal_title_style()))
                .style(modal_bg_style()),
        )
        .wrap(Wrap { trim: false });

    f.render_widget(paragraph, modal_area);
}

/// Render the delete confirmation
pub fn render_confirm_delete_modal(f: &mut Frame, app: &AppState, area: Rect) {
    let Some(confirm) = &app.confirm else {
        return;
    };

    let lines = vec![
        Line::raw(""),
        Line::raw("  Delete this task?"),
        Line::raw(""),
        Line::from(Span::styled(format!("  {}", confirm.title), modal_title_style())),
        Line::raw(""),
        Line::raw("  This cannot be undone."),
        Line::raw(""),
        Line::from(vec![
            Span::styled("  [y]", modal_title_style()),
            Span::raw(" Delete  "),
            Span::styled("[n]", modal_title_style()),
            Span::raw(" Keep"),
        ]),
    ];

    render_box(f, area, " Delete Task ", lines);
}

/// Render the meeting switch prompt
pub fn render_meeting_prompt(f: &mut Frame, app: &AppState, area: Rect) {
    if app.ui_mode != UiMode::SwitchingMeeting {
        return;
    }

    let lines = vec![
        Line::raw(""),
        Line::raw("  Meeting ID (empty to clear):"),
        Line::from(vec![
            Span::raw("  > "),
            Span::styled(app.meeting_input.as_str(), modal_title_style()),
            Span::styled("█", modal_title_style()),
        ]),
        Line::raw(""),
        Line::raw("  Enter to switch  ·  Esc to cancel"),
    ];

    render_box(f, area, " Switch Meeting ", lines);
}
