use crate::app::AppState;
use crate::domain::UiMode;
use crate::ui::styles::{border_style, default_style, hint_style, modal_title_style, title_style};
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Meeting, location and the filter being edited
pub fn render_header_pane(f: &mut Frame, app: &AppState, area: Rect) {
    let filter = &app.filter_form;
    let editing_query = app.ui_mode == UiMode::EditingQuery;

    let query_style = if editing_query {
        modal_title_style()
    } else {
        default_style()
    };

    let mut spans = vec![
        Span::styled("Search: ", title_style()),
        Span::styled(format!("\"{}\"", filter.query), query_style),
    ];
    if editing_query {
        spans.push(Span::styled("█", modal_title_style()));
    }
    spans.extend([
        Span::raw("   "),
        Span::styled("Done: ", title_style()),
        Span::raw(filter.done_label()),
        Span::raw("   "),
        Span::styled("Limit: ", title_style()),
        Span::raw(filter.limit.to_string()),
        Span::raw("   "),
        Span::styled("Sort: ", title_style()),
        Span::raw(filter.sort.label()),
    ]);
    if app.filter_pending() {
        spans.push(Span::styled("  (pending)", hint_style()));
    }

    let meeting = app
        .location
        .meeting
        .as_deref()
        .unwrap_or("no meeting");
    let mut nav = String::new();
    if app.history.can_go_back() {
        nav.push_str(" ◀");
    }
    if app.history.can_go_forward() {
        nav.push_str(" ▶");
    }
    let title = format!(" {} · {}{} ", meeting, app.location.display(), nav);

    let paragraph = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style())
            .title(Span::styled(title, title_style())),
    );

    f.render_widget(paragraph, area);
}
