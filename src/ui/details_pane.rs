use crate::app::AppState;
use crate::domain::views::format_timestamp;
use crate::domain::ListState;
use crate::ui::styles::{border_style, deadline_style, default_style, title_style};
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

/// Render the details pane for the selected task
pub fn render_details_pane(f: &mut Frame, app: &AppState, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style())
        .title(Span::styled(" Details ", title_style()));

    let Some(row) = app.selected_row() else {
        f.render_widget(Paragraph::new("No task selected").block(block), area);
        return;
    };
    let task = &row.task;

    let mut lines = Vec::new();

    lines.push(Line::from(vec![
        Span::styled("Title: ", title_style()),
        Span::raw(task.display_title()),
    ]));
    lines.push(Line::raw(""));

    lines.push(Line::from(vec![
        Span::styled("Status:   ", title_style()),
        Span::styled(row.status.as_str(), deadline_style(row.status)),
    ]));
    lines.push(Line::from(vec![
        Span::styled("Deadline: ", title_style()),
        Span::styled(row.deadline_label.as_str(), deadline_style(row.status)),
    ]));
    if let Some(created) = task.created_at {
        lines.push(Line::from(vec![
            Span::styled("Created:  ", title_style()),
            Span::raw(format_timestamp(&created)),
        ]));
    }
    if app.list_state == ListState::Preview {
        lines.push(Line::from(vec![
            Span::styled("Source:   ", title_style()),
            Span::raw("generated from meeting summary"),
        ]));
    } else {
        lines.push(Line::from(vec![
            Span::styled("ID:       ", title_style()),
            Span::raw(task.id.as_str()),
        ]));
    }
    lines.push(Line::raw(""));

    if !task.content.trim().is_empty() {
        lines.push(Line::from(Span::styled("Content:", title_style())));
        for content_line in task.content.lines() {
            lines.push(Line::raw(format!("  {}", content_line)));
        }
    } else {
        lines.push(Line::from(Span::styled(
            "Content: (empty)",
            default_style(),
        )));
    }

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false });

    f.render_widget(paragraph, area);
}
