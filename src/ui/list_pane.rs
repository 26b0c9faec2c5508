use crate::app::AppState;
use crate::domain::{DeadlineStatus, ListState, RowPhase, TaskRow};
use crate::ui::styles::{
    border_style, deadline_style, default_style, done_style, error_style, hint_style,
    preview_style, selected_style, title_style,
};
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState as ListScroll, Paragraph, Wrap},
    Frame,
};

fn checkbox(row: &TaskRow, preview: bool, use_emoji: bool) -> &'static str {
    match (preview, row.task.completed, use_emoji) {
        (true, _, true) => "✨ ",
        (true, _, false) => "[+] ",
        (false, true, true) => "✅ ",
        (false, true, false) => "[x] ",
        (false, false, true) => "⬜ ",
        (false, false, false) => "[ ] ",
    }
}

/// One list line: checkbox, title, deadline label
fn create_task_line(row: &TaskRow, preview: bool, use_emoji: bool) -> Line<'_> {
    let title_style = if preview {
        preview_style()
    } else if row.task.completed {
        done_style()
    } else {
        default_style()
    };

    let mut label = row.deadline_label.clone();
    if row.phase == RowPhase::Countdown && use_emoji {
        label = format!("⏳ {}", label);
    } else if row.phase == RowPhase::Expired && use_emoji {
        label = format!("⌛ {}", label);
    }

    Line::from(vec![
        Span::raw(checkbox(row, preview, use_emoji)),
        Span::styled(row.task.display_title(), title_style),
        Span::raw("  "),
        Span::styled(label, deadline_style(row.status)),
    ])
}

/// Text shown in place of the list
fn placeholder(app: &AppState) -> Option<(String, ratatui::style::Style)> {
    match &app.list_state {
        ListState::NoMeeting => Some((
            "Select a meeting to see its tasks (press M)".to_string(),
            hint_style(),
        )),
        ListState::Loading => Some(("Loading tasks...".to_string(), hint_style())),
        ListState::Empty => Some((
            "No tasks match. Press a to add one or g to generate from the summary.".to_string(),
            hint_style(),
        )),
        ListState::Failed(message) => Some((format!("Failed to load tasks: {}", message), error_style())),
        ListState::Loaded | ListState::Preview => None,
    }
}

/// Render the task list pane
pub fn render_list_pane(f: &mut Frame, app: &AppState, area: Rect) {
    let preview = app.list_state == ListState::Preview;

    let mut title = if preview {
        format!(" Generated tasks ({}), not saved yet ", app.rows.len())
    } else {
        let open = app
            .rows
            .iter()
            .filter(|row| row.status != DeadlineStatus::Completed)
            .count();
        format!(" Tasks ({} open / {}) ", open, app.rows.len())
    };
    if app.loading {
        title.push_str("⟳ ");
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style())
        .title(Span::styled(title, title_style()));

    if let Some((message, style)) = placeholder(app) {
        let paragraph = Paragraph::new(Line::from(Span::styled(message, style)))
            .block(block)
            .wrap(Wrap { trim: false });
        f.render_widget(paragraph, area);
        return;
    }

    let items: Vec<ListItem> = app
        .rows
        .iter()
        .enumerate()
        .map(|(idx, row)| {
            let line = create_task_line(row, preview, app.settings.use_emoji);
            let style = if idx == app.selected_index {
                selected_style()
            } else {
                default_style()
            };
            ListItem::new(line).style(style)
        })
        .collect();

    // Scroll so the selected row stays visible
    let mut scroll = ListScroll::default().with_selected(Some(app.selected_index));
    f.render_stateful_widget(List::new(items).block(block), area, &mut scroll);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::AppSettings;
    use crate::domain::{Location, Task};
    use chrono::{Duration, Local};
    use ratatui::{backend::TestBackend, Terminal};
    use std::sync::mpsc;

    fn row(completed: bool, deadline_hours: Option<i64>) -> TaskRow {
        let now = Local::now();
        TaskRow::new(
            Task {
                id: "t1".to_string(),
                title: "Write minutes".to_string(),
                content: String::new(),
                deadline: deadline_hours.map(|h| now + Duration::hours(h)),
                completed,
                created_at: None,
            },
            now,
        )
    }

    fn text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_task_line_contents() {
        let open = row(false, None);
        assert_eq!(text(&create_task_line(&open, false, false)), "[ ] Write minutes  no deadline");

        let done = row(true, Some(48));
        assert!(text(&create_task_line(&done, false, false)).starts_with("[x] Write minutes  due "));

        let generated = row(false, None);
        assert!(text(&create_task_line(&generated, true, false)).starts_with("[+] "));
    }

    #[test]
    fn test_overdue_label_is_styled_as_error() {
        let late = row(false, Some(-3));
        let line = create_task_line(&late, false, false);
        let label = line.spans.last().unwrap();
        assert!(label.content.contains("overdue by"));
        assert_eq!(label.style, error_style());
    }

    #[test]
    fn test_selected_row_scrolls_into_view() {
        let (tx, _rx) = mpsc::channel();
        let mut app = AppState::new(Location::parse("meeting=m1"), AppSettings::default(), tx);
        let tasks = (0..40)
            .map(|i| Task {
                id: format!("t{}", i),
                title: format!("Item {:02}", i),
                content: String::new(),
                deadline: None,
                completed: false,
                created_at: None,
            })
            .collect();
        app.render_tasks(tasks);
        app.selected_index = 35;
        let selected_title = app.rows[35].task.display_title().to_string();

        let mut terminal = Terminal::new(TestBackend::new(60, 12)).unwrap();
        terminal
            .draw(|f| render_list_pane(f, &app, f.size()))
            .unwrap();

        let buffer = terminal.backend().buffer();
        let screen: String = (0..buffer.area.height)
            .map(|y| {
                (0..buffer.area.width)
                    .map(|x| buffer.get(x, y).symbol())
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n");
        assert!(screen.contains(&selected_title));
    }
}
