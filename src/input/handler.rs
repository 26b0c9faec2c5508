use crate::app::AppState;
use crate::domain::{ListState, UiMode};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Handle keyboard input events. Returns true when the app should quit.
pub fn handle_key(app: &mut AppState, key: KeyEvent) -> Result<bool> {
    // Ctrl+C always quits
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Ok(true);
    }

    match app.ui_mode {
        UiMode::Normal if app.list_state == ListState::Preview => handle_preview_mode(app, key),
        UiMode::Normal => handle_normal_mode(app, key),
        UiMode::EditingQuery => handle_query_mode(app, key),
        UiMode::AddingTask | UiMode::EditingTask => handle_input_form_mode(app, key),
        UiMode::ConfirmDelete => handle_confirm_delete_mode(app, key),
        UiMode::SwitchingMeeting => handle_meeting_prompt_mode(app, key),
    }
}

/// Handle keys in normal mode
fn handle_normal_mode(app: &mut AppState, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => app.move_selection_up(),
        KeyCode::Down | KeyCode::Char('j') => app.move_selection_down(),

        // History navigation
        KeyCode::Char('[') => app.history_back(),
        KeyCode::Char(']') => app.history_forward(),

        KeyCode::Char(' ') | KeyCode::Char('x') => app.toggle_selected_completed(),
        KeyCode::Char('a') => app.start_add_task(),
        KeyCode::Char('e') | KeyCode::Enter => app.start_edit_selected(),
        KeyCode::Char('d') | KeyCode::Delete => app.request_delete_selected(),

        // Filters
        KeyCode::Char('/') => app.start_query_edit(),
        KeyCode::Char('f') => app.cycle_done_filter(),
        KeyCode::Char('l') => app.cycle_limit(),
        KeyCode::Char('s') => app.cycle_sort(),
        KeyCode::Char('r') => app.load_tasks(),

        KeyCode::Char('g') => app.generate_from_summary(),
        KeyCode::Char('M') => app.start_switch_meeting(),

        KeyCode::Char('q') | KeyCode::Char('Q') => return Ok(true),
        _ => {}
    }
    Ok(false)
}

/// Keys while generated tasks are previewed
fn handle_preview_mode(app: &mut AppState, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => app.move_selection_up(),
        KeyCode::Down | KeyCode::Char('j') => app.move_selection_down(),
        KeyCode::Enter => app.accept_generated(),
        KeyCode::Char('a') => app.accept_selected_generated(),
        KeyCode::Esc => app.discard_preview(),
        KeyCode::Char('M') => app.start_switch_meeting(),
        KeyCode::Char('q') | KeyCode::Char('Q') => return Ok(true),
        _ => {}
    }
    Ok(false)
}

/// Typing into the search box
fn handle_query_mode(app: &mut AppState, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Enter | KeyCode::Esc => app.finish_query_edit(),
        KeyCode::Backspace => app.query_backspace(),
        KeyCode::Char(c) => app.query_add_char(c),
        _ => {}
    }
    Ok(false)
}

/// Handle keys in the add/edit form
fn handle_input_form_mode(app: &mut AppState, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Enter => app.submit_input_form(),
        KeyCode::Esc => app.cancel_input_form(),
        KeyCode::Tab => app.input_form_toggle_field(),
        KeyCode::Backspace => app.input_form_backspace(),
        KeyCode::Char(c) => app.input_form_add_char(c),
        _ => {}
    }
    Ok(false)
}

fn handle_confirm_delete_mode(app: &mut AppState, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') => app.confirm_delete(),
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => app.cancel_delete(),
        _ => {}
    }
    Ok(false)
}

fn handle_meeting_prompt_mode(app: &mut AppState, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Enter => app.submit_meeting_input(),
        KeyCode::Esc => app.cancel_meeting_input(),
        KeyCode::Backspace => app.meeting_input_backspace(),
        KeyCode::Char(c) => app.meeting_input_add_char(c),
        _ => {}
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{AddKind, ApiCommand, ApiOutcome};
    use crate::app::AppSettings;
    use crate::domain::{Location, Task, TaskDraft};
    use std::sync::mpsc::{self, Receiver};

    fn create_test_app() -> (AppState, Receiver<ApiCommand>) {
        let (tx, rx) = mpsc::channel();
        let mut app = AppState::new(Location::parse("meeting=m1"), AppSettings::default(), tx);
        let tasks = ["Task 1", "Task 2"]
            .iter()
            .enumerate()
            .map(|(i, title)| Task {
                id: format!("t{}", i + 1),
                title: title.to_string(),
                content: String::new(),
                deadline: None,
                completed: false,
                created_at: None,
            })
            .collect();
        app.render_tasks(tasks);
        (app, rx)
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::empty())
    }

    fn type_text(app: &mut AppState, text: &str) {
        for c in text.chars() {
            handle_key(app, key(KeyCode::Char(c))).unwrap();
        }
    }

    #[test]
    fn test_handle_navigation() {
        let (mut app, _rx) = create_test_app();
        assert_eq!(app.selected_index, 0);

        handle_key(&mut app, key(KeyCode::Down)).unwrap();
        assert_eq!(app.selected_index, 1);
        handle_key(&mut app, key(KeyCode::Down)).unwrap();
        assert_eq!(app.selected_index, 1);

        handle_key(&mut app, key(KeyCode::Up)).unwrap();
        assert_eq!(app.selected_index, 0);
    }

    #[test]
    fn test_handle_quit() {
        let (mut app, _rx) = create_test_app();
        assert!(handle_key(&mut app, key(KeyCode::Char('q'))).unwrap());

        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert!(handle_key(&mut app, ctrl_c).unwrap());
    }

    #[test]
    fn test_handle_add_task() {
        let (mut app, rx) = create_test_app();

        handle_key(&mut app, key(KeyCode::Char('a'))).unwrap();
        assert_eq!(app.ui_mode, UiMode::AddingTask);

        // 'q' is text here, not quit
        type_text(&mut app, "quarterly");
        handle_key(&mut app, key(KeyCode::Tab)).unwrap();
        type_text(&mut app, "notes");
        handle_key(&mut app, key(KeyCode::Enter)).unwrap();

        match rx.try_recv().unwrap() {
            ApiCommand::Add { draft, kind } => {
                assert_eq!(kind, AddKind::Form);
                assert_eq!(draft.title, "quarterly");
                assert_eq!(draft.content, "notes");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_handle_toggle_sends_update() {
        let (mut app, rx) = create_test_app();

        handle_key(&mut app, key(KeyCode::Char(' '))).unwrap();
        assert!(app.rows[0].task.completed);
        assert!(matches!(rx.try_recv().unwrap(), ApiCommand::Update { .. }));
    }

    #[test]
    fn test_handle_delete_confirmation() {
        let (mut app, rx) = create_test_app();

        handle_key(&mut app, key(KeyCode::Delete)).unwrap();
        assert_eq!(app.ui_mode, UiMode::ConfirmDelete);
        handle_key(&mut app, key(KeyCode::Char('n'))).unwrap();
        assert_eq!(app.ui_mode, UiMode::Normal);
        assert!(rx.try_recv().is_err());

        handle_key(&mut app, key(KeyCode::Char('d'))).unwrap();
        handle_key(&mut app, key(KeyCode::Char('y'))).unwrap();
        assert!(matches!(rx.try_recv().unwrap(), ApiCommand::Delete { .. }));
    }

    #[test]
    fn test_handle_query_editing() {
        let (mut app, _rx) = create_test_app();

        handle_key(&mut app, key(KeyCode::Char('/'))).unwrap();
        type_text(&mut app, "fix");
        handle_key(&mut app, key(KeyCode::Backspace)).unwrap();
        handle_key(&mut app, key(KeyCode::Enter)).unwrap();

        assert_eq!(app.ui_mode, UiMode::Normal);
        assert_eq!(app.filter_form.query, "fi");
        assert!(app.filter_pending());
    }

    #[test]
    fn test_handle_meeting_switch() {
        let (mut app, rx) = create_test_app();

        handle_key(&mut app, key(KeyCode::Char('M'))).unwrap();
        assert_eq!(app.meeting_input, "m1");
        handle_key(&mut app, key(KeyCode::Backspace)).unwrap();
        type_text(&mut app, "2");
        handle_key(&mut app, key(KeyCode::Enter)).unwrap();

        assert_eq!(app.location.meeting.as_deref(), Some("m2"));
        assert!(matches!(rx.try_recv().unwrap(), ApiCommand::List { .. }));
    }

    #[test]
    fn test_handle_preview_keys() {
        let (mut app, rx) = create_test_app();
        app.apply_outcome(ApiOutcome::Generated {
            result: Ok(vec![TaskDraft {
                title: "Follow up".to_string(),
                content: String::new(),
                deadline: None,
            }]),
        });

        // Toggle and delete are inert in the preview
        handle_key(&mut app, key(KeyCode::Char(' '))).unwrap();
        handle_key(&mut app, key(KeyCode::Char('d'))).unwrap();
        assert!(rx.try_recv().is_err());

        handle_key(&mut app, key(KeyCode::Esc)).unwrap();
        assert!(matches!(rx.try_recv().unwrap(), ApiCommand::List { .. }));
        assert_eq!(app.list_state, ListState::Loading);
    }
}
