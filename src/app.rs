use crate::api::{AddKind, ApiCommand, ApiError, ApiOutcome, ListParams, UpdateKind};
use crate::domain::views::format_timestamp;
use crate::domain::{
    build_rows, validate_task_fields, FilterParams, History, ListState, Location, RowPhase, Task,
    TaskDraft, TaskPatch, TaskRow, ToastKind, UiMode,
};
use crate::notifications;
use crate::persistence::Config;
use crate::scheduler::{Scheduler, TimerKind};
use chrono::{DateTime, Local};
use std::sync::mpsc::Sender;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// How long a toast stays visible
pub const TOAST_DURATION: Duration = Duration::from_secs(3);

/// Countdown label refresh period
pub const COUNTDOWN_INTERVAL: Duration = Duration::from_secs(60);

/// Delay between a countdown expiring and the reload it triggers
pub const EXPIRY_RELOAD_DELAY: Duration = Duration::from_millis(1500);

/// A point in time, both monotonic (for timers) and wall clock (for deadlines)
#[derive(Debug, Clone, Copy)]
pub struct Moment {
    pub instant: Instant,
    pub wall: DateTime<Local>,
}

impl Moment {
    pub fn now() -> Self {
        Self {
            instant: Instant::now(),
            wall: Local::now(),
        }
    }
}

/// Timing and display settings taken from the config file
#[derive(Debug, Clone)]
pub struct AppSettings {
    pub refresh_every: Duration,
    pub debounce: Duration,
    pub use_emoji: bool,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl AppSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            refresh_every: Duration::from_secs(config.refresh_secs.max(1)),
            debounce: Duration::from_millis(config.debounce_ms),
            use_emoji: config.use_emoji,
        }
    }
}

/// Input form state for adding or editing tasks
#[derive(Debug, Clone, Default)]
pub struct InputFormState {
    pub title: String,
    pub content: String,
    pub deadline: String,
    pub editing_field: usize, // 0 = title, 1 = content, 2 = deadline
    /// Set when editing an existing task
    pub editing_id: Option<String>,
    /// Request in flight; further submits are ignored
    pub submitting: bool,
}

impl InputFormState {
    fn for_task(task: &Task) -> Self {
        Self {
            title: task.title.clone(),
            content: task.content.clone(),
            deadline: task.deadline.map(|d| format_timestamp(&d)).unwrap_or_default(),
            editing_field: 0,
            editing_id: Some(task.id.clone()),
            submitting: false,
        }
    }

    fn current_field_mut(&mut self) -> Option<&mut String> {
        match self.editing_field {
            0 => Some(&mut self.title),
            1 => Some(&mut self.content),
            2 => Some(&mut self.deadline),
            _ => None,
        }
    }
}

/// Pending delete confirmation
#[derive(Debug, Clone)]
pub struct ConfirmState {
    pub task_id: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub kind: ToastKind,
    pub message: String,
}

/// Main application state: the task view-model for one meeting
pub struct AppState {
    /// Committed view state (what the last list request used)
    pub location: Location,
    /// Filter being edited; committed after the debounce
    pub filter_form: FilterParams,
    pub history: History,
    pub tasks: Vec<Task>,
    pub rows: Vec<TaskRow>,
    /// Drafts shown while previewing generated tasks
    pub generated: Vec<TaskDraft>,
    pub list_state: ListState,
    pub loading: bool,
    pub generating: bool,
    pub selected_index: usize,
    pub ui_mode: UiMode,
    pub input_form: Option<InputFormState>,
    pub confirm: Option<ConfirmState>,
    pub meeting_input: String,
    pub toast: Option<Toast>,
    pub settings: AppSettings,
    pub scheduler: Scheduler,
    commands: Sender<ApiCommand>,
    next_seq: u64,
    latest_list_seq: Option<u64>,
    #[cfg(test)]
    frozen: Option<Moment>,
}

impl AppState {
    pub fn new(location: Location, settings: AppSettings, commands: Sender<ApiCommand>) -> Self {
        let list_state = if location.meeting.is_some() {
            ListState::Loading
        } else {
            ListState::NoMeeting
        };

        Self {
            filter_form: location.filter.clone(),
            history: History::new(location.clone()),
            location,
            tasks: Vec::new(),
            rows: Vec::new(),
            generated: Vec::new(),
            list_state,
            loading: false,
            generating: false,
            selected_index: 0,
            ui_mode: UiMode::Normal,
            input_form: None,
            confirm: None,
            meeting_input: String::new(),
            toast: None,
            settings,
            scheduler: Scheduler::new(),
            commands,
            next_seq: 0,
            latest_list_seq: None,
            #[cfg(test)]
            frozen: None,
        }
    }

    fn now(&self) -> Moment {
        #[cfg(test)]
        if let Some(moment) = self.frozen {
            return moment;
        }
        Moment::now()
    }

    /// Arm auto-refresh and run the first load
    pub fn start(&mut self) {
        let now = self.now();
        self.scheduler
            .set_interval(TimerKind::AutoRefresh, self.settings.refresh_every, now.instant);
        self.load_tasks();
    }

    /// Cancel every timer. Nothing fires after this.
    pub fn dispose(&mut self) {
        self.scheduler.dispose();
        self.toast = None;
        info!(location = %self.location.display(), "task view disposed");
    }

    /// Location string to remember for the next run
    pub fn session_location(&self) -> String {
        self.location.to_query()
    }

    fn send(&mut self, command: ApiCommand) -> bool {
        if self.commands.send(command).is_err() {
            warn!("api worker is gone; command dropped");
            self.show_toast(ToastKind::Error, "Task service unavailable".to_string());
            return false;
        }
        true
    }

    pub fn show_toast(&mut self, kind: ToastKind, message: String) {
        let now = self.now();
        self.toast = Some(Toast { kind, message });
        self.scheduler
            .set_timeout(TimerKind::ToastExpiry, TOAST_DURATION, now.instant);
    }

    fn toast_error(&mut self, action: &str, error: &ApiError) {
        warn!(action, error = %error, "task request failed");
        self.show_toast(ToastKind::Error, format!("{} failed: {}", action, error));
    }

    // ---- loading and rendering ----

    /// Request the task list for the current location
    pub fn load_tasks(&mut self) {
        let Some(meeting_id) = self.location.meeting.clone() else {
            self.scheduler.clear_countdowns();
            self.rows.clear();
            self.tasks.clear();
            self.list_state = ListState::NoMeeting;
            return;
        };

        if self.list_state == ListState::Preview {
            self.generated.clear();
            self.rows.clear();
            self.list_state = ListState::Loading;
        } else if self.rows.is_empty() {
            self.list_state = ListState::Loading;
        }

        let seq = self.next_seq;
        self.next_seq += 1;
        self.latest_list_seq = Some(seq);
        self.loading = true;

        debug!(seq, meeting_id = %meeting_id, "loading tasks");
        let params = ListParams {
            meeting_id: Some(meeting_id),
            filter: self.location.filter.clone(),
        };
        if !self.send(ApiCommand::List { seq, params }) {
            self.loading = false;
        }
    }

    /// Reload after a write. The preview is left alone; closing it reloads anyway.
    fn reload_unless_preview(&mut self) {
        if self.list_state == ListState::Preview {
            debug!("reload deferred until preview closes");
        } else {
            self.load_tasks();
        }
    }

    /// Sort and show tasks, re-arming countdowns for rows that need one
    pub fn render_tasks(&mut self, tasks: Vec<Task>) {
        let now = self.now();
        self.scheduler.clear_countdowns();

        self.rows = build_rows(&tasks, self.location.filter.sort, now.wall);
        self.tasks = tasks;

        for row in &self.rows {
            if row.phase == RowPhase::Countdown {
                self.scheduler.set_interval(
                    TimerKind::Countdown(row.task.id.clone()),
                    COUNTDOWN_INTERVAL,
                    now.instant,
                );
            }
        }

        self.list_state = if self.rows.is_empty() {
            ListState::Empty
        } else {
            ListState::Loaded
        };
        self.clamp_selection();
    }

    fn render_preview(&mut self) {
        let now = self.now();
        self.scheduler.clear_countdowns();
        self.rows = self
            .generated
            .iter()
            .map(|draft| TaskRow::new(draft.to_preview_task(), now.wall))
            .collect();
        self.list_state = ListState::Preview;
        self.clamp_selection();
    }

    fn clamp_selection(&mut self) {
        if self.rows.is_empty() {
            self.selected_index = 0;
        } else if self.selected_index >= self.rows.len() {
            self.selected_index = self.rows.len() - 1;
        }
    }

    /// Fire whatever timers are due
    pub fn tick(&mut self, now: Moment) {
        for kind in self.scheduler.take_due(now.instant) {
            match kind {
                TimerKind::AutoRefresh => {
                    if self.list_state == ListState::Preview {
                        debug!("auto-refresh skipped during preview");
                    } else {
                        self.load_tasks();
                    }
                }
                TimerKind::FilterDebounce => self.commit_filter(),
                TimerKind::Countdown(id) => self.update_countdown(&id, now),
                TimerKind::ExpiryReload => self.reload_unless_preview(),
                TimerKind::ToastExpiry => self.toast = None,
            }
        }
    }

    fn update_countdown(&mut self, id: &str, now: Moment) {
        let timer = TimerKind::Countdown(id.to_string());
        let Some(row) = self.rows.iter_mut().find(|row| row.task.id == id) else {
            self.scheduler.clear(&timer);
            return;
        };

        if row.update_countdown(now.wall) {
            return;
        }

        let title = row.task.display_title().to_string();
        info!(task = %title, "deadline passed");
        self.scheduler.clear(&timer);
        self.scheduler
            .set_timeout(TimerKind::ExpiryReload, EXPIRY_RELOAD_DELAY, now.instant);
        notifications::notify_deadline_passed(&title);
    }

    // ---- API outcomes ----

    /// Apply a finished request. Only ever called on the UI thread.
    pub fn apply_outcome(&mut self, outcome: ApiOutcome) {
        match outcome {
            ApiOutcome::Listed { seq, result } => {
                if self.latest_list_seq != Some(seq) {
                    debug!(seq, latest = ?self.latest_list_seq, "dropping stale list response");
                    return;
                }
                self.latest_list_seq = None;
                self.loading = false;

                match result {
                    Ok(listing) => {
                        debug!(count = listing.tasks.len(), shape = ?listing.shape, "tasks loaded");
                        self.render_tasks(listing.tasks);
                    }
                    Err(e) => {
                        warn!(error = %e, "loading tasks failed");
                        self.scheduler.clear_countdowns();
                        self.rows.clear();
                        self.tasks.clear();
                        self.list_state = ListState::Failed(e.to_string());
                    }
                }
            }
            ApiOutcome::Added { kind, result } => match (kind, result) {
                (AddKind::Form, Ok(())) => {
                    if self.input_form.as_ref().is_some_and(|f| f.submitting) {
                        self.close_form();
                    }
                    self.show_toast(ToastKind::Success, "Task added".to_string());
                    self.reload_unless_preview();
                }
                (AddKind::Generated, Ok(())) => self.reload_unless_preview(),
                (AddKind::Form, Err(e)) => {
                    if let Some(form) = &mut self.input_form {
                        form.submitting = false;
                    }
                    self.toast_error("Add", &e);
                }
                (AddKind::Generated, Err(e)) => self.toast_error("Add", &e),
            },
            ApiOutcome::Updated { kind, result } => match (kind, result) {
                (UpdateKind::Edit, Ok(())) => {
                    if self.input_form.as_ref().is_some_and(|f| f.submitting) {
                        self.close_form();
                    }
                    self.show_toast(ToastKind::Success, "Task updated".to_string());
                    self.reload_unless_preview();
                }
                (UpdateKind::Completion { .. }, Ok(())) => self.reload_unless_preview(),
                (UpdateKind::Completion { id, previous }, Err(e)) => {
                    self.set_completed(&id, previous);
                    self.toast_error("Update", &e);
                }
                (UpdateKind::Edit, Err(e)) => {
                    if let Some(form) = &mut self.input_form {
                        form.submitting = false;
                    }
                    self.toast_error("Update", &e);
                }
            },
            ApiOutcome::Deleted { id, result } => match result {
                Ok(()) => {
                    debug!(id = %id, "task deleted");
                    self.show_toast(ToastKind::Success, "Task deleted".to_string());
                    self.reload_unless_preview();
                }
                Err(e) => self.toast_error("Delete", &e),
            },
            ApiOutcome::Generated { result } => {
                self.generating = false;
                match result {
                    Ok(drafts) if drafts.is_empty() => {
                        self.show_toast(ToastKind::Info, "No tasks generated".to_string());
                    }
                    Ok(drafts) => {
                        let count = drafts.len();
                        self.generated = drafts;
                        // Any list response still in flight must not replace the preview
                        self.latest_list_seq = None;
                        self.loading = false;
                        self.selected_index = 0;
                        self.render_preview();
                        self.show_toast(
                            ToastKind::Success,
                            format!("Generated {} tasks (Enter: add all, Esc: discard)", count),
                        );
                    }
                    Err(e) => self.toast_error("Generate", &e),
                }
            }
        }
    }

    // ---- selection ----

    pub fn selected_row(&self) -> Option<&TaskRow> {
        self.rows.get(self.selected_index)
    }

    pub fn move_selection_up(&mut self) {
        if self.selected_index > 0 {
            self.selected_index -= 1;
        }
    }

    pub fn move_selection_down(&mut self) {
        if self.selected_index + 1 < self.rows.len() {
            self.selected_index += 1;
        }
    }

    // ---- completion toggle ----

    /// Flip the selected task's completion now and tell the server.
    /// The row reverts if the server rejects it.
    pub fn toggle_selected_completed(&mut self) {
        if self.list_state == ListState::Preview {
            return;
        }
        let Some(row) = self.rows.get(self.selected_index) else {
            return;
        };
        if row.task.id.is_empty() {
            return;
        }

        let id = row.task.id.clone();
        let previous = row.task.completed;
        self.set_completed(&id, !previous);

        self.send(ApiCommand::Update {
            patch: TaskPatch::completion(&id, !previous),
            kind: UpdateKind::Completion { id, previous },
        });
    }

    fn set_completed(&mut self, id: &str, completed: bool) {
        let now = self.now();
        if let Some(task) = self.tasks.iter_mut().find(|t| t.id == id) {
            task.completed = completed;
        }
        let Some(row) = self.rows.iter_mut().find(|row| row.task.id == id) else {
            return;
        };
        row.task.completed = completed;
        row.refresh(now.wall);

        let timer = TimerKind::Countdown(id.to_string());
        if row.phase == RowPhase::Countdown {
            if !self.scheduler.is_active(&timer) {
                self.scheduler
                    .set_interval(timer, COUNTDOWN_INTERVAL, now.instant);
            }
        } else {
            self.scheduler.clear(&timer);
        }
    }

    // ---- add / edit form ----

    /// Start adding a new task (opens input form)
    pub fn start_add_task(&mut self) {
        self.input_form = Some(InputFormState::default());
        self.ui_mode = UiMode::AddingTask;
    }

    /// Start editing the selected task
    pub fn start_edit_selected(&mut self) {
        if self.list_state == ListState::Preview {
            return;
        }
        let Some(row) = self.selected_row() else {
            return;
        };
        if row.task.id.is_empty() {
            return;
        }
        let form = InputFormState::for_task(&row.task);
        self.input_form = Some(form);
        self.ui_mode = UiMode::EditingTask;
    }

    /// Move to the next field (title -> content -> deadline)
    pub fn input_form_toggle_field(&mut self) {
        if let Some(form) = &mut self.input_form {
            form.editing_field = (form.editing_field + 1) % 3;
        }
    }

    pub fn input_form_add_char(&mut self, c: char) {
        if let Some(field) = self.input_form.as_mut().and_then(|f| f.current_field_mut()) {
            field.push(c);
        }
    }

    pub fn input_form_backspace(&mut self) {
        if let Some(field) = self.input_form.as_mut().and_then(|f| f.current_field_mut()) {
            field.pop();
        }
    }

    /// Validate locally, then send an add or update. The form stays open
    /// until the server answers.
    pub fn submit_input_form(&mut self) {
        let Some(form) = &self.input_form else {
            return;
        };
        if form.submitting {
            return;
        }

        let fields = match validate_task_fields(&form.title, &form.content, &form.deadline) {
            Ok(fields) => fields,
            Err(e) => {
                self.show_toast(ToastKind::Error, e.to_string());
                return;
            }
        };

        let command = match form.editing_id.clone() {
            None => ApiCommand::Add {
                draft: TaskDraft {
                    title: fields.title,
                    content: fields.content,
                    deadline: fields.deadline,
                },
                kind: AddKind::Form,
            },
            Some(id) => ApiCommand::Update {
                patch: TaskPatch {
                    id,
                    title: Some(fields.title),
                    content: Some(fields.content),
                    deadline: Some(fields.deadline),
                    completed: None,
                },
                kind: UpdateKind::Edit,
            },
        };

        if self.send(command) {
            if let Some(form) = &mut self.input_form {
                form.submitting = true;
            }
        }
    }

    pub fn cancel_input_form(&mut self) {
        self.close_form();
    }

    fn close_form(&mut self) {
        self.input_form = None;
        if matches!(self.ui_mode, UiMode::AddingTask | UiMode::EditingTask) {
            self.ui_mode = UiMode::Normal;
        }
    }

    // ---- delete ----

    pub fn request_delete_selected(&mut self) {
        if self.list_state == ListState::Preview {
            return;
        }
        let Some(row) = self.selected_row() else {
            return;
        };
        if row.task.id.is_empty() {
            return;
        }
        let confirm = ConfirmState {
            task_id: row.task.id.clone(),
            title: row.task.display_title().to_string(),
        };
        self.confirm = Some(confirm);
        self.ui_mode = UiMode::ConfirmDelete;
    }

    pub fn confirm_delete(&mut self) {
        self.ui_mode = UiMode::Normal;
        if let Some(confirm) = self.confirm.take() {
            self.send(ApiCommand::Delete {
                id: confirm.task_id,
            });
        }
    }

    pub fn cancel_delete(&mut self) {
        self.confirm = None;
        self.ui_mode = UiMode::Normal;
    }

    // ---- filtering and history ----

    fn arm_debounce(&mut self) {
        let now = self.now();
        self.scheduler
            .set_timeout(TimerKind::FilterDebounce, self.settings.debounce, now.instant);
    }

    pub fn start_query_edit(&mut self) {
        self.ui_mode = UiMode::EditingQuery;
    }

    pub fn finish_query_edit(&mut self) {
        self.ui_mode = UiMode::Normal;
    }

    pub fn query_add_char(&mut self, c: char) {
        self.filter_form.query.push(c);
        self.arm_debounce();
    }

    pub fn query_backspace(&mut self) {
        if self.filter_form.query.pop().is_some() {
            self.arm_debounce();
        }
    }

    pub fn cycle_done_filter(&mut self) {
        self.filter_form.cycle_done();
        self.arm_debounce();
    }

    pub fn cycle_limit(&mut self) {
        self.filter_form.cycle_limit();
        self.arm_debounce();
    }

    pub fn cycle_sort(&mut self) {
        self.filter_form.cycle_sort();
        self.arm_debounce();
    }

    /// Whether the filter form differs from the committed location
    pub fn filter_pending(&self) -> bool {
        self.filter_form != self.location.filter
    }

    /// Apply the edited filter: push the new location and reload
    fn commit_filter(&mut self) {
        let location = Location {
            meeting: self.location.meeting.clone(),
            filter: self.filter_form.clone(),
        };
        debug!(location = %location.display(), "filter committed");
        self.location = location.clone();
        self.history.push(location);
        self.selected_index = 0;
        self.load_tasks();
    }

    pub fn history_back(&mut self) {
        if let Some(location) = self.history.back().cloned() {
            self.restore_location(location);
        }
    }

    pub fn history_forward(&mut self) {
        if let Some(location) = self.history.forward().cloned() {
            self.restore_location(location);
        }
    }

    fn restore_location(&mut self, location: Location) {
        self.scheduler.clear(&TimerKind::FilterDebounce);
        if location.meeting != self.location.meeting {
            self.reset_list();
        }
        self.filter_form = location.filter.clone();
        self.location = location;
        self.load_tasks();
    }

    // ---- meeting lifecycle ----

    pub fn start_switch_meeting(&mut self) {
        self.meeting_input = self.location.meeting.clone().unwrap_or_default();
        self.ui_mode = UiMode::SwitchingMeeting;
    }

    pub fn meeting_input_add_char(&mut self, c: char) {
        self.meeting_input.push(c);
    }

    pub fn meeting_input_backspace(&mut self) {
        self.meeting_input.pop();
    }

    pub fn submit_meeting_input(&mut self) {
        self.ui_mode = UiMode::Normal;
        let meeting = std::mem::take(&mut self.meeting_input);
        self.set_meeting(meeting.trim());
    }

    pub fn cancel_meeting_input(&mut self) {
        self.meeting_input.clear();
        self.ui_mode = UiMode::Normal;
    }

    /// Switch to another meeting. An empty id clears the selection.
    pub fn set_meeting(&mut self, meeting_id: &str) {
        let meeting = (!meeting_id.is_empty()).then(|| meeting_id.to_string());
        if meeting == self.location.meeting && self.list_state != ListState::Preview {
            return;
        }

        info!(meeting = ?meeting, "switching meeting");
        self.reset_list();
        self.location = Location {
            meeting,
            filter: self.filter_form.clone(),
        };
        self.history.push(self.location.clone());
        self.load_tasks();
    }

    fn reset_list(&mut self) {
        self.scheduler.clear_countdowns();
        self.scheduler.clear(&TimerKind::FilterDebounce);
        self.scheduler.clear(&TimerKind::ExpiryReload);
        self.tasks.clear();
        self.rows.clear();
        self.generated.clear();
        self.selected_index = 0;
        self.latest_list_seq = None;
        self.loading = false;
        self.list_state = ListState::Loading;
    }

    // ---- generated tasks ----

    pub fn generate_from_summary(&mut self) {
        let Some(meeting_id) = self.location.meeting.clone() else {
            self.show_toast(ToastKind::Error, "Select a meeting first".to_string());
            return;
        };
        if self.generating {
            return;
        }
        if self.send(ApiCommand::Generate { meeting_id }) {
            self.generating = true;
            self.show_toast(ToastKind::Info, "Generating tasks from summary...".to_string());
        }
    }

    /// Add every previewed task and go back to the live list
    pub fn accept_generated(&mut self) {
        if self.list_state != ListState::Preview {
            return;
        }
        let drafts = std::mem::take(&mut self.generated);
        let count = drafts.len();
        for draft in drafts {
            if !self.send(ApiCommand::Add {
                draft,
                kind: AddKind::Generated,
            }) {
                break;
            }
        }
        self.show_toast(ToastKind::Info, format!("Adding {} tasks", count));
        self.load_tasks();
    }

    /// Add only the selected previewed task
    pub fn accept_selected_generated(&mut self) {
        if self.list_state != ListState::Preview || self.selected_index >= self.generated.len() {
            return;
        }
        let draft = self.generated.remove(self.selected_index);
        let title = draft.title.clone();
        if !self.send(ApiCommand::Add {
                draft,
                kind: AddKind::Generated,
            }) {
            return;
        }
        self.show_toast(ToastKind::Info, format!("Adding \"{}\"", title));

        if self.generated.is_empty() {
            self.load_tasks();
        } else {
            self.render_preview();
        }
    }

    pub fn discard_preview(&mut self) {
        if self.list_state == ListState::Preview {
            self.load_tasks();
        }
    }
}
