/// UI mode for the application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiMode {
    Normal,
    EditingQuery,
    AddingTask,
    EditingTask, // Editing an existing task
    ConfirmDelete,
    SwitchingMeeting,
}

impl UiMode {
    /// Modes that own a text input and swallow printable keys
    pub fn is_text_input(&self) -> bool {
        matches!(
            self,
            Self::EditingQuery | Self::AddingTask | Self::EditingTask | Self::SwitchingMeeting
        )
    }
}

/// Severity of a transient toast message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Info,
    Success,
    Error,
}

/// What the task list pane is currently showing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListState {
    /// No meeting selected yet
    NoMeeting,
    /// First load in flight, nothing to show
    Loading,
    /// Query succeeded with no tasks
    Empty,
    Loaded,
    /// Load failed; holds the message shown in place of the list
    Failed(String),
    /// Showing tasks generated from the meeting summary
    Preview,
}
