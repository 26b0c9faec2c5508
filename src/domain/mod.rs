pub mod enums;
pub mod filter;
pub mod form;
pub mod task;
pub mod views;

pub use enums::{ListState, ToastKind, UiMode};
pub use filter::{FilterParams, History, Location, SortKey};
pub use form::validate_task_fields;
pub use task::{parse_timestamp, Task, TaskDraft, TaskPatch, TaskRef};
pub use views::{build_rows, DeadlineStatus, RowPhase, TaskRow};
