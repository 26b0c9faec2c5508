//! Request and response shapes of the task API.
//!
//! The server has answered list queries with several layouts over time.
//! They are all decoded here, once, into [`TaskListing`]; nothing past this
//! module looks at raw JSON.

use super::ApiError;
use crate::domain::{parse_timestamp, FilterParams, Task, TaskDraft, TaskPatch, TaskRef};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Title used for generated tasks that come without one
pub const GENERATED_FALLBACK_TITLE: &str = "新任务";

/// Marker the summarizer uses for "no due date"
const NOT_MENTIONED: &str = "未提及";

/// One POST body. The `action` field selects the operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ApiRequest {
    List { list: ListParams },
    Add { task: TaskDraft },
    Update { task: TaskPatch },
    Delete { task: TaskRef },
    GenerateFromSummary { list: GenerateParams },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meeting_id: Option<String>,
    #[serde(flatten)]
    pub filter: FilterParams,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerateParams {
    pub meeting_id: String,
}

/// Where in the response the task array was found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskListShape {
    /// The whole body is an array
    BareArray,
    /// `task_list: [...]`
    TaskList,
    /// `tasks: [...]`
    Tasks,
    /// `data: [...]`
    Data,
    /// `task_list: {tasks: [...]}`
    NestedTasks,
    /// `task_list: {data: [...]}`
    NestedData,
}

/// A decoded list response
#[derive(Debug, Clone, PartialEq)]
pub struct TaskListing {
    pub shape: TaskListShape,
    pub tasks: Vec<Task>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ListBody {
    Bare(Vec<Task>),
    Envelope(ListEnvelope),
}

#[derive(Debug, Deserialize)]
struct ListEnvelope {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    task_list: Option<TaskListField>,
    #[serde(default)]
    tasks: Option<Vec<Task>>,
    #[serde(default)]
    data: Option<Vec<Task>>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TaskListField {
    Flat(Vec<Task>),
    Nested {
        #[serde(default)]
        tasks: Option<Vec<Task>>,
        #[serde(default)]
        data: Option<Vec<Task>>,
    },
}

/// Common `{status, error}` envelope of mutating actions
#[derive(Debug, Deserialize)]
struct Ack {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

fn is_success(status: &Option<String>) -> bool {
    status.as_deref() == Some("success")
}

fn business_error(error: Option<String>) -> ApiError {
    ApiError::Business(
        error
            .filter(|e| !e.trim().is_empty())
            .unwrap_or_else(|| "unknown error".to_string()),
    )
}

/// Decode a list response body
pub fn decode_list(body: &str) -> Result<TaskListing, ApiError> {
    let parsed: ListBody =
        serde_json::from_str(body).map_err(|e| ApiError::Parse(e.to_string()))?;

    let envelope = match parsed {
        ListBody::Bare(tasks) => {
            return Ok(TaskListing {
                shape: TaskListShape::BareArray,
                tasks,
            })
        }
        ListBody::Envelope(envelope) => envelope,
    };

    if !is_success(&envelope.status) {
        return Err(business_error(envelope.error));
    }

    let listing = match (envelope.task_list, envelope.tasks, envelope.data) {
        (Some(TaskListField::Flat(tasks)), _, _) => (TaskListShape::TaskList, tasks),
        (_, Some(tasks), _) => (TaskListShape::Tasks, tasks),
        (_, _, Some(tasks)) => (TaskListShape::Data, tasks),
        (Some(TaskListField::Nested { tasks: Some(tasks), .. }), _, _) => {
            (TaskListShape::NestedTasks, tasks)
        }
        (Some(TaskListField::Nested { data: Some(tasks), .. }), _, _) => {
            (TaskListShape::NestedData, tasks)
        }
        _ => {
            return Err(ApiError::Parse(
                "success response carried no task list".to_string(),
            ))
        }
    };

    Ok(TaskListing {
        shape: listing.0,
        tasks: listing.1,
    })
}

/// Decode the `{status, error}` answer of add/update/delete
pub fn decode_ack(body: &str) -> Result<(), ApiError> {
    let ack: Ack = serde_json::from_str(body).map_err(|e| ApiError::Parse(e.to_string()))?;
    if is_success(&ack.status) {
        Ok(())
    } else {
        Err(business_error(ack.error))
    }
}

/// Pull the `error` text out of a failed response body, if it has one
pub fn error_text(body: &str) -> Option<String> {
    serde_json::from_str::<Ack>(body)
        .ok()
        .and_then(|ack| ack.error)
        .filter(|e| !e.trim().is_empty())
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum GeneratedPayload {
    Structured(Vec<GeneratedItem>),
    Text(String),
    Message(LlmMessage),
}

#[derive(Debug, Deserialize)]
struct GeneratedItem {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    due_date: Option<String>,
}

impl GeneratedItem {
    fn into_draft(self) -> TaskDraft {
        let title = self
            .title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| GENERATED_FALLBACK_TITLE.to_string());
        let content = self
            .description
            .filter(|d| !d.is_empty())
            .or(self.content)
            .unwrap_or_default();
        TaskDraft {
            title,
            content,
            deadline: self.due_date.as_deref().and_then(parse_timestamp),
        }
    }
}

// Raw model output passed through by the summarizer:
// {"Choices":[{"Message":{"Content":{"StringValue":"..."}}}]}
#[derive(Debug, Deserialize)]
struct LlmMessage {
    #[serde(rename = "Choices")]
    choices: Vec<LlmChoice>,
}

#[derive(Debug, Deserialize)]
struct LlmChoice {
    #[serde(rename = "Message")]
    message: LlmChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct LlmChoiceMessage {
    #[serde(rename = "Content")]
    content: LlmContent,
}

#[derive(Debug, Deserialize)]
struct LlmContent {
    #[serde(rename = "StringValue")]
    string_value: String,
}

/// Decode a generate-from-summary response into task drafts
pub fn decode_generated(body: &str) -> Result<Vec<TaskDraft>, ApiError> {
    let value: Value = serde_json::from_str(body).map_err(|e| ApiError::Parse(e.to_string()))?;

    let status = value.get("status").and_then(Value::as_str);
    if status != Some("success") {
        let error = value.get("error").and_then(Value::as_str).map(str::to_string);
        return Err(business_error(error));
    }

    let raw = match value.get("task_list") {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(raw) => raw.clone(),
    };

    let payload: GeneratedPayload = serde_json::from_value(raw)
        .map_err(|e| ApiError::Parse(format!("unexpected task_list: {}", e)))?;

    match payload {
        GeneratedPayload::Structured(items) => {
            Ok(items.into_iter().map(GeneratedItem::into_draft).collect())
        }
        GeneratedPayload::Text(text) => parse_tasks_from_text(&text),
        GeneratedPayload::Message(message) => match message.choices.into_iter().next() {
            Some(choice) => parse_tasks_from_text(&choice.message.content.string_value),
            None => Ok(Vec::new()),
        },
    }
}

/// Parse the summarizer's numbered free-text list:
///
/// `1. 任务描述：<title>，负责人：<owner>，完成时间：<when>`
///
/// A `<when>` of 未提及 means no deadline. Other values that do not parse as
/// a date are kept in the content.
pub fn parse_tasks_from_text(text: &str) -> Result<Vec<TaskDraft>, ApiError> {
    let task_re = Regex::new(r"(\d+)\.\s*任务描述：([^，]+)，负责人：([^，]+)，完成时间：([^\n]+)")
        .map_err(|e| ApiError::Parse(format!("internal regex compile failure: {}", e)))?;

    let drafts = task_re
        .captures_iter(text)
        .map(|caps| {
            let title = caps[2].trim().to_string();
            let owner = caps[3].trim();
            let when = caps[4].trim();

            let mut content = format!("负责人：{}", owner);
            let deadline = if when == NOT_MENTIONED {
                None
            } else {
                let parsed = parse_timestamp(when);
                if parsed.is_none() {
                    content.push_str(&format!("；完成时间：{}", when));
                }
                parsed
            };

            TaskDraft {
                title,
                content,
                deadline,
            }
        })
        .collect();

    Ok(drafts)
}
