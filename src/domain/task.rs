use chrono::{DateTime, Datelike, Local, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// A task as returned by the task API
///
/// The server owns tasks; this is the transient copy from the last list query.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Task {
    #[serde(default, deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default, deserialize_with = "deserialize_text")]
    pub title: String,
    #[serde(default, deserialize_with = "deserialize_text")]
    pub content: String,
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    pub deadline: Option<DateTime<Local>>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    pub created_at: Option<DateTime<Local>>,
}

impl Task {
    /// Title for display, falling back when the server sent none
    pub fn display_title(&self) -> &str {
        if self.title.trim().is_empty() {
            "(untitled)"
        } else {
            &self.title
        }
    }
}

/// Payload for the `add` action, also the shape of generated tasks
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskDraft {
    pub title: String,
    pub content: String,
    #[serde(serialize_with = "serialize_timestamp")]
    pub deadline: Option<DateTime<Local>>,
}

impl TaskDraft {
    /// Preview a draft as a task row (no id, not completed)
    pub fn to_preview_task(&self) -> Task {
        Task {
            id: String::new(),
            title: self.title.clone(),
            content: self.content.clone(),
            deadline: self.deadline,
            completed: false,
            created_at: None,
        }
    }
}

/// Payload for the `update` action. Only set fields are sent.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct TaskPatch {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// `Some(None)` clears the deadline on the server
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_deadline_change"
    )]
    pub deadline: Option<Option<DateTime<Local>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

impl TaskPatch {
    pub fn completion(id: &str, completed: bool) -> Self {
        Self {
            id: id.to_string(),
            completed: Some(completed),
            ..Self::default()
        }
    }
}

/// Payload for the `delete` action
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskRef {
    pub id: String,
}

/// Parse a timestamp in any of the formats the server (or a user) may send.
///
/// Naive forms are read as local time. Go's zero time and empty strings
/// count as absent.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Local>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    let parsed = if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        Some(dt.with_timezone(&Local))
    } else {
        parse_naive_local(raw)
    };

    parsed.filter(|dt| dt.year() > 1)
}

fn parse_naive_local(raw: &str) -> Option<DateTime<Local>> {
    const FORMATS: [&str; 6] = [
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M",
    ];

    for fmt in FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Local.from_local_datetime(&naive).earliest();
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .and_then(|naive| Local.from_local_datetime(&naive).earliest())
}

/// Wire format for outgoing timestamps
pub fn format_wire_timestamp(dt: &DateTime<Local>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Secs, false)
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Local>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_timestamp))
}

fn deserialize_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.unwrap_or_default())
}

// Ids are strings in practice, but numeric ids show up from some storages.
fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Null => Ok(String::new()),
        other => Err(serde::de::Error::custom(format!(
            "unexpected task id: {}",
            other
        ))),
    }
}

fn serialize_timestamp<S>(value: &Option<DateTime<Local>>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match value {
        Some(dt) => serializer.serialize_str(&format_wire_timestamp(dt)),
        None => serializer.serialize_none(),
    }
}

fn serialize_deadline_change<S>(
    value: &Option<Option<DateTime<Local>>>,
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match value {
        Some(inner) => serialize_timestamp(inner, serializer),
        None => serializer.serialize_none(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn test_parse_timestamp_formats() {
        let rfc = parse_timestamp("2025-05-01T14:30:00+08:00").unwrap();
        assert_eq!(rfc.timestamp(), 1746081000);

        let naive = parse_timestamp("2025-05-01 14:30").unwrap();
        assert_eq!(naive.hour(), 14);
        assert_eq!(naive.minute(), 30);

        let t_sep = parse_timestamp("2025-05-01T09:05").unwrap();
        assert_eq!(t_sep.hour(), 9);

        let date_only = parse_timestamp("2025-05-01").unwrap();
        assert_eq!(date_only.hour(), 0);
    }

    #[test]
    fn test_parse_timestamp_absent_values() {
        assert!(parse_timestamp("").is_none());
        assert!(parse_timestamp("   ").is_none());
        assert!(parse_timestamp("0001-01-01T00:00:00Z").is_none());
        assert!(parse_timestamp("next friday").is_none());
    }

    #[test]
    fn test_task_deserialize_lenient() {
        let json = r#"{
            "id": 42,
            "title": "Write report",
            "content": null,
            "deadline": "",
            "completed": true,
            "created_at": "2025-05-01T10:00:00Z"
        }"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert_eq!(task.id, "42");
        assert_eq!(task.content, "");
        assert!(task.deadline.is_none());
        assert!(task.completed);
        assert!(task.created_at.is_some());
    }

    #[test]
    fn test_task_deserialize_minimal() {
        let task: Task = serde_json::from_str(r#"{"id": "a1"}"#).unwrap();
        assert_eq!(task.id, "a1");
        assert_eq!(task.display_title(), "(untitled)");
        assert!(!task.completed);
    }

    #[test]
    fn test_patch_serializes_only_changed_fields() {
        let patch = TaskPatch::completion("t1", true);
        let json = serde_json::to_value(&patch).unwrap();
        assert_eq!(json, serde_json::json!({"id": "t1", "completed": true}));
    }

    #[test]
    fn test_patch_can_clear_deadline() {
        let patch = TaskPatch {
            id: "t1".to_string(),
            title: Some("Title".to_string()),
            content: Some(String::new()),
            deadline: Some(None),
            completed: None,
        };
        let json = serde_json::to_value(&patch).unwrap();
        assert_eq!(json["deadline"], Value::Null);
        assert!(json.get("completed").is_none());
    }

    #[test]
    fn test_draft_serializes_deadline() {
        let deadline = parse_timestamp("2025-05-01T14:30:00+00:00");
        let draft = TaskDraft {
            title: "Ship".to_string(),
            content: String::new(),
            deadline,
        };
        let json = serde_json::to_value(&draft).unwrap();
        let sent = json["deadline"].as_str().unwrap();
        assert_eq!(parse_timestamp(sent), deadline);

        let no_deadline = TaskDraft { deadline: None, ..draft };
        let json = serde_json::to_value(&no_deadline).unwrap();
        assert_eq!(json["deadline"], Value::Null);
    }
}
