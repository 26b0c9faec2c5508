use super::task::parse_timestamp;
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone};
use thiserror::Error;

/// Local validation failures of the add/edit form
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("Title is required")]
    EmptyTitle,
    #[error("Invalid deadline \"{0}\" (use YYYY-MM-DD HH:MM)")]
    InvalidDeadline(String),
}

/// Validated form contents
#[derive(Debug, Clone, PartialEq)]
pub struct TaskFields {
    pub title: String,
    pub content: String,
    pub deadline: Option<DateTime<Local>>,
}

/// Parse the deadline field. Empty means no deadline.
pub fn parse_deadline_input(raw: &str) -> Result<Option<DateTime<Local>>, FormError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }

    for fmt in ["%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Local
                .from_local_datetime(&naive)
                .earliest()
                .map(Some)
                .ok_or_else(|| FormError::InvalidDeadline(raw.to_string()));
        }
    }

    if NaiveDate::parse_from_str(raw, "%Y-%m-%d").is_ok() {
        return Ok(parse_timestamp(raw));
    }

    Err(FormError::InvalidDeadline(raw.to_string()))
}

/// Check the raw form fields and produce what is sent to the server
pub fn validate_task_fields(
    title: &str,
    content: &str,
    deadline: &str,
) -> Result<TaskFields, FormError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(FormError::EmptyTitle);
    }

    Ok(TaskFields {
        title: title.to_string(),
        content: content.trim().to_string(),
        deadline: parse_deadline_input(deadline)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn test_deadline_formats() {
        let spaced = parse_deadline_input("2025-03-01 14:30").unwrap().unwrap();
        assert_eq!((spaced.hour(), spaced.minute()), (14, 30));

        let with_t = parse_deadline_input("2025-03-01T14:30").unwrap();
        assert_eq!(with_t, Some(spaced));

        let date_only = parse_deadline_input("2025-03-01").unwrap().unwrap();
        assert_eq!((date_only.hour(), date_only.minute()), (0, 0));

        assert_eq!(parse_deadline_input("   ").unwrap(), None);
    }

    #[test]
    fn test_invalid_deadline() {
        assert_eq!(
            parse_deadline_input("next friday"),
            Err(FormError::InvalidDeadline("next friday".to_string()))
        );
        assert!(parse_deadline_input("2025-13-01").is_err());
    }

    #[test]
    fn test_validate_rejects_blank_title() {
        assert_eq!(
            validate_task_fields("   ", "notes", ""),
            Err(FormError::EmptyTitle)
        );

        let fields = validate_task_fields("  Ship report ", " draft ", "").unwrap();
        assert_eq!(fields.title, "Ship report");
        assert_eq!(fields.content, "draft");
        assert_eq!(fields.deadline, None);
    }
}
