use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// What is remembered between runs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Last location query string, e.g. `meeting=m1&sort=deadline`
    #[serde(default)]
    pub location: String,
    /// RFC3339 time of the last save
    #[serde(default)]
    pub saved_at: Option<String>,
}

impl Session {
    pub fn new(location: String) -> Self {
        Self {
            location,
            saved_at: Some(chrono::Local::now().to_rfc3339()),
        }
    }
}

/// Load the session; a missing file is an empty session
pub fn load_session<P: AsRef<Path>>(path: P) -> Result<Session> {
    let path = path.as_ref();
    let content = crate::persistence::read_file(path)?;
    if content.trim().is_empty() {
        return Ok(Session::default());
    }

    let session: Session = serde_json::from_str(&content)
        .with_context(|| format!("Invalid session file: {}", path.display()))?;
    Ok(session)
}

pub fn save_session<P: AsRef<Path>>(path: P, session: &Session) -> Result<()> {
    let json = serde_json::to_string_pretty(session)?;
    crate::persistence::atomic_write(path, &json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_session_is_empty() {
        let temp_dir = tempdir().unwrap();
        let session = load_session(temp_dir.path().join("session.json")).unwrap();
        assert!(session.location.is_empty());
        assert!(session.saved_at.is_none());
    }

    #[test]
    fn test_save_and_load_session() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("session.json");

        save_session(&path, &Session::new("meeting=m1&q=budget".to_string())).unwrap();

        let loaded = load_session(&path).unwrap();
        assert_eq!(loaded.location, "meeting=m1&q=budget");
        assert!(loaded.saved_at.is_some());
    }
}
