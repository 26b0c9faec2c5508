use anyhow::{Context, Result};
use std::env;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

const APP_DIR_NAME: &str = ".meetask";

/// Get the app directory - checks for local .meetask first, then falls back to global ~/.meetask
pub fn get_app_dir() -> Result<PathBuf> {
    let current_dir = env::current_dir().context("Could not determine current directory")?;

    if let Some(local_dir) = find_local_app_dir(&current_dir) {
        return Ok(local_dir);
    }

    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(APP_DIR_NAME))
}

/// Find local .meetask directory by walking up the directory tree
fn find_local_app_dir(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir;

    loop {
        let app_dir = current.join(APP_DIR_NAME);
        if app_dir.is_dir() {
            return Some(app_dir);
        }

        current = current.parent()?;
    }
}

/// Ensure the app directory exists
pub fn ensure_app_dir() -> Result<PathBuf> {
    let dir = get_app_dir()?;
    if !dir.exists() {
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
    }
    Ok(dir)
}

/// Initialize a local .meetask directory in the current directory
pub fn init_local_app_dir() -> Result<PathBuf> {
    let current_dir = env::current_dir().context("Could not determine current directory")?;
    let app_dir = current_dir.join(APP_DIR_NAME);

    if app_dir.exists() {
        anyhow::bail!("Directory already exists: {}", app_dir.display());
    }

    fs::create_dir_all(&app_dir)
        .with_context(|| format!("Failed to create directory: {}", app_dir.display()))?;

    Ok(app_dir)
}

/// Path to config.json
pub fn config_file() -> Result<PathBuf> {
    Ok(ensure_app_dir()?.join("config.json"))
}

/// Path to session.json (last viewed location)
pub fn session_file() -> Result<PathBuf> {
    Ok(ensure_app_dir()?.join("session.json"))
}

/// Path to the TUI log file
pub fn log_file() -> Result<PathBuf> {
    Ok(ensure_app_dir()?.join("meetask.log"))
}

/// Atomically write content to a file using temp file + rename
pub fn atomic_write<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
    let path = path.as_ref();
    let dir = path
        .parent()
        .context("File path has no parent directory")?;

    let mut temp_file = NamedTempFile::new_in(dir)
        .context("Failed to create temporary file")?;

    temp_file
        .write_all(content.as_bytes())
        .context("Failed to write to temporary file")?;

    temp_file
        .as_file()
        .sync_all()
        .context("Failed to sync temporary file")?;

    temp_file
        .persist(path)
        .with_context(|| format!("Failed to persist file: {}", path.display()))?;

    Ok(())
}

/// Read file content, return empty string if file doesn't exist
pub fn read_file<P: AsRef<Path>>(path: P) -> Result<String> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(String::new());
    }
    fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_local_app_dir_walks_up() {
        let temp_dir = tempfile::tempdir().unwrap();
        let app_dir = temp_dir.path().join(APP_DIR_NAME);
        fs::create_dir_all(&app_dir).unwrap();
        let nested = temp_dir.path().join("a").join("b");
        fs::create_dir_all(&nested).unwrap();

        assert_eq!(find_local_app_dir(&nested), Some(app_dir));
    }

    #[test]
    fn test_find_local_app_dir_ignores_plain_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let bogus = temp_dir.path().join(APP_DIR_NAME);
        fs::write(&bogus, "not a directory").unwrap();

        let found = find_local_app_dir(temp_dir.path());
        assert_ne!(found, Some(bogus));
    }

    #[test]
    fn test_atomic_write_and_read() {
        let temp_dir = tempfile::tempdir().unwrap();
        let test_file = temp_dir.path().join("test.txt");

        atomic_write(&test_file, "Hello, world!").unwrap();
        atomic_write(&test_file, "replaced").unwrap();

        assert_eq!(read_file(&test_file).unwrap(), "replaced");
    }

    #[test]
    fn test_read_nonexistent_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let test_file = temp_dir.path().join("nonexistent.txt");

        let content = read_file(&test_file).unwrap();
        assert_eq!(content, "");
    }
}
