use super::types::RecallState;
use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Get the default recall state file path (~/.config/scorecard/recall.json)
pub fn get_recall_path() -> PathBuf {
    crate::config::get_config_dir().join("recall.json")
}

/// Load recall state from a JSON file
///
/// If the file doesn't exist, returns a new empty state.
/// If the file exists but has an unsupported version, returns an error.
pub fn load_recall_state(path: &Path) -> Result<RecallState> {
    if !path.exists() {
        return Ok(RecallState::new());
    }

    let file = File::open(path)
        .with_context(|| format!("Failed to open recall state file at {}", path.display()))?;

    let state: RecallState =
        serde_json::from_reader(file).context("Failed to load recall state")?;

    // Version check
    if state.version != 1 {
        anyhow::bail!("Unsupported recall state version: {}", state.version);
    }

    Ok(state)
}

/// Save recall state to a JSON file atomically
///
/// Uses atomic-write-file so the file is never left in a corrupted state.
/// Creates the config directory if it doesn't exist.
pub fn save_recall_state(path: &Path, state: &RecallState) -> Result<()> {
    crate::config::ensure_config_dir()?;

    let mut file = AtomicWriteFile::open(path)
        .with_context(|| format!("Failed to open atomic write file at {}", path.display()))?;

    serde_json::to_writer_pretty(&mut file, state).context("Failed to serialize recall state")?;

    file.commit().context("Failed to save recall state")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn test_load_missing_file_returns_empty() {
        let temp_path = env::temp_dir().join("scorecard_test_missing.json");
        let _ = std::fs::remove_file(&temp_path);

        let state = load_recall_state(&temp_path).unwrap();
        assert_eq!(state.version, 1);
        assert!(state.entries.is_empty());
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let temp_path = env::temp_dir().join("scorecard_test_roundtrip.json");
        let _ = std::fs::remove_file(&temp_path);

        let mut state = RecallState::new();
        state
            .remember("snow-day", &serde_json::json!({"snowfall": 5.0}))
            .unwrap();
        state
            .remember("gpa", &serde_json::json!(["Algebra:A:3"]))
            .unwrap();

        save_recall_state(&temp_path, &state).unwrap();
        let loaded = load_recall_state(&temp_path).unwrap();

        assert_eq!(loaded.version, 1);
        assert_eq!(loaded.entries.len(), 2);
        assert!(loaded.entries.contains_key("snow-day"));
        assert!(loaded.entries.contains_key("gpa"));

        let _ = std::fs::remove_file(&temp_path);
    }
}
