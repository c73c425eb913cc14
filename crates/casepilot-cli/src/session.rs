//! Session file: the whole [`AppState`] as pretty JSON, loaded and stored per invocation.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::Path;

use anyhow::Context;
use casepilot_core::AppState;
use tracing::{debug, info};

/// Read the session, or start empty if the file does not exist yet.
pub fn load(path: &Path) -> anyhow::Result<AppState> {
    let bytes = match fs::read(path) {
        Ok(b) => b,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!(path = %path.display(), "no session file, starting fresh");
            return Ok(AppState::default());
        }
        Err(e) => {
            return Err(e).with_context(|| format!("reading session {}", path.display()));
        }
    };
    let state: AppState = serde_json::from_slice(&bytes)
        .with_context(|| format!("parsing session {}", path.display()))?;
    debug!(path = %path.display(), cases = state.cases.len(), "loaded session");
    Ok(state)
}

/// Write the session through a sibling temp file so a crash never truncates it.
pub fn save(path: &Path, state: &AppState) -> anyhow::Result<()> {
    let json = serde_json::to_vec_pretty(state).context("serialising session")?;
    let dir = path
        .parent()
        .filter(|d| !d.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    let mut tmp = tempfile::NamedTempFile::new_in(dir)
        .with_context(|| format!("creating temp file in {}", dir.display()))?;
    tmp.write_all(&json)
        .with_context(|| format!("writing {}", tmp.path().display()))?;
    tmp.persist(path)
        .with_context(|| format!("replacing session {}", path.display()))?;
    info!(path = %path.display(), "saved session");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use casepilot_core::CaseRecord;
    use chrono::NaiveDate;

    #[test]
    fn missing_file_is_fresh_state() {
        let dir = tempfile::tempdir().unwrap();
        let state = load(&dir.path().join("nope.json")).unwrap();
        assert_eq!(state, AppState::default());
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.json");
        let mut state = AppState::default();
        state.cases.push(CaseRecord {
            cino: Some("KA01".into()),
            date_next_list: NaiveDate::from_ymd_opt(2024, 3, 15),
            ..Default::default()
        });
        state.settings.api_key = Some("secret".into());
        state.pinned_cases.insert("KA01".into());

        save(&path, &state).unwrap();
        let names: Vec<String> = fs::read_dir(path.parent().unwrap())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["session.json".to_string()]);
        assert_eq!(load(&path).unwrap(), state);
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, b"{nope").unwrap();
        let err = load(&path).unwrap_err();
        assert!(err.to_string().contains("parsing session"));
    }
}
