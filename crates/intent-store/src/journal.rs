use std::io::Write;
use std::path::Path;

use intent_core::Route;
use tempfile::NamedTempFile;

use crate::error::StoreError;

/// Loads the route journal (a JSON array of routes). A missing file means an
/// empty store; a present-but-unparseable file is a journal corruption.
pub fn load(path: &Path) -> Result<Vec<Route>, StoreError> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let content = std::fs::read_to_string(path).map_err(|e| StoreError::JournalRead {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    serde_json::from_str(&content).map_err(|e| StoreError::JournalRead {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

/// Replaces the journal file atomically: write to a temp file in the same
/// directory, then rename over the target. Readers of the journal never
/// observe a partially written file.
pub fn save(path: &Path, routes: &[Route]) -> Result<(), StoreError> {
    let content = serde_json::to_string_pretty(routes).map_err(|e| StoreError::JournalWrite {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;

    let dir = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or_else(|| Path::new("."));
    let mut temp = NamedTempFile::new_in(dir).map_err(|e| StoreError::JournalWrite {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    temp.write_all(content.as_bytes())
        .map_err(|e| StoreError::JournalWrite {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
    temp.persist(path).map_err(|e| StoreError::JournalWrite {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use intent_core::Route;

    fn sample_route(id: u32) -> Route {
        Route {
            id,
            name: "weather".into(),
            description: "".into(),
            utterances: vec!["how's the weather".to_string()],
            negative_samples: vec![],
            score_threshold: 0.5,
            negative_threshold: 0.9,
        }
    }

    #[test]
    fn load_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("routes.json");
        assert_eq!(load(&path).unwrap(), Vec::new());
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("routes.json");
        let routes = vec![sample_route(1), sample_route(2)];
        save(&path, &routes).unwrap();
        let loaded = load(&path).unwrap();
        assert_eq!(loaded, routes);
    }

    #[test]
    fn save_overwrites_previous_content_atomically() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("routes.json");
        save(&path, &[sample_route(1)]).unwrap();
        save(&path, &[sample_route(2)]).unwrap();
        let loaded = load(&path).unwrap();
        assert_eq!(loaded, vec![sample_route(2)]);
    }

    #[test]
    fn load_corrupt_journal_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("routes.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(load(&path).is_err());
    }
}
