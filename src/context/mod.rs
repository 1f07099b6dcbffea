use fs_err as fs;
use std::path::Path;
use tracing::warn;

use crate::errors::RelayError;

/// Read the primary context document. Required: every generation embeds it,
/// so an unreadable file fails the whole request.
pub fn load_primary(path: &Path) -> Result<String, RelayError> {
    fs::read_to_string(path).map_err(|e| {
        RelayError::Config(format!("Failed to read context file: {e}"))
    })
}

/// Read the UI documentation addendum. Optional: requests proceed without it.
pub fn load_ui_docs(path: &Path) -> Option<String> {
    match fs::read_to_string(path) {
        Ok(text) => Some(text),
        Err(e) => {
            warn!("UI docs unavailable at {}: {e}; continuing without", path.display());
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_primary_context_is_a_config_error() {
        let err = load_primary(Path::new("/nonexistent/prompt-v3.md")).unwrap_err();
        assert!(matches!(err, RelayError::Config(_)));
        assert!(err.to_string().contains("context file"));
    }

    #[test]
    fn missing_ui_docs_is_not_fatal() {
        assert!(load_ui_docs(Path::new("/nonexistent/ui-docs.md")).is_none());
    }

    #[test]
    fn reads_existing_files() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("ctx.md");
        std::fs::write(&p, "reference text").unwrap();
        assert_eq!(load_primary(&p).unwrap(), "reference text");
        assert_eq!(load_ui_docs(&p).as_deref(), Some("reference text"));
    }
}
