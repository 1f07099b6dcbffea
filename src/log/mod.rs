use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, Utc};
use humansize::{format_size, DECIMAL};
use parking_lot::Mutex;
use serde::Serialize;
use uuid::Uuid;

const MAX_ENTRIES: usize = 100;

/// One request's diagnostic record. Created pending, completed in place.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub method: String,
    pub url: String,
    /// None while the request is still in flight.
    pub status: Option<u16>,
    pub model: String,
    pub ai_time: Option<String>,
    pub file: Option<String>,
    pub size: Option<String>,
    pub prompt: String,
}

/// In-memory, newest-first request log for the dashboard. Not persisted;
/// resets on restart.
pub struct RequestLog {
    entries: Mutex<Vec<LogEntry>>,
}

impl RequestLog {
    pub fn new() -> Self {
        Self { entries: Mutex::new(Vec::new()) }
    }

    /// Append a pending entry and hand back its id for the completion call.
    pub fn begin(&self, method: &str, url: &str, model: &str, prompt: &str) -> String {
        let id = format!(
            "{}-{}",
            Utc::now().timestamp_millis(),
            &Uuid::new_v4().simple().to_string()[..6]
        );
        let entry = LogEntry {
            id: id.clone(),
            timestamp: Utc::now(),
            method: method.to_string(),
            url: url.to_string(),
            status: None,
            model: model.to_string(),
            ai_time: None,
            file: None,
            size: None,
            prompt: prompt.to_string(),
        };
        let mut entries = self.entries.lock();
        entries.insert(0, entry);
        entries.truncate(MAX_ENTRIES);
        id
    }

    /// Merge the final state of a successful request into its pending entry.
    pub fn complete(
        &self,
        id: &str,
        status: u16,
        ai_time: Option<Duration>,
        file: Option<&Path>,
        size_bytes: Option<u64>,
    ) {
        let mut entries = self.entries.lock();
        if let Some(entry) = entries.iter_mut().find(|e| e.id == id) {
            entry.status = Some(status);
            entry.ai_time = ai_time.map(format_ai_time);
            entry.file = file.map(shorten_path);
            entry.size = size_bytes.map(|b| format_size(b, DECIMAL));
        }
    }

    pub fn fail(&self, id: &str, status: u16) {
        self.complete(id, status, None, None, None);
    }

    /// Newest-first copy for the JSON endpoint and the HTML view.
    pub fn snapshot(&self) -> Vec<LogEntry> {
        self.entries.lock().clone()
    }
}

impl Default for RequestLog {
    fn default() -> Self {
        Self::new()
    }
}

pub fn format_ai_time(elapsed: Duration) -> String {
    let ms = elapsed.as_millis();
    format!("{}s {}ms", ms / 1000, ms % 1000)
}

/// Render paths under the home directory as `~/...`; everything else as-is.
pub fn shorten_path(path: &Path) -> String {
    if let Some(home) = dirs::home_dir() {
        if let Ok(rest) = path.strip_prefix(&home) {
            return format!("~/{}", rest.display());
        }
    }
    path.display().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn entries_start_pending_and_complete_in_place() {
        let log = RequestLog::new();
        let id = log.begin("POST", "/generate", "m", "do a thing");
        assert_eq!(log.snapshot()[0].status, None);

        log.complete(
            &id,
            200,
            Some(Duration::from_millis(1234)),
            Some(Path::new("/tmp/x_v1.py")),
            Some(2048),
        );
        let entry = &log.snapshot()[0];
        assert_eq!(entry.status, Some(200));
        assert_eq!(entry.ai_time.as_deref(), Some("1s 234ms"));
        assert!(entry.file.as_deref().unwrap().ends_with("x_v1.py"));
        assert!(entry.size.is_some());
    }

    #[test]
    fn newest_entry_comes_first() {
        let log = RequestLog::new();
        log.begin("POST", "/generate", "m", "first");
        log.begin("POST", "/fixcode", "m", "second");
        let entries = log.snapshot();
        assert_eq!(entries[0].prompt, "second");
        assert_eq!(entries[1].prompt, "first");
    }

    #[test]
    fn log_is_capped() {
        let log = RequestLog::new();
        for i in 0..(MAX_ENTRIES + 20) {
            log.begin("POST", "/generate", "m", &format!("p{i}"));
        }
        assert_eq!(log.snapshot().len(), MAX_ENTRIES);
    }

    #[test]
    fn ai_time_renders_seconds_and_millis() {
        assert_eq!(format_ai_time(Duration::from_millis(0)), "0s 0ms");
        assert_eq!(format_ai_time(Duration::from_millis(999)), "0s 999ms");
        assert_eq!(format_ai_time(Duration::from_millis(61_005)), "61s 5ms");
    }

    #[test]
    fn paths_under_home_are_shortened() {
        if let Some(home) = dirs::home_dir() {
            let inside: PathBuf = home.join("versions/x_v1.py");
            assert_eq!(shorten_path(&inside), "~/versions/x_v1.py");
        }
        assert_eq!(shorten_path(Path::new("/srv/out.py")), "/srv/out.py");
    }
}
