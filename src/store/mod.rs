use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use fs_err as fs;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::debug;

use crate::errors::RelayError;

const INDEX_FILE: &str = "index.json";

/// Lengths further apart than this fraction of the larger one mean a new task.
const LENGTH_DIFF_THRESHOLD: f64 = 0.5;
/// Word-set overlap below this fraction of the larger set means a new task.
const OVERLAP_THRESHOLD: f64 = 0.3;

static SCRIPT_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"@nightyScript\(\s*name\s*=\s*"([^"]+)""#).expect("valid regex"));

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionRecord {
    pub created_at: DateTime<Utc>,
    pub file_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_text: Option<String>,
}

/// script name -> version -> record. Persisted whole; rewritten on every
/// mutation.
pub type VersionIndex = BTreeMap<String, BTreeMap<u32, VersionRecord>>;

#[derive(Debug, Clone)]
pub struct StoredVersion {
    pub script_name: String,
    pub version: u32,
    pub path: PathBuf,
    /// Whether the prompt substantially diverged from the last one recorded
    /// for this script. Annotation only; never gates version assignment.
    pub prompt_changed: bool,
}

/// Versioned storage for generated scripts. All index access goes through a
/// single mutex so in-process writers cannot interleave the read-modify-write
/// cycle.
pub struct VersionStore {
    root: PathBuf,
    guard: Mutex<()>,
}

impl VersionStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into(), guard: Mutex::new(()) }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn index_path(&self) -> PathBuf {
        self.root.join(INDEX_FILE)
    }

    fn load_index(&self) -> Result<VersionIndex, RelayError> {
        let path = self.index_path();
        if !path.exists() {
            return Ok(VersionIndex::new());
        }
        let raw = fs::read_to_string(&path)?;
        let index = serde_json::from_str(&raw)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        Ok(index)
    }

    /// Assign the next version for the code's script name, write the version
    /// file, and rewrite the index. Returns what was written plus the
    /// change-detection annotation for the supplied prompt.
    pub fn record(&self, code: &str, prompt: Option<&str>) -> Result<StoredVersion, RelayError> {
        let _held = self.guard.lock();

        fs::create_dir_all(&self.root)?;
        let mut index = self.load_index()?;

        let script_name = script_name_for(code);
        let versions = index.entry(script_name.clone()).or_default();
        let version = versions.len() as u32 + 1;
        let prompt_changed = prompt_differs_from_last(versions, prompt);

        let path = self.root.join(format!("{script_name}_v{version}.py"));
        write_atomic(&self.root, &path, code.as_bytes())?;

        versions.insert(
            version,
            VersionRecord {
                created_at: Utc::now(),
                file_path: path.display().to_string(),
                prompt_text: prompt.map(|p| p.to_string()),
            },
        );
        let serialized = serde_json::to_string_pretty(&index)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        write_atomic(&self.root, &self.index_path(), serialized.as_bytes())?;

        debug!(
            script = %script_name,
            version,
            prompt_changed,
            "recorded generated script"
        );
        Ok(StoredVersion { script_name, version, path, prompt_changed })
    }
}

fn write_atomic(dir: &Path, dest: &Path, data: &[u8]) -> Result<(), RelayError> {
    let tmp = NamedTempFile::new_in(dir)?;
    fs::write(tmp.path(), data)?;
    tmp.persist(dest).map_err(|e| e.error)?;
    Ok(())
}

/// The name declared in the script's metadata decorator, if present.
pub fn declared_script_name(code: &str) -> Option<String> {
    SCRIPT_NAME
        .captures(code)
        .map(|c| normalize_name(&c[1]))
        .filter(|n| !n.is_empty())
}

/// Declared name or a timestamp fallback when the code declares none.
pub fn script_name_for(code: &str) -> String {
    declared_script_name(code)
        .unwrap_or_else(|| format!("script_{}", Utc::now().format("%Y%m%d_%H%M%S")))
}

fn normalize_name(raw: &str) -> String {
    raw.to_lowercase().split_whitespace().collect::<Vec<_>>().join("_")
}

fn prompt_differs_from_last(versions: &BTreeMap<u32, VersionRecord>, prompt: Option<&str>) -> bool {
    let new_prompt = match prompt {
        Some(p) => p,
        None => return true,
    };
    let previous = versions
        .values()
        .next_back()
        .and_then(|rec| rec.prompt_text.as_deref());
    match previous {
        Some(prev) => prompts_differ(prev, new_prompt),
        // No prior prompt: fail open toward a fresh generation.
        None => true,
    }
}

/// Two-signal divergence test: relative length difference above 50% of the
/// larger prompt, or lower-cased word-set overlap below 30% of the larger set.
pub fn prompts_differ(previous: &str, new: &str) -> bool {
    let (a, b) = (previous.len() as f64, new.len() as f64);
    let larger = a.max(b);
    if larger == 0.0 {
        return false;
    }
    if (a - b).abs() > LENGTH_DIFF_THRESHOLD * larger {
        return true;
    }

    let prev_words: std::collections::HashSet<String> =
        previous.to_lowercase().split_whitespace().map(String::from).collect();
    let new_words: std::collections::HashSet<String> =
        new.to_lowercase().split_whitespace().map(String::from).collect();
    let larger_set = prev_words.len().max(new_words.len());
    if larger_set == 0 {
        return false;
    }
    let overlap = prev_words.intersection(&new_words).count() as f64 / larger_set as f64;
    overlap < OVERLAP_THRESHOLD
}
