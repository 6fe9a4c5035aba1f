//! Session persistence
//!
//! Results are stored as JSON under a per-user data directory, either
//! appended to one array file per test (`pvt.json`, `dsst.json`, ...) or
//! written as one timestamped file per session under `sessions/`. Older
//! per-session files kept elsewhere (a local `data/` folder) can be attached
//! as read-only legacy directories so their history stays visible.
//!
//! Appends read the full existing history, push the new record in memory
//! and rewrite through a temporary file plus rename, so a reader never sees
//! a half-written file and a corrupt history is reported instead of being
//! overwritten.

use crate::error::DataError;
use crate::types::TestKind;
use chrono::{DateTime, Local, SecondsFormat};
use serde::Serialize;
use serde_json::{Map, Value};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use uuid::Uuid;

/// Folder created under the home directory on Unix-like hosts
pub const POSIX_DATA_DIR: &str = "orexin_data";

/// Throwaway file used by the write probe
pub const PROBE_FILE: &str = "test_write.tmp";

/// Subdirectory holding one-file-per-session records
pub const SESSIONS_DIR: &str = "sessions";

/// How records for one test are laid out on disk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreLayout {
    /// `<stem>.json` holding an ordered array, oldest first
    Appending,
    /// `sessions/<stem>_<YYYYmmdd_HHMMSS>.json` holding one object
    PerSession,
}

/// Which layout each test uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LayoutPolicy {
    /// Digit span and sleepiness write per-session files, the rest append
    #[default]
    Legacy,
    /// Every test appends into its array file
    Append,
}

impl LayoutPolicy {
    pub fn layout_for(&self, kind: TestKind) -> StoreLayout {
        match (self, kind) {
            (LayoutPolicy::Legacy, TestKind::DigitSpan | TestKind::Sleepiness) => {
                StoreLayout::PerSession
            }
            _ => StoreLayout::Appending,
        }
    }
}

/// Platform data directory for the current user
pub fn resolve_data_directory() -> Result<PathBuf, DataError> {
    let home = dirs::home_dir().ok_or(DataError::NoHomeDirectory)?;
    Ok(data_directory_under(&home))
}

/// Data directory relative to a given home directory
pub fn data_directory_under(home: &Path) -> PathBuf {
    if cfg!(windows) {
        home.join("AppData").join("Local").join("Vigila")
    } else {
        home.join(POSIX_DATA_DIR)
    }
}

/// Handle on the data directory
#[derive(Debug, Clone)]
pub struct DataStore {
    dir: PathBuf,
    policy: LayoutPolicy,
    legacy_dirs: Vec<PathBuf>,
}

impl DataStore {
    pub fn open(dir: impl Into<PathBuf>, policy: LayoutPolicy) -> Self {
        Self {
            dir: dir.into(),
            policy,
            legacy_dirs: Vec::new(),
        }
    }

    /// Also read per-session files from `dir`; nothing is ever written there
    pub fn with_legacy_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.legacy_dirs.push(dir.into());
        self
    }

    pub fn legacy_dirs(&self) -> &[PathBuf] {
        &self.legacy_dirs
    }

    /// Store rooted at [`resolve_data_directory`]
    pub fn from_home(policy: LayoutPolicy) -> Result<Self, DataError> {
        Ok(Self::open(resolve_data_directory()?, policy))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn policy(&self) -> LayoutPolicy {
        self.policy
    }

    /// Path of the array file for `name`
    pub fn record_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.json"))
    }

    pub fn sessions_dir(&self) -> PathBuf {
        self.dir.join(SESSIONS_DIR)
    }

    /// Create the directory (with parents) and prove it is writable by
    /// writing and deleting a probe file.
    pub fn verify_writable(&self) -> Result<(), DataError> {
        fs::create_dir_all(&self.dir).map_err(|source| DataError::DirectoryCreation {
            path: self.dir.clone(),
            source,
        })?;

        let probe = self.dir.join(PROBE_FILE);
        let denied = |source: std::io::Error| DataError::WritePermission {
            path: self.dir.clone(),
            source,
        };
        fs::write(&probe, b"test").map_err(denied)?;
        fs::remove_file(&probe).map_err(denied)?;

        debug!(dir = %self.dir.display(), "data directory is writable");
        Ok(())
    }

    /// Persist a finished session according to the layout policy
    pub fn save<T: Serialize>(&self, kind: TestKind, record: &T) -> Result<PathBuf, DataError> {
        let path = match self.policy.layout_for(kind) {
            StoreLayout::Appending => self.append_record(kind.file_stem(), record)?,
            StoreLayout::PerSession => self.write_session(kind.file_stem(), record)?,
        };
        info!(test = kind.test_type(), path = %path.display(), "session saved");
        Ok(path)
    }

    /// Append `record` with an injected creation timestamp to `<name>.json`
    pub fn append_record<T: Serialize>(&self, name: &str, record: &T) -> Result<PathBuf, DataError> {
        self.append_record_at(name, record, Local::now())
    }

    pub(crate) fn append_record_at<T: Serialize>(
        &self,
        name: &str,
        record: &T,
        now: DateTime<Local>,
    ) -> Result<PathBuf, DataError> {
        let stamped = stamp(record, now)?;
        let path = self.record_path(name);

        let mut history = self.load_appended(name)?;
        history.push(stamped);

        self.ensure_dir(&self.dir)?;
        write_atomically(&path, &Value::Array(history))?;
        Ok(path)
    }

    /// Write `record` to its own timestamped file under `sessions/`
    pub fn write_session<T: Serialize>(&self, name: &str, record: &T) -> Result<PathBuf, DataError> {
        self.write_session_at(name, record, Local::now())
    }

    pub(crate) fn write_session_at<T: Serialize>(
        &self,
        name: &str,
        record: &T,
        now: DateTime<Local>,
    ) -> Result<PathBuf, DataError> {
        let stamped = stamp(record, now)?;
        let dir = self.sessions_dir();
        self.ensure_dir(&dir)?;

        let base = format!("{name}_{}", now.format("%Y%m%d_%H%M%S"));
        let mut path = dir.join(format!("{base}.json"));
        if path.exists() {
            let suffix = Uuid::new_v4().simple().to_string();
            path = dir.join(format!("{base}_{}.json", &suffix[..8]));
        }

        write_atomically(&path, &stamped)?;
        Ok(path)
    }

    /// Records in `<name>.json`, oldest first; empty when the file is absent
    pub fn load_appended(&self, name: &str) -> Result<Vec<Value>, DataError> {
        let path = self.record_path(name);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let raw = fs::read_to_string(&path).map_err(|source| DataError::Io {
            path: path.clone(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| DataError::ExistingDataCorrupt { path, source })
    }

    /// Per-session records for `name` from `sessions/` and every legacy
    /// directory, ordered by file name (and so by time)
    pub fn load_sessions(&self, name: &str) -> Result<Vec<Value>, DataError> {
        let prefix = format!("{name}_");
        let mut paths = session_files(&self.sessions_dir(), &prefix)?;
        for dir in &self.legacy_dirs {
            paths.extend(session_files(dir, &prefix)?);
        }
        paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()).then_with(|| a.cmp(b)));
        paths.dedup();

        paths
            .into_iter()
            .map(|path| {
                let raw = fs::read_to_string(&path).map_err(|source| DataError::Io {
                    path: path.clone(),
                    source,
                })?;
                serde_json::from_str::<Value>(&raw)
                    .map_err(|source| DataError::ExistingDataCorrupt { path, source })
            })
            .collect()
    }

    /// Every stored Session Result for `kind`, from both layouts
    pub fn load_records(&self, kind: TestKind) -> Result<Vec<Value>, DataError> {
        let mut records = self.load_appended(kind.file_stem())?;
        records.extend(self.load_sessions(kind.file_stem())?);
        Ok(records)
    }

    fn ensure_dir(&self, dir: &Path) -> Result<(), DataError> {
        fs::create_dir_all(dir).map_err(|source| DataError::DirectoryCreation {
            path: dir.to_path_buf(),
            source,
        })
    }
}

/// `<prefix>*.json` files directly inside `dir`; empty when `dir` is absent
fn session_files(dir: &Path, prefix: &str) -> Result<Vec<PathBuf>, DataError> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let entries = fs::read_dir(dir).map_err(|source| DataError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    Ok(entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with(prefix) && n.ends_with(".json"))
        })
        .collect())
}

/// Serialize `record` and put an ISO-8601 `timestamp` in front of its fields
fn stamp<T: Serialize>(record: &T, now: DateTime<Local>) -> Result<Value, DataError> {
    let Value::Object(fields) = serde_json::to_value(record)? else {
        return Err(DataError::NotAnObject);
    };

    let mut stamped = Map::with_capacity(fields.len() + 1);
    stamped.insert(
        "timestamp".to_string(),
        Value::String(now.to_rfc3339_opts(SecondsFormat::Micros, false)),
    );
    stamped.extend(fields);
    Ok(Value::Object(stamped))
}

fn write_atomically(path: &Path, value: &Value) -> Result<(), DataError> {
    let body = serde_json::to_vec_pretty(value)?;
    let tmp = path.with_extension("json.tmp");
    let failed = |source: std::io::Error| DataError::Io {
        path: path.to_path_buf(),
        source,
    };

    let written: std::io::Result<()> = (|| {
        let mut file = File::create(&tmp)?;
        file.write_all(&body)?;
        file.flush()?;
        file.sync_all()?;
        fs::rename(&tmp, path)
    })();

    if let Err(source) = written {
        let _ = fs::remove_file(&tmp);
        return Err(failed(source));
    }
    Ok(())
}
