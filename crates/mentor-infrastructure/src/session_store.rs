//! JSON-file SessionRepository implementation.

use std::fs;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use mentor_core::repository::{SavedSession, SessionFileInfo, SessionRepository};
use mentor_core::{Clock, HistoryLog, MentorError, Result};

use crate::dto::SessionRecordV1;
use crate::paths;

/// A repository that stores each session as one pretty-printed JSON file.
///
/// Layout and lifecycle follow the data-directory convention in
/// [`paths`]: sessions live under `base_dir/sessions/`, one file per
/// session, owned exclusively by their path. There is no caching — every
/// call re-reads or re-writes the filesystem.
///
/// Writes are atomic: the record is serialized to a temporary file in the
/// sessions directory and renamed into place, so a failed save never
/// leaves a truncated or inconsistent record at the destination.
pub struct JsonSessionRepository {
    sessions_dir: PathBuf,
}

impl JsonSessionRepository {
    /// Creates a repository rooted at `base_dir`, creating
    /// `base_dir/sessions/` if needed.
    ///
    /// # Errors
    ///
    /// Returns a `Persistence` error if the directory cannot be created.
    pub fn new(base_dir: impl AsRef<Path>) -> Result<Self> {
        let sessions_dir = paths::sessions_dir(base_dir.as_ref());
        fs::create_dir_all(&sessions_dir).map_err(|e| {
            MentorError::persistence(sessions_dir.display().to_string(), e.to_string())
        })?;
        Ok(Self { sessions_dir })
    }

    /// Creates a repository at the default location (`~/.mentor`).
    pub fn default_location() -> Result<Self> {
        Self::new(paths::default_base_dir()?)
    }

    /// Resolves a caller-supplied name to a concrete file path.
    ///
    /// Absolute paths are used as-is; bare names land in the sessions
    /// directory, gaining a `.json` extension when they lack one.
    fn resolve(&self, name: &str) -> PathBuf {
        let path = Path::new(name);
        if path.is_absolute() {
            return path.to_path_buf();
        }
        if path.extension().is_some() {
            self.sessions_dir.join(path)
        } else {
            self.sessions_dir.join(format!("{name}.json"))
        }
    }

    fn read_record(path: &Path) -> Result<SessionRecordV1> {
        let content = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                MentorError::not_found(path.display().to_string())
            } else {
                MentorError::from(e)
            }
        })?;
        let record: SessionRecordV1 = serde_json::from_str(&content).map_err(|e| {
            MentorError::malformed(format!("failed to parse {}: {e}", path.display()))
        })?;
        record.validate()?;
        Ok(record)
    }

    /// Writes serialized content atomically: temp file, then rename.
    fn write_atomic(path: &Path, content: &str) -> Result<()> {
        let tmp = path.with_extension("json.tmp");
        if let Err(e) = fs::write(&tmp, content) {
            return Err(MentorError::persistence(
                path.display().to_string(),
                e.to_string(),
            ));
        }
        if let Err(e) = fs::rename(&tmp, path) {
            let _ = fs::remove_file(&tmp);
            return Err(MentorError::persistence(
                path.display().to_string(),
                e.to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl SessionRepository for JsonSessionRepository {
    async fn save(&self, log: &HistoryLog, filename: Option<&str>) -> Result<PathBuf> {
        let name = match filename {
            Some(name) => name.to_string(),
            None => log.clock().session_filename("mentor_session"),
        };
        let path = self.resolve(&name);

        let record = SessionRecordV1::from_log(log);
        let content = serde_json::to_string_pretty(&record)?;
        Self::write_atomic(&path, &content)?;

        tracing::info!(
            "saved session ({} messages) to {}",
            record.history.len(),
            path.display()
        );
        Ok(path)
    }

    async fn load(&self, source: &str) -> Result<SavedSession> {
        let path = self.resolve(source);
        if !path.exists() {
            return Err(MentorError::not_found(source.to_string()));
        }

        let record = Self::read_record(&path)?;
        let session_start = Clock::parse_iso(&record.session_info.start_time)?;
        let records = record
            .history
            .into_iter()
            .map(|message| message.into_domain())
            .collect::<Result<Vec<_>>>()?;

        tracing::info!("loaded session ({} messages) from {}", records.len(), path.display());
        Ok(SavedSession {
            records,
            session_start,
            duration_formatted: record.session_info.duration_formatted,
        })
    }

    async fn list(&self) -> Result<Vec<SessionFileInfo>> {
        let mut sessions = Vec::new();

        for entry in fs::read_dir(&self.sessions_dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().and_then(|s| s.to_str()) != Some("json") {
                continue;
            }
            // Unreadable or malformed files are skipped from the listing,
            // not treated as fatal; load() still reports them precisely.
            match Self::read_record(&path) {
                Ok(record) => {
                    let filename = path
                        .file_name()
                        .and_then(|s| s.to_str())
                        .unwrap_or_default()
                        .to_string();
                    // Ordering must compare instants, not strings: records
                    // saved under different offsets do not sort textually.
                    let started = Clock::parse_iso(&record.session_info.start_time)?;
                    sessions.push((
                        started,
                        SessionFileInfo {
                            filename,
                            start_time: record.session_info.start_time,
                            message_count: record.history.len(),
                        },
                    ));
                }
                Err(e) => {
                    tracing::debug!("skipping unreadable session file {}: {e}", path.display());
                }
            }
        }

        sessions.sort_by_key(|(started, _)| std::cmp::Reverse(*started));
        Ok(sessions.into_iter().map(|(_, info)| info).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mentor_core::{Metadata, Role};
    use tempfile::TempDir;

    fn sample_log(messages: usize) -> HistoryLog {
        let mut log = HistoryLog::new(50, Clock::utc());
        for i in 0..messages {
            let role = if i % 2 == 0 { Role::User } else { Role::Assistant };
            let metadata = if i == 0 {
                let mut m = Metadata::new();
                m.insert("topic".to_string(), "variables".into());
                Some(m)
            } else {
                None
            };
            log.append(role, format!("message {i}"), metadata);
        }
        log
    }

    async fn round_trip(messages: usize) {
        let temp_dir = TempDir::new().unwrap();
        let repository = JsonSessionRepository::new(temp_dir.path()).unwrap();
        let log = sample_log(messages);

        let path = repository.save(&log, Some("round_trip")).await.unwrap();
        assert!(path.exists());

        let saved = repository.load("round_trip").await.unwrap();
        assert_eq!(saved.records.len(), log.len());
        assert_eq!(saved.session_start, *log.session_start());

        for (restored, original) in saved.records.iter().zip(log.records()) {
            assert_eq!(restored.role, original.role);
            assert_eq!(restored.content, original.content);
            assert_eq!(restored.created_at, original.created_at);
            assert_eq!(restored.metadata, original.metadata);
        }
    }

    #[tokio::test]
    async fn round_trip_empty_log() {
        round_trip(0).await;
    }

    #[tokio::test]
    async fn round_trip_single_record() {
        round_trip(1).await;
    }

    #[tokio::test]
    async fn round_trip_full_capacity() {
        round_trip(50).await;
    }

    #[tokio::test]
    async fn default_filename_is_timestamped() {
        let temp_dir = TempDir::new().unwrap();
        let repository = JsonSessionRepository::new(temp_dir.path()).unwrap();
        let path = repository.save(&sample_log(2), None).await.unwrap();

        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("mentor_session_"));
        assert!(name.ends_with(".json"));
        assert!(path.starts_with(temp_dir.path()));
    }

    #[tokio::test]
    async fn load_missing_file_is_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let repository = JsonSessionRepository::new(temp_dir.path()).unwrap();
        let err = repository.load("no_such_session").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn load_rejects_unparsable_json() {
        let temp_dir = TempDir::new().unwrap();
        let repository = JsonSessionRepository::new(temp_dir.path()).unwrap();
        let path = paths::sessions_dir(temp_dir.path()).join("broken.json");
        fs::write(&path, "{ not json").unwrap();

        let err = repository.load("broken").await.unwrap_err();
        assert!(err.is_malformed());
    }

    #[tokio::test]
    async fn load_rejects_unknown_format_version() {
        let temp_dir = TempDir::new().unwrap();
        let repository = JsonSessionRepository::new(temp_dir.path()).unwrap();

        let path = repository.save(&sample_log(2), Some("versioned")).await.unwrap();
        let content = fs::read_to_string(&path)
            .unwrap()
            .replace("\"format_version\": \"1.0\"", "\"format_version\": \"9.9\"");
        fs::write(&path, content).unwrap();

        let err = repository.load("versioned").await.unwrap_err();
        assert!(err.is_malformed());
    }

    #[tokio::test]
    async fn load_rejects_missing_required_fields() {
        let temp_dir = TempDir::new().unwrap();
        let repository = JsonSessionRepository::new(temp_dir.path()).unwrap();
        let path = paths::sessions_dir(temp_dir.path()).join("partial.json");
        fs::write(&path, r#"{"history": []}"#).unwrap();

        let err = repository.load("partial").await.unwrap_err();
        assert!(err.is_malformed());
    }

    #[tokio::test]
    async fn failed_save_leaves_no_partial_file() {
        let temp_dir = TempDir::new().unwrap();
        let repository = JsonSessionRepository::new(temp_dir.path()).unwrap();

        // A destination whose parent does not exist cannot be renamed into.
        let missing_parent = temp_dir.path().join("absent").join("target.json");
        let err = repository
            .save(&sample_log(2), Some(missing_parent.to_str().unwrap()))
            .await
            .unwrap_err();
        assert!(matches!(err, MentorError::Persistence { .. }));
        assert!(!missing_parent.exists());
        assert!(!missing_parent.with_extension("json.tmp").exists());
    }

    #[tokio::test]
    async fn list_reports_stored_sessions() {
        let temp_dir = TempDir::new().unwrap();
        let repository = JsonSessionRepository::new(temp_dir.path()).unwrap();

        repository.save(&sample_log(2), Some("first")).await.unwrap();
        repository.save(&sample_log(4), Some("second")).await.unwrap();
        // A stray non-session file must not break the listing.
        fs::write(paths::sessions_dir(temp_dir.path()).join("junk.json"), "?").unwrap();

        let sessions = repository.list().await.unwrap();
        assert_eq!(sessions.len(), 2);
        assert!(sessions.iter().any(|s| s.filename == "first.json" && s.message_count == 2));
        assert!(sessions.iter().any(|s| s.filename == "second.json" && s.message_count == 4));
    }

    #[tokio::test]
    async fn list_orders_by_absolute_start_time() {
        let temp_dir = TempDir::new().unwrap();
        let repository = JsonSessionRepository::new(temp_dir.path()).unwrap();

        // 12:00+08:00 is 04:00 UTC; 09:00+00:00 starts five hours later
        // even though it compares smaller as text.
        let start_earlier = Clock::parse_iso("2024-01-01T12:00:00+08:00").unwrap();
        let start_later = Clock::parse_iso("2024-01-01T09:00:00+00:00").unwrap();
        let log_earlier = HistoryLog::from_records(
            10,
            Clock::new(Some("Asia/Shanghai")),
            start_earlier,
            Vec::new(),
        );
        let log_later = HistoryLog::from_records(10, Clock::utc(), start_later, Vec::new());

        repository.save(&log_earlier, Some("earlier")).await.unwrap();
        repository.save(&log_later, Some("later")).await.unwrap();

        let sessions = repository.list().await.unwrap();
        assert_eq!(sessions[0].filename, "later.json");
        assert_eq!(sessions[1].filename, "earlier.json");
    }
}
