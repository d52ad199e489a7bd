//! API-key resolution.
//!
//! Keys come from `api_keys.json` in the base directory first, with
//! environment variables as the fallback. The file is an open mapping:
//! unknown keys and non-string values are ignored rather than rejected.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use mentor_core::{MentorError, Result};

/// File keys and environment variables per supported service.
const SERVICES: &[(&str, &str, &str)] = &[
    ("moonshot", "moonshot_api_key", "MOONSHOT_API_KEY"),
    ("openai", "openai_api_key", "OPENAI_API_KEY"),
];

/// Substrings that mark a key as an unfilled placeholder.
const PLACEHOLDER_PATTERNS: &[&str] = &["your_api_key", "placeholder", "example", "test"];

/// Availability of one service's key, for the `/apikey` status display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyStatus {
    pub service: String,
    pub available: bool,
}

/// Resolves API keys with file-then-environment precedence.
pub struct ApiKeyStore {
    api_keys_file: PathBuf,
}

impl ApiKeyStore {
    /// Creates a store reading `api_keys.json` under `base_dir`.
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            api_keys_file: crate::paths::api_keys_file(base_dir.as_ref()),
        }
    }

    /// The path of the backing key file (may not exist yet).
    pub fn api_keys_file(&self) -> &Path {
        &self.api_keys_file
    }

    /// Resolves the key for a service: configuration file first, then the
    /// service's environment variable.
    ///
    /// # Errors
    ///
    /// `Config` when the service name is not one of the supported set.
    pub fn get(&self, service: &str) -> Result<Option<String>> {
        self.resolve(service, |name| std::env::var(name).ok())
    }

    /// Validates a key's basic shape: long enough and not an obvious
    /// placeholder. Does not verify the key against the remote service.
    pub fn validate(key: &str) -> bool {
        let key = key.trim();
        if key.len() < 20 {
            return false;
        }
        let lower = key.to_lowercase();
        !PLACEHOLDER_PATTERNS.iter().any(|p| lower.contains(p))
    }

    /// Availability of every supported service's key.
    pub fn status(&self) -> Vec<KeyStatus> {
        SERVICES
            .iter()
            .map(|(service, _, _)| {
                let available = self
                    .get(service)
                    .ok()
                    .flatten()
                    .is_some_and(|key| Self::validate(&key));
                KeyStatus {
                    service: (*service).to_string(),
                    available,
                }
            })
            .collect()
    }

    /// Persists a key for a service into the configuration file, creating
    /// the file (and its parent directory) if needed.
    ///
    /// # Errors
    ///
    /// `Config` for an unsupported service or an invalid-looking key;
    /// `Persistence` when the file cannot be written.
    pub fn save_key(&self, service: &str, key: &str) -> Result<()> {
        let file_key = Self::file_key(service)?;
        if !Self::validate(key) {
            return Err(MentorError::config(format!(
                "API key for '{service}' looks invalid (too short or a placeholder)"
            )));
        }

        let mut data = self.load_file_keys();
        let _ = data.insert(file_key.to_string(), key.trim().to_string());

        if let Some(parent) = self.api_keys_file.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                MentorError::persistence(parent.display().to_string(), e.to_string())
            })?;
        }
        let content = serde_json::to_string_pretty(&data)?;
        fs::write(&self.api_keys_file, content).map_err(|e| {
            MentorError::persistence(self.api_keys_file.display().to_string(), e.to_string())
        })?;
        tracing::info!("saved {service} API key to {}", self.api_keys_file.display());
        Ok(())
    }

    /// Writes an empty template file without overwriting an existing one.
    /// Returns true when the template was created.
    pub fn create_example_config(&self) -> Result<bool> {
        if self.api_keys_file.exists() {
            return Ok(false);
        }
        if let Some(parent) = self.api_keys_file.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                MentorError::persistence(parent.display().to_string(), e.to_string())
            })?;
        }

        let template = serde_json::json!({
            "moonshot_api_key": "",
            "openai_api_key": "",
            "note": "Fill in your API keys here. Empty values fall back to environment variables.",
        });
        let content = serde_json::to_string_pretty(&template)?;
        fs::write(&self.api_keys_file, content).map_err(|e| {
            MentorError::persistence(self.api_keys_file.display().to_string(), e.to_string())
        })?;
        Ok(true)
    }

    /// Core precedence logic with an injectable environment lookup, so
    /// tests do not have to mutate process-global state.
    fn resolve(
        &self,
        service: &str,
        env_lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Option<String>> {
        let (_, file_key, env_key) = SERVICES
            .iter()
            .find(|(name, _, _)| name.eq_ignore_ascii_case(service))
            .ok_or_else(|| MentorError::config(format!("unsupported service: {service}")))?;

        if let Some(key) = self.load_file_keys().get(*file_key) {
            return Ok(Some(key.clone()));
        }
        Ok(env_lookup(env_key).filter(|key| !key.trim().is_empty()))
    }

    /// Reads the key file, keeping only non-empty string values. A missing
    /// or unreadable file yields an empty mapping rather than an error.
    fn load_file_keys(&self) -> BTreeMap<String, String> {
        let Ok(content) = fs::read_to_string(&self.api_keys_file) else {
            return BTreeMap::new();
        };
        match serde_json::from_str::<serde_json::Map<String, serde_json::Value>>(&content) {
            Ok(data) => data
                .into_iter()
                .filter_map(|(key, value)| {
                    let value = value.as_str()?.trim();
                    (!value.is_empty()).then(|| (key, value.to_string()))
                })
                .collect(),
            Err(e) => {
                tracing::warn!(
                    "failed to read API key file {}: {e}",
                    self.api_keys_file.display()
                );
                BTreeMap::new()
            }
        }
    }

    fn file_key(service: &str) -> Result<&'static str> {
        SERVICES
            .iter()
            .find(|(name, _, _)| name.eq_ignore_ascii_case(service))
            .map(|(_, file_key, _)| *file_key)
            .ok_or_else(|| MentorError::config(format!("unsupported service: {service}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn file_key_wins_over_environment() {
        let temp_dir = TempDir::new().unwrap();
        let store = ApiKeyStore::new(temp_dir.path());
        fs::write(
            store.api_keys_file(),
            r#"{"moonshot_api_key": "sk-file-0123456789abcdef"}"#,
        )
        .unwrap();

        let key = store
            .resolve("moonshot", |_| Some("sk-env-0123456789abcdef".to_string()))
            .unwrap();
        assert_eq!(key.as_deref(), Some("sk-file-0123456789abcdef"));
    }

    #[test]
    fn environment_fallback_when_file_lacks_key() {
        let temp_dir = TempDir::new().unwrap();
        let store = ApiKeyStore::new(temp_dir.path());
        fs::write(store.api_keys_file(), r#"{"moonshot_api_key": ""}"#).unwrap();

        let key = store
            .resolve("moonshot", |name| {
                (name == "MOONSHOT_API_KEY").then(|| "sk-env-0123456789abcdef".to_string())
            })
            .unwrap();
        assert_eq!(key.as_deref(), Some("sk-env-0123456789abcdef"));
    }

    #[test]
    fn missing_everywhere_is_none_not_error() {
        let temp_dir = TempDir::new().unwrap();
        let store = ApiKeyStore::new(temp_dir.path());
        assert_eq!(store.resolve("moonshot", |_| None).unwrap(), None);
    }

    #[test]
    fn unsupported_service_is_a_config_error() {
        let temp_dir = TempDir::new().unwrap();
        let store = ApiKeyStore::new(temp_dir.path());
        let err = store.resolve("palantir", |_| None).unwrap_err();
        assert!(matches!(err, MentorError::Config(_)));
    }

    #[test]
    fn validate_rejects_short_and_placeholder_keys() {
        assert!(!ApiKeyStore::validate("short"));
        assert!(!ApiKeyStore::validate("your_api_key_goes_here_please"));
        assert!(!ApiKeyStore::validate("sk-placeholder-0123456789"));
        assert!(ApiKeyStore::validate("sk-9f8e7d6c5b4a39281706fedcba"));
    }

    #[test]
    fn save_key_persists_and_round_trips() {
        let temp_dir = TempDir::new().unwrap();
        let store = ApiKeyStore::new(temp_dir.path());
        store
            .save_key("moonshot", "sk-9f8e7d6c5b4a39281706fedcba")
            .unwrap();

        let key = store.resolve("moonshot", |_| None).unwrap();
        assert_eq!(key.as_deref(), Some("sk-9f8e7d6c5b4a39281706fedcba"));
    }

    #[test]
    fn save_key_rejects_invalid_key() {
        let temp_dir = TempDir::new().unwrap();
        let store = ApiKeyStore::new(temp_dir.path());
        assert!(store.save_key("moonshot", "short").is_err());
        assert!(!store.api_keys_file().exists());
    }

    #[test]
    fn example_config_never_overwrites() {
        let temp_dir = TempDir::new().unwrap();
        let store = ApiKeyStore::new(temp_dir.path());
        assert!(store.create_example_config().unwrap());
        assert!(store.api_keys_file().exists());
        assert!(!store.create_example_config().unwrap());
    }

    #[test]
    fn non_string_values_are_ignored() {
        let temp_dir = TempDir::new().unwrap();
        let store = ApiKeyStore::new(temp_dir.path());
        fs::write(
            store.api_keys_file(),
            r#"{"moonshot_api_key": 42, "note": {"nested": true}}"#,
        )
        .unwrap();
        assert_eq!(store.resolve("moonshot", |_| None).unwrap(), None);
    }
}
