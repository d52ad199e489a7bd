//! Configuration-file loading.
//!
//! `config.json` overlays the built-in defaults: missing keys keep their
//! default values, and a missing or unreadable file is a warning, never a
//! startup failure.

use std::fs;
use std::path::Path;

use mentor_core::AssistantConfig;

/// Loads the assistant configuration from `base_dir/config.json`.
pub fn load_config(base_dir: &Path) -> AssistantConfig {
    let path = crate::paths::config_file(base_dir);
    if !path.exists() {
        return AssistantConfig::default();
    }

    match fs::read_to_string(&path) {
        Ok(content) => match serde_json::from_str::<AssistantConfig>(&content) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(
                    "failed to parse {}, using default configuration: {e}",
                    path.display()
                );
                AssistantConfig::default()
            }
        },
        Err(e) => {
            tracing::warn!(
                "failed to read {}, using default configuration: {e}",
                path.display()
            );
            AssistantConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_yields_defaults() {
        let temp_dir = TempDir::new().unwrap();
        assert_eq!(load_config(temp_dir.path()), AssistantConfig::default());
    }

    #[test]
    fn partial_file_overlays_defaults() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            crate::paths::config_file(temp_dir.path()),
            r#"{"model": "kimi-latest", "timezone": "Asia/Shanghai"}"#,
        )
        .unwrap();

        let config = load_config(temp_dir.path());
        assert_eq!(config.model, "kimi-latest");
        assert_eq!(config.timezone.as_deref(), Some("Asia/Shanghai"));
        assert_eq!(config.max_history, 50);
    }

    #[test]
    fn unparsable_file_falls_back_to_defaults() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(crate::paths::config_file(temp_dir.path()), "not json at all").unwrap();
        assert_eq!(load_config(temp_dir.path()), AssistantConfig::default());
    }
}
