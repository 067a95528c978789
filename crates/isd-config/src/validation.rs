// SPDX-FileCopyrightText: 2026 ISD Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes,
//! such as URL schemes, endpoint path shape, and non-zero limits.

use crate::diagnostic::ConfigError;
use crate::model::IsdConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &IsdConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut reject = |key: &str, message: String| {
        errors.push(ConfigError::Validation {
            key: key.to_string(),
            message,
        });
    };

    let base_url = config.server.base_url.trim();
    if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
        reject(
            "server.base_url",
            format!("`{base_url}` must start with http:// or https://"),
        );
    }

    for (key, path) in [
        ("server.stream_path", &config.server.stream_path),
        ("server.examples_path", &config.server.examples_path),
    ] {
        if !path.starts_with('/') {
            reject(key, format!("`{path}` must start with `/`"));
        }
    }

    if config.server.connect_timeout_secs == 0 {
        reject("server.connect_timeout_secs", "must be greater than 0".into());
    }

    if let Some(id) = &config.server.conversation_id
        && id.trim().is_empty()
    {
        reject("server.conversation_id", "must not be blank when set".into());
    }

    let level = config.logging.level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        reject(
            "logging.level",
            format!(
                "`{}` is not one of {}",
                config.logging.level,
                LOG_LEVELS.join(", ")
            ),
        );
    }

    if config.export.directory.trim().is_empty() {
        reject("export.directory", "must not be empty".into());
    }
    if config.export.max_table_rows == 0 {
        reject("export.max_table_rows", "must be greater than 0".into());
    }
    if config.export.max_table_columns == 0 {
        reject("export.max_table_columns", "must be greater than 0".into());
    }
    if config.export.max_cell_chars == 0 {
        reject("export.max_cell_chars", "must be greater than 0".into());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rejected_keys(config: &IsdConfig) -> Vec<String> {
        validate_config(config)
            .unwrap_err()
            .into_iter()
            .filter_map(|e| match e {
                ConfigError::Validation { key, .. } => Some(key),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn default_config_validates() {
        assert!(validate_config(&IsdConfig::default()).is_ok());
    }

    #[test]
    fn non_http_base_url_fails() {
        let mut config = IsdConfig::default();
        config.server.base_url = "localhost:8000".into();
        assert_eq!(rejected_keys(&config), vec!["server.base_url"]);
    }

    #[test]
    fn relative_paths_fail() {
        let mut config = IsdConfig::default();
        config.server.stream_path = "api/query/stream".into();
        config.server.examples_path = "api/examples".into();
        assert_eq!(
            rejected_keys(&config),
            vec!["server.stream_path", "server.examples_path"]
        );
    }

    #[test]
    fn errors_are_collected_not_fail_fast() {
        let mut config = IsdConfig::default();
        config.server.connect_timeout_secs = 0;
        config.logging.level = "loud".into();
        config.export.max_table_rows = 0;
        config.export.max_table_columns = 0;
        let keys = rejected_keys(&config);
        assert_eq!(keys.len(), 4);
        assert!(keys.contains(&"logging.level".to_string()));
    }

    #[test]
    fn log_level_is_case_insensitive() {
        let mut config = IsdConfig::default();
        config.logging.level = "DEBUG".into();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn blank_conversation_id_fails() {
        let mut config = IsdConfig::default();
        config.server.conversation_id = Some("  ".into());
        assert_eq!(rejected_keys(&config), vec!["server.conversation_id"]);
    }
}
