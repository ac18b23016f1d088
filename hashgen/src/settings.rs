// Settings for the hashgen binary: shared passhash settings plus the demo inputs

use passhash::config::{layered_builder, Settings};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
pub struct HashgenSettings {
    #[serde(flatten)]
    pub common: Settings,
    #[serde(default)]
    pub demo: DemoConfig,
}

/// Password to hash, and a password/stored-hash pair to check
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    pub password: String,
    pub check_password: Option<String>,
    pub stored_hash: String,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            password: "senha123".to_string(),
            check_password: None,
            stored_hash: "$2b$10$jkhDPw3UMfCZK9cAetaPaeZCjOkkBJ/eBkuNp5KNPpbe5XWCZt1sG".to_string(),
        }
    }
}

impl DemoConfig {
    /// Password checked against `stored_hash`; falls back to `password`
    pub fn check_password(&self) -> &str {
        self.check_password.as_deref().unwrap_or(&self.password)
    }
}

impl HashgenSettings {
    pub fn load_from_path<P: AsRef<Path>>(config_dir: P) -> Result<Self, config::ConfigError> {
        layered_builder(config_dir).build()?.try_deserialize()
    }

    pub fn validate(&self) -> Result<(), String> {
        self.common.validate()?;

        if self.demo.password.is_empty() {
            return Err("Demo password cannot be empty".to_string());
        }
        if self.demo.stored_hash.is_empty() {
            return Err("Demo stored_hash cannot be empty".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_defaults_when_no_files() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let settings = HashgenSettings::load_from_path(dir.path()).expect("Failed to load");

        assert_eq!(settings.demo.password, "senha123");
        assert_eq!(settings.demo.check_password(), "senha123");
        assert_eq!(settings.common.hasher.default_cost, 10);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_file_overrides() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        fs::write(
            dir.path().join("default.toml"),
            r#"
[hasher]
default_cost = 11

[observability]
log_level = "debug"

[demo]
password = "first"
check_password = "second"
"#,
        )
        .unwrap();

        let settings = HashgenSettings::load_from_path(dir.path()).expect("Failed to load");
        assert_eq!(settings.common.hasher.default_cost, 11);
        assert_eq!(settings.common.observability.log_level, "debug");
        assert_eq!(settings.demo.password, "first");
        assert_eq!(settings.demo.check_password(), "second");
    }

    #[test]
    fn test_validation_catches_empty_password() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let mut settings = HashgenSettings::load_from_path(dir.path()).expect("Failed to load");
        settings.demo.password = String::new();
        assert!(settings.validate().is_err());
    }
}
