use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub log_dir: String,
    pub log_file: String,
    pub use_json: bool,
    pub rotation: String,
    /// When false, per-allocation `REGNO` trace events are filtered out
    pub enable_tracing: bool,
    /// Level for the stdout layer; the file layer always follows `log_level`
    #[serde(default)]
    pub console_level: Option<String>,
    /// PostgreSQL connection URL for registration records
    #[serde(default)]
    pub postgres_url: Option<String>,
    #[serde(default = "default_max_connections")]
    pub postgres_max_connections: u32,
    #[serde(default)]
    pub registration: RegistrationConfig,
}

fn default_max_connections() -> u32 {
    10
}

/// Registration workflow settings
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct RegistrationConfig {
    /// Allocate-and-insert cycles before giving up on a contended prefix
    pub max_allocation_attempts: u32,
    /// Delay before retry n is n * retry_backoff_ms plus up to retry_backoff_ms of jitter
    pub retry_backoff_ms: u64,
    pub media_dir: String,
    pub media_base_url: String,
    pub max_upload_bytes: usize,
    pub placeholder_photo_url: String,
    pub placeholder_signature_url: String,
}

impl Default for RegistrationConfig {
    fn default() -> Self {
        Self {
            max_allocation_attempts: 5,
            retry_backoff_ms: 25,
            media_dir: "./data/media".to_string(),
            media_base_url: "/media".to_string(),
            max_upload_bytes: 2 * 1024 * 1024,
            placeholder_photo_url: "/static/placeholder-photo.png".to_string(),
            placeholder_signature_url: "/static/placeholder-signature.png".to_string(),
        }
    }
}

impl AppConfig {
    pub fn load(env: &str) -> anyhow::Result<Self> {
        let config_path = format!("config/{}.yaml", env);
        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path))?;
        Self::from_yaml(&content).with_context(|| format!("Failed to parse {}", config_path))
    }

    pub fn from_yaml(content: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
log_level: info
log_dir: ./logs
log_file: registration.log
use_json: false
rotation: daily
enable_tracing: true
"#;

    #[test]
    fn test_defaults_for_optional_sections() {
        let config = AppConfig::from_yaml(MINIMAL).unwrap();
        assert_eq!(config.postgres_url, None);
        assert_eq!(config.console_level, None);
        assert_eq!(config.postgres_max_connections, 10);
        assert_eq!(config.registration.max_allocation_attempts, 5);
        assert_eq!(config.registration.media_base_url, "/media");
    }

    #[test]
    fn test_partial_registration_section() {
        let yaml = format!(
            "{MINIMAL}postgres_url: postgresql://u:p@localhost/db\nregistration:\n  max_allocation_attempts: 3\n"
        );
        let config = AppConfig::from_yaml(&yaml).unwrap();
        assert_eq!(
            config.postgres_url.as_deref(),
            Some("postgresql://u:p@localhost/db")
        );
        assert_eq!(config.registration.max_allocation_attempts, 3);
        assert_eq!(config.registration.retry_backoff_ms, 25);
    }

    #[test]
    fn test_missing_required_field() {
        assert!(AppConfig::from_yaml("log_level: info\n").is_err());
    }

    #[test]
    fn test_load_missing_file() {
        assert!(AppConfig::load("does-not-exist").is_err());
    }
}
