use crate::core::dashboard::Tab;
use crate::core::requirements::DEFAULT_MAX_UPLOAD_BYTES;
use crate::utils::error::{PortalError, Result};
use crate::utils::validation::{
    parse_utc_offset, validate_non_empty_string, validate_range, validate_url, Validate,
};
use chrono::FixedOffset;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortalConfig {
    pub store: StoreConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    pub contact: Option<ContactConfig>,
    #[serde(default)]
    pub display: DisplayConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub url: String,
    pub api_key: String,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_bucket")]
    pub bucket: String,
    pub max_upload_mb: Option<u64>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            bucket: default_bucket(),
            max_upload_mb: None,
        }
    }
}

fn default_bucket() -> String {
    "documents".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactConfig {
    pub endpoint: String,
    pub api_key: Option<String>,
    pub recipient: String,
    pub sender_name: String,
    pub sender_email: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DisplayConfig {
    pub utc_offset: Option<String>,
    pub tenders_refresh_seconds: Option<u64>,
    pub submitted_refresh_seconds: Option<u64>,
}

impl PortalConfig {
    /// Loads the configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(PortalError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// Parses the configuration from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| PortalError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` references (e.g. `${SUPABASE_ANON_KEY}`) with environment values.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| PortalError::ConfigError {
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.store.timeout_seconds.unwrap_or(30))
    }

    pub fn max_upload_bytes(&self) -> u64 {
        self.storage
            .max_upload_mb
            .map(|mb| mb * 1024 * 1024)
            .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES)
    }

    pub fn display_offset(&self) -> Result<FixedOffset> {
        parse_utc_offset(
            "display.utc_offset",
            self.display.utc_offset.as_deref().unwrap_or("+00:00"),
        )
    }

    pub fn refresh_interval(&self, tab: Tab) -> Duration {
        let configured = match tab {
            Tab::Tenders | Tab::Requests => self.display.tenders_refresh_seconds,
            Tab::Submitted => self.display.submitted_refresh_seconds,
        };
        configured
            .map(Duration::from_secs)
            .unwrap_or_else(|| tab.default_refresh())
    }

    pub fn contact(&self) -> Result<&ContactConfig> {
        self.contact.as_ref().ok_or_else(|| PortalError::MissingConfigError {
            field: "contact".to_string(),
        })
    }

    /// Checks that every configured value is usable.
    pub fn validate_config(&self) -> Result<()> {
        validate_url("store.url", &self.store.url)?;

        if self.store.api_key.trim().is_empty() || self.store.api_key.starts_with("${") {
            return Err(PortalError::MissingConfigError {
                field: "store.api_key".to_string(),
            });
        }

        if let Some(timeout) = self.store.timeout_seconds {
            validate_range("store.timeout_seconds", timeout, 1, 300)?;
        }

        validate_non_empty_string("storage.bucket", &self.storage.bucket)?;
        if let Some(mb) = self.storage.max_upload_mb {
            validate_range("storage.max_upload_mb", mb, 1, 512)?;
        }

        if let Some(contact) = &self.contact {
            validate_url("contact.endpoint", &contact.endpoint)?;
            validate_non_empty_string("contact.recipient", &contact.recipient)?;
            validate_non_empty_string("contact.sender_email", &contact.sender_email)?;
        }

        self.display_offset()?;
        if let Some(secs) = self.display.tenders_refresh_seconds {
            validate_range("display.tenders_refresh_seconds", secs, 1, 3600)?;
        }
        if let Some(secs) = self.display.submitted_refresh_seconds {
            validate_range("display.submitted_refresh_seconds", secs, 1, 3600)?;
        }

        Ok(())
    }
}

impl Validate for PortalConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_basic_toml_config() {
        let toml_content = r#"
[store]
url = "https://demo.supabase.co"
api_key = "anon-key"

[display]
utc_offset = "+02:00"
submitted_refresh_seconds = 5
"#;

        let config = PortalConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.store.url, "https://demo.supabase.co");
        assert_eq!(config.storage.bucket, "documents");
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert_eq!(config.max_upload_bytes(), 10 * 1024 * 1024);
        assert_eq!(config.display_offset().unwrap().local_minus_utc(), 7200);
        assert_eq!(config.refresh_interval(Tab::Submitted), Duration::from_secs(5));
        assert_eq!(config.refresh_interval(Tab::Tenders), Duration::from_secs(60));
        assert!(config.contact().is_err());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("TENDER_DESK_TEST_KEY", "secret-anon-key");

        let toml_content = r#"
[store]
url = "https://demo.supabase.co"
api_key = "${TENDER_DESK_TEST_KEY}"
"#;

        let config = PortalConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.store.api_key, "secret-anon-key");

        std::env::remove_var("TENDER_DESK_TEST_KEY");
    }

    #[test]
    fn test_unset_env_var_fails_validation() {
        let toml_content = r#"
[store]
url = "https://demo.supabase.co"
api_key = "${TENDER_DESK_UNSET_VARIABLE}"
"#;

        let config = PortalConfig::from_toml_str(toml_content).unwrap();
        assert!(matches!(
            config.validate(),
            Err(PortalError::MissingConfigError { .. })
        ));
    }

    #[test]
    fn test_config_validation() {
        let toml_content = r#"
[store]
url = "invalid-url"
api_key = "anon"
"#;
        let config = PortalConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());

        let bad_offset = r#"
[store]
url = "https://demo.supabase.co"
api_key = "anon"

[display]
utc_offset = "CET"
"#;
        let config = PortalConfig::from_toml_str(bad_offset).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();

        let toml_content = r#"
[store]
url = "https://demo.supabase.co"
api_key = "anon"
timeout_seconds = 10

[storage]
bucket = "tender-docs"
max_upload_mb = 25

[contact]
endpoint = "https://mail.example.com/send"
recipient = "team@dcs.example"
sender_name = "DCS Portal"
sender_email = "portal@dcs.example"
"#;

        temp_file.write_all(toml_content.as_bytes()).unwrap();

        let config = PortalConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.storage.bucket, "tender-docs");
        assert_eq!(config.max_upload_bytes(), 25 * 1024 * 1024);
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
        assert_eq!(config.contact().unwrap().recipient, "team@dcs.example");
        assert!(config.validate().is_ok());
    }
}
