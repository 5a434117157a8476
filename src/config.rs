// src/config.rs
use std::env;
use std::path::PathBuf;

use crate::error::ConfigError;

pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_WORKSHEET: &str = "Sheet1";
const DEFAULT_CREDENTIALS_PATH: &str = "credentials.json";

/// Where the Google service-account key material comes from. Config only
/// records the source; the loader reads and parses it, so malformed key
/// material surfaces as a data-source failure at fetch time.
#[derive(Debug, Clone, PartialEq)]
pub enum CredentialSource {
    /// Serialized JSON taken straight from the environment.
    Inline(String),
    /// Path to a key file on disk.
    File(PathBuf),
}

/// All configuration, resolved once in `main` before any rendering and
/// threaded into each stage. Nothing reads the environment after startup.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub openai_api_key: String,
    pub model: String,
    pub spreadsheet: String,
    pub worksheet: String,
    pub credentials: CredentialSource,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let openai_api_key = lookup("OPENAI_API_KEY")
            .filter(|key| !key.trim().is_empty())
            .ok_or(ConfigError::MissingApiKey)?;

        let spreadsheet = lookup("SPREADSHEET_URL")
            .filter(|url| !url.trim().is_empty())
            .ok_or(ConfigError::MissingVar {
                var: "SPREADSHEET_URL",
            })?;

        let credentials = match lookup("GOOGLE_SERVICE_ACCOUNT_JSON") {
            Some(json) if !json.trim().is_empty() => CredentialSource::Inline(json),
            _ => {
                let path = lookup("GOOGLE_APPLICATION_CREDENTIALS")
                    .filter(|p| !p.trim().is_empty())
                    .unwrap_or_else(|| DEFAULT_CREDENTIALS_PATH.to_string());
                CredentialSource::File(PathBuf::from(path))
            }
        };

        Ok(AppConfig {
            openai_api_key,
            model: lookup("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            spreadsheet,
            worksheet: lookup("WORKSHEET_NAME").unwrap_or_else(|| DEFAULT_WORKSHEET.to_string()),
            credentials,
        })
    }
}
