// src/error.rs
use thiserror::Error;

/// Startup configuration problems. Any of these blocks the whole UI:
/// no data is loaded and no network call is made.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("OPENAI_API_KEY is not set in the environment")]
    MissingApiKey,

    #[error("{var} is not set in the environment")]
    MissingVar { var: &'static str },
}

/// Spreadsheet open/authenticate/fetch failures.
#[derive(Error, Debug)]
pub enum DataSourceError {
    #[error("could not read service account key from {path}")]
    CredentialRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("service account key is not valid JSON")]
    CredentialParse(#[from] serde_json::Error),

    #[error("authenticating with the spreadsheet backend failed")]
    Auth(#[source] std::io::Error),

    #[error("'{0}' does not look like a spreadsheet URL or id")]
    InvalidSpreadsheet(String),

    #[error("fetching worksheet values failed")]
    Fetch(#[from] google_sheets4::Error),
}

/// Text-generation request failures. The loaded table stays on screen
/// and the Analyze action remains retryable.
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("request to the text generation service failed")]
    Http(#[from] reqwest::Error),

    #[error("text generation service returned {status}: {message}")]
    Api {
        status: reqwest::StatusCode,
        message: String,
    },

    #[error("text generation response contained no choices")]
    EmptyResponse,
}

/// Banner text shown for a failed stage: category plus the error chain,
/// so the underlying cause (auth rejection, 404, timeout) stays visible.
pub fn user_message(category: &str, err: &dyn std::error::Error) -> String {
    let mut message = format!("{}: {}", category, err);
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(&format!(" ({})", cause));
        source = cause.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_message_includes_category_and_chain() {
        let err = DataSourceError::CredentialRead {
            path: "creds.json".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        };
        let message = user_message("Error loading data", &err);
        assert!(message.starts_with("Error loading data: "));
        assert!(message.contains("creds.json"));
        assert!(message.contains("no such file"));
    }

    #[test]
    fn config_error_names_the_missing_key() {
        let message = user_message("Configuration error", &ConfigError::MissingApiKey);
        assert!(message.contains("OPENAI_API_KEY"));
    }
}
