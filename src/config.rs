//! Configuration types.

use std::path::PathBuf;

use secrecy::SecretString;

use crate::error::ConfigError;
use crate::llm::{DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE, LlmBackend, LlmConfig};

/// Default number of unread messages fetched per run.
pub const DEFAULT_MAX_RESULTS: u32 = 500;

/// Default append target for expense rows.
pub const DEFAULT_SHEET_RANGE: &str = "Sheet1!A1";

/// Default timezone for created calendar events.
pub const DEFAULT_TIME_ZONE: &str = "America/Chicago";

/// Default location of the authorized-user token file.
pub const DEFAULT_TOKEN_PATH: &str = "token.json";

/// Triage agent configuration, built from environment variables.
#[derive(Debug, Clone)]
pub struct TriageConfig {
    pub llm: LlmConfig,
    /// Spreadsheet receiving expense rows.
    pub sheet_id: String,
    pub sheet_range: String,
    pub max_results: u32,
    pub time_zone: String,
    /// Explicit access token; takes precedence over `token_path`.
    pub access_token: Option<SecretString>,
    pub token_path: PathBuf,
}

impl TriageConfig {
    /// Build config from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary variable lookup.
    ///
    /// Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let backend = match get("TRIAGE_LLM_BACKEND") {
            Some(raw) => raw.parse::<LlmBackend>()?,
            None => LlmBackend::Gemini,
        };

        let api_key = get(backend.api_key_var())
            .ok_or_else(|| ConfigError::MissingEnvVar(backend.api_key_var().to_string()))?;

        let sheet_id =
            get("GOOGLE_SHEET_ID").ok_or_else(|| ConfigError::MissingEnvVar("GOOGLE_SHEET_ID".into()))?;

        let model = get("TRIAGE_MODEL").unwrap_or_else(|| backend.default_model().to_string());

        let max_results = match get("TRIAGE_MAX_RESULTS") {
            Some(raw) => raw.trim().parse::<u32>().ok().filter(|n| *n > 0).ok_or_else(|| {
                ConfigError::InvalidValue {
                    key: "TRIAGE_MAX_RESULTS".into(),
                    message: format!("expected a positive integer, got '{raw}'"),
                }
            })?,
            None => DEFAULT_MAX_RESULTS,
        };

        Ok(Self {
            llm: LlmConfig {
                backend,
                api_key: SecretString::from(api_key),
                model,
                temperature: DEFAULT_TEMPERATURE,
                max_tokens: DEFAULT_MAX_TOKENS,
            },
            sheet_id,
            sheet_range: get("TRIAGE_SHEET_RANGE").unwrap_or_else(|| DEFAULT_SHEET_RANGE.into()),
            max_results,
            time_zone: get("TRIAGE_TIMEZONE").unwrap_or_else(|| DEFAULT_TIME_ZONE.into()),
            access_token: get("GOOGLE_ACCESS_TOKEN").map(SecretString::from),
            token_path: get("GOOGLE_TOKEN_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_TOKEN_PATH)),
        })
    }
}
