//! Error types for the triage agent.

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("Google API error: {0}")]
    Google(#[from] GoogleError),

    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// LLM provider errors.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("Provider {provider} request failed: {reason}")]
    RequestFailed { provider: String, reason: String },

    #[error("Invalid response from {provider}: {reason}")]
    InvalidResponse { provider: String, reason: String },

    #[error("Authentication failed for provider {provider}")]
    AuthFailed { provider: String },
}

/// Errors from the Google REST collaborators (Gmail, Tasks, Calendar, Sheets).
#[derive(Debug, thiserror::Error)]
pub enum GoogleError {
    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("{service} rejected the access token")]
    Unauthorized { service: String },

    #[error("{service} request failed: {reason}")]
    Request { service: String, reason: String },

    #[error("{service} API request failed ({status}): {body}")]
    Api {
        service: String,
        status: u16,
        body: String,
    },

    #[error("Failed to decode {service} response: {reason}")]
    Decode { service: String, reason: String },
}

/// Field extraction failures. Never escapes the extractor.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("LLM call failed: {0}")]
    Llm(#[from] LlmError),

    #[error("Response is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Response is JSON but not an object")]
    NotAnObject,
}

/// Pipeline errors that abort a run.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Failed to fetch unread messages: {0}")]
    Fetch(#[source] GoogleError),
}

/// Result type alias for the agent.
pub type Result<T> = std::result::Result<T, Error>;
