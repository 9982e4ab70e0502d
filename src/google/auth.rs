//! Access token resolution.
//!
//! Token acquisition and refresh happen outside this program. We only read
//! an already-issued token: from `GOOGLE_ACCESS_TOKEN`, or from the
//! authorized-user JSON file a prior OAuth flow wrote.

use std::path::Path;

use secrecy::SecretString;
use serde::Deserialize;
use tracing::debug;

use crate::config::TriageConfig;
use crate::error::GoogleError;

/// Scopes the token must carry.
pub const SCOPES: [&str; 5] = [
    "https://www.googleapis.com/auth/gmail.readonly",
    "https://www.googleapis.com/auth/gmail.modify",
    "https://www.googleapis.com/auth/tasks",
    "https://www.googleapis.com/auth/calendar",
    "https://www.googleapis.com/auth/spreadsheets",
];

#[derive(Debug, Deserialize)]
struct TokenFile {
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    access_token: Option<String>,
}

/// Resolve the access token: explicit config first, then the token file.
pub fn load_access_token(config: &TriageConfig) -> Result<SecretString, GoogleError> {
    if let Some(token) = &config.access_token {
        debug!("Using access token from GOOGLE_ACCESS_TOKEN");
        return Ok(token.clone());
    }
    read_token_file(&config.token_path)
}

/// Read the `token` (or `access_token`) field of an authorized-user file.
pub fn read_token_file(path: &Path) -> Result<SecretString, GoogleError> {
    let raw = std::fs::read_to_string(path).map_err(|e| {
        GoogleError::Auth(format!("cannot read token file {}: {e}", path.display()))
    })?;

    let file: TokenFile = serde_json::from_str(&raw).map_err(|e| {
        GoogleError::Auth(format!("malformed token file {}: {e}", path.display()))
    })?;

    file.token
        .or(file.access_token)
        .filter(|t| !t.trim().is_empty())
        .map(|t| SecretString::from(t.trim().to_string()))
        .ok_or_else(|| GoogleError::Auth(format!("no access token in {}", path.display())))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use secrecy::ExposeSecret;

    use super::*;

    fn token_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn reads_authorized_user_token_field() {
        let file = token_file(
            r#"{"token": "ya29.abc", "refresh_token": "1//r", "client_id": "id", "scopes": []}"#,
        );
        let token = read_token_file(file.path()).unwrap();
        assert_eq!(token.expose_secret(), "ya29.abc");
    }

    #[test]
    fn falls_back_to_access_token_field() {
        let file = token_file(r#"{"access_token": "ya29.xyz", "expires_in": 3599}"#);
        assert_eq!(read_token_file(file.path()).unwrap().expose_secret(), "ya29.xyz");
    }

    #[test]
    fn missing_file_is_auth_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_token_file(&dir.path().join("token.json")).unwrap_err();
        assert!(matches!(err, GoogleError::Auth(ref m) if m.contains("cannot read")));
    }

    #[test]
    fn malformed_file_is_auth_error() {
        let file = token_file("not json");
        assert!(matches!(
            read_token_file(file.path()).unwrap_err(),
            GoogleError::Auth(ref m) if m.contains("malformed")
        ));
    }

    #[test]
    fn empty_token_is_auth_error() {
        let file = token_file(r#"{"token": "  ", "refresh_token": "1//r"}"#);
        assert!(matches!(
            read_token_file(file.path()).unwrap_err(),
            GoogleError::Auth(ref m) if m.contains("no access token")
        ));
    }

    #[test]
    fn explicit_token_wins_over_file() {
        let config = TriageConfig::from_lookup(|key| match key {
            "GEMINI_API_KEY" => Some("g".into()),
            "GOOGLE_SHEET_ID" => Some("s".into()),
            "GOOGLE_ACCESS_TOKEN" => Some("ya29.env".into()),
            "GOOGLE_TOKEN_PATH" => Some("/nonexistent/token.json".into()),
            _ => None,
        })
        .unwrap();
        assert_eq!(load_access_token(&config).unwrap().expose_secret(), "ya29.env");
    }
}
