//! The OAuth client registration (authorization secret file).
//!
//! `credentials.json` is downloaded from the Google Cloud console and is
//! read-only input to the interactive flow; this program never writes it.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

/// The client registration itself: id, secret, registered redirects.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientCredentials {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default)]
    pub redirect_uris: Vec<String>,
}

/// Google wraps the registration in an `installed` or `web` section
/// depending on the application type chosen at creation.
#[derive(Debug, Deserialize)]
struct CredentialsFile {
    installed: Option<ClientCredentials>,
    web: Option<ClientCredentials>,
}

pub fn load(path: &Path) -> Result<ClientCredentials> {
    if !path.exists() {
        anyhow::bail!(
            "Client credentials not found.\n\n\
            Download an OAuth client secret for a desktop application from\n\
            https://console.cloud.google.com/apis/credentials and save it to\n\
            {}.",
            path.display()
        );
    }

    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read credentials from {}", path.display()))?;

    let file: CredentialsFile = serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse credentials from {}", path.display()))?;

    file.installed
        .or(file.web)
        .with_context(|| format!("No 'installed' or 'web' section in {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_installed_descriptor() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        std::fs::write(
            &path,
            r#"{
                "installed": {
                    "client_id": "id.apps.googleusercontent.com",
                    "project_id": "upnext-test",
                    "client_secret": "secret",
                    "redirect_uris": ["http://localhost"]
                }
            }"#,
        )
        .unwrap();

        let creds = load(&path).unwrap();
        assert_eq!(creds.client_id, "id.apps.googleusercontent.com");
        assert_eq!(creds.client_secret, "secret");
        assert_eq!(creds.redirect_uris, vec!["http://localhost".to_string()]);
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();

        assert!(load(&dir.path().join("credentials.json")).is_err());
    }
}
