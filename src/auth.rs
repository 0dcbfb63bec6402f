//! Obtaining a valid session: cached, refreshed, or interactive.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use google_calendar::Client;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use tracing::info;

use crate::credentials::ClientCredentials;
use crate::session::{SessionData, SessionStore};

/// Read-only calendar access is all the program ever needs.
pub const SCOPES: &[&str] = &["https://www.googleapis.com/auth/calendar.readonly"];

const REDIRECT_PORT: u16 = 8085;

pub fn redirect_uri() -> String {
    format!("http://localhost:{}/callback", REDIRECT_PORT)
}

pub fn redirect_address() -> String {
    format!("127.0.0.1:{}", REDIRECT_PORT)
}

/// The interactive consent step. Pluggable so tests can supply a fixed
/// session without touching a browser.
#[async_trait]
pub trait Authorizer {
    async fn authorize(&self, creds: &ClientCredentials) -> Result<SessionData>;
}

/// Ensure a valid session: use the stored one if still valid, refresh it
/// transparently when a refresh token exists, otherwise run the
/// interactive flow. Any new session is persisted before returning.
pub async fn authenticate<S, A>(
    store: &S,
    authorizer: &A,
    creds: &ClientCredentials,
    now: DateTime<Utc>,
) -> Result<SessionData>
where
    S: SessionStore,
    A: Authorizer,
{
    match store.load()? {
        Some(session) if session.is_valid(now) => Ok(session),
        Some(session) if session.has_refresh_token() => {
            let refreshed = refresh_session(creds, &session).await?;
            store.save(&refreshed)?;
            Ok(refreshed)
        }
        _ => {
            let session = authorizer.authorize(creds).await?;
            store.save(&session)?;
            Ok(session)
        }
    }
}

/// Exchange the refresh token for a fresh access token.
pub async fn refresh_session(
    creds: &ClientCredentials,
    session: &SessionData,
) -> Result<SessionData> {
    let client = api_client(creds, session);

    let tokens = client
        .refresh_access_token()
        .await
        .context("Failed to refresh token")?;

    let expires_at = if tokens.expires_in > 0 {
        Some(Utc::now() + Duration::seconds(tokens.expires_in))
    } else {
        None
    };

    // Google typically doesn't return a new refresh_token on refresh
    let refresh_token = if tokens.refresh_token.is_empty() {
        session.refresh_token.clone()
    } else {
        tokens.refresh_token
    };

    Ok(SessionData {
        access_token: tokens.access_token,
        refresh_token,
        expires_at,
    })
}

/// Authenticated API client for the account.
pub fn api_client(creds: &ClientCredentials, session: &SessionData) -> Client {
    Client::new(
        creds.client_id.clone(),
        creds.client_secret.clone(),
        redirect_uri(),
        session.access_token.clone(),
        session.refresh_token.clone(),
    )
}

/// Browser-based consent against a loopback callback listener.
///
/// Blocks until the user completes (or abandons) the consent screen;
/// there is deliberately no timeout.
pub struct InstalledFlow;

#[async_trait]
impl Authorizer for InstalledFlow {
    async fn authorize(&self, creds: &ClientCredentials) -> Result<SessionData> {
        let scopes: Vec<String> = SCOPES.iter().map(|s| s.to_string()).collect();

        let mut client = Client::new(
            creds.client_id.clone(),
            creds.client_secret.clone(),
            redirect_uri(),
            String::new(),
            String::new(),
        );

        let auth_url = client.user_consent_url(&scopes);

        eprintln!("\nOpen this URL in your browser to authenticate:\n");
        eprintln!("{}\n", auth_url);

        // Try to open the browser automatically
        if open::that(&auth_url).is_err() {
            eprintln!("(Could not open browser automatically, please copy the URL above)");
        }

        let (code, state) = wait_for_callback().await?;

        info!("received authorization code, exchanging for tokens");

        let tokens = client.get_access_token(&code, &state).await?;

        let expires_at = if tokens.expires_in > 0 {
            Some(Utc::now() + Duration::seconds(tokens.expires_in))
        } else {
            None
        };

        Ok(SessionData {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            expires_at,
        })
    }
}

async fn wait_for_callback() -> Result<(String, String)> {
    let listener = TcpListener::bind(redirect_address())
        .await
        .context("Failed to bind OAuth callback listener")?;

    let (stream, _) = listener
        .accept()
        .await
        .context("Failed to accept OAuth callback")?;

    let mut reader = BufReader::new(stream);
    let mut request_line = String::new();
    reader
        .read_line(&mut request_line)
        .await
        .context("Failed to read OAuth callback request line")?;

    // Parse the request to get the code and state
    let url_part = request_line
        .split_whitespace()
        .nth(1)
        .ok_or_else(|| anyhow::anyhow!("Invalid HTTP request"))?;

    let url = url::Url::parse(&format!("http://localhost{}", url_part))?;

    let code = url
        .query_pairs()
        .find(|(k, _)| k == "code")
        .map(|(_, v)| v.to_string())
        .ok_or_else(|| anyhow::anyhow!("No code in callback"))?;

    let state = url
        .query_pairs()
        .find(|(k, _)| k == "state")
        .map(|(_, v)| v.to_string())
        .ok_or_else(|| anyhow::anyhow!("No state in callback"))?;

    // Send a response to the browser
    let response = "HTTP/1.1 200 OK\r\n\
        Content-Type: text/html\r\n\
        Connection: close\r\n\
        \r\n\
        <html><body>\
        <h1>Authentication successful!</h1>\
        <p>You can close this window and return to the terminal.</p>\
        </body></html>";

    let mut stream = reader.into_inner();
    stream
        .write_all(response.as_bytes())
        .await
        .context("Failed to write OAuth callback response")?;
    stream.flush().await?;

    Ok((code, state))
}
