use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use upnext::auth::{self, InstalledFlow};
use upnext::config::Config;
use upnext::credentials;
use upnext::event::format_event;
use upnext::finder::EventFinder;
use upnext::remote::GoogleCalendar;
use upnext::session::SessionFile;

/// Printed when no qualifying event exists.
const NO_EVENT: &str = "None";

/// Printed when the run fails; details go to the log, never to the user.
const FAILURE: &str = "Err";

#[tokio::main]
async fn main() {
    let config = match Config::load() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err:#}");
            println!("{FAILURE}");
            return;
        }
    };

    if let Err(err) = config.log_path().and_then(|path| init_logging(&path)) {
        eprintln!("{err:#}");
        println!("{FAILURE}");
        return;
    }

    info!("Running.");

    match run(&config).await {
        Ok(Some(line)) => println!("{line}"),
        Ok(None) => println!("{NO_EVENT}"),
        Err(err) => {
            error!("{err:#}");
            println!("{FAILURE}");
        }
    }
}

/// Append-only log file with timestamp and severity; stdout stays
/// reserved for the single result line.
fn init_logging(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::sync::Mutex::new(file))
        .with_ansi(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber).context("Failed to set up logging")?;

    Ok(())
}

async fn run(config: &Config) -> Result<Option<String>> {
    let creds = credentials::load(&config.credentials_path()?)?;
    let store = SessionFile::new(config.token_path()?);
    let tz = config.display_timezone()?;

    // Captured once; the window and all filtering use this instant.
    let now = Utc::now();

    let session = auth::authenticate(&store, &InstalledFlow, &creds, now)
        .await
        .context("Authentication")?;

    let source = GoogleCalendar::new(auth::api_client(&creds, &session));
    let finder = EventFinder::new(source, now);

    Ok(finder
        .closest_event()
        .await
        .map(|event| format_event(&event, tz)))
}
