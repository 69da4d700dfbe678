use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::Parser;
use client_core::{AddressBookController, AddressBookSync, HttpAddressLookup};
use storage::Storage;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod repl;
mod settings;

use repl::{execute, parse_line, Flow};
use settings::{load_settings, normalize_database_url};

#[derive(Parser, Debug)]
#[command(about = "Find addresses by postcode and keep a local address book")]
struct Args {
    /// TOML settings file; defaults to ./address_book.toml when present.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    lookup_url: Option<String>,
    #[arg(long)]
    database_url: Option<String>,
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let mut settings = load_settings(args.config.as_deref())?;
    if let Some(url) = args.lookup_url {
        settings.lookup_base_url = url;
    }
    if let Some(url) = args.database_url {
        settings.database_url = url;
    }
    if let Some(level) = args.log_level {
        settings.log_level = level;
    }

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&settings.log_level)),
        )
        .init();

    let database_url = normalize_database_url(&settings.database_url);
    let storage = Storage::new(&database_url).await.map_err(|error| {
        error!(
            %database_url,
            %error,
            "failed to open SQLite database; verify parent directory exists and permissions are correct"
        );
        error
    })?;
    let lookup = HttpAddressLookup::new(&settings.lookup_base_url)
        .with_context(|| format!("invalid lookup url '{}'", settings.lookup_base_url))?;
    info!(lookup = %lookup.endpoint(), %database_url, "address book starting");

    let mut controller = AddressBookController::new(lookup, AddressBookSync::new(Arc::new(storage)));
    let mut stdout = tokio::io::stdout();

    if let Err(err) = controller.load_saved_addresses().await {
        stdout
            .write_all(format!("warning: {err:#}\n").as_bytes())
            .await?;
    }
    stdout.write_all(repl::HELP.as_bytes()).await?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;
        let Some(line) = lines.next_line().await? else {
            break;
        };

        let mut out = String::new();
        let flow = match parse_line(&line) {
            Ok(Some(command)) => execute(&mut controller, command, &mut out).await,
            Ok(None) => Flow::Continue,
            Err(err) => {
                out.push_str(&err.render().to_string());
                Flow::Continue
            }
        };
        stdout.write_all(out.as_bytes()).await?;
        if flow == Flow::Quit {
            break;
        }
    }

    Ok(())
}
