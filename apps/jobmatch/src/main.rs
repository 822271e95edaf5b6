use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use jobmatch::api_client::ProfileStore;
use jobmatch::models::{Document, Preferences};
use jobmatch::presentation::{present_snapshot, Currency, MatchCard, MatchListView};
use jobmatch::session::SessionId;
use jobmatch::{ApiClient, Collaborators, Config, Orchestrator};

#[derive(Debug, Parser)]
#[command(name = "jobmatch", version, about = "Match a CV against remote job opportunities")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Upload a CV (PDF, DOC, DOCX) and list ranked opportunities
    Match {
        path: PathBuf,
        /// Print the view model as JSON
        #[arg(long)]
        json: bool,
        /// Preferred currency, synced with the profile and used for salary lines
        /// (defaults to DISPLAY_CURRENCY)
        #[arg(long)]
        currency: Option<String>,
    },
    /// Show the stored profile for a session id
    Profile { session_id: String },
    /// Ask the backend to send test Slack notifications
    TestNotifications,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env()?;

    // Logs go to stderr so stdout stays clean for results
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting jobmatch v{}", env!("CARGO_PKG_VERSION"));
    let client = ApiClient::new(&config.api_base_url, config.request_timeout)?;
    info!("API client targeting {}", client.base_url());

    match cli.command {
        Command::Match {
            path,
            json,
            currency,
        } => {
            run_match(client, &config, path, json, caller_preferences(currency)).await
        }
        Command::Profile { session_id } => show_profile(&client, session_id).await,
        Command::TestNotifications => {
            let report = client.test_notifications(&CancellationToken::new()).await?;
            println!("Job notifications: {}", report.job_summary());
            println!("PR notifications:  {}", report.pr_summary());
            if !report.message.is_empty() {
                println!("{}", report.message);
            }
            Ok(())
        }
    }
}

async fn run_match(
    client: ApiClient,
    config: &Config,
    path: PathBuf,
    json: bool,
    preferences: Option<Preferences>,
) -> Result<()> {
    let currency = display_currency(preferences.as_ref(), config);
    let document = Document::from_path(&path)
        .await
        .with_context(|| format!("Failed to read '{}'", path.display()))?;

    let orchestrator = Orchestrator::new(
        Collaborators::from_client(client),
        config.pipeline_defaults(),
    );

    let mut phases = orchestrator.subscribe();
    let watcher = tokio::spawn(async move {
        while phases.changed().await.is_ok() {
            let phase = phases.borrow_and_update().phase;
            info!("Pipeline phase: {phase}");
        }
    });

    let outcome = tokio::select! {
        outcome = orchestrator.start_upload(document, preferences) => outcome,
        _ = tokio::signal::ctrl_c() => {
            orchestrator.retire();
            bail!("Interrupted");
        }
    };

    let snapshot = orchestrator.snapshot();
    drop(orchestrator);
    watcher.abort();
    outcome?;

    if let Some(session_id) = &snapshot.session_id {
        info!("Session id: {session_id}");
    }
    let view = present_snapshot(&snapshot, &currency);
    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
        return Ok(());
    }

    match &view {
        MatchListView::Ready(cards) => cards.iter().for_each(print_card),
        other => println!("{}", other.message().unwrap_or_default()),
    }
    Ok(())
}

/// Preferences the caller overrides on the command line, if any.
fn caller_preferences(currency: Option<String>) -> Option<Preferences> {
    currency.map(|code| Preferences {
        currency: Some(Currency::new(&code).code().to_string()),
        ..Default::default()
    })
}

fn display_currency(preferences: Option<&Preferences>, config: &Config) -> Currency {
    match preferences {
        Some(p) => Currency::for_preferences(p, &config.currency),
        None => config.currency.clone(),
    }
}

fn print_card(card: &MatchCard) {
    let badge = if card.high_priority { "  [High Match]" } else { "" };
    println!("{}{}", card.title, badge);
    println!(
        "  {} • {} • {} • {}",
        card.company, card.location, card.employment_type, card.salary
    );
    println!(
        "  Technical {}  Artistic {}  Overall {}",
        card.technical, card.artistic, card.overall
    );
    if !card.matched_keywords.is_empty() {
        println!("  Keywords: {}", card.matched_keywords.join(", "));
    }
    if let Some(url) = &card.url {
        println!("  {url}");
    }
    println!();
}

async fn show_profile(client: &ApiClient, session_id: String) -> Result<()> {
    let session_id = SessionId::from_raw(session_id);
    match client.fetch(&session_id, &CancellationToken::new()).await? {
        Some(profile) => println!("{}", serde_json::to_string_pretty(&profile)?),
        None => println!("No profile stored for {session_id}"),
    }
    Ok(())
}
