use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use clap::{Parser, Subcommand};
use court_agents::{CourtConfig, RemoteAdjudicator};
use court_coordination::{
    AdjudicationError, Adjudicator, CourtSession, CourtStatus, InMemoryStore, SessionId, Side,
};
use tracing::{info, warn};

#[derive(Debug, Parser)]
#[command(name = "court-agents", about = "Two-party sealed-statement court")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print a fresh six-digit room code.
    NewCode,
    /// Run one full case in-process with two clients and print the final document.
    Demo {
        /// Room code; non-digits are stripped.
        #[arg(long)]
        room: Option<String>,
        #[arg(long)]
        statement_a: String,
        #[arg(long)]
        statement_b: String,
        /// Use a canned judge instead of the remote service.
        #[arg(long)]
        offline: bool,
    },
}

/// Local judge for runs without network access.
struct CannedJudge;

#[async_trait]
impl Adjudicator for CannedJudge {
    async fn adjudicate(
        &self,
        statement_a: &str,
        statement_b: &str,
    ) -> Result<String, AdjudicationError> {
        Ok(format!(
            "【判决】Both parties are heard. A said {} characters, B said {}. \
             Hug it out and split the chores evenly.",
            statement_a.chars().count(),
            statement_b.chars().count()
        ))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::NewCode => {
            println!("{}", SessionId::generate());
            Ok(())
        }
        Command::Demo {
            room,
            statement_a,
            statement_b,
            offline,
        } => run_demo(room, statement_a, statement_b, offline).await,
    }
}

async fn run_demo(
    room: Option<String>,
    statement_a: String,
    statement_b: String,
    offline: bool,
) -> Result<()> {
    let session_id = match room {
        Some(code) => SessionId::parse_room_code(&code)?,
        None => SessionId::generate(),
    };

    let judge: Box<dyn Adjudicator> = if offline {
        Box::new(CannedJudge)
    } else {
        let config = CourtConfig::from_env().context("reading court configuration")?;
        if !config.has_credentials() {
            warn!("No API key set (COURT_API_KEY / API_KEY); the verdict request will fail");
        }
        info!(model = %config.model, base_url = %config.base_url, "Using remote judge");
        Box::new(RemoteAdjudicator::from_config(&config)?)
    };

    let store = InMemoryStore::new().shared();
    let mut party_a = CourtSession::join(store.clone(), session_id.clone()).await?;
    let mut party_b = CourtSession::join(store, session_id.clone()).await?;
    info!(room = %session_id, "Both parties joined");

    party_a.select_side(Side::A)?;
    party_a.set_statement(Side::A, statement_a).await?;
    party_a.toggle_seal(Side::A).await?;

    party_b.select_side(Side::B)?;
    party_b.set_statement(Side::B, statement_b).await?;
    party_b.toggle_seal(Side::B).await?;

    party_a.sync_pending()?;
    let status = party_a.open_court(judge.as_ref()).await?;
    party_b.sync_pending()?;

    if status == CourtStatus::Failed {
        if let Some(reason) = &party_b.snapshot().failure_reason {
            warn!(kind = %reason.kind, "{}", reason.message);
        }
    }
    info!(summary = %party_a.transition_summary(), "Case closed");

    println!("{}", serde_json::to_string_pretty(party_b.snapshot())?);
    Ok(())
}
