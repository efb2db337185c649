//! `tallierd`: one tallier process. Loads its settings, brings up the TLS clique listener, and
//! hands the orchestrator to whatever front door is embedding this binary (spec §1 "explicitly
//! out of scope": ballot ingestion, the websocket front door, and the relational store proper
//! all live outside this crate; this binary only starts the core's own long-running pieces).

use std::sync::Arc;

use clap::Parser;
use tallier_clique::{CliqueManager, TlsMaterial};
use tallier_node::{Cli, ElectionStore, InMemoryStore, Orchestrator, Settings};
use tokio::signal::unix::{signal, SignalKind};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = Settings::load(cli.config)?;
    init_tracing(&settings.log);

    info!(self_id = settings.self_id, addr = %settings.listen_addr, "starting tallier process");

    let tls = TlsMaterial::load(
        &settings.tls.cert_path,
        &settings.tls.key_path,
        &settings.tls.ca_path,
        &settings.tls.peer_domain,
    )?;
    let clique = CliqueManager::new(settings.self_id, settings.listen_addr, tls);

    // The relational store (spec §1) is out of scope for this crate; `InMemoryStore` is the
    // reference persistence implementation this binary ships with until it is wired to one.
    let store: Arc<dyn ElectionStore> = Arc::new(InMemoryStore::new());
    let orchestrator = Orchestrator::new(clique.clone(), settings.self_id, store);
    orchestrator.on_startup().await?;

    let listener = tokio::spawn(clique.listen());

    tokio::select! {
        result = run_until_signal() => result?,
        result = listener => {
            if let Ok(Err(e)) = result {
                error!(error = %e, "clique listener exited unexpectedly");
            }
            return Ok(());
        }
    }
    info!("shutting down");
    Ok(())
}

fn init_tracing(log: &tallier_node::LogSettings) {
    let filter = EnvFilter::try_new(&log.level).unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::fmt().with_env_filter(filter);
    if log.json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}

async fn run_until_signal() -> anyhow::Result<()> {
    let mut term = signal(SignalKind::terminate())?;
    let mut interrupt = signal(SignalKind::interrupt())?;
    tokio::select! {
        _ = term.recv() => info!("received SIGTERM"),
        _ = interrupt.recv() => info!("received SIGINT"),
    }
    Ok(())
}

#[cfg(not(unix))]
compile_error!("tallierd's signal handling is unix-only, matching the rest of this corpus's deployment target");
