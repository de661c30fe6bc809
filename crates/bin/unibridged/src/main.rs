//! # unibridged — unibridge daemon
//!
//! Composition root that wires all adapters together and runs the bridge.
//!
//! ## Responsibilities
//! - Load configuration (file, env vars) and initialise logging
//! - Compile the rules, logging every malformed expression
//! - Construct the controller, notifier and presentation adapters
//! - Build the bridge and run its event loop
//! - Build the axum router over the bridge handle, bind and serve
//! - Handle graceful shutdown (SIGINT) through a cancellation token
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no domain logic belongs here.

mod config;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use unibridge_adapter_http_axum::board::CircuitBoard;
use unibridge_adapter_http_axum::state::AppState;
use unibridge_adapter_virtual::VirtualController;
use unibridge_adapter_webhook::IftttNotifier;
use unibridge_app::bridge::{Bridge, BridgeSettings};
use unibridge_domain::rule::RuleSet;

use crate::config::Config;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&config.logging.filter)?)
        .init();

    // Rules
    let (rules, errors) = RuleSet::compile(&config.rules);
    for error in &errors {
        tracing::warn!(%error, "rule ignored");
    }
    tracing::info!(rules = rules.len(), malformed = errors.len(), "rules compiled");

    // Adapters
    let controller = match &config.controller.board {
        Some(path) => {
            let json = std::fs::read_to_string(path)?;
            VirtualController::new(unibridge_adapter_virtual::board::from_json(&json)?)
        }
        None => VirtualController::demo(),
    };
    let notifier = IftttNotifier::new(config.webhook())?;
    let board = CircuitBoard::new();

    // Bridge
    let settings = BridgeSettings {
        aliases: config.aliases.clone(),
        tuning: config.config.clone(),
        rooms: config.rooms.clone(),
        aggregation: config.aggregate,
        rules,
    };
    let bridge = Bridge::new(settings, controller, board.clone(), notifier);
    let handle = bridge.handle();
    let cancel = CancellationToken::new();
    let bridge_task = tokio::spawn(bridge.run(cancel.clone()));

    // HTTP
    let app = unibridge_adapter_http_axum::router::build(AppState::new(handle, board));
    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(%bind_addr, "unibridged listening");

    let shutdown = cancel.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            if let Err(err) = tokio::signal::ctrl_c().await {
                tracing::error!(%err, "cannot listen for shutdown signal");
            }
            tracing::info!("shutdown requested");
            shutdown.cancel();
        })
        .await?;

    cancel.cancel();
    bridge_task.await?;
    Ok(())
}
