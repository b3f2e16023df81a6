//! Showrunner console host entry point.
//!
//! Stands in for the embedding application: loads a script, connects the
//! engine to the shared session store when one is configured, renders
//! beats to the terminal, and maps stdin commands onto the control
//! surface.

use std::error::Error;
use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use showrunner_core::clock::SystemClock;
use showrunner_core::session::SessionStore;
use showrunner_engine::{Presenter, PresenterConfig, SceneBindings, Script};
use showrunner_store::PgSessionStore;

mod render;
mod scene;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Initialize tracing subscriber. Logs go to stderr so rendered beats
    // own stdout.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("Starting Showrunner console host");

    // Read configuration from environment.
    let script_path = std::env::var("SCRIPT_PATH")
        .map_err(|_| "SCRIPT_PATH environment variable must be set")?;
    let script_source = std::fs::read_to_string(&script_path)
        .map_err(|e| format!("cannot read {script_path}: {e}"))?;
    let script: Script =
        serde_yaml::from_str(&script_source).map_err(|e| format!("invalid {script_path}: {e}"))?;
    tracing::info!(beats = script.len(), mode = ?script.mode(), "script loaded");

    // An unreachable database disables remote sync, never the show.
    let store: Option<Arc<dyn SessionStore>> = match std::env::var("DATABASE_URL") {
        Ok(database_url) => {
            match PgPoolOptions::new()
                .max_connections(5)
                .connect(&database_url)
                .await
            {
                Ok(pool) => Some(Arc::new(PgSessionStore::new(pool))),
                Err(error) => {
                    tracing::warn!(%error, "database unreachable; running local-only");
                    None
                }
            }
        }
        Err(_) => {
            tracing::info!("DATABASE_URL not set; running local-only");
            None
        }
    };

    let config = PresenterConfig {
        bindings: SceneBindings {
            preshow: std::env::var("PRESHOW_OBJECT").ok(),
            cue: std::env::var("CUE_OBJECT").ok(),
        },
        ..PresenterConfig::default()
    };

    let presenter = Presenter::spawn(
        script,
        config,
        Arc::new(SystemClock),
        Arc::new(scene::LoggingSceneNotifier),
        None,
        store,
    )
    .await;

    let renderer = render::spawn_renderer(presenter.events());

    println!("commands: start | restart | quit");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match line.trim() {
            "start" => presenter.start().await,
            "restart" => presenter.restart().await,
            "quit" => break,
            "" => {}
            other => println!("unknown command: {other}"),
        }
    }

    presenter.shutdown().await;
    renderer.abort();
    Ok(())
}
