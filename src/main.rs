use std::sync::Arc;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, BufReader};

use kok::config::AppConfig;
use kok::shell::{Flow, Shell};
use kok::store::{KeyValueStore, LibSqlStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = AppConfig::from_env()?;

    eprintln!("🚑 KOK v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Store: {}", config.db_path.display());
    eprintln!(
        "   Map: {}",
        if config.kakao_api_key.is_some() {
            "Kakao Local API"
        } else {
            "unavailable (set KAKAO_REST_API_KEY)"
        }
    );
    eprintln!("   Type 'help' for commands, 'start' to begin. /quit to exit.\n");

    // ── Store ────────────────────────────────────────────────────────────
    let store: Arc<dyn KeyValueStore> = Arc::new(
        LibSqlStore::new_local(&config.db_path)
            .await
            .with_context(|| format!("Failed to open store at {}", config.db_path.display()))?,
    );

    let mut shell = Shell::new(config, store);

    // ── REPL ─────────────────────────────────────────────────────────────
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    eprint!("{} > ", shell.route());
    while let Some(line) = lines.next_line().await? {
        match shell.handle(&line).await {
            Ok(Flow::Continue(out)) => {
                if !out.is_empty() {
                    println!("{out}");
                }
            }
            Ok(Flow::Quit) => break,
            Err(e) => tracing::error!(error = %e, "Command failed"),
        }
        eprint!("{} > ", shell.route());
    }

    tracing::info!("Shutting down");
    Ok(())
}
