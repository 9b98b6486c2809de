use std::sync::Arc;

use digiwall::config::WallConfig;
use digiwall::remote::MemoryStore;
use digiwall::session::WallSession;

#[tokio::main]
async fn main() {
    let dotenv = dotenvy::dotenv();
    tracing_subscriber::fmt::init();
    if let Err(e) = dotenv {
        tracing::debug!(error = %e, "no .env file loaded");
    }

    let config = match WallConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "invalid configuration");
            std::process::exit(2);
        }
    };

    let store = Arc::new(MemoryStore::new());
    let mut session = match WallSession::spawn(store, &config).await {
        Ok(session) => session,
        Err(e) => {
            tracing::error!(error = %e, "failed to open note feed");
            std::process::exit(1);
        }
    };
    tracing::info!(session_id = %session.id(), device = ?config.device, "digiwall running; ctrl-c to stop");

    loop {
        tokio::select! {
            action = session.next_action() => match action {
                Some(action) => tracing::debug!(?action, "presentation action"),
                None => break,
            },
            signal = tokio::signal::ctrl_c() => {
                if let Err(e) = signal {
                    tracing::warn!(error = %e, "ctrl-c handler failed");
                }
                break;
            }
        }
    }

    session.shutdown().await;
}
