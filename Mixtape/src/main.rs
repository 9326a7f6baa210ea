mod console;

use std::sync::Arc;

use mixconfig::get_config;
use mixcontrol::{ControllerOptions, TransitionController};
use mixplayer::{SimulatedPlayer, SimulatedPlayerOptions};
use mixplaylist::ClientBuilder;
use mixserver::{LoggingOptions, MixtapeApiExt, Server, ServerBuilder, init_logging};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = get_config();
    let log_state = init_logging(LoggingOptions::from_config(&config));

    // ========== PHASE 1 : Backend de génération ==========
    let mut server: Option<Server> = None;
    let mut client_builder = ClientBuilder::from_config(&config);

    if config.get_backend_embedded().unwrap_or(true) {
        info!("📡 Starting embedded playlist backend...");
        let mut s = ServerBuilder::new_configured().build();
        s.init_logging(log_state.clone()).await;
        s.init_mixtape_api().await?;
        s.start().await?;

        if let Some(addr) = s.local_addr() {
            client_builder = client_builder.api_base(format!("http://127.0.0.1:{}/api", addr.port()));
        }
        server = Some(s);
    } else {
        info!("🔗 Using remote playlist backend");
    }

    // ========== PHASE 2 : Lecteur et contrôleur ==========
    info!("📺 Powering the TV...");
    let client = client_builder.build()?;
    let player = Arc::new(SimulatedPlayer::new(SimulatedPlayerOptions::from_config(
        &config,
    )));
    let controller = TransitionController::spawn(
        Arc::new(client),
        player,
        ControllerOptions::from_config(&config),
    );

    // ========== PHASE 3 : Console ==========
    let renderer = tokio::spawn(console::render_loop(controller.watch()));

    match server.as_mut() {
        Some(s) => {
            tokio::select! {
                res = console::run(controller.clone()) => {
                    if let Err(e) = res {
                        warn!("⚠️ Console stopped: {}", e);
                    }
                }
                _ = s.wait() => {}
            }
        }
        None => {
            tokio::select! {
                res = console::run(controller.clone()) => {
                    if let Err(e) = res {
                        warn!("⚠️ Console stopped: {}", e);
                    }
                }
                _ = tokio::signal::ctrl_c() => info!("Ctrl+C reçu, arrêt"),
            }
        }
    }

    info!("👋 Switching off...");
    let _ = controller.shutdown().await;
    renderer.abort();
    if let Some(mut s) = server {
        s.stop();
    }

    Ok(())
}
