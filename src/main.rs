use clap::Parser;
use env_logger::Env;
use tokio::net::TcpListener;

use catan_session::application::{router, AppState};
use catan_session::{GameSession, ServerConfig, SettlersEngine, VERSION};

#[tokio::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = ServerConfig::parse();
    let session = GameSession::new(
        SettlersEngine::new(config.rules_config()),
        config.session_config(),
    );
    let app = router(AppState::new(session));

    let address = config.bind_address();
    let listener = TcpListener::bind(&address).await?;
    log::info!(
        "Starting Catan session server {} on {} (automated seats: {:?})",
        VERSION,
        address,
        config.strategy
    );

    axum::serve(listener, app).await
}
