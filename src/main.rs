use rocketc::{config::Config, provision, rocketchat::{HttpTransport, RocketChat}, AppResult, AppState};
use tower_http::cors::CorsLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> AppResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;
    info!(rocketchat = %config.private_url, admin = ?config.admin, "configuration loaded");

    let transport = HttpTransport::connect(&config).await?;
    let app_state = AppState {
        client: RocketChat::new(transport, config.password_salt.clone()),
        public_url: config.public_url.clone(),
    };

    // course pages embedding the chat live on another origin
    let app = provision::router()
        .with_state(app_state)
        .layer(CorsLayer::permissive());

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!(addr = %config.bind_addr, "listening");
    axum::serve(listener, app).await?;

    Ok(())
}
