mod calendar;
mod config;
mod error;
mod format;
mod graphql;
mod model;
mod routes;
mod state;
mod util;
mod views;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = config::Config::from_env().expect("invalid configuration");
    let port = config.port;
    tracing::info!(
        backend = %config.backend_address,
        proxy = %config.proxy_target,
        "configuration loaded"
    );

    let state = state::AppState::from_config(config).expect("client init failed");
    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .expect("failed to bind");

    tracing::info!(%port, "hubbit-web listening");
    axum::serve(listener, app).await.expect("server failed");
}
