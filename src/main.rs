use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use tama_push_api::{
    app_state::AppState,
    config::read_config,
    domain::transport::WebPushTransport,
    repositories::InMemorySubscriptionStore,
    router,
};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = read_config().expect("Failed to read configuration");

    let transport =
        WebPushTransport::new(&settings.push).expect("Failed to initialize the push transport");
    let store = InMemorySubscriptionStore::new();

    let app_state = AppState::new(Arc::new(store), Arc::new(transport), settings.push.clone());
    let app = router::create(app_state, &settings);

    let address = format!(
        "{}:{}",
        settings.application.host, settings.application.port
    );
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .expect("Failed to bind address");

    tracing::info!("Push relay listening on {}", address);
    axum::serve(listener, app).await.expect("Server crashed");
}
