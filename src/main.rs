use std::net::SocketAddr;

use axum::http::Method;
use tower_http::cors::{Any, CorsLayer};

use furia_api::database::connection;
use furia_api::services::scheduler;
use furia_api::{app, AppState};

#[tokio::main]
async fn main() {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Connect to the document store
    let store = connection::connect().await;

    let jwt_secret = std::env::var("JWT_SECRET").unwrap_or_else(|_| "secret".to_string());
    let state = AppState {
        store: store.clone(),
        jwt_secret,
    };

    // Archival also runs on its own clock, not just on page loads
    scheduler::spawn_archival_loop(store);

    // CORS configuration
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any)
        .allow_origin(Any);

    let app = app(state).layer(cors);

    let bind = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
    let addr: SocketAddr = bind.parse().expect("BIND_ADDR must be host:port");
    tracing::info!("Server running on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
