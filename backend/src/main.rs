use std::net::SocketAddr;

use axum::{
    http::Method,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, Level};

mod db;
mod domain;
mod error;
mod format;
mod rest;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .init();

    // The connection target is the one required piece of configuration.
    // Missing it is fatal at startup, never a per-request error.
    let database_url = std::env::var("DATABASE_URL").map_err(|_| {
        anyhow::anyhow!("Missing database connection target. Please define DATABASE_URL")
    })?;

    info!("Setting up database");
    let db = db::DbConnection::new(&database_url).await?;

    let state = rest::AppState::new(
        domain::BusinessService::new(db.clone()),
        domain::ReviewService::new(db),
    );

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any);

    let app = Router::new()
        .route("/", get(rest::index))
        .route(
            "/businesses",
            post(rest::create_business).get(rest::list_businesses),
        )
        .route(
            "/businesses/:business_id",
            get(rest::get_business)
                .put(rest::update_business)
                .delete(rest::delete_business),
        )
        .route(
            "/owners/:owner_id/businesses",
            get(rest::list_owner_businesses),
        )
        .route("/reviews", post(rest::create_review))
        .route(
            "/reviews/:review_id",
            get(rest::get_review)
                .put(rest::update_review)
                .delete(rest::delete_review),
        )
        .route("/users/:user_id/reviews", get(rest::list_user_reviews))
        .layer(cors)
        .with_state(state);

    let addr = SocketAddr::from(([127, 0, 0, 1], 8080));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
