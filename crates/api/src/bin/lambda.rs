//! Gatehouse API - AWS Lambda Runtime
//!
//! Entry point for deploying the API as an AWS Lambda function behind
//! API Gateway. Uses lambda_http to integrate the Axum router with the
//! Lambda runtime.

use lambda_http::{run, Error};
use tower_http::trace::TraceLayer;
use tracing::info;

use gatehouse_api::{build_state, create_app};
use gatehouse_common::{config::Config, response::cors_layer};

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Lambda-compatible JSON logging; Lambda adds timestamps itself
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .json()
        .without_time()
        .init();

    info!("Initializing Gatehouse API Lambda");

    let config = Config::from_env().map_err(|e| Error::from(format!("Config error: {}", e)))?;

    let state = build_state(&config).await;

    let app = create_app(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer());

    info!("Gatehouse API Lambda ready to serve requests");

    run(app).await
}
