#[macro_use]
extern crate diesel;
use std::time::Duration;

use crate::{
    configuration::Configuration,
    configuration_handler::ConfigurationHandler,
    database_interface::DatabaseInterface,
    http::{create_app, AppState},
    local_backend::LocalBackend,
};
use tokio::time::sleep;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

mod availability;
mod backend;
mod configuration;
mod configuration_handler;
mod database_interface;
mod error;
mod http;
mod local_backend;
mod payment;
mod schema;
#[cfg(test)]
mod testutils;
mod token;
mod types;

#[tokio::main]
async fn main() {
    // Before the subscriber, so RUST_LOG from .env applies.
    let dotenv = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
    if let Err(err) = dotenv {
        warn!(%err, "No .env file loaded");
    }

    println!("#################");
    println!("# Clinic Portal #");
    println!("#################");

    let configuration = ConfigurationHandler::parse_arguments();

    let address = format!("0.0.0.0:{}", configuration.port());
    let listener = match tokio::net::TcpListener::bind(&address).await {
        Ok(listener) => listener,
        Err(err) => {
            error!(?err, "Failed to bind {address}");
            std::process::exit(1);
        }
    };
    info!("Accessable at {address}");

    let app = if let Some(database_url) = configuration.database_url() {
        let backend = loop {
            match DatabaseInterface::new(&database_url) {
                Ok(backend) => {
                    info!("Successfully connected to database");
                    break backend;
                }
                Err(err) => {
                    error!(?err, "Failed to establish database connection. Retry in 1 sec. You may want to restart it with database disabled (impersistent bookings).");
                    sleep(Duration::from_secs(1)).await;
                }
            }
        };
        create_app(AppState::new(backend, &configuration))
    } else {
        warn!("No database configured, bookings are kept in memory only");
        let backend = LocalBackend::with_example_treatments();
        create_app(AppState::new(backend, &configuration))
    };

    if let Err(err) = axum::serve(listener, app).await {
        error!(?err, "Server terminated");
        std::process::exit(1);
    }
}
