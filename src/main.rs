//! SDN DDoS Dataset Collector
//!
//! This is the main entry point for the collector service.
//! It initializes the telemetry engine, starts the polling task and
//! serves the administrative API.

use actix_web::{web, App, HttpServer};
use dotenv::dotenv;
use log::info;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

use sdn_ddos_collector::api::{self, ApiState};
use sdn_ddos_collector::config;
use sdn_ddos_collector::core::{
    AttackerRegistry, CollectorEngine, DatasetSink, FlowHistoryStore, FlowLabeler, FlowStatsPoller,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables
    dotenv().ok();

    // Initialize logging
    env_logger::init();

    info!("Starting SDN DDoS dataset collector...");

    // Load configuration
    let config = config::load_config().expect("Failed to load configuration");
    let config = Arc::new(config);

    // Initialize the dataset sink; failing to create the file is fatal
    let sink = DatasetSink::initialize(Path::new(&config.collector.dataset_dir))
        .expect("Failed to create dataset file");

    // Assemble the collector engine
    let attackers = Arc::new(AttackerRegistry::new());
    let labeler = FlowLabeler::new(config.labeling.mode, config.labeling.thresholds.clone());
    let engine = Arc::new(CollectorEngine::new(
        FlowHistoryStore::new(),
        attackers.clone(),
        labeler,
        sink,
    ));

    // Southbound boundary: the protocol layer feeds switch events in
    // and consumes stats requests out
    let (event_tx, event_rx) = mpsc::channel(64);
    let (request_tx, request_rx) = mpsc::channel(64);

    let poller = FlowStatsPoller::new(
        engine,
        event_rx,
        request_tx,
        Duration::from_secs(config.collector.poll_interval_seconds),
    );
    tokio::spawn(poller.run());

    // Held for the lifetime of the process; the embedding control
    // plane attaches to these endpoints
    let _southbound = (event_tx, request_rx);

    // Create API state
    let state = web::Data::new(ApiState {
        attackers,
        config: config.clone(),
    });

    // Start HTTP server
    HttpServer::new(move || App::new().app_data(state.clone()).configure(api::config))
        .bind((config.server.host.as_str(), config.server.port))?
        .run()
        .await
}
