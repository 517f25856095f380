use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use user_dispatch::domain::ports::EventSink;
use user_dispatch::utils::logger::{self, TracingSink};
use user_dispatch::utils::validation::Validate;
use user_dispatch::{Deadline, DispatchConfig, Dispatcher, HttpFetchClient, HttpPushClient};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = DispatchConfig::parse();

    logger::init_logger(config.verbose);

    tracing::info!("Starting user-dispatch");
    if config.verbose {
        tracing::debug!("Config: {:?}", config);
    }

    if let Err(e) = config.validate() {
        tracing::error!("Configuration validation failed: {}", e);
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }

    let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;

    let events: Arc<dyn EventSink> = Arc::new(TracingSink);
    let policy = config.retry_policy();
    let fetch_client = HttpFetchClient::new(
        config.fetch_url.clone(),
        policy.clone(),
        client.clone(),
        events.clone(),
    );
    let push_client = HttpPushClient::new(config.push_url.clone(), policy, client, events);

    let dispatcher = Dispatcher::new(fetch_client, push_client, config.suffix.clone());
    let deadline = Deadline::within(config.timeout());

    match dispatcher.dispatch(deadline).await {
        Ok(users) => {
            tracing::info!(count = users.len(), "Dispatch completed");
            println!("✅ Dispatched {} users", users.len());
        }
        Err(e) => {
            tracing::error!("Dispatch failed: {}", e);
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    }

    Ok(())
}
