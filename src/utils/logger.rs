use crate::domain::ports::EventSink;
use crate::utils::error::DispatchError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub fn init_logger(verbose: bool) {
    let filter = if verbose {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("user_dispatch=debug,info"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("user_dispatch=info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .init();
}

/// Production [`EventSink`]: forwards retry and transport events to `tracing`.
#[derive(Debug, Clone, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn attempt_failed(&self, attempt: u32, error: &DispatchError) {
        tracing::warn!(attempt, error = %error, "Retrying after error");
    }

    fn users_fetched(&self, count: usize) {
        tracing::info!(count, "Fetched users from API");
    }

    fn users_pushed(&self, count: usize) {
        tracing::info!(count, "Pushed users to API");
    }
}
