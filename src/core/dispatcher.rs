use crate::core::filter::filter_users;
use crate::core::retry::Deadline;
use crate::core::{FetchUsersClient, PushUsersClient, User};
use crate::utils::error::{DispatchError, Result};

/// Orchestrates one fetch -> filter -> push sequence. Generic over the client
/// ports so tests can substitute fakes for the HTTP implementations.
pub struct Dispatcher<F: FetchUsersClient, P: PushUsersClient> {
    fetch_client: F,
    push_client: P,
    suffix: String,
}

impl<F: FetchUsersClient, P: PushUsersClient> Dispatcher<F, P> {
    pub fn new(fetch_client: F, push_client: P, suffix: impl Into<String>) -> Self {
        Self {
            fetch_client,
            push_client,
            suffix: suffix.into(),
        }
    }

    /// Runs the sequence once, stopping at the first failing stage. A failed
    /// push after a successful fetch has no compensating action. Returns the
    /// filtered users that were pushed.
    pub async fn dispatch(&self, deadline: Deadline) -> Result<Vec<User>> {
        tracing::info!("Fetching users...");
        let users = self
            .fetch_client
            .fetch_users(deadline)
            .await
            .map_err(|e| stage_error(e, DispatchError::FetchError))?;
        tracing::info!(count = users.len(), "Fetched users");

        let filtered = filter_users(users, &self.suffix);
        tracing::info!(count = filtered.len(), suffix = %self.suffix, "Filtered users");

        tracing::info!("Pushing users...");
        self.push_client
            .push_users(&filtered, deadline)
            .await
            .map_err(|e| stage_error(e, DispatchError::PushError))?;
        tracing::info!(count = filtered.len(), "Pushed users");

        Ok(filtered)
    }
}

// Cancellation is a whole-run condition, not a property of one stage, so it
// passes through without the per-operation wrapper.
fn stage_error(error: DispatchError, wrap: fn(Box<DispatchError>) -> DispatchError) -> DispatchError {
    if error.is_cancellation() {
        error
    } else {
        tracing::error!(error = %error, "Dispatch stage failed");
        wrap(Box::new(error))
    }
}
