use crate::core::retry::Deadline;
use crate::domain::model::User;
use crate::utils::error::{DispatchError, Result};
use async_trait::async_trait;

#[async_trait]
pub trait FetchUsersClient: Send + Sync {
    async fn fetch_users(&self, deadline: Deadline) -> Result<Vec<User>>;
}

#[async_trait]
pub trait PushUsersClient: Send + Sync {
    async fn push_users(&self, users: &[User], deadline: Deadline) -> Result<()>;
}

/// Structured event sink for the retry executor and the transport clients.
/// Injected instead of logging through globals so tests can assert on the
/// emitted events.
pub trait EventSink: Send + Sync {
    fn attempt_failed(&self, attempt: u32, error: &DispatchError);
    fn users_fetched(&self, count: usize);
    fn users_pushed(&self, count: usize);
}
