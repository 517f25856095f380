pub mod dispatcher;
pub mod filter;
pub mod retry;

pub use crate::domain::model::User;
pub use crate::domain::ports::{EventSink, FetchUsersClient, PushUsersClient};
pub use crate::utils::error::Result;
