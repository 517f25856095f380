pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use crate::adapters::http::{HttpFetchClient, HttpPushClient};
pub use crate::config::DispatchConfig;
pub use crate::core::dispatcher::Dispatcher;
pub use crate::core::retry::{Deadline, RetryPolicy};
pub use crate::utils::error::{DispatchError, Result};
