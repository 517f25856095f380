use serde::{Deserialize, Serialize};

/// The record flowing through fetch -> filter -> push. Upstream payloads may
/// carry more fields; everything beyond these two is ignored on decode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub email: String,
    pub name: String,
}
