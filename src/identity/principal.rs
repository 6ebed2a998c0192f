use serde::{Deserialize, Serialize};

/// Verified identity extracted from a session token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Principal {
    pub username: String,
    pub role: String,
}
