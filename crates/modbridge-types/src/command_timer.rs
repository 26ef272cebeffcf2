//! Value types embedded in [`crate::entity::Entity`]: chat commands and
//! round-robin timer messages.

use serde::{Deserialize, Serialize};

/// A `!trigger` -> response mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    pub trigger: String,
    pub response: String,
    pub attachment_id: Option<String>,
}

/// One entry in an entity's round-robin timer rotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timer {
    pub message: String,
    pub attachment_id: Option<String>,
}
