//! Player roster model.

use serde::{Deserialize, Serialize};

/// A player identified by name, with their revealed total score.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub name: String,
    pub score: i64,
    /// Unix seconds of the last login or poll
    pub last_seen: i64,
}

/// Request body for joining the quiz.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub name: String,
}
