//! Submitted answers.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One player's answer to one question.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    pub round: i64,
    pub question: i64,
    pub name: String,
    pub answer: String,
    pub score: i64,
    /// Withheld from other players and from totals until the answer is revealed
    pub hidden: bool,
}

/// Request body for submitting answers.
///
/// `answers` is keyed by question number. When `round` is omitted the
/// current round is assumed.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitAnswersRequest {
    #[serde(default)]
    pub round: Option<i64>,
    pub answers: BTreeMap<i64, String>,
}
