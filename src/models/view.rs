//! Player-facing view projections.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{Phase, Player, Question, QuestionKind};

/// A question as shown to players, without its accepted answers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct QuestionView {
    pub question: i64,
    pub prompt: String,
    #[serde(rename = "type")]
    pub kind: QuestionKind,
    pub choices: Vec<String>,
    pub points: i64,
}

impl From<&Question> for QuestionView {
    fn from(question: &Question) -> Self {
        Self {
            question: question.question,
            prompt: question.prompt.clone(),
            kind: question.kind,
            choices: question.choices.clone(),
            points: question.points,
        }
    }
}

/// A revealed response visible to every player.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ResponseView {
    pub name: String,
    pub answer: String,
    pub score: i64,
}

/// A question during answer review, with the responses revealed so far.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ReviewQuestion {
    pub question: QuestionView,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correct_answer: Option<String>,
    pub responses: Vec<ResponseView>,
}

/// Lobby view before the first round opens.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WaitingView {
    pub name: String,
    pub now: i64,
    pub leaderboard: Vec<Player>,
}

/// Open round: questions so far and the player's own answers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RoundView {
    pub name: String,
    pub now: i64,
    pub leaderboard: Vec<Player>,
    pub round: i64,
    pub questions: Vec<QuestionView>,
    /// Own answers keyed by question number
    pub answers: BTreeMap<i64, String>,
}

/// Closed round being walked through by the facilitator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ReviewView {
    pub name: String,
    pub now: i64,
    pub leaderboard: Vec<Player>,
    pub round: i64,
    /// Question under review, 0 before the first one
    pub question: i64,
    pub phase: Phase,
    pub questions: Vec<ReviewQuestion>,
}

/// What a polling player should render.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "view", rename_all = "camelCase")]
pub enum PlayerView {
    NotLoggedIn,
    Waiting(WaitingView),
    Round(RoundView),
    Review(ReviewView),
}
