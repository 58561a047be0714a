//! Quiz state singleton.

use serde::{Deserialize, Serialize};

/// Where the quiz is in its round cycle.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    /// Round 0: players gather in the lobby.
    NotStarted,
    /// Questions are being shown and answers collected.
    Active,
    /// Round closed; the current question's answer is about to be revealed.
    Armed,
    /// The current question's answer and scores are visible.
    Revealed,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::NotStarted => "not_started",
            Phase::Active => "active",
            Phase::Armed => "armed",
            Phase::Revealed => "revealed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "not_started" => Some(Phase::NotStarted),
            "active" => Some(Phase::Active),
            "armed" => Some(Phase::Armed),
            "revealed" => Some(Phase::Revealed),
            _ => None,
        }
    }

    /// Whether the round is closed and answers are being walked through.
    pub fn is_review(&self) -> bool {
        matches!(self, Phase::Armed | Phase::Revealed)
    }
}

/// The single coordinate every client renders from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct QuizState {
    pub round: i64,
    pub question: i64,
    pub phase: Phase,
}

impl QuizState {
    pub const fn initial() -> Self {
        Self {
            round: 0,
            question: 0,
            phase: Phase::NotStarted,
        }
    }

    pub const fn new(round: i64, question: i64, phase: Phase) -> Self {
        Self {
            round,
            question,
            phase,
        }
    }

    /// Whether a concrete question is on screen during answer review.
    pub fn is_scoring(&self) -> bool {
        self.phase.is_review() && self.question > 0
    }
}

impl Default for QuizState {
    fn default() -> Self {
        Self::initial()
    }
}
