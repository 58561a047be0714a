//! Facilitator commands and the control panel they return.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{QuizState, Response};

/// A facilitator command, dispatched through `Repository::apply_command`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "command", rename_all = "camelCase")]
pub enum ControlCommand {
    /// Move the quiz forward one step.
    Advance,
    /// Move the quiz back one step.
    Retreat,
    /// Remove every player from the roster.
    KickPlayers,
    /// Return to the lobby and drop all responses.
    ResetState,
    /// Drop all responses and zero every score.
    ResetResponses,
    /// Replace awarded scores on the question currently being reviewed.
    OverrideScores {
        question: i64,
        scores: BTreeMap<String, i64>,
    },
}

impl ControlCommand {
    pub fn name(&self) -> &'static str {
        match self {
            ControlCommand::Advance => "advance",
            ControlCommand::Retreat => "retreat",
            ControlCommand::KickPlayers => "kickPlayers",
            ControlCommand::ResetState => "resetState",
            ControlCommand::ResetResponses => "resetResponses",
            ControlCommand::OverrideScores { .. } => "overrideScores",
        }
    }
}

/// Responses for the question under review, for manual scoring.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoringPanel {
    pub round: i64,
    pub question: i64,
    pub max_score: i64,
    pub responses: Vec<Response>,
}

/// What the facilitator sees after every command.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlPanel {
    pub state: QuizState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scoring: Option<ScoringPanel>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_wire_format() {
        let advance: ControlCommand = serde_json::from_str(r#"{"command":"advance"}"#).unwrap();
        assert_eq!(advance, ControlCommand::Advance);

        let kick: ControlCommand = serde_json::from_str(r#"{"command":"kickPlayers"}"#).unwrap();
        assert_eq!(kick, ControlCommand::KickPlayers);

        let overrides: ControlCommand = serde_json::from_str(
            r#"{"command":"overrideScores","question":2,"scores":{"alice":3,"bob":0}}"#,
        )
        .unwrap();
        match overrides {
            ControlCommand::OverrideScores { question, scores } => {
                assert_eq!(question, 2);
                assert_eq!(scores.get("alice"), Some(&3));
                assert_eq!(scores.get("bob"), Some(&0));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_unknown_command_rejected() {
        assert!(serde_json::from_str::<ControlCommand>(r#"{"command":"explode"}"#).is_err());
    }
}
