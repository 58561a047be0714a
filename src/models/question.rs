//! Question bank model.

use serde::{Deserialize, Serialize};

/// How a question is answered.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum QuestionKind {
    /// Free text answer.
    #[default]
    Text,
    /// Pick one of the listed choices.
    Choice,
}

impl QuestionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionKind::Text => "text",
            QuestionKind::Choice => "choice",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "text" => Some(QuestionKind::Text),
            "choice" => Some(QuestionKind::Choice),
            _ => None,
        }
    }
}

/// A question at a (round, question) coordinate.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub round: i64,
    pub question: i64,
    pub prompt: String,
    #[serde(default, rename = "type")]
    pub kind: QuestionKind,
    #[serde(default)]
    pub choices: Vec<String>,
    /// Accepted answers, comma separated
    pub answer: String,
    pub points: i64,
}

impl Question {
    /// The first accepted answer, shown once the question is revealed.
    pub fn first_answer(&self) -> &str {
        self.answer.split(',').next().unwrap_or_default().trim()
    }
}

/// Request body for replacing the question bank.
#[derive(Debug, Clone, Deserialize)]
pub struct ImportQuestionsRequest {
    pub questions: Vec<Question>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_answer() {
        let question = Question {
            round: 1,
            question: 1,
            prompt: "Capital of France?".to_string(),
            kind: QuestionKind::Text,
            choices: vec![],
            answer: "Paris, paris france".to_string(),
            points: 2,
        };
        assert_eq!(question.first_answer(), "Paris");
    }

    #[test]
    fn test_kind_round_trips_through_column_text() {
        for kind in [QuestionKind::Text, QuestionKind::Choice] {
            assert_eq!(QuestionKind::from_str(kind.as_str()), Some(kind));
        }
        assert_eq!(QuestionKind::from_str("essay"), None);
    }

    #[test]
    fn test_question_json_uses_type_tag() {
        let question: Question = serde_json::from_str(
            r#"{"round":2,"question":3,"prompt":"Pick","type":"choice","choices":["a","b"],"answer":"a","points":1}"#,
        )
        .unwrap();
        assert_eq!(question.kind, QuestionKind::Choice);
        assert_eq!(question.choices, vec!["a", "b"]);
    }
}
