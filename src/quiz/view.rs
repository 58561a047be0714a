//! Player view projection.
//!
//! Read-only: builds what a polling player should render from the quiz state,
//! question bank, responses and roster.

use std::collections::BTreeMap;

use crate::db::Repository;
use crate::errors::AppError;
use crate::models::{
    Phase, PlayerView, QuestionView, QuizState, ResponseView, ReviewQuestion, ReviewView,
    RoundView, WaitingView,
};

/// Project the current view for `name`.
pub async fn project(
    repo: &Repository,
    name: &str,
    admin_name: &str,
    now: i64,
) -> Result<PlayerView, AppError> {
    let state = repo.get_state().await?;
    let leaderboard = repo.leaderboard(admin_name).await?;
    let name = name.to_string();

    match state.phase {
        Phase::NotStarted => Ok(PlayerView::Waiting(WaitingView {
            name,
            now,
            leaderboard,
        })),
        Phase::Active => {
            let questions = repo
                .round_questions(state.round, Some(state.question))
                .await?;
            let answers = repo
                .player_responses(state.round, &name)
                .await?
                .into_iter()
                .map(|response| (response.question, response.answer))
                .collect();

            Ok(PlayerView::Round(RoundView {
                name,
                now,
                leaderboard,
                round: state.round,
                questions: questions.iter().map(QuestionView::from).collect(),
                answers,
            }))
        }
        Phase::Armed | Phase::Revealed => {
            let questions = repo.round_questions(state.round, None).await?;

            let mut grouped: BTreeMap<i64, Vec<ResponseView>> = BTreeMap::new();
            for response in repo.visible_responses(state.round).await? {
                grouped
                    .entry(response.question)
                    .or_default()
                    .push(ResponseView {
                        name: response.name,
                        answer: response.answer,
                        score: response.score,
                    });
            }

            let questions = questions
                .iter()
                .map(|question| ReviewQuestion {
                    question: QuestionView::from(question),
                    correct_answer: is_revealed(&state, question.question)
                        .then(|| question.first_answer().to_string()),
                    responses: grouped.remove(&question.question).unwrap_or_default(),
                })
                .collect();

            Ok(PlayerView::Review(ReviewView {
                name,
                now,
                leaderboard,
                round: state.round,
                question: state.question,
                phase: state.phase,
                questions,
            }))
        }
    }
}

/// Whether the answer to `question` of the current round has been shown.
fn is_revealed(state: &QuizState, question: i64) -> bool {
    question < state.question || (question == state.question && state.phase == Phase::Revealed)
}
