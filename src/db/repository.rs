//! Database repository for quiz state, players, questions and responses.
//!
//! Commands that touch more than one row run inside a single transaction so a
//! failed request leaves the previously committed state intact.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use chrono::Utc;
use sqlx::sqlite::{SqliteConnection, SqliteRow};
use sqlx::{Row, SqlitePool};

use crate::errors::AppError;
use crate::models::{
    ControlCommand, ControlPanel, Phase, Player, Question, QuestionKind, QuizState, Response,
    ScoringPanel,
};
use crate::quiz::{self, QuestionLayout};

/// Database repository for all data operations.
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Get the current revision ID.
    pub async fn get_revision_id(&self) -> Result<i64, AppError> {
        let row = sqlx::query("SELECT revision_id FROM state WHERE id = 1")
            .fetch_optional(&self.pool)
            .await?
            .ok_or(AppError::MissingState)?;
        Ok(row.get("revision_id"))
    }

    /// Get the current quiz state.
    pub async fn get_state(&self) -> Result<QuizState, AppError> {
        let mut conn = self.pool.acquire().await?;
        let (state, _) = fetch_state(&mut conn).await?;
        Ok(state)
    }

    // ==================== PLAYER OPERATIONS ====================

    /// Get a player by name.
    pub async fn get_player(&self, name: &str) -> Result<Option<Player>, AppError> {
        let row = sqlx::query("SELECT name, score, last_seen FROM players WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(player_from_row))
    }

    /// Log a player in, creating them on first login.
    ///
    /// A name held by someone who polled within `window_secs` is refused unless
    /// the caller already carries that identity or it is the admin name.
    pub async fn login(
        &self,
        name: &str,
        caller: Option<&str>,
        admin_name: &str,
        window_secs: i64,
    ) -> Result<Player, AppError> {
        let now = Utc::now().timestamp();

        if let Some(existing) = self.get_player(name).await? {
            let idle = now - existing.last_seen > window_secs;
            if !(idle || caller == Some(name) || name == admin_name) {
                return Err(AppError::Conflict(format!(
                    "Player {} is already logged in",
                    name
                )));
            }
            self.touch_player(name, now).await?;
            return Ok(Player {
                last_seen: now,
                ..existing
            });
        }

        // A returning name keeps the total of its already revealed responses
        let row = sqlx::query(
            r#"INSERT INTO players (name, score, last_seen)
               VALUES (?, COALESCE(
                   (SELECT SUM(score) FROM responses WHERE name = ? AND hidden = 0),
                   0), ?)
               ON CONFLICT(name) DO NOTHING
               RETURNING name, score, last_seen"#,
        )
        .bind(name)
        .bind(name)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(player_from_row(&row)),
            None => Err(AppError::Conflict(format!(
                "Player {} is already logged in",
                name
            ))),
        }
    }

    /// Record that a player polled. Returns false when the player is unknown.
    pub async fn touch_player(&self, name: &str, now: i64) -> Result<bool, AppError> {
        let result = sqlx::query("UPDATE players SET last_seen = ? WHERE name = ?")
            .bind(now)
            .bind(name)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Players ordered by score, highest first, excluding the admin identity.
    pub async fn leaderboard(&self, admin_name: &str) -> Result<Vec<Player>, AppError> {
        let rows = sqlx::query(
            "SELECT name, score, last_seen FROM players WHERE name != ? ORDER BY score DESC, rowid ASC",
        )
        .bind(admin_name)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(player_from_row).collect())
    }

    /// Remove every player. Players rejoin by logging in again.
    pub async fn clear_players(&self) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM players")
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    // ==================== QUESTION OPERATIONS ====================

    /// List the whole question bank in round/question order.
    pub async fn list_questions(&self) -> Result<Vec<Question>, AppError> {
        let rows = sqlx::query(
            "SELECT round_num, question_num, prompt, kind, choices, answer, points FROM questions ORDER BY round_num, question_num",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(question_from_row).collect())
    }

    /// List a round's questions, optionally only up to a question number.
    pub async fn round_questions(
        &self,
        round: i64,
        up_to: Option<i64>,
    ) -> Result<Vec<Question>, AppError> {
        let rows = sqlx::query(
            "SELECT round_num, question_num, prompt, kind, choices, answer, points FROM questions WHERE round_num = ? AND question_num <= ? ORDER BY question_num",
        )
        .bind(round)
        .bind(up_to.unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(question_from_row).collect())
    }

    /// Get a question by coordinate.
    pub async fn get_question(
        &self,
        round: i64,
        question: i64,
    ) -> Result<Option<Question>, AppError> {
        let mut conn = self.pool.acquire().await?;
        fetch_question(&mut conn, round, question).await
    }

    /// Replace the question bank with `questions`.
    pub async fn replace_questions(&self, questions: &[Question]) -> Result<usize, AppError> {
        validate_questions(questions)?;

        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM questions")
            .execute(&mut *tx)
            .await?;

        for question in questions {
            let choices_json = serde_json::to_string(&question.choices)?;
            sqlx::query(
                "INSERT INTO questions (round_num, question_num, prompt, kind, choices, answer, points) VALUES (?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(question.round)
            .bind(question.question)
            .bind(&question.prompt)
            .bind(question.kind.as_str())
            .bind(&choices_json)
            .bind(&question.answer)
            .bind(question.points)
            .execute(&mut *tx)
            .await?;
        }

        bump_revision(&mut tx).await?;
        tx.commit().await?;

        Ok(questions.len())
    }

    // ==================== RESPONSE OPERATIONS ====================

    /// Submit a player's answers for the round that is currently open.
    ///
    /// Answers for another round, for a closed round, from the admin identity
    /// or for questions that do not exist are accepted without effect. An
    /// unchanged answer is not written again. Returns how many rows changed.
    pub async fn submit_answers(
        &self,
        name: &str,
        admin_name: &str,
        round: Option<i64>,
        answers: &BTreeMap<i64, String>,
    ) -> Result<usize, AppError> {
        if name == admin_name {
            return Ok(0);
        }

        let mut tx = self.pool.begin().await?;
        let (state, _) = fetch_state(&mut tx).await?;
        let round = round.unwrap_or(state.round);

        if round != state.round || state.phase != Phase::Active {
            tracing::debug!(
                "Ignoring answers from {} for round {} while quiz is at {:?}",
                name,
                round,
                state
            );
            return Ok(0);
        }

        let mut written = 0;
        for (&question_num, answer) in answers {
            let Some(question) = fetch_question(&mut tx, round, question_num).await? else {
                tracing::debug!("Ignoring answer from {} to unknown question {}", name, question_num);
                continue;
            };

            let existing = sqlx::query(
                "SELECT answer FROM responses WHERE round_num = ? AND question_num = ? AND name = ?",
            )
            .bind(round)
            .bind(question_num)
            .bind(name)
            .fetch_optional(&mut *tx)
            .await?;

            let existing_answer: Option<String> = existing.map(|row| row.get("answer"));
            if existing_answer.as_deref() == Some(answer.as_str()) {
                continue;
            }

            let score = quiz::auto_score(answer, &question.answer, question.points);

            if existing_answer.is_none() {
                sqlx::query(
                    "INSERT INTO responses (round_num, question_num, name, answer, score, hidden) VALUES (?, ?, ?, ?, ?, 1)",
                )
                .bind(round)
                .bind(question_num)
                .bind(name)
                .bind(answer)
                .bind(score)
                .execute(&mut *tx)
                .await?;
            } else {
                sqlx::query(
                    "UPDATE responses SET answer = ?, score = ? WHERE round_num = ? AND question_num = ? AND name = ?",
                )
                .bind(answer)
                .bind(score)
                .bind(round)
                .bind(question_num)
                .bind(name)
                .execute(&mut *tx)
                .await?;
            }

            tracing::debug!(
                "Recorded answer from {} for {}.{} scoring {}",
                name,
                round,
                question_num,
                score
            );
            written += 1;
        }

        if written > 0 {
            bump_revision(&mut tx).await?;
        }
        tx.commit().await?;

        Ok(written)
    }

    /// Get the response a player gave to one question.
    pub async fn get_response(
        &self,
        round: i64,
        question: i64,
        name: &str,
    ) -> Result<Option<Response>, AppError> {
        let row = sqlx::query(
            "SELECT round_num, question_num, name, answer, score, hidden FROM responses WHERE round_num = ? AND question_num = ? AND name = ?",
        )
        .bind(round)
        .bind(question)
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(response_from_row))
    }

    /// A player's own responses in a round, hidden or not.
    pub async fn player_responses(&self, round: i64, name: &str) -> Result<Vec<Response>, AppError> {
        let rows = sqlx::query(
            "SELECT round_num, question_num, name, answer, score, hidden FROM responses WHERE round_num = ? AND name = ? ORDER BY question_num",
        )
        .bind(round)
        .bind(name)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(response_from_row).collect())
    }

    /// Every revealed response in a round, in submission order.
    pub async fn visible_responses(&self, round: i64) -> Result<Vec<Response>, AppError> {
        let rows = sqlx::query(
            "SELECT round_num, question_num, name, answer, score, hidden FROM responses WHERE round_num = ? AND hidden = 0 ORDER BY question_num, rowid",
        )
        .bind(round)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(response_from_row).collect())
    }

    /// Every response to one question, including hidden ones.
    pub async fn question_responses(
        &self,
        round: i64,
        question: i64,
    ) -> Result<Vec<Response>, AppError> {
        let rows = sqlx::query(
            "SELECT round_num, question_num, name, answer, score, hidden FROM responses WHERE round_num = ? AND question_num = ? ORDER BY rowid",
        )
        .bind(round)
        .bind(question)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(response_from_row).collect())
    }

    // ==================== CONTROL OPERATIONS ====================

    /// Apply a facilitator command and return the resulting state.
    pub async fn apply_command(&self, command: &ControlCommand) -> Result<QuizState, AppError> {
        // Reset also recreates a missing state row
        if *command == ControlCommand::ResetState {
            return self.reset_state().await;
        }

        let mut tx = self.pool.begin().await?;
        let (current, revision_id) = fetch_state(&mut tx).await?;

        let next = match command {
            ControlCommand::Advance => {
                let layout = load_layout(&mut tx).await?;
                let transition = quiz::advance(current, &layout);
                if transition.reveal {
                    sqlx::query(
                        "UPDATE responses SET hidden = 0 WHERE round_num <= ? AND question_num <= ?",
                    )
                    .bind(transition.next.round)
                    .bind(transition.next.question)
                    .execute(&mut *tx)
                    .await?;
                    recompute_scores(&mut tx).await?;
                }
                transition.next
            }
            ControlCommand::Retreat => {
                let layout = load_layout(&mut tx).await?;
                quiz::retreat(current, &layout)
            }
            ControlCommand::KickPlayers => {
                sqlx::query("DELETE FROM players").execute(&mut *tx).await?;
                current
            }
            ControlCommand::ResetState => unreachable!("reset is applied by reset_state"),
            ControlCommand::ResetResponses => {
                sqlx::query("DELETE FROM responses")
                    .execute(&mut *tx)
                    .await?;
                recompute_scores(&mut tx).await?;
                current
            }
            ControlCommand::OverrideScores { question, scores } => {
                if !current.is_scoring() {
                    return Err(AppError::Validation(
                        "No question is being reviewed".to_string(),
                    ));
                }
                if *question != current.question {
                    return Err(AppError::Validation(format!(
                        "Question {} is not the one under review ({})",
                        question, current.question
                    )));
                }

                for (name, score) in scores {
                    let result = sqlx::query(
                        "UPDATE responses SET score = ? WHERE round_num = ? AND question_num = ? AND name = ?",
                    )
                    .bind(*score)
                    .bind(current.round)
                    .bind(current.question)
                    .bind(name)
                    .execute(&mut *tx)
                    .await?;
                    if result.rows_affected() == 0 {
                        tracing::debug!("No response from {} to override", name);
                    }
                }

                // Totals only move once the answer is on screen
                if current.phase == Phase::Revealed {
                    recompute_scores(&mut tx).await?;
                }
                current
            }
        };

        sqlx::query(
            "UPDATE state SET round_num = ?, question_num = ?, phase = ?, revision_id = ? WHERE id = 1",
        )
        .bind(next.round)
        .bind(next.question)
        .bind(next.phase.as_str())
        .bind(revision_id + 1)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(
            "Applied {}: round {} question {} {:?} -> round {} question {} {:?}",
            command.name(),
            current.round,
            current.question,
            current.phase,
            next.round,
            next.question,
            next.phase
        );

        Ok(next)
    }

    /// Return to the lobby with no responses, recreating the state row if it is gone.
    async fn reset_state(&self) -> Result<QuizState, AppError> {
        let mut tx = self.pool.begin().await?;

        let revision_id: i64 = sqlx::query("SELECT revision_id FROM state WHERE id = 1")
            .fetch_optional(&mut *tx)
            .await?
            .map(|row| row.get("revision_id"))
            .unwrap_or(0);

        sqlx::query("DELETE FROM responses")
            .execute(&mut *tx)
            .await?;
        recompute_scores(&mut tx).await?;

        let next = QuizState::initial();
        sqlx::query(
            "INSERT OR REPLACE INTO state (id, round_num, question_num, phase, revision_id) VALUES (1, ?, ?, ?, ?)",
        )
        .bind(next.round)
        .bind(next.question)
        .bind(next.phase.as_str())
        .bind(revision_id + 1)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!("Applied resetState: back to the lobby");
        Ok(next)
    }

    /// Current state plus the scoring tools for the question under review.
    pub async fn control_panel(&self) -> Result<ControlPanel, AppError> {
        let state = self.get_state().await?;

        let scoring = if state.is_scoring() {
            let max_score = self
                .get_question(state.round, state.question)
                .await?
                .map(|q| q.points)
                .unwrap_or(0);
            let responses = self.question_responses(state.round, state.question).await?;
            Some(ScoringPanel {
                round: state.round,
                question: state.question,
                max_score,
                responses,
            })
        } else {
            None
        };

        Ok(ControlPanel { state, scoring })
    }
}

// Helpers shared by pooled and transactional paths

async fn fetch_state(conn: &mut SqliteConnection) -> Result<(QuizState, i64), AppError> {
    let row = sqlx::query("SELECT round_num, question_num, phase, revision_id FROM state WHERE id = 1")
        .fetch_optional(&mut *conn)
        .await?
        .ok_or(AppError::MissingState)?;

    let state = state_from_row(&row)?;
    Ok((state, row.get("revision_id")))
}

async fn fetch_question(
    conn: &mut SqliteConnection,
    round: i64,
    question: i64,
) -> Result<Option<Question>, AppError> {
    let row = sqlx::query(
        "SELECT round_num, question_num, prompt, kind, choices, answer, points FROM questions WHERE round_num = ? AND question_num = ?",
    )
    .bind(round)
    .bind(question)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(row.as_ref().map(question_from_row))
}

async fn load_layout(conn: &mut SqliteConnection) -> Result<QuestionLayout, AppError> {
    let rows = sqlx::query("SELECT round_num, question_num FROM questions")
        .fetch_all(&mut *conn)
        .await?;

    Ok(QuestionLayout::from_coordinates(rows.iter().map(|row| {
        (
            row.get::<i64, _>("round_num"),
            row.get::<i64, _>("question_num"),
        )
    })))
}

/// Set every player's total to the sum of their revealed response scores.
async fn recompute_scores(conn: &mut SqliteConnection) -> Result<(), AppError> {
    sqlx::query(
        r#"UPDATE players SET score = COALESCE(
               (SELECT SUM(responses.score) FROM responses
                WHERE responses.name = players.name AND responses.hidden = 0),
               0)"#,
    )
    .execute(&mut *conn)
    .await?;
    Ok(())
}

async fn bump_revision(conn: &mut SqliteConnection) -> Result<(), AppError> {
    let result = sqlx::query("UPDATE state SET revision_id = revision_id + 1 WHERE id = 1")
        .execute(&mut *conn)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::MissingState);
    }
    Ok(())
}

fn validate_questions(questions: &[Question]) -> Result<(), AppError> {
    let mut seen = HashSet::new();
    for question in questions {
        if question.round < 1 || question.question < 1 {
            return Err(AppError::Validation(format!(
                "Question {}.{} must have round and question numbers of at least 1",
                question.round, question.question
            )));
        }
        if !seen.insert((question.round, question.question)) {
            return Err(AppError::Validation(format!(
                "Question {}.{} appears more than once",
                question.round, question.question
            )));
        }
        if question.prompt.trim().is_empty() {
            return Err(AppError::Validation(format!(
                "Question {}.{} has no prompt",
                question.round, question.question
            )));
        }
        if question.points < 0 {
            return Err(AppError::Validation(format!(
                "Question {}.{} has negative points",
                question.round, question.question
            )));
        }
    }

    // Advancing only steps to the next number, so gaps are unreachable
    let mut rounds: BTreeMap<i64, BTreeSet<i64>> = BTreeMap::new();
    for (round, question) in seen {
        rounds.entry(round).or_default().insert(question);
    }
    for (expected_round, (round, numbers)) in (1..).zip(&rounds) {
        if *round != expected_round {
            return Err(AppError::Validation(format!(
                "Round {} is missing before round {}",
                expected_round, round
            )));
        }
        for (expected, number) in (1..).zip(numbers) {
            if *number != expected {
                return Err(AppError::Validation(format!(
                    "Question {}.{} is missing before question {}.{}",
                    round, expected, round, number
                )));
            }
        }
    }
    Ok(())
}

// Helper functions for row conversion

fn player_from_row(row: &SqliteRow) -> Player {
    Player {
        name: row.get("name"),
        score: row.get("score"),
        last_seen: row.get("last_seen"),
    }
}

fn question_from_row(row: &SqliteRow) -> Question {
    let kind: String = row.get("kind");
    let choices: String = row.get("choices");
    Question {
        round: row.get("round_num"),
        question: row.get("question_num"),
        prompt: row.get("prompt"),
        kind: QuestionKind::from_str(&kind).unwrap_or_default(),
        choices: serde_json::from_str(&choices).unwrap_or_default(),
        answer: row.get("answer"),
        points: row.get("points"),
    }
}

fn response_from_row(row: &SqliteRow) -> Response {
    let hidden: i32 = row.get("hidden");
    Response {
        round: row.get("round_num"),
        question: row.get("question_num"),
        name: row.get("name"),
        answer: row.get("answer"),
        score: row.get("score"),
        hidden: hidden != 0,
    }
}

fn state_from_row(row: &SqliteRow) -> Result<QuizState, AppError> {
    let phase: String = row.get("phase");
    let phase = Phase::from_str(&phase)
        .ok_or_else(|| AppError::Internal(format!("Unknown quiz phase {}", phase)))?;
    Ok(QuizState {
        round: row.get("round_num"),
        question: row.get("question_num"),
        phase,
    })
}
