//! Database module for SQLite persistence.
//!
//! SQLite is the source of truth for quiz state, players, questions and responses.

mod repository;
mod seed;

pub use repository::*;
pub use seed::*;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;

/// Initialize the database connection pool and run migrations.
pub async fn init_database(db_path: &Path) -> Result<SqlitePool, sqlx::Error> {
    // Ensure the parent directory exists
    if let Some(parent) = db_path.parent() {
        tokio::fs::create_dir_all(parent).await.ok();
    }

    let db_url = format!("sqlite:{}?mode=rwc", db_path.display());

    let options = SqliteConnectOptions::from_str(&db_url)?
        .create_if_missing(true)
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
        .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
        .busy_timeout(std::time::Duration::from_secs(30));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    // Run embedded migrations
    run_migrations(&pool).await?;

    Ok(pool)
}

/// Run database migrations.
async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    // The single quiz state row every reader and writer goes through
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS state (
            id INTEGER PRIMARY KEY CHECK (id = 1),
            round_num INTEGER NOT NULL DEFAULT 0,
            question_num INTEGER NOT NULL DEFAULT 0,
            phase TEXT NOT NULL DEFAULT 'not_started',
            revision_id INTEGER NOT NULL DEFAULT 0
        );

        INSERT OR IGNORE INTO state (id, round_num, question_num, phase, revision_id)
        VALUES (1, 0, 0, 'not_started', 0);
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS players (
            name TEXT PRIMARY KEY,
            score INTEGER NOT NULL DEFAULT 0,
            last_seen INTEGER NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS questions (
            round_num INTEGER NOT NULL,
            question_num INTEGER NOT NULL,
            prompt TEXT NOT NULL,
            kind TEXT NOT NULL DEFAULT 'text',
            choices TEXT NOT NULL DEFAULT '[]',
            answer TEXT NOT NULL,
            points INTEGER NOT NULL DEFAULT 1,
            PRIMARY KEY (round_num, question_num)
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS responses (
            round_num INTEGER NOT NULL,
            question_num INTEGER NOT NULL,
            name TEXT NOT NULL,
            answer TEXT NOT NULL,
            score INTEGER NOT NULL DEFAULT 0,
            hidden INTEGER NOT NULL DEFAULT 1,
            PRIMARY KEY (round_num, question_num, name)
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create indexes for common queries
    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_responses_name ON responses(name, hidden);
        CREATE INDEX IF NOT EXISTS idx_players_score ON players(score);
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
