//! Question bank seeding from a JSON file.

use std::path::Path;

use crate::errors::AppError;
use crate::models::Question;

/// Read a JSON array of questions from `path`.
pub async fn load_questions_file(path: &Path) -> Result<Vec<Question>, AppError> {
    let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
        AppError::Internal(format!(
            "Failed to read questions file {}: {}",
            path.display(),
            e
        ))
    })?;
    let questions = serde_json::from_str(&raw)?;
    Ok(questions)
}

/// Replace the question bank with the contents of `path`.
pub async fn seed_questions(
    repo: &super::Repository,
    path: &Path,
) -> Result<usize, AppError> {
    let questions = load_questions_file(path).await?;
    let count = repo.replace_questions(&questions).await?;
    tracing::info!("Seeded {} questions from {:?}", count, path);
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::QuestionKind;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_load_questions_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("questions.json");
        std::fs::write(
            &path,
            r#"[
                {"round": 1, "question": 1, "prompt": "2 + 2?", "answer": "4,four", "points": 1},
                {"round": 1, "question": 2, "prompt": "Pick red", "type": "choice",
                 "choices": ["red", "blue"], "answer": "red", "points": 2}
            ]"#,
        )
        .unwrap();

        let questions = load_questions_file(&path).await.unwrap();
        assert_eq!(questions.len(), 2);
        assert_eq!(questions[0].kind, QuestionKind::Text);
        assert!(questions[0].choices.is_empty());
        assert_eq!(questions[1].kind, QuestionKind::Choice);
        assert_eq!(questions[1].points, 2);
    }

    #[tokio::test]
    async fn test_missing_file_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let err = load_questions_file(&temp_dir.path().join("absent.json"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Internal(_)));
    }
}
