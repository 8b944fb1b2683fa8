use color_eyre::Result;
use sqlx::types::Json;

use super::helpers::{new_id, now};
use super::models::{NewQuestionHistory, QuestionHistoryModel};
use super::Db;

impl Db {
    pub async fn insert_question_history(&self, record: &NewQuestionHistory) -> Result<String> {
        let id = new_id();

        sqlx::query(
            r#"
            INSERT INTO question_history
                (id, topic, difficulty, question_text, options, correct_answer, generated_at, generated_by_user_id)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&record.topic)
        .bind(&record.difficulty)
        .bind(&record.question_text)
        .bind(Json(&record.options))
        .bind(&record.correct_answer)
        .bind(now())
        .bind(&record.generated_by_user_id)
        .execute(&self.pool)
        .await?;

        tracing::info!(
            "question history recorded: id={id}, topic={}, difficulty={}",
            record.topic,
            record.difficulty
        );
        Ok(id)
    }

    /// Most recent generated questions, newest first.
    pub async fn recent_question_history(&self, limit: i64) -> Result<Vec<QuestionHistoryModel>> {
        let rows = sqlx::query_as::<_, QuestionHistoryModel>(
            r#"
            SELECT id, topic, difficulty, question_text, options, correct_answer, generated_at, generated_by_user_id
            FROM question_history
            ORDER BY generated_at DESC, rowid DESC
            LIMIT ?
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn question_history_count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM question_history")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
