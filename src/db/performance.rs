use color_eyre::Result;

use super::helpers::{new_id, now};
use super::models::{NewPerformance, PerformanceModel};
use super::Db;

impl Db {
    pub async fn insert_performance(&self, record: &NewPerformance) -> Result<String> {
        let id = new_id();

        sqlx::query(
            r#"
            INSERT INTO performances
                (id, user_id, topic, difficulty, question_text, user_answer, correct_answer, is_correct, time_taken, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&record.user_id)
        .bind(&record.topic)
        .bind(&record.difficulty)
        .bind(&record.question_text)
        .bind(&record.user_answer)
        .bind(&record.correct_answer)
        .bind(record.is_correct)
        .bind(record.time_taken)
        .bind(now())
        .execute(&self.pool)
        .await?;

        tracing::info!(
            "performance recorded: id={id}, user={:?}, correct={}",
            record.user_id,
            record.is_correct
        );
        Ok(id)
    }

    /// All answers submitted by the user, oldest first.
    pub async fn performances_for_user(&self, user_id: &str) -> Result<Vec<PerformanceModel>> {
        let rows = sqlx::query_as::<_, PerformanceModel>(
            r#"
            SELECT topic, difficulty, is_correct, time_taken, created_at
            FROM performances
            WHERE user_id = ?
            ORDER BY created_at ASC, rowid ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn anonymous_performance_count(&self) -> Result<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM performances WHERE user_id IS NULL")
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }
}
