use color_eyre::Result;

use super::helpers::{new_id, now};
use super::models::{AuthUser, ClientInfo, UserProfile, ROLE_STUDENT};
use super::Db;

impl Db {
    /// Fetch the user by email, creating it on first login, and stamp `last_login`.
    pub async fn upsert_user_on_login(&self, profile: &UserProfile) -> Result<AuthUser> {
        let now = now();
        let user = sqlx::query_as::<_, AuthUser>(
            r#"
            INSERT INTO users (id, email, first_name, last_name, role, created_at, last_login)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(email) DO UPDATE SET last_login = excluded.last_login
            RETURNING id, email, first_name, last_name, role
            "#,
        )
        .bind(new_id())
        .bind(&profile.email)
        .bind(&profile.first_name)
        .bind(&profile.last_name)
        .bind(ROLE_STUDENT)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!("user logged in: id={}, email={}", user.id, user.email);
        Ok(user)
    }

    pub async fn set_user_role(&self, user_id: &str, role: &str) -> Result<()> {
        sqlx::query("UPDATE users SET role = ? WHERE id = ?")
            .bind(role)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        tracing::info!("role of user {user_id} set to {role}");
        Ok(())
    }

    pub async fn create_user_session(&self, user_id: &str, client: &ClientInfo) -> Result<String> {
        let token = new_id();

        sqlx::query(
            r#"
            INSERT INTO user_sessions (id, user_id, session_token, login_time, ip_address, user_agent, is_active)
            VALUES (?, ?, ?, ?, ?, ?, 1)
            "#,
        )
        .bind(new_id())
        .bind(user_id)
        .bind(&token)
        .bind(now())
        .bind(&client.ip_address)
        .bind(&client.user_agent)
        .execute(&self.pool)
        .await?;

        tracing::info!("new user session created for user_id={user_id}");
        Ok(token)
    }

    pub async fn get_user_by_session(&self, token: &str) -> Result<Option<AuthUser>> {
        let user = sqlx::query_as::<_, AuthUser>(
            r#"
            SELECT u.id, u.email, u.first_name, u.last_name, u.role
            FROM user_sessions s
            JOIN users u ON u.id = s.user_id
            WHERE s.session_token = ? AND s.is_active = 1
            "#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Marks the session closed; the row is kept for auditing.
    pub async fn end_user_session(&self, token: &str) -> Result<()> {
        sqlx::query(
            "UPDATE user_sessions SET logout_time = ?, is_active = 0 WHERE session_token = ? AND is_active = 1",
        )
        .bind(now())
        .bind(token)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
