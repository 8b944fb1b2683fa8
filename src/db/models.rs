// Database model structs

use chrono::{DateTime, Utc};
use serde::Serialize;

pub const ROLE_STUDENT: &str = "student";
pub const ROLE_TEACHER: &str = "teacher";
pub const ROLE_ADMIN: &str = "admin";
pub const ELEVATED_ROLES: &[&str] = &[ROLE_TEACHER, ROLE_ADMIN];

#[derive(Clone, Debug, PartialEq, sqlx::FromRow)]
pub struct AuthUser {
    pub id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
}

impl AuthUser {
    /// Teachers and admins may read anyone's performance.
    pub fn is_elevated(&self) -> bool {
        ELEVATED_ROLES.contains(&self.role.as_str())
    }

    pub fn display_name(&self) -> String {
        let name = format!("{} {}", self.first_name, self.last_name);
        let name = name.trim();
        if name.is_empty() {
            self.email.clone()
        } else {
            name.to_string()
        }
    }
}

/// Profile attributes handed over by the identity provider.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct UserProfile {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

/// Client details stored alongside a login session.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ClientInfo {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NewQuestionHistory {
    pub topic: String,
    pub difficulty: String,
    pub question_text: String,
    pub options: Vec<String>,
    pub correct_answer: String,
    pub generated_by_user_id: Option<String>,
}

#[derive(sqlx::FromRow)]
pub struct QuestionHistoryModel {
    pub id: String,
    pub topic: String,
    pub difficulty: String,
    pub question_text: String,
    pub options: sqlx::types::Json<Vec<String>>,
    pub correct_answer: String,
    pub generated_at: DateTime<Utc>,
    pub generated_by_user_id: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NewPerformance {
    pub user_id: Option<String>,
    pub topic: String,
    pub difficulty: String,
    pub question_text: String,
    pub user_answer: Option<String>,
    pub correct_answer: String,
    pub is_correct: bool,
    pub time_taken: Option<f64>,
}

#[derive(Clone, Debug, Serialize, sqlx::FromRow)]
pub struct PerformanceModel {
    pub topic: String,
    pub difficulty: String,
    pub is_correct: bool,
    pub time_taken: Option<f64>,
    pub created_at: DateTime<Utc>,
}
