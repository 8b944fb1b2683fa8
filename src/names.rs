pub const APP_NAME: &str = "Maths Generator";

pub const LOGIN_URL: &str = "/login";
pub const LOGOUT_URL: &str = "/logout";
pub const HOME_URL: &str = "/";
pub const HEALTH_URL: &str = "/health";
pub const GOOGLE_LOGIN_URL: &str = "/google_login";
pub const GOOGLE_CALLBACK_URL: &str = "/google_login/google/authorized";

pub const GENERATE_URL: &str = "/api/generate";
pub const SUBMIT_ANSWER_URL: &str = "/api/submit_answer";

pub const USER_SESSION_COOKIE_NAME: &str = "user_session";
pub const OAUTH_STATE_COOKIE_NAME: &str = "oauth_state";

pub const LOGIN_ERROR_UNAUTHORIZED: &str = "unauthorized";

pub fn performance_url(user_id: &str) -> String {
    format!("/api/performance/{user_id}")
}

pub fn login_error_url(error: &str) -> String {
    format!("{LOGIN_URL}?error={error}")
}

// Performance summary
pub const RECENT_PERFORMANCE_LIMIT: usize = 10;
pub const RECENT_HISTORY_LIMIT: i64 = 10;

// Defaults
pub const DEFAULT_ALLOWED_EMAIL_DOMAIN: &str = "@school.cdgfss.edu.hk";
pub const DEFAULT_RECENT_CACHE_CAPACITY: usize = 256;
