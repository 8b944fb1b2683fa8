pub mod db;
pub mod extractors;
pub mod generator;
pub mod handlers;
pub mod names;
pub mod rejections;
pub mod services;
pub mod utils;
pub mod views;

use std::sync::Arc;

use axum::Router;

use generator::QuestionGenerator;
use services::auth::AuthService;

/// Whether answers may be recorded without a logged-in user.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubmissionPolicy {
    RequireLogin,
    AllowAnonymous,
}

impl SubmissionPolicy {
    pub fn from_allow_anonymous(allow: bool) -> Self {
        if allow {
            SubmissionPolicy::AllowAnonymous
        } else {
            SubmissionPolicy::RequireLogin
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db: db::Db,
    pub generator: Arc<QuestionGenerator>,
    pub auth: Arc<AuthService>,
    pub secure_cookies: bool,
    /// Take the client IP from `X-Forwarded-For` instead of the peer address.
    pub trust_forwarded_for: bool,
    pub submission: SubmissionPolicy,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(handlers::homepage::routes())
        .merge(handlers::auth::routes())
        .merge(handlers::api::routes())
        .with_state(state)
}
