use axum::{extract::State, routing::get, Json, Router};
use color_eyre::Result;
use serde::Serialize;

use crate::{
    db::Db,
    extractors::AuthGuard,
    names,
    rejections::{AppError, ResultExt},
    views::{self, homepage::Overview},
    AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(names::HOME_URL, get(homepage))
        .route(names::HEALTH_URL, get(health))
}

async fn overview(db: &Db) -> Result<Overview> {
    Ok(Overview {
        questions_generated: db.question_history_count().await?,
        anonymous_answers: db.anonymous_performance_count().await?,
        recent_questions: db.recent_question_history(names::RECENT_HISTORY_LIMIT).await?,
    })
}

async fn homepage(
    AuthGuard(user): AuthGuard,
    State(state): State<AppState>,
) -> Result<maud::Markup, AppError> {
    let overview = if user.is_elevated() {
        Some(overview(&state.db).await.reject("could not load overview")?)
    } else {
        None
    };

    Ok(views::page(
        names::APP_NAME,
        views::homepage::home(&user, overview.as_ref()),
    ))
}

#[derive(Serialize)]
struct Health {
    status: &'static str,
    timestamp: String,
    version: &'static str,
}

async fn health() -> Json<Health> {
    Json(Health {
        status: "healthy",
        timestamp: chrono::Utc::now().to_rfc3339(),
        version: crate::utils::VERSION,
    })
}
