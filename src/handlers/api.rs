use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::{
    db::NewPerformance,
    extractors::{AuthGuard, JsonBody, MaybeUser},
    generator::{QuestionRequest, ShuffledQuestion},
    names,
    rejections::{AppError, ResultExt},
    services::performance::PerformanceSummary,
    AppState, SubmissionPolicy,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(names::GENERATE_URL, post(generate))
        .route(names::SUBMIT_ANSWER_URL, post(submit_answer))
        .route("/api/performance/{user_id}", get(performance))
}

async fn generate(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    JsonBody(body): JsonBody<QuestionRequest>,
) -> Result<Json<ShuffledQuestion>, AppError> {
    let user_id = user.as_ref().map(|u| u.id.as_str());
    let question = state.generator.generate(&body, user_id).await?;
    Ok(Json(question))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubmitAnswerBody {
    topic: Option<String>,
    difficulty: Option<String>,
    question: Option<String>,
    user_answer: Option<String>,
    correct_answer: Option<String>,
    #[serde(default)]
    is_correct: bool,
    time_taken: Option<f64>,
}

#[derive(Serialize)]
struct SubmitAnswerResponse {
    success: bool,
    message: &'static str,
}

async fn submit_answer(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    JsonBody(body): JsonBody<SubmitAnswerBody>,
) -> Result<Json<SubmitAnswerResponse>, AppError> {
    if user.is_none() && state.submission == SubmissionPolicy::RequireLogin {
        return Err(AppError::Unauthorized);
    }

    let record = NewPerformance {
        user_id: user.map(|u| u.id),
        topic: body.topic.ok_or(AppError::Input("missing topic"))?,
        difficulty: body.difficulty.ok_or(AppError::Input("missing difficulty"))?,
        question_text: body.question.ok_or(AppError::Input("missing question"))?,
        user_answer: body.user_answer,
        correct_answer: body
            .correct_answer
            .ok_or(AppError::Input("missing correctAnswer"))?,
        is_correct: body.is_correct,
        time_taken: body.time_taken,
    };

    state.generator.record_answer(&record).await?;

    Ok(Json(SubmitAnswerResponse {
        success: true,
        message: "Answer recorded",
    }))
}

async fn performance(
    AuthGuard(user): AuthGuard,
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<PerformanceSummary>, AppError> {
    if user.id != user_id && !user.is_elevated() {
        tracing::warn!("user {} tried to read performance of {user_id}", user.id);
        return Err(AppError::Forbidden);
    }

    let records = state
        .db
        .performances_for_user(&user_id)
        .await
        .reject("could not get performances")?;

    Ok(Json(PerformanceSummary::from_records(records)))
}
