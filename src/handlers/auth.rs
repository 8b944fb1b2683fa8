use axum::{
    extract::{Query, State},
    http::{header::SET_COOKIE, HeaderMap, HeaderValue},
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Router,
};
use axum_extra::extract::CookieJar;
use serde::Deserialize;

use crate::{
    extractors::{Client, MaybeUser},
    names,
    rejections::AppError,
    services::auth::LoginOutcome,
    utils, views, AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(names::LOGIN_URL, get(login_page))
        .route(names::LOGOUT_URL, get(logout))
        .route(names::GOOGLE_LOGIN_URL, get(google_login))
        .route(names::GOOGLE_CALLBACK_URL, get(google_authorized))
}

#[derive(Deserialize)]
struct LoginQuery {
    error: Option<String>,
}

async fn login_page(MaybeUser(user): MaybeUser, Query(query): Query<LoginQuery>) -> Response {
    if user.is_some() && query.error.is_none() {
        return Redirect::to(names::HOME_URL).into_response();
    }

    let unauthorized = query.error.as_deref() == Some(names::LOGIN_ERROR_UNAUTHORIZED);
    views::page("Log In", views::homepage::login(unauthorized)).into_response()
}

fn with_cookies(cookies: &[String], to: &str) -> Result<Response, AppError> {
    let mut headers = HeaderMap::new();
    for cookie in cookies {
        let value = HeaderValue::from_str(cookie)
            .map_err(|_| AppError::Internal("could not build cookie"))?;
        headers.append(SET_COOKIE, value);
    }
    Ok((headers, Redirect::to(to)).into_response())
}

async fn google_login(State(state): State<AppState>) -> Result<Response, AppError> {
    let (url, csrf_state) = state.auth.begin_login();
    let cookie = utils::cookie(
        names::OAUTH_STATE_COOKIE_NAME,
        &csrf_state,
        state.secure_cookies,
    );
    with_cookies(&[cookie], &url)
}

#[derive(Deserialize)]
struct CallbackQuery {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
}

async fn google_authorized(
    State(state): State<AppState>,
    jar: CookieJar,
    Client(client): Client,
    Query(query): Query<CallbackQuery>,
) -> Result<Response, AppError> {
    let clear_state = utils::expired_cookie(names::OAUTH_STATE_COOKIE_NAME);

    let (Some(code), Some(returned_state)) = (query.code, query.state) else {
        tracing::warn!("oauth callback without code: {:?}", query.error);
        return with_cookies(&[clear_state], names::LOGIN_URL);
    };

    let expected_state = jar
        .get(names::OAUTH_STATE_COOKIE_NAME)
        .map(|c| c.value().to_string());

    let outcome = match state
        .auth
        .complete_login(&code, &returned_state, expected_state.as_deref(), &client)
        .await
    {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::error!("login failed: {e}");
            return with_cookies(&[clear_state], names::LOGIN_URL);
        }
    };

    match outcome {
        LoginOutcome::Success { token, user } => {
            tracing::info!("user {} logged in", user.email);
            let session = utils::cookie(
                names::USER_SESSION_COOKIE_NAME,
                &token,
                state.secure_cookies,
            );
            with_cookies(&[clear_state, session], names::HOME_URL)
        }
        LoginOutcome::EmailNotAllowed(_) => with_cookies(
            &[clear_state],
            &names::login_error_url(names::LOGIN_ERROR_UNAUTHORIZED),
        ),
        LoginOutcome::StateMismatch => with_cookies(&[clear_state], names::LOGIN_URL),
    }
}

async fn logout(State(state): State<AppState>, jar: CookieJar) -> Result<Response, AppError> {
    if let Some(token) = jar.get(names::USER_SESSION_COOKIE_NAME) {
        if let Err(e) = state.auth.logout(token.value()).await {
            tracing::error!("could not close session: {e}");
        }
    }

    with_cookies(
        &[utils::expired_cookie(names::USER_SESSION_COOKIE_NAME)],
        names::LOGIN_URL,
    )
}
