//! Sign-up, sign-in and sign-out.

use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum::Json;
use stockroom_core::forms::{SignInForm, SignUpForm};
use stockroom_core::{FormSchema, UserSummary};
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::extractors::Form;
use crate::AppState;

/// Response carrying a fresh session cookie for `user_id`.
fn with_session(
    state: &AppState,
    user_id: &str,
    status: StatusCode,
    body: UserSummary,
) -> ApiResult<Response> {
    let token = state.sessions.issue(user_id)?;
    Ok((status, [(SET_COOKIE, state.sessions.cookie(&token))], Json(body)).into_response())
}

/// Landing response for clients redirected by the session middleware.
pub async fn landing() -> (StatusCode, &'static str) {
    (StatusCode::OK, "Sign in required")
}

pub async fn sign_up(
    State(state): State<AppState>,
    Form(form): Form<SignUpForm>,
) -> ApiResult<Response> {
    let credentials = form.validate()?;
    let user = state.db.users().create(&credentials).await?;

    info!(user_id = %user.id, "Signed up");
    let id = user.id.clone();
    with_session(&state, &id, StatusCode::CREATED, user.into())
}

pub async fn sign_in(
    State(state): State<AppState>,
    Form(form): Form<SignInForm>,
) -> ApiResult<Response> {
    let credentials = form.validate()?;

    let user = state
        .db
        .users()
        .authenticate(&credentials)
        .await?
        .ok_or_else(|| ApiError::Unauthenticated("Invalid email or password".to_string()))?;

    info!(user_id = %user.id, "Signed in");
    let id = user.id.clone();
    with_session(&state, &id, StatusCode::OK, user.into())
}

pub async fn sign_out(State(state): State<AppState>) -> Response {
    ([(SET_COOKIE, state.sessions.clear_cookie())], Redirect::to("/signin")).into_response()
}
