//! The signed-in user's own account.

use axum::extract::{Path, State};
use axum::http::header::SET_COOKIE;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use stockroom_core::forms::UpdateUserForm;
use stockroom_core::{FieldErrors, FormSchema, UserSummary};

use crate::error::{ApiError, ApiResult};
use crate::extractors::Form;
use crate::middleware::SessionContext;
use crate::AppState;

fn ensure_self(session: &SessionContext, id: &str) -> ApiResult<()> {
    if session.user_id == id {
        Ok(())
    } else {
        Err(ApiError::Forbidden("Only your own account can be accessed".to_string()))
    }
}

pub async fn show(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
    Path(id): Path<String>,
) -> ApiResult<Json<UserSummary>> {
    ensure_self(&session, &id)?;
    Ok(Json(state.db.users().get(&id).await?.into()))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
    Path(id): Path<String>,
    Form(form): Form<UpdateUserForm>,
) -> ApiResult<Json<UserSummary>> {
    ensure_self(&session, &id)?;
    let update = form.validate()?;

    let user = state.db.users().update_account(&id, &update).await?.ok_or_else(|| {
        ApiError::Validation(FieldErrors::single(
            "currentPassword",
            "current password is incorrect",
        ))
    })?;
    Ok(Json(user.into()))
}

/// Deletes the account and ends the session.
pub async fn destroy(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
    Path(id): Path<String>,
) -> ApiResult<Response> {
    ensure_self(&session, &id)?;
    state.db.users().delete(&id).await?;
    Ok((StatusCode::NO_CONTENT, [(SET_COOKIE, state.sessions.clear_cookie())]).into_response())
}
