//! Session gatekeeping for `/dashboard/**`.

use axum::extract::{Request, State};
use axum::http::header::SET_COOKIE;
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use chrono::Utc;
use stockroom_db::DbError;
use tracing::{debug, warn};

use crate::auth;
use crate::error::ApiError;
use crate::AppState;

/// The signed-in user, placed in request extensions by [`require_session`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    pub user_id: String,
}

/// Redirects to `/signin` (303) unless the request carries a valid session
/// for an account that still exists.
///
/// ```text
/// no cookie / bad token ──► 303 /signin
/// deleted account       ──► 303 /signin + cleared cookie
/// valid                 ──► handler ──► renewed cookie past half-life
/// ```
///
/// Renews the cookie once less than half of the session lifetime is left,
/// unless the handler already set one.
pub async fn require_session(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let token = auth::session_token(req.headers()).map(|token| state.sessions.validate(token));
    let claims = match token {
        Some(Ok(claims)) => claims,
        Some(Err(e)) => {
            debug!(path = %req.uri().path(), error = %e, "Rejected session");
            return Redirect::to("/signin").into_response();
        }
        None => {
            debug!(path = %req.uri().path(), "No session cookie");
            return Redirect::to("/signin").into_response();
        }
    };

    match state.db.users().get(&claims.sub).await {
        Ok(_) => {}
        Err(DbError::NotFound { .. }) => {
            debug!(user_id = %claims.sub, "Session for a deleted account");
            let clear = [(SET_COOKIE, state.sessions.clear_cookie())];
            return (clear, Redirect::to("/signin")).into_response();
        }
        Err(e) => return ApiError::from(e).into_response(),
    }

    req.extensions_mut().insert(SessionContext {
        user_id: claims.sub.clone(),
    });

    let mut response = next.run(req).await;

    if response.headers().contains_key(SET_COOKIE)
        || !state.sessions.needs_renewal(&claims, Utc::now().timestamp())
    {
        return response;
    }

    match state
        .sessions
        .issue(&claims.sub)
        .map(|token| HeaderValue::from_str(&state.sessions.cookie(&token)))
    {
        Ok(Ok(cookie)) => {
            debug!(user_id = %claims.sub, "Session renewed");
            response.headers_mut().append(SET_COOKIE, cookie);
        }
        Ok(Err(e)) => warn!(error = %e, "Renewed session cookie is not a valid header"),
        Err(e) => warn!(error = %e, "Failed to renew session"),
    }

    response
}
