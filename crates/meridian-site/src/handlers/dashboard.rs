//! Dashboard handlers and the login guard.

use axum::{
    extract::State,
    http::HeaderMap,
    response::{IntoResponse, Redirect, Response},
};

use crate::auth::AuthenticatedUser;
use crate::state::SiteState;
use crate::templates::{DashboardTemplate, PageContext};

/// Resolves the logged-in account, or the redirect to send instead.
///
/// Composed in front of any handler that requires login. A session
/// whose account no longer exists counts as logged out.
pub fn require_user(state: &SiteState, headers: &HeaderMap) -> Result<AuthenticatedUser, Redirect> {
    state
        .sessions
        .resolve(headers)
        .and_then(|id| state.sessions.user_email(&id))
        .and_then(|email| state.users.find(&email))
        .ok_or_else(|| Redirect::to("/login"))
}

/// Handler for GET /dashboard - account overview, login required.
pub async fn show(State(state): State<SiteState>, headers: HeaderMap) -> Response {
    let user = match require_user(&state, &headers) {
        Ok(user) => user,
        Err(redirect) => return redirect.into_response(),
    };

    let ctx = PageContext::gather(&state, &headers);
    DashboardTemplate::new(ctx, &user).into_response()
}
