//! Login, registration, and logout handlers.
//!
//! Successful logins rotate the session ID before marking it as
//! authenticated. Failures redirect back with the error bag and the
//! submitted email so the form can repopulate.

use axum::{
    extract::{Form, State},
    http::{HeaderMap, HeaderValue, header},
    response::{IntoResponse, Redirect, Response},
};

use super::redirect_with_session;
use crate::auth::RegistrationError;
use crate::forms::{EMAIL_TAKEN_MESSAGE, LoginForm, RegisterForm, ValidationErrors};
use crate::session::cleared_session_cookie;
use crate::state::SiteState;
use crate::templates::{LoginTemplate, PageContext, RegisterTemplate};

/// Shown when login credentials do not match an account.
const FAILED_LOGIN_MESSAGE: &str = "These credentials do not match our records.";

/// Handler for GET /login - login form.
pub async fn login_form(State(state): State<SiteState>, headers: HeaderMap) -> impl IntoResponse {
    LoginTemplate::new(PageContext::gather(&state, &headers))
}

/// Handler for POST /login - checks credentials and opens a session.
pub async fn login(
    State(state): State<SiteState>,
    headers: HeaderMap,
    Form(form): Form<LoginForm>,
) -> Response {
    let ticket = state.sessions.ensure(&headers);

    if let Err(errors) = form.validate() {
        state.sessions.put_errors(&ticket.id, &errors);
        state.sessions.put_old_input(&ticket.id, &form.old_input());
        return redirect_with_session("/login", &ticket);
    }

    match state.users.verify(&form.email, &form.password) {
        Some(user) => {
            let ticket = state.sessions.rotate(&ticket.id);
            state.sessions.set_user(&ticket.id, &user.email);
            tracing::info!(email = %user.email, "login succeeded");
            redirect_with_session("/dashboard", &ticket)
        }
        None => {
            tracing::warn!(email = %form.email.trim(), "login rejected");
            let mut errors = ValidationErrors::default();
            errors.add("email", FAILED_LOGIN_MESSAGE);
            state.sessions.put_errors(&ticket.id, &errors);
            state.sessions.put_old_input(&ticket.id, &form.old_input());
            redirect_with_session("/login", &ticket)
        }
    }
}

/// Handler for GET /register - registration form.
pub async fn register_form(State(state): State<SiteState>, headers: HeaderMap) -> impl IntoResponse {
    RegisterTemplate::new(PageContext::gather(&state, &headers))
}

/// Handler for POST /register - creates the account and logs it in.
pub async fn register(
    State(state): State<SiteState>,
    headers: HeaderMap,
    Form(form): Form<RegisterForm>,
) -> Response {
    let ticket = state.sessions.ensure(&headers);

    if let Err(errors) = form.validate() {
        state.sessions.put_errors(&ticket.id, &errors);
        state.sessions.put_old_input(&ticket.id, &form.old_input());
        return redirect_with_session("/register", &ticket);
    }

    match state
        .users
        .register(form.name.trim(), form.email.trim(), &form.password)
    {
        Ok(user) => {
            let ticket = state.sessions.rotate(&ticket.id);
            state.sessions.set_user(&ticket.id, &user.email);
            tracing::info!(email = %user.email, "account registered");
            redirect_with_session("/dashboard", &ticket)
        }
        Err(RegistrationError::EmailTaken) => {
            let mut errors = ValidationErrors::default();
            errors.add("email", EMAIL_TAKEN_MESSAGE);
            state.sessions.put_errors(&ticket.id, &errors);
            state.sessions.put_old_input(&ticket.id, &form.old_input());
            redirect_with_session("/register", &ticket)
        }
    }
}

/// Handler for POST /logout - destroys the session.
pub async fn logout(State(state): State<SiteState>, headers: HeaderMap) -> Response {
    if let Some(id) = state.sessions.resolve(&headers) {
        state.sessions.destroy(&id);
        tracing::info!("session closed");
    }

    let mut response = Redirect::to("/").into_response();
    response.headers_mut().append(
        header::SET_COOKIE,
        HeaderValue::from_str(&cleared_session_cookie()).expect("session cookie is ASCII"),
    );
    response
}
