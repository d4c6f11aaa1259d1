//! Contact page handlers.
//!
//! Submissions follow the post/redirect/get pattern: both outcomes
//! redirect back to the form, with either a success flash or the
//! validation errors and old input waiting in the session.

use axum::{
    extract::{Form, State},
    http::HeaderMap,
    response::{IntoResponse, Response},
};

use super::redirect_with_session;
use crate::forms::ContactForm;
use crate::state::SiteState;
use crate::templates::{ContactTemplate, PageContext};

/// Flash shown after a successful submission.
const SUCCESS_MESSAGE: &str = "Thank you for your message! We will get back to you soon.";

/// Handler for GET /contact - contact form.
pub async fn show(State(state): State<SiteState>, headers: HeaderMap) -> impl IntoResponse {
    ContactTemplate::new(PageContext::gather(&state, &headers))
}

/// Handler for POST /contact - validates and redirects back to the form.
pub async fn submit(
    State(state): State<SiteState>,
    headers: HeaderMap,
    Form(form): Form<ContactForm>,
) -> Response {
    let ticket = state.sessions.ensure(&headers);

    match form.validate() {
        Ok(()) => {
            // Accepted submissions are logged only; a mailer or storage
            // backend would hook in here.
            tracing::info!(email = %form.email.trim(), "contact submission received");
            state.sessions.flash(&ticket.id, "success", SUCCESS_MESSAGE);
        }
        Err(errors) => {
            tracing::debug!(error_count = errors.all().len(), "contact submission rejected");
            state.sessions.put_errors(&ticket.id, &errors);
            state.sessions.put_old_input(&ticket.id, &form.old_input());
        }
    }

    redirect_with_session("/contact", &ticket)
}
