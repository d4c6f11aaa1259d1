//! Static page handlers.

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};

use crate::state::SiteState;
use crate::templates::{AboutTemplate, HomeTemplate, NotFoundTemplate, PageContext};

/// Handler for GET / - home page.
pub async fn home(State(state): State<SiteState>, headers: HeaderMap) -> impl IntoResponse {
    HomeTemplate::new(PageContext::gather(&state, &headers))
}

/// Handler for GET /about - about page.
pub async fn about(State(state): State<SiteState>, headers: HeaderMap) -> impl IntoResponse {
    AboutTemplate::new(PageContext::gather(&state, &headers))
}

/// Fallback handler - renders the branded 404 page.
pub async fn not_found(State(state): State<SiteState>, headers: HeaderMap) -> Response {
    let template = NotFoundTemplate::new(PageContext::gather(&state, &headers));
    (StatusCode::NOT_FOUND, template).into_response()
}
