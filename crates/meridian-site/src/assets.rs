//! Static asset serving.
//!
//! The stylesheet is embedded at compile time so the binary deploys
//! alone. Links cache-bust with the build version query parameter.

use axum::{
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};

/// Site stylesheet.
const SITE_CSS: &str = include_str!("../assets/site.css");

/// Serves the site stylesheet with correct content-type.
pub async fn serve_css() -> Response {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/css; charset=utf-8"),
            (header::CACHE_CONTROL, "public, max-age=31536000, immutable"),
        ],
        SITE_CSS,
    )
        .into_response()
}
