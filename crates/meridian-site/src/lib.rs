//! Meridian marketing site.
//!
//! A small server-rendered website: home and about pages, a contact
//! form with validation, and a session-authenticated dashboard. Pages
//! are Askama templates served by axum; styles ship embedded in the
//! binary.

use std::net::SocketAddr;

use axum::{
    Router,
    http::{HeaderValue, header},
    routing::{get, post},
};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{set_header::SetResponseHeaderLayer, trace::TraceLayer};
use tracing::info;

pub mod assets;
pub mod auth;
pub mod error;
pub mod forms;
pub mod handlers;
pub mod session;
pub mod state;
pub mod templates;

pub use error::{SiteError, SiteResult};

use state::SiteState;

/// Site name used in page titles.
pub const SITE_NAME: &str = "Meridian";

/// Build version for cache busting static assets.
pub const BUILD_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Builds the site router: pages, forms, assets, and the 404 fallback.
///
/// Every response carries the security headers the layer stack sets.
pub fn router(state: SiteState) -> Router {
    Router::new()
        .route("/", get(handlers::pages::home))
        .route("/about", get(handlers::pages::about))
        .route(
            "/contact",
            get(handlers::contact::show).post(handlers::contact::submit),
        )
        .route("/dashboard", get(handlers::dashboard::show))
        .route(
            "/login",
            get(handlers::auth::login_form).post(handlers::auth::login),
        )
        .route(
            "/register",
            get(handlers::auth::register_form).post(handlers::auth::register),
        )
        .route("/logout", post(handlers::auth::logout))
        .route("/css/site.css", get(assets::serve_css))
        .fallback(handlers::pages::not_found)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(SetResponseHeaderLayer::overriding(
                    header::CONTENT_SECURITY_POLICY,
                    HeaderValue::from_static(
                        "default-src 'self'; style-src 'self'; img-src 'self' data:; \
                         form-action 'self'; frame-ancestors 'none'",
                    ),
                ))
                .layer(SetResponseHeaderLayer::overriding(
                    header::STRICT_TRANSPORT_SECURITY,
                    HeaderValue::from_static("max-age=63072000; includeSubDomains"),
                ))
                .layer(SetResponseHeaderLayer::overriding(
                    header::X_FRAME_OPTIONS,
                    HeaderValue::from_static("DENY"),
                ))
                .layer(SetResponseHeaderLayer::overriding(
                    header::X_CONTENT_TYPE_OPTIONS,
                    HeaderValue::from_static("nosniff"),
                ))
                .layer(SetResponseHeaderLayer::overriding(
                    header::REFERRER_POLICY,
                    HeaderValue::from_static("strict-origin-when-cross-origin"),
                )),
        )
        .with_state(state)
}

/// Starts the site server and runs until shutdown.
pub async fn serve(addr: SocketAddr, state: SiteState) -> SiteResult<()> {
    info!("Starting site on http://{addr}");
    let app = router(state);

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| SiteError::BindFailed { addr, source })?;
    info!("Site ready on http://{addr}");

    axum::serve(listener, app).await?;
    Ok(())
}
