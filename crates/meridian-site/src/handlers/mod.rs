//! Route Handlers
//!
//! HTTP request handlers for all routes.

pub mod auth;
pub mod contact;
pub mod dashboard;
pub mod pages;

use axum::{
    http::{HeaderValue, header},
    response::{IntoResponse, Redirect, Response},
};

use crate::session::SessionTicket;

/// Redirects (303) and attaches the session cookie when one was issued.
pub(crate) fn redirect_with_session(to: &str, ticket: &SessionTicket) -> Response {
    let mut response = Redirect::to(to).into_response();
    if let Some(cookie) = &ticket.set_cookie {
        response.headers_mut().append(
            header::SET_COOKIE,
            HeaderValue::from_str(cookie).expect("session cookie is ASCII"),
        );
    }
    response
}

#[cfg(test)]
pub(crate) mod testing {
    use axum::http::{HeaderMap, HeaderValue, header};
    use axum::response::Response;

    use crate::session::SESSION_COOKIE;

    /// Extracts the session ID issued by a response.
    pub(crate) fn session_id_from_response(response: &Response) -> String {
        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .expect("response sets a session cookie")
            .to_str()
            .unwrap();
        let pair = cookie.split(';').next().unwrap();
        pair.split_once('=').unwrap().1.to_string()
    }

    /// Request headers carrying an existing session cookie.
    pub(crate) fn headers_with_session(id: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_str(&format!("{SESSION_COOKIE}={id}")).unwrap(),
        );
        headers
    }
}
