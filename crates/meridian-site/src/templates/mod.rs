//! Askama Templates
//!
//! Template structs for rendering HTML pages. Every page carries a
//! [`PageContext`] with the request-scoped session data the layout
//! needs (flash message, validation errors, old input, login state).

use std::collections::HashMap;

use askama::Template;
use askama_web::WebTemplate;
use axum::http::HeaderMap;

use crate::auth::AuthenticatedUser;
use crate::forms::ValidationErrors;
use crate::state::SiteState;
use crate::{BUILD_VERSION, SITE_NAME};

/// Request-scoped data shared by every page render.
///
/// Gathering consumes the session's one-shot entries, so flash
/// messages, error bags, and old input survive exactly one render.
#[derive(Debug, Default)]
pub struct PageContext {
    /// Success flash message set by the previous request, if any.
    pub flash_success: Option<String>,

    /// Validation errors from the previous form submission.
    pub errors: ValidationErrors,

    /// Display name of the logged-in account, if any.
    pub user_name: Option<String>,

    old: HashMap<String, String>,
}

impl PageContext {
    /// Collects the context for the current request.
    pub fn gather(state: &SiteState, headers: &HeaderMap) -> Self {
        let Some(id) = state.sessions.resolve(headers) else {
            return Self::default();
        };

        let user_name = state
            .sessions
            .user_email(&id)
            .and_then(|email| state.users.find(&email))
            .map(|user| user.name);

        Self {
            flash_success: state.sessions.take_flash(&id, "success"),
            errors: state.sessions.take_errors(&id).unwrap_or_default(),
            user_name,
            old: state.sessions.take_old_input(&id).unwrap_or_default(),
        }
    }

    /// Previously submitted value for a form field, or empty.
    pub fn old(&self, field: &str) -> &str {
        self.old.get(field).map(String::as_str).unwrap_or_default()
    }

    /// True when a success flash message is waiting to render.
    pub fn has_flash(&self) -> bool {
        self.flash_success.is_some()
    }

    /// The success flash message, or empty.
    pub fn flash_message(&self) -> &str {
        self.flash_success.as_deref().unwrap_or_default()
    }

    /// True when the named field failed validation.
    pub fn has_error(&self, field: &str) -> bool {
        self.errors.has(field)
    }

    /// First validation message for the named field, or empty.
    pub fn error(&self, field: &str) -> &str {
        self.errors.first(field).unwrap_or_default()
    }

    /// True when the request belongs to a logged-in account.
    pub fn is_logged_in(&self) -> bool {
        self.user_name.is_some()
    }

    /// Display name of the logged-in account, or empty.
    pub fn display_name(&self) -> &str {
        self.user_name.as_deref().unwrap_or_default()
    }
}

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub title: String,
    pub ctx: PageContext,
    /// Build version for cache busting static assets.
    pub v: &'static str,
}

impl HomeTemplate {
    pub fn new(ctx: PageContext) -> Self {
        Self {
            title: format!("Home - {SITE_NAME}"),
            ctx,
            v: BUILD_VERSION,
        }
    }
}

/// About page template.
#[derive(Template, WebTemplate)]
#[template(path = "about.html")]
pub struct AboutTemplate {
    pub title: String,
    pub ctx: PageContext,
    /// Build version for cache busting static assets.
    pub v: &'static str,
}

impl AboutTemplate {
    pub fn new(ctx: PageContext) -> Self {
        Self {
            title: format!("About - {SITE_NAME}"),
            ctx,
            v: BUILD_VERSION,
        }
    }
}

/// Contact page template with the submission form.
#[derive(Template, WebTemplate)]
#[template(path = "contact.html")]
pub struct ContactTemplate {
    pub title: String,
    pub ctx: PageContext,
    /// Build version for cache busting static assets.
    pub v: &'static str,
}

impl ContactTemplate {
    pub fn new(ctx: PageContext) -> Self {
        Self {
            title: format!("Contact - {SITE_NAME}"),
            ctx,
            v: BUILD_VERSION,
        }
    }
}

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub title: String,
    pub ctx: PageContext,
    /// Build version for cache busting static assets.
    pub v: &'static str,
}

impl LoginTemplate {
    pub fn new(ctx: PageContext) -> Self {
        Self {
            title: format!("Login - {SITE_NAME}"),
            ctx,
            v: BUILD_VERSION,
        }
    }
}

/// Registration page template.
#[derive(Template, WebTemplate)]
#[template(path = "register.html")]
pub struct RegisterTemplate {
    pub title: String,
    pub ctx: PageContext,
    /// Build version for cache busting static assets.
    pub v: &'static str,
}

impl RegisterTemplate {
    pub fn new(ctx: PageContext) -> Self {
        Self {
            title: format!("Register - {SITE_NAME}"),
            ctx,
            v: BUILD_VERSION,
        }
    }
}

/// Account details shown on the dashboard.
pub struct DashboardUser {
    pub name: String,
    pub email: String,
    pub member_since: String,
}

/// Dashboard page template, rendered only for logged-in users.
#[derive(Template, WebTemplate)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub title: String,
    pub ctx: PageContext,
    pub user: DashboardUser,
    /// Build version for cache busting static assets.
    pub v: &'static str,
}

impl DashboardTemplate {
    pub fn new(ctx: PageContext, user: &AuthenticatedUser) -> Self {
        Self {
            title: format!("Dashboard - {SITE_NAME}"),
            ctx,
            user: DashboardUser {
                name: user.name.clone(),
                email: user.email.clone(),
                member_since: user.member_since(),
            },
            v: BUILD_VERSION,
        }
    }
}

/// Not-found page template.
#[derive(Template, WebTemplate)]
#[template(path = "not_found.html")]
pub struct NotFoundTemplate {
    pub title: String,
    pub ctx: PageContext,
    /// Build version for cache busting static assets.
    pub v: &'static str,
}

impl NotFoundTemplate {
    pub fn new(ctx: PageContext) -> Self {
        Self {
            title: format!("Page Not Found - {SITE_NAME}"),
            ctx,
            v: BUILD_VERSION,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderValue, header};

    fn headers_with_cookie(id: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_str(&format!("meridian_session={id}")).unwrap(),
        );
        headers
    }

    #[test]
    fn gather_without_session_is_empty() {
        let state = SiteState::new();
        let ctx = PageContext::gather(&state, &HeaderMap::new());

        assert!(ctx.flash_success.is_none());
        assert!(ctx.errors.is_empty());
        assert!(ctx.user_name.is_none());
        assert_eq!(ctx.old("name"), "");
    }

    #[test]
    fn gather_consumes_one_shot_session_data() {
        let state = SiteState::new();
        let ticket = state.sessions.ensure(&HeaderMap::new());
        state.sessions.flash(&ticket.id, "success", "saved");

        let mut errors = ValidationErrors::default();
        errors.add("email", "The email field is required.");
        state.sessions.put_errors(&ticket.id, &errors);

        let headers = headers_with_cookie(&ticket.id);
        let ctx = PageContext::gather(&state, &headers);
        assert_eq!(ctx.flash_success.as_deref(), Some("saved"));
        assert!(ctx.errors.has("email"));

        let again = PageContext::gather(&state, &headers);
        assert!(again.flash_success.is_none());
        assert!(again.errors.is_empty());
    }

    #[test]
    fn gather_reports_the_logged_in_name() {
        let state = SiteState::new();
        let ticket = state.sessions.ensure(&HeaderMap::new());
        state.sessions.set_user(&ticket.id, crate::auth::DEMO_EMAIL);

        let ctx = PageContext::gather(&state, &headers_with_cookie(&ticket.id));
        assert_eq!(ctx.user_name.as_deref(), Some("Demo User"));
    }

    #[test]
    fn home_renders_navigation_for_guests() {
        let html = HomeTemplate::new(PageContext::default()).render().unwrap();
        assert!(html.contains("<title>Home - Meridian</title>"));
        assert!(html.contains("href=\"/login\""));
        assert!(html.contains("href=\"/register\""));
        assert!(!html.contains("href=\"/dashboard\""));
    }

    #[test]
    fn home_renders_navigation_for_logged_in_users() {
        let ctx = PageContext {
            user_name: Some("Demo User".to_string()),
            ..PageContext::default()
        };
        let html = HomeTemplate::new(ctx).render().unwrap();
        assert!(html.contains("href=\"/dashboard\""));
        assert!(html.contains("Demo User"));
        assert!(!html.contains("href=\"/login\""));
    }

    #[test]
    fn contact_renders_errors_and_old_input() {
        let mut errors = ValidationErrors::default();
        errors.add("email", "The email field must be a valid email address.");
        let mut old = HashMap::new();
        old.insert("name".to_string(), "Jo".to_string());
        old.insert("email".to_string(), "not-an-email".to_string());

        let ctx = PageContext {
            errors,
            old,
            ..PageContext::default()
        };
        let html = ContactTemplate::new(ctx).render().unwrap();
        assert!(html.contains("The email field must be a valid email address."));
        assert!(html.contains("value=\"Jo\""));
        assert!(html.contains("value=\"not-an-email\""));
    }

    #[test]
    fn contact_escapes_old_input() {
        let mut old = HashMap::new();
        old.insert("name".to_string(), "<script>alert(1)</script>".to_string());

        let ctx = PageContext {
            old,
            ..PageContext::default()
        };
        let html = ContactTemplate::new(ctx).render().unwrap();
        assert!(!html.contains("<script>alert(1)</script>"));
        // askama escapes with numeric character references.
        assert!(html.contains("&#60;script&#62;alert(1)&#60;/script&#62;"));
    }

    #[test]
    fn flash_banner_appears_when_set() {
        let ctx = PageContext {
            flash_success: Some("Thank you for your message! We will get back to you soon.".to_string()),
            ..PageContext::default()
        };
        let html = ContactTemplate::new(ctx).render().unwrap();
        assert!(html.contains("Thank you for your message! We will get back to you soon."));
    }

    #[test]
    fn dashboard_shows_account_details() {
        use chrono::TimeZone;

        let user = AuthenticatedUser {
            name: "Demo User".to_string(),
            email: "demo@meridian.dev".to_string(),
            created_at: chrono::Utc.with_ymd_and_hms(2024, 1, 5, 9, 30, 0).single().unwrap(),
        };
        let ctx = PageContext {
            user_name: Some(user.name.clone()),
            ..PageContext::default()
        };
        let html = DashboardTemplate::new(ctx, &user).render().unwrap();
        assert!(html.contains("Welcome back, Demo User!"));
        assert!(html.contains("demo@meridian.dev"));
        assert!(html.contains("January 5, 2024"));
    }
}
