//! Shared state for site handlers.

use crate::auth::UserDirectory;
use crate::session::SessionStore;

/// Shared state for all site HTTP handlers.
#[derive(Debug, Clone)]
pub struct SiteState {
    /// Session store backing login state and flash data
    pub sessions: SessionStore,

    /// Registered accounts
    pub users: UserDirectory,
}

impl SiteState {
    /// Creates site state with the demo account seeded.
    pub fn new() -> Self {
        Self {
            sessions: SessionStore::default(),
            users: UserDirectory::with_demo_user(),
        }
    }
}

impl Default for SiteState {
    fn default() -> Self {
        Self::new()
    }
}
