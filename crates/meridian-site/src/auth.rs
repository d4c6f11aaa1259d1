//! User accounts and credential checking.
//!
//! Accounts live in a thread-safe in-memory directory keyed by
//! lowercased email. Passwords are stored as Argon2id hashes. A fresh
//! directory can be seeded with a demo account so the dashboard is
//! reachable out of the box.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{DateTime, TimeZone, Utc};
use thiserror::Error;

/// Email of the seeded demo account.
pub const DEMO_EMAIL: &str = "demo@meridian.dev";

/// Password of the seeded demo account.
pub const DEMO_PASSWORD: &str = "password";

const DEMO_NAME: &str = "Demo User";

/// Profile of a registered account, as exposed to pages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl AuthenticatedUser {
    /// Join date formatted for display, e.g. "January 5, 2024".
    pub fn member_since(&self) -> String {
        self.created_at.format("%B %-d, %Y").to_string()
    }
}

/// Registration failure.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistrationError {
    /// The email is already registered.
    #[error("email already registered")]
    EmailTaken,
}

/// Stored account. The hash never leaves this module.
#[derive(Debug, Clone)]
struct UserRecord {
    name: String,
    email: String,
    password_hash: String,
    created_at: DateTime<Utc>,
}

impl UserRecord {
    fn profile(&self) -> AuthenticatedUser {
        AuthenticatedUser {
            name: self.name.clone(),
            email: self.email.clone(),
            created_at: self.created_at,
        }
    }
}

/// Thread-safe in-memory account directory.
#[derive(Debug, Clone, Default)]
pub struct UserDirectory {
    users: Arc<RwLock<HashMap<String, UserRecord>>>,
}

impl UserDirectory {
    /// Creates an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a directory pre-seeded with the demo account.
    pub fn with_demo_user() -> Self {
        let directory = Self::new();
        let record = UserRecord {
            name: DEMO_NAME.to_string(),
            email: DEMO_EMAIL.to_string(),
            password_hash: hash_password(DEMO_PASSWORD),
            created_at: demo_joined_at(),
        };
        directory
            .users
            .write()
            .expect("user directory lock poisoned")
            .insert(DEMO_EMAIL.to_string(), record);
        directory
    }

    /// Creates an account, failing when the email is already taken.
    ///
    /// Emails are matched case-insensitively.
    pub fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthenticatedUser, RegistrationError> {
        let key = email.trim().to_lowercase();
        let mut users = self.users.write().expect("user directory lock poisoned");
        if users.contains_key(&key) {
            return Err(RegistrationError::EmailTaken);
        }

        let record = UserRecord {
            name: name.trim().to_string(),
            email: email.trim().to_string(),
            password_hash: hash_password(password),
            created_at: Utc::now(),
        };
        let user = record.profile();
        users.insert(key, record);
        Ok(user)
    }

    /// Checks credentials, returning the profile on a match.
    ///
    /// The hash comparison runs outside the directory lock.
    pub fn verify(&self, email: &str, password: &str) -> Option<AuthenticatedUser> {
        let key = email.trim().to_lowercase();
        let (hash, user) = {
            let users = self.users.read().expect("user directory lock poisoned");
            let record = users.get(&key)?;
            (record.password_hash.clone(), record.profile())
        };
        verify_password(password, &hash).then_some(user)
    }

    /// Looks up a profile by email.
    pub fn find(&self, email: &str) -> Option<AuthenticatedUser> {
        let users = self.users.read().expect("user directory lock poisoned");
        users.get(&email.trim().to_lowercase()).map(UserRecord::profile)
    }
}

fn hash_password(password: &str) -> String {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .expect("argon2 accepts its default parameters")
        .to_string()
}

fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

/// Fixed join date for the demo account so the dashboard is stable.
fn demo_joined_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 5, 9, 30, 0)
        .single()
        .expect("valid demo timestamp")
}
