//! # Identity Bookkeeping
//!
//! Registered users, their password hashes, and the current session.
//!
//! Password hashing is slow on purpose, so the store hashes and verifies
//! outside its lock and only touches [`Accounts`] while holding it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use turf_core::validation::{validate_email, validate_password, validate_person_name, validate_phone};
use turf_core::{Role, User};

use crate::error::{StoreError, StoreResult};

/// Profile submitted at registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
}

impl Registration {
    pub fn validate(&self) -> StoreResult<()> {
        validate_person_name(&self.name)?;
        validate_email(&self.email)?;
        validate_phone(&self.phone)?;
        validate_password(&self.password)?;
        Ok(())
    }
}

/// The signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Session {
    pub user: User,
    #[ts(as = "String")]
    pub started_at: DateTime<Utc>,
}

// =============================================================================
// Password Hashing
// =============================================================================

/// Hashes a password for storage (argon2, random salt).
pub fn hash_password(password: &str) -> StoreResult<String> {
    use argon2::{
        password_hash::{rand_core::OsRng, SaltString},
        Argon2, PasswordHasher,
    };

    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| StoreError::Auth(format!("Failed to hash password: {}", e)))?;

    Ok(hash.to_string())
}

/// Checks a password against a stored hash.
pub fn verify_password(password: &str, hash: &str) -> bool {
    use argon2::{Argon2, PasswordHash, PasswordVerifier};

    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

// =============================================================================
// Accounts
// =============================================================================

#[derive(Debug, Clone)]
struct Account {
    user: User,
    password_hash: String,
}

/// User records keyed by case-insensitive email.
#[derive(Debug, Default)]
pub(crate) struct Accounts {
    accounts: Vec<Account>,
    session: Option<Session>,
}

fn same_email(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}

impl Accounts {
    pub(crate) fn contains_email(&self, email: &str) -> bool {
        self.accounts.iter().any(|a| same_email(&a.user.email, email))
    }

    /// Stored user and hash for an email.
    pub(crate) fn credentials(&self, email: &str) -> Option<(User, String)> {
        self.accounts
            .iter()
            .find(|a| same_email(&a.user.email, email))
            .map(|a| (a.user.clone(), a.password_hash.clone()))
    }

    pub(crate) fn get(&self, user_id: &str) -> Option<&User> {
        self.accounts
            .iter()
            .map(|a| &a.user)
            .find(|u| u.id == user_id)
    }

    pub(crate) fn users(&self) -> Vec<User> {
        self.accounts.iter().map(|a| a.user.clone()).collect()
    }

    /// Inserts a new user. The caller has validated and hashed already.
    pub(crate) fn insert(
        &mut self,
        id: String,
        registration: &Registration,
        password_hash: String,
        role: Role,
        now: DateTime<Utc>,
    ) -> StoreResult<User> {
        if self.contains_email(&registration.email) {
            return Err(StoreError::Auth(format!(
                "An account with email {} already exists",
                registration.email.trim()
            )));
        }

        let user = User {
            id,
            name: registration.name.trim().to_string(),
            email: registration.email.trim().to_string(),
            phone: registration.phone.trim().to_string(),
            role,
            created_at: now,
        };
        self.accounts.push(Account {
            user: user.clone(),
            password_hash,
        });

        Ok(user)
    }

    pub(crate) fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub(crate) fn start_session(&mut self, user: User, now: DateTime<Utc>) -> Session {
        let session = Session {
            user,
            started_at: now,
        };
        self.session = Some(session.clone());
        session
    }

    pub(crate) fn end_session(&mut self) -> Option<Session> {
        self.session.take()
    }
}
