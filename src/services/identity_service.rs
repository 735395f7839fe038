//! Credential registry: the identities allowed past protected routes.
//!
//! Built once at startup from configuration and shared read-only afterwards.
//! Only bcrypt hashes are kept; callers can ask whether a username/password
//! pair is valid, never read what is stored.

use crate::models::access::Role;
use bcrypt::BcryptError;
use std::fmt;

/// A configured identity with its salted password hash.
pub struct Identity {
    username: String,
    password_hash: String,
    role: Role,
}

impl Identity {
    /// Hash `password` with bcrypt at `cost` and build the identity.
    pub fn new(
        username: impl Into<String>,
        password: &str,
        role: Role,
        cost: u32,
    ) -> Result<Self, BcryptError> {
        Ok(Self {
            username: username.into(),
            password_hash: bcrypt::hash(password, cost)?,
            role,
        })
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Identity")
            .field("username", &self.username)
            .field("role", &self.role)
            .finish_non_exhaustive()
    }
}

/// Immutable set of identities checked on every non-public request.
#[derive(Debug)]
pub struct IdentityRegistry {
    identities: Vec<Identity>,
    /// Verified against when the username is unknown, so a miss costs the
    /// same as a wrong password.
    dummy_hash: String,
}

impl IdentityRegistry {
    pub fn new(identities: Vec<Identity>, cost: u32) -> Result<Self, BcryptError> {
        Ok(Self {
            identities,
            dummy_hash: bcrypt::hash("unused-dummy-password", cost)?,
        })
    }

    /// Registry holding the single configured admin identity.
    pub fn admin(username: &str, password: &str, cost: u32) -> Result<Self, BcryptError> {
        let admin = Identity::new(username, password, Role::Admin, cost)?;
        Self::new(vec![admin], cost)
    }

    /// Check a username/password pair. Returns the identity's role on success.
    ///
    /// bcrypt work is CPU bound; async callers should run this on a blocking
    /// thread.
    pub fn verify(&self, username: &str, password: &str) -> Option<Role> {
        match self.identities.iter().find(|i| i.username == username) {
            Some(identity) => bcrypt::verify(password, &identity.password_hash)
                .unwrap_or(false)
                .then_some(identity.role),
            None => {
                let _ = bcrypt::verify(password, &self.dummy_hash);
                None
            }
        }
    }
}
