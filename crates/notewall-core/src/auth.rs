//! Signed-in identity
//!
//! Sign-in itself happens elsewhere; the board only asks who is signed in
//! right now.

use std::sync::{Arc, RwLock};

/// The currently authenticated user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedInUser {
    pub email: String,
}

/// Synchronously answers "who is signed in?"
pub trait IdentityProvider: Send + Sync {
    /// `None` when nobody is signed in or the identity has no email
    fn current_user(&self) -> Option<SignedInUser>;
}

/// Identity provider holding a swappable signed-in email
#[derive(Debug, Clone, Default)]
pub struct StaticIdentity {
    email: Arc<RwLock<Option<String>>>,
}

impl StaticIdentity {
    /// Signed in as `email`; blank emails count as signed out
    #[must_use]
    pub fn new(email: Option<String>) -> Self {
        let identity = Self::default();
        identity.set_email(email);
        identity
    }

    #[must_use]
    pub fn signed_out() -> Self {
        Self::default()
    }

    pub fn set_email(&self, email: Option<String>) {
        let email = email
            .map(|email| email.trim().to_string())
            .filter(|email| !email.is_empty());
        if let Ok(mut slot) = self.email.write() {
            *slot = email;
        }
    }
}

impl IdentityProvider for StaticIdentity {
    fn current_user(&self) -> Option<SignedInUser> {
        let email = self.email.read().ok()?.clone()?;
        Some(SignedInUser { email })
    }
}
