//! Cart owner resolution.
//!
//! A cart belongs to either an authenticated user or an anonymous guest
//! session, never both. [`Owner`] encodes that exclusivity in the type;
//! [`Owner::resolve`] is called once per request with whatever identity
//! material the caller has, and every store operation takes the resolved
//! value explicitly rather than reaching into ambient request state.

use std::fmt::{Display, Formatter, Result as FmtResult};

use thiserror::Error;
use uuid::Uuid;

use crate::uuids::TypedUuid;

/// Marker for user identifiers. Users themselves live in an external
/// identity provider; only their uuid appears in this schema.
#[derive(Debug)]
pub struct User;

/// User UUID
pub type UserUuid = TypedUuid<User>;

/// An anonymous guest session token, guaranteed non-blank.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionToken(String);

impl SessionToken {
    /// Returns `None` for an empty or whitespace-only token, which counts
    /// as "no token" during owner resolution.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Option<Self> {
        let token = token.into();

        if token.trim().is_empty() {
            None
        } else {
            Some(Self(token))
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// No authenticated user and no guest token were present. Read paths
/// treat this as an empty cart rather than a hard failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no authenticated user or guest session token present")]
pub struct OwnerUnresolved;

/// The identity a cart belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Owner {
    User(UserUuid),
    Guest(SessionToken),
}

impl Owner {
    /// Resolve an owner from request identity material. An authenticated
    /// user always takes precedence over a guest token; a blank token
    /// counts as absent.
    ///
    /// # Errors
    ///
    /// Returns [`OwnerUnresolved`] when neither identity is available.
    pub fn resolve(
        user: Option<UserUuid>,
        guest_token: Option<&str>,
    ) -> Result<Self, OwnerUnresolved> {
        if let Some(user) = user {
            return Ok(Self::User(user));
        }

        guest_token
            .and_then(SessionToken::new)
            .map(Self::Guest)
            .ok_or(OwnerUnresolved)
    }

    /// Rebuild an owner from the nullable `user_id`/`session_token` column
    /// pair. Fails when the pair violates ownership exclusivity.
    pub(crate) fn from_columns(
        user_id: Option<Uuid>,
        session_token: Option<String>,
    ) -> Result<Self, String> {
        match (user_id, session_token) {
            (Some(user), None) => Ok(Self::User(UserUuid::from_uuid(user))),
            (None, Some(token)) => SessionToken::new(token)
                .map(Self::Guest)
                .ok_or_else(|| "blank session_token".to_string()),
            (Some(_), Some(_)) => Err("both user_id and session_token set".to_string()),
            (None, None) => Err("neither user_id nor session_token set".to_string()),
        }
    }

    #[must_use]
    pub fn user_uuid(&self) -> Option<UserUuid> {
        match self {
            Self::User(user) => Some(*user),
            Self::Guest(_) => None,
        }
    }

    #[must_use]
    pub fn session_token(&self) -> Option<&SessionToken> {
        match self {
            Self::User(_) => None,
            Self::Guest(token) => Some(token),
        }
    }
}

impl Display for Owner {
    // Guest tokens are session secrets; never render them in log output.
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::User(user) => write!(f, "user:{user}"),
            Self::Guest(_) => f.write_str("guest"),
        }
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;

    #[test]
    fn authenticated_user_wins_over_guest_token() {
        let user = UserUuid::new();

        let owner = Owner::resolve(Some(user), Some("guest-token"))
            .expect("resolve should succeed with a user present");

        assert_eq!(owner, Owner::User(user));
        assert!(owner.session_token().is_none());
    }

    #[test]
    fn guest_token_alone_resolves_to_guest() {
        let owner =
            Owner::resolve(None, Some("g1")).expect("resolve should succeed with a token present");

        assert_eq!(owner.session_token().map(SessionToken::as_str), Some("g1"));
        assert!(owner.user_uuid().is_none());
    }

    #[test]
    fn blank_token_counts_as_absent() {
        assert_eq!(Owner::resolve(None, Some("   ")), Err(OwnerUnresolved));
        assert_eq!(Owner::resolve(None, Some("")), Err(OwnerUnresolved));
    }

    #[test]
    fn no_identity_is_unresolved() {
        assert_eq!(Owner::resolve(None, None), Err(OwnerUnresolved));
    }

    #[test]
    fn from_columns_rejects_invalid_pairs() {
        let user = Uuid::now_v7();

        assert!(Owner::from_columns(Some(user), Some("g1".to_string())).is_err());
        assert!(Owner::from_columns(None, None).is_err());
        assert!(Owner::from_columns(None, Some(String::new())).is_err());
    }

    #[test]
    fn display_never_leaks_the_token() {
        let owner = Owner::resolve(None, Some("secret-token")).expect("resolve should succeed");

        assert!(!format!("{owner}").contains("secret-token"));
    }
}
