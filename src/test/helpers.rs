//! Test Helpers

use crate::domain::owners::{Owner, SessionToken, UserUuid};

pub(crate) fn token(value: &str) -> SessionToken {
    SessionToken::new(value).expect("test token must be non-blank")
}

pub(crate) fn guest_owner(token_value: &str) -> Owner {
    Owner::Guest(token(token_value))
}

pub(crate) fn user_owner() -> Owner {
    Owner::User(UserUuid::new())
}
