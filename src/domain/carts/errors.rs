//! Carts service errors.

use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;

use crate::domain::owners::OwnerUnresolved;

/// Carts service error variants.
#[derive(Debug, Error)]
pub enum CartsServiceError {
    /// No authenticated user and no guest session token were present.
    /// Read paths recover by treating the cart as empty.
    #[error("no cart owner could be resolved")]
    OwnerUnresolved,

    /// The cart already holds dishes from a different restaurant. The
    /// caller must clear the cart before ordering from another restaurant.
    #[error("cart already contains dishes from another restaurant")]
    RestaurantConflict,

    /// A negative quantity was requested.
    #[error("quantity cannot be negative")]
    InvalidQuantity,

    /// Dish or cart line was not found.
    #[error("cart record not found")]
    NotFound,

    /// Cart line already exists.
    #[error("cart line already exists")]
    AlreadyExists,

    /// Referenced related row does not exist.
    #[error("related resource not found")]
    InvalidReference,

    /// Required data was missing.
    #[error("missing required data")]
    MissingRequiredData,

    /// Provided data failed validation.
    #[error("invalid data")]
    InvalidData,

    /// Underlying SQL/storage error.
    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<Error> for CartsServiceError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound;
        }

        match error.as_database_error().map(DatabaseError::kind) {
            Some(ErrorKind::UniqueViolation) => Self::AlreadyExists,
            Some(ErrorKind::ForeignKeyViolation) => Self::InvalidReference,
            Some(ErrorKind::NotNullViolation) => Self::MissingRequiredData,
            Some(ErrorKind::CheckViolation) => Self::InvalidData,
            Some(ErrorKind::Other | _) | None => Self::Sql(error),
        }
    }
}

impl From<OwnerUnresolved> for CartsServiceError {
    fn from(_: OwnerUnresolved) -> Self {
        Self::OwnerUnresolved
    }
}
