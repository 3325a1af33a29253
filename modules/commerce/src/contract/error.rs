use thiserror::Error;

/// Errors that are safe to expose to other modules
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommerceError {
    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    /// A business rule refused the operation (expired coupon, minimum not met, ...).
    #[error("Rejected: {message}")]
    Rejected { message: String },

    #[error("Internal error")]
    Internal,
}

impl CommerceError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected {
            message: message.into(),
        }
    }

    pub fn internal() -> Self {
        Self::Internal
    }
}

impl From<crate::domain::error::DomainError> for CommerceError {
    fn from(domain_error: crate::domain::error::DomainError) -> Self {
        use crate::domain::error::DomainError::*;
        let message = domain_error.to_string();
        match domain_error {
            ProductNotFound { .. }
            | CartNotFound { .. }
            | CartItemNotFound { .. }
            | CouponNotFound { .. }
            | CouponIdNotFound { .. } => Self::not_found(message),
            Validation { .. } | InvalidQuantity { .. } | DuplicateCouponCode { .. } => {
                Self::validation(message)
            }
            CouponExpired { .. } | CouponUsageExceeded { .. } | BelowMinimum { .. } => {
                Self::rejected(message)
            }
            Database { .. } => Self::internal(),
        }
    }
}
