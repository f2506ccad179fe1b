//! Unified error handling for the cart service.
//!
//! Provides a unified `ClientError` type and the user-facing message for
//! each failure class. All cart operations return `Result<T, ClientError>`.

use cartwise_core::CartError;
use thiserror::Error;

use crate::api::ApiError;
use crate::config::ConfigError;

/// Application-level error type for cart and catalog operations.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Input rejected before any network call.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    /// Backend request failed.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Local cart file could not be read or written.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Local cart file is not valid JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failure classes that get distinct user-facing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing product id, zero quantity.
    Validation,
    /// A request exceeded its timeout.
    Timeout,
    /// The server answered with a non-2xx status.
    Rejected,
    /// Anything else.
    Other,
}

impl ClientError {
    /// Classify this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Cart(_) => ErrorKind::Validation,
            Self::Api(ApiError::Timeout { .. }) => ErrorKind::Timeout,
            Self::Api(ApiError::Api { .. }) => ErrorKind::Rejected,
            _ => ErrorKind::Other,
        }
    }

    /// Message suitable for showing to the user.
    ///
    /// Never includes raw server or transport details.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Cart(CartError::MissingProductId) => {
                "This product can't be added to the cart because it has no identifier.".to_string()
            }
            Self::Cart(CartError::InvalidQuantity(_)) => "Quantity must be at least 1.".to_string(),
            Self::Api(ApiError::Timeout { .. }) => {
                "The server took too long to respond. Check your connection and try again."
                    .to_string()
            }
            Self::Api(ApiError::Api { .. }) => {
                "We couldn't sync your cart with the server. Please try again.".to_string()
            }
            Self::Config(err) => err.to_string(),
            _ => "Something went wrong while updating your cart.".to_string(),
        }
    }
}

/// Result type alias for `ClientError`.
pub type Result<T> = std::result::Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_error_display() {
        let err = ClientError::from(CartError::MissingProductId);
        assert_eq!(err.to_string(), "Cart error: Product has no identifier");

        let err = ClientError::from(ApiError::Api {
            status: 500,
            message: "boom".to_string(),
        });
        assert_eq!(err.to_string(), "API error: API error: 500 - boom");
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(
            ClientError::from(CartError::InvalidQuantity(0)).kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            ClientError::from(ApiError::Timeout {
                operation: "list carts"
            })
            .kind(),
            ErrorKind::Timeout
        );
        assert_eq!(
            ClientError::from(ApiError::Api {
                status: 409,
                message: "conflict".to_string(),
            })
            .kind(),
            ErrorKind::Rejected
        );
        assert_eq!(
            ClientError::from(ApiError::Parse("bad".to_string())).kind(),
            ErrorKind::Other
        );
    }

    #[test]
    fn test_timeout_and_rejection_messages_differ() {
        let timeout = ClientError::from(ApiError::Timeout {
            operation: "list cart items",
        })
        .user_message();
        let rejected = ClientError::from(ApiError::Api {
            status: 500,
            message: "database unavailable".to_string(),
        })
        .user_message();

        assert_ne!(timeout, rejected);
        assert!(timeout.contains("too long"));
        // Don't expose server details to users
        assert!(!rejected.contains("database"));
    }
}
