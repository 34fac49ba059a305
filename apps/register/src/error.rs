//! # Register Error Type
//!
//! Single error type every command returns.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Command (Result<T, AppError>)                                          │
//! │         │                                                               │
//! │         ├── CartError         ── CART_ERROR ─────────────┐              │
//! │         ├── CoreError         ── VALIDATION_ERROR ───────┤              │
//! │         ├── CheckoutError     ── INSUFFICIENT_STOCK /    │              │
//! │         │                        PAYMENT_ERROR / ...  ───┼──► AppError  │
//! │         ├── ClientError       ── NETWORK_ERROR /         │              │
//! │         │                        CONFIG_ERROR / ...   ───┤              │
//! │         └── io / serde_json   ── INPUT_ERROR ────────────┘              │
//! │                                                                         │
//! │  main: prints "[CODE] message" (or JSON with --json), exits non-zero    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use kahera_client::{CheckoutError, ClientError, RejectionKind};
use kahera_core::{CartError, CoreError, FlowError};
use serde::Serialize;
use thiserror::Error;

/// Error reported to the cashier.
///
/// ## Serialization
/// With `--json` the register prints:
/// ```json
/// {
///   "code": "INSUFFICIENT_STOCK",
///   "message": "Kape 3-in-1: only 2 available (you have 3 in cart)"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Error)]
#[serde(rename_all = "camelCase")]
#[error("[{code}] {message}")]
pub struct AppError {
    /// Machine-readable error code
    pub code: ErrorCode,

    /// Human-readable error message
    pub message: String,
}

/// Error codes, also used to pick the process exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Product or cart line not found
    NotFound,

    /// Input validation failed
    ValidationError,

    /// Cart file or command-line input could not be read
    InputError,

    /// Configuration file or environment is invalid
    ConfigError,

    /// Cart operation failed
    CartError,

    /// Not enough stock for a cart line
    InsufficientStock,

    /// Product has no stock at all
    OutOfStock,

    /// Product was delisted or disabled
    ProductUnavailable,

    /// Tender or checkout dialog error
    PaymentError,

    /// Another submission is still running
    Busy,

    /// Missing or rejected credentials
    Unauthorized,

    /// Backend could not be reached
    NetworkError,

    /// Backend refused the request for another reason
    BackendError,
}

impl ErrorCode {
    /// Wire name, as it appears in `--json` output.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::ValidationError => "VALIDATION_ERROR",
            ErrorCode::InputError => "INPUT_ERROR",
            ErrorCode::ConfigError => "CONFIG_ERROR",
            ErrorCode::CartError => "CART_ERROR",
            ErrorCode::InsufficientStock => "INSUFFICIENT_STOCK",
            ErrorCode::OutOfStock => "OUT_OF_STOCK",
            ErrorCode::ProductUnavailable => "PRODUCT_UNAVAILABLE",
            ErrorCode::PaymentError => "PAYMENT_ERROR",
            ErrorCode::Busy => "BUSY",
            ErrorCode::Unauthorized => "UNAUTHORIZED",
            ErrorCode::NetworkError => "NETWORK_ERROR",
            ErrorCode::BackendError => "BACKEND_ERROR",
        }
    }

    /// Process exit status for this code.
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorCode::InputError | ErrorCode::ConfigError => 2,
            ErrorCode::NetworkError | ErrorCode::BackendError | ErrorCode::Unauthorized => 3,
            ErrorCode::InsufficientStock
            | ErrorCode::OutOfStock
            | ErrorCode::ProductUnavailable => 4,
            _ => 1,
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AppError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        AppError {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(resource: &str, id: &str) -> Self {
        AppError::new(
            ErrorCode::NotFound,
            format!("{} not found: {}", resource, id),
        )
    }

    pub fn validation(message: impl Into<String>) -> Self {
        AppError::new(ErrorCode::ValidationError, message)
    }

    pub fn input(message: impl Into<String>) -> Self {
        AppError::new(ErrorCode::InputError, message)
    }
}

// =============================================================================
// Conversions
// =============================================================================

impl From<CartError> for AppError {
    fn from(err: CartError) -> Self {
        let code = match &err {
            CartError::OutOfStock { .. } => ErrorCode::OutOfStock,
            CartError::StockLimitReached { .. } => ErrorCode::InsufficientStock,
            CartError::Unavailable { .. } => ErrorCode::ProductUnavailable,
            CartError::NotInCart(_) => ErrorCode::NotFound,
            CartError::CartFull { .. } => ErrorCode::CartError,
        };
        AppError::new(code, err.to_string())
    }
}

impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        let code = match &err {
            CoreError::InvalidTender { .. } => ErrorCode::PaymentError,
            CoreError::EmptyCart | CoreError::CartChanged => ErrorCode::CartError,
            _ => ErrorCode::ValidationError,
        };
        AppError::new(code, err.to_string())
    }
}

impl From<FlowError> for AppError {
    fn from(err: FlowError) -> Self {
        AppError::new(ErrorCode::PaymentError, err.to_string())
    }
}

impl From<ClientError> for AppError {
    fn from(err: ClientError) -> Self {
        let code = match &err {
            e if e.is_config_error() => ErrorCode::ConfigError,
            ClientError::Transport(_) | ClientError::Timeout => ErrorCode::NetworkError,
            ClientError::Unauthorized(_) => ErrorCode::Unauthorized,
            _ => ErrorCode::BackendError,
        };
        AppError::new(code, err.to_string())
    }
}

impl From<CheckoutError> for AppError {
    fn from(err: CheckoutError) -> Self {
        match err {
            CheckoutError::Invalid(e) => e.into(),
            CheckoutError::Backend(e) => e.into(),
            CheckoutError::StaleStock { .. } => {
                AppError::new(ErrorCode::InsufficientStock, err.to_string())
            }
            CheckoutError::Rejected { kind, message } => {
                let code = match kind {
                    RejectionKind::ProductUnavailable { .. } => ErrorCode::ProductUnavailable,
                    RejectionKind::InsufficientStock => ErrorCode::InsufficientStock,
                    RejectionKind::OutOfStock => ErrorCode::OutOfStock,
                };
                AppError::new(code, message)
            }
            CheckoutError::SubmissionInProgress => AppError::new(ErrorCode::Busy, err.to_string()),
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::input(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::input(format!("Invalid JSON: {}", err))
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use kahera_core::StockIssue;

    #[test]
    fn test_display_includes_code() {
        let err = AppError::validation("Cash is required");
        assert_eq!(err.to_string(), "[VALIDATION_ERROR] Cash is required");

        let err = AppError::new(ErrorCode::InsufficientStock, "Kape: only 2 available");
        assert_eq!(err.to_string(), "[INSUFFICIENT_STOCK] Kape: only 2 available");
    }

    #[test]
    fn test_display_code_matches_json_code() {
        for code in [
            ErrorCode::NotFound,
            ErrorCode::ProductUnavailable,
            ErrorCode::PaymentError,
            ErrorCode::Busy,
            ErrorCode::BackendError,
        ] {
            assert_eq!(serde_json::to_value(code).unwrap(), code.to_string());
        }
    }

    #[test]
    fn test_json_shape() {
        let json = serde_json::to_value(AppError::not_found("Product", "p-9")).unwrap();
        assert_eq!(json["code"], "NOT_FOUND");
        assert_eq!(json["message"], "Product not found: p-9");
    }

    #[test]
    fn test_rejection_codes() {
        let err: AppError = CheckoutError::Rejected {
            kind: RejectionKind::ProductUnavailable {
                product: "Kape".into(),
            },
            message: "Kape is no longer available".into(),
        }
        .into();
        assert_eq!(err.code, ErrorCode::ProductUnavailable);
        assert_eq!(err.message, "Kape is no longer available");
        assert_eq!(err.code.exit_code(), 4);

        let err: AppError = CheckoutError::StaleStock {
            issues: vec![StockIssue::Missing {
                product_id: "a".into(),
                name: "Kape".into(),
            }],
        }
        .into();
        assert_eq!(err.code, ErrorCode::InsufficientStock);
    }

    #[test]
    fn test_client_error_codes() {
        let err: AppError = ClientError::Timeout.into();
        assert_eq!(err.code, ErrorCode::NetworkError);

        let err: AppError = ClientError::InvalidConfig("bad".into()).into();
        assert_eq!(err.code, ErrorCode::ConfigError);
        assert_eq!(err.code.exit_code(), 2);

        let err: AppError =
            CheckoutError::Backend(ClientError::Unauthorized("expired".into())).into();
        assert_eq!(err.code, ErrorCode::Unauthorized);
    }

    #[test]
    fn test_cart_error_codes() {
        let err: AppError = CartError::StockLimitReached {
            name: "Sardinas".into(),
            available: 1,
        }
        .into();
        assert_eq!(err.code, ErrorCode::InsufficientStock);

        let err: AppError = CoreError::EmptyCart.into();
        assert_eq!(err.code, ErrorCode::CartError);

        let err: AppError = CheckoutError::Invalid(CoreError::CartChanged).into();
        assert_eq!(err.code, ErrorCode::CartError);
    }
}
