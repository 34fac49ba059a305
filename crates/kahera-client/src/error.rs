//! # Client Error Types
//!
//! Errors raised while talking to the backend, and the errors the cashier
//! sees when a sale cannot be completed.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Client Error Categories                            │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Configuration  │  │   Transport     │  │     Backend             │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  InvalidConfig  │  │  Transport      │  │  Api { status, code }   │ │
//! │  │  InvalidUrl     │  │  Timeout        │  │  Unauthorized           │ │
//! │  │  ConfigLoad/Save│  │                 │  │  Decode                 │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  CheckoutError wraps the above for the sale-completion path and adds   │
//! │  classified stock rejections with remediation text.                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use kahera_core::{CoreError, StockIssue};
use thiserror::Error;

/// Result type alias for backend operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Backend access errors.
#[derive(Debug, Error)]
pub enum ClientError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Invalid configuration value.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Invalid backend URL.
    #[error("Invalid API URL: {0}")]
    InvalidUrl(String),

    /// Failed to load config file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    /// Failed to save config file.
    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),

    // =========================================================================
    // Transport Errors
    // =========================================================================
    /// Request never produced a response (DNS, refused, TLS, ...).
    #[error("Could not reach the server: {0}")]
    Transport(String),

    /// Request timed out.
    #[error("Request timed out")]
    Timeout,

    // =========================================================================
    // Backend Errors
    // =========================================================================
    /// Backend answered with a non-success status.
    #[error("{message}")]
    Api {
        status: u16,
        code: Option<String>,
        message: String,
    },

    /// Missing or rejected bearer token.
    #[error("Not authorized: {0}")]
    Unauthorized(String),

    /// Response body did not match the expected shape.
    #[error("Unexpected response from server: {0}")]
    Decode(String),
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ClientError::Timeout
        } else if err.is_decode() {
            ClientError::Decode(err.to_string())
        } else {
            ClientError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Decode(err.to_string())
    }
}

impl From<url::ParseError> for ClientError {
    fn from(err: url::ParseError) -> Self {
        ClientError::InvalidUrl(err.to_string())
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        ClientError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for ClientError {
    fn from(err: toml::de::Error) -> Self {
        ClientError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for ClientError {
    fn from(err: toml::ser::Error) -> Self {
        ClientError::ConfigSaveFailed(err.to_string())
    }
}

impl ClientError {
    /// Returns true if the request may succeed when simply sent again.
    pub fn is_retryable(&self) -> bool {
        match self {
            ClientError::Transport(_) | ClientError::Timeout => true,
            ClientError::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Returns true if this error indicates a configuration problem.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            ClientError::InvalidConfig(_)
                | ClientError::InvalidUrl(_)
                | ClientError::ConfigLoadFailed(_)
                | ClientError::ConfigSaveFailed(_)
        )
    }

    /// Machine-readable code sent by the backend, if any.
    pub fn api_code(&self) -> Option<&str> {
        match self {
            ClientError::Api { code, .. } => code.as_deref(),
            _ => None,
        }
    }
}

// =============================================================================
// Checkout Error
// =============================================================================

/// Why the backend refused a sale on stock grounds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectionKind {
    /// A product in the cart was delisted or disabled.
    ProductUnavailable { product: String },
    /// Another register sold units this cart was counting on.
    InsufficientStock,
    /// Generic out-of-stock refusal.
    OutOfStock,
}

/// Errors returned by the sale-completion path.
///
/// In every case the cart is left intact so the cashier can fix it and
/// submit again.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Rejected locally before any network call.
    #[error(transparent)]
    Invalid(#[from] CoreError),

    /// Pre-submit stock check found problems.
    #[error("Some items cannot be sold as carted: {}", format_issues(.issues))]
    StaleStock { issues: Vec<StockIssue> },

    /// Backend refused the sale on stock grounds.
    #[error("{message}")]
    Rejected { kind: RejectionKind, message: String },

    /// A submission is already in flight.
    #[error("A transaction is already being submitted")]
    SubmissionInProgress,

    /// Any other backend or transport failure.
    #[error(transparent)]
    Backend(#[from] ClientError),
}

fn format_issues(issues: &[StockIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl CheckoutError {
    /// Returns true if the cashier has to change the cart before retrying.
    pub fn requires_cart_review(&self) -> bool {
        matches!(
            self,
            CheckoutError::StaleStock { .. } | CheckoutError::Rejected { .. }
        )
    }

    /// Returns true if the same submission may go through on retry.
    pub fn is_retryable(&self) -> bool {
        match self {
            CheckoutError::SubmissionInProgress => true,
            CheckoutError::Backend(err) => err.is_retryable(),
            _ => false,
        }
    }
}
