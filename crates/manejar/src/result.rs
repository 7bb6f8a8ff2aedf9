//! Result and error types for Manejar.

use thiserror::Error;

/// Result type for Manejar operations
pub type ManejarResult<T> = Result<T, ManejarError>;

/// Errors that can occur in Manejar
#[derive(Debug, Error)]
pub enum ManejarError {
    /// A required element (overlay, strictly addressed option, thumb) could
    /// not be resolved within the configured wait. Fatal to the calling
    /// operation; not retried beyond the bounded wait.
    #[error("Not found: {what}")]
    NotFound {
        /// What was being looked for
        what: String,
    },

    /// A close trigger executed but the overlay remained visible afterward.
    /// Distinct from [`ManejarError::NotFound`]: the trigger ran but had no
    /// visible effect, which usually points at a mis-targeted close locator
    /// rather than a timing issue.
    #[error("Options not closed: {what} still visible after close trigger")]
    NotClosed {
        /// The surface that refused to go away
        what: String,
    },

    /// A numeric value or fraction argument fell outside its declared
    /// domain. Raised before any UI interaction occurs.
    #[error("Value {value} out of range [{min}, {max}]")]
    OutOfRange {
        /// The offending value
        value: f64,
        /// Lower bound of the domain
        min: f64,
        /// Upper bound of the domain
        max: f64,
    },

    /// A bounded wait expired without the condition being met
    #[error("Operation timed out after {ms}ms")]
    Timeout {
        /// Timeout in milliseconds
        ms: u64,
    },

    /// A node handle no longer resolves in the live tree
    #[error("Stale node handle: {id}")]
    StaleNode {
        /// Raw id of the dead handle
        id: u64,
    },

    /// A locator expression could not be evaluated (e.g. an invalid regex
    /// pattern, which is undetectable at build time by design)
    #[error("Invalid locator expression: {message}")]
    InvalidExpression {
        /// Error message
        message: String,
    },

    /// Input simulation failed
    #[error("Input simulation failed: {message}")]
    InputError {
        /// Error message
        message: String,
    },

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
