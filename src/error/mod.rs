//! Error definitions
//!
//! This module provides error types for testkit-double. Every error is
//! reported synchronously at the call site that caused it.

use thiserror::Error;

/// Main error type for testkit-double
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A non-callable mock was invoked.
    #[error("'{mock}' object is not callable")]
    NotCallable {
        /// Representation of the mock that was invoked.
        mock: String,
    },

    /// A member outside the mock's declared capability set was accessed.
    #[error("{mock} has no member '{member}'")]
    UndeclaredMember {
        /// Representation of the mock.
        mock: String,
        /// The member name that was requested.
        member: String,
    },

    /// A slot is already patched.
    #[error("{container}.{member} is already patched")]
    Conflict {
        /// Name of the patched namespace.
        container: String,
        /// Name of the patched slot.
        member: String,
    },

    /// A call assertion did not hold.
    #[error("Assertion failed: {0}")]
    AssertionMismatch(String),

    /// A configured side effect raised an error.
    #[error("Raised: {0}")]
    Raised(String),

    /// A sequence side effect has no values left.
    #[error("side effect of {mock} is exhausted")]
    SideEffectExhausted {
        /// Representation of the mock.
        mock: String,
    },

    /// A protocol hook was used on a mock that does not support it.
    #[error("{mock} does not support the '{hook}' protocol")]
    UnsupportedProtocol {
        /// Representation of the mock.
        mock: String,
        /// The protocol hook name.
        hook: String,
    },

    /// A protocol hook returned a value of the wrong kind.
    #[error("{hook} should return {expected}, returned {found}")]
    BadProtocolValue {
        /// The protocol hook name.
        hook: String,
        /// What the hook should return.
        expected: String,
        /// What it returned.
        found: String,
    },

    /// The patch target does not exist.
    #[error("{container} does not have the slot '{member}'")]
    UnknownSlot {
        /// Name of the namespace.
        container: String,
        /// Name of the missing slot.
        member: String,
    },

    /// A patch asked for the original's spec but none was declared.
    #[error("{container}.{member} has no declared spec")]
    MissingSpec {
        /// Name of the namespace.
        container: String,
        /// Name of the slot.
        member: String,
    },

    /// A patch was configured with options that cannot be combined.
    #[error("Invalid patch: {0}")]
    InvalidPatch(String),
}

impl Error {
    /// Create an assertion mismatch error.
    #[must_use]
    pub fn assertion(message: impl Into<String>) -> Self {
        Self::AssertionMismatch(message.into())
    }

    /// Create a raised side effect error.
    #[must_use]
    pub fn raised(message: impl Into<String>) -> Self {
        Self::Raised(message.into())
    }

    /// Whether this error came from a failed call assertion.
    #[must_use]
    pub fn is_assertion(&self) -> bool {
        matches!(self, Self::AssertionMismatch(_))
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = Error::NotCallable {
            mock: "NonCallableMock".to_string(),
        };
        assert_eq!(err.to_string(), "'NonCallableMock' object is not callable");

        let err = Error::Conflict {
            container: "app".to_string(),
            member: "db".to_string(),
        };
        assert_eq!(err.to_string(), "app.db is already patched");
    }

    #[test]
    fn test_assertion_helper() {
        let err = Error::assertion("expected call not found");
        assert!(err.is_assertion());
        assert!(!Error::raised("boom").is_assertion());
    }
}
