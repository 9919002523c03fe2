//! Error types for the i-regul protocol.

use std::io;
use thiserror::Error;

/// Result type alias for i-regul operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while talking to the i-regul server or reading values.
#[derive(Debug, Error)]
pub enum Error {
    /// The server rejected the credentials (response starts with `PWD}`).
    #[error("Authentication failed: invalid credentials")]
    Authentication,

    /// The response did not terminate as expected.
    #[error("Framing error: {reason}")]
    Framing {
        /// Description of the framing problem.
        reason: String,
    },

    /// The response could not be decoded.
    #[error("Malformed response: {reason}")]
    MalformedResponse {
        /// Description of the decoding problem.
        reason: String,
    },

    /// Connect, read or write did not complete in time.
    #[error("Communication timeout")]
    Timeout,

    /// I/O error during communication.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// No value is stored for the identifier.
    #[error("No value for '{id}'")]
    MissingValue {
        /// Identifier that was looked up.
        id: String,
    },

    /// The stored value is not a number.
    #[error("Value '{value}' for '{id}' is not numeric")]
    NotNumeric {
        /// Identifier that was looked up.
        id: String,
        /// Raw value as received from the server.
        value: String,
    },
}

impl Error {
    /// Creates a new `Framing` error.
    ///
    /// # Example
    ///
    /// ```
    /// use iregul::Error;
    ///
    /// let err = Error::framing("missing terminator");
    /// ```
    pub fn framing(reason: impl Into<String>) -> Self {
        Self::Framing {
            reason: reason.into(),
        }
    }

    /// Creates a new `MalformedResponse` error.
    ///
    /// # Example
    ///
    /// ```
    /// use iregul::Error;
    ///
    /// let err = Error::malformed_response("payload is not valid UTF-8");
    /// ```
    pub fn malformed_response(reason: impl Into<String>) -> Self {
        Self::MalformedResponse {
            reason: reason.into(),
        }
    }

    /// Creates a new `MissingValue` error.
    pub fn missing_value(id: impl Into<String>) -> Self {
        Self::MissingValue { id: id.into() }
    }

    /// Creates a new `NotNumeric` error.
    pub fn not_numeric(id: impl Into<String>, value: impl Into<String>) -> Self {
        Self::NotNumeric {
            id: id.into(),
            value: value.into(),
        }
    }

    /// Returns whether the error comes from the transport (I/O or timeout).
    ///
    /// A scheduler may keep polling after these; an authentication error
    /// will not go away on its own.
    ///
    /// # Example
    ///
    /// ```
    /// use iregul::Error;
    ///
    /// assert!(Error::Timeout.is_transient());
    /// assert!(!Error::Authentication.is_transient());
    /// ```
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Timeout | Self::Io(_))
    }

    /// Returns whether the error comes from reading a stored value.
    pub fn is_value_type(&self) -> bool {
        matches!(self, Self::MissingValue { .. } | Self::NotNumeric { .. })
    }

    /// Maps an I/O error to `Timeout` when it signals an expired deadline.
    pub(crate) fn from_io(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::TimedOut => Self::Timeout,
            _ => Self::Io(err),
        }
    }
}

impl From<tokio::time::error::Elapsed> for Error {
    fn from(_: tokio::time::error::Elapsed) -> Self {
        Self::Timeout
    }
}
