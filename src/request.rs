//! Request framing for the i-regul protocol.
//!
//! A request is the plain concatenation of a command prefix, the installation
//! identifier, the password and a trailing directive carrying the request tag:
//!
//! ```text
//! cdraminfo<id><password>{10#}
//! ```
//!
//! There are no separators, no length prefix and no terminator.
//!
//! # Example
//!
//! ```
//! use iregul::{build_request, Credentials};
//!
//! let credentials = Credentials::new("123456", "secret");
//! assert_eq!(build_request(&credentials), "cdraminfo123456secret{10#}");
//! ```

/// Command prefix of the data request.
pub const COMMAND_PREFIX: &str = "cdraminfo";

/// Request tag asking for the full register dump.
pub const REQUEST_ID: u8 = 10;

/// Installation identifier and password used to authenticate every request.
///
/// The password never appears in `Debug` output.
#[derive(Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
pub struct Credentials {
    id: String,
    password: String,
}

impl Credentials {
    /// Creates a new credential pair.
    pub fn new(id: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            password: password.into(),
        }
    }

    /// Returns the installation identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub(crate) fn password(&self) -> &str {
        &self.password
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("id", &self.id)
            .field("password", &"***")
            .finish()
    }
}

/// Builds the request payload for the given credentials.
pub fn build_request(credentials: &Credentials) -> String {
    format!(
        "{COMMAND_PREFIX}{}{}{{{REQUEST_ID}#}}",
        credentials.id(),
        credentials.password()
    )
}

/// Same layout as [`build_request`] with the password masked, for logging.
pub(crate) fn redacted_request(credentials: &Credentials) -> String {
    format!("{COMMAND_PREFIX}{}***{{{REQUEST_ID}#}}", credentials.id())
}
