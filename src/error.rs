//! Error types for gateway authentication.
//!
//! Malformed inbound identity is reported through the same enum as a missing
//! user, but only the latter is meant to reach application code.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors surfaced by the gateway authentication layer.
///
/// Only [`Error::NoAuthenticatedUser`] ever reaches callers of the accessor.
/// The other variants describe malformed inbound identity, which the filter
/// and accessor recover from locally by treating the request as anonymous.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// No resolvable principal is present in the current security context.
    #[error("no authenticated user found in security context")]
    NoAuthenticatedUser,

    /// A user id was not a hyphenated UUID.
    #[error("malformed user id '{value}': expected a hyphenated UUID")]
    MalformedUserId {
        /// The offending input
        value: String,
    },

    /// A header value contained bytes that are not visible text.
    #[error("header '{header}' does not contain a valid text value")]
    InvalidHeaderValue {
        /// Name of the offending header
        header: String,
    },
}
