//! Trusted identity headers injected by the gateway.
//!
//! The gateway verifies the caller's credentials and forwards the resulting
//! identity in these headers. Services must only be reachable through the
//! gateway, which strips or overwrites client-supplied values of the same names.

use http::HeaderName;

/// Header carrying the authenticated user's id (hyphenated UUID).
pub const USER_ID: &str = "X-User-Id";

/// Header carrying the authenticated user's role token.
pub const USER_ROLE: &str = "X-User-Role";

/// [`USER_ID`] as a typed header name.
pub const USER_ID_HEADER: HeaderName = HeaderName::from_static("x-user-id");

/// [`USER_ROLE`] as a typed header name.
pub const USER_ROLE_HEADER: HeaderName = HeaderName::from_static("x-user-role");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_names_match_wire_names() {
        assert!(USER_ID_HEADER.as_str().eq_ignore_ascii_case(USER_ID));
        assert!(USER_ROLE_HEADER.as_str().eq_ignore_ascii_case(USER_ROLE));
    }
}
