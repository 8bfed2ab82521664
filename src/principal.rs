//! The normalized identity value used throughout a service.

use std::fmt;

use uuid::Uuid;

use crate::error::{Error, Result};

/// Prefix that turns a role into an authority string.
pub const ROLE_PREFIX: &str = "ROLE_";

/// Role assumed when an authentication entry carries no authorities.
pub const DEFAULT_ROLE: &str = "USER";

const HYPHENATED_LEN: usize = 36;

/// An authenticated user as asserted by the gateway.
///
/// Both fields are fixed at construction. The type performs no validation of
/// its own; callers hand it an already-parsed id.
///
/// # Examples
///
/// ```
/// use gateway_auth::UserPrincipal;
/// use uuid::Uuid;
///
/// let id = Uuid::parse_str("3fa85f64-5717-4562-b3fc-2c963f66afa6").unwrap();
/// let principal = UserPrincipal::new(id, "ADMIN");
///
/// assert_eq!(principal.name(), "3fa85f64-5717-4562-b3fc-2c963f66afa6");
/// assert_eq!(principal.authority(), "ROLE_ADMIN");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UserPrincipal {
    user_id: Uuid,
    role: String,
}

impl UserPrincipal {
    /// Creates a principal from an id and a role token.
    pub fn new(user_id: Uuid, role: impl Into<String>) -> Self {
        Self {
            user_id,
            role: role.into(),
        }
    }

    /// Returns the user id.
    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    /// Returns the role token as forwarded by the gateway.
    pub fn role(&self) -> &str {
        &self.role
    }

    /// Returns the canonical "who is this" string: the hyphenated user id.
    pub fn name(&self) -> String {
        self.user_id.hyphenated().to_string()
    }

    /// Returns the single authority granted by the role, `ROLE_<role>`.
    pub fn authority(&self) -> String {
        format!("{ROLE_PREFIX}{}", self.role)
    }
}

impl fmt::Display for UserPrincipal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.user_id.hyphenated())
    }
}

/// Parses a user id in hyphenated UUID form.
///
/// Hex digits may be upper or lower case. Braced, URN and unhyphenated forms
/// are rejected.
///
/// # Errors
///
/// Returns [`Error::MalformedUserId`] if `value` is not a hyphenated UUID.
///
/// # Examples
///
/// ```
/// use gateway_auth::parse_user_id;
///
/// assert!(parse_user_id("3fa85f64-5717-4562-b3fc-2c963f66afa6").is_ok());
/// assert!(parse_user_id("not-a-uuid").is_err());
/// ```
pub fn parse_user_id(value: &str) -> Result<Uuid> {
    if value.len() != HYPHENATED_LEN {
        return Err(malformed(value));
    }
    Uuid::try_parse(value).map_err(|_| malformed(value))
}

/// Converts an authority string back into a role by dropping [`ROLE_PREFIX`].
pub(crate) fn role_from_authority(authority: &str) -> &str {
    authority.strip_prefix(ROLE_PREFIX).unwrap_or(authority)
}

fn malformed(value: &str) -> Error {
    Error::MalformedUserId {
        value: value.to_string(),
    }
}
