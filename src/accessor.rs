//! Read-side access to the current user from anywhere in a request.
//!
//! These functions read the security context of the running request (see
//! [`context`](crate::context)). There are two tiers:
//! - [`current_principal`] returns `None` when nobody is authenticated. It is
//!   the primitive everything else builds on.
//! - [`current_user_id`] and [`current_user_role`] fail with
//!   [`Error::NoAuthenticatedUser`] instead, for code paths that require a user.
//!
//! [`current_user_id_as_string`] never fails and falls back to `"anonymous"`,
//! for audit fields that must always have a value.
//!
//! Called outside any request scope, all of them behave as if nobody were
//! authenticated.

use uuid::Uuid;

use crate::context::{self, SecurityContext, ANONYMOUS};
use crate::error::{Error, Result};
use crate::principal::UserPrincipal;

/// Returns the current principal, or `None` if none resolves.
///
/// # Examples
///
/// ```
/// use gateway_auth::{context, current_principal, Authentication, SecurityContext, UserPrincipal};
/// use uuid::Uuid;
///
/// assert!(current_principal().is_none());
///
/// let principal = UserPrincipal::new(Uuid::nil(), "ADMIN");
/// let ctx = SecurityContext::with_authentication(Authentication::from_principal(principal.clone()));
///
/// context::sync_scope(ctx, || {
///     assert_eq!(current_principal(), Some(principal));
/// });
/// ```
pub fn current_principal() -> Option<UserPrincipal> {
    context::with_current(SecurityContext::current_principal).flatten()
}

/// Returns the current user's id.
///
/// # Errors
///
/// Returns [`Error::NoAuthenticatedUser`] if [`current_principal`] is `None`.
pub fn current_user_id() -> Result<Uuid> {
    context::with_current(SecurityContext::current_user_id)
        .unwrap_or(Err(Error::NoAuthenticatedUser))
}

/// Returns the current user's role.
///
/// # Errors
///
/// Returns [`Error::NoAuthenticatedUser`] if [`current_principal`] is `None`.
pub fn current_user_role() -> Result<String> {
    context::with_current(SecurityContext::current_user_role)
        .unwrap_or(Err(Error::NoAuthenticatedUser))
}

/// Returns the current user's id as text, or `"anonymous"`.
pub fn current_user_id_as_string() -> String {
    context::with_current(SecurityContext::current_user_id_as_string)
        .unwrap_or_else(|| ANONYMOUS.to_string())
}
