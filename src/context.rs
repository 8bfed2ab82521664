//! Request-scoped storage for the current authentication.
//!
//! Each request gets its own [`SecurityContext`], bound to the task that
//! serves it through a tokio task-local. The binding follows the request's
//! future across `.await` points and worker threads, and ends when that future
//! completes. Nothing is shared between requests, so no locking is involved.
//!
//! # Lifecycle
//!
//! ```text
//! request arrives
//!   ↓
//! SecurityContext::new()          (empty)
//!   ↓
//! header filter sets at most one entry
//!   ↓
//! scope(ctx, handler)             (downstream code reads via accessor)
//!   ↓
//! handler future completes        (context dropped)
//! ```
//!
//! Code that prefers explicit threading can hold a `SecurityContext` directly
//! and call the same read methods on it.

use std::cell::RefCell;
use std::future::Future;

use tokio::task::futures::TaskLocalFuture;
use uuid::Uuid;

use crate::authentication::Authentication;
use crate::error::{Error, Result};
use crate::principal::UserPrincipal;

/// Fallback returned by [`SecurityContext::current_user_id_as_string`] when
/// no principal resolves.
pub const ANONYMOUS: &str = "anonymous";

tokio::task_local! {
    static SECURITY_CONTEXT: SecurityContext;
}

/// Holder of zero or one "current authentication" entry.
///
/// # Examples
///
/// ```
/// use gateway_auth::{Authentication, SecurityContext, UserPrincipal};
/// use uuid::Uuid;
///
/// let ctx = SecurityContext::new();
/// assert_eq!(ctx.current_user_id_as_string(), "anonymous");
///
/// let principal = UserPrincipal::new(Uuid::nil(), "ADMIN");
/// ctx.set_authentication(Authentication::from_principal(principal.clone()));
/// assert_eq!(ctx.current_principal(), Some(principal));
///
/// ctx.clear();
/// assert!(ctx.current_principal().is_none());
/// ```
#[derive(Debug, Default)]
pub struct SecurityContext {
    authentication: RefCell<Option<Authentication>>,
}

impl SecurityContext {
    /// Creates an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a context already holding `authentication`.
    pub fn with_authentication(authentication: Authentication) -> Self {
        Self {
            authentication: RefCell::new(Some(authentication)),
        }
    }

    /// Returns a copy of the current entry, if any.
    pub fn authentication(&self) -> Option<Authentication> {
        self.authentication.borrow().clone()
    }

    /// Installs `authentication`, replacing any previous entry.
    pub fn set_authentication(&self, authentication: Authentication) {
        *self.authentication.borrow_mut() = Some(authentication);
    }

    /// Removes the current entry.
    pub fn clear(&self) {
        self.authentication.borrow_mut().take();
    }

    /// Returns whether the context holds an entry marked authenticated.
    pub fn is_authenticated(&self) -> bool {
        self.authentication
            .borrow()
            .as_ref()
            .is_some_and(Authentication::is_authenticated)
    }

    /// Resolves the current entry into a principal.
    ///
    /// Returns `None` when there is no entry or it does not resolve. See
    /// [`Authentication::resolve_principal`].
    pub fn current_principal(&self) -> Option<UserPrincipal> {
        self.authentication
            .borrow()
            .as_ref()
            .and_then(Authentication::resolve_principal)
    }

    /// Returns the current user's id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoAuthenticatedUser`] if no principal resolves.
    pub fn current_user_id(&self) -> Result<Uuid> {
        self.current_principal()
            .map(|p| p.user_id())
            .ok_or(Error::NoAuthenticatedUser)
    }

    /// Returns the current user's role.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoAuthenticatedUser`] if no principal resolves.
    pub fn current_user_role(&self) -> Result<String> {
        self.current_principal()
            .map(|p| p.role().to_string())
            .ok_or(Error::NoAuthenticatedUser)
    }

    /// Returns the current user's id as text, or [`ANONYMOUS`].
    pub fn current_user_id_as_string(&self) -> String {
        self.current_principal()
            .map(|p| p.name())
            .unwrap_or_else(|| ANONYMOUS.to_string())
    }
}

impl Clone for SecurityContext {
    /// Produces an independent snapshot; later writes to either copy are not
    /// seen by the other.
    fn clone(&self) -> Self {
        Self {
            authentication: RefCell::new(self.authentication()),
        }
    }
}

/// Runs `future` with `ctx` as the current security context.
///
/// The context is dropped when the returned future completes.
pub fn scope<F: Future>(ctx: SecurityContext, future: F) -> TaskLocalFuture<SecurityContext, F> {
    SECURITY_CONTEXT.scope(ctx, future)
}

/// Runs `f` synchronously with `ctx` as the current security context.
pub fn sync_scope<F, R>(ctx: SecurityContext, f: F) -> R
where
    F: FnOnce() -> R,
{
    SECURITY_CONTEXT.sync_scope(ctx, f)
}

/// Calls `f` with the current security context.
///
/// Returns `None` when called outside of any scope.
pub fn with_current<F, R>(f: F) -> Option<R>
where
    F: FnOnce(&SecurityContext) -> R,
{
    SECURITY_CONTEXT.try_with(f).ok()
}

/// Returns whether a security context is in scope for the running task.
pub fn in_scope() -> bool {
    with_current(|_| ()).is_some()
}

/// Installs `authentication` into the current context.
///
/// Returns `false`, leaving nothing changed, when no context is in scope.
pub fn set_current(authentication: Authentication) -> bool {
    with_current(|ctx| ctx.set_authentication(authentication)).is_some()
}

/// Clears the current context. Returns `false` when no context is in scope.
pub fn clear_current() -> bool {
    with_current(SecurityContext::clear).is_some()
}

/// Carries a snapshot of the current context into `future`.
///
/// Task-locals do not follow work handed to `tokio::spawn`; wrap the spawned
/// future with this to give it the same view of the current user. Outside of
/// any scope the future runs with an empty context.
///
/// # Examples
///
/// ```no_run
/// # async fn example() {
/// use gateway_auth::context;
///
/// let handle = tokio::spawn(context::propagate(async {
///     gateway_auth::current_user_id_as_string()
/// }));
/// # let _ = handle.await;
/// # }
/// ```
pub fn propagate<F: Future>(future: F) -> TaskLocalFuture<SecurityContext, F> {
    let snapshot = with_current(SecurityContext::clone).unwrap_or_default();
    scope(snapshot, future)
}
