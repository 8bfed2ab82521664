//! Gateway identity propagation for backend services.
//!
//! An edge gateway verifies the caller and forwards the result in two trusted
//! headers, `X-User-Id` and `X-User-Role`. This crate turns those headers into
//! a request-scoped security context and gives downstream code a small API to
//! ask "who is the current user?".
//!
//! - **No token validation**: that happened at the gateway
//! - **No authorization rules**: the role is carried, never evaluated
//! - **Never rejects a request**: bad or missing identity means "anonymous"
//!
//! # Core Types
//!
//! - [`UserPrincipal`]: Immutable (user id, role) pair with derived name and authority
//! - [`Authentication`]: The "current authentication" entry, tolerant of several payload shapes
//! - [`SecurityContext`]: Request-scoped holder of zero or one entry
//! - [`HeaderAuthenticationFilter`]: Builds an entry from the trusted headers
//! - [`web::HeaderAuthLayer`]: Tower layer running the filter once per request
//!
//! # Examples
//!
//! ```
//! use gateway_auth::{context, current_user_id, current_user_id_as_string};
//! use gateway_auth::{HeaderAuthenticationFilter, SecurityContext};
//! use http::Request;
//!
//! let request = Request::builder()
//!     .header("X-User-Id", "3fa85f64-5717-4562-b3fc-2c963f66afa6")
//!     .header("X-User-Role", "ADMIN")
//!     .body(())
//!     .unwrap();
//!
//! let ctx = SecurityContext::new();
//! HeaderAuthenticationFilter::default().apply(&request, &ctx);
//!
//! context::sync_scope(ctx, || {
//!     assert_eq!(current_user_id_as_string(), "3fa85f64-5717-4562-b3fc-2c963f66afa6");
//!     assert!(current_user_id().is_ok());
//! });
//!
//! // Outside of a request nobody is authenticated.
//! assert_eq!(current_user_id_as_string(), "anonymous");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod accessor;
mod authentication;
mod config;
pub mod context;
mod error;
mod filter;
pub mod headers;
mod principal;
pub mod web;

pub use accessor::{current_principal, current_user_id, current_user_id_as_string, current_user_role};
pub use authentication::{Authentication, AuthenticationKind, PrincipalPayload};
pub use config::HeaderAuthConfig;
pub use context::{SecurityContext, ANONYMOUS};
pub use error::{Error, Result};
pub use filter::HeaderAuthenticationFilter;
pub use principal::{parse_user_id, UserPrincipal, DEFAULT_ROLE, ROLE_PREFIX};
