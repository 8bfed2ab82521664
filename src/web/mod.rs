//! HTTP integration surface.
//!
//! This module connects HTTP request types to the header filter and the
//! request-scoped security context. It handles:
//! - Reading identity headers from `http` types or plain maps ([`IdentityHeaders`])
//! - Running the filter once per request and scoping the resulting context
//!   around the downstream service ([`HeaderAuthLayer`])
//!
//! # Design Principles
//!
//! 1. **Trust the Gateway**: No token is validated here. The headers are
//!    honored only because the service is reachable exclusively through a
//!    gateway that sets them.
//!
//! 2. **Never Reject**: Missing or malformed identity degrades to "no
//!    authentication". Deciding whether that is acceptable belongs to the
//!    handler, usually via [`current_user_id`](crate::current_user_id).
//!
//! 3. **Isolated Contexts**: Each request gets its own context through a
//!    task-local; no state is shared between requests.
//!
//! # Integration Flow
//!
//! ```text
//! HTTP Request (X-User-Id, X-User-Role)
//!   ↓
//! HeaderAuthLayer: new SecurityContext, filter installs entry
//!   ↓
//! Inner service runs inside the context scope
//!   ↓
//! Handlers call current_principal() / current_user_id()
//!   ↓
//! Response future completes, context dropped
//! ```
//!
//! # Example Flow
//!
//! ```ignore
//! // With axum:
//! let app = Router::new()
//!     .route("/loans", post(create_loan))
//!     .layer(HeaderAuthLayer::default());
//!
//! async fn create_loan(Json(body): Json<NewLoan>) -> Result<Json<Loan>, AppError> {
//!     let borrower = gateway_auth::current_user_id()?;
//!     // ...
//! }
//! ```

pub(crate) mod extract;
mod layer;

pub use extract::{HeaderText, IdentityHeaders};
pub use layer::{HeaderAuthLayer, HeaderAuthService};
