//! Authentication entries held by the security context.
//!
//! An entry records who the request is acting for, whether that identity was
//! authenticated, and the authorities granted to it. The identity may have been
//! installed by the header filter or by some other upstream mechanism, so the
//! payload comes in several shapes; [`Authentication::resolve_principal`] is the
//! one place that normalizes them into a [`UserPrincipal`].

use std::any::{type_name, Any};
use std::fmt;
use std::sync::Arc;

use tracing::warn;
use uuid::Uuid;

use crate::principal::{parse_user_id, role_from_authority, UserPrincipal, DEFAULT_ROLE};

/// The identity carried by an [`Authentication`].
#[derive(Clone)]
pub enum PrincipalPayload {
    /// A fully formed principal, as installed by the header filter.
    User(UserPrincipal),
    /// A bare user id with no embedded role.
    Id(Uuid),
    /// A textual user id.
    Text(String),
    /// Any other value, kept together with its type name for diagnostics.
    Other {
        /// `std::any::type_name` of the wrapped value
        type_name: &'static str,
        /// The wrapped value
        value: Arc<dyn Any + Send + Sync>,
    },
}

impl PrincipalPayload {
    /// Wraps an arbitrary value whose shape the accessor does not understand.
    pub fn other<T: Any + Send + Sync>(value: T) -> Self {
        PrincipalPayload::Other {
            type_name: type_name::<T>(),
            value: Arc::new(value),
        }
    }

    /// Returns a short label for the payload shape.
    pub fn kind(&self) -> &'static str {
        match self {
            PrincipalPayload::User(_) => "user",
            PrincipalPayload::Id(_) => "id",
            PrincipalPayload::Text(_) => "text",
            PrincipalPayload::Other { type_name, .. } => *type_name,
        }
    }
}

impl fmt::Debug for PrincipalPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrincipalPayload::User(p) => f.debug_tuple("User").field(p).finish(),
            PrincipalPayload::Id(id) => f.debug_tuple("Id").field(id).finish(),
            PrincipalPayload::Text(s) => f.debug_tuple("Text").field(s).finish(),
            PrincipalPayload::Other { type_name, .. } => f
                .debug_struct("Other")
                .field("type_name", type_name)
                .finish_non_exhaustive(),
        }
    }
}

impl From<UserPrincipal> for PrincipalPayload {
    fn from(principal: UserPrincipal) -> Self {
        PrincipalPayload::User(principal)
    }
}

impl From<Uuid> for PrincipalPayload {
    fn from(id: Uuid) -> Self {
        PrincipalPayload::Id(id)
    }
}

impl From<String> for PrincipalPayload {
    fn from(text: String) -> Self {
        PrincipalPayload::Text(text)
    }
}

impl From<&str> for PrincipalPayload {
    fn from(text: &str) -> Self {
        PrincipalPayload::Text(text.to_string())
    }
}

/// How an [`Authentication`] came to exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthenticationKind {
    /// Identity established upstream (the gateway) and trusted as-is.
    PreAuthenticated,
    /// Placeholder standing in for "nobody"; never resolves to a principal.
    Anonymous,
}

/// A single "current authentication" entry.
///
/// # Examples
///
/// ```
/// use gateway_auth::{Authentication, UserPrincipal};
/// use uuid::Uuid;
///
/// let id = Uuid::parse_str("3fa85f64-5717-4562-b3fc-2c963f66afa6").unwrap();
/// let auth = Authentication::pre_authenticated(id, ["ROLE_ADMIN"]);
///
/// assert_eq!(auth.resolve_principal(), Some(UserPrincipal::new(id, "ADMIN")));
/// ```
#[derive(Debug, Clone)]
pub struct Authentication {
    principal: PrincipalPayload,
    authenticated: bool,
    kind: AuthenticationKind,
    authorities: Vec<String>,
}

impl Authentication {
    /// Creates the entry the header filter installs for `principal`.
    ///
    /// The entry is authenticated and grants exactly `principal.authority()`.
    pub fn from_principal(principal: UserPrincipal) -> Self {
        let authority = principal.authority();
        Self::pre_authenticated(principal, [authority])
    }

    /// Creates an authenticated entry.
    ///
    /// Authorities keep their first-seen order; duplicates are dropped.
    pub fn pre_authenticated<P, I, A>(principal: P, authorities: I) -> Self
    where
        P: Into<PrincipalPayload>,
        I: IntoIterator<Item = A>,
        A: Into<String>,
    {
        Self {
            principal: principal.into(),
            authenticated: true,
            kind: AuthenticationKind::PreAuthenticated,
            authorities: dedup(authorities),
        }
    }

    /// Creates an entry that is present but not authenticated.
    pub fn unauthenticated(principal: impl Into<PrincipalPayload>) -> Self {
        Self {
            principal: principal.into(),
            authenticated: false,
            kind: AuthenticationKind::PreAuthenticated,
            authorities: Vec::new(),
        }
    }

    /// Creates an anonymous placeholder entry.
    ///
    /// Anonymous entries are marked authenticated, like the placeholder tokens
    /// some frameworks install, but never resolve to a principal.
    pub fn anonymous<P, I, A>(principal: P, authorities: I) -> Self
    where
        P: Into<PrincipalPayload>,
        I: IntoIterator<Item = A>,
        A: Into<String>,
    {
        Self {
            principal: principal.into(),
            authenticated: true,
            kind: AuthenticationKind::Anonymous,
            authorities: dedup(authorities),
        }
    }

    /// Returns the raw principal payload.
    pub fn principal(&self) -> &PrincipalPayload {
        &self.principal
    }

    /// Returns whether the entry is marked authenticated.
    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    /// Returns whether the entry is an anonymous placeholder.
    pub fn is_anonymous(&self) -> bool {
        self.kind == AuthenticationKind::Anonymous
    }

    /// Returns how the entry was created.
    pub fn kind(&self) -> AuthenticationKind {
        self.kind
    }

    /// Returns the granted authorities in insertion order.
    pub fn authorities(&self) -> &[String] {
        &self.authorities
    }

    /// Returns a display name for the entry.
    ///
    /// Resolvable payloads yield the hyphenated id. Otherwise the raw text or
    /// the payload type name is returned.
    pub fn name(&self) -> String {
        match &self.principal {
            PrincipalPayload::User(p) => p.name(),
            PrincipalPayload::Id(id) => id.hyphenated().to_string(),
            PrincipalPayload::Text(s) => s.clone(),
            PrincipalPayload::Other { type_name, .. } => (*type_name).to_string(),
        }
    }

    /// Normalizes the entry into a [`UserPrincipal`].
    ///
    /// Unauthenticated and anonymous entries resolve to `None` before the
    /// payload is looked at. Bare and textual ids take their role from the
    /// first authority (minus `ROLE_`), or [`DEFAULT_ROLE`] if there is none.
    /// Unparseable text and unknown payload types are logged and resolve to
    /// `None`.
    pub fn resolve_principal(&self) -> Option<UserPrincipal> {
        if !self.authenticated || self.is_anonymous() {
            return None;
        }

        match &self.principal {
            PrincipalPayload::User(principal) => Some(principal.clone()),
            PrincipalPayload::Id(id) => Some(UserPrincipal::new(*id, self.derived_role())),
            PrincipalPayload::Text(text) => match parse_user_id(text) {
                Ok(id) => Some(UserPrincipal::new(id, self.derived_role())),
                Err(_) => {
                    warn!(principal = %text, "principal is not a valid user id");
                    None
                }
            },
            PrincipalPayload::Other { type_name, .. } => {
                warn!(type_name = %type_name, "unknown principal type");
                None
            }
        }
    }

    fn derived_role(&self) -> String {
        self.authorities
            .first()
            .map(|authority| role_from_authority(authority).to_string())
            .unwrap_or_else(|| DEFAULT_ROLE.to_string())
    }
}

fn dedup<I, A>(authorities: I) -> Vec<String>
where
    I: IntoIterator<Item = A>,
    A: Into<String>,
{
    let mut out: Vec<String> = Vec::new();
    for authority in authorities {
        let authority = authority.into();
        if !out.contains(&authority) {
            out.push(authority);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id() -> Uuid {
        Uuid::parse_str("3fa85f64-5717-4562-b3fc-2c963f66afa6").unwrap()
    }

    #[test]
    fn from_principal_grants_single_authority() {
        let auth = Authentication::from_principal(UserPrincipal::new(id(), "ADMIN"));

        assert!(auth.is_authenticated());
        assert!(!auth.is_anonymous());
        assert_eq!(auth.kind(), AuthenticationKind::PreAuthenticated);
        assert_eq!(auth.authorities(), ["ROLE_ADMIN".to_string()]);
    }

    #[test]
    fn user_payload_resolves_directly() {
        let principal = UserPrincipal::new(id(), "ADMIN");
        // Authorities are ignored when the payload already carries a role.
        let auth = Authentication::pre_authenticated(principal.clone(), ["ROLE_OTHER"]);
        assert_eq!(auth.resolve_principal(), Some(principal));
    }

    #[test]
    fn bare_id_takes_role_from_first_authority() {
        let auth = Authentication::pre_authenticated(id(), ["ROLE_ADMIN", "ROLE_USER"]);
        assert_eq!(
            auth.resolve_principal(),
            Some(UserPrincipal::new(id(), "ADMIN"))
        );
    }

    #[test]
    fn bare_id_without_authorities_defaults_to_user() {
        let auth = Authentication::pre_authenticated(id(), Vec::<String>::new());
        assert_eq!(
            auth.resolve_principal(),
            Some(UserPrincipal::new(id(), "USER"))
        );
    }

    #[test]
    fn unprefixed_authority_is_used_verbatim() {
        let auth = Authentication::pre_authenticated(id(), ["SCOPE_read"]);
        assert_eq!(auth.resolve_principal().unwrap().role(), "SCOPE_read");
    }

    #[test]
    fn textual_id_resolves() {
        let auth = Authentication::pre_authenticated(id().to_string(), ["ROLE_AUDITOR"]);
        assert_eq!(
            auth.resolve_principal(),
            Some(UserPrincipal::new(id(), "AUDITOR"))
        );
    }

    #[test]
    fn textual_non_id_resolves_to_none() {
        let auth = Authentication::pre_authenticated("alice", ["ROLE_USER"]);
        assert_eq!(auth.resolve_principal(), None);
    }

    #[test]
    fn unknown_payload_resolves_to_none() {
        #[derive(Debug)]
        struct LegacyUser;

        let auth =
            Authentication::pre_authenticated(PrincipalPayload::other(LegacyUser), ["ROLE_USER"]);
        assert_eq!(auth.resolve_principal(), None);
        assert!(auth.principal().kind().ends_with("LegacyUser"));
    }

    #[test]
    fn unauthenticated_entry_resolves_to_none() {
        let auth = Authentication::unauthenticated(UserPrincipal::new(id(), "ADMIN"));
        assert!(!auth.is_authenticated());
        assert_eq!(auth.resolve_principal(), None);
    }

    #[test]
    fn anonymous_entry_resolves_to_none_regardless_of_payload() {
        let payloads: Vec<PrincipalPayload> = vec![
            UserPrincipal::new(id(), "ADMIN").into(),
            id().into(),
            id().to_string().into(),
            "anonymousUser".into(),
        ];

        for payload in payloads {
            let auth = Authentication::anonymous(payload, ["ROLE_ANONYMOUS"]);
            assert!(auth.is_authenticated());
            assert_eq!(auth.resolve_principal(), None);
        }
    }

    #[test]
    fn authorities_are_deduplicated_in_order() {
        let auth = Authentication::pre_authenticated(id(), ["ROLE_B", "ROLE_A", "ROLE_B"]);
        assert_eq!(
            auth.authorities(),
            ["ROLE_B".to_string(), "ROLE_A".to_string()]
        );
    }

    #[test]
    fn name_reflects_payload() {
        assert_eq!(
            Authentication::pre_authenticated(id(), ["ROLE_X"]).name(),
            id().to_string()
        );
        assert_eq!(
            Authentication::pre_authenticated("svc-batch", ["ROLE_X"]).name(),
            "svc-batch"
        );
    }

    #[test]
    fn other_payload_debug_hides_value() {
        let payload = PrincipalPayload::other(42_u64);
        let debug = format!("{payload:?}");
        assert!(debug.contains("u64"));
        assert!(!debug.contains("42"));
    }
}
