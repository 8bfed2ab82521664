//! Turns trusted gateway headers into an authentication entry.
//!
//! The filter never rejects a request. Missing headers are the normal shape of
//! anonymous or internal traffic; a malformed user id is logged and the request
//! simply carries no authentication.

use std::borrow::Cow;

use tracing::{debug, warn};

use crate::authentication::Authentication;
use crate::config::HeaderAuthConfig;
use crate::context::{self, SecurityContext};
use crate::error::{Error, Result};
use crate::principal::{parse_user_id, UserPrincipal};
use crate::web::{HeaderText, IdentityHeaders};

/// Extracts the gateway identity from request headers.
///
/// # Examples
///
/// ```
/// use gateway_auth::{HeaderAuthenticationFilter, SecurityContext};
/// use http::Request;
///
/// let request = Request::builder()
///     .header("X-User-Id", "3fa85f64-5717-4562-b3fc-2c963f66afa6")
///     .header("X-User-Role", "ADMIN")
///     .body(())
///     .unwrap();
///
/// let filter = HeaderAuthenticationFilter::default();
/// let ctx = SecurityContext::new();
/// assert!(filter.apply(&request, &ctx));
/// assert_eq!(ctx.current_user_role().unwrap(), "ADMIN");
/// ```
#[derive(Debug, Clone, Default)]
pub struct HeaderAuthenticationFilter {
    config: HeaderAuthConfig,
}

impl HeaderAuthenticationFilter {
    /// Creates a filter with the given configuration.
    pub fn new(config: HeaderAuthConfig) -> Self {
        Self { config }
    }

    /// Returns the filter's configuration.
    pub fn config(&self) -> &HeaderAuthConfig {
        &self.config
    }

    /// Builds the authentication entry described by `headers`.
    ///
    /// Returns `None` when the filter is disabled, when either header is
    /// missing, or when a header value is malformed. Only the last case is
    /// logged as a warning.
    pub fn authenticate<H>(&self, headers: &H) -> Option<Authentication>
    where
        H: IdentityHeaders + ?Sized,
    {
        if !self.config.is_enabled() {
            return None;
        }

        let id_header = self.config.user_id_header();
        let role_header = self.config.user_role_header();

        let (Some(raw_id), Some(raw_role)) =
            (headers.header_text(id_header), headers.header_text(role_header))
        else {
            debug!("gateway headers not present, passing through");
            return None;
        };

        match self.principal_from(raw_id, raw_role) {
            Ok(principal) => {
                debug!(
                    user_id = %principal.user_id(),
                    role = %principal.role(),
                    "gateway header authentication successful"
                );
                Some(Authentication::from_principal(principal))
            }
            Err(err) => {
                let shown = match raw_id {
                    Ok(text) => Cow::Borrowed(text),
                    Err(bytes) => String::from_utf8_lossy(bytes),
                };
                warn!(
                    user_id = %shown,
                    error = %err,
                    "invalid gateway identity header, authentication skipped"
                );
                None
            }
        }
    }

    /// Runs the filter against `headers` and installs the result into `ctx`.
    ///
    /// Returns whether an entry was installed. When nothing is extracted, `ctx`
    /// is left untouched.
    pub fn apply<H>(&self, headers: &H, ctx: &SecurityContext) -> bool
    where
        H: IdentityHeaders + ?Sized,
    {
        match self.authenticate(headers) {
            Some(authentication) => {
                ctx.set_authentication(authentication);
                true
            }
            None => false,
        }
    }

    /// Like [`apply`](Self::apply), targeting the context currently in scope.
    ///
    /// Returns `false` when nothing was extracted or no context is in scope.
    pub fn apply_to_current<H>(&self, headers: &H) -> bool
    where
        H: IdentityHeaders + ?Sized,
    {
        context::with_current(|ctx| self.apply(headers, ctx)).unwrap_or(false)
    }

    fn principal_from(
        &self,
        raw_id: HeaderText<'_>,
        raw_role: HeaderText<'_>,
    ) -> Result<UserPrincipal> {
        let id = raw_id.map_err(|_| Error::InvalidHeaderValue {
            header: self.config.user_id_header().to_string(),
        })?;
        let role = raw_role.map_err(|_| Error::InvalidHeaderValue {
            header: self.config.user_role_header().to_string(),
        })?;

        Ok(UserPrincipal::new(parse_user_id(id)?, role))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headers::{USER_ID_HEADER, USER_ROLE_HEADER};
    use http::{HeaderMap, HeaderName, HeaderValue};
    use uuid::Uuid;

    const ID: &str = "3fa85f64-5717-4562-b3fc-2c963f66afa6";

    fn headers(id: Option<&'static str>, role: Option<&'static str>) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Some(id) = id {
            headers.insert(USER_ID_HEADER, HeaderValue::from_static(id));
        }
        if let Some(role) = role {
            headers.insert(USER_ROLE_HEADER, HeaderValue::from_static(role));
        }
        headers
    }

    #[test]
    fn valid_headers_produce_principal_entry() {
        let filter = HeaderAuthenticationFilter::default();
        let auth = filter
            .authenticate(&headers(Some(ID), Some("ADMIN")))
            .expect("entry expected");

        assert!(auth.is_authenticated());
        assert_eq!(auth.authorities(), ["ROLE_ADMIN".to_string()]);
        assert_eq!(
            auth.resolve_principal(),
            Some(UserPrincipal::new(Uuid::parse_str(ID).unwrap(), "ADMIN"))
        );
    }

    #[test]
    fn missing_either_header_yields_nothing() {
        let filter = HeaderAuthenticationFilter::default();

        assert!(filter.authenticate(&headers(None, None)).is_none());
        assert!(filter.authenticate(&headers(Some(ID), None)).is_none());
        assert!(filter.authenticate(&headers(None, Some("ADMIN"))).is_none());
    }

    #[test]
    fn malformed_id_yields_nothing() {
        let filter = HeaderAuthenticationFilter::default();
        assert!(filter
            .authenticate(&headers(Some("not-a-uuid"), Some("ADMIN")))
            .is_none());
    }

    #[test]
    fn non_text_values_yield_nothing() {
        let filter = HeaderAuthenticationFilter::default();

        let mut bad_id = HeaderMap::new();
        bad_id.insert(USER_ID_HEADER, HeaderValue::from_bytes(&[0xc3, 0xa9]).unwrap());
        bad_id.insert(USER_ROLE_HEADER, HeaderValue::from_static("ADMIN"));
        assert!(filter.authenticate(&bad_id).is_none());

        let mut bad_role = headers(Some(ID), None);
        bad_role.insert(USER_ROLE_HEADER, HeaderValue::from_bytes(&[0xc3, 0xa9]).unwrap());
        assert!(filter.authenticate(&bad_role).is_none());
    }

    #[test]
    fn role_is_passed_through_untouched() {
        let filter = HeaderAuthenticationFilter::default();
        let auth = filter
            .authenticate(&headers(Some(ID), Some("ROLE_ADMIN")))
            .unwrap();

        let principal = auth.resolve_principal().unwrap();
        assert_eq!(principal.role(), "ROLE_ADMIN");
        assert_eq!(principal.authority(), "ROLE_ROLE_ADMIN");
    }

    #[test]
    fn disabled_filter_ignores_headers() {
        let filter = HeaderAuthenticationFilter::new(HeaderAuthConfig::disabled());
        assert!(filter.authenticate(&headers(Some(ID), Some("ADMIN"))).is_none());
    }

    #[test]
    fn custom_header_names_are_honored() {
        let config = HeaderAuthConfig::default()
            .with_user_id_header(HeaderName::from_static("x-member-id"))
            .with_user_role_header(HeaderName::from_static("x-member-role"));
        let filter = HeaderAuthenticationFilter::new(config);

        let mut map = HeaderMap::new();
        map.insert("x-member-id", HeaderValue::from_static(ID));
        map.insert("x-member-role", HeaderValue::from_static("MEMBER"));

        assert!(filter.authenticate(&headers(Some(ID), Some("ADMIN"))).is_none());
        assert_eq!(
            filter.authenticate(&map).unwrap().resolve_principal().unwrap().role(),
            "MEMBER"
        );
    }

    #[test]
    fn apply_leaves_context_untouched_on_failure() {
        let filter = HeaderAuthenticationFilter::default();
        let existing = UserPrincipal::new(Uuid::nil(), "SYSTEM");
        let ctx = SecurityContext::with_authentication(Authentication::from_principal(
            existing.clone(),
        ));

        assert!(!filter.apply(&headers(Some("nope"), Some("ADMIN")), &ctx));
        assert_eq!(ctx.current_principal(), Some(existing));
    }

    #[test]
    fn apply_to_current_requires_scope() {
        let filter = HeaderAuthenticationFilter::default();
        let map = headers(Some(ID), Some("USER"));

        assert!(!filter.apply_to_current(&map));

        let role = context::sync_scope(SecurityContext::new(), || {
            assert!(filter.apply_to_current(&map));
            context::with_current(SecurityContext::current_user_role)
        });
        assert_eq!(role, Some(Ok("USER".to_string())));
    }
}
