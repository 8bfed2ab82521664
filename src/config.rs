//! Configuration for the header authentication filter.

use http::HeaderName;

use crate::headers::{USER_ID_HEADER, USER_ROLE_HEADER};

/// Settings for [`HeaderAuthenticationFilter`](crate::HeaderAuthenticationFilter).
///
/// The defaults read `X-User-Id` and `X-User-Role`, which is what the gateway
/// sends. Overriding the names is only useful when a gateway has been set up
/// with a different contract.
///
/// # Examples
///
/// ```
/// use gateway_auth::HeaderAuthConfig;
/// use http::HeaderName;
///
/// let config = HeaderAuthConfig::default()
///     .with_user_role_header(HeaderName::from_static("x-forwarded-role"));
///
/// assert_eq!(config.user_id_header().as_str(), "x-user-id");
/// assert_eq!(config.user_role_header().as_str(), "x-forwarded-role");
/// assert!(config.is_enabled());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderAuthConfig {
    user_id_header: HeaderName,
    user_role_header: HeaderName,
    enabled: bool,
}

impl Default for HeaderAuthConfig {
    fn default() -> Self {
        Self {
            user_id_header: USER_ID_HEADER,
            user_role_header: USER_ROLE_HEADER,
            enabled: true,
        }
    }
}

impl HeaderAuthConfig {
    /// Returns a configuration that never reads identity headers.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Sets the header carrying the user id.
    pub fn with_user_id_header(mut self, name: HeaderName) -> Self {
        self.user_id_header = name;
        self
    }

    /// Sets the header carrying the role.
    pub fn with_user_role_header(mut self, name: HeaderName) -> Self {
        self.user_role_header = name;
        self
    }

    /// Turns header extraction on or off.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Returns the header carrying the user id.
    pub fn user_id_header(&self) -> &HeaderName {
        &self.user_id_header
    }

    /// Returns the header carrying the role.
    pub fn user_role_header(&self) -> &HeaderName {
        &self.user_role_header
    }

    /// Returns whether header extraction is on.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_reads_gateway_headers() {
        let config = HeaderAuthConfig::default();

        assert_eq!(config.user_id_header(), &USER_ID_HEADER);
        assert_eq!(config.user_role_header(), &USER_ROLE_HEADER);
        assert!(config.is_enabled());
    }

    #[test]
    fn disabled_keeps_header_names() {
        let config = HeaderAuthConfig::disabled();

        assert!(!config.is_enabled());
        assert_eq!(config.user_id_header(), &USER_ID_HEADER);
        assert_eq!(config.with_enabled(true), HeaderAuthConfig::default());
    }
}
