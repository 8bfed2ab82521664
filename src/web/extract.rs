//! Header lookup boundary between HTTP types and the filter.

use std::collections::HashMap;

use http::request::Parts;
use http::{HeaderMap, HeaderName, HeaderValue, Request};

/// The first value of a header: its text, or the raw bytes when the value is
/// not visible ASCII.
pub type HeaderText<'a> = Result<&'a str, &'a [u8]>;

/// Read access to the identity headers of a request.
///
/// The filter only needs the first value of a header by name. Implementations
/// exist for the `http` crate's request types and for a plain `HashMap`, which
/// covers frameworks that hand over headers as owned strings.
///
/// # Examples
///
/// ```
/// use gateway_auth::web::IdentityHeaders;
/// use gateway_auth::headers::USER_ROLE_HEADER;
/// use std::collections::HashMap;
///
/// let mut headers = HashMap::new();
/// headers.insert("x-user-role".to_string(), "ADMIN".to_string());
///
/// assert_eq!(headers.header_text(&USER_ROLE_HEADER), Some(Ok("ADMIN")));
/// ```
pub trait IdentityHeaders {
    /// Returns the first value of `name`, or `None` if the header is absent.
    fn header_text(&self, name: &HeaderName) -> Option<HeaderText<'_>>;
}

fn value_text(value: &HeaderValue) -> HeaderText<'_> {
    value.to_str().map_err(|_| value.as_bytes())
}

impl IdentityHeaders for HeaderMap {
    fn header_text(&self, name: &HeaderName) -> Option<HeaderText<'_>> {
        self.get(name).map(value_text)
    }
}

impl<B> IdentityHeaders for Request<B> {
    fn header_text(&self, name: &HeaderName) -> Option<HeaderText<'_>> {
        self.headers().header_text(name)
    }
}

impl IdentityHeaders for Parts {
    fn header_text(&self, name: &HeaderName) -> Option<HeaderText<'_>> {
        self.headers.header_text(name)
    }
}

/// Keys are matched case-insensitively, as HTTP header names are.
///
/// When several keys differ only in case, the lower-case key wins, then the
/// smallest key in byte order.
impl IdentityHeaders for HashMap<String, String> {
    fn header_text(&self, name: &HeaderName) -> Option<HeaderText<'_>> {
        let value = self.get(name.as_str()).or_else(|| {
            self.iter()
                .filter(|(key, _)| key.eq_ignore_ascii_case(name.as_str()))
                .min_by(|(a, _), (b, _)| a.cmp(b))
                .map(|(_, value)| value)
        })?;

        match HeaderValue::from_str(value) {
            Ok(parsed) if parsed.to_str().is_ok() => Some(Ok(value.as_str())),
            _ => Some(Err(value.as_bytes())),
        }
    }
}
