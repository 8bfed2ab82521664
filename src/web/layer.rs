//! Tower layer that installs the security context for each request.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use http::Request;
use tower::{Layer, Service};
use tracing::{debug, trace};

use crate::config::HeaderAuthConfig;
use crate::context::{self, SecurityContext};
use crate::filter::HeaderAuthenticationFilter;

/// Tower layer running the header filter ahead of the wrapped service.
///
/// Place it outermost among authentication-dependent layers so everything
/// inside sees the installed context.
///
/// # Examples
///
/// ```
/// # async fn example() {
/// use gateway_auth::web::HeaderAuthLayer;
/// use http::{Request, Response};
/// use std::convert::Infallible;
/// use tower::{service_fn, Layer, ServiceExt};
///
/// let svc = HeaderAuthLayer::default().layer(service_fn(|_req: Request<()>| async {
///     Ok::<_, Infallible>(Response::new(gateway_auth::current_user_id_as_string()))
/// }));
///
/// let request = Request::builder()
///     .header("X-User-Id", "3fa85f64-5717-4562-b3fc-2c963f66afa6")
///     .header("X-User-Role", "USER")
///     .body(())
///     .unwrap();
///
/// let response = svc.oneshot(request).await.unwrap();
/// assert_eq!(response.body(), "3fa85f64-5717-4562-b3fc-2c963f66afa6");
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct HeaderAuthLayer {
    filter: Arc<HeaderAuthenticationFilter>,
}

impl HeaderAuthLayer {
    /// Creates a layer with the given configuration.
    pub fn new(config: HeaderAuthConfig) -> Self {
        if config.is_enabled() {
            debug!(
                user_id_header = %config.user_id_header(),
                user_role_header = %config.user_role_header(),
                "gateway header authentication enabled"
            );
        } else {
            debug!("gateway header authentication disabled");
        }
        Self {
            filter: Arc::new(HeaderAuthenticationFilter::new(config)),
        }
    }

    /// Returns the filter applied to each request.
    pub fn filter(&self) -> &HeaderAuthenticationFilter {
        &self.filter
    }
}

impl<S> Layer<S> for HeaderAuthLayer {
    type Service = HeaderAuthService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        HeaderAuthService {
            inner,
            filter: Arc::clone(&self.filter),
        }
    }
}

/// Marks a request the header filter has already run for.
#[derive(Debug, Clone, Copy)]
struct HeaderAuthApplied;

/// Service produced by [`HeaderAuthLayer`].
///
/// Every call gets a fresh [`SecurityContext`], whatever context the caller
/// is running in. The filter fills it from the request headers, and the inner
/// service runs inside its scope. The context is dropped once the response
/// future completes.
///
/// The request is tagged through its extensions, so a second
/// `HeaderAuthService` wrapping the same request leaves the first one's
/// context in place.
#[derive(Debug, Clone)]
pub struct HeaderAuthService<S> {
    inner: S,
    filter: Arc<HeaderAuthenticationFilter>,
}

impl<S, B> Service<Request<B>> for HeaderAuthService<S>
where
    S: Service<Request<B>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    B: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<S::Response, S::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<B>) -> Self::Future {
        // The clone is not ready; keep the one that was polled for this call.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        if req.extensions().get::<HeaderAuthApplied>().is_some() {
            trace!("header filter already applied to this request");
            return Box::pin(async move { inner.call(req).await });
        }
        req.extensions_mut().insert(HeaderAuthApplied);

        let ctx = SecurityContext::new();
        self.filter.apply(&req, &ctx);

        Box::pin(context::scope(ctx, async move { inner.call(req).await }))
    }
}
