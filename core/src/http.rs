use crate::Result;
use bytes::Bytes;
use std::fmt::Debug;
use std::time::Duration;

/// HttpSend is used to send http requests to AWS endpoints and to the
/// instance metadata service.
///
/// - `Ok(resp)` is returned for every response the server produced,
///   including non-2xx statuses.
/// - `Err(e)` with [`ErrorKind::Transport`](crate::ErrorKind::Transport) means
///   no response was obtained at all.
#[async_trait::async_trait]
pub trait HttpSend: Debug + Send + Sync + 'static {
    /// Send http request and return the response.
    async fn http_send(&self, req: http::Request<Bytes>) -> Result<http::Response<Bytes>>;
}

/// Timeout for a single request, carried in the request extensions.
///
/// ```
/// use awsfetch_core::Timeout;
/// use std::time::Duration;
///
/// let mut req = http::Request::new(bytes::Bytes::new());
/// req.extensions_mut().insert(Timeout(Duration::from_millis(250)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeout(pub Duration);

impl Timeout {
    /// Read the timeout attached to a request, if any.
    pub fn from_request<T>(req: &http::Request<T>) -> Option<Duration> {
        req.extensions().get::<Timeout>().map(|t| t.0)
    }
}
