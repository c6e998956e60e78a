//! Immediate-retry wrapper applied to every outbound request.
//!
//! A request is attempted `1 + max_retries` times and the first attempt that produces an
//! HTTP response wins, regardless of its status. There is no backoff and no distinction
//! between idempotent and non-idempotent methods.

// self
use crate::{
	_prelude::*,
	error::{ConfigError, TransportError},
	http::{HttpRequest, HttpResponse, HttpTransport, ReqwestTransport, TransportConfig},
};

/// Transport decorator that replays requests after connection-level failures.
#[derive(Debug)]
pub struct RetryingTransport<T = ReqwestTransport>
where
	T: ?Sized + HttpTransport,
{
	inner: Arc<T>,
	max_retries: u32,
}
impl<T> RetryingTransport<T>
where
	T: ?Sized + HttpTransport,
{
	/// Wraps `inner`, allowing `max_retries` extra attempts per request.
	pub fn new(inner: impl Into<Arc<T>>, max_retries: u32) -> Self {
		Self { inner: inner.into(), max_retries }
	}

	/// Returns the configured retry budget.
	pub fn max_retries(&self) -> u32 {
		self.max_retries
	}

	/// Sends `request`, retrying immediately while the transport reports errors.
	pub async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
		let attempts = self.max_retries.saturating_add(1);
		let mut attempt = 1;

		loop {
			match self.inner.execute(request.clone()).await {
				Ok(response) => return Ok(response),
				Err(e) if attempt < attempts => {
					tracing::warn!(
						method = %request.method,
						url = %request.url,
						attempt,
						error = %e,
						"Request failed, retrying."
					);

					attempt += 1;
				},
				Err(e) => return Err(TransportError::network(attempt, e)),
			}
		}
	}

	/// Issues a GET for `url`.
	pub async fn get(&self, url: Url) -> Result<HttpResponse, TransportError> {
		self.execute(HttpRequest::new(Method::GET, url)).await
	}

	/// Issues a HEAD for `url`.
	pub async fn head(&self, url: Url) -> Result<HttpResponse, TransportError> {
		self.execute(HttpRequest::new(Method::HEAD, url)).await
	}

	/// Issues a POST for `url` with `body` tagged as `content_type`.
	pub async fn post(
		&self,
		url: Url,
		content_type: &'static str,
		body: impl Into<Vec<u8>>,
	) -> Result<HttpResponse, TransportError> {
		self.execute(HttpRequest::new(Method::POST, url).with_body(content_type, body)).await
	}
}
impl RetryingTransport<ReqwestTransport> {
	/// Builds a reqwest-backed transport from `config`.
	pub fn from_config(config: &TransportConfig) -> Result<Self, ConfigError> {
		Ok(Self::new(ReqwestTransport::from_config(config)?, config.max_retries))
	}
}
impl<T> Clone for RetryingTransport<T>
where
	T: ?Sized + HttpTransport,
{
	fn clone(&self) -> Self {
		Self { inner: Arc::clone(&self.inner), max_retries: self.max_retries }
	}
}
