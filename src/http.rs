//! Transport primitives for control-plane and token-endpoint calls.
//!
//! The module exposes [`HttpTransport`], the crate's only dependency on an HTTP stack,
//! alongside owned [`HttpRequest`]/[`HttpResponse`] values so a request can be replayed
//! verbatim by [`RetryingTransport`]. [`ReqwestTransport`] is the default implementation;
//! tests and embedders can plug in their own.

mod retry;

pub use retry::*;

// std
use std::time::Duration as StdDuration;
// crates.io
use reqwest::{
	Certificate,
	header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue},
	redirect::Policy,
};
// self
use crate::{_prelude::*, error::ConfigError};

/// Boxed future returned by [`HttpTransport::execute`].
pub type TransportFuture<'a, E> =
	Pin<Box<dyn Future<Output = Result<HttpResponse, E>> + 'a + Send>>;

/// Abstraction over HTTP stacks able to send a single request.
///
/// Implementations report connection-level failures through `Err`. Any HTTP response,
/// whatever its status, is an `Ok` value: status interpretation belongs to the callers.
pub trait HttpTransport
where
	Self: 'static + Send + Sync,
{
	/// Concrete error emitted by the underlying stack.
	type TransportError: 'static + Send + Sync + StdError;

	/// Sends `request` once.
	fn execute(&self, request: HttpRequest) -> TransportFuture<'_, Self::TransportError>;
}

/// Owned, replayable HTTP request.
#[derive(Clone, Debug)]
pub struct HttpRequest {
	/// HTTP method.
	pub method: Method,
	/// Absolute request URL.
	pub url: Url,
	/// Request headers.
	pub headers: HeaderMap,
	/// Request body; empty for body-less methods.
	pub body: Vec<u8>,
}
impl HttpRequest {
	/// Creates a body-less request.
	pub fn new(method: Method, url: Url) -> Self {
		Self { method, url, headers: HeaderMap::new(), body: Vec::new() }
	}

	/// Attaches a body together with its content type.
	pub fn with_body(mut self, content_type: &'static str, body: impl Into<Vec<u8>>) -> Self {
		self.headers.insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
		self.body = body.into();

		self
	}

	/// Replaces a header value.
	pub fn set_header(&mut self, name: HeaderName, value: HeaderValue) {
		self.headers.insert(name, value);
	}
}

/// Fully buffered HTTP response.
#[derive(Clone, Debug)]
pub struct HttpResponse {
	/// HTTP status code.
	pub status: StatusCode,
	/// Response headers.
	pub headers: HeaderMap,
	/// Raw response body.
	pub body: Vec<u8>,
}
impl HttpResponse {
	/// Creates a response without headers.
	pub fn new(status: StatusCode, body: impl Into<Vec<u8>>) -> Self {
		Self { status, headers: HeaderMap::new(), body: body.into() }
	}

	/// Returns the body as UTF-8, replacing invalid sequences.
	pub fn text(&self) -> String {
		String::from_utf8_lossy(&self.body).into_owned()
	}
}

/// Settings applied when building a transport.
#[derive(Clone, Debug)]
pub struct TransportConfig {
	/// Additional attempts after the first one when the transport fails.
	pub max_retries: u32,
	/// Per-request timeout.
	pub timeout: StdDuration,
	/// Skips TLS certificate verification when `true`.
	pub disable_tls_verification: bool,
	/// Extra PEM-encoded root certificates to trust.
	pub trusted_roots_pem: Option<Vec<u8>>,
	/// Follows redirects when `true`; otherwise redirect responses are returned as-is.
	pub follow_redirects: bool,
}
impl TransportConfig {
	const DEFAULT_TIMEOUT: StdDuration = StdDuration::from_secs(30);

	/// Overrides the retry budget.
	pub fn with_max_retries(mut self, max_retries: u32) -> Self {
		self.max_retries = max_retries;

		self
	}

	/// Overrides the per-request timeout.
	pub fn with_timeout(mut self, timeout: StdDuration) -> Self {
		self.timeout = timeout;

		self
	}

	/// Toggles TLS certificate verification.
	pub fn with_tls_verification_disabled(mut self, disabled: bool) -> Self {
		self.disable_tls_verification = disabled;

		self
	}

	/// Trusts the certificates in `pem` in addition to the built-in roots.
	pub fn with_trusted_roots_pem(mut self, pem: impl Into<Vec<u8>>) -> Self {
		let pem = pem.into();

		self.trusted_roots_pem =
			if pem.iter().all(u8::is_ascii_whitespace) { None } else { Some(pem) };

		self
	}

	/// Stops the transport from following redirects.
	pub fn without_redirects(mut self) -> Self {
		self.follow_redirects = false;

		self
	}
}
impl Default for TransportConfig {
	fn default() -> Self {
		Self {
			max_retries: 0,
			timeout: Self::DEFAULT_TIMEOUT,
			disable_tls_verification: false,
			trusted_roots_pem: None,
			follow_redirects: true,
		}
	}
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransport(pub ReqwestClient);
impl ReqwestTransport {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}

	/// Builds a client honoring the TLS, timeout, and redirect settings of `config`.
	pub fn from_config(config: &TransportConfig) -> Result<Self, ConfigError> {
		let redirect = if config.follow_redirects { Policy::default() } else { Policy::none() };
		let mut builder = ReqwestClient::builder()
			.timeout(config.timeout)
			.redirect(redirect)
			.danger_accept_invalid_certs(config.disable_tls_verification);

		if let Some(pem) = config.trusted_roots_pem.as_deref() {
			for cert in Certificate::from_pem_bundle(pem)
				.map_err(|source| ConfigError::InvalidTrustedCert { source })?
			{
				builder = builder.add_root_certificate(cert);
			}
		}

		builder.build().map(Self).map_err(ConfigError::http_client_build)
	}

	async fn send(client: ReqwestClient, request: HttpRequest) -> Result<HttpResponse, ReqwestError> {
		let HttpRequest { method, url, headers, body } = request;
		let mut builder = client.request(method, url).headers(headers);

		if !body.is_empty() {
			builder = builder.body(body);
		}

		let response = builder.send().await?;
		let status = response.status();
		let headers = response.headers().to_owned();
		let body = response.bytes().await?.to_vec();

		Ok(HttpResponse { status, headers, body })
	}
}
impl HttpTransport for ReqwestTransport {
	type TransportError = ReqwestError;

	fn execute(&self, request: HttpRequest) -> TransportFuture<'_, Self::TransportError> {
		let client = self.0.clone();

		Box::pin(Self::send(client, request))
	}
}
