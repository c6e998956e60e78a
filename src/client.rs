//! JSON resource client shared by every control-plane operation.
//!
//! [`JsonClient`] resolves paths against the API base URL, asks the configured
//! [`AuthHeaderProvider`] for an `Authorization` header, and sends the request through a
//! [`RetryingTransport`]. `get` decodes 200 responses and maps the error statuses the API
//! documents onto [`Error`] variants; `post`/`put` hand the raw response back so each
//! operation can enforce its own success status; `delete` is idempotent.

// self
use crate::{
	_prelude::*,
	auth::AuthHeaderProvider,
	error::ConfigError,
	http::{HttpRequest, HttpResponse, HttpTransport, ReqwestTransport, RetryingTransport},
};

const JSON_CONTENT_TYPE: &str = "application/json";

#[derive(Deserialize)]
struct ErrorBody {
	#[serde(default)]
	description: String,
}

/// Authenticated JSON client bound to a control-plane base URL.
pub struct JsonClient<T = ReqwestTransport>
where
	T: ?Sized + HttpTransport,
{
	base_url: Url,
	transport: RetryingTransport<T>,
	auth: Arc<dyn AuthHeaderProvider>,
}
impl<T> JsonClient<T>
where
	T: ?Sized + HttpTransport,
{
	/// Creates a client for `base_url`.
	pub fn new(
		base_url: Url,
		auth: Arc<dyn AuthHeaderProvider>,
		transport: RetryingTransport<T>,
	) -> Self {
		Self { base_url, transport, auth }
	}

	/// Returns the API base URL.
	pub fn base_url(&self) -> &Url {
		&self.base_url
	}

	/// Resolves `path` (which may carry a query string) against the base URL.
	///
	/// Paths are appended verbatim, so cursors returned by the API such as
	/// `/v2/services?page=2&results-per-page=100` keep their query intact.
	pub fn url(&self, path: &str) -> Result<Url> {
		let base = self.base_url.as_str().trim_end_matches('/');

		Ok(ConfigError::parse_url(&format!("{base}{path}"))?)
	}

	/// GETs `path` and decodes the 200 body as `R`.
	pub async fn get<R>(&self, path: &str) -> Result<R>
	where
		R: DeserializeOwned,
	{
		let response = self.send(Method::GET, path, None).await?;

		read_response(response)
	}

	/// POSTs `body` as JSON and returns the raw response.
	pub async fn post<B>(&self, path: &str, body: &B) -> Result<HttpResponse>
	where
		B: ?Sized + Serialize,
	{
		let body = serde_json::to_vec(body).map_err(ConfigError::from)?;

		self.send(Method::POST, path, Some(body)).await
	}

	/// PUTs `body` as JSON and returns the raw response.
	pub async fn put<B>(&self, path: &str, body: &B) -> Result<HttpResponse>
	where
		B: ?Sized + Serialize,
	{
		let body = serde_json::to_vec(body).map_err(ConfigError::from)?;

		self.send(Method::PUT, path, Some(body)).await
	}

	/// DELETEs `path`; 204, 202, and 404 all count as success.
	pub async fn delete(&self, path: &str) -> Result<()> {
		let response = self.send(Method::DELETE, path, None).await?;

		match response.status {
			StatusCode::NO_CONTENT | StatusCode::ACCEPTED | StatusCode::NOT_FOUND => Ok(()),
			status => Err(Error::UnexpectedStatus { status: status.as_u16(), body: response.text() }),
		}
	}

	async fn send(&self, method: Method, path: &str, body: Option<Vec<u8>>) -> Result<HttpResponse> {
		let url = self.url(path)?;
		let mut request = HttpRequest::new(method, url);

		if let Some(body) = body {
			request = request.with_body(JSON_CONTENT_TYPE, body);
		}

		self.auth.add_auth_header(&mut request).await?;

		tracing::debug!(method = %request.method, url = %request.url, "Sending control-plane request.");

		Ok(self.transport.execute(request).await?)
	}
}
impl<T> Debug for JsonClient<T>
where
	T: ?Sized + HttpTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("JsonClient")
			.field("base_url", &self.base_url.as_str())
			.field("max_retries", &self.transport.max_retries())
			.finish()
	}
}

/// Interprets a GET response: decodes 200 bodies and maps error statuses.
pub fn read_response<R>(response: HttpResponse) -> Result<R>
where
	R: DeserializeOwned,
{
	match response.status {
		StatusCode::OK => {
			if response.body == b"{}" {
				return Err(Error::InvalidResponse { message: "Empty response body".into() });
			}

			serde_json::from_slice(&response.body).map_err(|e| Error::InvalidResponse {
				message: format!("Invalid response body: {e}"),
			})
		},
		StatusCode::NOT_FOUND => Err(Error::ResourceNotFound { message: error_message(&response) }),
		StatusCode::UNAUTHORIZED => Err(Error::Unauthorized { message: error_message(&response) }),
		StatusCode::FORBIDDEN => Err(Error::Forbidden { message: error_message(&response) }),
		status => Err(Error::UnexpectedStatus { status: status.as_u16(), body: response.text() }),
	}
}

/// Extracts the API's `description` field, falling back to the raw body.
pub fn error_message(response: &HttpResponse) -> String {
	match serde_json::from_slice::<ErrorBody>(&response.body) {
		Ok(body) => body.description,
		Err(_) => response.text(),
	}
}
