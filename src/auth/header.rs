//! Authorization header injection with a lazily refreshed, shared bearer token.
//!
//! [`AuthHeaderBuilder`] keeps at most one [`AccessToken`] behind an async mutex. Callers
//! that find the cache empty or stale fetch a new token from `{auth_url}/oauth/token` while
//! holding the lock, so concurrent requests never stampede the token endpoint. The lock
//! is released as soon as the header has been written; the request itself runs unguarded.

// crates.io
use base64::{Engine as _, engine::general_purpose::STANDARD};
use reqwest::header::{AUTHORIZATION, HeaderValue};
// self
use crate::{
	_prelude::*,
	auth::{AccessToken, Credentials, TokenSecret},
	error::{AuthenticationError, ConfigError},
	http::{HttpRequest, HttpTransport, ReqwestTransport, RetryingTransport},
	obs::{self, OperationKind},
};

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Boxed future returned by [`AuthHeaderProvider::add_auth_header`].
pub type AuthFuture<'a> = Pin<Box<dyn Future<Output = Result<()>> + 'a + Send>>;

/// Writes an `Authorization` header onto outbound requests.
pub trait AuthHeaderProvider
where
	Self: Send + Sync,
{
	/// Sets the `Authorization` header of `request`, refreshing credentials if needed.
	fn add_auth_header<'a>(&'a self, request: &'a mut HttpRequest) -> AuthFuture<'a>;
}

#[derive(Deserialize)]
struct TokenGrant {
	#[serde(default)]
	access_token: String,
	#[serde(default)]
	expires_in: i64,
}

/// Default [`AuthHeaderProvider`] backed by static basic credentials or a UAA token grant.
pub struct AuthHeaderBuilder<T = ReqwestTransport>
where
	T: ?Sized + HttpTransport,
{
	credentials: Credentials,
	transport: RetryingTransport<T>,
	cache: AsyncMutex<Option<AccessToken>>,
}
impl<T> AuthHeaderBuilder<T>
where
	T: ?Sized + HttpTransport,
{
	/// Creates a provider with an empty token cache.
	pub fn new(credentials: Credentials, transport: RetryingTransport<T>) -> Self {
		Self { credentials, transport, cache: AsyncMutex::new(None) }
	}

	/// Returns the configured credentials.
	pub fn credentials(&self) -> &Credentials {
		&self.credentials
	}

	/// Drops the cached token so the next request fetches a fresh one.
	pub async fn invalidate(&self) {
		self.cache.lock().await.take();
	}

	async fn authorization_value(&self) -> Result<HeaderValue> {
		let value = match &self.credentials {
			Credentials::Basic { username, password } => {
				let encoded = STANDARD.encode(format!("{username}:{}", password.expose()));

				format!("Basic {encoded}")
			},
			_ => {
				let mut cache = self.cache.lock().await;
				let now = OffsetDateTime::now_utc();
				let cached = cache
					.as_ref()
					.filter(|token| token.is_usable_at(now))
					.map(|token| token.secret.clone());
				let token = match cached {
					Some(secret) => secret,
					None => {
						tracing::debug!("Token cache is cold or stale, refreshing.");

						let token = self.obtain_token().await?;
						let secret = token.secret.clone();

						*cache = Some(token);

						secret
					},
				};

				format!("Bearer {}", token.expose())
			},
		};
		let mut header = HeaderValue::from_str(&value)
			.map_err(|_| ConfigError::InvalidHeader { name: "authorization" })?;

		header.set_sensitive(true);

		Ok(header)
	}

	async fn obtain_token(&self) -> Result<AccessToken> {
		obs::observe(OperationKind::ObtainToken, "obtain_token", async {
			let (Some(auth_url), Some((client_id, client_secret)), Some(form)) = (
				self.credentials.auth_url(),
				self.credentials.client_auth(),
				self.credentials.token_form(),
			) else {
				return Err(ConfigError::Invalid(
					"Credentials do not use a token endpoint.".into(),
				)
				.into());
			};
			let endpoint = ConfigError::parse_url(&format!(
				"{}/oauth/token",
				auth_url.as_str().trim_end_matches('/')
			))?;
			let client_auth = STANDARD.encode(format!("{client_id}:{}", client_secret.expose()));
			let mut request = HttpRequest::new(Method::POST, endpoint).with_body(FORM_CONTENT_TYPE, form);
			let mut header = HeaderValue::from_str(&format!("Basic {client_auth}"))
				.map_err(|_| ConfigError::InvalidHeader { name: "authorization" })?;

			header.set_sensitive(true);
			request.set_header(AUTHORIZATION, header);

			let issued_at = OffsetDateTime::now_utc();
			let response = self
				.transport
				.execute(request)
				.await
				.map_err(|source| AuthenticationError::Unreachable { source })?;

			if response.status != StatusCode::OK {
				let body = response.text().trim_end_matches(['\r', '\n']).to_owned();

				tracing::warn!(status = response.status.as_u16(), "Token endpoint rejected the request.");

				return Err(AuthenticationError::Rejected { status: response.status.as_u16(), body }
					.into());
			}

			let mut deserializer = serde_json::Deserializer::from_slice(&response.body);
			let grant: TokenGrant = serde_path_to_error::deserialize(&mut deserializer)
				.map_err(|source| AuthenticationError::GrantParse { source })?;

			if grant.access_token.is_empty() {
				return Err(AuthenticationError::MalformedGrant { expires_in: grant.expires_in }.into());
			}

			tracing::info!(expires_in = grant.expires_in, "Obtained UAA access token.");

			Ok(AccessToken::issued(
				TokenSecret::new(grant.access_token),
				issued_at,
				Duration::seconds(grant.expires_in),
			))
		})
		.await
	}
}
impl<T> AuthHeaderProvider for AuthHeaderBuilder<T>
where
	T: ?Sized + HttpTransport,
{
	fn add_auth_header<'a>(&'a self, request: &'a mut HttpRequest) -> AuthFuture<'a> {
		Box::pin(async move {
			let header = self.authorization_value().await?;

			request.set_header(AUTHORIZATION, header);

			Ok(())
		})
	}
}
impl<T> Debug for AuthHeaderBuilder<T>
where
	T: ?Sized + HttpTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AuthHeaderBuilder").field("credentials", &self.credentials).finish()
	}
}
