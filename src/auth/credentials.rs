//! Credential variants accepted by the header provider.

// crates.io
use url::form_urlencoded::Serializer;
// self
use crate::{_prelude::*, auth::TokenSecret};

/// Client identifier used by the CF CLI; user-credential logins reuse it with an empty
/// secret when no dedicated client is configured.
pub const CF_CLI_CLIENT_ID: &str = "cf";

/// Material used to authenticate outbound requests.
#[derive(Clone)]
pub enum Credentials {
	/// Static username/password sent as HTTP basic auth on every request.
	Basic {
		/// Basic-auth username.
		username: String,
		/// Basic-auth password.
		password: TokenSecret,
	},
	/// OAuth2 `client_credentials` grant against a UAA server.
	ClientCredentials {
		/// OAuth2 client identifier.
		client_id: String,
		/// OAuth2 client secret.
		client_secret: TokenSecret,
		/// UAA base URL; the token endpoint is `{auth_url}/oauth/token`.
		auth_url: Url,
	},
	/// OAuth2 `password` grant against a UAA server.
	UserCredentials {
		/// OAuth2 client identifier.
		client_id: String,
		/// OAuth2 client secret, usually empty.
		client_secret: TokenSecret,
		/// Resource-owner username.
		username: String,
		/// Resource-owner password.
		password: TokenSecret,
		/// UAA base URL; the token endpoint is `{auth_url}/oauth/token`.
		auth_url: Url,
	},
}
impl Credentials {
	/// Builds password-grant credentials using the CF CLI client.
	pub fn cf_user(
		username: impl Into<String>,
		password: impl Into<TokenSecret>,
		auth_url: Url,
	) -> Self {
		Self::UserCredentials {
			client_id: CF_CLI_CLIENT_ID.into(),
			client_secret: TokenSecret::new(""),
			username: username.into(),
			password: password.into(),
			auth_url,
		}
	}

	/// Returns `true` when requests carry a UAA bearer token.
	pub fn uses_token_endpoint(&self) -> bool {
		!matches!(self, Self::Basic { .. })
	}

	/// Returns the UAA base URL, if any.
	pub fn auth_url(&self) -> Option<&Url> {
		match self {
			Self::Basic { .. } => None,
			Self::ClientCredentials { auth_url, .. } | Self::UserCredentials { auth_url, .. } =>
				Some(auth_url),
		}
	}

	/// Returns the client identifier and secret used to authenticate at the token endpoint.
	pub(crate) fn client_auth(&self) -> Option<(&str, &TokenSecret)> {
		match self {
			Self::Basic { .. } => None,
			Self::ClientCredentials { client_id, client_secret, .. }
			| Self::UserCredentials { client_id, client_secret, .. } =>
				Some((client_id, client_secret)),
		}
	}

	/// Encodes the `application/x-www-form-urlencoded` token request body.
	pub(crate) fn token_form(&self) -> Option<String> {
		let mut form = Serializer::new(String::new());

		match self {
			Self::Basic { .. } => return None,
			Self::ClientCredentials { .. } => {
				form.append_pair("grant_type", "client_credentials");
			},
			Self::UserCredentials { username, password, .. } => {
				form.append_pair("grant_type", "password")
					.append_pair("username", username)
					.append_pair("password", password.expose());
			},
		}

		Some(form.finish())
	}
}
impl Debug for Credentials {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match self {
			Self::Basic { username, .. } => f
				.debug_struct("Basic")
				.field("username", username)
				.field("password", &"<redacted>")
				.finish(),
			Self::ClientCredentials { client_id, auth_url, .. } => f
				.debug_struct("ClientCredentials")
				.field("client_id", client_id)
				.field("client_secret", &"<redacted>")
				.field("auth_url", &auth_url.as_str())
				.finish(),
			Self::UserCredentials { client_id, username, auth_url, .. } => f
				.debug_struct("UserCredentials")
				.field("client_id", client_id)
				.field("client_secret", &"<redacted>")
				.field("username", username)
				.field("password", &"<redacted>")
				.field("auth_url", &auth_url.as_str())
				.finish(),
		}
	}
}
