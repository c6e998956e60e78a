//! Serde-deserializable configuration for the control-plane client and the external
//! service instances API.
//!
//! Every section deserializes with defaults so partially filled documents load; call
//! `validate` before building clients. Validation errors name the offending field with
//! a dotted path such as `uaa.client_credentials.client_id can't be empty`.

// self
use crate::{
	_prelude::*,
	auth::{AuthHeaderBuilder, Credentials, TokenSecret},
	cf::CfClient,
	error::ConfigError,
	http::{RetryingTransport, TransportConfig},
};

const CANT_BE_EMPTY: &str = "can't be empty";

/// Username/password pair used for basic auth or the UAA password grant.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserCredentialsConfig {
	/// Username.
	pub username: String,
	/// Password.
	pub password: TokenSecret,
}
impl UserCredentialsConfig {
	/// Returns `true` when any field is filled in.
	pub fn is_set(&self) -> bool {
		!self.username.is_empty() || !self.password.is_empty()
	}

	/// Requires both fields.
	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.username.is_empty() {
			return Err(ConfigError::field("username", CANT_BE_EMPTY));
		}
		if self.password.is_empty() {
			return Err(ConfigError::field("password", CANT_BE_EMPTY));
		}

		Ok(())
	}
}

/// OAuth2 client identifier and secret.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientCredentialsConfig {
	/// Client identifier.
	pub client_id: String,
	/// Client secret.
	pub client_secret: TokenSecret,
}
impl ClientCredentialsConfig {
	/// Returns `true` when any field is filled in.
	pub fn is_set(&self) -> bool {
		!self.client_id.is_empty() || !self.client_secret.is_empty()
	}

	/// Requires both fields.
	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.client_id.is_empty() {
			return Err(ConfigError::field("client_id", CANT_BE_EMPTY));
		}
		if self.client_secret.is_empty() {
			return Err(ConfigError::field("client_secret", CANT_BE_EMPTY));
		}

		Ok(())
	}
}

/// Credential pair of a UAA section; exactly one side must be set.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UaaCredentialsConfig {
	/// Client-credentials grant.
	pub client_credentials: ClientCredentialsConfig,
	/// Password grant.
	pub user_credentials: UserCredentialsConfig,
}

/// UAA server used by the control-plane client.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UaaConfig {
	/// UAA base URL.
	pub url: String,
	/// Credentials presented to the UAA.
	pub authentication: UaaCredentialsConfig,
}

/// Control-plane connection settings.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CfConfig {
	/// Control-plane API base URL.
	pub url: String,
	/// Extra PEM root certificates trusted for the API and the UAA.
	pub root_ca_cert: String,
	/// UAA settings.
	pub uaa: UaaConfig,
	/// Skips TLS certificate verification.
	pub disable_ssl_cert_verification: bool,
}
impl CfConfig {
	/// Checks the API URL and the UAA credentials.
	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.url.is_empty() {
			return Err(ConfigError::Invalid("must specify CF url".into()));
		}

		validate_authentication_fields(
			true,
			&self.uaa.url,
			&self.uaa.authentication.client_credentials,
			&self.uaa.authentication.user_credentials,
		)
	}

	/// Selects the credential strategy; user credentials log in through the CF CLI client.
	pub fn credentials(&self) -> Result<Credentials, ConfigError> {
		let auth_url = ConfigError::parse_url(&self.uaa.url)?;
		let client = &self.uaa.authentication.client_credentials;

		if client.is_set() {
			Ok(Credentials::ClientCredentials {
				client_id: client.client_id.clone(),
				client_secret: client.client_secret.clone(),
				auth_url,
			})
		} else {
			let user = &self.uaa.authentication.user_credentials;

			Ok(Credentials::cf_user(user.username.clone(), user.password.clone(), auth_url))
		}
	}

	/// Returns the transport settings implied by this section.
	pub fn transport_config(&self) -> TransportConfig {
		TransportConfig::default()
			.with_tls_verification_disabled(self.disable_ssl_cert_verification)
			.with_trusted_roots_pem(self.root_ca_cert.as_bytes())
	}

	/// Validates the section and builds a ready [`CfClient`].
	pub fn build_client(&self, max_retries: u32) -> Result<CfClient> {
		self.validate()?;

		let transport =
			RetryingTransport::from_config(&self.transport_config().with_max_retries(max_retries))?;
		let auth = AuthHeaderBuilder::new(self.credentials()?, transport.clone());
		let base_url = ConfigError::parse_url(&self.url)?;

		tracing::debug!(url = %base_url, max_retries, "Built control-plane client.");

		Ok(CfClient::new(base_url, Arc::new(auth), transport))
	}
}

/// UAA variant of [`AuthenticationConfig`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UaaAuthenticationConfig {
	/// UAA base URL.
	pub url: String,
	/// Client-credentials grant.
	pub client_credentials: ClientCredentialsConfig,
	/// Password grant.
	pub user_credentials: UserCredentialsConfig,
}
impl UaaAuthenticationConfig {
	/// Returns `true` when any field is filled in.
	pub fn is_set(&self) -> bool {
		!self.url.is_empty() || self.client_credentials.is_set() || self.user_credentials.is_set()
	}

	/// Checks the URL (when `url_required`) and that exactly one credential pair is set.
	pub fn validate(&self, url_required: bool) -> Result<(), ConfigError> {
		validate_authentication_fields(
			url_required,
			&self.url,
			&self.client_credentials,
			&self.user_credentials,
		)
	}
}

/// Either basic or UAA authentication; exactly one must be set.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthenticationConfig {
	/// Static basic-auth credentials.
	pub basic: UserCredentialsConfig,
	/// UAA-issued bearer tokens.
	pub uaa: UaaAuthenticationConfig,
}
impl AuthenticationConfig {
	/// Rejects configurations with neither or both variants set.
	pub fn validate(&self, url_required: bool) -> Result<(), ConfigError> {
		match (self.basic.is_set(), self.uaa.is_set()) {
			(false, false) => Err(ConfigError::Invalid("must specify an authentication type".into())),
			(true, true) =>
				Err(ConfigError::Invalid("cannot specify both basic and UAA authentication".into())),
			(true, false) => self.basic.validate().map_err(|e| e.nest("authentication.basic")),
			(false, true) => self.uaa.validate(url_required).map_err(|e| e.nest("authentication.uaa")),
		}
	}

	/// Selects the credential strategy of a validated configuration.
	pub fn credentials(&self) -> Result<Credentials, ConfigError> {
		if self.basic.is_set() {
			return Ok(Credentials::Basic {
				username: self.basic.username.clone(),
				password: self.basic.password.clone(),
			});
		}

		let auth_url = ConfigError::parse_url(&self.uaa.url)?;
		let client = &self.uaa.client_credentials;

		if client.is_set() {
			Ok(Credentials::ClientCredentials {
				client_id: client.client_id.clone(),
				client_secret: client.client_secret.clone(),
				auth_url,
			})
		} else {
			let user = &self.uaa.user_credentials;

			Ok(Credentials::cf_user(user.username.clone(), user.password.clone(), auth_url))
		}
	}
}

/// External service instances API consulted instead of the control plane.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceInstancesApiConfig {
	/// API URL; empty selects the control-plane lister.
	pub url: String,
	/// Extra PEM root certificates trusted for the API.
	pub root_ca_cert: String,
	/// Skips TLS certificate verification.
	pub disable_ssl_cert_verification: bool,
	/// Credentials presented to the API.
	pub authentication: AuthenticationConfig,
}
impl ServiceInstancesApiConfig {
	/// Returns `true` when an external API is configured.
	pub fn is_configured(&self) -> bool {
		!self.url.is_empty()
	}

	/// Returns the transport settings implied by this section.
	pub fn transport_config(&self) -> TransportConfig {
		TransportConfig::default()
			.with_tls_verification_disabled(self.disable_ssl_cert_verification)
			.with_trusted_roots_pem(self.root_ca_cert.as_bytes())
	}
}

fn validate_authentication_fields(
	url_required: bool,
	url: &str,
	client_credentials: &ClientCredentialsConfig,
	user_credentials: &UserCredentialsConfig,
) -> Result<(), ConfigError> {
	let url_set = !url.is_empty();
	let client_set = client_credentials.is_set();
	let user_set = user_credentials.is_set();

	if !url_set && !client_set && !user_set {
		return Err(ConfigError::Invalid("must specify UAA authentication".into()));
	}
	if !url_set && url_required {
		return Err(ConfigError::field("uaa url", CANT_BE_EMPTY));
	}

	match (client_set, user_set) {
		(false, false) => Err(ConfigError::Invalid(
			"authentication should contain either user_credentials or client_credentials".into(),
		)),
		(true, true) => Err(ConfigError::Invalid("contains both client and user credentials".into())),
		(true, false) => client_credentials.validate().map_err(|e| e.nest("client_credentials")),
		(false, true) => user_credentials.validate().map_err(|e| e.nest("user_credentials")),
	}
}
