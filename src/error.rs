//! Client-wide error types shared by the transport, auth, and domain layers.

// self
use crate::_prelude::*;

/// Client-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Hint appended to every token-endpoint failure.
const UAA_REMEDIATION: &str =
	"Please ensure that the UAA URL and credentials are correct and reachable, then try again";

/// Canonical error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Connection-level failure that survived every retry.
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Token endpoint was unreachable or refused to issue a token.
	#[error(transparent)]
	Authentication(#[from] AuthenticationError),

	/// The API answered 404.
	#[error("Resource not found: {message}")]
	ResourceNotFound {
		/// Server-supplied `description`, or the raw body.
		message: String,
	},
	/// The API answered 401.
	#[error("Unauthorized: {message}")]
	Unauthorized {
		/// Server-supplied `description`, or the raw body.
		message: String,
	},
	/// The API answered 403.
	#[error("Forbidden: {message}")]
	Forbidden {
		/// Server-supplied `description`, or the raw body.
		message: String,
	},
	/// The API answered 200 with a body that is empty or cannot be decoded.
	#[error("Invalid response: {message}")]
	InvalidResponse {
		/// Decoder failure or placeholder description.
		message: String,
	},
	/// Any status the caller did not expect for the operation.
	#[error("Unexpected response status {status}, {body:?}")]
	UnexpectedStatus {
		/// HTTP status code returned by the API.
		status: u16,
		/// Raw response body.
		body: String,
	},

	/// The offering exists but has no plan with the requested unique ID.
	#[error("Service plan {plan_id} not found for service {offering_id}")]
	PlanNotFound {
		/// Requested plan unique ID.
		plan_id: String,
		/// Offering unique ID that was searched.
		offering_id: String,
	},
	/// No plan of the offering carries the requested name.
	#[error("Plan {plan_name:?} not found while updating plan access")]
	PlanNameNotFound {
		/// Requested plan name.
		plan_name: String,
	},
	/// Organization lookup by name returned no records.
	#[error("Failed to find org with name {name:?}")]
	OrganizationNotFound {
		/// Requested organization name.
		name: String,
	},
	/// Service instance is not part of the listing.
	#[error("Service instance not found")]
	InstanceNotFound,
	/// Instance-listing filter is incomplete or names unsupported keys.
	#[error("{reason}")]
	InvalidFilter {
		/// Human-readable validation failure.
		reason: String,
	},

	/// Lower-layer failure annotated with operation-specific context.
	#[error("{context}")]
	Context {
		/// Description of the operation that failed.
		context: String,
		/// Original failure.
		#[source]
		source: Box<Error>,
	},
}
impl Error {
	/// Wraps `self` with operation-specific context while keeping it as the source.
	pub fn context(self, context: impl Into<String>) -> Self {
		Self::Context { context: context.into(), source: Box::new(self) }
	}

	/// Returns the innermost error by peeling [`Error::Context`] layers.
	pub fn root(&self) -> &Error {
		let mut current = self;

		while let Self::Context { source, .. } = current {
			current = source;
		}

		current
	}

	/// Returns `true` when the root cause is [`Error::ResourceNotFound`].
	pub fn is_not_found(&self) -> bool {
		matches!(self.root(), Self::ResourceNotFound { .. })
	}
}

/// Adds [`Error::context`] to results.
pub trait ResultExt<T> {
	/// Wraps the error branch with operation-specific context.
	fn context(self, context: impl Into<String>) -> Result<T>;

	/// Like [`ResultExt::context`] but builds the message lazily.
	fn with_context<F, S>(self, f: F) -> Result<T>
	where
		F: FnOnce() -> S,
		S: Into<String>;
}
impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
	E: Into<Error>,
{
	fn context(self, context: impl Into<String>) -> Result<T> {
		self.map_err(|e| e.into().context(context))
	}

	fn with_context<F, S>(self, f: F) -> Result<T>
	where
		F: FnOnce() -> S,
		S: Into<String>,
	{
		self.map_err(|e| e.into().context(f()))
	}
}

/// Configuration and validation failures raised before any request is sent.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// A base or endpoint URL cannot be parsed.
	#[error("URL {url:?} is invalid.")]
	InvalidUrl {
		/// Offending URL string.
		url: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Trusted root certificate PEM cannot be parsed.
	#[error("Trusted root certificate is not valid PEM.")]
	InvalidTrustedCert {
		/// Underlying parsing failure.
		#[source]
		source: ReqwestError,
	},
	/// A header value contains characters HTTP does not allow.
	#[error("Header {name} contains invalid characters.")]
	InvalidHeader {
		/// Header name.
		name: &'static str,
	},
	/// Request body could not be serialized.
	#[error("Request body could not be serialized.")]
	Serialize(#[from] serde_json::Error),
	/// A configuration field is missing or malformed.
	#[error("{field} {message}")]
	Field {
		/// Dotted path to the field.
		field: String,
		/// Failure description.
		message: String,
	},
	/// Configuration is inconsistent as a whole.
	#[error("{0}")]
	Invalid(String),
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}

	/// Parses `url`, mapping failures into [`ConfigError::InvalidUrl`].
	pub fn parse_url(url: &str) -> Result<Url, Self> {
		Url::parse(url).map_err(|source| Self::InvalidUrl { url: url.to_owned(), source })
	}

	/// Builds a field error for `field`.
	pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
		Self::Field { field: field.into(), message: message.into() }
	}

	/// Prefixes the field path of a [`ConfigError::Field`]; other variants become field
	/// errors under `prefix`.
	pub fn nest(self, prefix: &str) -> Self {
		match self {
			Self::Field { field, message } =>
				Self::Field { field: format!("{prefix}.{field}"), message },
			other => Self::Field { field: prefix.to_owned(), message: other.to_string() },
		}
	}
}

/// Transport-level failures (DNS, TCP, TLS, timeouts).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Every attempt failed before an HTTP response arrived.
	#[error("Network error after {attempts} attempt(s): {source}")]
	Network {
		/// Number of attempts made, including the first.
		attempts: u32,
		/// Error reported by the last attempt.
		#[source]
		source: BoxError,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(attempts: u32, src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { attempts, source: Box::new(src) }
	}
}

/// Token endpoint failures. None of these are retried by the auth layer.
#[derive(Debug, ThisError)]
pub enum AuthenticationError {
	/// The token endpoint could not be reached.
	#[error("Error reaching UAA: {source}. {}.", UAA_REMEDIATION)]
	Unreachable {
		/// Transport failure.
		#[source]
		source: TransportError,
	},
	/// The token endpoint answered with a non-200 status.
	#[error("Error authenticating ({status}): {body}. {}.", UAA_REMEDIATION)]
	Rejected {
		/// HTTP status code.
		status: u16,
		/// Response body without trailing line breaks.
		body: String,
	},
	/// The token endpoint answered 200 with a body that is not a token grant.
	#[error("Token endpoint returned malformed JSON.")]
	GrantParse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// The grant was decoded but carries no access token.
	#[error("No access token in grant (expires_in: {expires_in}).")]
	MalformedGrant {
		/// `expires_in` reported alongside the missing token.
		expires_in: i64,
	},
}
