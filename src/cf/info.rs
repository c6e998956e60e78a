//! `/v2/info` reads and the OSBAPI version gate.

// crates.io
use semver::Version;
// self
use crate::{
	_prelude::*,
	cf::{CfClient, Info},
	http::HttpTransport,
	obs::{self, OperationKind},
};

impl<T> CfClient<T>
where
	T: ?Sized + HttpTransport,
{
	/// Fetches `/v2/info`.
	pub async fn get_info(&self) -> Result<Info> {
		obs::observe(OperationKind::Info, "get_info", self.json.get("/v2/info")).await
	}

	/// Returns the control-plane API version.
	pub async fn get_api_version(&self) -> Result<String> {
		Ok(self.get_info().await?.api_version)
	}

	/// Returns `true` when the control plane supports at least OSBAPI `minimum`.
	///
	/// Parse and request failures are logged and reported as `false`.
	pub async fn check_minimum_osbapi_version(&self, minimum: &str) -> bool {
		let minimum = match parse_tolerant(minimum) {
			Ok(version) => version,
			Err(e) => {
				tracing::warn!(minimum, error = %e, "Cannot parse the required OSBAPI version.");

				return false;
			},
		};
		let info = match self.get_info().await {
			Ok(info) => info,
			Err(e) => {
				tracing::warn!(error = %e, "Cannot request the OSBAPI version.");

				return false;
			},
		};

		match parse_tolerant(&info.osbapi_version) {
			Ok(version) => version >= minimum,
			Err(e) => {
				tracing::warn!(
					osbapi_version = %info.osbapi_version,
					error = %e,
					"Cannot parse the discovered OSBAPI version."
				);

				false
			},
		}
	}
}

/// Parses a version leniently: surrounding whitespace and a leading `v` are ignored,
/// missing minor/patch components default to zero, and leading zeros are dropped.
pub fn parse_tolerant(raw: &str) -> Result<Version, semver::Error> {
	let raw = raw.trim();
	let raw = raw.strip_prefix('v').unwrap_or(raw);
	let split = raw.find(['-', '+']).unwrap_or(raw.len());
	let (core, suffix) = raw.split_at(split);
	let mut parts = core
		.split('.')
		.map(|part| {
			let trimmed = part.trim_start_matches('0');

			if trimmed.is_empty() && !part.is_empty() { "0" } else { trimmed }
		})
		.collect::<Vec<_>>();

	while parts.len() < 3 {
		parts.push("0");
	}

	Version::parse(&format!("{}{suffix}", parts.join(".")))
}
