//! Authenticated, paginated client for the Cloud Foundry v2 control-plane API: cached UAA
//! tokens, a retrying transport, cursor-following pagination, and the service-broker
//! operations built on top of them.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod cf;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod lister;
pub mod obs;
pub mod pagination;
#[doc(hidden)]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests.

	pub use crate::_prelude::*;

	// self
	use crate::{
		auth::{AuthHeaderBuilder, Credentials},
		cf::CfClient,
		http::{ReqwestTransport, RetryingTransport, TransportConfig},
	};

	/// Username accepted by the basic-auth test client.
	pub const TEST_USERNAME: &str = "admin";
	/// Password accepted by the basic-auth test client.
	pub const TEST_PASSWORD: &str = "admin-secret";

	/// Builds a reqwest transport with a short timeout suitable for `httpmock` servers.
	pub fn test_transport(max_retries: u32) -> RetryingTransport<ReqwestTransport> {
		let config = TransportConfig::default()
			.with_max_retries(max_retries)
			.with_timeout(std::time::Duration::from_secs(5));

		RetryingTransport::from_config(&config)
			.expect("Failed to build reqwest transport for tests.")
	}

	/// Constructs a [`CfClient`] that authenticates with static basic credentials so tests
	/// only need to mock the control-plane endpoints.
	pub fn build_test_client(base_url: &str) -> CfClient {
		let credentials =
			Credentials::Basic { username: TEST_USERNAME.into(), password: TEST_PASSWORD.into() };
		let auth = AuthHeaderBuilder::new(credentials, test_transport(0));
		let base_url = Url::parse(base_url).expect("Failed to parse mock control-plane URL.");

		CfClient::new(base_url, Arc::new(auth), test_transport(0))
	}
}

mod _prelude {
	pub use std::{
		collections::{BTreeMap, HashMap},
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError, Method, StatusCode};
	pub use serde::{Deserialize, Serialize, de::DeserializeOwned};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result, ResultExt};
}

pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _, tokio as _};
