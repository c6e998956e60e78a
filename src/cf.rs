//! Control-plane domain operations.
//!
//! [`CfClient`] composes the JSON client and the page walker into the operations a
//! service broker needs: counting and listing instances per offering, managing plan
//! access, broker registration, and version checks. Every operation is a sequential
//! chain of requests; nothing runs in parallel.

pub mod model;

mod access;
mod brokers;
mod info;
mod instances;
mod orgs;
mod plans;

pub use model::*;

// self
use crate::{
	_prelude::*,
	auth::AuthHeaderProvider,
	client::JsonClient,
	http::{HttpResponse, HttpTransport, ReqwestTransport, RetryingTransport},
	pagination::DEFAULT_PER_PAGE,
};

/// Client for the service-broker facing parts of the control-plane API.
#[derive(Debug)]
pub struct CfClient<T = ReqwestTransport>
where
	T: ?Sized + HttpTransport,
{
	json: JsonClient<T>,
}
impl<T> CfClient<T>
where
	T: ?Sized + HttpTransport,
{
	/// Creates a client for the API at `base_url`.
	pub fn new(
		base_url: Url,
		auth: Arc<dyn AuthHeaderProvider>,
		transport: RetryingTransport<T>,
	) -> Self {
		Self { json: JsonClient::new(base_url, auth, transport) }
	}

	/// Returns the underlying JSON client for requests this type does not cover.
	pub fn json(&self) -> &JsonClient<T> {
		&self.json
	}
}

fn per_page(path: &str) -> String {
	format!("{path}?results-per-page={DEFAULT_PER_PAGE}")
}

/// Fails with [`Error::UnexpectedStatus`] unless `response` carries one of `expected`.
fn expect_status(response: &HttpResponse, expected: &[StatusCode]) -> Result<()> {
	if expected.contains(&response.status) {
		Ok(())
	} else {
		Err(Error::UnexpectedStatus { status: response.status.as_u16(), body: response.text() })
	}
}
