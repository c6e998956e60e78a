//! Instance listers used by broker-side tooling.
//!
//! [`CfInstanceLister`] asks the control plane, optionally scoped by the `cf_org` and
//! `cf_space` filters. [`ApiInstanceLister`] asks an operator-provided service instances
//! API and forwards the filter map as its query string.

// self
use crate::{
	_prelude::*,
	auth::{AuthHeaderBuilder, AuthHeaderProvider},
	cf::{CfClient, GetInstancesFilter, Instance},
	config::ServiceInstancesApiConfig,
	error::ConfigError,
	http::{HttpRequest, HttpTransport, ReqwestTransport, RetryingTransport},
	obs::{self, OperationKind},
};

/// Filter key naming the organization.
pub const CF_ORG_FILTER: &str = "cf_org";
/// Filter key naming the space.
pub const CF_SPACE_FILTER: &str = "cf_space";

/// Boxed future returned by [`InstanceLister`] methods.
pub type ListerFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + 'a + Send>>;

/// Source of service instances for one offering.
pub trait InstanceLister
where
	Self: Send + Sync,
{
	/// Lists instances matching `filter`.
	fn instances<'a>(&'a self, filter: &'a BTreeMap<String, String>) -> ListerFuture<'a, Vec<Instance>>;
}

/// Lists instances through the control-plane API.
#[derive(Debug)]
pub struct CfInstanceLister<T = ReqwestTransport>
where
	T: ?Sized + HttpTransport,
{
	client: Arc<CfClient<T>>,
	service_offering_id: String,
}
impl<T> CfInstanceLister<T>
where
	T: ?Sized + HttpTransport,
{
	/// Creates a lister for the offering `service_offering_id`.
	pub fn new(client: Arc<CfClient<T>>, service_offering_id: impl Into<String>) -> Self {
		Self { client, service_offering_id: service_offering_id.into() }
	}

	async fn list(&self, filter: &BTreeMap<String, String>) -> Result<Vec<Instance>> {
		let (org_name, space_name) = filters_from_map(filter)?;
		let filter = GetInstancesFilter::new(&self.service_offering_id).with_space(org_name, space_name);

		self.client
			.get_service_instances(&filter)
			.await
			.context("could not retrieve list of instances")
	}
}
impl<T> InstanceLister for CfInstanceLister<T>
where
	T: ?Sized + HttpTransport,
{
	fn instances<'a>(&'a self, filter: &'a BTreeMap<String, String>) -> ListerFuture<'a, Vec<Instance>> {
		Box::pin(self.list(filter))
	}
}

/// Lists instances through an external service instances API.
pub struct ApiInstanceLister<T = ReqwestTransport>
where
	T: ?Sized + HttpTransport,
{
	base_url: Url,
	transport: RetryingTransport<T>,
	auth: Arc<dyn AuthHeaderProvider>,
}
impl<T> ApiInstanceLister<T>
where
	T: ?Sized + HttpTransport,
{
	/// Creates a lister for the API at `base_url`.
	pub fn new(
		base_url: Url,
		auth: Arc<dyn AuthHeaderProvider>,
		transport: RetryingTransport<T>,
	) -> Self {
		Self { base_url, transport, auth }
	}

	/// Returns the current record of `instance`, or [`Error::InstanceNotFound`] when the
	/// API no longer lists it.
	pub async fn latest_instance_info(&self, instance: &Instance) -> Result<Instance> {
		self.list(&BTreeMap::new())
			.await?
			.into_iter()
			.find(|candidate| candidate.guid == instance.guid)
			.ok_or(Error::InstanceNotFound)
	}

	async fn list(&self, filter: &BTreeMap<String, String>) -> Result<Vec<Instance>> {
		obs::observe(OperationKind::ListInstances, "service_instances_api", async {
			let mut url = self.base_url.clone();

			if !filter.is_empty() {
				url.query_pairs_mut().extend_pairs(filter);
			}

			let mut request = HttpRequest::new(Method::GET, url);

			self.auth.add_auth_header(&mut request).await?;

			tracing::debug!(url = %request.url, "Listing instances from the service instances API.");

			let response = self.transport.execute(request).await.with_context(|| {
				format!("error communicating with service_instances_api ({})", self.base_url)
			})?;

			if response.status != StatusCode::OK {
				let description = serde_json::from_slice::<HashMap<String, serde_json::Value>>(&response.body)
					.ok()
					.and_then(|body| body.get("description").and_then(|v| v.as_str().map(ToOwned::to_owned)))
					.unwrap_or_default();

				return Err(Error::UnexpectedStatus {
					status: response.status.as_u16(),
					body: response.text(),
				}
				.context(format!("HTTP response status: {}. {description}", response.status)));
			}

			serde_json::from_slice(&response.body).map_err(|e| Error::InvalidResponse {
				message: format!("Invalid response body: {e}"),
			})
		})
		.await
	}
}
impl<T> InstanceLister for ApiInstanceLister<T>
where
	T: ?Sized + HttpTransport,
{
	fn instances<'a>(&'a self, filter: &'a BTreeMap<String, String>) -> ListerFuture<'a, Vec<Instance>> {
		Box::pin(self.list(filter))
	}
}
impl<T> Debug for ApiInstanceLister<T>
where
	T: ?Sized + HttpTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ApiInstanceLister").field("base_url", &self.base_url.as_str()).finish()
	}
}

/// Picks the external API lister when `config` names a URL, otherwise the control-plane
/// lister for `service_offering_id`.
pub fn build_instance_lister(
	client: Arc<CfClient>,
	service_offering_id: impl Into<String>,
	config: &ServiceInstancesApiConfig,
	max_retries: u32,
) -> Result<Box<dyn InstanceLister>> {
	if !config.is_configured() {
		return Ok(Box::new(CfInstanceLister::new(client, service_offering_id)));
	}

	config.authentication.validate(true)?;

	let base_url = ConfigError::parse_url(&config.url)?;
	let transport =
		RetryingTransport::from_config(&config.transport_config().with_max_retries(max_retries))?;
	let auth = AuthHeaderBuilder::new(config.authentication.credentials()?, transport.clone());

	Ok(Box::new(ApiInstanceLister::new(base_url, Arc::new(auth), transport)))
}

/// Extracts the org and space names, requiring both whenever any filter is given.
fn filters_from_map(filter: &BTreeMap<String, String>) -> Result<(String, String)> {
	let org_name = filter.get(CF_ORG_FILTER).cloned().unwrap_or_default();
	let space_name = filter.get(CF_SPACE_FILTER).cloned().unwrap_or_default();

	if !filter.is_empty() {
		if org_name.is_empty() {
			return Err(Error::InvalidFilter { reason: "missing required filter cf_org".into() });
		}
		if space_name.is_empty() {
			return Err(Error::InvalidFilter { reason: "missing required filter cf_space".into() });
		}
	}
	if filter.len() > 2 {
		let unknown = filter
			.keys()
			.filter(|key| *key != CF_ORG_FILTER && *key != CF_SPACE_FILTER)
			.map(String::as_str)
			.collect::<Vec<_>>()
			.join(", ");

		return Err(Error::InvalidFilter {
			reason: format!(
				"unsupported filters: {unknown}; supported filters are: {CF_ORG_FILTER}, {CF_SPACE_FILTER}"
			),
		});
	}

	Ok((org_name, space_name))
}
