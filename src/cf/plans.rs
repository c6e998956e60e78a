//! Offering and plan resolution plus instance counting.

// self
use crate::{
	_prelude::*,
	cf::{CfClient, Service, ServicePlan, per_page},
	http::HttpTransport,
	obs::{self, OperationKind},
	pagination::Page,
};

impl<T> CfClient<T>
where
	T: ?Sized + HttpTransport,
{
	/// Counts the instances of every plan of the offering `service_offering_id`.
	///
	/// Each plan costs one request: the count is the server-reported `total_results` of the
	/// plan's first instance page. An unknown offering yields an empty map.
	pub async fn count_instances_of_service_offering(
		&self,
		service_offering_id: &str,
	) -> Result<HashMap<ServicePlan, u64>> {
		obs::observe(OperationKind::CountInstances, "count_instances_of_service_offering", async {
			let plans = self.get_plans_for_service_id(service_offering_id).await?;
			let mut counts = HashMap::with_capacity(plans.len());

			for plan in plans {
				let count =
					self.count_service_instances_of_plan(&plan.entity.service_instances_url).await?;

				counts.insert(plan, count);
			}

			Ok(counts)
		})
		.await
	}

	/// Counts the instances of the plan `plan_id` of the offering `service_offering_id`.
	pub async fn count_instances_of_plan(
		&self,
		service_offering_id: &str,
		plan_id: &str,
	) -> Result<u64> {
		obs::observe(OperationKind::CountInstances, "count_instances_of_plan", async {
			let plans = self.get_plans_for_service_id(service_offering_id).await?;
			let Some(plan) = plans.iter().find(|plan| plan.entity.unique_id == plan_id) else {
				return Err(Error::PlanNotFound {
					plan_id: plan_id.to_owned(),
					offering_id: service_offering_id.to_owned(),
				});
			};

			self.count_service_instances_of_plan(&plan.entity.service_instances_url).await
		})
		.await
	}

	/// Returns the plan of the service instance `instance_guid`.
	pub async fn get_plan_by_service_instance_guid(&self, instance_guid: &str) -> Result<ServicePlan> {
		obs::observe(OperationKind::Instance, "get_plan_by_service_instance_guid", async {
			let page: Page<ServicePlan> = self
				.json
				.get(&format!("/v2/service_plans?q=service_instance_guid:{instance_guid}"))
				.await
				.with_context(|| format!("failed to retrieve plan for service {instance_guid:?}"))?;

			page.resources.into_iter().next().ok_or_else(|| {
				Error::ResourceNotFound {
					message: format!("no plan references service instance {instance_guid}"),
				}
				.context(format!("failed to retrieve plan for service {instance_guid:?}"))
			})
		})
		.await
	}

	/// Resolves every plan of the offering whose `unique_id` is `service_offering_id`.
	///
	/// Offerings are scanned page by page and the scan stops at the first match. An
	/// unknown offering yields no plans.
	pub(crate) async fn get_plans_for_service_id(
		&self,
		service_offering_id: &str,
	) -> Result<Vec<ServicePlan>> {
		let service = self
			.json
			.walk::<Service>(per_page("/v2/services"))
			.find_map(|service| (service.entity.unique_id == service_offering_id).then_some(service))
			.await?;
		let Some(service) = service else {
			tracing::debug!(service_offering_id, "Service offering not found.");

			return Ok(Vec::new());
		};

		self.json.get_all(per_page(&service.entity.service_plans_url)).await
	}

	async fn count_service_instances_of_plan(&self, service_instances_url: &str) -> Result<u64> {
		let page: Page<serde::de::IgnoredAny> =
			self.json.get(&per_page(service_instances_url)).await?;

		Ok(page.total_results)
	}
}

/// Returns the GUID of the last plan named `plan_name`.
pub(crate) fn find_plan_guid<'a>(plans: &'a [ServicePlan], plan_name: &str) -> Option<&'a str> {
	plans.iter().rev().find(|plan| plan.entity.name == plan_name).map(|plan| plan.guid())
}
