//! Service instance reads, listings, upgrades, and their bindings and keys.

// crates.io
use serde::de::IgnoredAny;
// self
use crate::{
	_prelude::*,
	cf::{
		Binding, BindingEntity, CfClient, GetInstancesFilter, Instance, LastOperation,
		MaintenanceInfo, Resource, ServiceInstance, ServiceKey, expect_status, per_page,
	},
	http::HttpTransport,
	obs::{self, OperationKind},
};

#[derive(Serialize)]
struct UpgradeRequest<'a> {
	maintenance_info: &'a MaintenanceInfo,
}

impl<T> CfClient<T>
where
	T: ?Sized + HttpTransport,
{
	/// Fetches the service instance `instance_guid`.
	pub async fn get_service_instance(&self, instance_guid: &str) -> Result<ServiceInstance> {
		obs::observe(
			OperationKind::Instance,
			"get_service_instance",
			self.json.get(&format!("/v2/service_instances/{instance_guid}")),
		)
		.await
	}

	/// Returns the latest asynchronous operation of the instance `instance_guid`.
	pub async fn get_last_operation_for_instance(&self, instance_guid: &str) -> Result<LastOperation> {
		Ok(self.get_service_instance(instance_guid).await?.entity.last_operation)
	}

	/// Lists the instances of every plan of the filter's offering.
	///
	/// When both org and space names are set, the listing is restricted to that space.
	/// An org or space that does not exist yields an empty list.
	pub async fn get_service_instances(&self, filter: &GetInstancesFilter) -> Result<Vec<Instance>> {
		obs::observe(OperationKind::ListInstances, "get_service_instances", async {
			let plans = self.get_plans_for_service_id(&filter.service_offering_id).await?;
			let query = match self.space_query(filter).await {
				Ok(query) => query,
				Err(e) if e.is_not_found() => {
					tracing::debug!(
						org = filter.org_name.as_str(),
						space = filter.space_name.as_str(),
						"Org or space not found, no instances to list."
					);

					return Ok(Vec::new());
				},
				Err(e) => return Err(e),
			};
			let mut instances = Vec::new();

			for plan in &plans {
				let path = format!(
					"{}{query}",
					per_page(&format!("/v2/service_plans/{}/service_instances", plan.guid()))
				);
				let mut walker = self.json.walk::<ServiceInstance>(path);

				while let Some(page) = walker.next_page().await? {
					instances.extend(page.resources.into_iter().map(|instance| Instance {
						guid: instance.metadata.guid,
						plan_unique_id: plan.entity.unique_id.clone(),
						space_guid: instance.entity.space_guid,
					}));
				}
			}

			Ok(instances)
		})
		.await
	}

	/// Upgrades the instance `instance_guid` to `maintenance_info` and returns the
	/// operation the control plane started.
	pub async fn upgrade_service_instance(
		&self,
		instance_guid: &str,
		maintenance_info: &MaintenanceInfo,
	) -> Result<LastOperation> {
		obs::observe(OperationKind::Instance, "upgrade_service_instance", async {
			let response = self
				.json
				.put(
					&format!("/v2/service_instances/{instance_guid}?accepts_incomplete=true"),
					&UpgradeRequest { maintenance_info },
				)
				.await?;

			expect_status(&response, &[StatusCode::ACCEPTED, StatusCode::CREATED])
				.with_context(|| format!("failed to upgrade service instance {instance_guid:?}"))?;

			let instance: ServiceInstance =
				serde_json::from_slice(&response.body).map_err(|e| Error::InvalidResponse {
					message: format!("Invalid response body: {e}"),
				})?;

			Ok(instance.entity.last_operation)
		})
		.await
	}

	/// Deletes the instance `instance_guid`; an instance that is already gone is not an
	/// error.
	pub async fn delete_service_instance(&self, instance_guid: &str) -> Result<()> {
		obs::observe(
			OperationKind::Instance,
			"delete_service_instance",
			self.json.delete(&format!("/v2/service_instances/{instance_guid}?accepts_incomplete=true")),
		)
		.await
	}

	/// Lists the application bindings of the instance `instance_guid`.
	pub async fn get_bindings_for_instance(&self, instance_guid: &str) -> Result<Vec<Binding>> {
		obs::observe(OperationKind::Instance, "get_bindings_for_instance", async {
			let resources: Vec<Resource<BindingEntity>> = self
				.json
				.get_all(per_page(&format!("/v2/service_instances/{instance_guid}/service_bindings")))
				.await?;

			Ok(resources.into_iter().map(Binding::from).collect())
		})
		.await
	}

	/// Lists the service keys of the instance `instance_guid`.
	pub async fn get_service_keys_for_instance(&self, instance_guid: &str) -> Result<Vec<ServiceKey>> {
		obs::observe(OperationKind::Instance, "get_service_keys_for_instance", async {
			let resources: Vec<Resource<IgnoredAny>> = self
				.json
				.get_all(per_page(&format!("/v2/service_instances/{instance_guid}/service_keys")))
				.await?;

			Ok(resources.into_iter().map(ServiceKey::from).collect())
		})
		.await
	}

	/// Deletes an application binding.
	pub async fn delete_binding(&self, binding: &Binding) -> Result<()> {
		obs::observe(
			OperationKind::Instance,
			"delete_binding",
			self.json.delete(&format!("/v2/apps/{}/service_bindings/{}", binding.app_guid, binding.guid)),
		)
		.await
	}

	/// Deletes a service key.
	pub async fn delete_service_key(&self, key: &ServiceKey) -> Result<()> {
		obs::observe(
			OperationKind::Instance,
			"delete_service_key",
			self.json.delete(&format!("/v2/service_keys/{}", key.guid)),
		)
		.await
	}

	/// Builds the `&q=space_guid:<guid>` suffix for space-scoped filters.
	async fn space_query(&self, filter: &GetInstancesFilter) -> Result<String> {
		if !filter.is_space_scoped() {
			return Ok(String::new());
		}

		let organization = self.get_organization(&filter.org_name).await?;
		let space = self.get_space(&organization, &filter.space_name).await?;

		Ok(format!("&q=space_guid:{}", space.guid()))
	}
}
