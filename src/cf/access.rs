//! Plan access management: the public flag and per-organization visibilities.
//!
//! A plan's public flag and its visibility records are independent. Enabling or
//! disabling a single plan therefore sets the flag and then deletes every visibility
//! of the plan. Disabling all plans of an offering only clears the flags and leaves
//! visibilities in place.

// self
use crate::{
	_prelude::*,
	cf::{
		CfClient, ServicePlanVisibility, ServicePlanVisibilityEntity, expect_status,
		plans::find_plan_guid,
	},
	http::HttpTransport,
	obs::{self, OperationKind},
	pagination::DEFAULT_PER_PAGE,
};

#[derive(Serialize)]
struct PlanAccessRequest {
	public: bool,
}

impl<T> CfClient<T>
where
	T: ?Sized + HttpTransport,
{
	/// Makes the plan `plan_name` public and removes its visibility records.
	pub async fn enable_service_access(&self, service_offering_id: &str, plan_name: &str) -> Result<()> {
		obs::observe(
			OperationKind::PlanAccess,
			"enable_service_access",
			self.manage_service_access(service_offering_id, plan_name, true),
		)
		.await
	}

	/// Makes the plan `plan_name` private and removes its visibility records.
	pub async fn disable_service_access(
		&self,
		service_offering_id: &str,
		plan_name: &str,
	) -> Result<()> {
		obs::observe(
			OperationKind::PlanAccess,
			"disable_service_access",
			self.manage_service_access(service_offering_id, plan_name, false),
		)
		.await
	}

	/// Makes every plan of the offering private.
	///
	/// Visibility records are left untouched, unlike [`CfClient::disable_service_access`].
	pub async fn disable_service_access_for_all_plans(&self, service_offering_id: &str) -> Result<()> {
		obs::observe(OperationKind::PlanAccess, "disable_service_access_for_all_plans", async {
			let plans = self.get_plans_for_service_id(service_offering_id).await?;

			for plan in &plans {
				self.set_access_for_plan(plan.guid(), false).await?;
			}

			Ok(())
		})
		.await
	}

	/// Grants the organization `org_name` access to the plan `plan_name`.
	pub async fn create_service_plan_visibility(
		&self,
		org_name: &str,
		service_offering_id: &str,
		plan_name: &str,
	) -> Result<()> {
		const CONTEXT: &str = "failed to create service plan visibility";

		obs::observe(OperationKind::PlanAccess, "create_service_plan_visibility", async {
			let organization = match self.get_organization(org_name).await {
				Ok(organization) => organization,
				Err(e) if e.is_not_found() =>
					return Err(Error::OrganizationNotFound { name: org_name.to_owned() }),
				Err(e) => return Err(e.context(CONTEXT)),
			};
			let plans = self.get_plans_for_service_id(service_offering_id).await.context(CONTEXT)?;
			let plan_guid = find_plan_guid(&plans, plan_name)
				.ok_or_else(|| Error::PlanNameNotFound { plan_name: plan_name.to_owned() })?;
			let body = ServicePlanVisibilityEntity {
				service_plan_guid: plan_guid.to_owned(),
				organization_guid: organization.guid().to_owned(),
			};
			let response =
				self.json.post("/v2/service_plan_visibilities", &body).await.context(CONTEXT)?;

			expect_status(&response, &[StatusCode::CREATED]).context(CONTEXT)
		})
		.await
	}

	async fn manage_service_access(
		&self,
		service_offering_id: &str,
		plan_name: &str,
		public: bool,
	) -> Result<()> {
		let plans = self.get_plans_for_service_id(service_offering_id).await?;
		let plan_guid = find_plan_guid(&plans, plan_name)
			.ok_or_else(|| Error::PlanNameNotFound { plan_name: plan_name.to_owned() })?;

		self.set_access_for_plan(plan_guid, public).await?;
		self.delete_service_plan_visibilities(plan_guid)
			.await
			.with_context(|| format!("failed to delete plan visibilities for plan {plan_guid}"))
	}

	async fn set_access_for_plan(&self, plan_guid: &str, public: bool) -> Result<()> {
		let response = self
			.json
			.put(&format!("/v2/service_plans/{plan_guid}"), &PlanAccessRequest { public })
			.await?;

		expect_status(&response, &[StatusCode::CREATED])
			.with_context(|| format!("failed to update service access for plan {plan_guid}"))
	}

	async fn delete_service_plan_visibilities(&self, plan_guid: &str) -> Result<()> {
		let visibilities: Vec<ServicePlanVisibility> = self
			.json
			.get_all(format!(
				"/v2/service_plan_visibilities?q=service_plan_guid:{plan_guid}&results-per-page={DEFAULT_PER_PAGE}"
			))
			.await
			.with_context(|| format!("failed to get plan visibilities for plan {plan_guid}"))?;

		for visibility in &visibilities {
			self.json
				.delete(&format!("/v2/service_plan_visibilities/{}", visibility.guid()))
				.await
				.with_context(|| format!("failed to delete plan visibility for plan {plan_guid}"))?;
		}

		Ok(())
	}
}
