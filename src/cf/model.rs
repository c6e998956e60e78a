//! Typed projections of the control-plane resources the client reads and writes.

// crates.io
use serde::de::IgnoredAny;
// self
use crate::{_prelude::*, auth::TokenSecret};

/// Resource metadata block.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct Metadata {
	/// Resource GUID, unique within its resource type.
	pub guid: String,
}

/// Envelope shared by every control-plane resource.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Resource<E> {
	/// Identity of the resource.
	#[serde(default)]
	pub metadata: Metadata,
	/// Resource-specific fields.
	#[serde(default)]
	pub entity: E,
}
impl<E> Resource<E> {
	/// Returns the resource GUID.
	pub fn guid(&self) -> &str {
		&self.metadata.guid
	}
}

/// Service offering fields.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServiceEntity {
	/// Broker-assigned unique ID of the offering.
	pub unique_id: String,
	/// Path of the offering's plan collection.
	pub service_plans_url: String,
}

/// Service offering resource.
pub type Service = Resource<ServiceEntity>;

/// Maintenance information advertised by a plan or recorded on an instance.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct MaintenanceInfo {
	/// Maintenance version.
	pub version: String,
}

/// Service plan fields.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct ServicePlanEntity {
	/// Broker-assigned unique ID of the plan.
	pub unique_id: String,
	/// Path of the plan's instance collection.
	pub service_instances_url: String,
	/// Plan name shown in the marketplace.
	pub name: String,
	/// Maintenance information of the plan.
	pub maintenance_info: MaintenanceInfo,
}

/// Service plan resource.
pub type ServicePlan = Resource<ServicePlanEntity>;

/// Type of an asynchronous operation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationType {
	/// Instance creation.
	Create,
	/// Instance update or upgrade.
	Update,
	/// Instance deletion.
	Delete,
	/// Missing or unrecognized type.
	#[default]
	#[serde(other)]
	Unknown,
}

/// State of an asynchronous operation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperationState {
	/// Operation is still running.
	#[serde(rename = "in progress")]
	InProgress,
	/// Operation completed successfully.
	#[serde(rename = "succeeded")]
	Succeeded,
	/// Operation failed.
	#[serde(rename = "failed")]
	Failed,
	/// Missing or unrecognized state.
	#[default]
	#[serde(rename = "unknown")]
	#[serde(other)]
	Unknown,
}

/// Control-plane record of the latest asynchronous operation on an instance.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct LastOperation {
	/// Operation type.
	#[serde(rename = "type")]
	pub kind: OperationType,
	/// Operation state.
	pub state: OperationState,
}
impl LastOperation {
	/// Returns `true` for delete operations.
	pub fn is_delete(&self) -> bool {
		self.kind == OperationType::Delete
	}

	/// Returns `true` when the operation failed.
	pub fn operation_failed(&self) -> bool {
		self.state == OperationState::Failed
	}

	/// Returns `true` while the operation is running.
	pub fn in_progress(&self) -> bool {
		self.state == OperationState::InProgress
	}
}

/// Service instance fields.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServiceInstanceEntity {
	/// Space the instance lives in.
	pub space_guid: String,
	/// Path of the instance's plan.
	pub service_plan_url: String,
	/// Latest asynchronous operation.
	pub last_operation: LastOperation,
	/// Maintenance information applied to the instance.
	pub maintenance_info: MaintenanceInfo,
}

/// Service instance resource.
pub type ServiceInstance = Resource<ServiceInstanceEntity>;

/// Flat view of an instance tagged with its plan's unique ID.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Instance {
	/// Instance GUID.
	#[serde(rename = "service_instance_id")]
	pub guid: String,
	/// Unique ID of the plan the instance was listed under.
	#[serde(rename = "plan_id")]
	pub plan_unique_id: String,
	/// Space the instance lives in; omitted from JSON when unknown.
	#[serde(default, skip_serializing_if = "String::is_empty")]
	pub space_guid: String,
}

/// Service binding fields.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BindingEntity {
	/// Bound application GUID.
	pub app_guid: String,
	/// Bound service instance GUID.
	pub service_instance_guid: String,
}

/// Application binding of a service instance.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Binding {
	/// Binding GUID.
	pub guid: String,
	/// Bound application GUID.
	pub app_guid: String,
}
impl From<Resource<BindingEntity>> for Binding {
	fn from(resource: Resource<BindingEntity>) -> Self {
		Self { guid: resource.metadata.guid, app_guid: resource.entity.app_guid }
	}
}

/// Service key of a service instance.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ServiceKey {
	/// Service key GUID.
	pub guid: String,
}
impl From<Resource<IgnoredAny>> for ServiceKey {
	fn from(resource: Resource<IgnoredAny>) -> Self {
		Self { guid: resource.metadata.guid }
	}
}

/// Service broker fields.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServiceBrokerEntity {
	/// Broker name.
	pub name: String,
}

/// Registered service broker.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ServiceBroker {
	/// Broker GUID.
	pub guid: String,
	/// Broker name.
	pub name: String,
}
impl From<Resource<ServiceBrokerEntity>> for ServiceBroker {
	fn from(resource: Resource<ServiceBrokerEntity>) -> Self {
		Self { guid: resource.metadata.guid, name: resource.entity.name }
	}
}

/// Broker registration payload used for create and update.
#[derive(Clone, Debug, Serialize)]
pub struct BrokerRegistration {
	/// Broker name.
	pub name: String,
	/// Broker base URL.
	pub broker_url: String,
	/// Basic-auth username the control plane uses against the broker.
	pub auth_username: String,
	/// Basic-auth password the control plane uses against the broker.
	pub auth_password: TokenSecret,
}

/// Service plan visibility fields.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServicePlanVisibilityEntity {
	/// Plan made visible.
	pub service_plan_guid: String,
	/// Organization the plan is visible to.
	pub organization_guid: String,
}

/// Service plan visibility resource.
pub type ServicePlanVisibility = Resource<ServicePlanVisibilityEntity>;

/// Organization fields.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct OrganizationEntity {
	/// Organization name.
	pub name: String,
	/// Path of the organization's space collection.
	pub spaces_url: String,
}

/// Organization resource.
pub type Organization = Resource<OrganizationEntity>;

/// Space fields.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SpaceEntity {
	/// Space name.
	pub name: String,
}

/// Space resource.
pub type Space = Resource<SpaceEntity>;

/// `/v2/info` payload.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Info {
	/// Control-plane API version.
	pub api_version: String,
	/// Open Service Broker API version supported by the control plane.
	pub osbapi_version: String,
}

/// Filter accepted by instance listings.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GetInstancesFilter {
	/// Unique ID of the service offering.
	pub service_offering_id: String,
	/// Organization name; only applied together with `space_name`.
	pub org_name: String,
	/// Space name; only applied together with `org_name`.
	pub space_name: String,
}
impl GetInstancesFilter {
	/// Builds an unfiltered listing for `service_offering_id`.
	pub fn new(service_offering_id: impl Into<String>) -> Self {
		Self { service_offering_id: service_offering_id.into(), ..Default::default() }
	}

	/// Restricts the listing to the space `space_name` of organization `org_name`.
	pub fn with_space(mut self, org_name: impl Into<String>, space_name: impl Into<String>) -> Self {
		self.org_name = org_name.into();
		self.space_name = space_name.into();

		self
	}

	/// Returns `true` when both org and space are set.
	pub fn is_space_scoped(&self) -> bool {
		!self.org_name.is_empty() && !self.space_name.is_empty()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn last_operation_decodes_spaced_state() {
		let operation: LastOperation =
			serde_json::from_str(r#"{"type":"delete","state":"in progress","description":""}"#)
				.expect("Last operation fixture should decode.");

		assert!(operation.is_delete());
		assert!(operation.in_progress());
		assert!(!operation.operation_failed());
	}

	#[test]
	fn unknown_operation_values_fall_back() {
		let operation: LastOperation = serde_json::from_str(r#"{"type":"rename","state":"paused"}"#)
			.expect("Unknown values should decode.");

		assert_eq!(operation.kind, OperationType::Unknown);
		assert_eq!(operation.state, OperationState::Unknown);
	}

	#[test]
	fn plan_resource_decodes_nested_fields() {
		let plan: ServicePlan = serde_json::from_str(
			r#"{
				"metadata": {"guid": "plan-guid", "url": "/v2/service_plans/plan-guid"},
				"entity": {
					"name": "small",
					"unique_id": "plan-a",
					"service_instances_url": "/v2/service_plans/plan-guid/service_instances",
					"maintenance_info": {"version": "1.2.3"}
				}
			}"#,
		)
		.expect("Plan fixture should decode.");

		assert_eq!(plan.guid(), "plan-guid");
		assert_eq!(plan.entity.unique_id, "plan-a");
		assert_eq!(plan.entity.maintenance_info.version, "1.2.3");
	}

	#[test]
	fn instance_uses_listing_field_names() {
		let instance = Instance {
			guid: "guid-1".into(),
			plan_unique_id: "plan-a".into(),
			space_guid: "space-1".into(),
		};
		let value = serde_json::to_value(&instance).expect("Instance should serialize.");

		assert_eq!(
			value,
			serde_json::json!({"service_instance_id": "guid-1", "plan_id": "plan-a", "space_guid": "space-1"})
		);
	}

	#[test]
	fn space_scope_requires_both_names() {
		assert!(!GetInstancesFilter::new("offering").is_space_scoped());
		assert!(GetInstancesFilter::new("offering").with_space("org", "space").is_space_scoped());

		let org_only = GetInstancesFilter { org_name: "org".into(), ..GetInstancesFilter::new("o") };

		assert!(!org_only.is_space_scoped());
	}
}
