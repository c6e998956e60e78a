// crates.io
use httpmock::prelude::*;
use serde_json::json;
// self
use cf_broker_client::{
	_preludet::*,
	cf::{Binding, GetInstancesFilter, Instance, MaintenanceInfo, OperationState, OperationType},
};

const OFFERING_ID: &str = "offering-id";

fn plan(guid: &str, unique_id: &str, name: &str) -> serde_json::Value {
	json!({
		"metadata": {"guid": guid},
		"entity": {
			"name": name,
			"unique_id": unique_id,
			"service_instances_url": format!("/v2/service_plans/{guid}/service_instances"),
			"maintenance_info": {"version": "1.0.0"}
		}
	})
}

fn instance(guid: &str, space_guid: &str) -> serde_json::Value {
	json!({
		"metadata": {"guid": guid},
		"entity": {
			"space_guid": space_guid,
			"last_operation": {"type": "create", "state": "succeeded"}
		}
	})
}

/// Mocks an offering whose plans are `p1-guid` (`plan-a`, small) and `p2-guid` (`plan-b`, large).
async fn mock_offering(server: &MockServer) {
	server
		.mock_async(|when, then| {
			when.method(GET).path("/v2/services").query_param("results-per-page", "100");
			then.status(200).json_body(json!({
				"total_results": 2,
				"total_pages": 1,
				"next_url": null,
				"resources": [
					{"metadata": {"guid": "other-guid"}, "entity": {"unique_id": "other", "service_plans_url": "/v2/services/other-guid/service_plans"}},
					{"metadata": {"guid": "svc-guid"}, "entity": {"unique_id": OFFERING_ID, "service_plans_url": "/v2/services/svc-guid/service_plans"}}
				]
			}));
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/v2/services/svc-guid/service_plans")
				.query_param("results-per-page", "100");
			then.status(200).json_body(json!({
				"total_results": 2,
				"total_pages": 1,
				"next_url": null,
				"resources": [plan("p1-guid", "plan-a", "small"), plan("p2-guid", "plan-b", "large")]
			}));
		})
		.await;
}

#[tokio::test]
async fn counts_use_server_reported_totals() {
	let server = MockServer::start_async().await;

	mock_offering(&server).await;

	for (guid, total) in [("p1-guid", 3), ("p2-guid", 5)] {
		server
			.mock_async(|when, then| {
				when.method(GET)
					.path(format!("/v2/service_plans/{guid}/service_instances"))
					.query_param("results-per-page", "100");
				then.status(200).json_body(json!({
					"total_results": total,
					"total_pages": 1,
					"next_url": null,
					"resources": [instance("only-first-row-is-returned", "space")]
				}));
			})
			.await;
	}

	let client = build_test_client(&server.base_url());
	let counts = client
		.count_instances_of_service_offering(OFFERING_ID)
		.await
		.expect("Counting instances should succeed.");
	let by_plan = counts
		.iter()
		.map(|(plan, count)| (plan.entity.unique_id.as_str(), *count))
		.collect::<BTreeMap<_, _>>();

	assert_eq!(by_plan, BTreeMap::from([("plan-a", 3), ("plan-b", 5)]));

	let single = client
		.count_instances_of_plan(OFFERING_ID, "plan-b")
		.await
		.expect("Counting a single plan should succeed.");

	assert_eq!(single, 5);
}

#[tokio::test]
async fn counting_unknown_plan_names_plan_and_offering() {
	let server = MockServer::start_async().await;

	mock_offering(&server).await;

	let client = build_test_client(&server.base_url());
	let err = client
		.count_instances_of_plan(OFFERING_ID, "plan-z")
		.await
		.expect_err("An unknown plan must fail.");

	assert!(matches!(err, Error::PlanNotFound { .. }));
	assert_eq!(err.to_string(), "Service plan plan-z not found for service offering-id");
}

#[tokio::test]
async fn offering_scan_stops_at_first_match() {
	let server = MockServer::start_async().await;
	let first = server
		.mock_async(|when, then| {
			when.method(GET).path("/v2/services");
			then.status(200).json_body(json!({
				"next_url": "/v2/services_page_2",
				"resources": [
					{"metadata": {"guid": "svc-guid"}, "entity": {"unique_id": OFFERING_ID, "service_plans_url": "/v2/services/svc-guid/service_plans"}}
				]
			}));
		})
		.await;
	let second = server
		.mock_async(|when, then| {
			when.method(GET).path("/v2/services_page_2");
			then.status(200).json_body(json!({"next_url": null, "resources": []}));
		})
		.await;
	let plans = server
		.mock_async(|when, then| {
			when.method(GET).path("/v2/services/svc-guid/service_plans");
			then.status(200).json_body(json!({"next_url": null, "resources": []}));
		})
		.await;
	let client = build_test_client(&server.base_url());
	let counts = client
		.count_instances_of_service_offering(OFFERING_ID)
		.await
		.expect("An offering without plans should count nothing.");

	assert!(counts.is_empty());

	first.assert_calls_async(1).await;
	second.assert_calls_async(0).await;
	plans.assert_calls_async(1).await;
}

#[tokio::test]
async fn unknown_offering_has_no_plans() {
	let server = MockServer::start_async().await;

	mock_offering(&server).await;

	let client = build_test_client(&server.base_url());
	let counts = client
		.count_instances_of_service_offering("missing-offering")
		.await
		.expect("An unknown offering should count nothing.");
	let instances = client
		.get_service_instances(&GetInstancesFilter::new("missing-offering"))
		.await
		.expect("An unknown offering should list nothing.");

	assert!(counts.is_empty());
	assert!(instances.is_empty());
}

#[tokio::test]
async fn instances_are_tagged_with_plan_unique_id() {
	let server = MockServer::start_async().await;

	mock_offering(&server).await;
	server
		.mock_async(|when, then| {
			when.method(GET).path("/v2/service_plans/p1-guid/service_instances");
			then.status(200).json_body(json!({
				"next_url": "/v2/service_plans/p1-guid/service_instances_page_2",
				"resources": [instance("i1", "space-1")]
			}));
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(GET).path("/v2/service_plans/p1-guid/service_instances_page_2");
			then.status(200).json_body(json!({"next_url": null, "resources": [instance("i2", "space-2")]}));
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(GET).path("/v2/service_plans/p2-guid/service_instances");
			then.status(200).json_body(json!({"next_url": null, "resources": [instance("i3", "space-1")]}));
		})
		.await;

	let client = build_test_client(&server.base_url());
	let instances = client
		.get_service_instances(&GetInstancesFilter::new(OFFERING_ID))
		.await
		.expect("Listing instances should succeed.");
	let expected = [("i1", "plan-a", "space-1"), ("i2", "plan-a", "space-2"), ("i3", "plan-b", "space-1")]
		.map(|(guid, plan, space)| Instance {
			guid: guid.into(),
			plan_unique_id: plan.into(),
			space_guid: space.into(),
		});

	assert_eq!(instances, expected);
}

#[tokio::test]
async fn space_filter_is_resolved_and_applied() {
	let server = MockServer::start_async().await;

	mock_offering(&server).await;

	let org = server
		.mock_async(|when, then| {
			when.method(GET).path("/v2/organizations").query_param("q", "name:org1");
			then.status(200).json_body(json!({
				"resources": [{
					"metadata": {"guid": "org-guid"},
					"entity": {"name": "org1", "spaces_url": "/v2/organizations/org-guid/spaces"}
				}]
			}));
		})
		.await;
	let space = server
		.mock_async(|when, then| {
			when.method(GET).path("/v2/organizations/org-guid/spaces").query_param("q", "name:space1");
			then.status(200).json_body(json!({
				"resources": [{"metadata": {"guid": "space-guid"}, "entity": {"name": "space1"}}]
			}));
		})
		.await;
	let scoped = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/v2/service_plans/p1-guid/service_instances")
				.query_param("results-per-page", "100")
				.query_param("q", "space_guid:space-guid");
			then.status(200).json_body(json!({"next_url": null, "resources": [instance("i1", "space-guid")]}));
		})
		.await;

	server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/v2/service_plans/p2-guid/service_instances")
				.query_param("q", "space_guid:space-guid");
			then.status(200).json_body(json!({"next_url": null, "resources": []}));
		})
		.await;

	let client = build_test_client(&server.base_url());
	let instances = client
		.get_service_instances(&GetInstancesFilter::new(OFFERING_ID).with_space("org1", "space1"))
		.await
		.expect("Listing scoped instances should succeed.");

	assert_eq!(instances.len(), 1);
	assert_eq!(instances[0].guid, "i1");

	org.assert_calls_async(1).await;
	space.assert_calls_async(1).await;
	scoped.assert_calls_async(1).await;
}

#[tokio::test]
async fn missing_org_yields_empty_listing() {
	let server = MockServer::start_async().await;

	mock_offering(&server).await;
	server
		.mock_async(|when, then| {
			when.method(GET).path("/v2/organizations");
			then.status(200).json_body(json!({"total_results": 0, "resources": []}));
		})
		.await;

	let instances_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/v2/service_plans/p1-guid/service_instances");
			then.status(200).json_body(json!({"resources": [instance("i1", "space-1")]}));
		})
		.await;
	let client = build_test_client(&server.base_url());
	let instances = client
		.get_service_instances(&GetInstancesFilter::new(OFFERING_ID).with_space("org1", "space1"))
		.await
		.expect("A missing org should not be an error.");

	assert!(instances.is_empty());

	instances_mock.assert_calls_async(0).await;
}

#[tokio::test]
async fn upgrade_returns_started_operation() {
	let server = MockServer::start_async().await;
	let upgrade = server
		.mock_async(|when, then| {
			when.method(PUT)
				.path("/v2/service_instances/guid-1")
				.query_param("accepts_incomplete", "true")
				.json_body(json!({"maintenance_info": {"version": "2.0.0"}}));
			then.status(202).json_body(json!({
				"metadata": {"guid": "guid-1"},
				"entity": {"last_operation": {"type": "update", "state": "in progress"}}
			}));
		})
		.await;

	server
		.mock_async(|when, then| {
			when.method(PUT).path("/v2/service_instances/guid-2");
			then.status(422).json_body(json!({"description": "upgrade not allowed"}));
		})
		.await;

	let client = build_test_client(&server.base_url());
	let maintenance_info = MaintenanceInfo { version: "2.0.0".into() };
	let operation = client
		.upgrade_service_instance("guid-1", &maintenance_info)
		.await
		.expect("An accepted upgrade should succeed.");

	assert_eq!(operation.kind, OperationType::Update);
	assert!(operation.in_progress());

	let err = client
		.upgrade_service_instance("guid-2", &maintenance_info)
		.await
		.expect_err("A rejected upgrade must fail.");

	assert_eq!(err.to_string(), "failed to upgrade service instance \"guid-2\"");
	assert!(matches!(err.root(), Error::UnexpectedStatus { status: 422, .. }));

	upgrade.assert_calls_async(1).await;
}

#[tokio::test]
async fn last_operation_and_plan_lookup() {
	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(GET).path("/v2/service_instances/guid-1");
			then.status(200).json_body(json!({
				"metadata": {"guid": "guid-1"},
				"entity": {"space_guid": "space-1", "last_operation": {"type": "delete", "state": "failed"}}
			}));
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/v2/service_plans")
				.query_param("q", "service_instance_guid:guid-1");
			then.status(200).json_body(json!({"resources": [plan("p1-guid", "plan-a", "small")]}));
		})
		.await;

	let client = build_test_client(&server.base_url());
	let operation = client
		.get_last_operation_for_instance("guid-1")
		.await
		.expect("Last operation should load.");

	assert!(operation.is_delete());
	assert!(operation.operation_failed());
	assert_eq!(operation.state, OperationState::Failed);

	let plan = client
		.get_plan_by_service_instance_guid("guid-1")
		.await
		.expect("Plan lookup should succeed.");

	assert_eq!(plan.guid(), "p1-guid");
	assert_eq!(plan.entity.maintenance_info.version, "1.0.0");
}

#[tokio::test]
async fn bindings_and_keys_are_listed_and_deleted() {
	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/v2/service_instances/guid-1/service_bindings")
				.query_param("results-per-page", "100");
			then.status(200).json_body(json!({
				"next_url": null,
				"resources": [
					{"metadata": {"guid": "b-1"}, "entity": {"app_guid": "app-1", "service_instance_guid": "guid-1"}},
					{"metadata": {"guid": "b-2"}, "entity": {"app_guid": "app-2", "service_instance_guid": "guid-1"}}
				]
			}));
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/v2/service_instances/guid-1/service_keys")
				.query_param("results-per-page", "100");
			then.status(200).json_body(json!({
				"next_url": null,
				"resources": [{"metadata": {"guid": "k-1"}, "entity": {"name": "key"}}]
			}));
		})
		.await;

	let delete_binding = server
		.mock_async(|when, then| {
			when.method(DELETE).path("/v2/apps/app-1/service_bindings/b-1");
			then.status(204);
		})
		.await;
	let delete_key = server
		.mock_async(|when, then| {
			when.method(DELETE).path("/v2/service_keys/k-1");
			then.status(404);
		})
		.await;
	let delete_instance = server
		.mock_async(|when, then| {
			when.method(DELETE)
				.path("/v2/service_instances/guid-1")
				.query_param("accepts_incomplete", "true");
			then.status(202);
		})
		.await;
	let client = build_test_client(&server.base_url());
	let bindings = client.get_bindings_for_instance("guid-1").await.expect("Bindings should load.");
	let keys = client.get_service_keys_for_instance("guid-1").await.expect("Keys should load.");

	assert_eq!(bindings, [
		Binding { guid: "b-1".into(), app_guid: "app-1".into() },
		Binding { guid: "b-2".into(), app_guid: "app-2".into() },
	]);
	assert_eq!(keys.len(), 1);

	client.delete_binding(&bindings[0]).await.expect("Binding delete should succeed.");
	client.delete_service_key(&keys[0]).await.expect("Already-deleted key should succeed.");
	client.delete_service_instance("guid-1").await.expect("Instance delete should succeed.");

	delete_binding.assert_calls_async(1).await;
	delete_key.assert_calls_async(1).await;
	delete_instance.assert_calls_async(1).await;
}
