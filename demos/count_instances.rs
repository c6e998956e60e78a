//! Counts the instances of every plan of an offering against a mocked control plane that
//! authenticates through a client-credentials UAA grant.

// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use serde_json::json;
// self
use cf_broker_client::config::CfConfig;

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth/token");
			then.status(200).json_body(json!({"access_token": "demo-token", "expires_in": 900}));
		})
		.await;

	server
		.mock_async(|when, then| {
			when.method(GET).path("/v2/services");
			then.status(200).json_body(json!({
				"next_url": null,
				"resources": [{
					"metadata": {"guid": "svc-guid"},
					"entity": {"unique_id": "demo-offering", "service_plans_url": "/v2/services/svc-guid/service_plans"}
				}]
			}));
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(GET).path("/v2/services/svc-guid/service_plans");
			then.status(200).json_body(json!({
				"next_url": null,
				"resources": [
					{"metadata": {"guid": "small-guid"}, "entity": {"unique_id": "small", "name": "small", "service_instances_url": "/v2/service_plans/small-guid/service_instances"}},
					{"metadata": {"guid": "large-guid"}, "entity": {"unique_id": "large", "name": "large", "service_instances_url": "/v2/service_plans/large-guid/service_instances"}}
				]
			}));
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(GET).path("/v2/service_plans/small-guid/service_instances");
			then.status(200).json_body(json!({"total_results": 4, "next_url": null, "resources": []}));
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(GET).path("/v2/service_plans/large-guid/service_instances");
			then.status(200).json_body(json!({"total_results": 1, "next_url": null, "resources": []}));
		})
		.await;

	let config: CfConfig = serde_json::from_value(json!({
		"url": server.base_url(),
		"uaa": {
			"url": server.base_url(),
			"authentication": {
				"client_credentials": {"client_id": "demo-broker", "client_secret": "super-secret"}
			}
		}
	}))?;
	let client = config.build_client(2)?;
	let counts = client.count_instances_of_service_offering("demo-offering").await?;

	for (plan, count) in &counts {
		println!("Plan {} has {count} instance(s).", plan.entity.name);
	}

	token_mock.assert_async().await;

	Ok(())
}
