//! Service broker registration and lookup.

// self
use crate::{
	_prelude::*,
	cf::{BrokerRegistration, CfClient, Resource, ServiceBroker, ServiceBrokerEntity, expect_status},
	http::HttpTransport,
	obs::{self, OperationKind},
};

impl<T> CfClient<T>
where
	T: ?Sized + HttpTransport,
{
	/// Registers a new broker; the API must answer 201.
	pub async fn create_service_broker(&self, registration: &BrokerRegistration) -> Result<()> {
		obs::observe(OperationKind::Broker, "create_service_broker", async {
			let response = self.json.post("/v2/service_brokers", registration).await?;

			expect_status(&response, &[StatusCode::CREATED])
				.with_context(|| format!("failed to create service broker {}", registration.name))
		})
		.await
	}

	/// Updates the broker `broker_guid`; the API must answer 200.
	pub async fn update_service_broker(
		&self,
		broker_guid: &str,
		registration: &BrokerRegistration,
	) -> Result<()> {
		obs::observe(OperationKind::Broker, "update_service_broker", async {
			let response =
				self.json.put(&format!("/v2/service_brokers/{broker_guid}"), registration).await?;

			expect_status(&response, &[StatusCode::OK])
				.with_context(|| format!("failed to update service broker {}", registration.name))
		})
		.await
	}

	/// Deregisters the broker `broker_guid`; a broker that is already gone is not an error.
	pub async fn deregister_broker(&self, broker_guid: &str) -> Result<()> {
		obs::observe(
			OperationKind::Broker,
			"deregister_broker",
			self.json.delete(&format!("/v2/service_brokers/{broker_guid}")),
		)
		.await
	}

	/// Lists every registered broker.
	pub async fn service_brokers(&self) -> Result<Vec<ServiceBroker>> {
		obs::observe(OperationKind::Broker, "service_brokers", async {
			let resources: Vec<Resource<ServiceBrokerEntity>> = self
				.json
				.get_all("/v2/service_brokers")
				.await
				.context("failed to retrieve list of brokers")?;

			Ok(resources.into_iter().map(ServiceBroker::from).collect())
		})
		.await
	}

	/// Returns the GUID of the last broker named `broker_name`, or `None` when no broker
	/// carries that name.
	pub async fn get_service_offering_guid(&self, broker_name: &str) -> Result<Option<String>> {
		let brokers = self.service_brokers().await?;
		let guid = brokers.into_iter().rev().find(|broker| broker.name == broker_name).map(|b| b.guid);

		if guid.is_none() {
			tracing::info!(broker_name, "No service broker found with this name.");
		}

		Ok(guid)
	}
}
