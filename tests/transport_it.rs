// crates.io
use httpmock::prelude::*;
// self
use cf_broker_client::{
	_preludet::*,
	http::{RetryingTransport, TransportConfig},
};

#[tokio::test]
async fn suppressed_redirect_is_returned_as_response() {
	let server = MockServer::start_async().await;
	let start = server
		.mock_async(|when, then| {
			when.method(GET).path("/start");
			then.status(302).header("location", "/target");
		})
		.await;
	let target = server
		.mock_async(|when, then| {
			when.method(GET).path("/target");
			then.status(200).body("followed");
		})
		.await;
	let transport = RetryingTransport::from_config(&TransportConfig::default().without_redirects())
		.expect("Transport without redirects should build.");
	let url = Url::parse(&server.url("/start")).expect("Mock URL should parse.");
	let response = transport.get(url).await.expect("A redirect is a valid response.");

	assert_eq!(response.status, StatusCode::FOUND);
	assert_eq!(
		response.headers.get("location").and_then(|v| v.to_str().ok()),
		Some("/target")
	);

	start.assert_calls_async(1).await;
	target.assert_calls_async(0).await;
}

#[tokio::test]
async fn redirects_are_followed_by_default() {
	let server = MockServer::start_async().await;
	let target = server
		.mock_async(|when, then| {
			when.method(GET).path("/target");
			then.status(200).body("followed");
		})
		.await;

	server
		.mock_async(|when, then| {
			when.method(GET).path("/start");
			then.status(302).header("location", server.url("/target"));
		})
		.await;

	let transport = test_transport(0);
	let url = Url::parse(&server.url("/start")).expect("Mock URL should parse.");
	let response = transport.get(url).await.expect("Redirect should be followed.");

	assert_eq!(response.status, StatusCode::OK);
	assert_eq!(response.text(), "followed");

	target.assert_calls_async(1).await;
}
