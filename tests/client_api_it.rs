#![cfg(feature = "reqwest")]

// crates.io
use httpmock::prelude::*;
// self
use campay_client::{
	api::{
		AirtimeTransferRequest, CollectRequest, Currency, HistoryRequest, Operator,
		PaymentLinkRequest, TransactionStatus, WithdrawRequest,
	},
	auth::AuthStrategy,
	client::CampayClient,
	error::{Error, UpstreamError},
};

fn build_client(server: &MockServer) -> CampayClient {
	CampayClient::builder()
		.base_url(server.base_url())
		.auth_strategy(AuthStrategy::permanent_token("perm-key"))
		.build()
		.expect("Client should build against the mock server.")
}

#[tokio::test]
async fn collect_posts_the_documented_payload() {
	let server = MockServer::start_async().await;
	let client = build_client(&server);
	let mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/collect/")
				.header("Authorization", "Token perm-key")
				.header("Content-Type", "application/json")
				.json_body(serde_json::json!({
					"amount": 100,
					"from": "237670000000",
					"description": "Order #42",
					"external_reference": "order-42",
				}));
			then.status(200).header("content-type", "application/json").body(
				"{\"reference\":\"ref-1\",\"operator\":\"MTN\",\"ussd_code\":\"*126#\"}",
			);
		})
		.await;
	let request = CollectRequest {
		amount: 100,
		from: "237670000000".into(),
		description: "Order #42".into(),
		external_reference: Some("order-42".into()),
		currency: None,
		uuid: None,
	};
	let response = client.collect(&request).await.expect("Collect request should succeed.");

	assert_eq!(response.reference, "ref-1");
	assert_eq!(response.ussd_code, "*126#");

	mock.assert_async().await;
}

#[tokio::test]
async fn withdraw_and_airtime_decode_their_references() {
	let server = MockServer::start_async().await;
	let client = build_client(&server);
	let withdraw = server
		.mock_async(|when, then| {
			when.method(POST).path("/withdraw/");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"reference\":\"wd-1\"}");
		})
		.await;
	let airtime = server
		.mock_async(|when, then| {
			when.method(POST).path("/utilities/airtime/transfer/");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"reference\":\"air-1\"}");
		})
		.await;
	let withdrawal = client
		.withdraw(&WithdrawRequest {
			amount: 500,
			to: "237670000000".into(),
			description: "Payout".into(),
			external_reference: None,
		})
		.await
		.expect("Withdraw request should succeed.");
	let transfer = client
		.transfer_airtime(&AirtimeTransferRequest {
			amount: 100,
			to: "237670000000".into(),
			external_reference: None,
		})
		.await
		.expect("Airtime transfer should succeed.");

	assert_eq!(withdrawal.reference, "wd-1");
	assert_eq!(transfer.reference, "air-1");

	withdraw.assert_async().await;
	airtime.assert_async().await;
}

#[tokio::test]
async fn payment_link_returns_the_hosted_url() {
	let server = MockServer::start_async().await;
	let client = build_client(&server);
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/get_link/");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"link\":\"https://pay.example/abc\"}");
		})
		.await;
	let response = client
		.payment_link(&PaymentLinkRequest {
			amount: 2500,
			description: "Invoice 7".into(),
			redirect_url: "https://merchant.example/ok".into(),
			payment_options: "MOMO".into(),
			failure_redirect_url: "https://merchant.example/failed".into(),
			external_reference: None,
			currency: Some(Currency::Xaf),
			uuid: None,
			from: None,
			first_name: None,
			last_name: None,
			email: None,
		})
		.await
		.expect("Payment-link request should succeed.");

	assert_eq!(response.link, "https://pay.example/abc");

	mock.assert_async().await;
}

#[tokio::test]
async fn transaction_status_resolves_by_reference() {
	let server = MockServer::start_async().await;
	let client = build_client(&server);
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/transaction/tx-1/");
			then.status(200).header("content-type", "application/json").body(
				"{\"reference\":\"tx-1\",\"status\":\"SUCCESSFUL\",\"amount\":\"100\",\
				\"currency\":\"XAF\",\"operator\":\"MTN\",\"code\":\"CP1\",\
				\"operator_reference\":\"op-1\",\"endpoint\":\"collect\",\"signature\":\"sig\",\
				\"external_reference\":\"order-42\",\"external_user\":\"\",\"app_amount\":\"98\"}",
			);
		})
		.await;
	let transaction =
		client.transaction_status("tx-1").await.expect("Status lookup should succeed.");

	assert_eq!(transaction.status, TransactionStatus::Successful);
	assert_eq!(transaction.currency, Some(Currency::Xaf));
	assert_eq!(transaction.reason, None);

	mock.assert_async().await;
}

#[tokio::test]
async fn history_decodes_every_entry() {
	let server = MockServer::start_async().await;
	let client = build_client(&server);
	let mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/history/")
				.json_body(serde_json::json!({
					"start_date": "2024-01-01",
					"end_date": "2024-01-31",
				}));
			then.status(200).header("content-type", "application/json").body(
				"[{\"datetime\":\"2024-01-02 10:00\",\"code\":\"CP1\",\
				\"operator_tx_code\":\"op-1\",\"operator\":\"ORANGE\",\
				\"phone_number\":\"237690000000\",\"description\":\"Order #42\",\
				\"external_user\":\"\",\"amount\":100,\"charge_amount\":2,\"debit\":0,\
				\"credit\":98,\"status\":\"SUCCESSFUL\",\"reference_uuid\":\"uuid-1\"}]",
			);
		})
		.await;
	let entries = client
		.history(&HistoryRequest { start_date: "2024-01-01".into(), end_date: "2024-01-31".into() })
		.await
		.expect("History request should succeed.");

	assert_eq!(entries.len(), 1);
	assert_eq!(entries[0].operator, Operator::Orange);
	assert_eq!(entries[0].credit, 98.0);

	mock.assert_async().await;
}

#[tokio::test]
async fn provider_rejections_carry_the_extracted_message() {
	let server = MockServer::start_async().await;
	let client = build_client(&server);
	let _mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/balance/");
			then.status(400)
				.header("content-type", "application/json")
				.body("{\"message\":\"Invalid subscriber number\",\"code\":\"ER101\"}");
		})
		.await;
	let err = client.balance().await.expect_err("A 400 should surface as an upstream rejection.");

	match err {
		Error::Upstream(UpstreamError::Rejected { status, message }) => {
			assert_eq!(status, 400);
			assert_eq!(message, "Invalid subscriber number");
		},
		other => panic!("Unexpected error variant: {other:?}."),
	}
}
