//! Request and response shapes for the provider's API surface.
//!
//! These are wire shapes only: serde does the typing and nothing here validates
//! business rules. Optional request fields are omitted from the payload rather
//! than sent as `null`, matching what the provider accepts.

// self
use crate::_prelude::*;

/// Currencies supported by the provider.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Currency {
	/// Central African CFA franc.
	#[serde(rename = "XAF")]
	Xaf,
}

/// Mobile-money operators reachable through the provider.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operator {
	/// MTN Mobile Money.
	#[serde(rename = "MTN")]
	Mtn,
	/// Orange Money.
	#[serde(rename = "ORANGE")]
	Orange,
}

/// Lifecycle states the provider reports for a transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionStatus {
	/// Transaction failed or was rejected.
	#[serde(rename = "FAILED")]
	Failed,
	/// Transaction completed successfully.
	#[serde(rename = "SUCCESSFUL")]
	Successful,
	/// Transaction is awaiting subscriber confirmation.
	#[serde(rename = "PENDING")]
	Pending,
}

/// Credentials payload for the token endpoint.
#[derive(Clone, Debug, Serialize)]
pub struct AccessTokenRequest<'a> {
	/// Application username registered with the provider.
	pub username: &'a str,
	/// Application password registered with the provider.
	pub password: &'a str,
}

/// Success body returned by the token endpoint.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct AccessTokenResponse {
	/// Freshly minted access token.
	pub token: String,
	/// Token lifetime in seconds.
	pub expires_in: u64,
}

/// Payment collection request (subscriber is prompted to approve on their handset).
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CollectRequest {
	/// Amount to collect, in minor-free units of the currency.
	pub amount: u64,
	/// Subscriber phone number to collect from.
	pub from: String,
	/// Human-readable purpose shown to the subscriber.
	pub description: String,
	/// Caller-side correlation reference.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub external_reference: Option<String>,
	/// Transaction currency; the provider defaults to XAF.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub currency: Option<Currency>,
	/// Idempotency key for the request.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub uuid: Option<String>,
}

/// Provider acknowledgement of a collection request.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct CollectResponse {
	/// Provider-side transaction reference.
	pub reference: String,
	/// Operator the collection was routed to.
	pub operator: String,
	/// USSD code the subscriber can dial to approve the payment.
	pub ussd_code: String,
}

/// Withdrawal request pushing funds to a subscriber.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct WithdrawRequest {
	/// Amount to send.
	pub amount: u64,
	/// Subscriber phone number to credit.
	pub to: String,
	/// Human-readable purpose of the transfer.
	pub description: String,
	/// Caller-side correlation reference.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub external_reference: Option<String>,
}

/// Provider acknowledgement of a withdrawal request.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct WithdrawResponse {
	/// Provider-side transaction reference.
	pub reference: String,
}

/// Application balance broken down by operator.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct BalanceResponse {
	/// Total balance across operators.
	pub total_balance: f64,
	/// Balance held with MTN.
	pub mtn_balance: f64,
	/// Balance held with Orange.
	pub orange_balance: f64,
	/// Currency the balances are denominated in.
	pub currency: Currency,
}

/// Hosted payment-link request.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PaymentLinkRequest {
	/// Amount to collect through the link.
	pub amount: u64,
	/// Human-readable purpose shown on the payment page.
	pub description: String,
	/// URL the subscriber is sent to after a successful payment.
	pub redirect_url: String,
	/// Comma-separated payment options enabled on the page (e.g. `"MOMO,CARD"`).
	pub payment_options: String,
	/// URL the subscriber is sent to after a failed payment.
	pub failure_redirect_url: String,
	/// Caller-side correlation reference.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub external_reference: Option<String>,
	/// Transaction currency; the provider defaults to XAF.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub currency: Option<Currency>,
	/// Idempotency key for the request.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub uuid: Option<String>,
	/// Subscriber phone number to prefill.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub from: Option<String>,
	/// Subscriber first name to prefill.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub first_name: Option<String>,
	/// Subscriber last name to prefill.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub last_name: Option<String>,
	/// Subscriber email to prefill.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub email: Option<String>,
}

/// Hosted payment-link response.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct PaymentLinkResponse {
	/// URL of the hosted payment page.
	pub link: String,
}

/// Full transaction record returned by the status endpoint and webhooks.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Transaction {
	/// Provider-side transaction reference.
	pub reference: String,
	/// Current lifecycle status.
	pub status: TransactionStatus,
	/// Transaction amount, as the provider formats it.
	pub amount: String,
	/// Transaction currency, when reported.
	#[serde(default)]
	pub currency: Option<Currency>,
	/// Operator that carried the transaction.
	pub operator: String,
	/// Transaction code.
	pub code: String,
	/// Operator-side transaction reference.
	pub operator_reference: String,
	/// Endpoint that produced the transaction.
	pub endpoint: String,
	/// Provider signature over the record.
	pub signature: String,
	/// Caller-side correlation reference.
	pub external_reference: String,
	/// External user attached to the transaction, when any.
	pub external_user: String,
	/// Amount credited to the application after fees.
	pub app_amount: String,
	/// Failure reason, when the transaction did not succeed.
	#[serde(default)]
	pub reason: Option<String>,
}

/// Date-bounded transaction history request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HistoryRequest {
	/// Inclusive start date, `YYYY-MM-DD`.
	pub start_date: String,
	/// Inclusive end date, `YYYY-MM-DD`.
	pub end_date: String,
}

/// Single entry of the transaction history.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct HistoryEntry {
	/// Timestamp of the operation, as the provider formats it.
	pub datetime: String,
	/// Transaction code.
	pub code: String,
	/// Operator-side transaction code.
	pub operator_tx_code: String,
	/// Operator that carried the operation.
	pub operator: Operator,
	/// Subscriber phone number involved.
	pub phone_number: String,
	/// Human-readable description.
	pub description: String,
	/// External user attached to the operation, when any.
	pub external_user: String,
	/// Operation amount.
	pub amount: f64,
	/// Fee charged by the provider.
	pub charge_amount: f64,
	/// Amount debited from the application balance.
	pub debit: f64,
	/// Amount credited to the application balance.
	pub credit: f64,
	/// Lifecycle status of the operation.
	pub status: TransactionStatus,
	/// Provider-side reference UUID.
	pub reference_uuid: String,
}

/// Airtime transfer request.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AirtimeTransferRequest {
	/// Airtime amount to send.
	pub amount: u64,
	/// Subscriber phone number to credit.
	pub to: String,
	/// Caller-side correlation reference.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub external_reference: Option<String>,
}

/// Provider acknowledgement of an airtime transfer.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct AirtimeTransferResponse {
	/// Provider-side transaction reference.
	pub reference: String,
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn optional_request_fields_are_omitted() {
		let request = CollectRequest {
			amount: 100,
			from: "237670000000".into(),
			description: "Test collection".into(),
			external_reference: None,
			currency: None,
			uuid: None,
		};
		let payload =
			serde_json::to_value(&request).expect("Collect request should serialize to JSON.");

		assert_eq!(
			payload,
			serde_json::json!({
				"amount": 100,
				"from": "237670000000",
				"description": "Test collection",
			}),
		);
	}

	#[test]
	fn enums_match_the_provider_spelling() {
		assert_eq!(
			serde_json::to_string(&Currency::Xaf).expect("Currency should serialize."),
			"\"XAF\"",
		);

		let status: TransactionStatus = serde_json::from_str("\"SUCCESSFUL\"")
			.expect("Uppercase status should deserialize.");

		assert_eq!(status, TransactionStatus::Successful);
	}
}
