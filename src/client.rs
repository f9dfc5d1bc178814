//! High-level provider client: configuration surface plus the typed API operations.

// self
use crate::{
	_prelude::*,
	api::{
		AirtimeTransferRequest, AirtimeTransferResponse, BalanceResponse, CollectRequest,
		CollectResponse, HistoryEntry, HistoryRequest, PaymentLinkRequest, PaymentLinkResponse,
		Transaction, WithdrawRequest, WithdrawResponse,
	},
	auth::AuthStrategy,
	error::ConfigError,
	http::{HttpTransport, Method},
	token::{
		TokenStore,
		classify::{DefaultTokenErrorClassifier, TokenErrorClassifier},
	},
	transport::AuthenticatedTransport,
};

/// Sandbox API base URL.
pub const DEMO_BASE_URL: &str = "https://demo.campay.net/api/";
/// Production API base URL.
pub const LIVE_BASE_URL: &str = "https://www.campay.net/api/";
/// Default ceiling for refresh-and-retry cycles (and in-refresh re-attempts).
pub const DEFAULT_MAX_REFRESH_RETRIES: u32 = 2;

/// Asynchronous client for the provider's mobile-money API.
///
/// Construct one per credential set with [`CampayClient::builder`]; the client
/// owns its token cache, so separate instances never share authentication state.
#[derive(Debug)]
pub struct CampayClient {
	transport: AuthenticatedTransport,
}
impl CampayClient {
	/// Returns a builder seeded with the sandbox base URL and default retry budget.
	pub fn builder() -> CampayClientBuilder {
		CampayClientBuilder::new()
	}

	/// Authenticated transport used by every operation.
	///
	/// Exposed so callers can issue requests against endpoints this crate does not
	/// model, with the same authentication and retry behavior.
	pub fn transport(&self) -> &AuthenticatedTransport {
		&self.transport
	}

	/// Requests a payment from a subscriber; they approve it on their handset.
	pub async fn collect(&self, request: &CollectRequest) -> Result<CollectResponse> {
		self.transport.send_as(Method::Post, "collect/", Some(request)).await
	}

	/// Sends funds to a subscriber.
	pub async fn withdraw(&self, request: &WithdrawRequest) -> Result<WithdrawResponse> {
		self.transport.send_as(Method::Post, "withdraw/", Some(request)).await
	}

	/// Fetches the application balance, broken down by operator.
	pub async fn balance(&self) -> Result<BalanceResponse> {
		self.transport.send_as::<serde_json::Value, _>(Method::Get, "balance/", None).await
	}

	/// Creates a hosted payment link.
	pub async fn payment_link(&self, request: &PaymentLinkRequest) -> Result<PaymentLinkResponse> {
		self.transport.send_as(Method::Post, "get_link/", Some(request)).await
	}

	/// Fetches the current state of a transaction by its provider reference.
	pub async fn transaction_status(&self, reference: &str) -> Result<Transaction> {
		let path = format!("transaction/{reference}/");

		self.transport.send_as::<serde_json::Value, _>(Method::Get, &path, None).await
	}

	/// Fetches the transaction history between two dates (inclusive, `YYYY-MM-DD`).
	pub async fn history(&self, request: &HistoryRequest) -> Result<Vec<HistoryEntry>> {
		self.transport.send_as(Method::Post, "history/", Some(request)).await
	}

	/// Transfers airtime to a subscriber.
	pub async fn transfer_airtime(
		&self,
		request: &AirtimeTransferRequest,
	) -> Result<AirtimeTransferResponse> {
		self.transport.send_as(Method::Post, "utilities/airtime/transfer/", Some(request)).await
	}
}

/// Builder for [`CampayClient`] values.
///
/// Credential validation happens in [`build`](CampayClientBuilder::build):
/// constructing a client with neither a permanent token nor a full
/// username/password pair is a configuration error raised there, not at call
/// time.
pub struct CampayClientBuilder {
	base_url: String,
	strategy: Option<AuthStrategy>,
	max_refresh_retries: u32,
	classifier: Option<Arc<dyn TokenErrorClassifier>>,
	http: Option<Arc<dyn HttpTransport>>,
}
impl CampayClientBuilder {
	/// Creates a builder seeded with the sandbox base URL and default retry budget.
	pub fn new() -> Self {
		Self {
			base_url: DEMO_BASE_URL.into(),
			strategy: None,
			max_refresh_retries: DEFAULT_MAX_REFRESH_RETRIES,
			classifier: None,
			http: None,
		}
	}

	/// Overrides the API base URL (see [`DEMO_BASE_URL`] and [`LIVE_BASE_URL`]).
	pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
		self.base_url = base_url.into();

		self
	}

	/// Sets the authentication strategy; exactly one arm must be configured.
	pub fn auth_strategy(mut self, strategy: AuthStrategy) -> Self {
		self.strategy = Some(strategy);

		self
	}

	/// Overrides the retry budget shared by the 401 retry loop and the in-refresh
	/// re-attempts (the two counters stay independent per call).
	pub fn max_refresh_retries(mut self, budget: u32) -> Self {
		self.max_refresh_retries = budget;

		self
	}

	/// Overrides the token-exchange failure classifier.
	pub fn token_error_classifier(mut self, classifier: Arc<dyn TokenErrorClassifier>) -> Self {
		self.classifier = Some(classifier);

		self
	}

	/// Overrides the HTTP transport (defaults to the built-in reqwest transport).
	pub fn http_transport(mut self, http: Arc<dyn HttpTransport>) -> Self {
		self.http = Some(http);

		self
	}

	/// Consumes the builder, validates the configuration, and constructs the client.
	pub fn build(self) -> Result<CampayClient, ConfigError> {
		let base_url = normalize_base_url(&self.base_url)?;
		let strategy = self.strategy.ok_or(ConfigError::MissingAuthStrategy)?;

		strategy.validate()?;

		let http = match self.http {
			Some(http) => http,
			None => default_http_transport()?,
		};
		let transport = match strategy {
			AuthStrategy::PermanentToken(secret) => AuthenticatedTransport::with_permanent_token(
				http,
				base_url,
				secret,
				self.max_refresh_retries,
			),
			AuthStrategy::PasswordGrant { username, password } => {
				let token_endpoint = base_url.join("token/").map_err(|source| {
					ConfigError::InvalidEndpoint { path: "token/".into(), source }
				})?;
				let classifier = self
					.classifier
					.unwrap_or_else(|| Arc::new(DefaultTokenErrorClassifier));
				let store = Arc::new(TokenStore::new(
					http.clone(),
					token_endpoint,
					username,
					password,
					classifier,
					self.max_refresh_retries,
				));

				AuthenticatedTransport::with_token_store(
					http,
					base_url,
					store,
					self.max_refresh_retries,
				)
			},
		};

		Ok(CampayClient { transport })
	}
}
impl Default for CampayClientBuilder {
	fn default() -> Self {
		Self::new()
	}
}
impl Debug for CampayClientBuilder {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("CampayClientBuilder")
			.field("base_url", &self.base_url)
			.field("strategy_set", &self.strategy.is_some())
			.field("max_refresh_retries", &self.max_refresh_retries)
			.finish()
	}
}

fn normalize_base_url(base_url: &str) -> Result<Url, ConfigError> {
	let mut url =
		Url::parse(base_url).map_err(|source| ConfigError::InvalidBaseUrl { source })?;

	// Url::join drops the last path segment unless the base ends with a slash.
	if !url.path().ends_with('/') {
		let path = format!("{}/", url.path());

		url.set_path(&path);
	}

	Ok(url)
}

fn default_http_transport() -> Result<Arc<dyn HttpTransport>, ConfigError> {
	#[cfg(feature = "reqwest")]
	{
		Ok(Arc::new(crate::http::ReqwestHttpTransport::default()))
	}
	#[cfg(not(feature = "reqwest"))]
	{
		Err(ConfigError::MissingHttpTransport)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn base_urls_gain_a_trailing_slash() {
		let url = normalize_base_url("https://demo.campay.net/api")
			.expect("Base URL without a trailing slash should normalize.");

		assert_eq!(url.as_str(), "https://demo.campay.net/api/");

		let untouched = normalize_base_url(DEMO_BASE_URL)
			.expect("Canonical base URL should parse unchanged.");

		assert_eq!(untouched.as_str(), DEMO_BASE_URL);
	}

	#[test]
	fn invalid_base_urls_are_rejected() {
		assert!(matches!(
			normalize_base_url("not a url"),
			Err(ConfigError::InvalidBaseUrl { .. }),
		));
	}

	#[cfg(feature = "reqwest")]
	#[test]
	fn build_requires_an_auth_strategy() {
		assert!(matches!(
			CampayClient::builder().build(),
			Err(ConfigError::MissingAuthStrategy),
		));
	}

	#[cfg(feature = "reqwest")]
	#[test]
	fn build_rejects_incomplete_credentials() {
		let result = CampayClient::builder()
			.auth_strategy(AuthStrategy::password_grant("app", ""))
			.build();

		assert!(matches!(result, Err(ConfigError::EmptyCredential { field: "password" })));
	}

	#[cfg(feature = "reqwest")]
	#[test]
	fn password_grant_clients_carry_a_token_store() {
		let client = CampayClient::builder()
			.auth_strategy(AuthStrategy::password_grant("app", "s3cret"))
			.build()
			.expect("Password-grant client should build.");

		assert!(client.transport().token_store().is_some());

		let permanent = CampayClient::builder()
			.auth_strategy(AuthStrategy::permanent_token("perm-key"))
			.build()
			.expect("Permanent-token client should build.");

		assert!(permanent.transport().token_store().is_none());
	}
}
