//! Access-token cache and on-demand exchange for the password-grant strategy.
//!
//! [`TokenStore`] owns the only mutable state in the crate: the most recently
//! minted access token. It is constructed once per configured client (never a
//! process-wide singleton) and shared by handle with the authenticated
//! transport. The store does not decide when a cached token is stale; that
//! decision belongs to the transport, which reacts to observed 401s by calling
//! [`TokenStore::refresh`]. Concurrent cold-cache callers coalesce on a
//! single-flight guard so only one exchange is in flight at a time.

pub mod classify;

mod metrics;

pub use metrics::RefreshMetrics;

// self
use crate::{
	_prelude::*,
	api::{AccessTokenRequest, AccessTokenResponse},
	auth::TokenSecret,
	error::{ConfigError, TransientError, extract_provider_message},
	http::{HttpTransport, Method, OutboundRequest},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	token::classify::{TokenErrorClassifier, TokenErrorContext, TokenErrorKind},
};

/// Access token minted by the provider, together with the instant it was obtained.
///
/// The record carries the provider's `expires_in` hint for observability, but no
/// local clock decision is derived from it: staleness is discovered reactively
/// when the provider answers 401.
#[derive(Clone, Debug)]
pub struct AccessToken {
	/// Token value; callers must avoid logging it.
	pub secret: TokenSecret,
	/// Instant the token exchange resolved.
	pub obtained_at: OffsetDateTime,
	/// Lifetime hint reported by the provider.
	pub expires_in: Duration,
}

/// Caches the current access token and exchanges credentials for a fresh one on demand.
pub struct TokenStore {
	http: Arc<dyn HttpTransport>,
	token_endpoint: Url,
	username: String,
	password: String,
	classifier: Arc<dyn TokenErrorClassifier>,
	max_refresh_retries: u32,
	cached: RwLock<Option<AccessToken>>,
	refresh_guard: AsyncMutex<()>,
	metrics: RefreshMetrics,
}
impl TokenStore {
	/// Creates a store for the provided credentials and token endpoint.
	pub fn new(
		http: Arc<dyn HttpTransport>,
		token_endpoint: Url,
		username: impl Into<String>,
		password: impl Into<String>,
		classifier: Arc<dyn TokenErrorClassifier>,
		max_refresh_retries: u32,
	) -> Self {
		Self {
			http,
			token_endpoint,
			username: username.into(),
			password: password.into(),
			classifier,
			max_refresh_retries,
			cached: RwLock::new(None),
			refresh_guard: AsyncMutex::new(()),
			metrics: RefreshMetrics::default(),
		}
	}

	/// Returns a snapshot of the cached token, if one has been minted.
	pub fn cached_token(&self) -> Option<AccessToken> {
		self.cached.read().clone()
	}

	/// Shared counters for exchange attempts and outcomes.
	pub fn metrics(&self) -> &RefreshMetrics {
		&self.metrics
	}

	/// Returns the cached token, minting one first when the cache is empty.
	///
	/// Does not judge cached tokens for staleness; a stale-but-present value is
	/// returned as-is and corrected later through [`TokenStore::refresh`] once the
	/// provider rejects it.
	pub async fn access_token(&self) -> Result<TokenSecret> {
		self.metrics.record_attempt();

		if let Some(token) = self.cached_token() {
			self.metrics.record_success();

			return Ok(token.secret);
		}

		let _singleflight = self.refresh_guard.lock().await;

		// A concurrent caller may have minted a token while this one waited on the guard.
		if let Some(token) = self.cached_token() {
			self.metrics.record_success();

			return Ok(token.secret);
		}

		self.exchange_and_store("access_token").await
	}

	/// Unconditionally exchanges the credentials for a new token.
	///
	/// On success the cached value is overwritten and the fresh secret returned; on
	/// failure the previous cached value stays untouched and the failure propagates.
	pub async fn refresh(&self) -> Result<TokenSecret> {
		self.metrics.record_attempt();

		let _singleflight = self.refresh_guard.lock().await;

		self.exchange_and_store("refresh").await
	}

	async fn exchange_and_store(&self, stage: &'static str) -> Result<TokenSecret> {
		const KIND: FlowKind = FlowKind::Refresh;

		let span = FlowSpan::new(KIND, stage);

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				// Bounded re-attempts of the token call itself. This counter is
				// invisible to the transport's 401 budget; the two never mix.
				let mut attempt = 0u32;

				loop {
					match self.exchange_once().await {
						Ok(token) => {
							let secret = token.secret.clone();

							*self.cached.write() = Some(token);

							return Ok(secret);
						},
						Err(ExchangeFailure::Terminal(error)) => return Err(error),
						Err(ExchangeFailure::Transient(_)) if attempt < self.max_refresh_retries =>
							attempt += 1,
						Err(ExchangeFailure::Transient(error)) => return Err(error.into()),
					}
				}
			})
			.await;

		match &result {
			Ok(_) => {
				self.metrics.record_success();
				obs::record_flow_outcome(KIND, FlowOutcome::Success);
			},
			Err(_) => {
				self.metrics.record_failure();
				obs::record_flow_outcome(KIND, FlowOutcome::Failure);
			},
		}

		result
	}

	async fn exchange_once(&self) -> Result<AccessToken, ExchangeFailure> {
		let payload = AccessTokenRequest { username: &self.username, password: &self.password };
		let body = serde_json::to_vec(&payload).map_err(|source| {
			ExchangeFailure::Terminal(ConfigError::RequestEncode { source }.into())
		})?;
		let request = OutboundRequest {
			method: Method::Post,
			url: self.token_endpoint.clone(),
			headers: vec![
				("Content-Type", "application/json".into()),
				("Accept", "application/json".into()),
			],
			body: Some(body),
		};
		let response = match self.http.request(request).await {
			Ok(response) => response,
			Err(error) =>
				return Err(self.classify_failure(
					TokenErrorContext::network_failure(),
					None,
					error.to_string(),
				)),
		};

		if !response.is_success() {
			let body_text = String::from_utf8_lossy(&response.body).into_owned();
			let ctx =
				TokenErrorContext::new().with_http_status(response.status).with_body(body_text);
			let message = extract_provider_message(&response.body)
				.unwrap_or_else(|| format!("HTTP {}", response.status));

			return Err(self.classify_failure(ctx, Some(response.status), message));
		}

		let mut deserializer = serde_json::Deserializer::from_slice(&response.body);
		let parsed: AccessTokenResponse = serde_path_to_error::deserialize(&mut deserializer)
			.map_err(|source| {
				ExchangeFailure::Transient(TransientError::TokenResponseParse {
					source,
					status: Some(response.status),
				})
			})?;

		Ok(AccessToken {
			secret: TokenSecret::new(parsed.token),
			obtained_at: OffsetDateTime::now_utc(),
			expires_in: Duration::seconds(i64::try_from(parsed.expires_in).unwrap_or(i64::MAX)),
		})
	}

	fn classify_failure(
		&self,
		ctx: TokenErrorContext,
		status: Option<u16>,
		message: String,
	) -> ExchangeFailure {
		match self.classifier.classify(&ctx) {
			TokenErrorKind::InvalidCredentials =>
				ExchangeFailure::Terminal(Error::InvalidCredentials { reason: message }),
			TokenErrorKind::Transient =>
				ExchangeFailure::Transient(TransientError::TokenEndpoint { message, status }),
		}
	}
}
impl Debug for TokenStore {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenStore")
			.field("token_endpoint", &self.token_endpoint.as_str())
			.field("username", &self.username)
			.field("max_refresh_retries", &self.max_refresh_retries)
			.field("cached", &self.cached_token().is_some())
			.finish()
	}
}

enum ExchangeFailure {
	Terminal(Error),
	Transient(TransientError),
}
