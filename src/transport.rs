//! Authenticated request layer: header attachment, 401 detection, and the bounded
//! refresh-and-retry loop.
//!
//! [`AuthenticatedTransport`] wraps a generic [`HttpTransport`] and implements the
//! contract every business call goes through: attach the correct `Authorization`
//! header for the configured strategy, execute the call, and retry exactly the
//! failures caused by an expired token. Only HTTP 401 under the password-grant
//! strategy triggers a token refresh; every other failure (including a 401 under
//! a permanent token, which has nothing to refresh) propagates to the caller
//! untouched so callers can apply their own policy.

// crates.io
use serde::de::DeserializeOwned;
// self
use crate::{
	_prelude::*,
	auth::{TokenSecret, strategy},
	error::{ConfigError, UpstreamError},
	http::{HttpTransport, Method, OutboundRequest, RawResponse},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	token::TokenStore,
};

/// Issues authenticated calls against the provider's business endpoints.
pub struct AuthenticatedTransport {
	http: Arc<dyn HttpTransport>,
	base_url: Url,
	credentials: CredentialSource,
	max_unauthorized_retries: u32,
}
impl AuthenticatedTransport {
	/// Creates a transport that authenticates with a permanent access token.
	///
	/// The token is attached verbatim to every call and never refreshed; no token
	/// store exists under this strategy.
	pub fn with_permanent_token(
		http: Arc<dyn HttpTransport>,
		base_url: Url,
		token: TokenSecret,
		max_unauthorized_retries: u32,
	) -> Self {
		Self {
			http,
			base_url,
			credentials: CredentialSource::Static(token),
			max_unauthorized_retries,
		}
	}

	/// Creates a transport that mints short-lived tokens through `store`.
	pub fn with_token_store(
		http: Arc<dyn HttpTransport>,
		base_url: Url,
		store: Arc<TokenStore>,
		max_unauthorized_retries: u32,
	) -> Self {
		Self {
			http,
			base_url,
			credentials: CredentialSource::Grant(store),
			max_unauthorized_retries,
		}
	}

	/// Base URL every endpoint path is resolved against.
	pub fn base_url(&self) -> &Url {
		&self.base_url
	}

	/// Token store backing the password-grant strategy, when configured.
	pub fn token_store(&self) -> Option<&Arc<TokenStore>> {
		match &self.credentials {
			CredentialSource::Static(_) => None,
			CredentialSource::Grant(store) => Some(store),
		}
	}

	/// Sends an authenticated request and returns the provider's JSON verbatim.
	pub async fn send(
		&self,
		method: Method,
		path: &str,
		body: Option<&serde_json::Value>,
	) -> Result<serde_json::Value> {
		self.send_as(method, path, body).await
	}

	/// Sends an authenticated request and decodes the response into `T`.
	pub async fn send_as<B, T>(&self, method: Method, path: &str, body: Option<&B>) -> Result<T>
	where
		B: ?Sized + Serialize,
		T: DeserializeOwned,
	{
		const KIND: FlowKind = FlowKind::Request;

		let span = FlowSpan::new(KIND, "send");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span.instrument(self.dispatch(method, path, body)).await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}

	async fn dispatch<B, T>(&self, method: Method, path: &str, body: Option<&B>) -> Result<T>
	where
		B: ?Sized + Serialize,
		T: DeserializeOwned,
	{
		let url = self.endpoint_url(path)?;
		let payload = body
			.map(serde_json::to_vec)
			.transpose()
			.map_err(|source| ConfigError::RequestEncode { source })?;
		let mut authorization = match &self.credentials {
			CredentialSource::Static(secret) => strategy::authorization_value(secret),
			CredentialSource::Grant(store) =>
				strategy::authorization_value(&store.access_token().await?),
		};
		// Counts consumed 401 retries only; the token store applies its own bounded
		// counter to the exchange call itself, and the two never mix.
		let mut attempt = 0u32;

		loop {
			let request = OutboundRequest {
				method,
				url: url.clone(),
				headers: vec![
					("Authorization", authorization.clone()),
					("Content-Type", "application/json".into()),
					("Accept", "application/json".into()),
				],
				body: payload.clone(),
			};
			let response = self
				.http
				.request(request)
				.await
				.map_err(|source| UpstreamError::Unreachable { source })?;

			if response.is_success() {
				return decode_response(&response);
			}
			if response.is_unauthorized() {
				if let CredentialSource::Grant(store) = &self.credentials {
					if attempt < self.max_unauthorized_retries {
						// Force a mint; the stale cached value must not be reused here.
						authorization = strategy::authorization_value(&store.refresh().await?);
						attempt += 1;

						continue;
					}

					return Err(Error::UnauthorizedRetryExhausted { attempts: attempt });
				}
			}

			return Err(UpstreamError::rejected(response.status, &response.body).into());
		}
	}

	fn endpoint_url(&self, path: &str) -> Result<Url, ConfigError> {
		self.base_url
			.join(path.trim_start_matches('/'))
			.map_err(|source| ConfigError::InvalidEndpoint { path: path.into(), source })
	}
}
impl Debug for AuthenticatedTransport {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		let strategy = match &self.credentials {
			CredentialSource::Static(_) => "permanent_token",
			CredentialSource::Grant(_) => "password_grant",
		};

		f.debug_struct("AuthenticatedTransport")
			.field("base_url", &self.base_url.as_str())
			.field("strategy", &strategy)
			.field("max_unauthorized_retries", &self.max_unauthorized_retries)
			.finish()
	}
}

enum CredentialSource {
	Static(TokenSecret),
	Grant(Arc<TokenStore>),
}

fn decode_response<T>(response: &RawResponse) -> Result<T>
where
	T: DeserializeOwned,
{
	let body: &[u8] = if response.body.is_empty() { b"null" } else { &response.body };
	let mut deserializer = serde_json::Deserializer::from_slice(body);

	serde_path_to_error::deserialize(&mut deserializer).map_err(|source| {
		UpstreamError::MalformedResponse { status: response.status, source }.into()
	})
}
