//! Transport primitives for provider HTTP calls.
//!
//! The module exposes [`HttpTransport`] alongside [`OutboundRequest`] and
//! [`RawResponse`] so downstream crates can integrate custom HTTP clients. The
//! contract is deliberately small: implementations return a [`RawResponse`] for
//! every HTTP status the provider answers with, and reserve [`TransportError`]
//! for failures where no response was received at all. Authorization-failure
//! classification happens above the transport, never inside it.

// std
use std::ops::Deref;
// self
use crate::{_prelude::*, error::TransportError};

/// Boxed future returned by [`HttpTransport::request`].
pub type TransportFuture<'a> =
	Pin<Box<dyn Future<Output = Result<RawResponse, TransportError>> + 'a + Send>>;

/// HTTP methods used by the provider's API surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Method {
	/// `GET` request.
	Get,
	/// `POST` request.
	Post,
}
impl Method {
	/// Returns the canonical wire representation of the method.
	pub const fn as_str(self) -> &'static str {
		match self {
			Method::Get => "GET",
			Method::Post => "POST",
		}
	}
}
impl Display for Method {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Fully assembled request handed to an [`HttpTransport`] implementation.
///
/// The body, when present, is already JSON-encoded; headers carry the
/// authorization and content negotiation values decided by the caller.
#[derive(Clone, Debug)]
pub struct OutboundRequest {
	/// HTTP method for the call.
	pub method: Method,
	/// Absolute endpoint URL.
	pub url: Url,
	/// Header name/value pairs attached to the call.
	pub headers: Vec<(&'static str, String)>,
	/// JSON-encoded request body, when the call carries one.
	pub body: Option<Vec<u8>>,
}

/// Raw provider response captured by a transport: status code plus body bytes.
#[derive(Clone, Debug)]
pub struct RawResponse {
	/// HTTP status code returned by the provider.
	pub status: u16,
	/// Raw response body.
	pub body: Vec<u8>,
}
impl RawResponse {
	/// Returns `true` for 2xx statuses.
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}

	/// Returns `true` for HTTP 401, the only status that triggers a token refresh.
	pub fn is_unauthorized(&self) -> bool {
		self.status == 401
	}
}

/// Abstraction over HTTP stacks capable of executing provider calls.
///
/// The trait acts as the client's only dependency on an HTTP implementation.
/// Callers provide one (typically behind `Arc<dyn HttpTransport>`) and the
/// token store and authenticated transport share it for token exchanges and
/// business calls alike. Implementations must be `Send + Sync` so a single
/// transport can serve concurrent calls without additional wrappers.
pub trait HttpTransport
where
	Self: Send + Sync,
{
	/// Executes `request` and resolves with the provider's raw response.
	///
	/// Every received HTTP status, including 4xx and 5xx, must resolve as
	/// `Ok(RawResponse)`; `Err(TransportError)` is reserved for
	/// request-sent-no-response failures (DNS, TCP, TLS, timeouts).
	fn request(&self, request: OutboundRequest) -> TransportFuture<'_>;
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
///
/// The client follows reqwest's defaults; configure timeouts or TLS on a custom
/// [`ReqwestClient`] and pass it through [`ReqwestHttpTransport::with_client`].
#[cfg(feature = "reqwest")]
#[derive(Clone, Default)]
pub struct ReqwestHttpTransport(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestHttpTransport {
	/// Wraps an existing [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestHttpTransport {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestHttpTransport {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl HttpTransport for ReqwestHttpTransport {
	fn request(&self, request: OutboundRequest) -> TransportFuture<'_> {
		let client = self.0.clone();

		Box::pin(async move {
			let method = match request.method {
				Method::Get => reqwest::Method::GET,
				Method::Post => reqwest::Method::POST,
			};
			let mut builder = client.request(method, request.url);

			for (name, value) in &request.headers {
				builder = builder.header(*name, value.as_str());
			}
			if let Some(body) = request.body {
				builder = builder.body(body);
			}

			let response = builder.send().await.map_err(TransportError::from)?;
			let status = response.status().as_u16();
			let body = response.bytes().await.map_err(TransportError::from)?.to_vec();

			Ok(RawResponse { status, body })
		})
	}
}
