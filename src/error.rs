//! Client-level error types shared across the token store, transport, and API surface.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical client error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Token endpoint rejected the configured credentials; never retried.
	#[error("Provider rejected the configured credentials: {reason}.")]
	InvalidCredentials {
		/// Provider-supplied reason string, when one could be extracted from the error body.
		reason: String,
	},
	/// Token exchange failed for a non-credentials reason after the bounded in-refresh retries.
	#[error(transparent)]
	RefreshTransient(#[from] TransientError),
	/// Business call kept answering 401 after the retry budget was consumed.
	#[error("Request stayed unauthorized after {attempts} refresh-and-retry cycles.")]
	UnauthorizedRetryExhausted {
		/// Number of refresh-and-retry cycles performed before giving up.
		attempts: u32,
	},
	/// Any other upstream failure, surfaced without retries.
	#[error(transparent)]
	Upstream(#[from] UpstreamError),
}

/// Configuration and validation failures raised at construction or request-build time.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// Base URL could not be parsed.
	#[error("Base URL is invalid.")]
	InvalidBaseUrl {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Endpoint path could not be joined onto the base URL.
	#[error("Endpoint path `{path}` is invalid.")]
	InvalidEndpoint {
		/// Offending path segment.
		path: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// No authentication strategy was supplied to the builder.
	#[error(
		"An authentication strategy is required: configure a permanent access token or a username/password pair."
	)]
	MissingAuthStrategy,
	/// A supplied credential is empty.
	#[error("Credential field `{field}` must not be empty.")]
	EmptyCredential {
		/// Name of the offending credential field.
		field: &'static str,
	},
	/// No HTTP transport available; supply one or enable the `reqwest` feature.
	#[error("No HTTP transport was configured.")]
	MissingHttpTransport,
	/// Request payload could not be encoded as JSON.
	#[error("Request payload could not be encoded as JSON.")]
	RequestEncode {
		/// Underlying serialization failure.
		#[source]
		source: serde_json::Error,
	},
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Temporary token-exchange failure variants (retried inside the refresh path).
#[derive(Debug, ThisError)]
pub enum TransientError {
	/// Token endpoint returned an unexpected but non-terminal response.
	#[error("Token endpoint returned an unexpected response: {message}.")]
	TokenEndpoint {
		/// Provider- or client-supplied message summarizing the failure.
		message: String,
		/// HTTP status code, when a response was received.
		status: Option<u16>,
	},
	/// Token endpoint responded with malformed JSON that could not be parsed.
	#[error("Token endpoint returned malformed JSON.")]
	TokenResponseParse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
}

/// Transport-level failures (DNS, TCP, TLS, timeouts) emitted by [`HttpTransport`]
/// implementations.
///
/// [`HttpTransport`]: crate::http::HttpTransport
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure before any response arrived.
	#[error("Network error occurred while contacting the provider.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while contacting the provider.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}

/// Failures of authenticated business calls, surfaced verbatim and never retried.
#[derive(Debug, ThisError)]
pub enum UpstreamError {
	/// Provider received the request and rejected it with a non-2xx status.
	#[error("Provider rejected the request with HTTP {status}: {message}.")]
	Rejected {
		/// HTTP status code of the rejection.
		status: u16,
		/// Message extracted from the provider's error body, or a body/status summary.
		message: String,
	},
	/// Provider answered 2xx but the body could not be decoded.
	#[error("Provider returned malformed JSON for a successful request.")]
	MalformedResponse {
		/// HTTP status code of the response.
		status: u16,
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// Request never reached the provider; no response was received at all.
	#[error("Request failed. Please retry.")]
	Unreachable {
		/// Transport failure that prevented the exchange.
		#[source]
		source: TransportError,
	},
}
impl UpstreamError {
	/// Builds a [`UpstreamError::Rejected`] from a status code and raw response body,
	/// extracting the provider's message when one is present.
	pub fn rejected(status: u16, body: &[u8]) -> Self {
		let message = extract_provider_message(body)
			.unwrap_or_else(|| format!("HTTP {status} with no provider message"));

		Self::Rejected { status, message }
	}
}

const MESSAGE_PREVIEW_LIMIT: usize = 256;

/// Pulls a human-readable message out of a provider error body.
///
/// Checks the `message` and `detail` fields the provider uses on business endpoints,
/// then the first entry of a `non_field_errors` list, and finally falls back to a
/// truncated preview of the raw body.
pub fn extract_provider_message(body: &[u8]) -> Option<String> {
	if body.is_empty() {
		return None;
	}

	if let Ok(value) = serde_json::from_slice::<serde_json::Value>(body) {
		for field in ["message", "detail"] {
			if let Some(text) = value.get(field).and_then(serde_json::Value::as_str) {
				return Some(text.to_owned());
			}
		}
		if let Some(first) = value
			.get("non_field_errors")
			.and_then(serde_json::Value::as_array)
			.and_then(|entries| entries.first())
			.and_then(serde_json::Value::as_str)
		{
			return Some(first.to_owned());
		}
	}

	let text = String::from_utf8_lossy(body);
	let trimmed = text.trim();

	if trimmed.is_empty() {
		return None;
	}

	Some(truncate_message(trimmed))
}

fn truncate_message(text: &str) -> String {
	if text.chars().count() <= MESSAGE_PREVIEW_LIMIT {
		return text.to_owned();
	}

	let mut buf = String::new();

	for (idx, ch) in text.chars().enumerate() {
		if idx >= MESSAGE_PREVIEW_LIMIT {
			buf.push('…');

			break;
		}
		buf.push(ch);
	}

	buf
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn provider_message_prefers_structured_fields() {
		let body = br#"{"message":"Insufficient balance","code":"ER201"}"#;

		assert_eq!(extract_provider_message(body).as_deref(), Some("Insufficient balance"));

		let detail = br#"{"detail":"Authentication credentials were not provided."}"#;

		assert_eq!(
			extract_provider_message(detail).as_deref(),
			Some("Authentication credentials were not provided."),
		);
	}

	#[test]
	fn provider_message_reads_non_field_errors() {
		let body = br#"{"non_field_errors":["Unable to log in with provided credentials."]}"#;

		assert_eq!(
			extract_provider_message(body).as_deref(),
			Some("Unable to log in with provided credentials."),
		);
	}

	#[test]
	fn provider_message_falls_back_to_body_preview() {
		assert_eq!(
			extract_provider_message(b"gateway exploded").as_deref(),
			Some("gateway exploded"),
		);
		assert_eq!(extract_provider_message(b""), None);
		assert_eq!(extract_provider_message(b"   "), None);
	}

	#[test]
	fn rejected_summarizes_empty_bodies() {
		let err = UpstreamError::rejected(503, b"");

		assert!(err.to_string().contains("HTTP 503"));
	}

	#[test]
	fn unreachable_uses_the_retry_wording() {
		let err = UpstreamError::Unreachable {
			source: TransportError::Io(std::io::Error::other("connection reset")),
		};

		assert_eq!(err.to_string(), "Request failed. Please retry.");
	}
}
