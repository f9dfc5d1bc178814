//! Pluggable classification of token-exchange failures.
//!
//! The provider marks a bad username/password pair with a structured error body
//! rather than a dedicated status code, and that shape is not guaranteed to stay
//! stable. Classification therefore lives behind [`TokenErrorClassifier`] so
//! deployments can pin their own detection when the upstream error shape drifts,
//! instead of silently degrading from terminal-fail to retry.

// self
use crate::_prelude::*;

/// Canonical categories for a failed token exchange.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenErrorKind {
	/// Provider named the credentials as the problem; terminal, never retried.
	InvalidCredentials,
	/// Failure is temporary (network, 5xx, throttling, malformed body); eligible
	/// for the bounded in-refresh retries.
	Transient,
}

/// Context passed to classifiers when a token exchange fails.
///
/// The struct intentionally keeps only primitive data (status code, body text,
/// network flag) so classifiers stay completely decoupled from any HTTP client.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenErrorContext {
	/// HTTP status code returned by the token endpoint, when available.
	pub http_status: Option<u16>,
	/// Raw response body as text, when a response was received.
	pub body: Option<String>,
	/// Indicates whether the failure originated from the network/transport layer.
	pub network_error: bool,
}
impl TokenErrorContext {
	/// Creates an empty context.
	pub fn new() -> Self {
		Self { http_status: None, body: None, network_error: false }
	}

	/// Convenience constructor for transport-level/network failures.
	pub fn network_failure() -> Self {
		let mut ctx = Self::new();

		ctx.network_error = true;

		ctx
	}

	/// Adds an HTTP status code (e.g., 400, 401, 500).
	pub fn with_http_status(mut self, status: u16) -> Self {
		self.http_status = Some(status);

		self
	}

	/// Adds the response body text.
	pub fn with_body(mut self, body: impl Into<String>) -> Self {
		self.body = Some(body.into());

		self
	}
}
impl Default for TokenErrorContext {
	fn default() -> Self {
		Self::new()
	}
}

/// Classification hook deciding whether a failed token exchange is terminal.
///
/// Implementors are required to be `Send + Sync`. The contract is narrow on
/// purpose: anything that is not a credentials rejection must classify as
/// [`TokenErrorKind::Transient`] so the refresh path can apply its bounded
/// retries and surface the failure itself.
pub trait TokenErrorClassifier: Send + Sync {
	/// Maps a failed token exchange into the client's taxonomy.
	fn classify(&self, ctx: &TokenErrorContext) -> TokenErrorKind;
}

/// Default classifier matching the provider's current error shape.
///
/// The token endpoint answers a bad username/password pair with a structured
/// body whose error values name the credentials, e.g.
/// `{"non_field_errors": ["Unable to log in with provided credentials."]}`.
/// The classifier walks every string in the body and looks for that marker;
/// network failures and unmarked responses are treated as transient.
#[derive(Debug, Default)]
pub struct DefaultTokenErrorClassifier;
impl Display for DefaultTokenErrorClassifier {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("default-token-error-classifier")
	}
}
impl TokenErrorClassifier for DefaultTokenErrorClassifier {
	fn classify(&self, ctx: &TokenErrorContext) -> TokenErrorKind {
		if ctx.network_error {
			return TokenErrorKind::Transient;
		}

		let Some(body) = ctx.body.as_deref() else {
			return TokenErrorKind::Transient;
		};
		let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
			return TokenErrorKind::Transient;
		};

		if names_credentials(&value) {
			TokenErrorKind::InvalidCredentials
		} else {
			TokenErrorKind::Transient
		}
	}
}

fn names_credentials(value: &serde_json::Value) -> bool {
	match value {
		serde_json::Value::String(text) => {
			let lowered = text.to_ascii_lowercase();

			lowered.contains("credentials") || lowered.contains("password")
		},
		serde_json::Value::Array(entries) => entries.iter().any(names_credentials),
		serde_json::Value::Object(fields) => fields
			.iter()
			.any(|(key, entry)| key == "username" || key == "password" || names_credentials(entry)),
		_ => false,
	}
}
