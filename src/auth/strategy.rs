//! The closed choice between the provider's two authentication modes.

// self
use crate::{_prelude::*, auth::TokenSecret, error::ConfigError};

/// Scheme prefix the provider expects in `Authorization` headers, space included.
pub const AUTHORIZATION_SCHEME: &str = "Token ";

/// Closed choice of exactly one authentication mode, decided at construction.
///
/// The two arms are mutually exclusive: a permanent access token is sent
/// verbatim on every request and never refreshed, while a username/password
/// pair is used only to mint short-lived access tokens and never reaches a
/// business endpoint.
#[derive(Clone, Debug)]
pub enum AuthStrategy {
	/// Permanent credential attached verbatim to every request.
	PermanentToken(TokenSecret),
	/// Username/password pair exchanged for short-lived access tokens on demand.
	PasswordGrant {
		/// Application username registered with the provider.
		username: String,
		/// Application password registered with the provider.
		password: String,
	},
}
impl AuthStrategy {
	/// Builds the permanent-token arm from a raw secret string.
	pub fn permanent_token(value: impl Into<String>) -> Self {
		Self::PermanentToken(TokenSecret::new(value))
	}

	/// Builds the password-grant arm from a username/password pair.
	pub fn password_grant(username: impl Into<String>, password: impl Into<String>) -> Self {
		Self::PasswordGrant { username: username.into(), password: password.into() }
	}

	/// Validates that the chosen arm carries usable credentials.
	///
	/// Empty values are a configuration error at construction time, not a call-time
	/// failure (the provider would accept the request and answer 401 much later).
	pub fn validate(&self) -> Result<(), ConfigError> {
		match self {
			Self::PermanentToken(secret) if secret.is_empty() =>
				Err(ConfigError::EmptyCredential { field: "permanent_access_token" }),
			Self::PermanentToken(_) => Ok(()),
			Self::PasswordGrant { username, .. } if username.is_empty() =>
				Err(ConfigError::EmptyCredential { field: "username" }),
			Self::PasswordGrant { password, .. } if password.is_empty() =>
				Err(ConfigError::EmptyCredential { field: "password" }),
			Self::PasswordGrant { .. } => Ok(()),
		}
	}
}

/// Formats a bearer value using the provider's `Token <value>` scheme.
pub fn authorization_value(secret: &TokenSecret) -> String {
	format!("{AUTHORIZATION_SCHEME}{}", secret.expose())
}
