// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Session token configuration.
//!
//! Durations are written the way people say them: `15m`, `24h`, `30days`.

use std::fmt;
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;

pub const DEFAULT_ISSUER: &str = "doodash_api";
pub const DEFAULT_AUDIENCE: &str = "doodash_frontend";
const DEFAULT_ACCESS_TTL: Duration = Duration::from_secs(15 * 60);
const DEFAULT_REFRESH_TTL: Duration = Duration::from_secs(24 * 60 * 60);
const DEFAULT_REFRESH_REMEMBER_TTL: Duration = Duration::from_secs(720 * 60 * 60);

#[derive(Clone)]
pub struct AuthConfig {
	/// HMAC signing secret. Required to issue or validate tokens.
	pub token_secret: Option<String>,
	pub issuer: String,
	pub audience: String,
	pub access_ttl: Duration,
	pub refresh_ttl: Duration,
	/// Refresh lifetime when the user asked to be remembered.
	pub refresh_remember_ttl: Duration,
}

impl Default for AuthConfig {
	fn default() -> Self {
		AuthConfigLayer::default().finalize()
	}
}

impl AuthConfig {
	/// The signing secret, for commands that issue or validate tokens.
	pub fn require_token_secret(&self) -> Result<&str, ConfigError> {
		self.token_secret.as_deref().ok_or_else(|| {
			ConfigError::Validation(
				"auth.token_secret is required (DOODASH_SERVER_AUTH_TOKEN_SECRET)".to_string(),
			)
		})
	}
}

impl fmt::Debug for AuthConfig {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("AuthConfig")
			.field("token_secret", &self.token_secret.as_ref().map(|_| "[REDACTED]"))
			.field("issuer", &self.issuer)
			.field("audience", &self.audience)
			.field("access_ttl", &self.access_ttl)
			.field("refresh_ttl", &self.refresh_ttl)
			.field("refresh_remember_ttl", &self.refresh_remember_ttl)
			.finish()
	}
}

#[derive(Clone, Default, Deserialize)]
pub struct AuthConfigLayer {
	#[serde(default)]
	pub token_secret: Option<String>,
	#[serde(default)]
	pub issuer: Option<String>,
	#[serde(default)]
	pub audience: Option<String>,
	#[serde(default, deserialize_with = "humantime_opt::deserialize")]
	pub access_ttl: Option<Duration>,
	#[serde(default, deserialize_with = "humantime_opt::deserialize")]
	pub refresh_ttl: Option<Duration>,
	#[serde(default, deserialize_with = "humantime_opt::deserialize")]
	pub refresh_remember_ttl: Option<Duration>,
}

impl fmt::Debug for AuthConfigLayer {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("AuthConfigLayer")
			.field("token_secret", &self.token_secret.as_ref().map(|_| "[REDACTED]"))
			.field("issuer", &self.issuer)
			.field("audience", &self.audience)
			.field("access_ttl", &self.access_ttl)
			.field("refresh_ttl", &self.refresh_ttl)
			.field("refresh_remember_ttl", &self.refresh_remember_ttl)
			.finish()
	}
}

impl AuthConfigLayer {
	pub fn merge(&mut self, other: AuthConfigLayer) {
		if other.token_secret.is_some() {
			self.token_secret = other.token_secret;
		}
		if other.issuer.is_some() {
			self.issuer = other.issuer;
		}
		if other.audience.is_some() {
			self.audience = other.audience;
		}
		if other.access_ttl.is_some() {
			self.access_ttl = other.access_ttl;
		}
		if other.refresh_ttl.is_some() {
			self.refresh_ttl = other.refresh_ttl;
		}
		if other.refresh_remember_ttl.is_some() {
			self.refresh_remember_ttl = other.refresh_remember_ttl;
		}
	}

	pub fn finalize(self) -> AuthConfig {
		AuthConfig {
			token_secret: self.token_secret,
			issuer: self.issuer.unwrap_or_else(|| DEFAULT_ISSUER.to_string()),
			audience: self.audience.unwrap_or_else(|| DEFAULT_AUDIENCE.to_string()),
			access_ttl: self.access_ttl.unwrap_or(DEFAULT_ACCESS_TTL),
			refresh_ttl: self.refresh_ttl.unwrap_or(DEFAULT_REFRESH_TTL),
			refresh_remember_ttl: self
				.refresh_remember_ttl
				.unwrap_or(DEFAULT_REFRESH_REMEMBER_TTL),
		}
	}
}

mod humantime_opt {
	use serde::{Deserialize, Deserializer};
	use std::time::Duration;

	pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
	where
		D: Deserializer<'de>,
	{
		let raw = Option::<String>::deserialize(deserializer)?;
		raw
			.map(|s| humantime::parse_duration(&s).map_err(serde::de::Error::custom))
			.transpose()
	}
}
