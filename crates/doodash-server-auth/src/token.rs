// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Signed session tokens.
//!
//! Access and refresh tokens are HS256 JWTs carrying the user id as `sub`
//! and a `type` claim that keeps one from being replayed as the other.
//! Refresh tokens also carry the `remember` flag, which selects the longer
//! refresh lifetime and is preserved when the pair is re-issued.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::error::{AuthError, Result};
use crate::types::UserId;

pub const DEFAULT_ISSUER: &str = "doodash_api";
pub const DEFAULT_AUDIENCE: &str = "doodash_frontend";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenType {
	Access,
	Refresh,
}

impl fmt::Display for TokenType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			TokenType::Access => write!(f, "access"),
			TokenType::Refresh => write!(f, "refresh"),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
	pub jti: String,
	pub sub: String,
	pub iss: String,
	pub aud: String,
	pub iat: i64,
	pub exp: i64,
	#[serde(rename = "type")]
	pub token_type: TokenType,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub remember: Option<bool>,
}

impl Claims {
	pub fn user_id(&self) -> UserId {
		UserId::new(self.sub.clone())
	}

	pub fn remember(&self) -> bool {
		self.remember.unwrap_or(false)
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
	pub access_token: String,
	pub access_expires_at: DateTime<Utc>,
	pub refresh_token: String,
	pub refresh_expires_at: DateTime<Utc>,
}

/// Token signing parameters.
#[derive(Clone)]
pub struct TokenConfig {
	pub secret: String,
	pub issuer: String,
	pub audience: String,
	pub access_ttl: std::time::Duration,
	pub refresh_ttl: std::time::Duration,
	pub refresh_remember_ttl: std::time::Duration,
}

impl TokenConfig {
	pub fn new(secret: impl Into<String>) -> Self {
		Self {
			secret: secret.into(),
			issuer: DEFAULT_ISSUER.to_string(),
			audience: DEFAULT_AUDIENCE.to_string(),
			access_ttl: std::time::Duration::from_secs(15 * 60),
			refresh_ttl: std::time::Duration::from_secs(24 * 60 * 60),
			refresh_remember_ttl: std::time::Duration::from_secs(720 * 60 * 60),
		}
	}

	fn ttl(&self, token_type: TokenType, remember: bool) -> Duration {
		let ttl = match (token_type, remember) {
			(TokenType::Access, _) => self.access_ttl,
			(TokenType::Refresh, false) => self.refresh_ttl,
			(TokenType::Refresh, true) => self.refresh_remember_ttl,
		};
		Duration::from_std(ttl).unwrap_or_else(|_| Duration::days(36_500))
	}
}

impl fmt::Debug for TokenConfig {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("TokenConfig")
			.field("secret", &"[REDACTED]")
			.field("issuer", &self.issuer)
			.field("audience", &self.audience)
			.field("access_ttl", &self.access_ttl)
			.field("refresh_ttl", &self.refresh_ttl)
			.field("refresh_remember_ttl", &self.refresh_remember_ttl)
			.finish()
	}
}

/// Issues and validates session tokens.
pub trait TokenIssuer: Send + Sync {
	fn issue(&self, user_id: &UserId, token_type: TokenType, remember: bool) -> Result<String>;

	/// Check signature, expiry, issuer, audience and the `type` claim.
	fn validate(&self, token: &str, expected: TokenType) -> Result<Claims>;

	fn issue_pair(&self, user_id: &UserId, remember: bool) -> Result<TokenPair>;
}

/// HS256 [`TokenIssuer`].
#[derive(Clone)]
pub struct JwtIssuer {
	config: TokenConfig,
	encoding: EncodingKey,
	decoding: DecodingKey,
}

impl JwtIssuer {
	pub fn new(config: TokenConfig) -> Self {
		let encoding = EncodingKey::from_secret(config.secret.as_bytes());
		let decoding = DecodingKey::from_secret(config.secret.as_bytes());
		Self {
			config,
			encoding,
			decoding,
		}
	}

	pub fn config(&self) -> &TokenConfig {
		&self.config
	}

	fn claims(&self, user_id: &UserId, token_type: TokenType, remember: bool) -> Claims {
		let now = Utc::now();
		let exp = now + self.config.ttl(token_type, remember);
		Claims {
			jti: Uuid::new_v4().to_string(),
			sub: user_id.to_string(),
			iss: self.config.issuer.clone(),
			aud: self.config.audience.clone(),
			iat: now.timestamp(),
			exp: exp.timestamp(),
			token_type,
			remember: match token_type {
				TokenType::Refresh => Some(remember),
				TokenType::Access => None,
			},
		}
	}

	fn encode(&self, claims: &Claims) -> Result<String> {
		jsonwebtoken::encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
			.map_err(AuthError::TokenEncoding)
	}
}

impl fmt::Debug for JwtIssuer {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("JwtIssuer")
			.field("config", &self.config)
			.finish_non_exhaustive()
	}
}

impl TokenIssuer for JwtIssuer {
	#[tracing::instrument(level = "debug", skip(self), fields(user_id = %user_id, token_type = %token_type))]
	fn issue(&self, user_id: &UserId, token_type: TokenType, remember: bool) -> Result<String> {
		self.encode(&self.claims(user_id, token_type, remember))
	}

	#[tracing::instrument(level = "debug", skip(self, token), fields(expected = %expected))]
	fn validate(&self, token: &str, expected: TokenType) -> Result<Claims> {
		let mut validation = Validation::new(Algorithm::HS256);
		validation.set_issuer(&[&self.config.issuer]);
		validation.set_audience(&[&self.config.audience]);
		validation.set_required_spec_claims(&["exp", "sub", "iss", "aud"]);

		let claims = jsonwebtoken::decode::<Claims>(token, &self.decoding, &validation)
			.map(|data| data.claims)
			.map_err(|e| {
				tracing::debug!(error = %e, "token rejected");
				AuthError::InvalidToken(e)
			})?;

		if claims.token_type != expected {
			return Err(AuthError::WrongTokenType {
				expected: expected.to_string(),
				actual: claims.token_type.to_string(),
			});
		}
		Ok(claims)
	}

	fn issue_pair(&self, user_id: &UserId, remember: bool) -> Result<TokenPair> {
		let access = self.claims(user_id, TokenType::Access, false);
		let refresh = self.claims(user_id, TokenType::Refresh, remember);
		Ok(TokenPair {
			access_token: self.encode(&access)?,
			access_expires_at: DateTime::from_timestamp(access.exp, 0).unwrap_or_default(),
			refresh_token: self.encode(&refresh)?,
			refresh_expires_at: DateTime::from_timestamp(refresh.exp, 0).unwrap_or_default(),
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn issuer() -> JwtIssuer {
		JwtIssuer::new(TokenConfig::new("test-secret-please-ignore"))
	}

	fn user() -> UserId {
		UserId::new("V1StGXR8_Z5jdHi6B-myT")
	}

	#[test]
	fn access_token_roundtrip() {
		let iss = issuer();
		let token = iss.issue(&user(), TokenType::Access, false).unwrap();
		let claims = iss.validate(&token, TokenType::Access).unwrap();
		assert_eq!(claims.user_id(), user());
		assert_eq!(claims.iss, DEFAULT_ISSUER);
		assert_eq!(claims.aud, DEFAULT_AUDIENCE);
		assert_eq!(claims.remember, None);
		assert_eq!(claims.exp - claims.iat, 15 * 60);
	}

	#[test]
	fn refresh_ttl_depends_on_remember() {
		let iss = issuer();
		let short = iss.issue(&user(), TokenType::Refresh, false).unwrap();
		let long = iss.issue(&user(), TokenType::Refresh, true).unwrap();
		let short = iss.validate(&short, TokenType::Refresh).unwrap();
		let long = iss.validate(&long, TokenType::Refresh).unwrap();
		assert_eq!(short.exp - short.iat, 24 * 3600);
		assert_eq!(long.exp - long.iat, 720 * 3600);
		assert!(long.remember());
		assert!(!short.remember());
	}

	#[test]
	fn type_claim_is_enforced() {
		let iss = issuer();
		let refresh = iss.issue(&user(), TokenType::Refresh, false).unwrap();
		assert!(matches!(
			iss.validate(&refresh, TokenType::Access),
			Err(AuthError::WrongTokenType { .. })
		));
	}

	#[test]
	fn wrong_secret_is_rejected() {
		let token = issuer().issue(&user(), TokenType::Access, false).unwrap();
		let other = JwtIssuer::new(TokenConfig::new("another-secret"));
		assert!(matches!(
			other.validate(&token, TokenType::Access),
			Err(AuthError::InvalidToken(_))
		));
	}

	#[test]
	fn wrong_audience_is_rejected() {
		let token = issuer().issue(&user(), TokenType::Access, false).unwrap();
		let mut config = TokenConfig::new("test-secret-please-ignore");
		config.audience = "somebody_else".to_string();
		assert!(JwtIssuer::new(config)
			.validate(&token, TokenType::Access)
			.is_err());
	}

	#[test]
	fn expired_token_is_rejected() {
		let iss = issuer();
		let mut claims = iss.claims(&user(), TokenType::Access, false);
		claims.iat -= 7200;
		claims.exp = claims.iat + 60;
		let token = iss.encode(&claims).unwrap();
		assert!(matches!(
			iss.validate(&token, TokenType::Access),
			Err(AuthError::InvalidToken(_))
		));
	}

	#[test]
	fn pair_contains_both_types() {
		let iss = issuer();
		let pair = iss.issue_pair(&user(), true).unwrap();
		assert!(iss.validate(&pair.access_token, TokenType::Access).is_ok());
		let refresh = iss.validate(&pair.refresh_token, TokenType::Refresh).unwrap();
		assert!(refresh.remember());
		assert!(pair.refresh_expires_at > pair.access_expires_at);
	}

	#[test]
	fn debug_redacts_secret() {
		let debug = format!("{:?}", issuer());
		assert!(!debug.contains("test-secret"));
		assert!(debug.contains("REDACTED"));
	}
}
