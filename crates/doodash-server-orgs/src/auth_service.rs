// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Sign-up, sign-in and session tokens.

use std::sync::Arc;

use doodash_server_auth::{
	AuthContext, AuthError, CredentialVerifier, TokenIssuer, TokenPair, TokenType, User,
	UserProfile,
};
use doodash_server_db::{DbError, Querier, UserStore};
use serde::Serialize;

use crate::error::OrgsError;

const INVALID_CREDENTIALS: &str = "invalid email or password";

/// A signed-in user and their tokens.
#[derive(Debug, Clone, Serialize)]
pub struct Session {
	pub user: UserProfile,
	pub tokens: TokenPair,
}

#[derive(Clone)]
pub struct AuthService {
	db: Arc<dyn Querier>,
	verifier: Arc<dyn CredentialVerifier>,
	tokens: Arc<dyn TokenIssuer>,
}

impl AuthService {
	pub fn new(
		db: Arc<dyn Querier>,
		verifier: Arc<dyn CredentialVerifier>,
		tokens: Arc<dyn TokenIssuer>,
	) -> Self {
		Self {
			db,
			verifier,
			tokens,
		}
	}

	pub fn tokens(&self) -> Arc<dyn TokenIssuer> {
		Arc::clone(&self.tokens)
	}

	#[tracing::instrument(skip(self, email, password))]
	pub async fn sign_up(
		&self,
		username: &str,
		email: &str,
		password: &str,
		remember: bool,
	) -> Result<Session, OrgsError> {
		let username = username.trim();
		let email = normalize_email(email);
		if username.is_empty() || email.is_empty() || password.is_empty() {
			return Err(OrgsError::BadRequest(
				"username, email and password are required".to_string(),
			));
		}

		let hash = self
			.verifier
			.hash(password)
			.map_err(|e| OrgsError::internal("failed to hash password", e))?;
		let user = User::new(username, &email, hash);

		self.db.create_user(&user).await.map_err(|e| match e {
			DbError::Conflict(msg) => OrgsError::Conflict(msg),
			other => OrgsError::internal("failed to create user", other),
		})?;

		let tokens = self.issue_pair(&user, remember)?;
		tracing::info!(user_id = %user.id, "user signed up");
		Ok(Session {
			user: user.profile(),
			tokens,
		})
	}

	/// Unknown email and wrong password fail identically.
	#[tracing::instrument(skip(self, email, password))]
	pub async fn sign_in(
		&self,
		email: &str,
		password: &str,
		remember: bool,
	) -> Result<Session, OrgsError> {
		let user = self
			.db
			.get_user_by_email(&normalize_email(email))
			.await
			.map_err(|e| OrgsError::internal("failed to load user", e))?
			.ok_or_else(|| OrgsError::forbidden(INVALID_CREDENTIALS))?;

		let valid = self
			.verifier
			.verify(password, &user.password_hash)
			.map_err(|e| OrgsError::internal("failed to verify password", e))?;
		if !valid {
			tracing::info!(user_id = %user.id, "sign in rejected");
			return Err(OrgsError::forbidden(INVALID_CREDENTIALS));
		}

		let tokens = self.issue_pair(&user, remember)?;
		tracing::info!(user_id = %user.id, "user signed in");
		Ok(Session {
			user: user.profile(),
			tokens,
		})
	}

	/// Exchange a refresh token for a new pair, keeping its `remember` flag.
	#[tracing::instrument(skip_all)]
	pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, OrgsError> {
		let claims = self
			.tokens
			.validate(refresh_token, TokenType::Refresh)
			.map_err(unauthenticated)?;

		let user = self
			.db
			.get_user_by_id(&claims.user_id())
			.await
			.map_err(|e| OrgsError::internal("failed to load user", e))?
			.ok_or_else(|| OrgsError::Unauthenticated("invalid token".to_string()))?;

		let tokens = self.issue_pair(&user, claims.remember())?;
		tracing::debug!(user_id = %user.id, "session refreshed");
		Ok(tokens)
	}

	/// Validate an access token.
	pub fn authenticate(&self, access_token: &str) -> Result<AuthContext, OrgsError> {
		authenticate(self.tokens.as_ref(), access_token)
	}

	fn issue_pair(&self, user: &User, remember: bool) -> Result<TokenPair, OrgsError> {
		self
			.tokens
			.issue_pair(&user.id, remember)
			.map_err(|e| OrgsError::internal("failed to issue tokens", e))
	}
}

pub(crate) fn authenticate(
	tokens: &dyn TokenIssuer,
	access_token: &str,
) -> Result<AuthContext, OrgsError> {
	tokens
		.validate(access_token, TokenType::Access)
		.map(|claims| AuthContext::from_claims(&claims))
		.map_err(unauthenticated)
}

fn unauthenticated(err: AuthError) -> OrgsError {
	tracing::debug!(error = %err, "token rejected");
	OrgsError::Unauthenticated("invalid token".to_string())
}

fn normalize_email(email: &str) -> String {
	email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::error::ErrorKind;
	use doodash_server_auth::{Argon2Verifier, JwtIssuer, TokenConfig};
	use doodash_server_db::testing::create_migrated_test_pool;
	use doodash_server_db::SqlGateway;

	async fn service() -> AuthService {
		let pool = create_migrated_test_pool().await.unwrap();
		AuthService::new(
			Arc::new(SqlGateway::new(pool)),
			Arc::new(Argon2Verifier::new()),
			Arc::new(JwtIssuer::new(TokenConfig::new("test-secret"))),
		)
	}

	#[tokio::test]
	async fn sign_up_then_sign_in() {
		let svc = service().await;
		let session = svc
			.sign_up("alice", " Alice@Example.com ", "hunter22", false)
			.await
			.unwrap();
		assert_eq!(session.user.email, "alice@example.com");

		let again = svc
			.sign_in("alice@example.com", "hunter22", false)
			.await
			.unwrap();
		assert_eq!(again.user.id, session.user.id);

		let ctx = svc.authenticate(&again.tokens.access_token).unwrap();
		assert_eq!(ctx.user_id, session.user.id);
	}

	#[tokio::test]
	async fn duplicate_email_conflicts() {
		let svc = service().await;
		svc.sign_up("alice", "a@example.com", "pw", false).await.unwrap();
		let err = svc
			.sign_up("alice2", "a@example.com", "pw", false)
			.await
			.unwrap_err();
		assert_eq!(err.kind(), ErrorKind::Conflict);
	}

	#[tokio::test]
	async fn bad_credentials_are_indistinguishable() {
		let svc = service().await;
		svc.sign_up("alice", "a@example.com", "right", false)
			.await
			.unwrap();

		let wrong_pw = svc.sign_in("a@example.com", "wrong", false).await.unwrap_err();
		let no_user = svc.sign_in("b@example.com", "right", false).await.unwrap_err();
		assert_eq!(wrong_pw.kind(), ErrorKind::Forbidden);
		assert_eq!(no_user.kind(), ErrorKind::Forbidden);
		assert_eq!(wrong_pw.to_string(), no_user.to_string());
	}

	#[tokio::test]
	async fn blank_fields_are_bad_request() {
		let svc = service().await;
		let err = svc.sign_up("  ", "a@example.com", "pw", false).await.unwrap_err();
		assert_eq!(err.kind(), ErrorKind::BadRequest);
	}

	#[tokio::test]
	async fn refresh_rejects_access_token() {
		let svc = service().await;
		let session = svc.sign_up("alice", "a@example.com", "pw", true).await.unwrap();

		let err = svc.refresh(&session.tokens.access_token).await.unwrap_err();
		assert_eq!(err.kind(), ErrorKind::Unauthenticated);

		let pair = svc.refresh(&session.tokens.refresh_token).await.unwrap();
		let claims = svc
			.tokens()
			.validate(&pair.refresh_token, TokenType::Refresh)
			.unwrap();
		assert!(claims.remember());
	}

	#[tokio::test]
	async fn authenticate_rejects_refresh_and_garbage() {
		let svc = service().await;
		let session = svc.sign_up("alice", "a@example.com", "pw", false).await.unwrap();
		assert_eq!(
			svc.authenticate(&session.tokens.refresh_token)
				.unwrap_err()
				.kind(),
			ErrorKind::Unauthenticated
		);
		assert_eq!(
			svc.authenticate("not-a-jwt").unwrap_err().kind(),
			ErrorKind::Unauthenticated
		);
	}
}
