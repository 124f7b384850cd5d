// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Service wiring for the Doodash server.

use std::sync::Arc;

use doodash_server_auth::{Argon2Verifier, JwtIssuer, TokenConfig};
use doodash_server_config::{AuthConfig, ConfigError, PaginationConfig, ServerConfig};
use doodash_server_db::TxManager;
use doodash_server_orgs::{
	AuthService, MembershipService, OrgService, PageLimits, PermissionChecker,
};
use sqlx::SqlitePool;

pub mod telemetry;

/// Every service a request handler needs, built once at startup.
#[derive(Clone)]
pub struct Services {
	pub orgs: OrgService,
	pub members: MembershipService,
	pub auth: AuthService,
	pub checker: PermissionChecker,
	pub page_limits: PageLimits,
}

impl Services {
	pub fn new(pool: SqlitePool, config: &ServerConfig) -> Result<Self, ConfigError> {
		let tx = TxManager::new(pool);
		let tokens = Arc::new(JwtIssuer::new(token_config(&config.auth)?));
		Ok(Self {
			orgs: OrgService::new(tx.clone()),
			members: MembershipService::new(tx.clone()),
			auth: AuthService::new(tx.querier(), Arc::new(Argon2Verifier::new()), tokens),
			checker: PermissionChecker::new(tx.querier()),
			page_limits: page_limits(&config.pagination),
		})
	}
}

pub fn token_config(auth: &AuthConfig) -> Result<TokenConfig, ConfigError> {
	let mut tokens = TokenConfig::new(auth.require_token_secret()?);
	tokens.issuer = auth.issuer.clone();
	tokens.audience = auth.audience.clone();
	tokens.access_ttl = auth.access_ttl;
	tokens.refresh_ttl = auth.refresh_ttl;
	tokens.refresh_remember_ttl = auth.refresh_remember_ttl;
	Ok(tokens)
}

pub fn page_limits(pagination: &PaginationConfig) -> PageLimits {
	PageLimits {
		default_size: pagination.default_page_size,
		max_size: pagination.max_page_size,
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use doodash_server_auth::{TokenIssuer, TokenType};
	use doodash_server_config::{AuthConfigLayer, ServerConfigLayer};
	use doodash_server_db::testing::{create_migrated_test_pool, insert_test_user};
	use std::time::Duration;

	fn config_with_secret() -> ServerConfig {
		doodash_server_config::finalize(ServerConfigLayer {
			auth: Some(AuthConfigLayer {
				token_secret: Some("an-adequately-long-secret".into()),
				access_ttl: Some(Duration::from_secs(60)),
				..Default::default()
			}),
			..Default::default()
		})
		.unwrap()
	}

	#[test]
	fn token_config_carries_settings() {
		let tokens = token_config(&config_with_secret().auth).unwrap();
		assert_eq!(tokens.access_ttl, Duration::from_secs(60));
		assert_eq!(tokens.issuer, "doodash_api");
	}

	#[test]
	fn token_config_needs_secret() {
		let config = ServerConfig::default();
		assert!(token_config(&config.auth).is_err());
	}

	#[tokio::test]
	async fn services_share_one_database() {
		let pool = create_migrated_test_pool().await.unwrap();
		let alice = insert_test_user(&pool, "alice").await.unwrap();
		let services = Services::new(pool, &config_with_secret()).unwrap();

		let org = services.orgs.create(&alice, "Acme Corp").await.unwrap();
		services
			.checker
			.check(&alice, &org.id, doodash_server_auth::Permission::OrgDelete)
			.await
			.unwrap();
		assert_eq!(services.page_limits.default_size, 10);

		let token = services
			.auth
			.tokens()
			.issue(&alice, TokenType::Access, false)
			.unwrap();
		assert_eq!(services.auth.authenticate(&token).unwrap().user_id, alice);
	}
}
