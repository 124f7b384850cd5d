// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration for the Doodash server.
//!
//! Values come from built-in defaults, an optional TOML file, and
//! `DOODASH_SERVER_*` environment variables, in increasing precedence.
//!
//! ```ignore
//! let config = doodash_server_config::load_config()?;
//! let pool = create_pool(&config.database.url, config.database.max_connections).await?;
//! ```

pub mod error;
pub mod layer;
pub mod sections;
pub mod sources;

pub use error::ConfigError;
pub use layer::ServerConfigLayer;
pub use sections::*;
pub use sources::{ConfigSource, DefaultsSource, EnvSource, Precedence, TomlSource};

use tracing::{debug, info};

/// Fully resolved server configuration.
#[derive(Debug, Clone, Default)]
pub struct ServerConfig {
	pub database: DatabaseConfig,
	pub auth: AuthConfig,
	pub logging: LoggingConfig,
	pub pagination: PaginationConfig,
}

/// Load configuration with standard precedence.
///
/// Precedence (highest to lowest):
/// 1. Environment variables (`DOODASH_SERVER_*`)
/// 2. Config file (`/etc/doodash/server.toml`)
/// 3. Built-in defaults
pub fn load_config() -> Result<ServerConfig, ConfigError> {
	let sources: Vec<Box<dyn ConfigSource>> = vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::system()),
		Box::new(EnvSource),
	];
	load_from_sources(sources)
}

/// Load configuration from environment only.
pub fn load_config_from_env() -> Result<ServerConfig, ConfigError> {
	let sources: Vec<Box<dyn ConfigSource>> = vec![Box::new(EnvSource)];
	load_from_sources(sources)
}

/// Load configuration with a custom config file path.
pub fn load_config_with_file(
	config_path: impl Into<std::path::PathBuf>,
) -> Result<ServerConfig, ConfigError> {
	let sources: Vec<Box<dyn ConfigSource>> = vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::new(config_path)),
		Box::new(EnvSource),
	];
	load_from_sources(sources)
}

fn load_from_sources(mut sources: Vec<Box<dyn ConfigSource>>) -> Result<ServerConfig, ConfigError> {
	sources.sort_by_key(|s| s.precedence());

	let mut merged = ServerConfigLayer::default();
	for source in sources {
		debug!(source = source.name(), "loading configuration source");
		merged.merge(source.load()?);
	}

	finalize(merged)
}

/// Resolve a merged layer, filling defaults and validating.
pub fn finalize(layer: ServerConfigLayer) -> Result<ServerConfig, ConfigError> {
	let config = ServerConfig {
		database: layer.database.unwrap_or_default().finalize(),
		auth: layer.auth.unwrap_or_default().finalize(),
		logging: layer.logging.unwrap_or_default().finalize(),
		pagination: layer.pagination.unwrap_or_default().finalize(),
	};

	validate_config(&config)?;

	info!(
		database = %config.database.url,
		max_connections = config.database.max_connections,
		token_secret_configured = config.auth.token_secret.is_some(),
		log_level = %config.logging.level,
		"server configuration loaded"
	);

	Ok(config)
}

/// Cross-field rules.
fn validate_config(config: &ServerConfig) -> Result<(), ConfigError> {
	if config.database.max_connections == 0 {
		return Err(ConfigError::Validation(
			"database.max_connections must be at least 1".to_string(),
		));
	}

	let auth = &config.auth;
	if auth.access_ttl.is_zero() {
		return Err(ConfigError::Validation(
			"auth.access_ttl must be greater than zero".to_string(),
		));
	}
	if auth.refresh_ttl < auth.access_ttl || auth.refresh_remember_ttl < auth.refresh_ttl {
		return Err(ConfigError::Validation(
			"token lifetimes must satisfy access_ttl <= refresh_ttl <= refresh_remember_ttl"
				.to_string(),
		));
	}
	if auth.token_secret.as_deref().is_some_and(|s| s.len() < 16) {
		return Err(ConfigError::Validation(
			"auth.token_secret must be at least 16 bytes".to_string(),
		));
	}

	let page = &config.pagination;
	if page.default_page_size < 1 || page.max_page_size < page.default_page_size {
		return Err(ConfigError::Validation(
			"pagination sizes must satisfy 1 <= default_page_size <= max_page_size".to_string(),
		));
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;
	use std::io::Write;
	use std::time::Duration;

	#[test]
	fn defaults_are_valid() {
		let config = finalize(ServerConfigLayer::default()).unwrap();
		assert_eq!(config.database.url, "sqlite:./doodash.db");
		assert_eq!(config.pagination.default_page_size, 10);
		assert_eq!(config.logging.level, "info");
		assert!(!config.logging.json);
	}

	#[test]
	fn short_secret_is_rejected() {
		let layer = ServerConfigLayer {
			auth: Some(AuthConfigLayer {
				token_secret: Some("short".into()),
				..Default::default()
			}),
			..Default::default()
		};
		assert!(matches!(finalize(layer), Err(ConfigError::Validation(_))));
	}

	#[test]
	fn inverted_ttls_are_rejected() {
		let layer = ServerConfigLayer {
			auth: Some(AuthConfigLayer {
				access_ttl: Some(Duration::from_secs(48 * 3600)),
				..Default::default()
			}),
			..Default::default()
		};
		assert!(finalize(layer).is_err());
	}

	#[test]
	fn file_values_override_defaults() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		writeln!(
			file,
			r#"
[database]
max_connections = 2

[auth]
token_secret = "0123456789abcdef0123"
access_ttl = "10m"

[logging]
json = true
"#
		)
		.unwrap();

		let mut merged = ServerConfigLayer::default();
		merged.merge(TomlSource::new(file.path()).load().unwrap());
		let config = finalize(merged).unwrap();
		assert_eq!(config.database.max_connections, 2);
		assert_eq!(config.auth.access_ttl, Duration::from_secs(600));
		assert!(config.logging.json);
	}

	proptest! {
		#[test]
		fn page_sizes_validated(default in -5i64..200, max in -5i64..200) {
			let layer = ServerConfigLayer {
				pagination: Some(PaginationConfigLayer {
					default_page_size: Some(default),
					max_page_size: Some(max),
				}),
				..Default::default()
			};
			let ok = default >= 1 && max >= default;
			prop_assert_eq!(finalize(layer).is_ok(), ok);
		}
	}
}
