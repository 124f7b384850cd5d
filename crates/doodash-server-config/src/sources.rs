// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sources: defaults, TOML files and environment variables.

use std::path::PathBuf;
use std::time::Duration;

use tracing::{debug, trace};

use crate::error::ConfigError;
use crate::layer::ServerConfigLayer;
use crate::sections::{
	AuthConfigLayer, DatabaseConfigLayer, LoggingConfigLayer, PaginationConfigLayer,
};

/// Source precedence levels (higher = overrides lower).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
	Defaults = 10,
	ConfigFile = 20,
	Environment = 50,
}

pub trait ConfigSource: Send + Sync {
	fn name(&self) -> &'static str;
	fn precedence(&self) -> Precedence;
	fn load(&self) -> Result<ServerConfigLayer, ConfigError>;
}

pub struct DefaultsSource;

impl ConfigSource for DefaultsSource {
	fn name(&self) -> &'static str {
		"defaults"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Defaults
	}

	fn load(&self) -> Result<ServerConfigLayer, ConfigError> {
		debug!("loading defaults");
		Ok(ServerConfigLayer::default())
	}
}

/// A TOML file. A missing file contributes nothing.
pub struct TomlSource {
	path: PathBuf,
}

impl TomlSource {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}

	pub fn system() -> Self {
		Self::new("/etc/doodash/server.toml")
	}
}

impl ConfigSource for TomlSource {
	fn name(&self) -> &'static str {
		"toml-config"
	}

	fn precedence(&self) -> Precedence {
		Precedence::ConfigFile
	}

	fn load(&self) -> Result<ServerConfigLayer, ConfigError> {
		if !self.path.exists() {
			debug!(path = %self.path.display(), "config file not found, skipping");
			return Ok(ServerConfigLayer::default());
		}

		debug!(path = %self.path.display(), "loading config file");
		let content = std::fs::read_to_string(&self.path).map_err(|e| ConfigError::FileRead {
			path: self.path.clone(),
			source: e,
		})?;

		let layer: ServerConfigLayer =
			toml::from_str(&content).map_err(|e| ConfigError::TomlParse {
				path: self.path.clone(),
				source: e,
			})?;

		trace!("parsed config layer from TOML");
		Ok(layer)
	}
}

/// Environment variable source.
///
/// Convention: DOODASH_SERVER_<SECTION>_<FIELD>
pub struct EnvSource;

impl ConfigSource for EnvSource {
	fn name(&self) -> &'static str {
		"environment"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Environment
	}

	fn load(&self) -> Result<ServerConfigLayer, ConfigError> {
		debug!("loading environment variables");
		Ok(ServerConfigLayer {
			database: Some(load_database_from_env()?),
			auth: Some(load_auth_from_env()?),
			logging: Some(load_logging_from_env()),
			pagination: Some(load_pagination_from_env()?),
		})
	}
}

fn env_var(name: &str) -> Option<String> {
	std::env::var(name).ok().filter(|s| !s.is_empty())
}

fn env_bool(name: &str) -> Option<bool> {
	env_var(name).map(|v| v.eq_ignore_ascii_case("true") || v == "1")
}

fn env_u32(name: &str) -> Result<Option<u32>, ConfigError> {
	match env_var(name) {
		Some(v) => v.parse().map(Some).map_err(|_| ConfigError::InvalidValue {
			key: name.to_string(),
			message: format!("invalid u32 value '{v}'"),
		}),
		None => Ok(None),
	}
}

fn env_i64(name: &str) -> Result<Option<i64>, ConfigError> {
	match env_var(name) {
		Some(v) => v.parse().map(Some).map_err(|_| ConfigError::InvalidValue {
			key: name.to_string(),
			message: format!("invalid i64 value '{v}'"),
		}),
		None => Ok(None),
	}
}

fn env_duration(name: &str) -> Result<Option<Duration>, ConfigError> {
	match env_var(name) {
		Some(v) => humantime::parse_duration(&v)
			.map(Some)
			.map_err(|e| ConfigError::InvalidValue {
				key: name.to_string(),
				message: format!("invalid duration '{v}': {e}"),
			}),
		None => Ok(None),
	}
}

/// `NAME`, or the trimmed contents of the file named by `NAME_FILE`.
fn env_secret(name: &str) -> Result<Option<String>, ConfigError> {
	if let Some(value) = env_var(name) {
		return Ok(Some(value));
	}
	let file_var = format!("{name}_FILE");
	let Some(path) = env_var(&file_var) else {
		return Ok(None);
	};
	let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::InvalidValue {
		key: file_var.clone(),
		message: format!("cannot read '{path}': {e}"),
	})?;
	Ok(Some(content.trim().to_string()).filter(|s| !s.is_empty()))
}

fn load_database_from_env() -> Result<DatabaseConfigLayer, ConfigError> {
	Ok(DatabaseConfigLayer {
		url: env_var("DOODASH_SERVER_DATABASE_URL"),
		max_connections: env_u32("DOODASH_SERVER_DATABASE_MAX_CONNECTIONS")?,
	})
}

fn load_auth_from_env() -> Result<AuthConfigLayer, ConfigError> {
	Ok(AuthConfigLayer {
		token_secret: env_secret("DOODASH_SERVER_AUTH_TOKEN_SECRET")?,
		issuer: env_var("DOODASH_SERVER_AUTH_ISSUER"),
		audience: env_var("DOODASH_SERVER_AUTH_AUDIENCE"),
		access_ttl: env_duration("DOODASH_SERVER_AUTH_ACCESS_TTL")?,
		refresh_ttl: env_duration("DOODASH_SERVER_AUTH_REFRESH_TTL")?,
		refresh_remember_ttl: env_duration("DOODASH_SERVER_AUTH_REFRESH_REMEMBER_TTL")?,
	})
}

fn load_logging_from_env() -> LoggingConfigLayer {
	LoggingConfigLayer {
		level: env_var("DOODASH_SERVER_LOG_LEVEL"),
		json: env_bool("DOODASH_SERVER_LOG_JSON"),
	}
}

fn load_pagination_from_env() -> Result<PaginationConfigLayer, ConfigError> {
	Ok(PaginationConfigLayer {
		default_page_size: env_i64("DOODASH_SERVER_PAGINATION_DEFAULT_PAGE_SIZE")?,
		max_page_size: env_i64("DOODASH_SERVER_PAGINATION_MAX_PAGE_SIZE")?,
	})
}
