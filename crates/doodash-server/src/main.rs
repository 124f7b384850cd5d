// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Doodash server binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use doodash_server::{telemetry, Services};
use doodash_server_config::ServerConfig;
use doodash_server_db::{create_pool, drop_schema, run_migrations};

#[derive(Parser, Debug)]
#[command(name = "doodash-server", about = "Doodash organization server", version)]
struct Args {
	/// Config file; defaults to /etc/doodash/server.toml
	#[arg(long, env = "DOODASH_SERVER_CONFIG")]
	config: Option<PathBuf>,

	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Create or update the database schema
	Migrate,
	/// Drop every table
	Drop {
		/// Required; this deletes all data
		#[arg(long)]
		yes: bool,
	},
	/// Load configuration, open the database and build the services
	Check,
	/// Show version information
	Version,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	if let Command::Version = args.command {
		println!("doodash-server {}", env!("CARGO_PKG_VERSION"));
		return Ok(());
	}

	dotenvy::dotenv().ok();

	let config: ServerConfig = match &args.config {
		Some(path) => doodash_server_config::load_config_with_file(path)?,
		None => doodash_server_config::load_config()?,
	};

	telemetry::init(&config.logging);

	let pool = create_pool(&config.database.url, config.database.max_connections).await?;

	match args.command {
		Command::Migrate => {
			run_migrations(&pool).await?;
			tracing::info!(database = %config.database.url, "migrations applied");
		}
		Command::Drop { yes } => {
			if !yes {
				return Err("refusing to drop the schema without --yes".into());
			}
			drop_schema(&pool).await?;
			tracing::warn!(database = %config.database.url, "schema dropped");
		}
		Command::Check => {
			run_migrations(&pool).await?;
			let _services = Services::new(pool.clone(), &config)?;
			tracing::info!("configuration and database ok");
		}
		Command::Version => {}
	}

	pool.close().await;
	Ok(())
}
