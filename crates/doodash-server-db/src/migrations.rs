// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Schema bootstrap and teardown.

use sqlx::sqlite::SqlitePool;

use crate::error::DbError;

const MIGRATIONS: &[(&str, &str)] = &[
	("001_users", include_str!("../migrations/001_users.sql")),
	(
		"002_organizations",
		include_str!("../migrations/002_organizations.sql"),
	),
	("003_roles", include_str!("../migrations/003_roles.sql")),
	(
		"004_organization_members",
		include_str!("../migrations/004_organization_members.sql"),
	),
];

/// Tables in reverse dependency order.
const TABLES: &[&str] = &[
	"organization_members",
	"role_permissions",
	"roles",
	"organizations",
	"users",
];

/// Run all database migrations.
///
/// Migrations are idempotent - safe to run multiple times.
#[tracing::instrument(skip(pool))]
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), DbError> {
	for (name, sql) in MIGRATIONS {
		for stmt in sql.split(';').filter(|s| !is_blank(s)) {
			if let Err(e) = sqlx::query(stmt).execute(pool).await {
				if !e.to_string().contains("already exists") {
					tracing::error!(migration = name, error = %e, "migration failed");
					return Err(e.into());
				}
			}
		}
		tracing::debug!(migration = name, "migration applied");
	}

	tracing::info!(count = MIGRATIONS.len(), "database migrations complete");
	Ok(())
}

/// Drop every table created by [`run_migrations`].
#[tracing::instrument(skip(pool))]
pub async fn drop_schema(pool: &SqlitePool) -> Result<(), DbError> {
	for table in TABLES {
		sqlx::query(&format!("DROP TABLE IF EXISTS {table}"))
			.execute(pool)
			.await?;
		tracing::debug!(table, "table dropped");
	}

	tracing::warn!(count = TABLES.len(), "database schema dropped");
	Ok(())
}

/// True if the chunk holds nothing but whitespace and `--` comments.
fn is_blank(chunk: &str) -> bool {
	chunk
		.lines()
		.map(str::trim)
		.all(|line| line.is_empty() || line.starts_with("--"))
}
