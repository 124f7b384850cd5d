// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Helpers for tests in this and downstream crates.

use chrono::Utc;
use doodash_server_auth::UserId;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

use crate::error::DbError;
use crate::migrations::run_migrations;

/// An empty in-memory database on a single long-lived connection.
///
/// Every pooled connection to `:memory:` is a separate database, so the pool
/// is capped at one connection that never expires.
pub async fn create_test_pool() -> Result<SqlitePool, DbError> {
	let pool = SqlitePoolOptions::new()
		.max_connections(1)
		.idle_timeout(None)
		.max_lifetime(None)
		.connect("sqlite::memory:")
		.await?;
	Ok(pool)
}

/// An in-memory database with the full schema applied.
pub async fn create_migrated_test_pool() -> Result<SqlitePool, DbError> {
	let pool = create_test_pool().await?;
	run_migrations(&pool).await?;
	Ok(pool)
}

/// Insert a user named `username` with email `<username>@example.com`.
pub async fn insert_test_user(pool: &SqlitePool, username: &str) -> Result<UserId, DbError> {
	let id = UserId::generate();
	sqlx::query(
		r#"
		INSERT INTO users (id, username, email, password_hash, created_at)
		VALUES (?, ?, ?, ?, ?)
		"#,
	)
	.bind(id.as_str())
	.bind(username)
	.bind(format!("{username}@example.com"))
	.bind("not-a-real-hash")
	.bind(Utc::now().to_rfc3339())
	.execute(pool)
	.await?;
	Ok(id)
}
