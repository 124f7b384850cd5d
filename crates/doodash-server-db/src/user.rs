// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use async_trait::async_trait;
use doodash_server_auth::{User, UserId};
use sqlx::{sqlite::SqliteRow, Row};

use crate::error::DbError;
use crate::gateway::{parse_timestamp, SqlGateway};

#[async_trait]
pub trait UserStore: Send + Sync {
	async fn create_user(&self, user: &User) -> Result<(), DbError>;
	async fn get_user_by_id(&self, id: &UserId) -> Result<Option<User>, DbError>;
	async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, DbError>;
}

#[async_trait]
impl UserStore for SqlGateway {
	/// Insert a user.
	///
	/// # Errors
	/// Returns `DbError::Conflict` if the username or email is taken.
	#[tracing::instrument(skip(self, user), fields(user_id = %user.id))]
	async fn create_user(&self, user: &User) -> Result<(), DbError> {
		self
			.execute(
				sqlx::query(
					r#"
					INSERT INTO users (id, username, email, password_hash, created_at)
					VALUES (?, ?, ?, ?, ?)
					"#,
				)
				.bind(user.id.as_str())
				.bind(&user.username)
				.bind(&user.email)
				.bind(&user.password_hash)
				.bind(user.created_at.to_rfc3339()),
			)
			.await
			.map_err(|e| DbError::conflict_on_unique(e, "username or email already taken"))?;

		tracing::debug!(user_id = %user.id, "user created");
		Ok(())
	}

	#[tracing::instrument(skip(self), fields(user_id = %id))]
	async fn get_user_by_id(&self, id: &UserId) -> Result<Option<User>, DbError> {
		let row = self
			.fetch_optional(
				sqlx::query(
					r#"
					SELECT id, username, email, password_hash, created_at
					FROM users
					WHERE id = ?
					"#,
				)
				.bind(id.as_str()),
			)
			.await?;

		row.map(|r| row_to_user(&r)).transpose()
	}

	#[tracing::instrument(skip(self, email))]
	async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, DbError> {
		let row = self
			.fetch_optional(
				sqlx::query(
					r#"
					SELECT id, username, email, password_hash, created_at
					FROM users
					WHERE email = ?
					"#,
				)
				.bind(email),
			)
			.await?;

		row.map(|r| row_to_user(&r)).transpose()
	}
}

fn row_to_user(row: &SqliteRow) -> Result<User, DbError> {
	let created_at: String = row.get("created_at");
	Ok(User {
		id: UserId::new(row.get::<String, _>("id")),
		username: row.get("username"),
		email: row.get("email"),
		password_hash: row.get("password_hash"),
		created_at: parse_timestamp(&created_at)?,
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::testing::create_migrated_test_pool;

	async fn gateway() -> SqlGateway {
		SqlGateway::new(create_migrated_test_pool().await.unwrap())
	}

	#[tokio::test]
	async fn create_and_fetch() {
		let db = gateway().await;
		let user = User::new("alice", "alice@example.com", "$argon2id$x".to_string());
		db.create_user(&user).await.unwrap();

		let by_id = db.get_user_by_id(&user.id).await.unwrap().unwrap();
		assert_eq!(by_id.username, "alice");
		assert_eq!(by_id.password_hash, "$argon2id$x");

		let by_email = db.get_user_by_email("alice@example.com").await.unwrap().unwrap();
		assert_eq!(by_email.id, user.id);
	}

	#[tokio::test]
	async fn missing_user_is_none() {
		let db = gateway().await;
		assert!(db.get_user_by_id(&UserId::generate()).await.unwrap().is_none());
		assert!(db.get_user_by_email("nobody@example.com").await.unwrap().is_none());
	}

	#[tokio::test]
	async fn duplicate_email_is_conflict() {
		let db = gateway().await;
		db.create_user(&User::new("a", "same@example.com", "h".into()))
			.await
			.unwrap();
		let err = db
			.create_user(&User::new("b", "same@example.com", "h".into()))
			.await
			.unwrap_err();
		assert!(matches!(err, DbError::Conflict(_)));
	}
}
