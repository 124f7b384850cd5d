// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Organization-scoped roles and their permission grants.

use async_trait::async_trait;
use doodash_server_auth::{OrgId, Permission, Role, RoleId, RolePermission, UserId};
use sqlx::{sqlite::SqliteRow, Row};

use crate::error::DbError;
use crate::gateway::{parse_timestamp, SqlGateway};

#[async_trait]
pub trait RoleStore: Send + Sync {
	async fn create_role(&self, role: &Role) -> Result<(), DbError>;
	async fn list_roles(&self, org_id: &OrgId) -> Result<Vec<Role>, DbError>;
	/// Look a role up by id, restricted to `org_id` when given.
	async fn get_role_by_id(&self, id: &RoleId, org_id: Option<&OrgId>) -> Result<Role, DbError>;
	/// Case-insensitive lookup of a role by name within one organization.
	async fn get_role_by_name(&self, org_id: &OrgId, name: &str) -> Result<Role, DbError>;
	async fn create_role_permission(&self, grant: &RolePermission) -> Result<(), DbError>;
	async fn get_role_permissions(&self, role_id: &RoleId) -> Result<Vec<RolePermission>, DbError>;
	/// Whether the user's role in the organization grants `permission`.
	///
	/// Does not consider ownership.
	async fn has_permission(
		&self,
		user_id: &UserId,
		org_id: &OrgId,
		permission: Permission,
	) -> Result<bool, DbError>;
}

#[async_trait]
impl RoleStore for SqlGateway {
	#[tracing::instrument(skip(self, role), fields(org_id = %role.org_id, role_id = %role.id, name = %role.name))]
	async fn create_role(&self, role: &Role) -> Result<(), DbError> {
		self
			.execute(
				sqlx::query(
					r#"
					INSERT INTO roles (id, org_id, name, description, base_role_id, created_at)
					VALUES (?, ?, ?, ?, ?, ?)
					"#,
				)
				.bind(role.id.as_str())
				.bind(role.org_id.as_str())
				.bind(&role.name)
				.bind(&role.description)
				.bind(role.base_role_id.as_ref().map(|id| id.as_str()))
				.bind(role.created_at.to_rfc3339()),
			)
			.await
			.map_err(|e| DbError::conflict_on_unique(e, format!("role '{}' already exists", role.name)))?;

		tracing::debug!(role_id = %role.id, "role created");
		Ok(())
	}

	#[tracing::instrument(skip(self), fields(org_id = %org_id))]
	async fn list_roles(&self, org_id: &OrgId) -> Result<Vec<Role>, DbError> {
		let rows = self
			.fetch_all(
				sqlx::query(
					r#"
					SELECT id, org_id, name, description, base_role_id, created_at
					FROM roles
					WHERE org_id = ?
					ORDER BY created_at, rowid
					"#,
				)
				.bind(org_id.as_str()),
			)
			.await?;

		rows.iter().map(row_to_role).collect()
	}

	#[tracing::instrument(skip(self), fields(role_id = %id))]
	async fn get_role_by_id(&self, id: &RoleId, org_id: Option<&OrgId>) -> Result<Role, DbError> {
		let row = self
			.fetch_optional(
				sqlx::query(
					r#"
					SELECT id, org_id, name, description, base_role_id, created_at
					FROM roles
					WHERE id = ? AND (? IS NULL OR org_id = ?)
					"#,
				)
				.bind(id.as_str())
				.bind(org_id.map(|o| o.as_str()))
				.bind(org_id.map(|o| o.as_str())),
			)
			.await?;

		match row {
			Some(r) => row_to_role(&r),
			None => Err(DbError::NotFound(format!("role {id}"))),
		}
	}

	#[tracing::instrument(skip(self), fields(org_id = %org_id, name = %name))]
	async fn get_role_by_name(&self, org_id: &OrgId, name: &str) -> Result<Role, DbError> {
		let row = self
			.fetch_optional(
				sqlx::query(
					r#"
					SELECT id, org_id, name, description, base_role_id, created_at
					FROM roles
					WHERE org_id = ? AND name = ? COLLATE NOCASE
					"#,
				)
				.bind(org_id.as_str())
				.bind(name),
			)
			.await?;

		match row {
			Some(r) => row_to_role(&r),
			None => Err(DbError::NotFound(format!("role '{name}'"))),
		}
	}

	#[tracing::instrument(skip(self, grant), fields(role_id = %grant.role_id, permission = %grant.permission))]
	async fn create_role_permission(&self, grant: &RolePermission) -> Result<(), DbError> {
		self
			.execute(
				sqlx::query(
					r#"
					INSERT INTO role_permissions (role_id, permission, allowed)
					VALUES (?, ?, ?)
					"#,
				)
				.bind(grant.role_id.as_str())
				.bind(grant.permission.as_str())
				.bind(grant.allowed),
			)
			.await
			.map_err(|e| {
				DbError::conflict_on_unique(e, format!("permission {} already granted", grant.permission))
			})?;
		Ok(())
	}

	#[tracing::instrument(skip(self), fields(role_id = %role_id))]
	async fn get_role_permissions(&self, role_id: &RoleId) -> Result<Vec<RolePermission>, DbError> {
		let rows = self
			.fetch_all(
				sqlx::query(
					r#"
					SELECT role_id, permission, allowed
					FROM role_permissions
					WHERE role_id = ?
					ORDER BY rowid
					"#,
				)
				.bind(role_id.as_str()),
			)
			.await?;

		rows.iter().map(row_to_grant).collect()
	}

	#[tracing::instrument(skip(self), fields(user_id = %user_id, org_id = %org_id, permission = %permission))]
	async fn has_permission(
		&self,
		user_id: &UserId,
		org_id: &OrgId,
		permission: Permission,
	) -> Result<bool, DbError> {
		let row = self
			.fetch_optional(
				sqlx::query(
					r#"
					SELECT 1
					FROM organization_members m
					JOIN roles r ON r.id = m.role_id AND r.org_id = m.org_id
					JOIN role_permissions rp ON rp.role_id = r.id
					WHERE m.user_id = ? AND m.org_id = ? AND rp.permission = ? AND rp.allowed = 1
					LIMIT 1
					"#,
				)
				.bind(user_id.as_str())
				.bind(org_id.as_str())
				.bind(permission.as_str()),
			)
			.await?;

		Ok(row.is_some())
	}
}

fn row_to_role(row: &SqliteRow) -> Result<Role, DbError> {
	let created_at: String = row.get("created_at");
	Ok(Role {
		id: RoleId::new(row.get::<String, _>("id")),
		org_id: OrgId::new(row.get::<String, _>("org_id")),
		name: row.get("name"),
		description: row.get("description"),
		base_role_id: row
			.get::<Option<String>, _>("base_role_id")
			.map(RoleId::new),
		created_at: parse_timestamp(&created_at)?,
	})
}

fn row_to_grant(row: &SqliteRow) -> Result<RolePermission, DbError> {
	let key: String = row.get("permission");
	let permission = key
		.parse::<Permission>()
		.map_err(|e| DbError::Internal(e.to_string()))?;
	Ok(RolePermission {
		role_id: RoleId::new(row.get::<String, _>("role_id")),
		permission,
		allowed: row.get("allowed"),
	})
}
