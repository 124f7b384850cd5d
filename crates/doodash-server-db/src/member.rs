// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Organization membership storage.
//!
//! `(org_id, user_id)` is the primary key of `organization_members`, so a
//! second insert for the same pair fails with [`DbError::Conflict`] even if
//! two callers race past an existence check.

use async_trait::async_trait;
use chrono::Utc;
use doodash_server_auth::{MemberView, OrgId, OrgMembership, RoleId, RoleView, UserId};
use sqlx::{sqlite::SqliteRow, Row};

use crate::error::DbError;
use crate::gateway::{parse_timestamp, SqlGateway};

#[async_trait]
pub trait MemberStore: Send + Sync {
	async fn add_member(
		&self,
		org_id: &OrgId,
		user_id: &UserId,
		role_id: &RoleId,
	) -> Result<OrgMembership, DbError>;
	async fn get_membership(&self, user_id: &UserId, org_id: &OrgId) -> Result<OrgMembership, DbError>;
	async fn member_exists(&self, user_id: &UserId, org_id: &OrgId) -> Result<bool, DbError>;
	/// Whether `user_id` is the organization's owner. A missing organization is `false`.
	async fn is_owner(&self, user_id: &UserId, org_id: &OrgId) -> Result<bool, DbError>;
	async fn list_members(&self, org_id: &OrgId) -> Result<Vec<MemberView>, DbError>;
}

#[async_trait]
impl MemberStore for SqlGateway {
	#[tracing::instrument(skip(self), fields(org_id = %org_id, user_id = %user_id, role_id = %role_id))]
	async fn add_member(
		&self,
		org_id: &OrgId,
		user_id: &UserId,
		role_id: &RoleId,
	) -> Result<OrgMembership, DbError> {
		let joined_at = Utc::now();
		self
			.execute(
				sqlx::query(
					r#"
					INSERT INTO organization_members (org_id, user_id, role_id, joined_at)
					VALUES (?, ?, ?, ?)
					"#,
				)
				.bind(org_id.as_str())
				.bind(user_id.as_str())
				.bind(role_id.as_str())
				.bind(joined_at.to_rfc3339()),
			)
			.await
			.map_err(|e| DbError::conflict_on_unique(e, "user already member of organization"))?;

		tracing::debug!(org_id = %org_id, user_id = %user_id, role_id = %role_id, "member added to organization");
		Ok(OrgMembership {
			org_id: org_id.clone(),
			user_id: user_id.clone(),
			role_id: role_id.clone(),
			joined_at,
		})
	}

	#[tracing::instrument(skip(self), fields(user_id = %user_id, org_id = %org_id))]
	async fn get_membership(&self, user_id: &UserId, org_id: &OrgId) -> Result<OrgMembership, DbError> {
		let row = self
			.fetch_optional(
				sqlx::query(
					r#"
					SELECT org_id, user_id, role_id, joined_at
					FROM organization_members
					WHERE user_id = ? AND org_id = ?
					"#,
				)
				.bind(user_id.as_str())
				.bind(org_id.as_str()),
			)
			.await?;

		match row {
			Some(r) => row_to_membership(&r),
			None => Err(DbError::NotFound(format!(
				"membership of user {user_id} in organization {org_id}"
			))),
		}
	}

	#[tracing::instrument(skip(self), fields(user_id = %user_id, org_id = %org_id))]
	async fn member_exists(&self, user_id: &UserId, org_id: &OrgId) -> Result<bool, DbError> {
		let row = self
			.fetch_optional(
				sqlx::query("SELECT 1 FROM organization_members WHERE user_id = ? AND org_id = ?")
					.bind(user_id.as_str())
					.bind(org_id.as_str()),
			)
			.await?;
		Ok(row.is_some())
	}

	#[tracing::instrument(skip(self), fields(user_id = %user_id, org_id = %org_id))]
	async fn is_owner(&self, user_id: &UserId, org_id: &OrgId) -> Result<bool, DbError> {
		let row = self
			.fetch_optional(
				sqlx::query("SELECT 1 FROM organizations WHERE id = ? AND owner_id = ?")
					.bind(org_id.as_str())
					.bind(user_id.as_str()),
			)
			.await?;
		Ok(row.is_some())
	}

	#[tracing::instrument(skip(self), fields(org_id = %org_id))]
	async fn list_members(&self, org_id: &OrgId) -> Result<Vec<MemberView>, DbError> {
		let rows = self
			.fetch_all(
				sqlx::query(
					r#"
					SELECT m.user_id, u.username, u.email, m.joined_at,
						r.id AS role_id, r.name AS role_name, r.description AS role_description,
						r.base_role_id
					FROM organization_members m
					JOIN users u ON u.id = m.user_id
					JOIN roles r ON r.id = m.role_id
					WHERE m.org_id = ?
					ORDER BY m.joined_at, m.rowid
					"#,
				)
				.bind(org_id.as_str()),
			)
			.await?;

		let members = rows.iter().map(row_to_member_view).collect::<Result<Vec<_>, _>>()?;
		tracing::debug!(org_id = %org_id, count = members.len(), "listed organization members");
		Ok(members)
	}
}

fn row_to_membership(row: &SqliteRow) -> Result<OrgMembership, DbError> {
	let joined_at: String = row.get("joined_at");
	Ok(OrgMembership {
		org_id: OrgId::new(row.get::<String, _>("org_id")),
		user_id: UserId::new(row.get::<String, _>("user_id")),
		role_id: RoleId::new(row.get::<String, _>("role_id")),
		joined_at: parse_timestamp(&joined_at)?,
	})
}

fn row_to_member_view(row: &SqliteRow) -> Result<MemberView, DbError> {
	let joined_at: String = row.get("joined_at");
	Ok(MemberView {
		user_id: UserId::new(row.get::<String, _>("user_id")),
		username: row.get("username"),
		email: row.get("email"),
		joined_at: parse_timestamp(&joined_at)?,
		role: RoleView {
			id: RoleId::new(row.get::<String, _>("role_id")),
			name: row.get("role_name"),
			description: row.get("role_description"),
			base_role_id: row
				.get::<Option<String>, _>("base_role_id")
				.map(RoleId::new),
		},
	})
}
