// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Organization storage.

use async_trait::async_trait;
use doodash_server_auth::{OrgId, Organization, UserId};
use sqlx::{sqlite::SqliteRow, Row};

use crate::error::DbError;
use crate::gateway::{parse_optional_timestamp, parse_timestamp, SqlGateway};

const ORG_COLUMNS: &str = "id, name, slug, owner_id, description, website, logo_url, location, \
	 timezone, is_active, archived_at, settings, created_at, updated_at";

#[async_trait]
pub trait OrgStore: Send + Sync {
	async fn create_org(&self, org: &Organization) -> Result<(), DbError>;
	async fn get_org_by_id(&self, id: &OrgId) -> Result<Option<Organization>, DbError>;
	async fn update_org(&self, org: &Organization) -> Result<(), DbError>;
	async fn list_owned_orgs(
		&self,
		owner_id: &UserId,
		limit: i64,
		offset: i64,
	) -> Result<Vec<Organization>, DbError>;
	async fn search_orgs(
		&self,
		search: &str,
		limit: i64,
		offset: i64,
	) -> Result<Vec<Organization>, DbError>;
}

#[async_trait]
impl OrgStore for SqlGateway {
	/// Insert an organization.
	///
	/// # Errors
	/// Returns `DbError::Conflict` if the name or slug is already taken.
	#[tracing::instrument(skip(self, org), fields(org_id = %org.id, slug = %org.slug))]
	async fn create_org(&self, org: &Organization) -> Result<(), DbError> {
		let settings = serde_json::to_string(&org.settings)?;
		self
			.execute(
				sqlx::query(
					r#"
					INSERT INTO organizations (
						id, name, slug, owner_id, description, website, logo_url, location,
						timezone, is_active, archived_at, settings, created_at, updated_at
					)
					VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
					"#,
				)
				.bind(org.id.as_str())
				.bind(&org.name)
				.bind(&org.slug)
				.bind(org.owner_id.as_str())
				.bind(&org.description)
				.bind(&org.website)
				.bind(&org.logo_url)
				.bind(&org.location)
				.bind(&org.timezone)
				.bind(org.is_active)
				.bind(org.archived_at.map(|t| t.to_rfc3339()))
				.bind(settings)
				.bind(org.created_at.to_rfc3339())
				.bind(org.updated_at.to_rfc3339()),
			)
			.await
			.map_err(|e| {
				DbError::conflict_on_unique(e, format!("organization '{}' already exists", org.slug))
			})?;

		tracing::debug!(org_id = %org.id, slug = %org.slug, "organization created");
		Ok(())
	}

	#[tracing::instrument(skip(self), fields(org_id = %id))]
	async fn get_org_by_id(&self, id: &OrgId) -> Result<Option<Organization>, DbError> {
		let sql = format!("SELECT {ORG_COLUMNS} FROM organizations WHERE id = ?");
		let row = self
			.fetch_optional(sqlx::query(&sql).bind(id.as_str()))
			.await?;

		row.map(|r| row_to_org(&r)).transpose()
	}

	/// Overwrite every mutable column of an organization.
	///
	/// # Errors
	/// Returns `DbError::NotFound` if no row matched and `DbError::Conflict`
	/// if the new name or slug collides with another organization.
	#[tracing::instrument(skip(self, org), fields(org_id = %org.id))]
	async fn update_org(&self, org: &Organization) -> Result<(), DbError> {
		let settings = serde_json::to_string(&org.settings)?;
		let result = self
			.execute(
				sqlx::query(
					r#"
					UPDATE organizations
					SET name = ?, slug = ?, description = ?, website = ?, logo_url = ?,
						location = ?, timezone = ?, is_active = ?, archived_at = ?,
						settings = ?, updated_at = ?
					WHERE id = ?
					"#,
				)
				.bind(&org.name)
				.bind(&org.slug)
				.bind(&org.description)
				.bind(&org.website)
				.bind(&org.logo_url)
				.bind(&org.location)
				.bind(&org.timezone)
				.bind(org.is_active)
				.bind(org.archived_at.map(|t| t.to_rfc3339()))
				.bind(settings)
				.bind(org.updated_at.to_rfc3339())
				.bind(org.id.as_str()),
			)
			.await
			.map_err(|e| {
				DbError::conflict_on_unique(e, format!("organization '{}' already exists", org.slug))
			})?;

		if result.rows_affected() == 0 {
			return Err(DbError::NotFound(format!("organization {}", org.id)));
		}

		tracing::debug!(org_id = %org.id, "organization updated");
		Ok(())
	}

	#[tracing::instrument(skip(self), fields(owner_id = %owner_id, limit, offset))]
	async fn list_owned_orgs(
		&self,
		owner_id: &UserId,
		limit: i64,
		offset: i64,
	) -> Result<Vec<Organization>, DbError> {
		let sql = format!(
			"SELECT {ORG_COLUMNS} FROM organizations WHERE owner_id = ? ORDER BY name LIMIT ? OFFSET ?"
		);
		let rows = self
			.fetch_all(
				sqlx::query(&sql)
					.bind(owner_id.as_str())
					.bind(limit)
					.bind(offset),
			)
			.await?;

		let orgs = rows.iter().map(row_to_org).collect::<Result<Vec<_>, _>>()?;
		tracing::debug!(count = orgs.len(), "listed owned organizations");
		Ok(orgs)
	}

	/// Substring match on name, ASCII case-insensitive (SQLite `LIKE` folds
	/// ASCII only). An empty search matches all.
	#[tracing::instrument(skip(self), fields(limit, offset))]
	async fn search_orgs(
		&self,
		search: &str,
		limit: i64,
		offset: i64,
	) -> Result<Vec<Organization>, DbError> {
		let sql = format!(
			"SELECT {ORG_COLUMNS} FROM organizations \
			 WHERE name LIKE ? ESCAPE '\\' \
			 ORDER BY name LIMIT ? OFFSET ?"
		);
		let pattern = format!("%{}%", escape_like(search));
		let rows = self
			.fetch_all(sqlx::query(&sql).bind(pattern).bind(limit).bind(offset))
			.await?;

		let orgs = rows.iter().map(row_to_org).collect::<Result<Vec<_>, _>>()?;
		tracing::debug!(count = orgs.len(), "searched organizations");
		Ok(orgs)
	}
}

fn escape_like(raw: &str) -> String {
	let mut out = String::with_capacity(raw.len());
	for c in raw.chars() {
		if matches!(c, '%' | '_' | '\\') {
			out.push('\\');
		}
		out.push(c);
	}
	out
}

fn row_to_org(row: &SqliteRow) -> Result<Organization, DbError> {
	let settings: String = row.get("settings");
	let created_at: String = row.get("created_at");
	let updated_at: String = row.get("updated_at");

	Ok(Organization {
		id: OrgId::new(row.get::<String, _>("id")),
		name: row.get("name"),
		slug: row.get("slug"),
		owner_id: UserId::new(row.get::<String, _>("owner_id")),
		description: row.get("description"),
		website: row.get("website"),
		logo_url: row.get("logo_url"),
		location: row.get("location"),
		timezone: row.get("timezone"),
		is_active: row.get("is_active"),
		archived_at: parse_optional_timestamp(row.get("archived_at"))?,
		settings: serde_json::from_str(&settings)?,
		created_at: parse_timestamp(&created_at)?,
		updated_at: parse_timestamp(&updated_at)?,
	})
}
