// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Organization lifecycle.
//!
//! Creating an organization writes the organization row, its four default
//! roles with their grants, and the creator's Owner membership in one
//! transaction. Either all of it lands or none of it does.

use chrono::Utc;
use doodash_server_auth::{
	DefaultRole, OrgId, OrgUpdate, Organization, Role, RoleId, RolePermission, UserId,
};
use doodash_server_db::{DbError, MemberStore, OrgStore, Querier, RoleStore, TxManager};

use crate::error::OrgsError;
use crate::pagination::Pagination;

/// Which organizations to list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrgListQuery {
	/// Organizations owned by this user.
	OwnedBy(UserId),
	/// Name substring search across all organizations, ASCII case-insensitive.
	Search(String),
}

#[derive(Clone)]
pub struct OrgService {
	tx: TxManager,
}

impl OrgService {
	pub fn new(tx: TxManager) -> Self {
		Self { tx }
	}

	#[tracing::instrument(skip(self), fields(user_id = %creator))]
	pub async fn create(&self, creator: &UserId, name: &str) -> Result<Organization, OrgsError> {
		let org = Organization::new(validate_name(name)?, creator.clone());
		if org.slug.is_empty() {
			return Err(OrgsError::BadRequest(
				"organization name must contain letters or digits".to_string(),
			));
		}

		let org = self
			.tx
			.with_tx(|q| async move {
				q.create_org(&org).await.map_err(|e| match e {
					DbError::Conflict(msg) => OrgsError::Conflict(msg),
					other => OrgsError::internal("failed to create organization", other),
				})?;

				let mut owner_role = None;
				for default in DefaultRole::all() {
					let role_id = seed_role(q.as_ref(), &org.id, *default).await?;
					if *default == DefaultRole::Owner {
						owner_role = Some(role_id);
					}
				}
				let owner_role = owner_role.ok_or_else(|| {
					OrgsError::internal(
						"failed to seed roles",
						DbError::Internal("owner role missing after seeding".to_string()),
					)
				})?;

				q.add_member(&org.id, &org.owner_id, &owner_role)
					.await
					.map_err(|e| OrgsError::internal("failed to add owner membership", e))?;

				Ok::<_, OrgsError>(org)
			})
			.await?;

		tracing::info!(org_id = %org.id, slug = %org.slug, "organization created");
		Ok(org)
	}

	/// Apply a sparse update. Authorization happens at the routing boundary;
	/// `actor` is recorded for tracing only.
	#[tracing::instrument(skip(self, update), fields(org_id = %org_id, user_id = %actor))]
	pub async fn update(
		&self,
		org_id: &OrgId,
		actor: &UserId,
		mut update: OrgUpdate,
	) -> Result<Organization, OrgsError> {
		if let Some(name) = update.name.take() {
			let name = validate_name(&name)?;
			if doodash_server_auth::slugify(name).is_empty() {
				return Err(OrgsError::BadRequest(
					"organization name must contain letters or digits".to_string(),
				));
			}
			update.name = Some(name.to_string());
		}

		let org_id = org_id.clone();
		let org = self
			.tx
			.with_tx(|q| async move {
				let mut org = q
					.get_org_by_id(&org_id)
					.await
					.map_err(|e| OrgsError::internal("failed to load organization", e))?
					.ok_or_else(|| OrgsError::NotFound("organization not found".to_string()))?;

				update.apply(&mut org, Utc::now());

				q.update_org(&org).await.map_err(|e| match e {
					DbError::Conflict(msg) => OrgsError::Conflict(msg),
					DbError::NotFound(_) => OrgsError::NotFound("organization not found".to_string()),
					other => OrgsError::internal("failed to update organization", other),
				})?;
				Ok::<_, OrgsError>(org)
			})
			.await?;

		tracing::debug!(org_id = %org.id, "organization updated");
		Ok(org)
	}

	#[tracing::instrument(skip(self), fields(limit = page.limit, offset = page.offset))]
	pub async fn list(
		&self,
		query: &OrgListQuery,
		page: Pagination,
	) -> Result<Vec<Organization>, OrgsError> {
		let db = self.tx.querier();
		let result = match query {
			OrgListQuery::OwnedBy(owner) => db.list_owned_orgs(owner, page.limit, page.offset).await,
			OrgListQuery::Search(search) => db.search_orgs(search.trim(), page.limit, page.offset).await,
		};
		result.map_err(|e| OrgsError::internal("failed to list organizations", e))
	}

	#[tracing::instrument(skip(self), fields(org_id = %org_id))]
	pub async fn get(&self, org_id: &OrgId) -> Result<Organization, OrgsError> {
		self
			.tx
			.querier()
			.get_org_by_id(org_id)
			.await
			.map_err(|e| OrgsError::internal("failed to load organization", e))?
			.ok_or_else(|| OrgsError::NotFound("organization not found".to_string()))
	}
}

fn validate_name(name: &str) -> Result<&str, OrgsError> {
	let name = name.trim();
	if name.is_empty() {
		return Err(OrgsError::BadRequest(
			"organization name must not be empty".to_string(),
		));
	}
	Ok(name)
}

/// Insert one default role and its grants. Returns the new role's id.
async fn seed_role(
	q: &dyn Querier,
	org_id: &OrgId,
	default: DefaultRole,
) -> Result<RoleId, OrgsError> {
	let role = Role {
		id: RoleId::generate(),
		org_id: org_id.clone(),
		name: default.name().to_string(),
		description: Some(default.description().to_string()),
		base_role_id: None,
		created_at: Utc::now(),
	};
	q.create_role(&role)
		.await
		.map_err(|e| OrgsError::internal("failed to create role", e))?;

	for permission in default.permissions() {
		q.create_role_permission(&RolePermission {
			role_id: role.id.clone(),
			permission,
			allowed: true,
		})
		.await
		.map_err(|e| OrgsError::internal("failed to grant role permission", e))?;
	}

	tracing::debug!(role_id = %role.id, role = %default, "default role seeded");
	Ok(role.id)
}
