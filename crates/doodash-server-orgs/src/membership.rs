// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Organization membership.

use doodash_server_auth::{
	EffectivePermissions, MemberView, OrgId, Permission, Role, RoleId, UserId,
};
use doodash_server_db::{DbError, MemberStore, Querier, RoleStore, TxManager, UserStore};

use crate::checker::PermissionChecker;
use crate::error::OrgsError;

/// Role given to new members when none is requested. Matched case-insensitively.
pub const DEFAULT_MEMBER_ROLE: &str = "member";

#[derive(Clone)]
pub struct MembershipService {
	tx: TxManager,
}

impl MembershipService {
	pub fn new(tx: TxManager) -> Self {
		Self { tx }
	}

	/// Add `target` to `org_id`.
	///
	/// `actor` needs `org:invite_member`, and also `org:assign_role` when
	/// `role_id` is given. Without a role the organization's "member" role
	/// is used. Every check and the insert share one transaction.
	#[tracing::instrument(skip(self), fields(org_id = %org_id, actor = %actor, target = %target))]
	pub async fn create(
		&self,
		actor: &UserId,
		org_id: &OrgId,
		target: &UserId,
		role_id: Option<&RoleId>,
	) -> Result<MemberView, OrgsError> {
		let actor = actor.clone();
		let org_id = org_id.clone();
		let target = target.clone();
		let role_id = role_id.cloned();

		let view = self
			.tx
			.with_tx(|q| async move {
				let checker = PermissionChecker::new(q.clone());
				checker
					.check(&actor, &org_id, Permission::OrgInviteMember)
					.await?;

				let user = q
					.get_user_by_id(&target)
					.await
					.map_err(|e| OrgsError::internal("failed to load user", e))?
					.ok_or_else(|| OrgsError::NotFound("user not found".to_string()))?;

				let role = match role_id {
					None => resolve_role(q.get_role_by_name(&org_id, DEFAULT_MEMBER_ROLE).await)?,
					Some(role_id) => {
						checker
							.check(&actor, &org_id, Permission::OrgAssignRole)
							.await?;
						resolve_role(q.get_role_by_id(&role_id, Some(&org_id)).await)?
					}
				};

				let exists = q
					.member_exists(&target, &org_id)
					.await
					.map_err(|e| OrgsError::internal("failed to check membership", e))?;
				if exists {
					return Err(OrgsError::Conflict(
						"user already member of organization".to_string(),
					));
				}

				let membership = q
					.add_member(&org_id, &target, &role.id)
					.await
					.map_err(|e| match e {
						DbError::Conflict(msg) => OrgsError::Conflict(msg),
						other => OrgsError::internal("failed to add member", other),
					})?;

				Ok::<_, OrgsError>(MemberView::new(&user, role, membership.joined_at))
			})
			.await?;

		tracing::info!(role = %view.role.name, "member added");
		Ok(view)
	}

	/// The allowed permissions of `user_id`'s role in `org_id`.
	///
	/// No owner bypass is applied to the list; `is_owner` reports it instead.
	#[tracing::instrument(skip(self), fields(user_id = %user_id, org_id = %org_id))]
	pub async fn effective_permissions(
		&self,
		user_id: &UserId,
		org_id: &OrgId,
	) -> Result<EffectivePermissions, OrgsError> {
		let db = self.tx.querier();
		effective_permissions(db.as_ref(), user_id, org_id).await
	}

	#[tracing::instrument(skip(self), fields(org_id = %org_id))]
	pub async fn list_members(&self, org_id: &OrgId) -> Result<Vec<MemberView>, OrgsError> {
		self
			.tx
			.querier()
			.list_members(org_id)
			.await
			.map_err(|e| OrgsError::internal("failed to list members", e))
	}
}

fn resolve_role(result: Result<Role, DbError>) -> Result<Role, OrgsError> {
	result.map_err(|e| match e {
		DbError::NotFound(_) => OrgsError::NotFound("role not found".to_string()),
		other => OrgsError::internal("failed to load role", other),
	})
}

async fn effective_permissions(
	db: &dyn Querier,
	user_id: &UserId,
	org_id: &OrgId,
) -> Result<EffectivePermissions, OrgsError> {
	let membership = db.get_membership(user_id, org_id).await.map_err(|e| match e {
		DbError::NotFound(_) => OrgsError::forbidden("user not a member of organization"),
		other => OrgsError::internal("failed to load membership", other),
	})?;

	let role = db
		.get_role_by_id(&membership.role_id, Some(org_id))
		.await
		.map_err(|e| OrgsError::internal("failed to load role", e))?;

	let permissions = db
		.get_role_permissions(&role.id)
		.await
		.map_err(|e| OrgsError::internal("failed to load role permissions", e))?
		.into_iter()
		.filter(|grant| grant.allowed)
		.map(|grant| grant.permission)
		.collect();

	let is_owner = db
		.is_owner(user_id, org_id)
		.await
		.map_err(|e| OrgsError::internal("failed to verify organization ownership", e))?;

	Ok(EffectivePermissions {
		role: role.into(),
		permissions,
		is_owner,
	})
}
