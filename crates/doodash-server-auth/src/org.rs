// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Organization, role and membership records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::permission::Permission;
use crate::slug::slugify;
use crate::types::{OrgId, RoleId, UserId};
use crate::user::User;

pub const DEFAULT_TIMEZONE: &str = "UTC";

/// A tenant. Owns its roles and their grants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Organization {
	pub id: OrgId,
	pub name: String,
	pub slug: String,
	pub owner_id: UserId,
	pub description: Option<String>,
	pub website: Option<String>,
	pub logo_url: Option<String>,
	pub location: Option<String>,
	pub timezone: String,
	pub is_active: bool,
	pub archived_at: Option<DateTime<Utc>>,
	pub settings: serde_json::Value,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

impl Organization {
	/// Build a fresh, active organization owned by `owner_id`.
	///
	/// The slug is always derived from `name`.
	pub fn new(name: &str, owner_id: UserId) -> Self {
		let now = Utc::now();
		Self {
			id: OrgId::generate(),
			name: name.to_string(),
			slug: slugify(name),
			owner_id,
			description: None,
			website: None,
			logo_url: None,
			location: None,
			timezone: DEFAULT_TIMEZONE.to_string(),
			is_active: true,
			archived_at: None,
			settings: serde_json::Value::Object(Default::default()),
			created_at: now,
			updated_at: now,
		}
	}

	pub fn is_archived(&self) -> bool {
		self.archived_at.is_some()
	}
}

/// Sparse update for an organization. `None` leaves the stored value alone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrgUpdate {
	pub name: Option<String>,
	pub description: Option<String>,
	pub website: Option<String>,
	pub logo_url: Option<String>,
	pub location: Option<String>,
	pub timezone: Option<String>,
	pub is_active: Option<bool>,
	pub settings: Option<serde_json::Value>,
}

impl OrgUpdate {
	pub fn is_empty(&self) -> bool {
		*self == OrgUpdate::default()
	}

	/// Apply this update to `org` in place, stamping `now` where needed.
	///
	/// A new name also rewrites the slug. Deactivating archives the
	/// organization at `now`; reactivating clears the archive timestamp.
	pub fn apply(self, org: &mut Organization, now: DateTime<Utc>) {
		if let Some(name) = self.name {
			org.slug = slugify(&name);
			org.name = name;
		}
		if let Some(v) = self.description {
			org.description = Some(v);
		}
		if let Some(v) = self.website {
			org.website = Some(v);
		}
		if let Some(v) = self.logo_url {
			org.logo_url = Some(v);
		}
		if let Some(v) = self.location {
			org.location = Some(v);
		}
		if let Some(v) = self.timezone {
			org.timezone = v;
		}
		if let Some(active) = self.is_active {
			org.is_active = active;
			org.archived_at = if active { None } else { Some(now) };
		}
		if let Some(v) = self.settings {
			org.settings = v;
		}
		org.updated_at = now;
	}
}

/// A named permission bundle scoped to one organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
	pub id: RoleId,
	pub org_id: OrgId,
	pub name: String,
	pub description: Option<String>,
	/// Stored for a future inheritance feature. Never resolved.
	pub base_role_id: Option<RoleId>,
	pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RolePermission {
	pub role_id: RoleId,
	pub permission: Permission,
	pub allowed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrgMembership {
	pub org_id: OrgId,
	pub user_id: UserId,
	pub role_id: RoleId,
	pub joined_at: DateTime<Utc>,
}

/// Public shape of a role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleView {
	pub id: RoleId,
	pub name: String,
	pub description: Option<String>,
	pub base_role_id: Option<RoleId>,
}

impl From<Role> for RoleView {
	fn from(role: Role) -> Self {
		Self {
			id: role.id,
			name: role.name,
			description: role.description,
			base_role_id: role.base_role_id,
		}
	}
}

/// A member as shown to other members: public identity plus role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberView {
	pub user_id: UserId,
	pub username: String,
	pub email: String,
	pub joined_at: DateTime<Utc>,
	pub role: RoleView,
}

impl MemberView {
	pub fn new(user: &User, role: Role, joined_at: DateTime<Utc>) -> Self {
		Self {
			user_id: user.id.clone(),
			username: user.username.clone(),
			email: user.email.clone(),
			joined_at,
			role: role.into(),
		}
	}
}

/// The role-based grant set of one member.
///
/// This is the literal content of `role_permissions` for the member's role.
/// It does not account for the owner bypass; `is_owner` tells callers when
/// the list understates actual access.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectivePermissions {
	pub role: RoleView,
	pub permissions: Vec<Permission>,
	pub is_owner: bool,
}
