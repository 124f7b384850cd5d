// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Permission keys and the default role bundles.
//!
//! Permissions are stored as their key string (e.g. `org:invite_member`) in
//! `role_permissions.permission`. The set is closed: anything not listed in
//! [`Permission`] fails to parse.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// =============================================================================
// Permission
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Permission {
	#[serde(rename = "org:edit")]
	OrgEdit,
	#[serde(rename = "org:delete")]
	OrgDelete,
	#[serde(rename = "org:view_members")]
	OrgViewMembers,
	#[serde(rename = "org:invite_member")]
	OrgInviteMember,
	#[serde(rename = "org:remove_member")]
	OrgRemoveMember,
	#[serde(rename = "org:assign_role")]
	OrgAssignRole,

	#[serde(rename = "project:create")]
	ProjectCreate,
	#[serde(rename = "project:edit")]
	ProjectEdit,
	#[serde(rename = "project:view")]
	ProjectView,
	#[serde(rename = "project:delete")]
	ProjectDelete,

	#[serde(rename = "kanban:create")]
	KanbanCreate,
	#[serde(rename = "kanban:edit")]
	KanbanEdit,
	#[serde(rename = "kanban:view")]
	KanbanView,
	#[serde(rename = "kanban:delete")]
	KanbanDelete,

	#[serde(rename = "whiteboard:create")]
	WhiteboardCreate,
	#[serde(rename = "whiteboard:edit")]
	WhiteboardEdit,
	#[serde(rename = "whiteboard:view")]
	WhiteboardView,
	#[serde(rename = "whiteboard:delete")]
	WhiteboardDelete,
}

impl Permission {
	/// Returns every known permission.
	pub fn all() -> &'static [Permission] {
		use Permission::*;
		&[
			OrgEdit,
			OrgDelete,
			OrgViewMembers,
			OrgInviteMember,
			OrgRemoveMember,
			OrgAssignRole,
			ProjectCreate,
			ProjectEdit,
			ProjectView,
			ProjectDelete,
			KanbanCreate,
			KanbanEdit,
			KanbanView,
			KanbanDelete,
			WhiteboardCreate,
			WhiteboardEdit,
			WhiteboardView,
			WhiteboardDelete,
		]
	}

	/// The storage key for this permission.
	pub fn as_str(&self) -> &'static str {
		use Permission::*;
		match self {
			OrgEdit => "org:edit",
			OrgDelete => "org:delete",
			OrgViewMembers => "org:view_members",
			OrgInviteMember => "org:invite_member",
			OrgRemoveMember => "org:remove_member",
			OrgAssignRole => "org:assign_role",
			ProjectCreate => "project:create",
			ProjectEdit => "project:edit",
			ProjectView => "project:view",
			ProjectDelete => "project:delete",
			KanbanCreate => "kanban:create",
			KanbanEdit => "kanban:edit",
			KanbanView => "kanban:view",
			KanbanDelete => "kanban:delete",
			WhiteboardCreate => "whiteboard:create",
			WhiteboardEdit => "whiteboard:edit",
			WhiteboardView => "whiteboard:view",
			WhiteboardDelete => "whiteboard:delete",
		}
	}

	/// True for the `org:*` administrative permissions.
	pub fn is_org_scoped(&self) -> bool {
		self.as_str().starts_with("org:")
	}
}

impl fmt::Display for Permission {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown permission: {0}")]
pub struct ParsePermissionError(pub String);

impl FromStr for Permission {
	type Err = ParsePermissionError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Permission::all()
			.iter()
			.copied()
			.find(|p| p.as_str() == s)
			.ok_or_else(|| ParsePermissionError(s.to_string()))
	}
}

// =============================================================================
// Default Roles
// =============================================================================

/// The roles seeded into every new organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefaultRole {
	Owner,
	Admin,
	Member,
	Viewer,
}

impl DefaultRole {
	/// Returns the seeded roles in seeding order.
	pub fn all() -> &'static [DefaultRole] {
		&[
			DefaultRole::Owner,
			DefaultRole::Admin,
			DefaultRole::Member,
			DefaultRole::Viewer,
		]
	}

	/// Display name stored in `roles.name`.
	pub fn name(&self) -> &'static str {
		match self {
			DefaultRole::Owner => "Owner",
			DefaultRole::Admin => "Admin",
			DefaultRole::Member => "Member",
			DefaultRole::Viewer => "Viewer",
		}
	}

	pub fn description(&self) -> &'static str {
		match self {
			DefaultRole::Owner => "Full control over the organization",
			DefaultRole::Admin => "Manage the organization and its members",
			DefaultRole::Member => "Create and edit projects, boards and whiteboards",
			DefaultRole::Viewer => "Read-only access",
		}
	}

	/// Permissions granted to this role when an organization is created.
	pub fn permissions(&self) -> Vec<Permission> {
		use Permission::*;
		match self {
			DefaultRole::Owner => Permission::all().to_vec(),
			DefaultRole::Admin => Permission::all()
				.iter()
				.copied()
				.filter(|p| *p != OrgDelete)
				.collect(),
			DefaultRole::Member => vec![
				ProjectView,
				ProjectCreate,
				ProjectEdit,
				KanbanView,
				KanbanCreate,
				KanbanEdit,
				WhiteboardView,
				WhiteboardCreate,
				WhiteboardEdit,
			],
			DefaultRole::Viewer => vec![ProjectView, KanbanView, WhiteboardView],
		}
	}
}

impl fmt::Display for DefaultRole {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name())
	}
}
