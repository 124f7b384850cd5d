// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Organization, membership and authorization services.
//!
//! Services sit between the HTTP layer and [`doodash_server_db`]. Writes that
//! span more than one statement run through [`TxManager::with_tx`], and any
//! permission check made during such a write reads through the same
//! transaction.
//!
//! [`TxManager::with_tx`]: doodash_server_db::TxManager::with_tx

pub mod auth_service;
pub mod checker;
pub mod error;
pub mod gate;
pub mod membership;
pub mod org_service;
pub mod pagination;

pub use auth_service::{AuthService, Session};
pub use checker::PermissionChecker;
pub use error::{ErrorBody, ErrorKind, OrgsError};
pub use gate::{org_id_from_path, RequireAuth, RequirePermission};
pub use membership::{MembershipService, DEFAULT_MEMBER_ROLE};
pub use org_service::{OrgListQuery, OrgService};
pub use pagination::{PageLimits, PageParams, Pagination};
