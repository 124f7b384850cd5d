// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Identity, permission and token primitives for the Doodash server.
//!
//! This crate holds the vocabulary shared by the storage and service layers:
//!
//! - **ID newtypes** ([`UserId`], [`OrgId`], [`RoleId`]) backed by short URL-safe tokens
//! - **Permissions**: the closed [`Permission`] set and the [`DefaultRole`] bundles
//!   seeded into every new organization
//! - **Records**: [`Organization`], [`Role`], [`RolePermission`], [`OrgMembership`], [`User`]
//! - **Collaborators**: [`CredentialVerifier`] (argon2) and [`TokenIssuer`] (JWT)
//! - **Request identity**: [`AuthContext`] plus token extraction helpers

pub mod error;
pub mod middleware;
pub mod org;
pub mod password;
pub mod permission;
pub mod slug;
pub mod token;
pub mod types;
pub mod user;

pub use error::AuthError;
pub use middleware::{
	extract_bearer_token, extract_cookie, extract_query_token, extract_token, AuthContext,
	TOKEN_COOKIE_NAME,
};
pub use org::{
	EffectivePermissions, MemberView, OrgMembership, OrgUpdate, Organization, Role, RolePermission,
	RoleView,
};
pub use password::{Argon2Verifier, CredentialVerifier};
pub use permission::{DefaultRole, ParsePermissionError, Permission};
pub use slug::slugify;
pub use token::{Claims, JwtIssuer, TokenConfig, TokenIssuer, TokenPair, TokenType};
pub use types::{generate_id, OrgId, RoleId, UserId};
pub use user::{User, UserProfile};
