// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Request identity and token extraction.
//!
//! A token may arrive in three places, checked in this order:
//!
//! 1. the `token` cookie (browser sessions)
//! 2. `Authorization: Bearer <token>`
//! 3. a `?token=` query parameter (websocket upgrades, which cannot set headers)
//!
//! Whatever layer validates the token inserts an [`AuthContext`] into the
//! request extensions; permission gates read it back from there.

use http::header::{AUTHORIZATION, COOKIE};
use http::{HeaderMap, Uri};

use crate::token::Claims;
use crate::types::UserId;

pub const TOKEN_COOKIE_NAME: &str = "token";
const TOKEN_QUERY_PARAM: &str = "token";

/// The authenticated identity attached to a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
	pub user_id: UserId,
	/// JWT id of the token that authenticated this request.
	pub token_id: String,
}

impl AuthContext {
	pub fn new(user_id: UserId, token_id: impl Into<String>) -> Self {
		Self {
			user_id,
			token_id: token_id.into(),
		}
	}

	pub fn from_claims(claims: &Claims) -> Self {
		Self::new(claims.user_id(), claims.jti.clone())
	}
}

/// Extract a named cookie from the `Cookie` header.
pub fn extract_cookie(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
	headers
		.get_all(COOKIE)
		.iter()
		.filter_map(|v| v.to_str().ok())
		.flat_map(|v| v.split(';'))
		.find_map(|cookie| {
			let (name, value) = cookie.trim().split_once('=')?;
			(name == cookie_name && !value.is_empty()).then(|| value.to_string())
		})
}

/// Extract a bearer token from the `Authorization` header.
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
	let auth_str = headers.get(AUTHORIZATION)?.to_str().ok()?;
	auth_str
		.strip_prefix("Bearer ")
		.map(str::trim)
		.filter(|t| !t.is_empty())
		.map(|t| t.to_string())
}

/// Extract the `token` query parameter.
pub fn extract_query_token(uri: &Uri) -> Option<String> {
	uri.query()?.split('&').find_map(|pair| {
		let (key, value) = pair.split_once('=')?;
		(key == TOKEN_QUERY_PARAM && !value.is_empty()).then(|| value.to_string())
	})
}

/// Find a token in cookie, header or query, in that order.
pub fn extract_token(headers: &HeaderMap, uri: &Uri) -> Option<String> {
	extract_cookie(headers, TOKEN_COOKIE_NAME)
		.or_else(|| extract_bearer_token(headers))
		.or_else(|| extract_query_token(uri))
}
