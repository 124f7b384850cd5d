// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::UserId;

/// A registered user.
///
/// `password_hash` is never serialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
	pub id: UserId,
	pub username: String,
	pub email: String,
	#[serde(skip_serializing, default)]
	pub password_hash: String,
	pub created_at: DateTime<Utc>,
}

impl User {
	pub fn new(username: &str, email: &str, password_hash: String) -> Self {
		Self {
			id: UserId::generate(),
			username: username.to_string(),
			email: email.to_string(),
			password_hash,
			created_at: Utc::now(),
		}
	}

	pub fn profile(&self) -> UserProfile {
		UserProfile {
			id: self.id.clone(),
			username: self.username.clone(),
			email: self.email.clone(),
			created_at: self.created_at,
		}
	}
}

/// Public view of a user, safe to return to any authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
	pub id: UserId,
	pub username: String,
	pub email: String,
	pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn password_hash_is_not_serialized() {
		let user = User::new("alice", "alice@example.com", "$argon2id$secret".to_string());
		let json = serde_json::to_string(&user).unwrap();
		assert!(!json.contains("argon2id"));
		assert!(!json.contains("password_hash"));
	}

	#[test]
	fn profile_copies_identity() {
		let user = User::new("bob", "bob@example.com", String::new());
		let profile = user.profile();
		assert_eq!(profile.id, user.id);
		assert_eq!(profile.username, "bob");
		assert_eq!(profile.email, "bob@example.com");
	}
}
