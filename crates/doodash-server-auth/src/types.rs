// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Identifier types.
//!
//! Every entity is keyed by a 21-character token drawn from the URL-safe
//! alphabet `A-Za-z0-9_-`. At 126 bits of randomness the collision
//! probability is negligible for any realistic number of rows, and the
//! tokens can be placed directly into paths without escaping.
//!
//! All ID types serialize transparently as their string form.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::AuthError;

/// Length of generated identifiers.
pub const ID_LENGTH: usize = 21;

const ID_ALPHABET: &[u8; 64] =
	b"_-0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Generate a new random URL-safe identifier.
pub fn generate_id() -> String {
	let mut rng = rand::thread_rng();
	(0..ID_LENGTH)
		.map(|_| ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())] as char)
		.collect()
}

fn is_id_char(c: char) -> bool {
	c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

// =============================================================================
// ID Newtypes
// =============================================================================

macro_rules! define_id_type {
	($name:ident, $doc:expr) => {
		#[doc = $doc]
		#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
		#[serde(transparent)]
		pub struct $name(String);

		impl $name {
			/// Wrap an existing identifier without validation.
			///
			/// Used when reading rows back from storage.
			pub fn new(id: impl Into<String>) -> Self {
				Self(id.into())
			}

			/// Generate a new random ID.
			pub fn generate() -> Self {
				Self(generate_id())
			}

			/// Parse an identifier supplied by a caller.
			pub fn parse(raw: &str) -> Result<Self, AuthError> {
				if raw.is_empty() || !raw.chars().all(is_id_char) {
					return Err(AuthError::InvalidId(raw.to_string()));
				}
				Ok(Self(raw.to_string()))
			}

			pub fn as_str(&self) -> &str {
				&self.0
			}

			pub fn into_inner(self) -> String {
				self.0
			}
		}

		impl fmt::Display for $name {
			fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
				f.write_str(&self.0)
			}
		}

		impl From<String> for $name {
			fn from(id: String) -> Self {
				Self(id)
			}
		}

		impl From<&str> for $name {
			fn from(id: &str) -> Self {
				Self(id.to_string())
			}
		}

		impl AsRef<str> for $name {
			fn as_ref(&self) -> &str {
				&self.0
			}
		}
	};
}

define_id_type!(UserId, "Unique identifier for a user.");
define_id_type!(OrgId, "Unique identifier for an organization.");
define_id_type!(RoleId, "Unique identifier for an organization-scoped role.");

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;
	use std::collections::HashSet;

	mod id_types {
		use super::*;

		#[test]
		fn generated_ids_have_fixed_length() {
			assert_eq!(OrgId::generate().as_str().len(), ID_LENGTH);
			assert_eq!(generate_id().len(), ID_LENGTH);
		}

		#[test]
		fn generated_ids_are_url_safe() {
			for _ in 0..100 {
				let id = RoleId::generate();
				assert!(id.as_str().chars().all(is_id_char), "bad id {id}");
			}
		}

		#[test]
		fn generated_ids_are_unique() {
			let ids: HashSet<String> = (0..1000).map(|_| generate_id()).collect();
			assert_eq!(ids.len(), 1000);
		}

		#[test]
		fn serializes_as_plain_string() {
			let id = UserId::new("V1StGXR8_Z5jdHi6B-myT");
			let json = serde_json::to_string(&id).unwrap();
			assert_eq!(json, "\"V1StGXR8_Z5jdHi6B-myT\"");
			let back: UserId = serde_json::from_str(&json).unwrap();
			assert_eq!(back, id);
		}

		#[test]
		fn parse_rejects_empty_and_unsafe() {
			assert!(OrgId::parse("").is_err());
			assert!(OrgId::parse("a/b").is_err());
			assert!(OrgId::parse("has space").is_err());
			assert!(OrgId::parse("ok_id-123").is_ok());
		}
	}

	proptest! {
		#[test]
		fn parse_accepts_every_generated_id(_seed in 0u32..200) {
			let id = generate_id();
			let parsed = OrgId::parse(&id).unwrap();
			prop_assert_eq!(parsed.as_str(), id.as_str());
		}

		#[test]
		fn display_matches_inner(raw in "[A-Za-z0-9_-]{1,32}") {
			let id = UserId::new(raw.clone());
			prop_assert_eq!(id.to_string(), raw);
		}
	}
}
