// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Credential hashing.
//!
//! Passwords are stored as PHC strings produced by Argon2id. Verification
//! parses the parameters back out of the stored string, so hashes produced
//! under different cost settings keep verifying.

use argon2::password_hash::{
	rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
};
use argon2::Argon2;
#[cfg(test)]
use argon2::{Algorithm, Params, Version};

use crate::error::{AuthError, Result};

/// Hashes and checks user credentials.
pub trait CredentialVerifier: Send + Sync {
	/// Produce a storable hash for `secret`.
	fn hash(&self, secret: &str) -> Result<String>;

	/// Whether `secret` matches `hash`. A malformed hash is an error, a
	/// mismatch is `Ok(false)`.
	fn verify(&self, secret: &str, hash: &str) -> Result<bool>;
}

/// Argon2id credential verifier.
#[derive(Debug, Clone, Copy, Default)]
pub struct Argon2Verifier;

impl Argon2Verifier {
	pub fn new() -> Self {
		Self
	}
}

/// Production builds use `Argon2::default()` (Argon2id, 19 MiB, 2 passes).
/// Unit tests in this crate use 1 MiB and a single pass.
fn argon2_instance() -> Argon2<'static> {
	#[cfg(test)]
	{
		let params = Params::new(1024, 1, 1, None).expect("valid Argon2 params for tests");
		Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
	}

	#[cfg(not(test))]
	{
		Argon2::default()
	}
}

impl CredentialVerifier for Argon2Verifier {
	#[tracing::instrument(level = "debug", skip_all)]
	fn hash(&self, secret: &str) -> Result<String> {
		let salt = SaltString::generate(&mut OsRng);
		argon2_instance()
			.hash_password(secret.as_bytes(), &salt)
			.map(|h| h.to_string())
			.map_err(|e| AuthError::Hashing(e.to_string()))
	}

	#[tracing::instrument(level = "debug", skip_all)]
	fn verify(&self, secret: &str, hash: &str) -> Result<bool> {
		let parsed = PasswordHash::new(hash).map_err(|e| AuthError::MalformedHash(e.to_string()))?;
		Ok(argon2_instance()
			.verify_password(secret.as_bytes(), &parsed)
			.is_ok())
	}
}
