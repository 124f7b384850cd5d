// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
	#[error("credential hashing failed: {0}")]
	Hashing(String),

	#[error("stored credential hash is malformed: {0}")]
	MalformedHash(String),

	#[error("token encoding failed: {0}")]
	TokenEncoding(#[source] jsonwebtoken::errors::Error),

	#[error("invalid token: {0}")]
	InvalidToken(#[source] jsonwebtoken::errors::Error),

	#[error("unexpected token type: expected {expected}, got {actual}")]
	WrongTokenType { expected: String, actual: String },

	#[error("invalid identifier: {0}")]
	InvalidId(String),
}

pub type Result<T> = std::result::Result<T, AuthError>;
