// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Service error taxonomy.
//!
//! Stores return [`DbError`] untouched; services translate into
//! [`OrgsError`] with a message fit for the caller. `Internal` keeps the
//! underlying cause as its `source()` for logs but never renders it.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use doodash_server_auth::Permission;
use doodash_server_db::DbError;
use serde::Serialize;
use std::fmt;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
	NotFound,
	Conflict,
	Forbidden,
	Unauthenticated,
	BadRequest,
	Internal,
}

impl ErrorKind {
	pub fn status_code(&self) -> StatusCode {
		match self {
			ErrorKind::NotFound => StatusCode::NOT_FOUND,
			ErrorKind::Conflict => StatusCode::CONFLICT,
			ErrorKind::Forbidden => StatusCode::FORBIDDEN,
			ErrorKind::Unauthenticated => StatusCode::UNAUTHORIZED,
			ErrorKind::BadRequest => StatusCode::BAD_REQUEST,
			ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}
}

impl fmt::Display for ErrorKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ErrorKind::NotFound => write!(f, "not_found"),
			ErrorKind::Conflict => write!(f, "conflict"),
			ErrorKind::Forbidden => write!(f, "forbidden"),
			ErrorKind::Unauthenticated => write!(f, "unauthenticated"),
			ErrorKind::BadRequest => write!(f, "bad_request"),
			ErrorKind::Internal => write!(f, "internal"),
		}
	}
}

#[derive(Debug, thiserror::Error)]
pub enum OrgsError {
	#[error("{0}")]
	NotFound(String),

	#[error("{0}")]
	Conflict(String),

	#[error("{message}")]
	Forbidden {
		message: String,
		/// The permission that was checked, when a check failed.
		missing: Option<Permission>,
	},

	#[error("{0}")]
	Unauthenticated(String),

	#[error("{0}")]
	BadRequest(String),

	#[error("{message}")]
	Internal {
		message: String,
		#[source]
		source: BoxError,
	},
}

impl OrgsError {
	pub fn internal(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
		OrgsError::Internal {
			message: message.into(),
			source: source.into(),
		}
	}

	pub fn forbidden(message: impl Into<String>) -> Self {
		OrgsError::Forbidden {
			message: message.into(),
			missing: None,
		}
	}

	pub fn missing_permission(permission: Permission) -> Self {
		OrgsError::Forbidden {
			message: "insufficient permissions".to_string(),
			missing: Some(permission),
		}
	}

	pub fn kind(&self) -> ErrorKind {
		match self {
			OrgsError::NotFound(_) => ErrorKind::NotFound,
			OrgsError::Conflict(_) => ErrorKind::Conflict,
			OrgsError::Forbidden { .. } => ErrorKind::Forbidden,
			OrgsError::Unauthenticated(_) => ErrorKind::Unauthenticated,
			OrgsError::BadRequest(_) => ErrorKind::BadRequest,
			OrgsError::Internal { .. } => ErrorKind::Internal,
		}
	}

	pub fn status_code(&self) -> StatusCode {
		self.kind().status_code()
	}
}

/// Fallback translation used by the transaction coordinator.
///
/// Services map the errors they expect explicitly; anything that arrives
/// here unmapped keeps its kind where one exists.
impl From<DbError> for OrgsError {
	fn from(err: DbError) -> Self {
		match err {
			DbError::NotFound(msg) => OrgsError::NotFound(msg),
			DbError::Conflict(msg) => OrgsError::Conflict(msg),
			other => OrgsError::internal("storage failure", other),
		}
	}
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
	pub code: ErrorKind,
	pub message: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub missing_permission: Option<Permission>,
}

impl IntoResponse for OrgsError {
	fn into_response(self) -> Response {
		let status = self.status_code();
		let missing_permission = match &self {
			OrgsError::Forbidden { missing, .. } => *missing,
			_ => None,
		};
		if let OrgsError::Internal { message, source } = &self {
			tracing::error!(error = %source, "{message}");
		}
		let body = ErrorBody {
			code: self.kind(),
			message: self.to_string(),
			missing_permission,
		};
		(status, Json(body)).into_response()
	}
}
