// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Route-level authentication and permission layers.
//!
//! [`RequireAuth`] turns a token into an [`AuthContext`] request extension.
//! [`RequirePermission`] reads that context, takes the organization id from
//! the path, and runs a [`PermissionChecker`] before calling the handler.
//!
//! ```ignore
//! Router::new()
//!     .route("/organizations/{org_id}", patch(update_org))
//!     .route_layer(RequirePermission::new(Permission::OrgEdit, checker))
//!     .layer(RequireAuth::new(tokens));
//! ```

use std::future::Future;
use std::mem;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::{IntoResponse, Response};
use doodash_server_auth::{extract_token, AuthContext, OrgId, Permission, TokenIssuer};
use futures::future::BoxFuture;
use pin_project_lite::pin_project;
use tower::{Layer, Service};

use crate::auth_service::authenticate;
use crate::checker::PermissionChecker;
use crate::error::OrgsError;

const ORG_PATH_SEGMENTS: [&str; 3] = ["organizations", "organisations", "orgs"];

/// The organization id in `path`: the segment following `organizations`
/// (or `organisations`, `orgs`).
pub fn org_id_from_path(path: &str) -> Option<OrgId> {
	let mut segments = path.split('/').filter(|s| !s.is_empty());
	segments.find(|s| ORG_PATH_SEGMENTS.contains(s))?;
	segments.next().map(OrgId::new)
}

pin_project! {
	#[project = GateFutureProj]
	pub enum GateFuture<F> {
		Inner { #[pin] fut: F },
		Rejected { resp: Option<Response> },
	}
}

impl<F, E> Future for GateFuture<F>
where
	F: Future<Output = Result<Response, E>>,
{
	type Output = Result<Response, E>;

	fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
		match self.project() {
			GateFutureProj::Inner { fut } => fut.poll(cx),
			GateFutureProj::Rejected { resp } => Poll::Ready(Ok(resp
				.take()
				.unwrap_or_else(|| StatusCode::INTERNAL_SERVER_ERROR.into_response()))),
		}
	}
}

/// Authenticates requests by access token.
#[derive(Clone)]
pub struct RequireAuth {
	tokens: Arc<dyn TokenIssuer>,
}

impl RequireAuth {
	pub fn new(tokens: Arc<dyn TokenIssuer>) -> Self {
		Self { tokens }
	}
}

impl<S> Layer<S> for RequireAuth {
	type Service = RequireAuthService<S>;

	fn layer(&self, inner: S) -> Self::Service {
		RequireAuthService {
			inner,
			tokens: Arc::clone(&self.tokens),
		}
	}
}

#[derive(Clone)]
pub struct RequireAuthService<S> {
	inner: S,
	tokens: Arc<dyn TokenIssuer>,
}

impl<S> Service<Request<Body>> for RequireAuthService<S>
where
	S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
	S::Future: Send,
{
	type Response = Response;
	type Error = S::Error;
	type Future = GateFuture<S::Future>;

	fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
		self.inner.poll_ready(cx)
	}

	fn call(&mut self, mut req: Request<Body>) -> Self::Future {
		let Some(token) = extract_token(req.headers(), req.uri()) else {
			tracing::debug!(path = %req.uri().path(), "no token on request");
			return GateFuture::Rejected {
				resp: Some(OrgsError::Unauthenticated("authentication required".into()).into_response()),
			};
		};

		match authenticate(self.tokens.as_ref(), &token) {
			Ok(ctx) => {
				req.extensions_mut().insert(ctx);
				GateFuture::Inner {
					fut: self.inner.call(req),
				}
			}
			Err(err) => GateFuture::Rejected {
				resp: Some(err.into_response()),
			},
		}
	}
}

/// Requires `permission` in the organization named by the request path.
#[derive(Clone)]
pub struct RequirePermission {
	permission: Permission,
	checker: PermissionChecker,
}

impl RequirePermission {
	pub fn new(permission: Permission, checker: PermissionChecker) -> Self {
		Self {
			permission,
			checker,
		}
	}
}

impl<S> Layer<S> for RequirePermission {
	type Service = RequirePermissionService<S>;

	fn layer(&self, inner: S) -> Self::Service {
		RequirePermissionService {
			inner,
			permission: self.permission,
			checker: self.checker.clone(),
		}
	}
}

#[derive(Clone)]
pub struct RequirePermissionService<S> {
	inner: S,
	permission: Permission,
	checker: PermissionChecker,
}

impl<S> Service<Request<Body>> for RequirePermissionService<S>
where
	S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
	S::Future: Send,
	S::Error: Send + 'static,
{
	type Response = Response;
	type Error = S::Error;
	type Future = GateFuture<BoxFuture<'static, Result<Response, S::Error>>>;

	fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
		self.inner.poll_ready(cx)
	}

	fn call(&mut self, req: Request<Body>) -> Self::Future {
		let Some(ctx) = req.extensions().get::<AuthContext>().cloned() else {
			tracing::debug!(permission = %self.permission, "permission gate: not authenticated");
			return GateFuture::Rejected {
				resp: Some(OrgsError::Unauthenticated("authentication required".into()).into_response()),
			};
		};

		let Some(org_id) = org_id_from_path(req.uri().path()) else {
			tracing::debug!(path = %req.uri().path(), "permission gate: no organization in path");
			return GateFuture::Rejected {
				resp: Some(OrgsError::BadRequest("organization id required".into()).into_response()),
			};
		};

		// The clone that was polled ready must be the one we call.
		let clone = self.inner.clone();
		let mut inner = mem::replace(&mut self.inner, clone);
		let checker = self.checker.clone();
		let permission = self.permission;

		GateFuture::Inner {
			fut: Box::pin(async move {
				match checker.check(&ctx.user_id, &org_id, permission).await {
					Ok(()) => inner.call(req).await,
					Err(err) => Ok(err.into_response()),
				}
			}),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn org_id_follows_collection_segment() {
		assert_eq!(
			org_id_from_path("/api/organizations/abc123/members"),
			Some(OrgId::new("abc123"))
		);
		assert_eq!(
			org_id_from_path("/organisations/xyz"),
			Some(OrgId::new("xyz"))
		);
		assert_eq!(org_id_from_path("/orgs/o1/"), Some(OrgId::new("o1")));
	}

	#[test]
	fn no_org_id() {
		assert_eq!(org_id_from_path("/api/organizations"), None);
		assert_eq!(org_id_from_path("/api/users/abc"), None);
		assert_eq!(org_id_from_path(""), None);
	}
}
