// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::sync::Arc;

use doodash_server_auth::{OrgId, Permission, UserId};
use doodash_server_db::{MemberStore, Querier, RoleStore};

use crate::error::OrgsError;

/// Decides whether a user may exercise a permission in an organization.
///
/// The organization's owner passes every check, whatever their role says.
/// Everyone else needs an allowed grant on the role of their membership.
/// A storage failure is `Internal`, never a denial.
#[derive(Clone)]
pub struct PermissionChecker {
	db: Arc<dyn Querier>,
}

impl PermissionChecker {
	/// Checks run against `db`, which may be pool- or transaction-backed.
	pub fn new(db: Arc<dyn Querier>) -> Self {
		Self { db }
	}

	#[tracing::instrument(skip(self), fields(user_id = %user_id, org_id = %org_id, permission = %permission))]
	pub async fn check(
		&self,
		user_id: &UserId,
		org_id: &OrgId,
		permission: Permission,
	) -> Result<(), OrgsError> {
		let is_owner = self
			.db
			.is_owner(user_id, org_id)
			.await
			.map_err(|e| OrgsError::internal("failed to verify organization ownership", e))?;
		if is_owner {
			tracing::debug!("permission granted: organization owner");
			return Ok(());
		}

		let allowed = self
			.db
			.has_permission(user_id, org_id, permission)
			.await
			.map_err(|e| OrgsError::internal("failed to verify permission", e))?;
		if allowed {
			tracing::debug!("permission granted by role");
			Ok(())
		} else {
			tracing::info!(permission = %permission, "permission denied");
			Err(OrgsError::missing_permission(permission))
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::error::ErrorKind;
	use chrono::Utc;
	use doodash_server_auth::{Organization, Role, RoleId, RolePermission};
	use doodash_server_db::testing::{create_migrated_test_pool, insert_test_user};
	use doodash_server_db::{MemberStore, OrgStore, RoleStore, SqlGateway};
	use proptest::prelude::*;

	struct Fixture {
		checker: PermissionChecker,
		pool: sqlx::SqlitePool,
		owner: UserId,
		member: UserId,
		outsider: UserId,
		org: Organization,
	}

	async fn setup() -> Fixture {
		let pool = create_migrated_test_pool().await.unwrap();
		let owner = insert_test_user(&pool, "owner").await.unwrap();
		let member = insert_test_user(&pool, "member").await.unwrap();
		let outsider = insert_test_user(&pool, "outsider").await.unwrap();
		let db = Arc::new(SqlGateway::new(pool.clone()));

		let org = Organization::new("Acme Corp", owner.clone());
		db.create_org(&org).await.unwrap();
		let role = Role {
			id: RoleId::generate(),
			org_id: org.id.clone(),
			name: "Viewer".into(),
			description: None,
			base_role_id: None,
			created_at: Utc::now(),
		};
		db.create_role(&role).await.unwrap();
		db.create_role_permission(&RolePermission {
			role_id: role.id.clone(),
			permission: Permission::ProjectView,
			allowed: true,
		})
		.await
		.unwrap();
		db.add_member(&org.id, &member, &role.id).await.unwrap();

		Fixture {
			checker: PermissionChecker::new(db),
			pool,
			owner,
			member,
			outsider,
			org,
		}
	}

	#[tokio::test]
	async fn owner_without_membership_passes_everything() {
		let f = setup().await;
		for p in Permission::all() {
			f.checker.check(&f.owner, &f.org.id, *p).await.unwrap();
		}
	}

	#[tokio::test]
	async fn member_passes_only_granted() {
		let f = setup().await;
		f.checker
			.check(&f.member, &f.org.id, Permission::ProjectView)
			.await
			.unwrap();
		let err = f
			.checker
			.check(&f.member, &f.org.id, Permission::ProjectEdit)
			.await
			.unwrap_err();
		assert!(matches!(
			err,
			OrgsError::Forbidden {
				missing: Some(Permission::ProjectEdit),
				..
			}
		));
	}

	#[tokio::test]
	async fn outsider_is_forbidden() {
		let f = setup().await;
		let err = f
			.checker
			.check(&f.outsider, &f.org.id, Permission::ProjectView)
			.await
			.unwrap_err();
		assert_eq!(err.kind(), ErrorKind::Forbidden);
	}

	#[tokio::test]
	async fn storage_failure_is_internal_not_denied() {
		let f = setup().await;
		sqlx::query("DROP TABLE organization_members")
			.execute(&f.pool)
			.await
			.unwrap();
		let err = f
			.checker
			.check(&f.member, &f.org.id, Permission::ProjectView)
			.await
			.unwrap_err();
		assert_eq!(err.kind(), ErrorKind::Internal);
		assert_eq!(err.to_string(), "failed to verify permission");
	}

	#[derive(Clone, Default)]
	struct Capture(Arc<std::sync::Mutex<Vec<u8>>>);

	impl std::io::Write for Capture {
		fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
			self.0.lock().unwrap().extend_from_slice(buf);
			Ok(buf.len())
		}

		fn flush(&mut self) -> std::io::Result<()> {
			Ok(())
		}
	}

	impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for Capture {
		type Writer = Capture;

		fn make_writer(&'a self) -> Self::Writer {
			self.clone()
		}
	}

	#[test]
	fn denial_event_carries_the_permission() {
		let capture = Capture::default();
		let subscriber = tracing_subscriber::fmt()
			.json()
			.with_current_span(false)
			.with_span_list(false)
			.with_writer(capture.clone())
			.finish();
		let rt = tokio::runtime::Builder::new_current_thread()
			.enable_all()
			.build()
			.unwrap();

		tracing::subscriber::with_default(subscriber, || {
			rt.block_on(async {
				let f = setup().await;
				f.checker
					.check(&f.member, &f.org.id, Permission::ProjectEdit)
					.await
					.unwrap_err();
			});
		});

		let output = String::from_utf8(capture.0.lock().unwrap().clone()).unwrap();
		let line = output
			.lines()
			.find(|l| l.contains("permission denied"))
			.unwrap();
		assert!(line.contains(r#""permission":"project:edit""#), "{line}");
	}

	proptest! {
		#![proptest_config(ProptestConfig::with_cases(8))]
		#[test]
		fn owner_bypass_holds_for_any_permission(idx in 0usize..18) {
			let rt = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();
			let permission = Permission::all()[idx];
			rt.block_on(async {
				let f = setup().await;
				f.checker.check(&f.owner, &f.org.id, permission).await.unwrap();
			});
		}
	}
}
