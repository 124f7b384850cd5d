// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Organization creation leaves nothing behind when any step fails.

use doodash_server_auth::DefaultRole;
use doodash_server_db::testing::{create_migrated_test_pool, insert_test_user};
use doodash_server_db::TxManager;
use doodash_server_orgs::{ErrorKind, OrgService};
use sqlx::SqlitePool;

async fn count(pool: &SqlitePool, table: &str) -> i64 {
	sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM {table}"))
		.fetch_one(pool)
		.await
		.unwrap()
}

async fn assert_empty(pool: &SqlitePool) {
	for table in [
		"organizations",
		"roles",
		"role_permissions",
		"organization_members",
	] {
		assert_eq!(count(pool, table).await, 0, "{table} should be empty");
	}
}

/// Create an organization with a trigger that aborts inserts into `table`
/// once it holds `after` rows, and assert nothing was written.
async fn assert_failure_rolls_back(table: &str, after: usize) {
	let pool = create_migrated_test_pool().await.unwrap();
	let alice = insert_test_user(&pool, "alice").await.unwrap();
	sqlx::query(&format!(
		"CREATE TRIGGER inject_failure BEFORE INSERT ON {table} \
		 WHEN (SELECT COUNT(*) FROM {table}) >= {after} \
		 BEGIN SELECT RAISE(ABORT, 'injected failure'); END"
	))
	.execute(&pool)
	.await
	.unwrap();

	let err = OrgService::new(TxManager::new(pool.clone()))
		.create(&alice, "Acme Corp")
		.await
		.unwrap_err();
	assert_eq!(err.kind(), ErrorKind::Internal, "{table} after {after}");
	assert!(!err.to_string().contains("injected"));
	assert_empty(&pool).await;
}

#[tokio::test]
async fn failure_creating_organization_rolls_back() {
	assert_failure_rolls_back("organizations", 0).await;
}

#[tokio::test]
async fn failure_at_each_role_rolls_back() {
	for after in 0..DefaultRole::all().len() {
		assert_failure_rolls_back("roles", after).await;
	}
}

#[tokio::test]
async fn failure_at_each_grant_rolls_back() {
	let grants: usize = DefaultRole::all().iter().map(|r| r.permissions().len()).sum();
	for after in 0..grants {
		assert_failure_rolls_back("role_permissions", after).await;
	}
}

#[tokio::test]
async fn failure_adding_owner_rolls_back_everything() {
	let pool = create_migrated_test_pool().await.unwrap();
	let alice = insert_test_user(&pool, "alice").await.unwrap();
	sqlx::query(
		r#"
		CREATE TRIGGER fail_members BEFORE INSERT ON organization_members
		BEGIN
			SELECT RAISE(ABORT, 'injected failure');
		END
		"#,
	)
	.execute(&pool)
	.await
	.unwrap();

	let err = OrgService::new(TxManager::new(pool.clone()))
		.create(&alice, "Acme Corp")
		.await
		.unwrap_err();
	assert_eq!(err.kind(), ErrorKind::Internal);
	assert_empty(&pool).await;

	sqlx::query("DROP TRIGGER fail_members")
		.execute(&pool)
		.await
		.unwrap();
	let org = OrgService::new(TxManager::new(pool.clone()))
		.create(&alice, "Acme Corp")
		.await
		.unwrap();
	assert_eq!(org.slug, "acme-corp");
	assert_eq!(count(&pool, "roles").await, 4);
	assert_eq!(count(&pool, "organization_members").await, 1);
}
