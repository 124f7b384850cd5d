// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! A new organization, its first members, and the checks between them.

use chrono::Utc;
use doodash_server_auth::{DefaultRole, OrgUpdate, Permission, Role, RoleId, RolePermission};
use doodash_server_db::testing::{create_migrated_test_pool, insert_test_user};
use doodash_server_db::{MemberStore, RoleStore, TxManager};
use doodash_server_orgs::{
	ErrorKind, MembershipService, OrgListQuery, OrgService, OrgsError, PageLimits, PageParams,
	Pagination,
};

#[tokio::test]
async fn acme_corp_lifecycle() {
	let pool = create_migrated_test_pool().await.unwrap();
	let alice = insert_test_user(&pool, "alice").await.unwrap();
	let bob = insert_test_user(&pool, "bob").await.unwrap();
	let carol = insert_test_user(&pool, "carol").await.unwrap();
	let dave = insert_test_user(&pool, "dave").await.unwrap();
	let tx = TxManager::new(pool);
	let orgs = OrgService::new(tx.clone());
	let members = MembershipService::new(tx.clone());

	// Alice creates the organization and owns it.
	let org = orgs.create(&alice, "Acme Corp").await.unwrap();
	assert_eq!(org.slug, "acme-corp");
	let roles = tx.querier().list_roles(&org.id).await.unwrap();
	assert_eq!(roles.len(), 4);
	let alice_perms = members.effective_permissions(&alice, &org.id).await.unwrap();
	assert!(alice_perms.is_owner);
	assert_eq!(alice_perms.permissions.len(), Permission::all().len());

	// Bob joins with the default role: exactly the Member set, no org:* keys.
	let bob_view = members.create(&alice, &org.id, &bob, None).await.unwrap();
	assert_eq!(bob_view.role.name, "Member");
	let bob_perms = members.effective_permissions(&bob, &org.id).await.unwrap();
	assert!(!bob_perms.is_owner);
	let mut granted = bob_perms.permissions.clone();
	granted.sort();
	let mut expected = DefaultRole::Member.permissions();
	expected.sort();
	assert_eq!(granted, expected);
	assert!(granted.iter().all(|p| !p.is_org_scoped()));

	// Adding Bob twice conflicts.
	let err = members.create(&alice, &org.id, &bob, None).await.unwrap_err();
	assert_eq!(err.kind(), ErrorKind::Conflict);

	// Bob cannot invite.
	let err = members.create(&bob, &org.id, &carol, None).await.unwrap_err();
	assert!(matches!(
		err,
		OrgsError::Forbidden {
			missing: Some(Permission::OrgInviteMember),
			..
		}
	));

	// A recruiter can invite but not pick a role.
	let recruiter = Role {
		id: RoleId::generate(),
		org_id: org.id.clone(),
		name: "Recruiter".to_string(),
		description: Some("Invites people".to_string()),
		base_role_id: None,
		created_at: Utc::now(),
	};
	let q = tx.querier();
	q.create_role(&recruiter).await.unwrap();
	q.create_role_permission(&RolePermission {
		role_id: recruiter.id.clone(),
		permission: Permission::OrgInviteMember,
		allowed: true,
	})
	.await
	.unwrap();
	members
		.create(&alice, &org.id, &carol, Some(&recruiter.id))
		.await
		.unwrap();

	let err = members
		.create(&carol, &org.id, &dave, Some(&roles[0].id))
		.await
		.unwrap_err();
	assert_eq!(err.kind(), ErrorKind::Forbidden);
	assert!(!q.member_exists(&dave, &org.id).await.unwrap());

	members.create(&carol, &org.id, &dave, None).await.unwrap();
	assert_eq!(members.list_members(&org.id).await.unwrap().len(), 4);

	// Outsiders see nothing.
	let outsider = insert_test_user(tx.pool(), "mallory").await.unwrap();
	let err = members
		.effective_permissions(&outsider, &org.id)
		.await
		.unwrap_err();
	assert_eq!(err.kind(), ErrorKind::Forbidden);

	// Renaming moves the slug; archiving stamps the time.
	let org = orgs
		.update(
			&org.id,
			&alice,
			OrgUpdate {
				name: Some("Acme Holdings".to_string()),
				is_active: Some(false),
				..Default::default()
			},
		)
		.await
		.unwrap();
	assert_eq!(org.slug, "acme-holdings");
	assert!(org.archived_at.is_some());

	let owned = orgs
		.list(
			&OrgListQuery::OwnedBy(alice.clone()),
			Pagination::from_page(PageParams::default(), PageLimits::default()),
		)
		.await
		.unwrap();
	assert_eq!(owned.len(), 1);
	assert_eq!(owned[0].name, "Acme Holdings");
}

#[tokio::test]
async fn same_name_twice_conflicts() {
	let pool = create_migrated_test_pool().await.unwrap();
	let alice = insert_test_user(&pool, "alice").await.unwrap();
	let bob = insert_test_user(&pool, "bob").await.unwrap();
	let orgs = OrgService::new(TxManager::new(pool));

	orgs.create(&alice, "Acme Corp").await.unwrap();
	let err = orgs.create(&bob, "acme corp").await.unwrap_err();
	assert_eq!(err.kind(), ErrorKind::Conflict);
}
