// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Database layer for the Doodash server.
//!
//! All access goes through [`SqlGateway`], held as `Arc<dyn Querier>`.
//! [`TxManager::with_tx`] hands out a transaction-scoped gateway for
//! multi-statement writes; [`TxManager::querier`] a pool-backed one for
//! everything else.

pub mod error;
pub mod gateway;
pub mod member;
pub mod migrations;
pub mod org;
pub mod pool;
pub mod role;
pub mod testing;
pub mod tx;
pub mod user;

pub use error::{DbError, Result};
pub use gateway::{Querier, SqlGateway};
pub use member::MemberStore;
pub use migrations::{drop_schema, run_migrations};
pub use org::OrgStore;
pub use pool::create_pool;
pub use role::RoleStore;
pub use tx::TxManager;
pub use user::UserStore;
