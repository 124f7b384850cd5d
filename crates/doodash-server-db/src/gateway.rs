// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The persistence gateway.
//!
//! [`SqlGateway`] runs every query either straight against the pool or
//! inside one open transaction. The store traits ([`UserStore`],
//! [`OrgStore`], [`RoleStore`], [`MemberStore`]) are implemented once on the
//! gateway, so the same service code works in both modes. Callers hold it as
//! `Arc<dyn Querier>`.

use chrono::{DateTime, Utc};
use sqlx::sqlite::{Sqlite, SqliteArguments, SqlitePool, SqliteQueryResult, SqliteRow};
use sqlx::Transaction;
use tokio::sync::Mutex;

use crate::error::DbError;
use crate::member::MemberStore;
use crate::org::OrgStore;
use crate::role::RoleStore;
use crate::user::UserStore;

/// Everything the services need from storage.
pub trait Querier: UserStore + OrgStore + RoleStore + MemberStore {}

impl<T> Querier for T where T: UserStore + OrgStore + RoleStore + MemberStore + ?Sized {}

type SqliteQuery<'q> = sqlx::query::Query<'q, Sqlite, SqliteArguments<'q>>;

enum Conn {
	Pool(SqlitePool),
	/// `None` once the transaction has been committed or rolled back.
	Tx(Mutex<Option<Transaction<'static, Sqlite>>>),
}

pub struct SqlGateway {
	conn: Conn,
}

impl SqlGateway {
	/// A gateway that runs each query on its own pooled connection.
	pub fn new(pool: SqlitePool) -> Self {
		Self {
			conn: Conn::Pool(pool),
		}
	}

	pub(crate) fn from_tx(tx: Transaction<'static, Sqlite>) -> Self {
		Self {
			conn: Conn::Tx(Mutex::new(Some(tx))),
		}
	}

	pub fn is_transactional(&self) -> bool {
		matches!(self.conn, Conn::Tx(_))
	}

	/// Take the transaction out, leaving the gateway unusable.
	pub(crate) async fn take_tx(&self) -> Option<Transaction<'static, Sqlite>> {
		match &self.conn {
			Conn::Pool(_) => None,
			Conn::Tx(slot) => slot.lock().await.take(),
		}
	}

	pub(crate) async fn execute<'q>(
		&self,
		query: SqliteQuery<'q>,
	) -> Result<SqliteQueryResult, sqlx::Error> {
		match &self.conn {
			Conn::Pool(pool) => query.execute(pool).await,
			Conn::Tx(slot) => {
				let mut guard = slot.lock().await;
				let tx = guard.as_mut().ok_or(sqlx::Error::PoolClosed)?;
				query.execute(&mut **tx).await
			}
		}
	}

	pub(crate) async fn fetch_optional<'q>(
		&self,
		query: SqliteQuery<'q>,
	) -> Result<Option<SqliteRow>, sqlx::Error> {
		match &self.conn {
			Conn::Pool(pool) => query.fetch_optional(pool).await,
			Conn::Tx(slot) => {
				let mut guard = slot.lock().await;
				let tx = guard.as_mut().ok_or(sqlx::Error::PoolClosed)?;
				query.fetch_optional(&mut **tx).await
			}
		}
	}

	pub(crate) async fn fetch_all<'q>(
		&self,
		query: SqliteQuery<'q>,
	) -> Result<Vec<SqliteRow>, sqlx::Error> {
		match &self.conn {
			Conn::Pool(pool) => query.fetch_all(pool).await,
			Conn::Tx(slot) => {
				let mut guard = slot.lock().await;
				let tx = guard.as_mut().ok_or(sqlx::Error::PoolClosed)?;
				query.fetch_all(&mut **tx).await
			}
		}
	}
}

pub(crate) fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, DbError> {
	DateTime::parse_from_rfc3339(raw)
		.map(|dt| dt.with_timezone(&Utc))
		.map_err(|e| DbError::Internal(format!("Invalid timestamp '{raw}': {e}")))
}

pub(crate) fn parse_optional_timestamp(raw: Option<String>) -> Result<Option<DateTime<Utc>>, DbError> {
	raw.as_deref().map(parse_timestamp).transpose()
}
