// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::future::Future;
use std::sync::Arc;

use sqlx::sqlite::SqlitePool;

use crate::error::DbError;
use crate::gateway::{Querier, SqlGateway};

/// Runs units of work inside a single database transaction.
#[derive(Clone)]
pub struct TxManager {
	pool: SqlitePool,
}

impl TxManager {
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	pub fn pool(&self) -> &SqlitePool {
		&self.pool
	}

	/// A pool-backed gateway for work that needs no transaction.
	pub fn querier(&self) -> Arc<dyn Querier> {
		Arc::new(SqlGateway::new(self.pool.clone()))
	}

	/// Run `work` inside a transaction.
	///
	/// Commits if `work` returns `Ok`, rolls back and returns the original
	/// error otherwise. Failing to begin or commit surfaces as `E::from(DbError)`.
	/// If the returned future is dropped before completion the transaction
	/// is dropped with it, which rolls back.
	///
	/// The transaction is opened with `BEGIN IMMEDIATE` so the write lock is
	/// taken up front. Work that reads before it writes then waits on the
	/// busy timeout behind a concurrent writer instead of failing to upgrade.
	///
	/// The handle passed to `work` is only valid until `work` returns.
	#[tracing::instrument(level = "debug", skip_all)]
	pub async fn with_tx<T, E, F, Fut>(&self, work: F) -> Result<T, E>
	where
		F: FnOnce(Arc<dyn Querier>) -> Fut,
		Fut: Future<Output = Result<T, E>>,
		E: From<DbError>,
	{
		let tx = self
			.pool
			.begin_with("BEGIN IMMEDIATE")
			.await
			.map_err(DbError::from)?;
		let gateway = Arc::new(SqlGateway::from_tx(tx));
		let handle: Arc<dyn Querier> = gateway.clone();

		let result = work(handle).await;

		let tx = gateway
			.take_tx()
			.await
			.ok_or_else(|| DbError::Internal("transaction already finished".to_string()))?;

		match result {
			Ok(value) => {
				tx.commit().await.map_err(DbError::from)?;
				tracing::debug!("transaction committed");
				Ok(value)
			}
			Err(err) => {
				if let Err(e) = tx.rollback().await {
					tracing::warn!(error = %e, "transaction rollback failed");
				} else {
					tracing::debug!("transaction rolled back");
				}
				Err(err)
			}
		}
	}
}
