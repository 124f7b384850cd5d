// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Page-number pagination.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLimits {
	pub default_size: i64,
	pub max_size: i64,
}

impl Default for PageLimits {
	fn default() -> Self {
		Self {
			default_size: 10,
			max_size: 100,
		}
	}
}

/// 1-based page request as sent by clients.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageParams {
	pub page: Option<i64>,
	pub page_size: Option<i64>,
}

/// A resolved `LIMIT`/`OFFSET` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
	pub limit: i64,
	pub offset: i64,
}

impl Pagination {
	/// Pages below 1 are treated as 1; the size is clamped to `1..=max_size`.
	pub fn from_page(params: PageParams, limits: PageLimits) -> Self {
		let page = params.page.unwrap_or(1).max(1);
		let limit = params
			.page_size
			.unwrap_or(limits.default_size)
			.clamp(1, limits.max_size.max(1));
		Self {
			limit,
			offset: (page - 1).saturating_mul(limit),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	#[test]
	fn defaults_to_first_page_of_ten() {
		let p = Pagination::from_page(PageParams::default(), PageLimits::default());
		assert_eq!(p, Pagination { limit: 10, offset: 0 });
	}

	#[test]
	fn third_page() {
		let p = Pagination::from_page(
			PageParams {
				page: Some(3),
				page_size: Some(25),
			},
			PageLimits::default(),
		);
		assert_eq!(p, Pagination { limit: 25, offset: 50 });
	}

	#[test]
	fn clamps_bad_input() {
		let p = Pagination::from_page(
			PageParams {
				page: Some(-4),
				page_size: Some(5000),
			},
			PageLimits::default(),
		);
		assert_eq!(p, Pagination { limit: 100, offset: 0 });

		let p = Pagination::from_page(
			PageParams {
				page: Some(2),
				page_size: Some(0),
			},
			PageLimits::default(),
		);
		assert_eq!(p, Pagination { limit: 1, offset: 1 });
	}

	proptest! {
		#[test]
		fn never_negative(page in any::<i64>(), size in any::<i64>()) {
			let p = Pagination::from_page(
				PageParams { page: Some(page), page_size: Some(size) },
				PageLimits::default(),
			);
			prop_assert!(p.limit >= 1 && p.limit <= 100);
			prop_assert!(p.offset >= 0);
		}
	}
}
