// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! List endpoint page sizes.

use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationConfig {
	pub default_page_size: i64,
	pub max_page_size: i64,
}

impl Default for PaginationConfig {
	fn default() -> Self {
		PaginationConfigLayer::default().finalize()
	}
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaginationConfigLayer {
	#[serde(default)]
	pub default_page_size: Option<i64>,
	#[serde(default)]
	pub max_page_size: Option<i64>,
}

impl PaginationConfigLayer {
	pub fn merge(&mut self, other: PaginationConfigLayer) {
		if other.default_page_size.is_some() {
			self.default_page_size = other.default_page_size;
		}
		if other.max_page_size.is_some() {
			self.max_page_size = other.max_page_size;
		}
	}

	pub fn finalize(self) -> PaginationConfig {
		PaginationConfig {
			default_page_size: self.default_page_size.unwrap_or(10),
			max_page_size: self.max_page_size.unwrap_or(100),
		}
	}
}
