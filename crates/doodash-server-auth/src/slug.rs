// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

/// Derive a URL-safe slug from a display name.
///
/// ASCII letters and digits are lower-cased and kept; every other run of
/// characters collapses into a single `-`. Leading and trailing separators
/// are dropped, so `"  Acme Corp!! "` becomes `"acme-corp"`.
pub fn slugify(name: &str) -> String {
	name
		.to_ascii_lowercase()
		.split(|c: char| !c.is_ascii_alphanumeric())
		.filter(|part| !part.is_empty())
		.collect::<Vec<_>>()
		.join("-")
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	#[test]
	fn basic_names() {
		assert_eq!(slugify("Acme Corp"), "acme-corp");
		assert_eq!(slugify("  Acme   Corp  "), "acme-corp");
		assert_eq!(slugify("ACME_corp.io"), "acme-corp-io");
		assert_eq!(slugify("Doodash 2"), "doodash-2");
	}

	#[test]
	fn strips_non_ascii() {
		assert_eq!(slugify("Café Zürich"), "caf-z-rich");
		assert_eq!(slugify("日本"), "");
	}

	#[test]
	fn different_names_can_collide() {
		assert_eq!(slugify("Acme Corp"), slugify("acme-corp"));
		assert_eq!(slugify("Acme Corp"), slugify("ACME  CORP!"));
	}

	proptest! {
		#[test]
		fn idempotent(name in ".{0,64}") {
			let once = slugify(&name);
			prop_assert_eq!(slugify(&once), once.clone());
		}

		#[test]
		fn output_is_url_safe(name in ".{0,64}") {
			let slug = slugify(&name);
			prop_assert!(slug.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'));
			prop_assert!(!slug.starts_with('-'));
			prop_assert!(!slug.ends_with('-'));
			prop_assert!(!slug.contains("--"));
		}
	}
}
