//! Version-named list detection
//!
//! A version list is named `v` followed by two or more dot-separated numbers, in
//! either case: `v1.2`, `V0.10.0`, `v2.0.0.1`. Lists are ordered by plain string
//! comparison, so `v0.9.0` sorts above `v0.10.0`; [`semantic_order_conflicts`]
//! finds the pairs where that disagrees with semantic versioning.

use std::cmp::Ordering;
use std::sync::LazyLock;

use regex::Regex;

static VERSION_PATTERN: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"(?i)^v[0-9]+(\.[0-9]+)+$").expect("version pattern is valid"));

/// Check whether a list name is a version tag
pub fn is_version_tag(name: &str) -> bool {
  VERSION_PATTERN.is_match(name)
}

/// Descending plain string order used for batch releases
pub fn compare_descending(a: &str, b: &str) -> Ordering {
  b.cmp(a)
}

/// Parse a version tag as semver, padding `vX.Y` to `X.Y.0`
///
/// Tags with more than three components have no semver reading.
pub fn semantic_version(tag: &str) -> Option<semver::Version> {
  if !is_version_tag(tag) {
    return None;
  }
  let numbers = &tag[1..];
  match numbers.split('.').count() {
    2 => semver::Version::parse(&format!("{}.0", numbers)).ok(),
    3 => semver::Version::parse(numbers).ok(),
    _ => None,
  }
}

/// Adjacent pairs of an ordered tag list that are out of semantic order
///
/// `tags` is expected in descending order; a pair `(a, b)` is reported when `b`
/// is the semantically greater version. Tags without a semver reading are skipped.
pub fn semantic_order_conflicts<S: AsRef<str>>(tags: &[S]) -> Vec<(String, String)> {
  tags
    .windows(2)
    .filter_map(|pair| {
      let (a, b) = (pair[0].as_ref(), pair[1].as_ref());
      match (semantic_version(a), semantic_version(b)) {
        (Some(va), Some(vb)) if vb > va => Some((a.to_string(), b.to_string())),
        _ => None,
      }
    })
    .collect()
}
