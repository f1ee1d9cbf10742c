//! Collection names and the product/version scopes they encode.
//!
//! Upstream collection names are generated inconsistently, so parsing is
//! permissive: a strict pattern first, then an underscore split. Anything that
//! does not yield a real product and version is "uncategorized" (`None`),
//! never an error.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

const PLACEHOLDER: &str = "none";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct CollectionScope {
    pub product: String,
    /// Always lower-case `r<major>[.<minor>]`.
    pub version: String,
}

fn strict_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(?:temenos|None)_([A-Za-z0-9]+(?:[-_][A-Za-z0-9]+)*)_([rR]?\d+(?:\.\d+)?)$")
            .expect("collection pattern is valid")
    })
}

fn version_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^r?\d+(?:\.\d+)?$").expect("version pattern is valid"))
}

/// Decomposes a collection name into its product and version.
///
/// `temenos_transact_r23` and `None_transact_r23` both give
/// `("transact", "r23")`; `temenos_transact_23` gets its `r` prefix;
/// placeholder tokens (`none`) make the whole name uncategorized.
pub fn parse_collection_identifier(name: &str) -> Option<CollectionScope> {
    if let Some(caps) = strict_pattern().captures(name) {
        let product = caps[1].to_lowercase();
        let version = caps[2].to_lowercase();
        if product == PLACEHOLDER || version == PLACEHOLDER {
            return None;
        }
        return Some(CollectionScope {
            product,
            version: with_release_prefix(version),
        });
    }

    let parts: Vec<&str> = name.split('_').collect();
    if parts.len() < 3 {
        return None;
    }

    let product = parts[1].to_lowercase();
    let version = parts[2].to_lowercase();
    if product.is_empty()
        || product == PLACEHOLDER
        || version == PLACEHOLDER
        || !version_pattern().is_match(&version)
    {
        return None;
    }

    Some(CollectionScope {
        product,
        version: with_release_prefix(version),
    })
}

fn with_release_prefix(version: String) -> String {
    if version.starts_with('r') {
        version
    } else {
        format!("r{}", version)
    }
}

pub fn compose_collection_name(namespace: &str, product: &str, version: &str) -> String {
    format!("{}_{}_{}", namespace, product, version)
}

/// Groups collection names into `product -> sorted, deduplicated versions`.
/// Uncategorized names are skipped.
pub fn group_products<I, S>(names: I) -> BTreeMap<String, Vec<String>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut grouped: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    for name in names {
        if let Some(scope) = parse_collection_identifier(name.as_ref()) {
            grouped.entry(scope.product).or_default().insert(scope.version);
        }
    }

    grouped
        .into_iter()
        .map(|(product, versions)| (product, versions.into_iter().collect()))
        .collect()
}

/// The release immediately before `version`: `r23` gives `r22`.
///
/// Only plain `r<digits>` versions have a predecessor, and nothing precedes
/// `r0`. The prefix keeps its original case.
pub fn previous_version(version: &str) -> Option<String> {
    let (prefix, digits) = version.split_at_checked(1)?;
    if !prefix.eq_ignore_ascii_case("r")
        || digits.is_empty()
        || !digits.chars().all(|c| c.is_ascii_digit())
    {
        return None;
    }

    let number: u64 = digits.parse().ok()?;
    let previous = number.checked_sub(1)?;
    Some(format!("{}{}", prefix, previous))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scope(product: &str, version: &str) -> Option<CollectionScope> {
        Some(CollectionScope {
            product: product.to_string(),
            version: version.to_string(),
        })
    }

    #[test]
    fn parses_canonical_names() {
        assert_eq!(
            parse_collection_identifier("temenos_transact_r23"),
            scope("transact", "r23")
        );
        assert_eq!(
            parse_collection_identifier("temenos_Infinity_R24.1"),
            scope("infinity", "r24.1")
        );
    }

    #[test]
    fn placeholder_namespace_yields_same_scope() {
        assert_eq!(
            parse_collection_identifier("None_transact_r23"),
            scope("transact", "r23")
        );
    }

    #[test]
    fn placeholder_tokens_are_uncategorized() {
        assert_eq!(parse_collection_identifier("temenos_none_r23"), None);
        assert_eq!(parse_collection_identifier("temenos_transact_none"), None);
        assert_eq!(parse_collection_identifier("acme_None_r23"), None);
    }

    #[test]
    fn injects_release_prefix() {
        assert_eq!(
            parse_collection_identifier("temenos_transact_23"),
            scope("transact", "r23")
        );
        assert_eq!(
            parse_collection_identifier("acme_payments_7.2"),
            scope("payments", "r7.2")
        );
    }

    #[test]
    fn multi_segment_products_are_kept_whole() {
        assert_eq!(
            parse_collection_identifier("temenos_data-hub_analytics_r22"),
            scope("data-hub_analytics", "r22")
        );
    }

    #[test]
    fn falls_back_to_underscore_split() {
        assert_eq!(
            parse_collection_identifier("acme_transact_r23"),
            scope("transact", "r23")
        );
        assert_eq!(
            parse_collection_identifier("temenos_transact_r23_draft"),
            scope("transact", "r23")
        );
    }

    #[test]
    fn malformed_names_are_uncategorized() {
        for name in [
            "",
            "transact",
            "temenos_transact",
            "temenos__r23",
            "temenos_transact_latest",
            "langchain",
        ] {
            assert_eq!(parse_collection_identifier(name), None, "{name}");
        }
    }

    #[test]
    fn groups_sorted_deduplicated_versions() {
        let grouped = group_products([
            "temenos_transact_r23",
            "temenos_transact_r21",
            "None_transact_r23",
            "temenos_infinity_24",
            "temenos_none_r23",
            "misc",
        ]);

        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped["transact"], vec!["r21", "r23"]);
        assert_eq!(grouped["infinity"], vec!["r24"]);
    }

    #[test]
    fn composes_names_from_scope() {
        assert_eq!(
            compose_collection_name("temenos", "transact", "r23"),
            "temenos_transact_r23"
        );
    }

    #[test]
    fn previous_version_steps_back_one_release() {
        assert_eq!(previous_version("r23").as_deref(), Some("r22"));
        assert_eq!(previous_version("R10").as_deref(), Some("R9"));
        assert_eq!(previous_version("r1").as_deref(), Some("r0"));
        assert_eq!(previous_version("r0"), None);
        assert_eq!(previous_version("r23.1"), None);
        assert_eq!(previous_version("23"), None);
        assert_eq!(previous_version(""), None);
        assert_eq!(previous_version("r"), None);
    }
}
