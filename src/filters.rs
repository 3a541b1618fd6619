//! Filter criteria forwarded to the daemon's prune endpoints.
//!
//! The set is opaque to this crate: keys and values are only parsed from
//! `name=value` flags, merged with config defaults and serialized. The one
//! key interpreted locally is the `dryRun` marker.

use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;

use tracing::{trace, warn};

use crate::error::{ReclaimError, Result};

/// Key of the synthetic marker telling the daemon not to delete anything.
pub const DRY_RUN_KEY: &str = "dryRun";

/// A single `name=value` pair as given on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterArg {
    pub name: String,
    pub value: String,
}

impl FromStr for FilterArg {
    type Err = ReclaimError;

    fn from_str(s: &str) -> Result<Self> {
        let (name, value) = s
            .split_once('=')
            .ok_or_else(|| ReclaimError::InvalidFilter(s.to_string()))?;
        Ok(FilterArg {
            name: name.trim().to_lowercase(),
            value: value.trim().to_string(),
        })
    }
}

/// Mapping from filter key to the set of accepted values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filters {
    args: BTreeMap<String, BTreeSet<String>>,
}

impl Filters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.args.entry(key.into()).or_default().insert(value.into());
    }

    /// True when `key` carries exactly `value` among its accepted values.
    pub fn exact_match(&self, key: &str, value: &str) -> bool {
        self.args.get(key).is_some_and(|values| values.contains(value))
    }

    /// Merge default filters from the config file.
    ///
    /// Command-line label filters win over contradicting config entries:
    /// `label=v` from config is dropped when the caller asked for `label!=v`
    /// and vice versa. Entries without `=` are skipped.
    pub fn with_defaults(mut self, defaults: &[String]) -> Self {
        for entry in defaults {
            let Some((key, value)) = entry.split_once('=') else {
                warn!(filter = %entry, "Ignoring malformed prune filter from config");
                continue;
            };
            let opposite = match key {
                "label" => Some("label!"),
                "label!" => Some("label"),
                _ => None,
            };
            if opposite.is_some_and(|opposite| self.exact_match(opposite, value)) {
                trace!(filter = %entry, "Config filter superseded by command line");
                continue;
            }
            self.add(key, value);
        }
        self
    }

    /// Return a copy carrying the `dryRun` marker.
    pub fn with_dry_run(&self, dry_run: bool) -> Self {
        let mut filters = self.clone();
        filters.add(DRY_RUN_KEY, dry_run.to_string());
        filters
    }

    /// Encode as the daemon expects: `{"key": {"value": true}}`.
    pub fn to_json(&self) -> Result<String> {
        let encoded: BTreeMap<&str, BTreeMap<&str, bool>> = self
            .args
            .iter()
            .map(|(key, values)| {
                let set = values.iter().map(|v| (v.as_str(), true)).collect();
                (key.as_str(), set)
            })
            .collect();
        Ok(serde_json::to_string(&encoded)?)
    }
}

impl FromIterator<FilterArg> for Filters {
    fn from_iter<I: IntoIterator<Item = FilterArg>>(iter: I) -> Self {
        let mut filters = Filters::new();
        for arg in iter {
            filters.add(arg.name, arg.value);
        }
        filters
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_filter_arg() {
        let arg: FilterArg = "label=env=prod".parse().unwrap();
        assert_eq!(arg.name, "label");
        assert_eq!(arg.value, "env=prod");
    }

    #[test]
    fn test_parse_filter_arg_normalizes_name() {
        let arg: FilterArg = " Until = 24h ".parse().unwrap();
        assert_eq!(arg.name, "until");
        assert_eq!(arg.value, "24h");
    }

    #[test]
    fn test_parse_filter_arg_requires_equals() {
        let err = "dangling".parse::<FilterArg>().unwrap_err();
        assert!(matches!(err, ReclaimError::InvalidFilter(ref s) if s == "dangling"));
    }

    #[test]
    fn test_collect_groups_values_by_key() {
        let filters: Filters = ["label=a", "label=b", "until=1h"]
            .iter()
            .map(|s| s.parse::<FilterArg>().unwrap())
            .collect();
        assert!(filters.exact_match("label", "a"));
        assert!(filters.exact_match("label", "b"));
        assert!(filters.exact_match("until", "1h"));
        assert_eq!(filters.to_json().unwrap(), r#"{"label":{"a":true,"b":true},"until":{"1h":true}}"#);
    }

    #[test]
    fn test_with_dry_run_does_not_modify_original() {
        let filters = Filters::new();
        let marked = filters.with_dry_run(true);
        assert_eq!(filters, Filters::new());
        assert!(marked.exact_match(DRY_RUN_KEY, "true"));
        assert!(!marked.exact_match(DRY_RUN_KEY, "false"));
        assert!(filters.with_dry_run(false).exact_match(DRY_RUN_KEY, "false"));
    }

    #[test]
    fn test_to_json_shape() {
        let mut filters = Filters::new();
        filters.add("label", "a=b");
        filters.add("dryRun", "false");
        assert_eq!(
            filters.to_json().unwrap(),
            r#"{"dryRun":{"false":true},"label":{"a=b":true}}"#
        );
    }

    #[test]
    fn test_to_json_empty() {
        assert_eq!(Filters::new().to_json().unwrap(), "{}");
    }

    #[test]
    fn test_defaults_are_added() {
        let filters = Filters::new().with_defaults(&strings(&["until=24h", "label=tmp"]));
        assert!(filters.exact_match("until", "24h"));
        assert!(filters.exact_match("label", "tmp"));
    }

    #[test]
    fn test_defaults_without_equals_are_skipped() {
        let filters = Filters::new().with_defaults(&strings(&["garbage"]));
        assert_eq!(filters, Filters::new());
    }

    #[test]
    fn test_cli_negated_label_supersedes_config_label() {
        let mut filters = Filters::new();
        filters.add("label!", "keep");
        let merged = filters.with_defaults(&strings(&["label=keep", "label=other"]));
        assert!(!merged.exact_match("label", "keep"));
        assert!(merged.exact_match("label", "other"));
    }

    #[test]
    fn test_cli_label_supersedes_config_negated_label() {
        let mut filters = Filters::new();
        filters.add("label", "keep");
        let merged = filters.with_defaults(&strings(&["label!=keep"]));
        assert_eq!(merged.to_json().unwrap(), r#"{"label":{"keep":true}}"#);
    }
}
