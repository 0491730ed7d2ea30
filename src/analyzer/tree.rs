use std::collections::{BTreeMap, HashSet};

use crate::license::extract::node_license;
use crate::models::{Classification, DependencyMap, FlattenedEntry, LicenseCount};

/// Top-level name lookups, captured once before the walk starts.
#[derive(Debug, Clone, Default)]
pub struct TopLevelNames {
    pub direct: HashSet<String>,
    pub dev: HashSet<String>,
}

impl TopLevelNames {
    pub fn new<D, V>(direct: D, dev: V) -> Self
    where
        D: IntoIterator<Item = String>,
        V: IntoIterator<Item = String>,
    {
        Self {
            direct: direct.into_iter().collect(),
            dev: dev.into_iter().collect(),
        }
    }

    /// Looks at the bare name only, so a nested package sharing a name with a direct one is
    /// classified `direct` too.
    fn classify(&self, name: &str) -> Classification {
        if self.direct.contains(name) {
            Classification::Direct
        } else {
            Classification::Transitive
        }
    }
}

/// Result of a full flattening pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Flattened {
    /// Keyed by composite key; a later occurrence of the same key replaces the earlier one.
    pub entries: BTreeMap<String, FlattenedEntry>,
    /// Every visited node is counted, including ones later replaced in `entries`.
    pub license_count: LicenseCount,
}

/// `name@version`, or just `name` when the version is empty.
pub fn composite_key(name: &str, version: &str) -> String {
    if version.is_empty() {
        name.to_string()
    } else {
        format!("{}@{}", name, version)
    }
}

/// Depth-first pre-order flattening of the dependency graph.
pub fn flatten(deps: &DependencyMap, names: &TopLevelNames) -> Flattened {
    let mut out = Flattened::default();
    let mut path = Vec::new();
    walk(deps, names, &mut path, &mut out);
    out
}

fn walk(
    deps: &DependencyMap,
    names: &TopLevelNames,
    path: &mut Vec<String>,
    out: &mut Flattened,
) {
    for (name, node) in deps.iter() {
        let license = node_license(node);
        let version = node.version.clone().unwrap_or_default();
        let key = composite_key(name, &version);

        path.push(key.clone());

        *out.license_count.entry(license.clone()).or_insert(0) += 1;
        out.entries.insert(
            key,
            FlattenedEntry {
                name: name.to_string(),
                version,
                license,
                classification: names.classify(name),
                is_dev: names.dev.contains(name),
                tree_path: path.clone(),
            },
        );

        if let Some(children) = &node.dependencies {
            walk(children, names, path, out);
        }

        path.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deps(json: &str) -> DependencyMap {
        serde_json::from_str(json).unwrap()
    }

    fn names(direct: &[&str], dev: &[&str]) -> TopLevelNames {
        TopLevelNames::new(
            direct.iter().map(|s| s.to_string()),
            dev.iter().map(|s| s.to_string()),
        )
    }

    #[test]
    fn test_two_level_tree() {
        let graph = deps(
            r#"{ "a": { "version": "1.0.0", "license": "MIT",
                   "dependencies": { "b": { "version": "2.0.0", "license": "ISC" } } } }"#,
        );
        let result = flatten(&graph, &names(&["a"], &[]));

        assert_eq!(result.entries.len(), 2);

        let a = &result.entries["a@1.0.0"];
        assert_eq!(a.tree_path, vec!["a@1.0.0"]);
        assert_eq!(a.classification, Classification::Direct);
        assert_eq!(a.license, "MIT");

        let b = &result.entries["b@2.0.0"];
        assert_eq!(b.tree_path, vec!["a@1.0.0", "b@2.0.0"]);
        assert_eq!(b.classification, Classification::Transitive);

        assert_eq!(result.license_count.get("MIT"), Some(&1));
        assert_eq!(result.license_count.get("ISC"), Some(&1));
    }

    #[test]
    fn test_missing_version_uses_bare_name() {
        let graph = deps(r#"{ "left-pad": { "license": "WTFPL" } }"#);
        let result = flatten(&graph, &TopLevelNames::default());
        let entry = &result.entries["left-pad"];
        assert_eq!(entry.version, "");
        assert_eq!(entry.tree_path, vec!["left-pad"]);
    }

    #[test]
    fn test_tree_path_length_matches_depth() {
        let graph = deps(
            r#"{ "a": { "version": "1", "dependencies": {
                   "b": { "version": "1", "dependencies": {
                     "c": { "version": "1" } } } } },
                 "d": { "version": "1" } }"#,
        );
        let result = flatten(&graph, &TopLevelNames::default());
        assert_eq!(result.entries["a@1"].tree_path.len(), 1);
        assert_eq!(result.entries["b@1"].tree_path.len(), 2);
        assert_eq!(result.entries["c@1"].tree_path, vec!["a@1", "b@1", "c@1"]);
        assert_eq!(result.entries["d@1"].tree_path, vec!["d@1"]);
    }

    #[test]
    fn test_counts_match_entries_without_collisions() {
        let graph = deps(
            r#"{ "a": { "version": "1", "license": "MIT", "dependencies": {
                   "b": { "version": "1", "license": "MIT" },
                   "c": { "version": "1" } } },
                 "d": { "version": "2", "license": { "type": "ISC" } } }"#,
        );
        let result = flatten(&graph, &TopLevelNames::default());
        let total: usize = result.license_count.values().sum();
        assert_eq!(result.entries.len(), 4);
        assert_eq!(total, result.entries.len());
        assert_eq!(result.license_count.get("MIT"), Some(&2));
        assert_eq!(result.license_count.get("UNKNOWN"), Some(&1));
    }

    #[test]
    fn test_duplicate_sibling_last_write_wins() {
        let graph = deps(
            r#"{ "a": { "version": "1.0.0", "license": "MIT" },
                 "a": { "version": "1.0.0", "license": "ISC" } }"#,
        );
        let result = flatten(&graph, &TopLevelNames::default());
        assert_eq!(result.entries.len(), 1);
        assert_eq!(result.entries["a@1.0.0"].license, "ISC");
        // both occurrences are still counted
        assert_eq!(result.license_count.get("MIT"), Some(&1));
        assert_eq!(result.license_count.get("ISC"), Some(&1));
    }

    #[test]
    fn test_same_key_deeper_in_tree_overwrites_earlier_path() {
        let graph = deps(
            r#"{ "ms": { "version": "2.1.3" },
                 "debug": { "version": "4.3.4", "dependencies": { "ms": { "version": "2.1.3" } } } }"#,
        );
        let result = flatten(&graph, &TopLevelNames::default());
        assert_eq!(result.entries.len(), 2);
        assert_eq!(
            result.entries["ms@2.1.3"].tree_path,
            vec!["debug@4.3.4", "ms@2.1.3"]
        );
    }

    #[test]
    fn test_classification_ignores_depth() {
        let graph = deps(
            r#"{ "a": { "version": "1", "dependencies": { "b": { "version": "0.9" } } },
                 "b": { "version": "1" } }"#,
        );
        let result = flatten(&graph, &names(&["a", "b"], &["b"]));
        let nested = &result.entries["b@0.9"];
        assert_eq!(nested.classification, Classification::Direct);
        assert!(nested.is_dev);
        assert!(!result.entries["a@1"].is_dev);
    }

    #[test]
    fn test_flatten_is_idempotent() {
        let graph = deps(
            r#"{ "a": { "version": "1", "license": "MIT", "dependencies": {
                   "b": { "version": "2", "licenses": [{ "type": "MIT" }, { "type": "ISC" }] } } } }"#,
        );
        let n = names(&["a"], &[]);
        assert_eq!(flatten(&graph, &n), flatten(&graph, &n));
    }
}
