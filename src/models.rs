use std::collections::BTreeMap;
use std::fmt;

use serde::de::{Deserializer, MapAccess, Visitor};
use serde::{Deserialize, Serialize};

/// Sentinel license used when nothing can be extracted from a package.
pub const UNKNOWN_LICENSE: &str = "UNKNOWN";

/// Root document produced by `npm ls --all --json --long`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RootManifest {
    /// Full production + transitive graph. Left as `None` when the key is absent so the
    /// analyzer can reject the manifest.
    #[serde(default)]
    pub dependencies: Option<DependencyMap>,
    /// Shallow `name -> range` map of dev-only top-level packages.
    #[serde(default, rename = "devDependencies")]
    pub dev_dependencies: BTreeMap<String, serde_json::Value>,
    /// Shallow `name -> range` map of the production packages the user declared.
    #[serde(default, rename = "_dependencies")]
    pub direct_dependencies: BTreeMap<String, serde_json::Value>,
}

/// One installed package inside the dependency graph.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DependencyNode {
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub license: Option<LicenseDescriptor>,
    /// Deprecated multi-license array.
    #[serde(default)]
    pub licenses: Option<LicenseDescriptor>,
    #[serde(default)]
    pub dependencies: Option<DependencyMap>,
}

/// Children of a node, keyed by package name.
///
/// Entries keep document order and duplicate keys survive parsing, so the flattener sees
/// exactly what the lister emitted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DependencyMap(Vec<(String, DependencyNode)>);

impl DependencyMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: impl Into<String>, node: DependencyNode) {
        self.0.push((name.into(), node));
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &DependencyNode)> {
        self.0.iter().map(|(name, node)| (name.as_str(), node))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut DependencyNode)> {
        self.0.iter_mut().map(|(name, node)| (name.as_str(), node))
    }
}

impl<'de> Deserialize<'de> for DependencyMap {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct EntriesVisitor;

        impl<'de> Visitor<'de> for EntriesVisitor {
            type Value = DependencyMap;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of package names to dependency nodes")
            }

            fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((name, node)) = access.next_entry::<String, DependencyNode>()? {
                    entries.push((name, node));
                }
                Ok(DependencyMap(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor)
    }
}

/// The shapes a `license`/`licenses` field has taken across package.json revisions.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum LicenseDescriptor {
    /// `"license": "MIT"` or an SPDX expression.
    PlainString(String),
    /// `"licenses": [{ "type": "MIT" }, { "type": "ISC" }]`.
    ///
    /// Tried before `TypedObject`: a derived struct also accepts a sequence.
    LegacyList(Vec<LicenseEntry>),
    /// `"license": { "type": "MIT", "url": "..." }`.
    TypedObject(LicenseObject),
    /// Anything else (numbers, booleans, `null`).
    Malformed(serde_json::Value),
}

/// Non-string `type`/`name` values are dropped instead of failing the whole object.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct LicenseObject {
    #[serde(default, rename = "type", deserialize_with = "string_or_none")]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "string_or_none")]
    pub name: Option<String>,
}

fn string_or_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<serde_json::Value>::deserialize(deserializer)? {
        Some(serde_json::Value::String(s)) => Ok(Some(s)),
        _ => Ok(None),
    }
}

impl LicenseObject {
    /// `type`, falling back to `name`. Empty values count as missing.
    pub fn label(&self) -> Option<&str> {
        self.kind
            .as_deref()
            .filter(|s| !s.is_empty())
            .or_else(|| self.name.as_deref().filter(|s| !s.is_empty()))
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum LicenseEntry {
    Text(String),
    Typed(LicenseObject),
    Malformed(serde_json::Value),
}

impl LicenseEntry {
    pub fn label(&self) -> Option<&str> {
        match self {
            LicenseEntry::Text(s) if !s.is_empty() => Some(s.as_str()),
            LicenseEntry::Text(_) => None,
            LicenseEntry::Typed(obj) => obj.label(),
            LicenseEntry::Malformed(_) => None,
        }
    }
}

/// Whether the user declared a package or it was pulled in by another one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    Direct,
    Transitive,
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Classification::Direct => write!(f, "direct"),
            Classification::Transitive => write!(f, "transitive"),
        }
    }
}

/// One occurrence of a package in the dependency tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlattenedEntry {
    pub name: String,
    pub version: String,
    pub license: String,
    #[serde(rename = "type")]
    pub classification: Classification,
    #[serde(rename = "isDev")]
    pub is_dev: bool,
    /// Composite keys from the graph root down to this entry.
    #[serde(rename = "tree")]
    pub tree_path: Vec<String>,
}

/// License -> number of tree occurrences carrying it.
pub type LicenseCount = BTreeMap<String, usize>;

/// Everything the renderers need, built once per run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Inventory {
    pub licenses: Vec<FlattenedEntry>,
    #[serde(rename = "licenseCount")]
    pub license_count: LicenseCount,
}

impl Inventory {
    pub fn direct_count(&self) -> usize {
        self.licenses
            .iter()
            .filter(|e| e.classification == Classification::Direct)
            .count()
    }

    pub fn transitive_count(&self) -> usize {
        self.licenses
            .iter()
            .filter(|e| e.classification == Classification::Transitive)
            .count()
    }

    pub fn dev_count(&self) -> usize {
        self.licenses.iter().filter(|e| e.is_dev).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dependency_map_keeps_order_and_duplicates() {
        let json = r#"{ "zeta": {}, "alpha": { "version": "1.0.0" }, "zeta": { "version": "2.0.0" } }"#;
        let map: DependencyMap = serde_json::from_str(json).unwrap();
        let names: Vec<&str> = map.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["zeta", "alpha", "zeta"]);
        assert_eq!(map.iter().nth(2).unwrap().1.version.as_deref(), Some("2.0.0"));
    }

    #[test]
    fn test_license_descriptor_shapes() {
        let node: DependencyNode = serde_json::from_str(r#"{ "license": "MIT" }"#).unwrap();
        assert_eq!(node.license, Some(LicenseDescriptor::PlainString("MIT".into())));

        let node: DependencyNode =
            serde_json::from_str(r#"{ "license": { "type": "ISC", "url": "x" } }"#).unwrap();
        assert!(matches!(node.license, Some(LicenseDescriptor::TypedObject(_))));

        let node: DependencyNode =
            serde_json::from_str(r#"{ "licenses": [{ "type": "MIT" }, "ISC"] }"#).unwrap();
        match node.licenses {
            Some(LicenseDescriptor::LegacyList(list)) => assert_eq!(list.len(), 2),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_malformed_license_does_not_fail_parse() {
        let node: DependencyNode =
            serde_json::from_str(r#"{ "version": "1.0.0", "license": 42 }"#).unwrap();
        assert!(matches!(node.license, Some(LicenseDescriptor::Malformed(_))));
    }

    #[test]
    fn test_license_object_keeps_string_fields_only() {
        let node: DependencyNode =
            serde_json::from_str(r#"{ "license": { "type": "MIT", "name": 5 } }"#).unwrap();
        match node.license {
            Some(LicenseDescriptor::TypedObject(obj)) => {
                assert_eq!(obj.kind.as_deref(), Some("MIT"));
                assert_eq!(obj.name, None);
                assert_eq!(obj.label(), Some("MIT"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_non_object_children_fail_parse() {
        let result: Result<DependencyNode, _> =
            serde_json::from_str(r#"{ "dependencies": ["a", "b"] }"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_root_manifest_without_dependencies() {
        let root: RootManifest = serde_json::from_str(r#"{ "name": "app" }"#).unwrap();
        assert!(root.dependencies.is_none());
        assert!(root.dev_dependencies.is_empty());
    }

    #[test]
    fn test_flattened_entry_serializes_report_field_names() {
        let entry = FlattenedEntry {
            name: "a".into(),
            version: "1.0.0".into(),
            license: "MIT".into(),
            classification: Classification::Direct,
            is_dev: false,
            tree_path: vec!["a@1.0.0".into()],
        };
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["type"], "direct");
        assert_eq!(value["isDev"], false);
        assert_eq!(value["tree"][0], "a@1.0.0");
    }
}
