use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::Deserialize;

use crate::models::{DependencyMap, DependencyNode, LicenseDescriptor, RootManifest};

/// The subset of `package.json` this scanner reads.
#[derive(Debug, Default, Deserialize)]
struct PackageJson {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    license: Option<LicenseDescriptor>,
    #[serde(default)]
    licenses: Option<LicenseDescriptor>,
    #[serde(default)]
    dependencies: BTreeMap<String, serde_json::Value>,
    #[serde(default, rename = "devDependencies")]
    dev_dependencies: BTreeMap<String, serde_json::Value>,
}

/// Build a [`RootManifest`] from the packages installed under `project/node_modules`.
///
/// Nested `node_modules` directories become children of the package that contains them.
/// The project's own `package.json` provides the direct and dev name tables.
pub fn scan(project: &Path) -> Result<RootManifest> {
    tracing::info!("Reading dependencies from {}...", project.join("node_modules").display());

    let root = read_package_json(&project.join("package.json")).unwrap_or_default();
    let mut visited = HashSet::new();
    let dependencies = scan_dir(project, &mut visited);

    tracing::debug!(packages = visited.len(), "scanned node_modules");

    Ok(RootManifest {
        dependencies: Some(dependencies),
        dev_dependencies: root.dev_dependencies,
        direct_dependencies: root.dependencies,
    })
}

/// True when `project/node_modules` exists and is a directory.
pub fn has_node_modules(project: &Path) -> bool {
    project.join("node_modules").is_dir()
}

fn scan_dir(dir: &Path, visited: &mut HashSet<PathBuf>) -> DependencyMap {
    let mut deps = DependencyMap::new();

    let start = if dir.file_name().is_some_and(|n| n == "node_modules") {
        dir.to_path_buf()
    } else {
        dir.join("node_modules")
    };
    if !start.is_dir() {
        return deps;
    }

    for entry in sorted_dirs(&start) {
        let Some(dir_name) = entry.file_name().and_then(|n| n.to_str()).map(str::to_string) else {
            continue;
        };
        if dir_name == ".bin" {
            continue;
        }

        if dir_name.starts_with('@') {
            for child in sorted_dirs(&entry) {
                let Some(child_name) = child.file_name().and_then(|n| n.to_str()) else {
                    continue;
                };
                if child_name == ".bin" {
                    continue;
                }
                let fallback = format!("{}/{}", dir_name, child_name);
                if let Some((name, node)) = scan_package(&child, &fallback, visited) {
                    deps.push(name, node);
                }
            }
        } else if let Some((name, node)) = scan_package(&entry, &dir_name, visited) {
            deps.push(name, node);
        }
    }

    deps
}

fn scan_package(
    pkg_dir: &Path,
    fallback_name: &str,
    visited: &mut HashSet<PathBuf>,
) -> Option<(String, DependencyNode)> {
    let real = match pkg_dir.canonicalize() {
        Ok(real) => real,
        Err(e) => {
            tracing::debug!(path = %pkg_dir.display(), error = %e, "skipping unreadable package");
            return None;
        }
    };
    if !visited.insert(real.clone()) {
        return None;
    }

    let pkg = read_package_json(&real.join("package.json")).unwrap_or_default();
    let children = scan_dir(&real, visited);

    let node = DependencyNode {
        version: pkg.version,
        license: pkg.license,
        licenses: pkg.licenses,
        dependencies: (!children.is_empty()).then_some(children),
    };
    let name = pkg.name.unwrap_or_else(|| fallback_name.to_string());
    Some((name, node))
}

fn read_package_json(path: &Path) -> Option<PackageJson> {
    let content = std::fs::read_to_string(path).ok()?;
    match serde_json::from_str(&content) {
        Ok(pkg) => Some(pkg),
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "ignoring unparseable package.json");
            None
        }
    }
}

/// Subdirectories of `dir` (following symlinks), sorted for a stable walk order.
fn sorted_dirs(dir: &Path) -> Vec<PathBuf> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::debug!(path = %dir.display(), error = %e, "cannot read directory");
            return Vec::new();
        }
    };
    let mut dirs: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_dir())
        .collect();
    dirs.sort();
    dirs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::analyze;
    use crate::models::Classification;
    use tempfile::TempDir;

    fn write_pkg(dir: &Path, json: &str) {
        std::fs::create_dir_all(dir).unwrap();
        std::fs::write(dir.join("package.json"), json).unwrap();
    }

    fn fixture() -> TempDir {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        write_pkg(
            root,
            r#"{ "name": "app", "dependencies": { "express": "^4.18.2" },
                 "devDependencies": { "@types/node": "^20.0.0" } }"#,
        );
        let nm = root.join("node_modules");
        write_pkg(
            &nm.join("express"),
            r#"{ "name": "express", "version": "4.18.2", "license": "MIT" }"#,
        );
        write_pkg(
            &nm.join("express").join("node_modules").join("debug"),
            r#"{ "name": "debug", "version": "2.6.9", "license": { "type": "MIT" } }"#,
        );
        write_pkg(
            &nm.join("@types").join("node"),
            r#"{ "name": "@types/node", "version": "20.1.0", "license": "MIT" }"#,
        );
        std::fs::create_dir_all(nm.join(".bin")).unwrap();
        std::fs::create_dir_all(nm.join("no-manifest")).unwrap();
        tmp
    }

    #[test]
    fn test_scan_builds_nested_tree() {
        let tmp = fixture();
        let manifest = scan(tmp.path()).unwrap();
        let deps = manifest.dependencies.as_ref().unwrap();

        let names: Vec<&str> = deps.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["@types/node", "express", "no-manifest"]);

        let (_, express) = deps.iter().find(|(n, _)| *n == "express").unwrap();
        let children = express.dependencies.as_ref().unwrap();
        assert_eq!(children.iter().next().unwrap().0, "debug");

        assert!(manifest.direct_dependencies.contains_key("express"));
        assert!(manifest.dev_dependencies.contains_key("@types/node"));
    }

    #[test]
    fn test_scan_feeds_analyzer() {
        let tmp = fixture();
        let inventory = analyze(&scan(tmp.path()).unwrap()).unwrap();
        assert_eq!(inventory.licenses.len(), 4);

        let debug = inventory.licenses.iter().find(|e| e.name == "debug").unwrap();
        assert_eq!(debug.tree_path, vec!["express@4.18.2", "debug@2.6.9"]);
        assert_eq!(debug.classification, Classification::Transitive);

        let types = inventory.licenses.iter().find(|e| e.name == "@types/node").unwrap();
        assert!(types.is_dev);

        let bare = inventory.licenses.iter().find(|e| e.name == "no-manifest").unwrap();
        assert_eq!(bare.version, "");
        assert_eq!(bare.license, "UNKNOWN");
        assert_eq!(inventory.license_count.get("MIT"), Some(&3));
    }

    #[test]
    fn test_scan_without_node_modules() {
        let tmp = TempDir::new().unwrap();
        let manifest = scan(tmp.path()).unwrap();
        assert!(manifest.dependencies.unwrap().is_empty());
    }

    #[test]
    fn test_has_node_modules() {
        let tmp = fixture();
        assert!(has_node_modules(tmp.path()));
        let nested = tmp
            .path()
            .join("node_modules")
            .join("express")
            .join("node_modules")
            .join("debug");
        assert!(!has_node_modules(&nested));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_package_visited_once() {
        let tmp = fixture();
        let nm = tmp.path().join("node_modules");
        std::os::unix::fs::symlink(nm.join("express"), nm.join("express-alias")).unwrap();
        let manifest = scan(tmp.path()).unwrap();
        let count = manifest
            .dependencies
            .unwrap()
            .iter()
            .filter(|(n, _)| *n == "express")
            .count();
        assert_eq!(count, 1);
    }
}
