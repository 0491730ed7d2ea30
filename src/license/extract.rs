use crate::models::{DependencyNode, LicenseDescriptor, UNKNOWN_LICENSE};

/// Resolve a single license string from a package's raw license fields.
///
/// Precedence, first match wins:
/// 1. `license` is an object with a `type` (or `name`)
/// 2. `licenses` (or a list-valued `license`) — labels joined with `", "`, possibly empty
/// 3. `license` is a non-empty string, returned untrimmed
/// 4. [`UNKNOWN_LICENSE`]
pub fn extract_license(
    license: Option<&LicenseDescriptor>,
    licenses: Option<&LicenseDescriptor>,
) -> String {
    if let Some(LicenseDescriptor::TypedObject(obj)) = license {
        if let Some(label) = obj.label() {
            return label.to_string();
        }
    }

    for field in [licenses, license].into_iter().flatten() {
        if let LicenseDescriptor::LegacyList(entries) = field {
            let labels: Vec<&str> = entries.iter().filter_map(|e| e.label()).collect();
            return labels.join(", ");
        }
    }

    if let Some(LicenseDescriptor::PlainString(s)) = license {
        if !s.is_empty() {
            return s.clone();
        }
    }

    UNKNOWN_LICENSE.to_string()
}

/// License of a dependency node, trimmed. Blank results collapse to [`UNKNOWN_LICENSE`].
pub fn node_license(node: &DependencyNode) -> String {
    let raw = extract_license(node.license.as_ref(), node.licenses.as_ref());
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        UNKNOWN_LICENSE.to_string()
    } else {
        trimmed.to_string()
    }
}
