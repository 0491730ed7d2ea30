use anyhow::Result;
use reqwest::Client;
use serde::Deserialize;

use crate::license::extract::extract_license;
use crate::models::{LicenseDescriptor, UNKNOWN_LICENSE};

/// License fields of a registry version document (`GET /{name}/{version}`).
#[derive(Debug, Default, Deserialize)]
struct VersionDocument {
    #[serde(default)]
    license: Option<LicenseDescriptor>,
    #[serde(default)]
    licenses: Option<LicenseDescriptor>,
}

/// Registry URL for one package version. Scoped names are encoded: `@scope/pkg` → `%40scope%2Fpkg`.
pub fn version_url(base: &str, name: &str, version: &str) -> String {
    let encoded_name = name.replace('@', "%40").replace('/', "%2F");
    format!("{}/{}/{}", base.trim_end_matches('/'), encoded_name, version)
}

/// Fetch the license for an npm package version from the registry.
///
/// Returns `Ok(None)` when the version is unknown to the registry or declares no license.
pub async fn fetch_license(
    client: &Client,
    base: &str,
    name: &str,
    version: &str,
) -> Result<Option<String>> {
    let response = client
        .get(version_url(base, name, version))
        .header("User-Agent", concat!("license-report/", env!("CARGO_PKG_VERSION")))
        .header("Accept", "application/json")
        .send()
        .await?;

    if !response.status().is_success() {
        return Ok(None);
    }

    let doc: VersionDocument = response.json().await?;
    Ok(license_from_document(&doc))
}

fn license_from_document(doc: &VersionDocument) -> Option<String> {
    let license = extract_license(doc.license.as_ref(), doc.licenses.as_ref());
    let license = license.trim();
    (!license.is_empty() && license != UNKNOWN_LICENSE).then(|| license.to_string())
}
