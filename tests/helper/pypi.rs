//! Mock PyPI server utilities

use mockito::{Mock, ServerGuard};
use serde_json::{Value, json};

use python_compat::compat::types::{ArtifactRecord, Releases};

/// Build a release table where each release has a single file
pub fn releases(entries: &[(&str, Option<&str>)]) -> Releases {
    entries
        .iter()
        .map(|(version, requires)| {
            (
                version.to_string(),
                vec![ArtifactRecord::new(*requires, Some("2024-03-01T12:00:00.000000Z"))],
            )
        })
        .collect()
}

/// Render a PyPI JSON API document for the given releases
pub fn pypi_document(entries: &[(&str, Option<&str>, &str)]) -> Value {
    let releases: serde_json::Map<String, Value> = entries
        .iter()
        .map(|(version, requires, uploaded)| {
            (
                version.to_string(),
                json!([{
                    "filename": format!("demo-{}.tar.gz", version),
                    "requires_python": requires,
                    "upload_time_iso_8601": uploaded,
                }]),
            )
        })
        .collect();

    json!({
        "info": {"version": entries.last().map(|(v, _, _)| *v).unwrap_or("0")},
        "releases": releases,
    })
}

/// Serve `document` at `/pypi/<package>/json`
pub async fn mock_package(server: &mut ServerGuard, package: &str, document: &Value) -> Mock {
    server
        .mock("GET", format!("/pypi/{}/json", package).as_str())
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(document.to_string())
        .create_async()
        .await
}
