//! Source collection helpers.

use anyhow::Context;

/// Read the raw share-link list from a URL or a local file path.
pub(crate) async fn read_source(source: &str) -> anyhow::Result<String> {
    if source.starts_with("http://") || source.starts_with("https://") {
        let response = reqwest::get(source)
            .await
            .and_then(|response| response.error_for_status())
            .with_context(|| format!("failed to fetch link list from {source}"))?;
        response
            .text()
            .await
            .with_context(|| format!("failed to read link list body from {source}"))
    } else {
        tokio::fs::read_to_string(source)
            .await
            .with_context(|| format!("failed to read link list {source}"))
    }
}
