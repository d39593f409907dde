//! Sequential verification driver.

use crate::config::VerifierConfig;
use crate::descriptor::ConfigDescriptor;
use crate::link::LinkScheme;
use crate::utils;
use crate::verify::{VerificationRunner, Verdict};

use anyhow::Context;
use log::{debug, info, warn};

/// Reads link sources, parses descriptors, verifies them in arrival order
/// and persists the working subset.
pub struct Pipeline {
    config: VerifierConfig,
}

impl Pipeline {
    pub fn new(config: VerifierConfig) -> Self {
        Self { config }
    }

    /// Collect and parse share-links from all configured sources.
    ///
    /// Lines with unrecognized prefixes are skipped silently; malformed
    /// links of a recognized scheme are dropped with a warning. Neither is
    /// ever fatal. A source that cannot be read at all is.
    pub async fn collect_descriptors(&self) -> anyhow::Result<Vec<ConfigDescriptor>> {
        let mut descriptors = Vec::new();
        for source in &self.config.sources {
            let content = utils::read_source(source).await?;
            let before = descriptors.len();
            for line in content.lines() {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                let Some(scheme) = LinkScheme::detect(line) else {
                    debug!("Skipping line with unrecognized scheme");
                    continue;
                };
                match scheme.parse(line) {
                    Ok(descriptor) => descriptors.push(descriptor),
                    Err(e) => warn!("Skipping malformed {scheme} link: {e}"),
                }
            }
            info!(
                "Parsed {} descriptors from {source}",
                descriptors.len() - before
            );
        }
        Ok(descriptors)
    }

    /// Verify every descriptor sequentially and return the working subset,
    /// in arrival order.
    pub async fn run(&self) -> anyhow::Result<Vec<ConfigDescriptor>> {
        let descriptors = self.collect_descriptors().await?;
        let total = descriptors.len();
        let runner = VerificationRunner::new(self.config.clone());

        let mut working = Vec::new();
        for (index, descriptor) in descriptors.into_iter().enumerate() {
            let remark = if descriptor.remark.is_empty() {
                "No remarks".to_string()
            } else {
                descriptor.remark.clone()
            };
            println!("Testing config {}/{}: {}", index + 1, total, remark);

            match runner.verify(&descriptor).await? {
                Verdict::Working => working.push(descriptor),
                Verdict::Failed(reason) => {
                    debug!("Config {remark:?} failed verification: {reason}")
                }
            }
        }

        info!(
            "Verification complete: {}/{} descriptors working",
            working.len(),
            total
        );
        Ok(working)
    }

    /// Run the full pipeline and write the working set to the output path.
    pub async fn run_and_persist(&self) -> anyhow::Result<Vec<ConfigDescriptor>> {
        let working = self.run().await?;

        let document = serde_json::to_string_pretty(&working)?;
        tokio::fs::write(&self.config.output_path, document)
            .await
            .with_context(|| format!("failed to write {}", self.config.output_path.display()))?;

        println!(
            "Successfully found {} working configs and saved to {}",
            working.len(),
            self.config.output_path.display()
        );
        Ok(working)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn pipeline_for(sources_content: &str) -> (Pipeline, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sources.txt");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(sources_content.as_bytes()).unwrap();

        let config = VerifierConfig::builder()
            .sources(vec![path.to_str().unwrap()])
            .build();
        (Pipeline::new(config), dir)
    }

    #[tokio::test]
    async fn test_corrupt_line_is_dropped_without_halting() {
        let (pipeline, _dir) = pipeline_for(
            "trojan://user@host.example:443?security=tls#Good\n\
             vmess://%%%not-base64%%%\n",
        );
        let descriptors = pipeline.collect_descriptors().await.unwrap();
        assert_eq!(descriptors.len(), 1);
        assert_eq!(descriptors[0].remark, "Good");
    }

    #[tokio::test]
    async fn test_unrecognized_schemes_and_blank_lines_are_skipped() {
        let (pipeline, _dir) = pipeline_for(
            "\n\
             http://not-a-share-link.example\n\
             some free text\n\
             ss://aes-256-gcm:pw@1.2.3.4:8388#Node\n",
        );
        let descriptors = pipeline.collect_descriptors().await.unwrap();
        assert_eq!(descriptors.len(), 1);
        assert_eq!(descriptors[0].remark, "Node");
    }

    #[tokio::test]
    async fn test_descriptors_keep_arrival_order() {
        let (pipeline, _dir) = pipeline_for(
            "ss://aes-256-gcm:pw@1.2.3.4:8388#First\n\
             trojan://u@h.example:443#Second\n\
             vless://u@h.example:443#Third\n",
        );
        let descriptors = pipeline.collect_descriptors().await.unwrap();
        let remarks: Vec<_> = descriptors.iter().map(|d| d.remark.as_str()).collect();
        assert_eq!(remarks, vec!["First", "Second", "Third"]);
    }

    #[tokio::test]
    async fn test_missing_source_is_fatal() {
        let config = VerifierConfig::builder()
            .sources(vec!["/nonexistent/sources.txt"])
            .build();
        let pipeline = Pipeline::new(config);
        assert!(pipeline.collect_descriptors().await.is_err());
    }
}
