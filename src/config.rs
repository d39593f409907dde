//! Configuration for the verification pipeline.

use std::path::PathBuf;
use std::time::Duration;

/// Configuration for a verification run.
#[derive(Debug, Clone)]
pub struct VerifierConfig {
    /// Share-link sources: local file paths or http(s) URLs, one link per line.
    pub sources: Vec<String>,
    /// Path the working descriptor set is written to.
    pub output_path: PathBuf,
    /// Proxy-client binary launched for each verification attempt.
    pub client_binary: PathBuf,
    /// How long a spawned client must stay alive to be classified working.
    pub grace_period: Duration,
    /// Local SOCKS inbound port written into every rendered configuration.
    pub inbound_port: u16,
    /// Directory staged configuration files are created in.
    pub staging_dir: PathBuf,
}

impl VerifierConfig {
    /// Create a new configuration builder.
    pub fn builder() -> VerifierConfigBuilder {
        VerifierConfigBuilder::new()
    }
}

/// Builder for `VerifierConfig`.
pub struct VerifierConfigBuilder {
    sources: Vec<String>,
    output_path: Option<PathBuf>,
    client_binary: Option<PathBuf>,
    grace_period: Option<Duration>,
    inbound_port: Option<u16>,
    staging_dir: Option<PathBuf>,
}

impl VerifierConfigBuilder {
    /// Create a new builder with default values.
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
            output_path: None,
            client_binary: None,
            grace_period: None,
            inbound_port: None,
            staging_dir: None,
        }
    }

    /// Set the share-link sources (file paths or URLs).
    pub fn sources(mut self, sources: Vec<impl Into<String>>) -> Self {
        self.sources = sources.into_iter().map(Into::into).collect();
        self
    }

    /// Set the path the working descriptor set is written to.
    pub fn output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = Some(path.into());
        self
    }

    /// Set the proxy-client binary to launch.
    pub fn client_binary(mut self, path: impl Into<PathBuf>) -> Self {
        self.client_binary = Some(path.into());
        self
    }

    /// Set the grace period a client must survive to count as working.
    pub fn grace_period(mut self, period: Duration) -> Self {
        self.grace_period = Some(period);
        self
    }

    /// Set the local SOCKS inbound port used in rendered configurations.
    pub fn inbound_port(mut self, port: u16) -> Self {
        self.inbound_port = Some(port);
        self
    }

    /// Set the directory staged configuration files are created in.
    pub fn staging_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.staging_dir = Some(dir.into());
        self
    }

    /// Build the configuration.
    pub fn build(self) -> VerifierConfig {
        VerifierConfig {
            sources: if self.sources.is_empty() {
                vec!["sources.txt".to_string()]
            } else {
                self.sources
            },
            output_path: self
                .output_path
                .unwrap_or_else(|| PathBuf::from("working_configs.json")),
            client_binary: self.client_binary.unwrap_or_else(|| PathBuf::from("./v2ray")),
            grace_period: self.grace_period.unwrap_or(Duration::from_secs(5)),
            inbound_port: self.inbound_port.unwrap_or(1080),
            staging_dir: self.staging_dir.unwrap_or_else(std::env::temp_dir),
        }
    }
}

impl Default for VerifierConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let config = VerifierConfig::builder().build();
        assert_eq!(config.sources, vec!["sources.txt".to_string()]);
        assert_eq!(config.output_path, PathBuf::from("working_configs.json"));
        assert_eq!(config.client_binary, PathBuf::from("./v2ray"));
        assert_eq!(config.grace_period, Duration::from_secs(5));
        assert_eq!(config.inbound_port, 1080);
    }

    #[test]
    fn test_builder_overrides() {
        let config = VerifierConfig::builder()
            .sources(vec!["links.txt", "https://example.com/list.txt"])
            .client_binary("/usr/bin/xray")
            .grace_period(Duration::from_millis(500))
            .inbound_port(10808)
            .staging_dir("/tmp/stage")
            .build();
        assert_eq!(config.sources.len(), 2);
        assert_eq!(config.client_binary, PathBuf::from("/usr/bin/xray"));
        assert_eq!(config.grace_period, Duration::from_millis(500));
        assert_eq!(config.inbound_port, 10808);
        assert_eq!(config.staging_dir, PathBuf::from("/tmp/stage"));
    }
}
