//! Command-line entry point: verify the share-links listed in `sources.txt`
//! and save the working descriptors to `working_configs.json`.

use proxy_link_verifier::{Pipeline, VerifierConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = VerifierConfig::builder().build();
    Pipeline::new(config).run_and_persist().await?;
    Ok(())
}
