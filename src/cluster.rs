//! Cluster startup — precondition gates, then `start`.

use std::path::Path;

use tracing::info;

use crate::{compose::ComposeCli, error::LaunchError, manifest::ClusterManifest};

/// Start the cluster after three hard gates: the manifest exists, the
/// orchestration layer accepts it, and every node already holds a keystore.
/// `start` is never reached if any gate fails.
pub fn start_cluster(cli: &ComposeCli, manifest_path: &Path) -> Result<(), LaunchError> {
    if !manifest_path.exists() {
        return Err(LaunchError::Precondition(format!(
            "{} not found, generate it with `cess-launch gen` first",
            manifest_path.display()
        )));
    }

    cli.validate_config()?;

    let manifest = ClusterManifest::load(manifest_path)?;
    for node in manifest.nodes()? {
        info!(service = %node.name, "checking keystore");
        let test = format!("test -e {}", node.chain.keystore_dir());
        if !cli.probe(&node.name, &test)? {
            return Err(LaunchError::Precondition(format!(
                "[{}] keystore directory does not exist, run `cess-launch key-insert` first",
                node.name
            )));
        }
    }

    cli.start()
}
