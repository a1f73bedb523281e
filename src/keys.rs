//! Key insertion — per-node block-authoring and finality-voting keys.
//!
//! The whole operation is planned up front as an ordered step list, then
//! executed sequentially with short-circuit-on-failure. Re-running is safe:
//! the node binary keys insertions by scheme and account, so repeats are
//! no-ops on its side.

use std::path::Path;

use tracing::info;

use crate::{
    compose::ComposeCli,
    error::LaunchError,
    manifest::{BASE_PATH, ClusterManifest, NodeEntry},
    secrets::SecretStore,
};

/// (scheme, key-type) pairs inserted per node, in order: block authoring
/// first, finality voting second.
const KEY_SCHEMES: [(&str, &str); 2] = [("Sr25519", "babe"), ("Ed25519", "gran")];

/// One `key insert` invocation against one service's container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertStep {
    pub service: String,
    pub key_type: &'static str,
    /// Arguments handed to the node binary inside the container.
    pub args: Vec<String>,
}

/// Build the full ordered insertion plan: two steps per node, in manifest
/// order. Fails before any side effect if a mnemonic is missing.
pub fn plan(
    nodes: &[NodeEntry],
    secrets: &SecretStore,
) -> Result<Vec<InsertStep>, LaunchError> {
    let mut steps = Vec::with_capacity(nodes.len() * KEY_SCHEMES.len());
    for node in nodes {
        let mnemonic = secrets.mnemonic(node.index)?;
        for (scheme, key_type) in KEY_SCHEMES {
            steps.push(InsertStep {
                service: node.name.clone(),
                key_type,
                args: [
                    "key",
                    "insert",
                    "--base-path",
                    BASE_PATH,
                    "--chain",
                    node.chain.as_str(),
                    "--scheme",
                    scheme,
                    "--key-type",
                    key_type,
                    "--suri",
                    mnemonic,
                ]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            });
        }
    }
    Ok(steps)
}

/// Execute the plan; the first failing step aborts the remainder.
pub fn install(cli: &ComposeCli, steps: &[InsertStep]) -> Result<(), LaunchError> {
    for step in steps {
        info!(service = %step.service, key_type = step.key_type, "inserting key");
        let label = format!("key insert [{} {}]", step.service, step.key_type);
        cli.run_ephemeral(&step.service, &step.args, &label)?;
    }
    Ok(())
}

/// The `key-insert` operation end to end: create containers, parse the
/// manifest back, load secrets for exactly the node indices present, then
/// run the insertion plan.
pub fn key_insert(
    cli: &ComposeCli,
    manifest_path: &Path,
    env_file: &Path,
) -> Result<(), LaunchError> {
    // Container filesystems must exist before keys can land in them. A
    // missing manifest surfaces here as the compose CLI's own error.
    cli.create()?;

    let manifest = ClusterManifest::load(manifest_path)?;
    let nodes = manifest.nodes()?;
    let secrets = SecretStore::load(env_file, nodes.iter().map(|n| n.index))?;

    let steps = plan(&nodes, &secrets)?;
    install(cli, &steps)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::{Chain, GenParams};
    use std::path::PathBuf;

    fn manifest(instances: u32) -> ClusterManifest {
        ClusterManifest::generate(&GenParams {
            chain: Chain::Devnet,
            instances,
            data_dir: PathBuf::from("/srv/data"),
            p2p_port: 30333,
            rpc_port: 9944,
        })
        .unwrap()
    }

    fn secrets(n: u32) -> SecretStore {
        SecretStore::from_pairs((1..=n).map(|i| (i, format!("seed phrase {i}"))))
    }

    #[test]
    fn two_steps_per_node_authoring_before_voting() {
        let nodes = manifest(3).nodes().unwrap();
        let steps = plan(&nodes, &secrets(3)).unwrap();
        assert_eq!(steps.len(), 6);

        for (i, pair) in steps.chunks(2).enumerate() {
            let service = format!("devnet-n{}", i + 1);
            assert_eq!(pair[0].service, service);
            assert_eq!(pair[0].key_type, "babe");
            assert_eq!(pair[1].service, service);
            assert_eq!(pair[1].key_type, "gran");
        }
    }

    #[test]
    fn step_args_carry_scheme_chain_and_mnemonic() {
        let nodes = manifest(1).nodes().unwrap();
        let steps = plan(&nodes, &secrets(1)).unwrap();

        let arg_after = |args: &[String], flag: &str| {
            let pos = args.iter().position(|a| a == flag).unwrap();
            args[pos + 1].clone()
        };

        assert_eq!(steps[0].args[..2], ["key".to_string(), "insert".to_string()]);
        assert_eq!(arg_after(&steps[0].args, "--base-path"), BASE_PATH);
        assert_eq!(arg_after(&steps[0].args, "--chain"), "devnet");
        assert_eq!(arg_after(&steps[0].args, "--scheme"), "Sr25519");
        assert_eq!(arg_after(&steps[0].args, "--key-type"), "babe");
        assert_eq!(arg_after(&steps[0].args, "--suri"), "seed phrase 1");

        assert_eq!(arg_after(&steps[1].args, "--scheme"), "Ed25519");
        assert_eq!(arg_after(&steps[1].args, "--key-type"), "gran");
        assert_eq!(arg_after(&steps[1].args, "--suri"), "seed phrase 1");
    }

    #[test]
    fn plan_is_stable_across_repeat_runs() {
        let nodes = manifest(2).nodes().unwrap();
        let secrets = secrets(2);
        let first = plan(&nodes, &secrets).unwrap();
        let second = plan(&nodes, &secrets).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn missing_mnemonic_fails_before_any_step() {
        let nodes = manifest(3).nodes().unwrap();
        // only nodes 1 and 2 have secrets
        let err = plan(&nodes, &secrets(2)).unwrap_err();
        assert!(err.to_string().contains("node 3"), "{err}");
    }
}
