//! Cluster manifest — model, generation, and YAML round-trip.
//!
//! The manifest is a docker-compose document with one service per validator
//! node, named `{chain}-n{index}` with indices 1..=N. Service order in the
//! emitted file follows index order; `serde_yaml::Mapping` preserves it on
//! the way back in.

use std::{
    env, fmt, fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};

use crate::error::LaunchError;

/// Manifest file name, fixed and relative to the working directory.
pub const MANIFEST_FILE: &str = "docker-compose.yml";

/// Secret file consumed by both this tool and `docker compose --env-file`.
pub const ENV_FILE: &str = ".env";

/// Node data directory inside each container.
pub const BASE_PATH: &str = "/opt/cess/data";

/// Extra arguments the second node (and only it) receives, opening its RPC
/// endpoint for external unsafe calls. Operator convenience, not configurable.
const UNSAFE_RPC_ARGS: [&str; 7] = [
    "--wasm-execution",
    "compiled",
    "--rpc-methods",
    "unsafe",
    "--rpc-external",
    "--rpc-cors",
    "all",
];

// ── chain identifier ─────────────────────────────────────────────────────────

/// CESS chain specification. Doubles as the image tag and the `--chain`
/// argument passed to the node binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Chain {
    Premainnet,
    Testnet,
    Devnet,
}

impl Chain {
    pub fn as_str(&self) -> &'static str {
        match self {
            Chain::Premainnet => "premainnet",
            Chain::Testnet => "testnet",
            Chain::Devnet => "devnet",
        }
    }

    /// Keystore directory the node binary creates under its base path.
    pub fn keystore_dir(&self) -> String {
        format!("{BASE_PATH}/chains/cess-{self}/keystore")
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Chain {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "premainnet" => Ok(Chain::Premainnet),
            "testnet" => Ok(Chain::Testnet),
            "devnet" => Ok(Chain::Devnet),
            other => Err(format!("unknown chain `{other}`")),
        }
    }
}

// ── service model ────────────────────────────────────────────────────────────

/// One compose service entry, shaped exactly like the emitted YAML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceSpec {
    pub image: String,
    pub network_mode: String,
    pub volumes: Vec<String>,
    pub command: Vec<String>,
    pub logging: LoggingSpec,
    pub container_name: String,
    pub environment: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSpec {
    pub driver: String,
    pub options: LogRotation,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogRotation {
    #[serde(rename = "max-size")]
    pub max_size: String,
    #[serde(rename = "max-file")]
    pub max_file: String,
}

/// Typed view of one service, resolved once at parse time so downstream
/// operations never re-scan argument vectors.
#[derive(Debug, Clone)]
pub struct NodeEntry {
    /// Service name, `{chain}-n{index}`.
    pub name: String,
    /// 1-based node index from the name suffix.
    pub index: u32,
    pub chain: Chain,
}

/// Parameters for manifest generation.
#[derive(Debug, Clone)]
pub struct GenParams {
    pub chain: Chain,
    pub instances: u32,
    pub data_dir: PathBuf,
    pub p2p_port: u16,
    pub rpc_port: u16,
}

// ── manifest ─────────────────────────────────────────────────────────────────

/// Ordered service set. Created by `gen`, read-only afterwards.
#[derive(Debug, Clone)]
pub struct ClusterManifest {
    services: Vec<(String, ServiceSpec)>,
}

impl ClusterManifest {
    /// Build a manifest of `params.instances` validator services.
    ///
    /// The data directory is absolutized against the current working
    /// directory so the bind mounts stay valid regardless of where
    /// `docker compose` is later invoked from.
    pub fn generate(params: &GenParams) -> Result<Self, LaunchError> {
        let data_dir = absolutize(&params.data_dir)?;
        let chain = params.chain;

        let mut services = Vec::with_capacity(params.instances as usize);
        for i in 1..=params.instances {
            let name = format!("{chain}-n{i}");
            let p2p_port = u32::from(params.p2p_port) + i - 1;
            let rpc_port = u32::from(params.rpc_port) + i - 1;

            let mut command = vec![
                "--base-path".to_string(),
                BASE_PATH.to_string(),
                "--chain".to_string(),
                chain.to_string(),
                "--port".to_string(),
                p2p_port.to_string(),
                "--name".to_string(),
                format!("{}-N{i}", chain.as_str().to_uppercase()),
                "--validator".to_string(),
                "--rpc-port".to_string(),
                rpc_port.to_string(),
                "--pruning".to_string(),
                "archive".to_string(),
                "--node-key".to_string(),
                format!("${{N{i}_NODE_KEY}}"),
                "--no-telemetry".to_string(),
                "--no-prometheus".to_string(),
                "--no-hardware-benchmarks".to_string(),
            ];

            if i == 2 {
                command.extend(UNSAFE_RPC_ARGS.iter().map(|s| s.to_string()));
            }

            let spec = ServiceSpec {
                image: format!("cesslab/cess-chain:{chain}"),
                network_mode: "host".into(),
                volumes: vec![format!("{}/n{i}:{BASE_PATH}", data_dir.display())],
                command,
                logging: LoggingSpec {
                    driver: "json-file".into(),
                    options: LogRotation {
                        max_size: "300m".into(),
                        max_file: "10".into(),
                    },
                },
                container_name: name.clone(),
                environment: vec!["RUST_LOG=info".into(), "RUST_BACKTRACE=full".into()],
            };
            services.push((name, spec));
        }

        Ok(Self { services })
    }

    /// Services in manifest order.
    pub fn services(&self) -> impl Iterator<Item = (&str, &ServiceSpec)> {
        self.services.iter().map(|(n, s)| (n.as_str(), s))
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    /// Resolve every service into a [`NodeEntry`], in manifest order.
    ///
    /// A service whose name carries no parseable `-n{index}` suffix or whose
    /// command vector carries no valid `--chain` value is a hard error; a
    /// manifest like that was not produced by `gen` and key insertion against
    /// it would target the wrong keystore.
    pub fn nodes(&self) -> Result<Vec<NodeEntry>, LaunchError> {
        self.services
            .iter()
            .map(|(name, spec)| {
                let index = parse_index(name).ok_or_else(|| {
                    LaunchError::Manifest(format!(
                        "service `{name}`: name has no `-n{{index}}` suffix"
                    ))
                })?;
                let chain = chain_from_command(&spec.command).map_err(|e| {
                    LaunchError::Manifest(format!("service `{name}`: {e}"))
                })?;
                Ok(NodeEntry {
                    name: name.clone(),
                    index,
                    chain,
                })
            })
            .collect()
    }

    /// Serialize to `path`, overwriting any existing file.
    pub fn write(&self, path: &Path) -> Result<(), LaunchError> {
        let mut services = Mapping::new();
        for (name, spec) in &self.services {
            services.insert(Value::String(name.clone()), serde_yaml::to_value(spec)?);
        }
        let mut root = Mapping::new();
        root.insert(Value::String("services".into()), Value::Mapping(services));

        fs::write(path, serde_yaml::to_string(&Value::Mapping(root))?)?;
        Ok(())
    }

    /// Parse a previously generated manifest, preserving service order.
    pub fn load(path: &Path) -> Result<Self, LaunchError> {
        let text = fs::read_to_string(path)?;
        let doc: Value = serde_yaml::from_str(&text)?;

        let services = doc
            .get("services")
            .and_then(Value::as_mapping)
            .ok_or_else(|| {
                LaunchError::Manifest(format!(
                    "{}: missing `services` mapping",
                    path.display()
                ))
            })?;

        let mut out = Vec::with_capacity(services.len());
        for (key, value) in services {
            let name = key
                .as_str()
                .ok_or_else(|| LaunchError::Manifest("non-string service name".into()))?
                .to_string();
            let spec: ServiceSpec = serde_yaml::from_value(value.clone())?;
            out.push((name, spec));
        }

        Ok(Self { services: out })
    }
}

// ── internals ────────────────────────────────────────────────────────────────

fn absolutize(path: &Path) -> Result<PathBuf, LaunchError> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(env::current_dir()?.join(path))
    }
}

/// Numeric index from a `{chain}-n{index}` service name.
fn parse_index(name: &str) -> Option<u32> {
    let (_, suffix) = name.rsplit_once("-n")?;
    suffix.parse().ok()
}

/// Chain identifier from the token following `--chain`.
fn chain_from_command(command: &[String]) -> Result<Chain, String> {
    let pos = command
        .iter()
        .position(|arg| arg == "--chain")
        .ok_or_else(|| "missing `--chain` argument".to_string())?;
    let value = command
        .get(pos + 1)
        .ok_or_else(|| "`--chain` has no value".to_string())?;
    value.parse()
}
