//! `cess-launch` — CESS chain validator launch tool.
//!
//! Subcommands:
//!   1. `gen`        — write docker-compose.yml for N validator nodes
//!   2. `key-insert` — create containers, insert per-node keys from `.env`
//!   3. `run`        — validate, probe every keystore, start the cluster

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use tracing::info;

use cess_launch::{
    cluster,
    compose::ComposeCli,
    error::LaunchError,
    keys, logger,
    manifest::{Chain, ClusterManifest, ENV_FILE, GenParams, MANIFEST_FILE},
};

#[derive(Parser, Debug)]
#[clap(name = "cess-launch", version, about = "CESS chain validator launch tool")]
struct Cli {
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate docker-compose.yml
    Gen(GenArgs),
    /// Insert block-authoring and finality-voting keys into validator nodes
    KeyInsert,
    /// Run CESS chain validator nodes
    Run,
}

#[derive(Args, Debug)]
struct GenArgs {
    /// CESS chain specification
    #[clap(long, value_enum, default_value_t = Chain::Devnet)]
    chain: Chain,

    /// Validator instance count
    #[clap(long, default_value_t = 2, value_parser = clap::value_parser!(u32).range(1..))]
    inst: u32,

    /// Host data directory; node i mounts `{data-dir}/n{i}`
    #[clap(long, default_value = "./data")]
    data_dir: PathBuf,

    /// Base P2P port; node i listens on base + i - 1
    #[clap(long, default_value_t = 30333)]
    p2p_port: u16,

    /// Base RPC port; node i listens on base + i - 1
    #[clap(long, default_value_t = 9944)]
    rpc_port: u16,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), LaunchError> {
    let cli = Cli::parse();
    logger::init("info")?;

    let manifest_path = Path::new(MANIFEST_FILE);
    let env_file = Path::new(ENV_FILE);
    let compose = ComposeCli::new(manifest_path, env_file);

    match cli.command {
        Commands::Gen(args) => {
            let manifest = ClusterManifest::generate(&GenParams {
                chain: args.chain,
                instances: args.inst,
                data_dir: args.data_dir,
                p2p_port: args.p2p_port,
                rpc_port: args.rpc_port,
            })?;
            manifest.write(manifest_path)?;
            info!(services = manifest.len(), chain = %args.chain, "manifest written");
            println!("Generated {MANIFEST_FILE}");
        }
        Commands::KeyInsert => {
            keys::key_insert(&compose, manifest_path, env_file)?;
            println!("Keys inserted.");
        }
        Commands::Run => {
            cluster::start_cluster(&compose, manifest_path)?;
            println!("CESS Validator started.");
        }
    }

    Ok(())
}
