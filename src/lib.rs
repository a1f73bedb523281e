//! CESS chain validator launch tool.
//!
//! Operator glue over the `docker compose` CLI and the CESS node binary:
//! generate a compose manifest for N validator nodes, insert each node's
//! block-authoring and finality-voting keys from a secret file, and start
//! the cluster once every keystore checks out. Entirely synchronous and
//! sequential; every external-command failure is fatal to the invocation.

pub mod cluster;
pub mod compose;
pub mod error;
pub mod keys;
pub mod logger;
pub mod manifest;
pub mod secrets;
