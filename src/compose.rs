//! Thin wrapper over the `docker compose` CLI.
//!
//! Every invocation is synchronous and blocking; a non-zero exit is turned
//! into a [`LaunchError::Compose`] naming the failing step, which aborts the
//! caller's remaining sequence. The program name is swappable so tests can
//! substitute a recording fake for `docker`.

use std::{
    path::{Path, PathBuf},
    process::{Command, Stdio},
};

use tracing::debug;

use crate::error::LaunchError;

pub struct ComposeCli {
    program: String,
    compose_file: PathBuf,
    env_file: PathBuf,
}

impl ComposeCli {
    pub fn new(compose_file: &Path, env_file: &Path) -> Self {
        Self {
            program: "docker".into(),
            compose_file: compose_file.to_path_buf(),
            env_file: env_file.to_path_buf(),
        }
    }

    /// Replace the `docker` executable. Test seam.
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Create (but do not start) every service in the manifest, resolving
    /// `${...}` placeholders from the env file.
    pub fn create(&self) -> Result<(), LaunchError> {
        let mut cmd = self.base();
        cmd.arg("--env-file").arg(&self.env_file).arg("create");
        self.run(cmd, "create")
    }

    /// Dry-run manifest validation (`docker compose config`), output
    /// suppressed; only the exit status matters.
    pub fn validate_config(&self) -> Result<(), LaunchError> {
        let mut cmd = self.base();
        cmd.arg("config")
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        self.run(cmd, "config validation")
    }

    /// Start all previously-created containers.
    pub fn start(&self) -> Result<(), LaunchError> {
        let mut cmd = self.base();
        cmd.arg("start");
        self.run(cmd, "start")
    }

    /// Run `args` in an ephemeral (`run --rm`) instance of `service`.
    /// `label` identifies the step in failure messages.
    pub fn run_ephemeral(
        &self,
        service: &str,
        args: &[String],
        label: &str,
    ) -> Result<(), LaunchError> {
        let mut cmd = self.base();
        cmd.args(["run", "--rm", service]).args(args);
        self.run(cmd, label)
    }

    /// Probe `service` by running `sh -c {test}` in an ephemeral instance.
    /// Returns the probe's verdict; only a failure to invoke the CLI at all
    /// is an error.
    pub fn probe(&self, service: &str, test: &str) -> Result<bool, LaunchError> {
        let mut cmd = self.base();
        cmd.args(["run", "--rm", "--entrypoint", "sh", service, "-c", test]);
        debug!(%service, %test, "probing");
        let status = cmd.status().map_err(|e| self.spawn_error("probe", e))?;
        Ok(status.success())
    }

    // ── internals ────────────────────────────────────────────────────────

    fn base(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.arg("compose").arg("-f").arg(&self.compose_file);
        cmd
    }

    fn run(&self, mut cmd: Command, label: &str) -> Result<(), LaunchError> {
        debug!(%label, ?cmd, "invoking compose");
        let status = cmd.status().map_err(|e| self.spawn_error(label, e))?;
        if status.success() {
            Ok(())
        } else {
            Err(LaunchError::Compose(format!("{label}: {status}")))
        }
    }

    fn spawn_error(&self, label: &str, e: std::io::Error) -> LaunchError {
        LaunchError::Compose(format!(
            "{label}: cannot invoke `{}`: {e}",
            self.program
        ))
    }
}
