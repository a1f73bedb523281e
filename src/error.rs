//! Application-wide error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("manifest error: {0}")]
    Manifest(String),

    #[error("secret error: {0}")]
    Secret(String),

    #[error("compose error: {0}")]
    Compose(String),

    #[error("{0}")]
    Precondition(String),

    #[error("logger error: {0}")]
    Logger(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn manifest_error_display() {
        let e = LaunchError::Manifest("service devnet-n1: missing --chain".into());
        assert!(e.to_string().contains("missing --chain"));
        assert!(e.to_string().starts_with("manifest error"));
    }

    #[test]
    fn secret_error_display() {
        let e = LaunchError::Secret("N3_MNEMONIC is not set".into());
        assert!(e.to_string().contains("N3_MNEMONIC"));
    }

    #[test]
    fn precondition_error_is_bare_message() {
        let e = LaunchError::Precondition("docker-compose.yml not found".into());
        assert_eq!(e.to_string(), "docker-compose.yml not found");
    }

    #[test]
    fn io_error_converts() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let e: LaunchError = io_err.into();
        assert!(e.to_string().contains("io error"));
        // satisfies std::error::Error trait
        let _: &dyn Error = &e;
    }
}
