//! Secret provider — per-node mnemonic phrases.
//!
//! Mnemonics live in the `.env` secret file (the same one `docker compose
//! --env-file` resolves `${N{i}_NODE_KEY}` placeholders from) under the
//! convention name `N{index}_MNEMONIC`. The store is loaded once per
//! operation, never mutated, and never written anywhere.

use std::{collections::HashMap, env, path::Path};

use crate::error::LaunchError;

/// Convention name for node `index`'s mnemonic variable.
pub fn mnemonic_var(index: u32) -> String {
    format!("N{index}_MNEMONIC")
}

/// Immutable node-index → mnemonic mapping.
#[derive(Debug, Clone)]
pub struct SecretStore {
    mnemonics: HashMap<u32, String>,
}

impl SecretStore {
    /// Load mnemonics for exactly `indices` from the secret file, falling
    /// back to the process environment for variables the file lacks.
    ///
    /// Every requested index must resolve; a missing variable is an error
    /// naming it, so the operator knows which line to add.
    pub fn load(
        env_file: &Path,
        indices: impl IntoIterator<Item = u32>,
    ) -> Result<Self, LaunchError> {
        let mut file_vars: HashMap<String, String> = HashMap::new();
        if env_file.exists() {
            let iter = dotenvy::from_path_iter(env_file).map_err(|e| {
                LaunchError::Secret(format!("cannot read {}: {e}", env_file.display()))
            })?;
            for item in iter {
                let (key, value) = item.map_err(|e| {
                    LaunchError::Secret(format!("malformed line in {}: {e}", env_file.display()))
                })?;
                file_vars.insert(key, value);
            }
        }

        let mut mnemonics = HashMap::new();
        for index in indices {
            let var = mnemonic_var(index);
            let value = file_vars
                .get(&var)
                .cloned()
                .or_else(|| env::var(&var).ok())
                .ok_or_else(|| {
                    LaunchError::Secret(format!(
                        "{var} is not set in {} or the environment",
                        env_file.display()
                    ))
                })?;
            mnemonics.insert(index, value);
        }

        Ok(Self { mnemonics })
    }

    /// Build a store from literal pairs. Test and embedding convenience.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (u32, String)>) -> Self {
        Self {
            mnemonics: pairs.into_iter().collect(),
        }
    }

    pub fn mnemonic(&self, index: u32) -> Result<&str, LaunchError> {
        self.mnemonics
            .get(&index)
            .map(String::as_str)
            .ok_or_else(|| {
                LaunchError::Secret(format!("no mnemonic loaded for node {index}"))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn loads_requested_indices_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let env_file = dir.path().join(".env");
        fs::write(
            &env_file,
            "N1_MNEMONIC=\"alpha bravo charlie\"\nN2_MNEMONIC=\"delta echo foxtrot\"\nN1_NODE_KEY=deadbeef\n",
        )
        .unwrap();

        let store = SecretStore::load(&env_file, [1, 2]).unwrap();
        assert_eq!(store.mnemonic(1).unwrap(), "alpha bravo charlie");
        assert_eq!(store.mnemonic(2).unwrap(), "delta echo foxtrot");
    }

    #[test]
    fn missing_variable_error_names_it() {
        let dir = tempfile::tempdir().unwrap();
        let env_file = dir.path().join(".env");
        fs::write(&env_file, "N1_MNEMONIC=seed\n").unwrap();

        // index 417 is requested but defined nowhere
        let err = SecretStore::load(&env_file, [1, 417]).unwrap_err();
        assert!(err.to_string().contains("N417_MNEMONIC"), "{err}");
    }

    #[test]
    fn absent_secret_file_falls_back_to_environment_only() {
        let dir = tempfile::tempdir().unwrap();
        let env_file = dir.path().join("no-such.env");

        let err = SecretStore::load(&env_file, [503]).unwrap_err();
        assert!(err.to_string().contains("N503_MNEMONIC"));
    }

    #[test]
    fn unknown_index_lookup_fails() {
        let store = SecretStore::from_pairs([(1, "seed".to_string())]);
        assert!(store.mnemonic(2).is_err());
    }
}
