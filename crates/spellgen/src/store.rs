use crate::config::GenConfig;
use eyre::Context as _;
use std::{fs, path::PathBuf};

/// Loads the generator config from the target project.
///
/// The file lives next to the Foundry project (`./spellgen.toml`) rather than
/// in a home directory: networks and address books belong to the repo being
/// generated into. The config is read-only; nothing is ever written back.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

/// `SPELLGEN_RPC_<NETWORK>` overrides that network's primary RPC endpoint.
fn apply_env_overrides(cfg: &mut GenConfig) {
    for network in &mut cfg.networks {
        let var = format!(
            "SPELLGEN_RPC_{}",
            network.name.to_uppercase().replace('-', "_")
        );
        if let Ok(url) = std::env::var(&var) {
            let trimmed = url.trim();
            if !trimmed.is_empty() {
                trimmed.clone_into(&mut network.rpc_url);
            }
        }
    }
}

impl ConfigStore {
    /// Resolve the config path: `SPELLGEN_CONFIG` when set, `./spellgen.toml`
    /// otherwise.
    pub fn discover() -> Self {
        let path = std::env::var("SPELLGEN_CONFIG")
            .map_or_else(|_| PathBuf::from("spellgen.toml"), PathBuf::from);
        Self { path }
    }

    #[cfg(test)]
    pub fn at(path: PathBuf) -> Self {
        Self { path }
    }

    /// Load the config file when present, built-in defaults otherwise.
    pub fn load(&self) -> eyre::Result<GenConfig> {
        let mut cfg = if self.path.exists() {
            let s = fs::read_to_string(&self.path)
                .with_context(|| format!("read {}", self.path.display()))?;
            toml::from_str(&s).with_context(|| format!("parse {}", self.path.display()))?
        } else {
            GenConfig::default()
        };
        apply_env_overrides(&mut cfg);
        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_falls_back_to_defaults() -> eyre::Result<()> {
        let dir = tempfile::tempdir()?;
        let store = ConfigStore::at(dir.path().join("spellgen.toml"));
        let cfg = store.load()?;
        assert!(cfg.network("mainnet").is_some());
        assert_eq!(cfg.foundry.script, "script");
        Ok(())
    }

    #[test]
    fn config_file_replaces_networks_and_keeps_layout_defaults() -> eyre::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("spellgen.toml");
        fs::write(
            &path,
            r#"
[[networks]]
name = "kava"
chain_id = 2222
rpc_url = "https://evm.kava.io"

[networks.addresses]
usdt = "0x919c1c267bc06a7039e03fcc2ef738525769109c"

[foundry]
script = "deploy"
"#,
        )?;
        let cfg = ConfigStore::at(path).load()?;
        assert_eq!(cfg.networks.len(), 1);
        let kava = cfg.network("kava").ok_or_else(|| eyre::eyre!("kava missing"))?;
        assert_eq!(kava.chain_id, 2222);
        assert!(kava.addresses.contains_key("usdt"));
        assert_eq!(cfg.foundry.script, "deploy");
        assert_eq!(cfg.foundry.src, "src", "unset layout fields keep defaults");
        Ok(())
    }

    #[test]
    fn malformed_config_is_an_error() -> eyre::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("spellgen.toml");
        fs::write(&path, "networks = 3")?;
        assert!(ConfigStore::at(path).load().is_err());
        Ok(())
    }
}
