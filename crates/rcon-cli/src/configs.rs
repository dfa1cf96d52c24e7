use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use anyhow::{Context, anyhow, bail};
use serde::Deserialize;

use valve_rcon::client_config::DEFAULT_PORT;

#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct ServerConfig {
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub password: String,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

#[derive(Deserialize, Debug)]
struct ServerConfigMap {
    configs: HashMap<String, ServerConfig>,
}

const ENV_VAR_KEY: &str = "RCON_CONFIG_PATH";

/// Looks up a server entry in the file named by `RCON_CONFIG_PATH`.
pub fn load_config_from_env(config_name: Option<&str>) -> anyhow::Result<ServerConfig> {
    let path = std::env::var(ENV_VAR_KEY).with_context(|| format!("environment variable {} not set", ENV_VAR_KEY))?;
    log::debug!("Found environment variable {}: {}", ENV_VAR_KEY, path);
    load_config(Path::new(&path), config_name)
}

/// Picks `config_name` from the file, or its only entry when no name is given.
pub fn load_config(path: &Path, config_name: Option<&str>) -> anyhow::Result<ServerConfig> {
    let file = File::open(path).with_context(|| format!("failed to open config file {}", path.display()))?;
    let map: ServerConfigMap =
        serde_json::from_reader(file).with_context(|| format!("failed to parse config file {}", path.display()))?;

    match config_name {
        Some(name) => {
            let config = map
                .configs
                .get(name)
                .ok_or_else(|| anyhow!("config '{}' not found in {}", name, path.display()))?;
            log::info!("Using config: {}", name);
            Ok(config.clone())
        },
        None => {
            if map.configs.len() != 1 {
                bail!("{} holds {} configs; pass --config-name to pick one", path.display(), map.configs.len());
            }
            let (name, config) = map.configs.into_iter().next().ok_or_else(|| anyhow!("no configs"))?;
            log::info!("No config name provided. Using the only available config: {}", name);
            Ok(config)
        }
    }
}
