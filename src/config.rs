use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::{chain::Chain, error::AdapterError};

/// Environment variables with this prefix override values from the config file.
pub const ENV_PREFIX: &str = "INFINITE_TVL_";

/// Settings for one run of the valuation binary
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RunnerConfig {
    pub rpc_url: String,
    #[serde(default = "default_chain")]
    pub chain: Chain,
    /// Block to read at. Latest when unset.
    #[serde(default)]
    pub block: Option<u64>,
}

fn default_chain() -> Chain {
    Chain::Optimism
}

/// Explicit values that take precedence over both the file and the environment.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConfigOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rpc_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chain: Option<Chain>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block: Option<u64>,
}

impl RunnerConfig {
    pub fn load(path: Option<&Path>, overrides: ConfigOverrides) -> Result<Self, AdapterError> {
        let mut figment = Figment::new();
        if let Some(path) = path {
            figment = figment.merge(Yaml::file(path));
        }
        figment = figment
            .merge(Env::prefixed(ENV_PREFIX))
            .merge(Serialized::defaults(overrides));

        let config: Self = figment
            .extract()
            .map_err(|e| AdapterError::Config(e.to_string()))?;
        if config.rpc_url.trim().is_empty() {
            return Err(AdapterError::Config("rpc_url must not be empty".to_string()));
        }
        Ok(config)
    }
}
