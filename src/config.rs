use std::{fs, path::Path};

use dotenv::dotenv;
use envsubst::substitute;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub rpc: RpcConfig,
    pub wallet: WalletConfig,
    pub contracts: ContractsConfig,
}

impl Config {
    pub async fn from_yaml(path: impl AsRef<Path>) -> Self {
        dotenv().ok();

        let file_content =
            fs::read_to_string(path).expect("failed to read config file from path: {path}");

        let env_vars: std::collections::HashMap<String, String> = std::env::vars()
            .filter(|(key, _)| {
                key.starts_with("SERVER_")
                    || key.starts_with("WALLET_")
                    || key.starts_with("CONTRACT_")
            })
            .collect();

        let interpolated = substitute(&file_content, &env_vars)
            .expect("Failed to substitute environment variables in YAML");

        let config: Config =
            serde_yaml::from_str(&interpolated).expect("Failed to parse YAML configuration");

        config
    }

    pub fn server_uri(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RpcConfig {
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WalletConfig {
    pub private_key: String,
}

/// Deployment addresses of the three exchange endpoints. All three are
/// required; a value left empty (or unsubstituted) surfaces as a
/// configuration error when bindings are first derived.
#[derive(Debug, Clone, Deserialize)]
pub struct ContractsConfig {
    pub token_factory: String,
    pub pair_factory: String,
    pub router: String,
}
