//! Endpoint configuration read from the environment.

use lp_tvl_data::{SourceKey, SourceRegistry, SubgraphPositionSource, SubgraphVaultSource};
use lp_tvl_domain::enums::{Chain, Protocol, UnknownVariant};
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;

const SUBGRAPH_PREFIX: &str = "SUBGRAPH_URL_";
const VAULT_PREFIX: &str = "VAULT_URL_";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnv(String),
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// Environment variable holding the subgraph URL for `key`,
/// e.g. `SUBGRAPH_URL_MODE_POOLSHARK_POOLSHARK`.
pub fn subgraph_var(key: SourceKey) -> String {
    format!("{SUBGRAPH_PREFIX}{}_{}_{}", key.chain, key.protocol, key.amm).to_uppercase()
}

/// Environment variable holding a vault endpoint, e.g. `VAULT_URL_MODE_AIRPUFF`.
pub fn vault_var(chain: Chain, protocol: Protocol) -> String {
    format!("{VAULT_PREFIX}{chain}_{protocol}").to_uppercase()
}

/// Subgraph and vault endpoint URLs.
#[derive(Debug, Clone, Default)]
pub struct SourceConfig {
    subgraph_urls: HashMap<SourceKey, String>,
    vault_urls: HashMap<(Chain, Protocol), String>,
}

impl SourceConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_map(std::env::vars().collect())
    }

    /// Collects every `SUBGRAPH_URL_<CHAIN>_<PROTOCOL>_<AMM>` and
    /// `VAULT_URL_<CHAIN>_<PROTOCOL>` entry; other variables are ignored.
    pub fn from_env_map(env_map: HashMap<String, String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        for (name, value) in env_map {
            if let Some(rest) = name.strip_prefix(SUBGRAPH_PREFIX) {
                let key = match rest.split('_').collect::<Vec<_>>().as_slice() {
                    [chain, protocol, amm] => SourceKey::new(
                        parse_part(&name, chain)?,
                        parse_part(&name, protocol)?,
                        parse_part(&name, amm)?,
                    ),
                    _ => {
                        return Err(ConfigError::InvalidValue(
                            name.clone(),
                            "expected SUBGRAPH_URL_<CHAIN>_<PROTOCOL>_<AMM>".to_string(),
                        ));
                    }
                };
                let url = non_empty(&name, value)?;
                config.subgraph_urls.insert(key, url);
            } else if let Some(rest) = name.strip_prefix(VAULT_PREFIX) {
                let key = match rest.split('_').collect::<Vec<_>>().as_slice() {
                    [chain, protocol] => (parse_part(&name, chain)?, parse_part(&name, protocol)?),
                    _ => {
                        return Err(ConfigError::InvalidValue(
                            name.clone(),
                            "expected VAULT_URL_<CHAIN>_<PROTOCOL>".to_string(),
                        ));
                    }
                };
                let url = non_empty(&name, value)?;
                config.vault_urls.insert(key, url);
            }
        }
        Ok(config)
    }

    /// Overrides the subgraph URL for `key`.
    pub fn set_subgraph_url(&mut self, key: SourceKey, url: impl Into<String>) {
        self.subgraph_urls.insert(key, url.into());
    }

    pub fn set_vault_url(&mut self, chain: Chain, protocol: Protocol, url: impl Into<String>) {
        self.vault_urls.insert((chain, protocol), url.into());
    }

    pub fn subgraph_url(&self, key: SourceKey) -> Result<&str, ConfigError> {
        self.subgraph_urls
            .get(&key)
            .map(String::as_str)
            .ok_or_else(|| ConfigError::MissingEnv(subgraph_var(key)))
    }

    pub fn vault_url(&self, chain: Chain, protocol: Protocol) -> Result<&str, ConfigError> {
        self.vault_urls
            .get(&(chain, protocol))
            .map(String::as_str)
            .ok_or_else(|| ConfigError::MissingEnv(vault_var(chain, protocol)))
    }

    /// Builds a registry with one subgraph source per configured URL; each
    /// position source queries limit positions only if its AMM has them.
    pub fn registry(&self) -> SourceRegistry {
        let mut registry = SourceRegistry::new();
        for (key, url) in &self.subgraph_urls {
            registry.register_positions(
                *key,
                Arc::new(SubgraphPositionSource::new(url.clone(), key.amm)),
            );
        }
        for ((chain, protocol), url) in &self.vault_urls {
            registry.register_vaults(
                *chain,
                *protocol,
                Arc::new(SubgraphVaultSource::new(url.clone())),
            );
        }
        registry
    }
}

fn parse_part<T: FromStr<Err = UnknownVariant>>(name: &str, part: &str) -> Result<T, ConfigError> {
    part.parse()
        .map_err(|e: UnknownVariant| ConfigError::InvalidValue(name.to_string(), e.to_string()))
}

fn non_empty(name: &str, value: String) -> Result<String, ConfigError> {
    let value = value.trim().to_string();
    if value.is_empty() {
        return Err(ConfigError::InvalidValue(
            name.to_string(),
            "must not be empty".to_string(),
        ));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lp_tvl_domain::enums::AmmType;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_reads_subgraph_and_vault_urls() {
        let config = SourceConfig::from_env_map(env(&[
            ("SUBGRAPH_URL_MODE_POOLSHARK_POOLSHARK", "https://example.org/poolshark"),
            ("SUBGRAPH_URL_MODE_SUPSWAP_UNISWAPV3", " https://example.org/supswap "),
            ("VAULT_URL_MODE_AIRPUFF", "https://example.org/airpuff"),
            ("PATH", "/usr/bin"),
        ]))
        .unwrap();

        let key = SourceKey::new(Chain::Mode, Protocol::Poolshark, AmmType::Poolshark);
        assert_eq!(config.subgraph_url(key).unwrap(), "https://example.org/poolshark");
        let key = SourceKey::new(Chain::Mode, Protocol::Supswap, AmmType::UniswapV3);
        assert_eq!(config.subgraph_url(key).unwrap(), "https://example.org/supswap");
        assert_eq!(
            config.vault_url(Chain::Mode, Protocol::Airpuff).unwrap(),
            "https://example.org/airpuff"
        );

        let registry = config.registry();
        assert!(registry.position_source(key).is_ok());
        assert!(registry.vault_source(Chain::Mode, Protocol::Airpuff).is_ok());
    }

    #[test]
    fn test_missing_url_names_the_variable() {
        let config = SourceConfig::from_env_map(HashMap::new()).unwrap();
        let key = SourceKey::new(Chain::Linea, Protocol::Poolshark, AmmType::Poolshark);
        let err = config.subgraph_url(key).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Missing required environment variable: SUBGRAPH_URL_LINEA_POOLSHARK_POOLSHARK"
        );
        assert_eq!(vault_var(Chain::Mode, Protocol::Airpuff), "VAULT_URL_MODE_AIRPUFF");
    }

    #[test]
    fn test_override() {
        let mut config = SourceConfig::default();
        let key = SourceKey::new(Chain::Mode, Protocol::Poolshark, AmmType::Poolshark);
        config.set_subgraph_url(key, "http://localhost:8000");
        assert_eq!(config.subgraph_url(key).unwrap(), "http://localhost:8000");
    }

    #[test]
    fn test_invalid_entries() {
        let err = SourceConfig::from_env_map(env(&[("SUBGRAPH_URL_MODE_POOLSHARK", "x")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(name, _) if name == "SUBGRAPH_URL_MODE_POOLSHARK"));

        let err = SourceConfig::from_env_map(env(&[("VAULT_URL_SOLANA_AIRPUFF", "x")]))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid value for VAULT_URL_SOLANA_AIRPUFF: unknown Chain: solana"
        );

        let err = SourceConfig::from_env_map(env(&[("VAULT_URL_MODE_AIRPUFF", "  ")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(_, msg) if msg == "must not be empty"));
    }
}
