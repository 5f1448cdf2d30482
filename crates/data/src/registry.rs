//! Dispatch from `(chain, protocol, amm)` to a configured source.

use crate::error::SourceError;
use crate::sources::{PositionSource, VaultSource};
use lp_tvl_domain::enums::{AmmType, Chain, Protocol};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Composite key selecting a position source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceKey {
    pub chain: Chain,
    pub protocol: Protocol,
    pub amm: AmmType,
}

impl SourceKey {
    #[must_use]
    pub fn new(chain: Chain, protocol: Protocol, amm: AmmType) -> Self {
        Self {
            chain,
            protocol,
            amm,
        }
    }
}

impl fmt::Display for SourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.chain, self.protocol, self.amm)
    }
}

/// Table of position and vault sources.
#[derive(Debug, Clone, Default)]
pub struct SourceRegistry {
    positions: HashMap<SourceKey, Arc<dyn PositionSource>>,
    vaults: HashMap<(Chain, Protocol), Arc<dyn VaultSource>>,
}

impl SourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a position source, replacing any previous one for `key`.
    pub fn register_positions(&mut self, key: SourceKey, source: Arc<dyn PositionSource>) {
        self.positions.insert(key, source);
    }

    pub fn register_vaults(
        &mut self,
        chain: Chain,
        protocol: Protocol,
        source: Arc<dyn VaultSource>,
    ) {
        self.vaults.insert((chain, protocol), source);
    }

    /// Looks up the position source for `key`.
    ///
    /// # Errors
    /// [`SourceError::NotConfigured`] when nothing is registered.
    pub fn position_source(&self, key: SourceKey) -> Result<Arc<dyn PositionSource>, SourceError> {
        self.positions
            .get(&key)
            .cloned()
            .ok_or_else(|| SourceError::NotConfigured(key.to_string()))
    }

    pub fn vault_source(
        &self,
        chain: Chain,
        protocol: Protocol,
    ) -> Result<Arc<dyn VaultSource>, SourceError> {
        self.vaults
            .get(&(chain, protocol))
            .cloned()
            .ok_or_else(|| SourceError::NotConfigured(format!("{chain}/{protocol} vaults")))
    }

    /// Registered position keys, in no particular order.
    pub fn position_keys(&self) -> impl Iterator<Item = &SourceKey> {
        self.positions.keys()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::{MockPositionSource, MockVaultSource};

    #[test]
    fn test_lookup_by_composite_key() {
        let key = SourceKey::new(Chain::Mode, Protocol::Poolshark, AmmType::Poolshark);
        let mut registry = SourceRegistry::new();
        registry.register_positions(key, Arc::new(MockPositionSource::new()));

        assert!(registry.position_source(key).is_ok());
        let other = SourceKey::new(Chain::Mode, Protocol::Supswap, AmmType::UniswapV3);
        assert_eq!(
            registry.position_source(other).unwrap_err(),
            SourceError::NotConfigured("mode/supswap/uniswapv3".to_string())
        );
        assert_eq!(registry.position_keys().count(), 1);
    }

    #[test]
    fn test_vault_lookup() {
        let mut registry = SourceRegistry::new();
        registry.register_vaults(Chain::Mode, Protocol::Airpuff, Arc::new(MockVaultSource::new()));
        assert!(registry.vault_source(Chain::Mode, Protocol::Airpuff).is_ok());
        assert!(registry.vault_source(Chain::Linea, Protocol::Airpuff).is_err());
    }
}
