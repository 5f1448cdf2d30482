use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Token descriptor as read alongside a position.
///
/// `decimals` and `derived_usd` are optional because indexers occasionally
/// return incomplete metadata; valuation rejects such tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub address: String,
    pub symbol: String,
    pub name: String,
    pub decimals: Option<u8>,
    /// USD price of one whole token.
    pub derived_usd: Option<Decimal>,
}

impl Token {
    pub fn new(
        address: impl Into<String>,
        symbol: impl Into<String>,
        decimals: u8,
        name: impl Into<String>,
    ) -> Self {
        Self {
            address: address.into(),
            symbol: symbol.into(),
            name: name.into(),
            decimals: Some(decimals),
            derived_usd: None,
        }
    }

    /// Sets the USD price per whole token.
    #[must_use]
    pub fn with_derived_usd(mut self, price: Decimal) -> Self {
        self.derived_usd = Some(price);
        self
    }
}
