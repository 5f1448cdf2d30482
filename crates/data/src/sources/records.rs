//! Subgraph wire records and their conversion into domain entities.

use crate::error::SourceError;
use crate::sources::VaultPosition;
use lp_tvl_domain::entities::{PoolSnapshot, Position, PositionId, Token};
use lp_tvl_domain::enums::PositionKind;
use primitive_types::U256;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::str::FromStr;

/// Fields requested for every position record.
pub(crate) const POSITION_FIELDS: &str = "id liquidity owner lower upper \
pool { poolPrice tickAtPrice id \
token0 { id decimals usdPrice name symbol } \
token1 { id decimals usdPrice name symbol } }";

/// Fields requested for every vault record.
pub(crate) const VAULT_FIELDS: &str = "id user vault position lpValue lpValueUsd";

/// A numeric field that the indexer may encode as a JSON string or number.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub(crate) enum NumberText {
    Text(String),
    Number(serde_json::Number),
}

impl NumberText {
    fn text(&self) -> String {
        match self {
            Self::Text(s) => s.trim().to_string(),
            Self::Number(n) => n.to_string(),
        }
    }

    fn parse<T: FromStr>(&self, field: &str) -> Result<T, SourceError> {
        let text = self.text();
        text.parse()
            .map_err(|_| SourceError::Decode(format!("{field}: invalid value '{text}'")))
    }

    fn to_u256(&self, field: &str) -> Result<U256, SourceError> {
        let text = self.text();
        U256::from_dec_str(&text)
            .map_err(|_| SourceError::Decode(format!("{field}: invalid value '{text}'")))
    }

    fn to_decimal(&self, field: &str) -> Result<Decimal, SourceError> {
        let text = self.text();
        Decimal::from_str(&text)
            .or_else(|_| Decimal::from_scientific(&text))
            .map_err(|_| SourceError::Decode(format!("{field}: invalid value '{text}'")))
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TokenRecord {
    pub id: String,
    #[serde(default)]
    pub decimals: Option<NumberText>,
    #[serde(default)]
    pub usd_price: Option<NumberText>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub symbol: Option<String>,
}

impl TokenRecord {
    fn into_token(self) -> Result<Token, SourceError> {
        let decimals = self
            .decimals
            .as_ref()
            .map(|d| d.parse::<u8>("decimals"))
            .transpose()?;
        let derived_usd = self
            .usd_price
            .as_ref()
            .map(|p| p.to_decimal("usdPrice"))
            .transpose()?;
        Ok(Token {
            address: self.id,
            symbol: self.symbol.unwrap_or_default(),
            name: self.name.unwrap_or_default(),
            decimals,
            derived_usd,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PoolRecord {
    pub id: String,
    pub pool_price: NumberText,
    pub tick_at_price: NumberText,
    pub token0: TokenRecord,
    pub token1: TokenRecord,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct PositionRecord {
    pub id: String,
    pub liquidity: NumberText,
    #[serde(default)]
    pub owner: Option<String>,
    pub lower: NumberText,
    pub upper: NumberText,
    pub pool: PoolRecord,
}

impl PositionRecord {
    /// Converts into a [`Position`]; a record without `owner` is rejected.
    pub(crate) fn into_position(self, kind: PositionKind) -> Result<Position, SourceError> {
        let owner = self
            .owner
            .filter(|o| !o.is_empty())
            .ok_or_else(|| SourceError::Decode("missing owner".to_string()))?;
        let pool = PoolSnapshot::new(
            self.pool.id,
            self.pool.pool_price.to_u256("poolPrice")?,
            self.pool.tick_at_price.parse("tickAtPrice")?,
        );
        Ok(Position {
            id: PositionId::new(self.id),
            owner,
            liquidity: self.liquidity.parse("liquidity")?,
            tick_lower: self.lower.parse("lower")?,
            tick_upper: self.upper.parse("upper")?,
            pool,
            token0: self.pool.token0.into_token()?,
            token1: self.pool.token1.into_token()?,
            kind,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct VaultRecord {
    pub user: String,
    pub vault: String,
    pub position: NumberText,
    pub lp_value: NumberText,
    pub lp_value_usd: NumberText,
}

impl VaultRecord {
    pub(crate) fn into_vault_position(self) -> Result<VaultPosition, SourceError> {
        Ok(VaultPosition {
            lp_value: self.lp_value.to_decimal("lpValue")?,
            lp_value_usd: self.lp_value_usd.to_decimal("lpValueUsd")?,
            position: self.position.text(),
            user: self.user,
            vault: self.vault,
        })
    }
}

/// Placeholder id for records without a usable `id`.
pub(crate) const UNKNOWN_ID: &str = "<unknown>";

/// Reads a record's `id` without decoding the rest of it.
pub(crate) fn record_id(value: &serde_json::Value) -> String {
    match value.get("id") {
        Some(serde_json::Value::String(id)) if !id.is_empty() => id.clone(),
        Some(serde_json::Value::Number(id)) => id.to_string(),
        _ => UNKNOWN_ID.to_string(),
    }
}

/// Prefixes a decode failure with the record it came from.
fn with_record(entity: &str, id: &str, err: SourceError) -> SourceError {
    match err {
        SourceError::Decode(detail) => SourceError::Decode(format!("{entity} {id}: {detail}")),
        other => other,
    }
}

/// Decodes one JSON record into a position.
///
/// Errors name the record id, e.g. `position 17: missing owner`.
pub(crate) fn decode_position(
    value: serde_json::Value,
    kind: PositionKind,
) -> Result<Position, SourceError> {
    let id = record_id(&value);
    serde_json::from_value::<PositionRecord>(value)
        .map_err(|e| SourceError::Decode(e.to_string()))
        .and_then(|record| record.into_position(kind))
        .map_err(|e| with_record("position", &id, e))
}

pub(crate) fn decode_vault_position(value: serde_json::Value) -> Result<VaultPosition, SourceError> {
    let id = record_id(&value);
    serde_json::from_value::<VaultRecord>(value)
        .map_err(|e| SourceError::Decode(e.to_string()))
        .and_then(VaultRecord::into_vault_position)
        .map_err(|e| with_record("vault position", &id, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn record() -> serde_json::Value {
        json!({
            "id": "17",
            "liquidity": "1000000",
            "owner": "0xAbC",
            "lower": "-200",
            "upper": 200,
            "pool": {
                "poolPrice": "79228162514264337593543950336",
                "tickAtPrice": 0,
                "id": "0xpool",
                "token0": {"id": "0xt0", "decimals": "18", "usdPrice": "2.5", "name": "Wrapped Ether", "symbol": "WETH"},
                "token1": {"id": "0xt1", "decimals": 6, "usdPrice": 1, "name": "USD Coin", "symbol": "USDC"}
            }
        })
    }

    #[test]
    fn test_decode_accepts_strings_and_numbers() {
        let position = decode_position(record(), PositionKind::Limit).unwrap();
        assert_eq!(position.id.as_str(), "17");
        assert_eq!(position.owner, "0xAbC");
        assert_eq!(position.liquidity, 1_000_000);
        assert_eq!((position.tick_lower, position.tick_upper), (-200, 200));
        assert_eq!(position.pool.sqrt_price_x96, U256::one() << 96);
        assert_eq!(position.pool.tick, 0);
        assert_eq!(position.token0.decimals, Some(18));
        assert_eq!(position.token0.derived_usd, Some(dec!(2.5)));
        assert_eq!(position.token1.decimals, Some(6));
        assert_eq!(position.token1.derived_usd, Some(dec!(1)));
        assert_eq!(position.kind, PositionKind::Limit);
    }

    #[test]
    fn test_missing_owner_is_a_decode_error() {
        let mut value = record();
        value.as_object_mut().unwrap().remove("owner");
        let err = decode_position(value, PositionKind::Range).unwrap_err();
        assert_eq!(err, SourceError::Decode("position 17: missing owner".to_string()));
    }

    #[test]
    fn test_missing_token_metadata_is_kept_as_none() {
        let mut value = record();
        value["pool"]["token1"]["usdPrice"] = serde_json::Value::Null;
        value["pool"]["token1"]
            .as_object_mut()
            .unwrap()
            .remove("decimals");
        let position = decode_position(value, PositionKind::Range).unwrap();
        assert_eq!(position.token1.decimals, None);
        assert_eq!(position.token1.derived_usd, None);
    }

    #[test]
    fn test_bad_number_is_rejected() {
        let mut value = record();
        value["liquidity"] = json!("-5");
        assert_eq!(
            decode_position(value, PositionKind::Range).unwrap_err(),
            SourceError::Decode("position 17: liquidity: invalid value '-5'".to_string())
        );
    }

    #[test]
    fn test_liquidity_above_u128_names_the_position() {
        let mut value = record();
        value["liquidity"] = json!("340282366920938463463374607431768211456");
        let err = decode_position(value, PositionKind::Range).unwrap_err();
        assert!(matches!(&err, SourceError::Decode(msg) if msg.starts_with("position 17: liquidity:")));
    }

    #[test]
    fn test_record_id() {
        assert_eq!(record_id(&record()), "17");
        assert_eq!(record_id(&json!({"id": 42})), "42");
        assert_eq!(record_id(&json!({"liquidity": "1"})), UNKNOWN_ID);

        let err = decode_position(json!({"id": "5"}), PositionKind::Range).unwrap_err();
        assert!(matches!(&err, SourceError::Decode(msg) if msg.starts_with("position 5: missing field")));
    }

    #[test]
    fn test_decode_vault_record() {
        let value = json!({
            "id": "1",
            "user": "0xuser",
            "vault": "0xvault",
            "position": 3,
            "lpValue": "12.5",
            "lpValueUsd": 40.25
        });
        let vault = decode_vault_position(value).unwrap();
        assert_eq!(vault.position, "3");
        assert_eq!(vault.lp_value, dec!(12.5));
        assert_eq!(vault.lp_value_usd, dec!(40.25));
    }
}
