use super::records::{VAULT_FIELDS, decode_vault_position, record_id};
use super::subgraph::{GraphQlClient, block_clause};
use super::{Listing, PAGE_SIZE, SkippedRecord, VaultPosition, VaultSource};
use crate::error::SourceError;
use async_trait::async_trait;
use tracing::debug;

const ENTITY: &str = "vaultPositions";

/// Vault source reading pre-valued `vaultPositions` from a subgraph.
#[derive(Debug, Clone)]
pub struct SubgraphVaultSource {
    client: GraphQlClient,
}

impl SubgraphVaultSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: GraphQlClient::new(url),
        }
    }
}

pub(crate) fn vault_query(block: u64, skip: usize) -> String {
    let block = block_clause(block)
        .map(|clause| format!("{clause}, "))
        .unwrap_or_default();
    format!(
        "{{ {ENTITY}({block}orderBy: id, orderDirection: asc, first: {PAGE_SIZE}, skip: {skip}) {{ {VAULT_FIELDS} }} }}"
    )
}

#[async_trait]
impl VaultSource for SubgraphVaultSource {
    async fn fetch_vault_positions(
        &self,
        block: u64,
    ) -> Result<Listing<VaultPosition>, SourceError> {
        let mut listing = Listing::default();
        let mut skip = 0;
        loop {
            let page = self
                .client
                .query_list(&vault_query(block, skip), ENTITY)
                .await?;
            let page_len = page.len();
            debug!(block, skip, records = page_len, "Fetched vault page");

            for value in page {
                let id = record_id(&value);
                match decode_vault_position(value) {
                    Ok(position) => listing.records.push(position),
                    Err(error) => {
                        debug!(block, position_id = %id, error = %error, "Undecodable vault record");
                        listing.skipped.push(SkippedRecord { id, error });
                    }
                }
            }

            if page_len < PAGE_SIZE {
                break;
            }
            skip += PAGE_SIZE;
        }
        Ok(listing)
    }
}
