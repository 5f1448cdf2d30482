//! GraphQL subgraph position source.

use super::records::{POSITION_FIELDS, decode_position, record_id};
use super::{Listing, PAGE_SIZE, PositionQuery, PositionSource, SkippedRecord};
use crate::error::SourceError;
use async_trait::async_trait;
use lp_tvl_domain::entities::Position;
use lp_tvl_domain::enums::{AmmType, PositionKind};
use reqwest::Client;
use serde_json::{Value, json};
use tracing::{debug, warn};

/// Minimal GraphQL-over-HTTP client for subgraph endpoints.
#[derive(Debug, Clone)]
pub struct GraphQlClient {
    client: Client,
    url: String,
}

impl GraphQlClient {
    /// Creates a client for the given endpoint.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            url: url.into(),
        }
    }

    /// Posts `query` and returns `data.<entity>`.
    ///
    /// The returned value may be `null` when the endpoint reports no such
    /// record; a missing `data` object or field is an error.
    pub async fn query_entity(&self, query: &str, entity: &str) -> Result<Value, SourceError> {
        let response = self
            .client
            .post(&self.url)
            .json(&json!({ "query": query }))
            .send()
            .await
            .map_err(|e| SourceError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(SourceError::Http {
                status: status.as_u16(),
                message,
            });
        }

        let body = response
            .json::<Value>()
            .await
            .map_err(|e| SourceError::Transport(e.to_string()))?;
        extract_entity(body, entity)
    }

    /// Like [`query_entity`](Self::query_entity) but requires a list.
    pub async fn query_list(&self, query: &str, entity: &str) -> Result<Vec<Value>, SourceError> {
        match self.query_entity(query, entity).await? {
            Value::Array(items) => Ok(items),
            other => Err(SourceError::MalformedPayload {
                entity: entity.to_string(),
                detail: format!("expected a list, got {other}"),
            }),
        }
    }
}

/// Pulls `data.<entity>` out of a GraphQL response body.
pub(crate) fn extract_entity(mut body: Value, entity: &str) -> Result<Value, SourceError> {
    let found = body
        .get_mut("data")
        .and_then(Value::as_object_mut)
        .and_then(|data| data.remove(entity));

    found.ok_or_else(|| SourceError::MalformedPayload {
        entity: entity.to_string(),
        detail: graphql_errors(&body),
    })
}

fn graphql_errors(body: &Value) -> String {
    let messages: Vec<&str> = body
        .get("errors")
        .and_then(Value::as_array)
        .map(|errors| {
            errors
                .iter()
                .filter_map(|e| e.get("message").and_then(Value::as_str))
                .collect()
        })
        .unwrap_or_default();
    if messages.is_empty() {
        "no data in response".to_string()
    } else {
        messages.join("; ")
    }
}

/// Quotes `value` as a GraphQL string literal.
pub(crate) fn string_literal(value: &str) -> String {
    Value::String(value.to_string()).to_string()
}

pub(crate) fn block_clause(block: u64) -> Option<String> {
    (block != 0).then(|| format!("block: {{number: {block}}}"))
}

/// Builds one page of a `rangePositions` / `limitPositions` listing.
pub(crate) fn list_query(entity: &str, query: &PositionQuery, skip: usize) -> String {
    let mut filters = Vec::new();
    if let Some(owner) = &query.owner {
        filters.push(format!("owner: {}", string_literal(&owner.to_lowercase())));
    }
    if let Some(pool_id) = &query.pool_id {
        filters.push(format!("pool_: {{id: {}}}", string_literal(&pool_id.to_lowercase())));
    }

    let mut args = Vec::new();
    if !filters.is_empty() {
        args.push(format!("where: {{{}}}", filters.join(", ")));
    }
    args.extend(block_clause(query.block));
    args.push("orderBy: createdAtTimestamp".to_string());
    args.push("orderDirection: asc".to_string());
    args.push(format!("first: {PAGE_SIZE}"));
    args.push(format!("skip: {skip}"));

    format!("{{ {entity}({}) {{ {POSITION_FIELDS} }} }}", args.join(", "))
}

/// Builds the single-position lookup.
pub(crate) fn lookup_query(block: u64, position_id: &str) -> String {
    let mut args = vec![format!("id: {}", string_literal(position_id))];
    args.extend(block_clause(block));
    format!("{{ rangePosition({}) {{ {POSITION_FIELDS} }} }}", args.join(", "))
}

/// Position source backed by a range/limit position subgraph.
#[derive(Debug, Clone)]
pub struct SubgraphPositionSource {
    client: GraphQlClient,
    amm: AmmType,
}

impl SubgraphPositionSource {
    pub fn new(url: impl Into<String>, amm: AmmType) -> Self {
        Self {
            client: GraphQlClient::new(url),
            amm,
        }
    }

    /// Pages through `entity` until a short page.
    ///
    /// Records that fail to decode are returned in [`Listing::skipped`]. With
    /// `optional`, an endpoint whose first page lacks `entity` yields an empty
    /// listing.
    async fn fetch_all(
        &self,
        entity: &str,
        kind: PositionKind,
        query: &PositionQuery,
        optional: bool,
    ) -> Result<Listing<Position>, SourceError> {
        let mut listing = Listing::default();
        let mut skip = 0;
        loop {
            let page = match self
                .client
                .query_list(&list_query(entity, query, skip), entity)
                .await
            {
                Ok(page) => page,
                Err(SourceError::MalformedPayload { detail, .. }) if optional && skip == 0 => {
                    warn!(entity, block = query.block, detail = %detail, "Entity not available, treating as empty");
                    return Ok(listing);
                }
                Err(e) => return Err(e),
            };
            let page_len = page.len();
            debug!(entity, block = query.block, skip, records = page_len, "Fetched page");

            for value in page {
                let id = record_id(&value);
                match decode_position(value, kind) {
                    Ok(position) => listing.records.push(position),
                    Err(error) => {
                        debug!(entity, block = query.block, position_id = %id, error = %error, "Undecodable record");
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

#[async_trait]
impl PositionSource for SubgraphPositionSource {
    async fn fetch_range_positions(
        &self,
        query: &PositionQuery,
    ) -> Result<Listing<Position>, SourceError> {
        self.fetch_all("rangePositions", PositionKind::Range, query, false)
            .await
    }

    /// Empty for AMMs without limit orders. A subgraph that does not expose
    /// `limitPositions` is logged and treated as having none.
    async fn fetch_limit_positions(
        &self,
        query: &PositionQuery,
    ) -> Result<Listing<Position>, SourceError> {
        if !self.amm.has_limit_positions() {
            return Ok(Listing::default());
        }
        self.fetch_all("limitPositions", PositionKind::Limit, query, true)
            .await
    }

    async fn fetch_position(
        &self,
        block: u64,
        position_id: &str,
    ) -> Result<Option<Position>, SourceError> {
        let value = self
            .client
            .query_entity(&lookup_query(block, position_id), "rangePosition")
            .await?;
        if value.is_null() {
            return Ok(None);
        }
        decode_position(value, PositionKind::Range).map(Some)
    }
}
