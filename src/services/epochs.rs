//! Epoch queries: documents, variables and response decoding

use crate::model::{Epoch, SortDirection, SortField, TableState, PAGE_SIZE};
use crate::services::graphql::{GraphQLRequest, QueryError};
use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Upper bound on ids fetched to count matching epochs
pub const COUNT_CAP: u32 = 1000;

pub const EPOCHS_QUERY: &str = r#"query GetEpochs(
  $first: Int
  $skip: Int
  $orderBy: Epoch_orderBy
  $orderDirection: OrderDirection
  $where: Epoch_filter
) {
  epoches(
    first: $first
    skip: $skip
    orderBy: $orderBy
    orderDirection: $orderDirection
    where: $where
  ) {
    id
    startBlock
    endBlock
    signalledTokens
    stakeDeposited
    totalQueryFees
    taxedQueryFees
    queryFeesCollected
    curatorQueryFees
    queryFeeRebates
    totalRewards
    totalIndexerRewards
    totalDelegatorRewards
  }
}"#;

pub const EPOCH_COUNT_QUERY: &str = r#"query GetTotalEpoches($first: Int, $where: Epoch_filter) {
  epoches(first: $first, where: $where) {
    id
  }
}"#;

// ═══════════════════════════════════════════════════════════════════════════════
// Variables
// ═══════════════════════════════════════════════════════════════════════════════

/// `Epoch_filter`; an absent block filter leaves the key out entirely
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EpochFilter {
    #[serde(rename = "startBlock", skip_serializing_if = "Option::is_none")]
    pub start_block: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EpochListVariables {
    pub first: u32,
    pub skip: u32,
    pub order_by: SortField,
    pub order_direction: SortDirection,
    #[serde(rename = "where")]
    pub filter: EpochFilter,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EpochCountVariables {
    pub first: u32,
    #[serde(rename = "where")]
    pub filter: EpochFilter,
}

fn filter(state: &TableState) -> EpochFilter {
    EpochFilter {
        start_block: state.start_block_filter(),
    }
}

pub fn list_variables(state: &TableState) -> EpochListVariables {
    let sort = state.sort();
    EpochListVariables {
        first: PAGE_SIZE,
        skip: state.skip(),
        order_by: sort.field,
        order_direction: sort.direction,
        filter: filter(state),
    }
}

/// Independent of page and sort, so paging reuses the cached count
pub fn count_variables(state: &TableState) -> EpochCountVariables {
    EpochCountVariables {
        first: COUNT_CAP,
        filter: filter(state),
    }
}

pub fn list_request(state: &TableState) -> Result<GraphQLRequest, QueryError> {
    GraphQLRequest::new(EPOCHS_QUERY, &list_variables(state))
}

pub fn count_request(state: &TableState) -> Result<GraphQLRequest, QueryError> {
    GraphQLRequest::new(EPOCH_COUNT_QUERY, &count_variables(state))
}

// ═══════════════════════════════════════════════════════════════════════════════
// Responses
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Deserialize)]
struct EpochsData {
    epoches: Vec<Epoch>,
}

/// Only the length matters
#[derive(Debug, Deserialize)]
struct EpochIdData {
    epoches: Vec<IgnoredAny>,
}

/// Number of epochs matching the current filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EpochCount {
    pub count: usize,
    /// The cap was reached; more epochs may match
    pub capped: bool,
}

pub fn decode_epochs(data: &Value) -> Result<Vec<Epoch>, QueryError> {
    EpochsData::deserialize(data)
        .map(|d| d.epoches)
        .map_err(|e| QueryError::Decode(e.to_string()))
}

pub fn decode_count(data: &Value) -> Result<EpochCount, QueryError> {
    let ids = EpochIdData::deserialize(data).map_err(|e| QueryError::Decode(e.to_string()))?;
    let count = ids.epoches.len();
    Ok(EpochCount {
        count,
        capped: count >= COUNT_CAP as usize,
    })
}
