//! Epoch records as served by the subgraph

use super::amount::TokenAmount;
use serde::{Deserialize, Deserializer};

/// One accounting period over a range of block heights
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Epoch {
    pub id: String,
    #[serde(deserialize_with = "block_number")]
    pub start_block: u64,
    #[serde(deserialize_with = "block_number")]
    pub end_block: u64,
    pub signalled_tokens: TokenAmount,
    pub stake_deposited: TokenAmount,
    pub total_query_fees: TokenAmount,
    pub taxed_query_fees: TokenAmount,
    pub query_fees_collected: TokenAmount,
    pub curator_query_fees: TokenAmount,
    pub query_fee_rebates: TokenAmount,
    pub total_rewards: TokenAmount,
    pub total_indexer_rewards: TokenAmount,
    pub total_delegator_rewards: TokenAmount,
}

impl Epoch {
    /// All amount fields paired with a display label, in schema order
    pub fn amounts(&self) -> [(&'static str, &TokenAmount); 10] {
        [
            ("Signalled Tokens", &self.signalled_tokens),
            ("Stake Deposited", &self.stake_deposited),
            ("Total Query Fees", &self.total_query_fees),
            ("Taxed Query Fees", &self.taxed_query_fees),
            ("Query Fees Collected", &self.query_fees_collected),
            ("Curator Query Fees", &self.curator_query_fees),
            ("Query Fee Rebates", &self.query_fee_rebates),
            ("Total Rewards", &self.total_rewards),
            ("Total Indexer Rewards", &self.total_indexer_rewards),
            ("Total Delegator Rewards", &self.total_delegator_rewards),
        ]
    }

    /// Table cells: block bounds followed by the five displayed amounts in whole tokens
    pub fn table_cells(&self) -> Vec<String> {
        vec![
            self.start_block.to_string(),
            self.end_block.to_string(),
            self.stake_deposited.whole_tokens(),
            self.total_query_fees.whole_tokens(),
            self.total_rewards.whole_tokens(),
            self.total_indexer_rewards.whole_tokens(),
            self.total_delegator_rewards.whole_tokens(),
        ]
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawBlock {
    Number(u64),
    Text(String),
}

/// Block heights arrive as JSON numbers (`Int`) or strings (`BigInt`)
fn block_number<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    match RawBlock::deserialize(deserializer)? {
        RawBlock::Number(n) => Ok(n),
        RawBlock::Text(text) => text
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("invalid block number {:?}", text))),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use serde_json::{json, Value};

    /// JSON for an epoch whose amounts are all `tokens` whole tokens
    pub(crate) fn epoch_json(id: &str, start_block: u64, tokens: u64) -> Value {
        let raw = format!("{}000000000000000000", tokens);
        json!({
            "id": id,
            "startBlock": start_block,
            "endBlock": start_block + 6646,
            "signalledTokens": raw,
            "stakeDeposited": raw,
            "totalQueryFees": raw,
            "taxedQueryFees": raw,
            "queryFeesCollected": raw,
            "curatorQueryFees": raw,
            "queryFeeRebates": raw,
            "totalRewards": raw,
            "totalIndexerRewards": raw,
            "totalDelegatorRewards": raw,
        })
    }

    #[test]
    fn test_deserialize_epoch() {
        let epoch: Epoch = serde_json::from_value(epoch_json("42", 11446768, 7)).unwrap();
        assert_eq!(epoch.id, "42");
        assert_eq!(epoch.start_block, 11446768);
        assert_eq!(epoch.end_block, 11446768 + 6646);
        assert_eq!(epoch.total_rewards.whole_tokens(), "7");
    }

    #[test]
    fn test_block_number_accepts_string() {
        let mut value = epoch_json("1", 0, 0);
        value["startBlock"] = json!("12345");
        let epoch: Epoch = serde_json::from_value(value).unwrap();
        assert_eq!(epoch.start_block, 12345);
    }

    #[test]
    fn test_invalid_amount_fails_decode() {
        let mut value = epoch_json("1", 0, 0);
        value["totalRewards"] = json!("1.5e18");
        assert!(serde_json::from_value::<Epoch>(value).is_err());
    }

    #[test]
    fn test_table_cells_floor_amounts() {
        let mut value = epoch_json("1", 100, 0);
        value["stakeDeposited"] = json!("1500000000000000000");
        let epoch: Epoch = serde_json::from_value(value).unwrap();
        let cells = epoch.table_cells();
        assert_eq!(cells.len(), 7);
        assert_eq!(cells[0], "100");
        assert_eq!(cells[2], "1");
    }
}
