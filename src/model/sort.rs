//! Sort order of the epoch table

use serde::Serialize;

/// Sortable epoch attributes, one per table column
///
/// Serializes to the subgraph's `Epoch_orderBy` enum value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum SortField {
    #[default]
    #[serde(rename = "startBlock")]
    StartBlock,
    #[serde(rename = "endBlock")]
    EndBlock,
    #[serde(rename = "stakeDeposited")]
    StakeDeposited,
    #[serde(rename = "totalQueryFees")]
    TotalQueryFees,
    #[serde(rename = "totalRewards")]
    TotalRewards,
    #[serde(rename = "totalIndexerRewards")]
    TotalIndexerRewards,
    #[serde(rename = "totalDelegatorRewards")]
    TotalDelegatorRewards,
}

impl SortField {
    /// Columns in display order
    pub fn all() -> [SortField; 7] {
        [
            SortField::StartBlock,
            SortField::EndBlock,
            SortField::StakeDeposited,
            SortField::TotalQueryFees,
            SortField::TotalRewards,
            SortField::TotalIndexerRewards,
            SortField::TotalDelegatorRewards,
        ]
    }

    /// Column header label
    pub fn label(&self) -> &'static str {
        match self {
            SortField::StartBlock => "Start Block",
            SortField::EndBlock => "End Block",
            SortField::StakeDeposited => "Stake Deposited",
            SortField::TotalQueryFees => "Total Query Fees",
            SortField::TotalRewards => "Total Rewards",
            SortField::TotalIndexerRewards => "Total Indexer Rewards",
            SortField::TotalDelegatorRewards => "Total Delegator Rewards",
        }
    }

    /// Field for the 1-based column shortcut key
    pub fn from_shortcut(key: char) -> Option<SortField> {
        let index = key.to_digit(10)? as usize;
        index
            .checked_sub(1)
            .and_then(|i| SortField::all().get(i).copied())
    }

    /// The column to the right, wrapping around
    pub fn next(&self) -> SortField {
        let all = SortField::all();
        let index = all.iter().position(|f| f == self).unwrap_or(0);
        all[(index + 1) % all.len()]
    }
}

/// Sort direction, serialized as the subgraph's `OrderDirection`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum SortDirection {
    #[default]
    #[serde(rename = "asc")]
    Ascending,
    #[serde(rename = "desc")]
    Descending,
}

impl SortDirection {
    pub fn toggled(&self) -> SortDirection {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    pub fn arrow(&self) -> &'static str {
        match self {
            SortDirection::Ascending => "▲",
            SortDirection::Descending => "▼",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SortDirection::Ascending => "ascending",
            SortDirection::Descending => "descending",
        }
    }
}

/// Active sort column and direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Sort {
    pub field: SortField,
    pub direction: SortDirection,
}

impl Sort {
    /// Activate a column header: the active column flips direction,
    /// any other column becomes active in ascending order.
    pub fn activate(&mut self, field: SortField) {
        if self.field == field {
            self.direction = self.direction.toggled();
        } else {
            self.field = field;
            self.direction = SortDirection::Ascending;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_sort_is_start_block_ascending() {
        let sort = Sort::default();
        assert_eq!(sort.field, SortField::StartBlock);
        assert_eq!(sort.direction, SortDirection::Ascending);
    }

    #[test]
    fn test_activate_same_field_toggles_direction() {
        let mut sort = Sort::default();
        sort.activate(SortField::StartBlock);
        assert_eq!(sort.direction, SortDirection::Descending);
        sort.activate(SortField::StartBlock);
        assert_eq!(sort.direction, SortDirection::Ascending);
    }

    #[test]
    fn test_activate_other_field_resets_to_ascending() {
        let mut sort = Sort {
            field: SortField::StartBlock,
            direction: SortDirection::Descending,
        };
        sort.activate(SortField::EndBlock);
        assert_eq!(sort.field, SortField::EndBlock);
        assert_eq!(sort.direction, SortDirection::Ascending);
    }

    #[test]
    fn test_serializes_to_subgraph_enum_values() {
        assert_eq!(
            serde_json::to_value(SortField::TotalIndexerRewards).unwrap(),
            "totalIndexerRewards"
        );
        assert_eq!(serde_json::to_value(SortDirection::Descending).unwrap(), "desc");
    }

    #[test]
    fn test_from_shortcut() {
        assert_eq!(SortField::from_shortcut('1'), Some(SortField::StartBlock));
        assert_eq!(
            SortField::from_shortcut('7'),
            Some(SortField::TotalDelegatorRewards)
        );
        assert_eq!(SortField::from_shortcut('0'), None);
        assert_eq!(SortField::from_shortcut('8'), None);
        assert_eq!(SortField::from_shortcut('x'), None);
    }

    #[test]
    fn test_next_wraps() {
        assert_eq!(SortField::StartBlock.next(), SortField::EndBlock);
        assert_eq!(SortField::TotalDelegatorRewards.next(), SortField::StartBlock);
    }
}
