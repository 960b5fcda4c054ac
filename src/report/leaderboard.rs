use std::sync::Arc;

use polars::{
    frame::DataFrame,
    prelude::{
        DataType, Field, IdxSize, IntoLazy, PlSmallStr, Schema, SchemaRef, SortMultipleOptions,
        TimeUnit, col,
    },
};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

use crate::{
    error::{LvrLabError, LvrLabResult},
    report::{
        io::{Report, ReportName, ToSchema},
        ledger::{LedgerCol, RangeLedger},
        polars_ext::polars_to_report_error,
    },
};

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    EnumString,
    Display,
    PartialOrd,
    Ord,
    EnumIter,
    IntoStaticStr,
)]
#[strum(serialize_all = "snake_case")]
pub enum PoolLeaderboardCol {
    /// Identifier of the pool.
    PoolName,
    /// Time between the pool's first and last observation.
    ActiveDuration,
    /// Mean LVR over the pool's observations, in basis points.
    AvgLvrBps,
}

impl From<PoolLeaderboardCol> for PlSmallStr {
    fn from(value: PoolLeaderboardCol) -> Self {
        value.as_str().into()
    }
}

impl PoolLeaderboardCol {
    pub fn name(&self) -> PlSmallStr {
        (*self).into()
    }

    pub fn as_str(&self) -> &'static str {
        self.into()
    }
}

/// Average LVR of the longest-active pools on a network.
///
/// Membership and ordering are decided by different keys: the pools are
/// *selected* by how long they have been active (first to last observation)
/// and then *listed* by average LVR, highest first. A young pool with a
/// spectacular LVR does not make the table.
///
/// # Example Table
///
/// | pool_name  | active_duration | avg_lvr_bps |
/// |------------|-----------------|-------------|
/// | usdc-eth   | 182days         | 4.21        |
/// | wsteth-eth | 179days         | 0.88        |
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PoolLeaderboard {
    pub df: DataFrame,
}

impl Default for PoolLeaderboard {
    fn default() -> Self {
        let df = DataFrame::empty_with_schema(&PoolLeaderboard::to_schema());
        Self { df }
    }
}

impl ReportName for PoolLeaderboard {
    fn base_name(&self) -> String {
        "pool_leaderboard".to_string()
    }
}

impl Report for PoolLeaderboard {
    fn as_df(&self) -> &DataFrame {
        &self.df
    }

    fn as_df_mut(&mut self) -> &mut DataFrame {
        &mut self.df
    }
}

impl ToSchema for PoolLeaderboard {
    fn to_schema() -> SchemaRef {
        let fields: Vec<Field> = PoolLeaderboardCol::iter()
            .map(|col| {
                let dtype = match col {
                    PoolLeaderboardCol::PoolName => DataType::String,
                    PoolLeaderboardCol::ActiveDuration => {
                        DataType::Duration(TimeUnit::Microseconds)
                    }
                    PoolLeaderboardCol::AvgLvrBps => DataType::Float64,
                };
                Field::new(col.into(), dtype)
            })
            .collect();

        Arc::new(Schema::from_iter(fields))
    }
}

impl TryFrom<&RangeLedger> for PoolLeaderboard {
    type Error = LvrLabError;

    fn try_from(ledger: &RangeLedger) -> LvrLabResult<Self> {
        if ledger.as_df().is_empty() {
            return Ok(PoolLeaderboard::default());
        }

        let top_pool_count = ledger.analysis_config().top_pool_count() as IdxSize;

        // Selection and presentation use different sort keys. Ties on
        // duration keep first-appearance order, hence the stable grouping
        // and maintain_order on both sorts.
        let df = ledger
            .as_df()
            .clone()
            .lazy()
            .group_by_stable([col(LedgerCol::PoolName)])
            .agg([
                (col(LedgerCol::Date).max() - col(LedgerCol::Date).min())
                    .alias(PoolLeaderboardCol::ActiveDuration),
                col(LedgerCol::LvrBps)
                    .mean()
                    .alias(PoolLeaderboardCol::AvgLvrBps),
            ])
            .sort(
                [PoolLeaderboardCol::ActiveDuration.as_str()],
                SortMultipleOptions::default()
                    .with_order_descending(true)
                    .with_maintain_order(true),
            )
            .limit(top_pool_count)
            .sort(
                [PoolLeaderboardCol::AvgLvrBps.as_str()],
                SortMultipleOptions::default()
                    .with_order_descending(true)
                    .with_maintain_order(true),
            )
            .select([
                col(PoolLeaderboardCol::PoolName),
                col(PoolLeaderboardCol::ActiveDuration),
                col(PoolLeaderboardCol::AvgLvrBps),
            ])
            .collect()
            .map_err(convert_err)?;

        Ok(Self { df })
    }
}

fn convert_err(e: polars::error::PolarsError) -> LvrLabError {
    polars_to_report_error("pool leaderboard", e)
}
