use std::{path::Path, sync::Arc};

use polars::{
    frame::DataFrame,
    prelude::{
        DataType, Field, IntoLazy, PlSmallStr, Schema, SchemaRef, SortMultipleOptions, TimeUnit,
        col,
    },
};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

use crate::{
    data::config::AnalysisConfig,
    error::{DataError, LvrLabError, LvrLabResult},
    ingest::{self, datetime::normalized_timestamp_expr},
    math::lvr::lvr_bps_expr,
    report::{
        daily::DailyLvr,
        io::{Report, ReportName, ToSchema},
        leaderboard::PoolLeaderboard,
        overview::LvrOverview,
        week_of_month::WeekOfMonthProfile,
        weekday::WeekdayProfile,
    },
};

/// Header names of the raw price-range exports, one file per network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumString, IntoStaticStr)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub(crate) enum RawPriceCol {
    Date,
    MinEp,
    MaxEp,
    PoolName,
}

impl RawPriceCol {
    pub(crate) fn as_str(&self) -> &'static str {
        self.into()
    }
}

/// Columns of the cleaned per-range ledger.
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
pub enum LedgerCol {
    /// Timestamp the liquidity range was observed at. Date-only exports
    /// resolve to midnight.
    Date,
    /// Identifier of the pool the range belongs to (e.g., `wsteth-eth`).
    PoolName,
    /// Lower bound of the effective price range.
    MinEp,
    /// Upper bound of the effective price range.
    MaxEp,
    /// Loss-versus-rebalancing implied by the range, in basis points.
    LvrBps,
}

impl From<LedgerCol> for PlSmallStr {
    fn from(value: LedgerCol) -> Self {
        value.as_str().into()
    }
}

impl LedgerCol {
    pub fn name(&self) -> PlSmallStr {
        (*self).into()
    }

    pub fn as_str(&self) -> &'static str {
        self.into()
    }
}

/// Per-range LVR observations for one network, one row per exported
/// liquidity range.
///
/// The ledger is the table every derived report is computed from. It plays
/// the role a trade journal plays in backtesting: raw observations first,
/// summaries as views on top.
#[derive(Debug, Clone)]
pub struct RangeLedger {
    df: DataFrame,
    analysis_config: AnalysisConfig,
}

impl ReportName for RangeLedger {
    fn base_name(&self) -> String {
        "range_ledger".to_string()
    }
}

impl Report for RangeLedger {
    fn as_df(&self) -> &DataFrame {
        &self.df
    }

    fn as_df_mut(&mut self) -> &mut DataFrame {
        &mut self.df
    }
}

impl RangeLedger {
    pub fn overview(&self) -> LvrLabResult<LvrOverview> {
        self.try_into()
    }

    pub fn pool_leaderboard(&self) -> LvrLabResult<PoolLeaderboard> {
        self.try_into()
    }

    pub fn daily_lvr(&self) -> LvrLabResult<DailyLvr> {
        self.try_into()
    }

    pub fn weekday_profile(&self) -> LvrLabResult<WeekdayProfile> {
        self.try_into()
    }

    pub fn week_of_month_profile(&self) -> LvrLabResult<WeekOfMonthProfile> {
        self.try_into()
    }

    pub fn analysis_config(&self) -> AnalysisConfig {
        self.analysis_config
    }
}

impl RangeLedger {
    /// Wraps an already-cleaned DataFrame into a ledger.
    ///
    /// Validates the frame against the canonical schema and sorts it by
    /// observation timestamp, ascending.
    pub fn new(df: DataFrame, config: AnalysisConfig) -> LvrLabResult<Self> {
        Self::validate_schema(&df)?;

        let sorted_df = df
            .sort([LedgerCol::Date.as_str()], SortMultipleOptions::default())
            .map_err(|e| LvrLabError::Data(DataError::DataFrame(e.to_string())))?;

        Ok(Self {
            df: sorted_df,
            analysis_config: config,
        })
    }

    /// Loads a raw price-range export and cleans it into a ledger.
    ///
    /// # Cleaning
    /// - `DATE` strings are normalized through the datetime fallback chain;
    ///   rows whose date cannot be parsed are dropped (logged at debug).
    /// - `MIN_EP` / `MAX_EP` are parsed strictly: a malformed number in
    ///   either column fails the whole load.
    /// - The LVR column is derived from the cleaned bounds.
    ///
    /// A missing file or a missing required column is an error.
    #[tracing::instrument(skip_all, fields(file = %path.as_ref().display()))]
    pub fn from_csv(path: impl AsRef<Path>, config: AnalysisConfig) -> LvrLabResult<Self> {
        let path = path.as_ref();
        let raw = ingest::scan_raw_csv(path)?;

        let typed = raw
            .select([
                normalized_timestamp_expr(col(RawPriceCol::Date.as_str()))
                    .alias(LedgerCol::Date.name()),
                col(RawPriceCol::PoolName.as_str()).alias(LedgerCol::PoolName.name()),
                col(RawPriceCol::MinEp.as_str())
                    .strict_cast(DataType::Float64)
                    .alias(LedgerCol::MinEp.name()),
                col(RawPriceCol::MaxEp.as_str())
                    .strict_cast(DataType::Float64)
                    .alias(LedgerCol::MaxEp.name()),
            ])
            .collect()
            .map_err(|e| {
                LvrLabError::Data(DataError::DataFrame(format!(
                    "Failed to read price ranges from '{}': {e}",
                    path.display()
                )))
            })?;

        let unparseable = typed
            .column(LedgerCol::Date.as_str())
            .map_err(|e| LvrLabError::Data(DataError::DataFrame(e.to_string())))?
            .null_count();
        if unparseable > 0 {
            tracing::debug!(rows = unparseable, "dropping rows with unparseable dates");
        }

        let df = typed
            .lazy()
            .filter(col(LedgerCol::Date.as_str()).is_not_null())
            .with_column(
                lvr_bps_expr(
                    col(LedgerCol::MinEp.as_str()),
                    col(LedgerCol::MaxEp.as_str()),
                )
                .alias(LedgerCol::LvrBps.name()),
            )
            .collect()
            .map_err(|e| LvrLabError::Data(DataError::DataFrame(e.to_string())))?;

        tracing::info!(rows = df.height(), "Loaded price ranges");

        Self::new(df, config)
    }

    fn validate_schema(df: &DataFrame) -> LvrLabResult<()> {
        let schema = df.schema();
        for (name, expected) in Self::to_schema().iter() {
            match schema.get(name) {
                None => {
                    return Err(DataError::SchemaMismatch(format!(
                        "Ledger is missing column '{name}'"
                    ))
                    .into());
                }
                Some(actual) if actual != expected => {
                    return Err(DataError::SchemaMismatch(format!(
                        "Ledger column '{name}' must be {expected:?}, got {actual:?}"
                    ))
                    .into());
                }
                Some(_) => {}
            }
        }
        Ok(())
    }
}

impl Default for RangeLedger {
    fn default() -> Self {
        let df = DataFrame::empty_with_schema(&Self::to_schema());
        Self {
            df,
            analysis_config: AnalysisConfig::default(),
        }
    }
}

impl ToSchema for RangeLedger {
    fn to_schema() -> SchemaRef {
        let fields: Vec<Field> = LedgerCol::iter()
            .map(|col| {
                let dtype = match col {
                    LedgerCol::Date => DataType::Datetime(TimeUnit::Microseconds, None),
                    LedgerCol::PoolName => DataType::String,
                    LedgerCol::MinEp | LedgerCol::MaxEp | LedgerCol::LvrBps => DataType::Float64,
                };
                Field::new(col.into(), dtype)
            })
            .collect();

        Arc::new(Schema::from_iter(fields))
    }
}
