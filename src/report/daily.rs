use std::sync::Arc;

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
pub enum DailyLvrCol {
    /// Observation timestamp the mean was taken over.
    Date,
    /// Mean LVR across the pools observed at that timestamp, in basis points.
    AvgLvrBps,
}

impl From<DailyLvrCol> for PlSmallStr {
    fn from(value: DailyLvrCol) -> Self {
        value.as_str().into()
    }
}

impl DailyLvrCol {
    pub fn name(&self) -> PlSmallStr {
        (*self).into()
    }

    pub fn as_str(&self) -> &'static str {
        self.into()
    }
}

/// Network-wide average LVR per observation date, in chronological order.
///
/// This is the series the TAM join runs on: one row per distinct ledger
/// timestamp, averaging over every pool observed on it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DailyLvr {
    pub df: DataFrame,
}

impl Default for DailyLvr {
    fn default() -> Self {
        let df = DataFrame::empty_with_schema(&DailyLvr::to_schema());
        Self { df }
    }
}

impl ReportName for DailyLvr {
    fn base_name(&self) -> String {
        "daily_lvr".to_string()
    }
}

impl Report for DailyLvr {
    fn as_df(&self) -> &DataFrame {
        &self.df
    }

    fn as_df_mut(&mut self) -> &mut DataFrame {
        &mut self.df
    }
}

impl ToSchema for DailyLvr {
    fn to_schema() -> SchemaRef {
        let fields: Vec<Field> = DailyLvrCol::iter()
            .map(|col| {
                let dtype = match col {
                    DailyLvrCol::Date => DataType::Datetime(TimeUnit::Microseconds, None),
                    DailyLvrCol::AvgLvrBps => DataType::Float64,
                };
                Field::new(col.into(), dtype)
            })
            .collect();

        Arc::new(Schema::from_iter(fields))
    }
}

impl TryFrom<&RangeLedger> for DailyLvr {
    type Error = LvrLabError;

    fn try_from(ledger: &RangeLedger) -> LvrLabResult<Self> {
        if ledger.as_df().is_empty() {
            return Ok(DailyLvr::default());
        }

        let df = ledger
            .as_df()
            .clone()
            .lazy()
            .group_by_stable([col(LedgerCol::Date)])
            .agg([col(LedgerCol::LvrBps)
                .mean()
                .alias(DailyLvrCol::AvgLvrBps)])
            .sort(
                [DailyLvrCol::Date.as_str()],
                SortMultipleOptions::default(),
            )
            .collect()
            .map_err(convert_err)?;

        Ok(Self { df })
    }
}

fn convert_err(e: polars::error::PolarsError) -> LvrLabError {
    polars_to_report_error("daily LVR", e)
}
