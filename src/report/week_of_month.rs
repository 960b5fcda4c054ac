use std::sync::Arc;

use polars::{
    frame::DataFrame,
    prelude::{
        DataType, Field, IntoLazy, PlSmallStr, Schema, SchemaRef, SortMultipleOptions, col,
    },
};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

use crate::{
    error::{LvrLabError, LvrLabResult},
    report::{
        io::{Report, ReportName, ToSchema},
        ledger::{LedgerCol, RangeLedger},
        periods::PeriodCol,
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
pub enum WeekOfMonthCol {
    /// One-based seven-day slice of the month, 1 through 5.
    WeekOfMonth,
    /// Mean LVR over every observation in that slice, in basis points.
    AvgLvrBps,
}

impl From<WeekOfMonthCol> for PlSmallStr {
    fn from(value: WeekOfMonthCol) -> Self {
        value.as_str().into()
    }
}

impl WeekOfMonthCol {
    pub fn name(&self) -> PlSmallStr {
        (*self).into()
    }

    pub fn as_str(&self) -> &'static str {
        self.into()
    }
}

/// Average LVR by position of the week within the month.
///
/// Days 1-7 fall in week 1, days 8-14 in week 2, and so on; day 29 onward
/// lands in week 5. Unlike the weekday profile only observed slices get a
/// row, listed in ascending order.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WeekOfMonthProfile {
    pub df: DataFrame,
}

impl Default for WeekOfMonthProfile {
    fn default() -> Self {
        let df = DataFrame::empty_with_schema(&WeekOfMonthProfile::to_schema());
        Self { df }
    }
}

impl ReportName for WeekOfMonthProfile {
    fn base_name(&self) -> String {
        "week_of_month_profile".to_string()
    }
}

impl Report for WeekOfMonthProfile {
    fn as_df(&self) -> &DataFrame {
        &self.df
    }

    fn as_df_mut(&mut self) -> &mut DataFrame {
        &mut self.df
    }
}

impl ToSchema for WeekOfMonthProfile {
    fn to_schema() -> SchemaRef {
        let fields: Vec<Field> = WeekOfMonthCol::iter()
            .map(|col| {
                let dtype = match col {
                    WeekOfMonthCol::WeekOfMonth => DataType::Int32,
                    WeekOfMonthCol::AvgLvrBps => DataType::Float64,
                };
                Field::new(col.into(), dtype)
            })
            .collect();

        Arc::new(Schema::from_iter(fields))
    }
}

impl TryFrom<&RangeLedger> for WeekOfMonthProfile {
    type Error = LvrLabError;

    fn try_from(ledger: &RangeLedger) -> LvrLabResult<Self> {
        if ledger.as_df().is_empty() {
            return Ok(WeekOfMonthProfile::default());
        }

        let df = ledger
            .as_df()
            .clone()
            .lazy()
            .group_by([PeriodCol::WeekOfMonth.as_expr(col(LedgerCol::Date))])
            .agg([col(LedgerCol::LvrBps)
                .mean()
                .alias(WeekOfMonthCol::AvgLvrBps)])
            .sort(
                [PeriodCol::WeekOfMonth.as_str()],
                SortMultipleOptions::default(),
            )
            .collect()
            .map_err(convert_err)?;

        Ok(Self { df })
    }
}

fn convert_err(e: polars::error::PolarsError) -> LvrLabError {
    polars_to_report_error("week-of-month profile", e)
}
