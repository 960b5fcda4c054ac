use std::sync::Arc;

use polars::{
    df,
    frame::DataFrame,
    prelude::{
        DataType, Field, IntoLazy, JoinArgs, JoinType, PlSmallStr, Schema, SchemaRef,
        SortMultipleOptions, col,
    },
};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

use crate::{
    data::domain::Weekday,
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
pub enum WeekdayCol {
    /// Weekday label, `monday` through `sunday`.
    Weekday,
    /// Mean LVR over every observation on that weekday, in basis points.
    /// Null when the ledger has no observation on the weekday.
    AvgLvrBps,
}

impl From<WeekdayCol> for PlSmallStr {
    fn from(value: WeekdayCol) -> Self {
        value.as_str().into()
    }
}

impl WeekdayCol {
    pub fn name(&self) -> PlSmallStr {
        (*self).into()
    }

    pub fn as_str(&self) -> &'static str {
        self.into()
    }
}

/// Average LVR by day of week.
///
/// Always seven rows, Monday through Sunday, whether or not every weekday
/// was observed. Unobserved weekdays keep a null average instead of being
/// dropped, so consumers can rely on the row positions.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WeekdayProfile {
    pub df: DataFrame,
}

impl Default for WeekdayProfile {
    fn default() -> Self {
        let df = DataFrame::empty_with_schema(&WeekdayProfile::to_schema());
        Self { df }
    }
}

impl ReportName for WeekdayProfile {
    fn base_name(&self) -> String {
        "weekday_profile".to_string()
    }
}

impl Report for WeekdayProfile {
    fn as_df(&self) -> &DataFrame {
        &self.df
    }

    fn as_df_mut(&mut self) -> &mut DataFrame {
        &mut self.df
    }
}

impl ToSchema for WeekdayProfile {
    fn to_schema() -> SchemaRef {
        let fields: Vec<Field> = WeekdayCol::iter()
            .map(|col| {
                let dtype = match col {
                    WeekdayCol::Weekday => DataType::String,
                    WeekdayCol::AvgLvrBps => DataType::Float64,
                };
                Field::new(col.into(), dtype)
            })
            .collect();

        Arc::new(Schema::from_iter(fields))
    }
}

impl TryFrom<&RangeLedger> for WeekdayProfile {
    type Error = LvrLabError;

    fn try_from(ledger: &RangeLedger) -> LvrLabResult<Self> {
        if ledger.as_df().is_empty() {
            return Ok(WeekdayProfile::default());
        }

        // Template-only column holding the display label for each key.
        let label_key = "weekday_label";

        let observed = ledger
            .as_df()
            .clone()
            .lazy()
            .group_by([PeriodCol::Weekday.as_expr(col(LedgerCol::Date))])
            .agg([col(LedgerCol::LvrBps).mean().alias(WeekdayCol::AvgLvrBps)]);

        let numbers: Vec<i32> = Weekday::iter()
            .map(|d| d.number_from_monday() as i32)
            .collect();
        let labels: Vec<String> = Weekday::iter().map(|d| d.to_string()).collect();
        let template = df![
            PeriodCol::Weekday.as_str() => numbers,
            label_key => labels,
        ]
        .map_err(convert_err)?;

        let df = template
            .lazy()
            .join(
                observed,
                [col(PeriodCol::Weekday.as_str())],
                [col(PeriodCol::Weekday.as_str())],
                JoinArgs {
                    how: JoinType::Left,
                    ..Default::default()
                },
            )
            .sort(
                [PeriodCol::Weekday.as_str()],
                SortMultipleOptions::default(),
            )
            .select([
                col(label_key).alias(WeekdayCol::Weekday),
                col(WeekdayCol::AvgLvrBps),
            ])
            .collect()
            .map_err(convert_err)?;

        Ok(Self { df })
    }
}

fn convert_err(e: polars::error::PolarsError) -> LvrLabError {
    polars_to_report_error("weekday profile", e)
}
