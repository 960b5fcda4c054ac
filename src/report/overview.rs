use std::sync::Arc;

use polars::{
    df,
    frame::DataFrame,
    prelude::{DataType, Field, IntoLazy, LazyFrame, PlSmallStr, Schema, SchemaRef, col},
};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

use crate::{
    error::{DataError, LvrLabError, LvrLabResult},
    report::{
        io::{Report, ReportName, ToSchema},
        ledger::{LedgerCol, RangeLedger},
        periods::PeriodCol,
        polars_ext::polars_to_report_error,
    },
};

/// Columns of the one-row LVR overview.
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
pub enum OverviewCol {
    /// Mean LVR over every range observation, in basis points.
    DailyLvrBps,
    /// Mean of the per-week mean LVRs, in basis points.
    WeeklyLvrBps,
    /// Mean of the per-month mean LVRs, in basis points.
    MonthlyLvrBps,
}

impl From<OverviewCol> for PlSmallStr {
    fn from(value: OverviewCol) -> Self {
        value.as_str().into()
    }
}

impl OverviewCol {
    pub fn name(&self) -> PlSmallStr {
        (*self).into()
    }

    pub fn as_str(&self) -> &'static str {
        self.into()
    }
}

/// Overall average LVR of a network at daily, weekly and monthly horizons.
///
/// The daily figure pools every observation. The weekly and monthly figures
/// average within each calendar period first and then across periods, so a
/// short period counts as much as a busy one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LvrOverview {
    pub df: DataFrame,
}

impl Default for LvrOverview {
    fn default() -> Self {
        let df = DataFrame::empty_with_schema(&LvrOverview::to_schema());
        Self { df }
    }
}

impl ReportName for LvrOverview {
    fn base_name(&self) -> String {
        "lvr_overview".to_string()
    }
}

impl Report for LvrOverview {
    fn as_df(&self) -> &DataFrame {
        &self.df
    }

    fn as_df_mut(&mut self) -> &mut DataFrame {
        &mut self.df
    }
}

impl ToSchema for LvrOverview {
    fn to_schema() -> SchemaRef {
        let fields: Vec<Field> = OverviewCol::iter()
            .map(|col| Field::new(col.into(), DataType::Float64))
            .collect();

        Arc::new(Schema::from_iter(fields))
    }
}

impl LvrOverview {
    pub fn daily_lvr_bps(&self) -> LvrLabResult<f64> {
        self.scalar(OverviewCol::DailyLvrBps)
    }

    pub fn weekly_lvr_bps(&self) -> LvrLabResult<f64> {
        self.scalar(OverviewCol::WeeklyLvrBps)
    }

    pub fn monthly_lvr_bps(&self) -> LvrLabResult<f64> {
        self.scalar(OverviewCol::MonthlyLvrBps)
    }

    fn scalar(&self, col: OverviewCol) -> LvrLabResult<f64> {
        self.df
            .column(col.as_str())
            .and_then(|c| c.f64())
            .map_err(convert_err)?
            .get(0)
            .ok_or_else(|| {
                DataError::DataFrame(format!("Overview has no value for '{col}'")).into()
            })
    }
}

impl TryFrom<&RangeLedger> for LvrOverview {
    type Error = LvrLabError;

    fn try_from(ledger: &RangeLedger) -> LvrLabResult<Self> {
        if ledger.as_df().is_empty() {
            return Ok(LvrOverview::default());
        }

        let lf = ledger.as_df().clone().lazy();

        let daily = scalar_mean(lf.clone().select([col(LedgerCol::LvrBps.as_str()).mean()]))?;
        let weekly = scalar_mean(period_mean_lf(lf.clone(), PeriodCol::Week))?;
        let monthly = scalar_mean(period_mean_lf(lf, PeriodCol::Month))?;

        let df = df![
            OverviewCol::DailyLvrBps.as_str() => [daily],
            OverviewCol::WeeklyLvrBps.as_str() => [weekly],
            OverviewCol::MonthlyLvrBps.as_str() => [monthly],
        ]
        .map_err(convert_err)?;

        Ok(Self { df })
    }
}

/// Collapses the ledger to per-period means, then to their overall mean.
fn period_mean_lf(lf: LazyFrame, period: PeriodCol) -> LazyFrame {
    lf.group_by_stable([period.as_expr(col(LedgerCol::Date.as_str()))])
        .agg([col(LedgerCol::LvrBps.as_str()).mean()])
        .select([col(LedgerCol::LvrBps.as_str()).mean()])
}

fn scalar_mean(lf: LazyFrame) -> LvrLabResult<f64> {
    lf.collect()
        .map_err(convert_err)?
        .column(LedgerCol::LvrBps.as_str())
        .and_then(|c| c.f64())
        .map_err(convert_err)?
        .get(0)
        .ok_or_else(|| DataError::DataFrame("Overview mean produced no value".to_string()).into())
}

fn convert_err(e: polars::error::PolarsError) -> LvrLabError {
    polars_to_report_error("LVR overview", e)
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveTime};
    use polars::prelude::TimeUnit;

    use crate::data::config::AnalysisConfig;

    use super::*;

    // ========================================================================
    // Helper: Build Ledger In Memory
    // ========================================================================

    fn micros(date: &str) -> i64 {
        NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .unwrap()
            .and_time(NaiveTime::MIN)
            .and_utc()
            .timestamp_micros()
    }

    fn test_ledger(dates: &[&str], lvr: &[f64]) -> RangeLedger {
        let stamps: Vec<i64> = dates.iter().map(|d| micros(d)).collect();
        let n = dates.len();

        let df = df![
            LedgerCol::Date.as_str() => stamps,
            LedgerCol::PoolName.as_str() => vec!["wsteth-eth"; n],
            LedgerCol::MinEp.as_str() => vec![99.0; n],
            LedgerCol::MaxEp.as_str() => vec![101.0; n],
            LedgerCol::LvrBps.as_str() => lvr.to_vec(),
        ]
        .unwrap()
        .lazy()
        .with_column(
            col(LedgerCol::Date.as_str())
                .cast(DataType::Datetime(TimeUnit::Microseconds, None)),
        )
        .collect()
        .unwrap();

        RangeLedger::new(df, AnalysisConfig::default()).unwrap()
    }

    // ========================================================================
    // Test: Aggregation Semantics
    // ========================================================================

    #[test]
    fn test_weekly_mean_weights_periods_equally() {
        // Week of 2024-01-01 has three observations at 2 bps, the week of
        // 2024-01-08 a single one at 6 bps. Pooling gives 3 bps, averaging
        // the week means gives 4 bps. Both weeks sit in the same month, so
        // the monthly figure pools back to 3 bps.
        let ledger = test_ledger(
            &["2024-01-01", "2024-01-02", "2024-01-03", "2024-01-08"],
            &[2.0, 2.0, 2.0, 6.0],
        );

        let overview = LvrOverview::try_from(&ledger).expect("Conversion failed");

        assert!((overview.daily_lvr_bps().unwrap() - 3.0).abs() < 1e-12);
        assert!((overview.weekly_lvr_bps().unwrap() - 4.0).abs() < 1e-12);
        assert!((overview.monthly_lvr_bps().unwrap() - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_single_observation_collapses_to_one_value() {
        let ledger = test_ledger(&["2024-03-15"], &[1.5]);

        let overview = LvrOverview::try_from(&ledger).expect("Conversion failed");

        assert_eq!(overview.daily_lvr_bps().unwrap(), 1.5);
        assert_eq!(overview.weekly_lvr_bps().unwrap(), 1.5);
        assert_eq!(overview.monthly_lvr_bps().unwrap(), 1.5);
    }

    // ========================================================================
    // Test: Shape
    // ========================================================================

    #[test]
    fn test_overview_is_one_row_with_all_columns() {
        let ledger = test_ledger(&["2024-01-01", "2024-01-02"], &[1.0, 2.0]);

        let overview = LvrOverview::try_from(&ledger).expect("Conversion failed");
        let df = overview.as_df();

        assert_eq!(df.height(), 1);
        for col in OverviewCol::iter() {
            assert!(
                df.column(col.as_str()).is_ok(),
                "Missing expected column: {}",
                col
            );
        }
    }

    #[test]
    fn test_empty_ledger_yields_empty_overview() {
        let ledger = RangeLedger::default();

        let overview = LvrOverview::try_from(&ledger).expect("Conversion failed");

        assert_eq!(overview.as_df().height(), 0);
    }
}
