use std::sync::Arc;

use chrono::{DateTime, NaiveDateTime};
use polars::{
    df,
    frame::DataFrame,
    prelude::{
        ChunkAgg, DataType, Field, IntoLazy, JoinArgs, JoinCoalesce, JoinType, PlSmallStr,
        Schema, SchemaRef, SortMultipleOptions, TimeUnit, col, lit,
    },
};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

use crate::{
    data::domain::{Network, TamJoinMode},
    error::{LvrLabError, LvrLabResult},
    math::lvr::BPS_SCALE,
    report::{
        daily::{DailyLvr, DailyLvrCol},
        io::{Report, ReportName, ToSchema},
        polars_ext::polars_to_report_error,
        volume::{VolumeBook, VolumeCol},
    },
};

const USD_PER_MILLION: f64 = 1_000_000.0;

// ================================================================================================
// Per-Network TAM Series
// ================================================================================================

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
pub enum TamCol {
    /// Day the addressable market was computed for.
    Date,
    /// Addressable market on that day, in USD.
    TamUsd,
}

impl From<TamCol> for PlSmallStr {
    fn from(value: TamCol) -> Self {
        value.as_str().into()
    }
}

impl TamCol {
    pub fn name(&self) -> PlSmallStr {
        (*self).into()
    }

    pub fn as_str(&self) -> &'static str {
        self.into()
    }
}

/// Daily total addressable market of one network.
///
/// TAM on a day is the network's average LVR applied to the traded volume:
/// `avg_lvr_bps * volume_usd / 10_000`. The series only carries days where
/// both sides are known, unless the outer join mode keeps the unmatched
/// days around with a null TAM.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TamSeries {
    pub df: DataFrame,
}

impl Default for TamSeries {
    fn default() -> Self {
        let df = DataFrame::empty_with_schema(&TamSeries::to_schema());
        Self { df }
    }
}

impl ReportName for TamSeries {
    fn base_name(&self) -> String {
        "tam_series".to_string()
    }
}

impl Report for TamSeries {
    fn as_df(&self) -> &DataFrame {
        &self.df
    }

    fn as_df_mut(&mut self) -> &mut DataFrame {
        &mut self.df
    }
}

impl ToSchema for TamSeries {
    fn to_schema() -> SchemaRef {
        let fields: Vec<Field> = TamCol::iter()
            .map(|col| {
                let dtype = match col {
                    TamCol::Date => DataType::Datetime(TimeUnit::Microseconds, None),
                    TamCol::TamUsd => DataType::Float64,
                };
                Field::new(col.into(), dtype)
            })
            .collect();

        Arc::new(Schema::from_iter(fields))
    }
}

impl TamSeries {
    /// Joins a daily LVR series with a volume book into a TAM series.
    ///
    /// Dates match on exact equality. With [`TamJoinMode::Inner`] a day
    /// missing from either side is dropped; with [`TamJoinMode::Outer`]
    /// it is kept and its TAM is null.
    pub fn new(
        daily: &DailyLvr,
        volume: &VolumeBook,
        mode: TamJoinMode,
    ) -> LvrLabResult<Self> {
        let join_args = match mode {
            TamJoinMode::Inner => JoinArgs {
                how: JoinType::Inner,
                ..Default::default()
            },
            TamJoinMode::Outer => JoinArgs {
                how: JoinType::Full,
                // Keep one date column instead of date + date_right.
                coalesce: JoinCoalesce::CoalesceColumns,
                ..Default::default()
            },
        };

        let df = daily
            .as_df()
            .clone()
            .lazy()
            .join(
                volume.as_df().clone().lazy(),
                [col(DailyLvrCol::Date)],
                [col(VolumeCol::Day)],
                join_args,
            )
            .select([
                col(DailyLvrCol::Date),
                (col(DailyLvrCol::AvgLvrBps) * col(VolumeCol::VolumeUsd) / lit(BPS_SCALE))
                    .alias(TamCol::TamUsd),
            ])
            .sort([TamCol::Date.as_str()], SortMultipleOptions::default())
            .collect()
            .map_err(convert_err)?;

        Ok(Self { df })
    }

    /// Mean TAM over the days of the series, in USD.
    ///
    /// Null TAM days (outer-mode orphans) are skipped. Returns `None` for
    /// an empty or all-null series.
    pub fn average_daily_tam_usd(&self) -> Option<f64> {
        self.df.column(TamCol::TamUsd.as_str()).ok()?.f64().ok()?.mean()
    }

    /// First and last day of the series, or `None` when it is empty.
    pub fn date_range(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        let dates = self
            .df
            .column(TamCol::Date.as_str())
            .ok()?
            .datetime()
            .ok()?;

        let first = dates.physical().min()?;
        let last = dates.physical().max()?;

        Some((
            DateTime::from_timestamp_micros(first)?.naive_utc(),
            DateTime::from_timestamp_micros(last)?.naive_utc(),
        ))
    }
}

// ================================================================================================
// Cross-Network Summary
// ================================================================================================

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
pub enum TamSummaryCol {
    /// Network the row summarizes.
    Network,
    /// Mean daily TAM of the network, in USD. Null when the network's TAM
    /// series came up empty.
    AvgDailyTamUsd,
    /// The same mean scaled to millions of USD, for reporting.
    AvgDailyTamMusd,
}

impl From<TamSummaryCol> for PlSmallStr {
    fn from(value: TamSummaryCol) -> Self {
        value.as_str().into()
    }
}

impl TamSummaryCol {
    pub fn name(&self) -> PlSmallStr {
        (*self).into()
    }

    pub fn as_str(&self) -> &'static str {
        self.into()
    }
}

/// Average daily TAM per network, one row per analyzed network.
///
/// The combined figure across networks is deliberately not a row of the
/// table; it is exposed through [`TamSummary::combined_avg_daily_tam_usd`]
/// so the per-network export stays clean.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TamSummary {
    pub df: DataFrame,
}

impl Default for TamSummary {
    fn default() -> Self {
        let df = DataFrame::empty_with_schema(&TamSummary::to_schema());
        Self { df }
    }
}

impl ReportName for TamSummary {
    fn base_name(&self) -> String {
        "avg_daily_tam_by_network".to_string()
    }
}

impl Report for TamSummary {
    fn as_df(&self) -> &DataFrame {
        &self.df
    }

    fn as_df_mut(&mut self) -> &mut DataFrame {
        &mut self.df
    }
}

impl ToSchema for TamSummary {
    fn to_schema() -> SchemaRef {
        let fields: Vec<Field> = TamSummaryCol::iter()
            .map(|col| {
                let dtype = match col {
                    TamSummaryCol::Network => DataType::String,
                    TamSummaryCol::AvgDailyTamUsd | TamSummaryCol::AvgDailyTamMusd => {
                        DataType::Float64
                    }
                };
                Field::new(col.into(), dtype)
            })
            .collect();

        Arc::new(Schema::from_iter(fields))
    }
}

impl TamSummary {
    /// Collapses per-network TAM series into the summary table.
    ///
    /// Row order follows the input order. A network whose series is empty
    /// keeps its row with null averages rather than disappearing.
    pub fn new(per_network: &[(Network, TamSeries)]) -> LvrLabResult<Self> {
        let mut network_col = Vec::with_capacity(per_network.len());
        let mut avg_usd_col: Vec<Option<f64>> = Vec::with_capacity(per_network.len());
        let mut avg_musd_col: Vec<Option<f64>> = Vec::with_capacity(per_network.len());

        for (network, series) in per_network {
            let avg = series.average_daily_tam_usd();
            network_col.push(network.to_string());
            avg_usd_col.push(avg);
            avg_musd_col.push(avg.map(|v| v / USD_PER_MILLION));
        }

        let df = df![
            TamSummaryCol::Network.as_str() => network_col,
            TamSummaryCol::AvgDailyTamUsd.as_str() => avg_usd_col,
            TamSummaryCol::AvgDailyTamMusd.as_str() => avg_musd_col,
        ]
        .map_err(convert_err)?;

        Ok(Self { df })
    }

    /// Sum of the per-network average daily TAMs, in USD.
    ///
    /// Networks with a null average contribute nothing.
    pub fn combined_avg_daily_tam_usd(&self) -> LvrLabResult<f64> {
        let sum = self
            .df
            .column(TamSummaryCol::AvgDailyTamUsd.as_str())
            .and_then(|c| c.f64())
            .map_err(convert_err)?
            .sum()
            .unwrap_or(0.0);

        Ok(sum)
    }
}

fn convert_err(e: polars::error::PolarsError) -> LvrLabError {
    polars_to_report_error("TAM", e)
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveTime};

    use super::*;

    // ========================================================================
    // Helpers: Build Series Inputs In Memory
    // ========================================================================

    fn micros(date: &str) -> i64 {
        NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .unwrap()
            .and_time(NaiveTime::MIN)
            .and_utc()
            .timestamp_micros()
    }

    fn daily(rows: &[(&str, f64)]) -> DailyLvr {
        let dates: Vec<i64> = rows.iter().map(|(d, _)| micros(d)).collect();
        let lvr: Vec<f64> = rows.iter().map(|(_, l)| *l).collect();

        let df = df![
            DailyLvrCol::Date.as_str() => dates,
            DailyLvrCol::AvgLvrBps.as_str() => lvr,
        ]
        .unwrap()
        .lazy()
        .with_column(
            col(DailyLvrCol::Date.as_str())
                .cast(DataType::Datetime(TimeUnit::Microseconds, None)),
        )
        .collect()
        .unwrap();

        DailyLvr { df }
    }

    fn volume(rows: &[(&str, f64)]) -> VolumeBook {
        let days: Vec<i64> = rows.iter().map(|(d, _)| micros(d)).collect();
        let usd: Vec<f64> = rows.iter().map(|(_, v)| *v).collect();

        let df = df![
            VolumeCol::Day.as_str() => days,
            VolumeCol::VolumeUsd.as_str() => usd,
        ]
        .unwrap()
        .lazy()
        .with_column(
            col(VolumeCol::Day.as_str())
                .cast(DataType::Datetime(TimeUnit::Microseconds, None)),
        )
        .collect()
        .unwrap();

        VolumeBook::new(df).unwrap()
    }

    fn tam_values(series: &TamSeries) -> Vec<Option<f64>> {
        series
            .as_df()
            .column(TamCol::TamUsd.as_str())
            .unwrap()
            .f64()
            .unwrap()
            .into_iter()
            .collect()
    }

    // ========================================================================
    // Test: TAM Arithmetic
    // ========================================================================

    #[test]
    fn test_tam_scales_volume_by_basis_points() {
        // 10 bps of a $1M day is $1,000.
        let series = TamSeries::new(
            &daily(&[("2024-01-01", 10.0)]),
            &volume(&[("2024-01-01", 1_000_000.0)]),
            TamJoinMode::Inner,
        )
        .expect("Conversion failed");

        assert_eq!(tam_values(&series), vec![Some(1_000.0)]);
        assert_eq!(series.average_daily_tam_usd(), Some(1_000.0));
    }

    // ========================================================================
    // Test: Join Modes
    // ========================================================================

    #[test]
    fn test_inner_join_drops_unmatched_days() {
        let series = TamSeries::new(
            &daily(&[("2024-01-01", 10.0), ("2024-01-02", 10.0)]),
            &volume(&[("2024-01-02", 1_000_000.0), ("2024-01-03", 1_000_000.0)]),
            TamJoinMode::Inner,
        )
        .expect("Conversion failed");

        assert_eq!(series.as_df().height(), 1);
        assert_eq!(tam_values(&series), vec![Some(1_000.0)]);
    }

    #[test]
    fn test_outer_join_keeps_unmatched_days_as_null() {
        let series = TamSeries::new(
            &daily(&[("2024-01-01", 10.0), ("2024-01-02", 10.0)]),
            &volume(&[("2024-01-02", 1_000_000.0), ("2024-01-03", 1_000_000.0)]),
            TamJoinMode::Outer,
        )
        .expect("Conversion failed");

        assert_eq!(series.as_df().height(), 3);
        assert_eq!(
            tam_values(&series),
            vec![None, Some(1_000.0), None],
            "orphan days must survive with a null TAM"
        );

        // The average skips the nulls instead of zeroing them.
        assert_eq!(series.average_daily_tam_usd(), Some(1_000.0));
    }

    #[test]
    fn test_empty_overlap_yields_no_average() {
        let series = TamSeries::new(
            &daily(&[("2024-01-01", 10.0)]),
            &volume(&[("2024-01-02", 1_000_000.0)]),
            TamJoinMode::Inner,
        )
        .expect("Conversion failed");

        assert_eq!(series.as_df().height(), 0);
        assert_eq!(series.average_daily_tam_usd(), None);
        assert_eq!(series.date_range(), None);
    }

    #[test]
    fn test_date_range_spans_first_to_last_day() {
        let series = TamSeries::new(
            &daily(&[("2024-01-05", 10.0), ("2024-01-01", 10.0)]),
            &volume(&[("2024-01-01", 1.0), ("2024-01-05", 1.0)]),
            TamJoinMode::Inner,
        )
        .expect("Conversion failed");

        let (first, last) = series.date_range().expect("range must exist");
        assert_eq!(first.date().to_string(), "2024-01-01");
        assert_eq!(last.date().to_string(), "2024-01-05");
    }

    // ========================================================================
    // Test: Summary
    // ========================================================================

    #[test]
    fn test_summary_sums_network_averages() {
        let optimism = TamSeries::new(
            &daily(&[("2024-01-01", 10.0)]),
            &volume(&[("2024-01-01", 1_000_000.0)]),
            TamJoinMode::Inner,
        )
        .unwrap();
        let base = TamSeries::new(
            &daily(&[("2024-01-01", 5.0)]),
            &volume(&[("2024-01-01", 1_000_000.0)]),
            TamJoinMode::Inner,
        )
        .unwrap();

        let summary = TamSummary::new(&[
            (Network::Optimism, optimism),
            (Network::Base, base),
        ])
        .expect("Conversion failed");

        assert_eq!(summary.as_df().height(), 2);
        assert_eq!(summary.combined_avg_daily_tam_usd().unwrap(), 1_500.0);

        let musd: Vec<Option<f64>> = summary
            .as_df()
            .column(TamSummaryCol::AvgDailyTamMusd.as_str())
            .unwrap()
            .f64()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(musd, vec![Some(0.001), Some(0.0005)]);
    }

    #[test]
    fn test_summary_keeps_empty_networks_with_null_average() {
        let empty = TamSeries::default();

        let summary =
            TamSummary::new(&[(Network::Arbitrum, empty)]).expect("Conversion failed");

        assert_eq!(summary.as_df().height(), 1);
        let avg = summary
            .as_df()
            .column(TamSummaryCol::AvgDailyTamUsd.as_str())
            .unwrap()
            .f64()
            .unwrap()
            .get(0);
        assert_eq!(avg, None);
        assert_eq!(summary.combined_avg_daily_tam_usd().unwrap(), 0.0);
    }
}
