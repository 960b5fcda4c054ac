use polars::prelude::{DataType, Expr, PlSmallStr, lit};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoStaticStr};

/// Calendar buckets used to group per-range LVR observations.
///
/// Each variant maps the ledger's timestamp column onto a grouping key:
/// truncation for the rolling periods (week, month) and calendar positions
/// for the profile reports (weekday, week of month).
#[derive(
    Copy,
    Clone,
    Debug,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumIter,
    EnumString,
    AsRefStr,
    IntoStaticStr,
)]
#[strum(serialize_all = "snake_case")]
pub enum PeriodCol {
    Week,
    Month,
    Weekday,
    WeekOfMonth,
}

impl PeriodCol {
    pub fn as_str(&self) -> &'static str {
        self.into()
    }

    pub fn name(&self) -> PlSmallStr {
        PlSmallStr::from_static(self.as_str())
    }

    /// Derives the grouping key from a `Datetime` column.
    ///
    /// Weekday numbering follows ISO (Monday = 1, Sunday = 7). Week of month
    /// is the one-based seven-day slice of the month the timestamp falls in,
    /// so days 1-7 map to 1, days 8-14 to 2, and day 31 to 5.
    pub fn as_expr(&self, date: Expr) -> Expr {
        let key = match self {
            PeriodCol::Week => date.dt().truncate(lit("1w")),
            PeriodCol::Month => date.dt().truncate(lit("1mo")),
            PeriodCol::Weekday => date.dt().weekday().cast(DataType::Int32),
            PeriodCol::WeekOfMonth => {
                (date.dt().day().cast(DataType::Int32) - lit(1)).floor_div(lit(7)) + lit(1)
            }
        };
        key.alias(self.name())
    }
}

impl From<PeriodCol> for PlSmallStr {
    fn from(value: PeriodCol) -> Self {
        value.name()
    }
}
