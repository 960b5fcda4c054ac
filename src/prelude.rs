// 1. Traits
pub use crate::report::io::{
    AsFormattedLazyFrame, Report, ReportName, ToCsv, ToJson, ToSchema,
};

// 2. The Core Pipeline Types
pub use crate::pipeline::{AnalysisPipeline, NetworkRun, PipelineRun};

// 3. Domain Types
pub use crate::data::domain::{Network, TamJoinMode, Weekday};

// 4. Configurations
pub use crate::data::config::{AnalysisConfig, DatasetConfig};

// 5. Errors
pub use crate::error::{ConfigError, DataError, IoError, LvrLabError, LvrLabResult};

// 6. Report Tables
pub use crate::report::daily::{DailyLvr, DailyLvrCol};
pub use crate::report::leaderboard::{PoolLeaderboard, PoolLeaderboardCol};
pub use crate::report::ledger::{LedgerCol, RangeLedger};
pub use crate::report::overview::{LvrOverview, OverviewCol};
pub use crate::report::tam::{TamCol, TamSeries, TamSummary, TamSummaryCol};
pub use crate::report::volume::{VolumeBook, VolumeCol};
pub use crate::report::week_of_month::{WeekOfMonthCol, WeekOfMonthProfile};
pub use crate::report::weekday::{WeekdayCol, WeekdayProfile};
