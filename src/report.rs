pub mod daily;
pub mod io;
pub mod leaderboard;
pub mod ledger;
pub mod overview;
pub mod periods;
pub mod polars_ext;
pub mod tam;
pub mod volume;
pub mod week_of_month;
pub mod weekday;
