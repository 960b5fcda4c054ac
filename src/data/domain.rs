use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString, IntoStaticStr};

/// Networks with a maintained dataset pair (price ranges + daily volume).
///
/// The lowercase serialized form doubles as the dataset file stem:
/// `Network::Arbitrum` reads `arbitrum.csv` and `arbitrum_volume.csv`.
/// Iteration order is the fixed processing order of the pipeline.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Network {
    Arbitrum,
    Base,
    Mainnet,
    Optimism,
}

impl Network {
    pub fn as_str(&self) -> &'static str {
        self.into()
    }
}

/// Days of the week.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    PartialOrd,
    Ord,
)]
#[strum(serialize_all = "snake_case")]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    /// ISO weekday number: `1` for Monday through `7` for Sunday.
    ///
    /// Matches the numbering polars uses for `dt().weekday()`.
    pub fn number_from_monday(&self) -> u32 {
        chrono::Weekday::from(*self).number_from_monday()
    }
}

impl From<chrono::Weekday> for Weekday {
    fn from(weekday: chrono::Weekday) -> Self {
        match weekday {
            chrono::Weekday::Mon => Weekday::Monday,
            chrono::Weekday::Tue => Weekday::Tuesday,
            chrono::Weekday::Wed => Weekday::Wednesday,
            chrono::Weekday::Thu => Weekday::Thursday,
            chrono::Weekday::Fri => Weekday::Friday,
            chrono::Weekday::Sat => Weekday::Saturday,
            chrono::Weekday::Sun => Weekday::Sunday,
        }
    }
}

impl From<Weekday> for chrono::Weekday {
    fn from(weekday: Weekday) -> Self {
        match weekday {
            Weekday::Monday => chrono::Weekday::Mon,
            Weekday::Tuesday => chrono::Weekday::Tue,
            Weekday::Wednesday => chrono::Weekday::Wed,
            Weekday::Thursday => chrono::Weekday::Thu,
            Weekday::Friday => chrono::Weekday::Fri,
            Weekday::Saturday => chrono::Weekday::Sat,
            Weekday::Sunday => chrono::Weekday::Sun,
        }
    }
}

/// How the TAM join treats dates present in only one of the two inputs.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumString,
)]
#[strum(serialize_all = "snake_case")]
pub enum TamJoinMode {
    /// **Default.** Drop dates that appear in only one source.
    ///
    /// A date carried by the LVR series but absent from the volume series
    /// (or vice versa) contributes nothing to the TAM series.
    #[default]
    Inner,

    /// Keep unmatched dates with a null TAM.
    ///
    /// Useful for auditing which dates the inner join silently discards.
    Outer,
}

impl TamJoinMode {
    pub fn is_inner(&self) -> bool {
        matches!(self, Self::Inner)
    }

    pub fn is_outer(&self) -> bool {
        matches!(self, Self::Outer)
    }
}
