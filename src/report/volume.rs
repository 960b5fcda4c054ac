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
    error::{DataError, LvrLabError, LvrLabResult},
    ingest::{self, datetime::normalized_timestamp_expr},
    report::io::{Report, ReportName, ToSchema},
};

/// Header names of the raw daily-volume exports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumString, IntoStaticStr)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub(crate) enum RawVolumeCol {
    Day,
    VolumeUsd,
}

impl RawVolumeCol {
    pub(crate) fn as_str(&self) -> &'static str {
        self.into()
    }
}

/// Columns of the cleaned daily-volume table.
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
pub enum VolumeCol {
    /// Day the volume was traded on.
    Day,
    /// Traded volume across the network's pools, in USD.
    VolumeUsd,
}

impl From<VolumeCol> for PlSmallStr {
    fn from(value: VolumeCol) -> Self {
        value.as_str().into()
    }
}

impl VolumeCol {
    pub fn name(&self) -> PlSmallStr {
        (*self).into()
    }

    pub fn as_str(&self) -> &'static str {
        self.into()
    }
}

/// Daily traded volume for one network, one row per day.
///
/// Upstream exports mark missing days with a literal `"null"` volume; those
/// rows are dropped during loading, so the book only ever holds days with a
/// known volume.
#[derive(Debug, Clone)]
pub struct VolumeBook {
    df: DataFrame,
}

impl ReportName for VolumeBook {
    fn base_name(&self) -> String {
        "volume_book".to_string()
    }
}

impl Report for VolumeBook {
    fn as_df(&self) -> &DataFrame {
        &self.df
    }

    fn as_df_mut(&mut self) -> &mut DataFrame {
        &mut self.df
    }
}

impl VolumeBook {
    /// Wraps an already-cleaned DataFrame into a volume book.
    ///
    /// Validates the frame against the canonical schema and sorts it by
    /// day, ascending.
    pub fn new(df: DataFrame) -> LvrLabResult<Self> {
        Self::validate_schema(&df)?;

        let sorted_df = df
            .sort([VolumeCol::Day.as_str()], SortMultipleOptions::default())
            .map_err(|e| LvrLabError::Data(DataError::DataFrame(e.to_string())))?;

        Ok(Self { df: sorted_df })
    }

    /// Loads a raw daily-volume export and cleans it into a volume book.
    ///
    /// # Cleaning
    /// - `DAY` strings are normalized through the datetime fallback chain.
    /// - `VOLUME_USD` is parsed leniently: literal `"null"` markers and any
    ///   other non-numeric text become nulls.
    /// - Rows missing either value after cleaning are dropped; the counts
    ///   of unparseable days and null volumes are logged at debug.
    ///
    /// A missing file or a missing required column is an error.
    #[tracing::instrument(skip_all, fields(file = %path.as_ref().display()))]
    pub fn from_csv(path: impl AsRef<Path>) -> LvrLabResult<Self> {
        let path = path.as_ref();
        let raw = ingest::scan_raw_csv(path)?;

        let typed = raw
            .select([
                normalized_timestamp_expr(col(RawVolumeCol::Day.as_str()))
                    .alias(VolumeCol::Day.name()),
                col(RawVolumeCol::VolumeUsd.as_str())
                    .cast(DataType::Float64)
                    .alias(VolumeCol::VolumeUsd.name()),
            ])
            .collect()
            .map_err(|e| {
                LvrLabError::Data(DataError::DataFrame(format!(
                    "Failed to read daily volume from '{}': {e}",
                    path.display()
                )))
            })?;

        let unparseable_days = typed
            .column(VolumeCol::Day.as_str())
            .map_err(|e| LvrLabError::Data(DataError::DataFrame(e.to_string())))?
            .null_count();
        let null_volumes = typed
            .column(VolumeCol::VolumeUsd.as_str())
            .map_err(|e| LvrLabError::Data(DataError::DataFrame(e.to_string())))?
            .null_count();
        if unparseable_days > 0 || null_volumes > 0 {
            tracing::debug!(unparseable_days, null_volumes, "dropping incomplete rows");
        }

        let df = typed
            .lazy()
            .filter(
                col(VolumeCol::Day.as_str())
                    .is_not_null()
                    .and(col(VolumeCol::VolumeUsd.as_str()).is_not_null()),
            )
            .collect()
            .map_err(|e| LvrLabError::Data(DataError::DataFrame(e.to_string())))?;

        tracing::info!(rows = df.height(), "Loaded daily volume");

        Self::new(df)
    }

    fn validate_schema(df: &DataFrame) -> LvrLabResult<()> {
        let schema = df.schema();
        for (name, expected) in Self::to_schema().iter() {
            match schema.get(name) {
                None => {
                    return Err(DataError::SchemaMismatch(format!(
                        "Volume book is missing column '{name}'"
                    ))
                    .into());
                }
                Some(actual) if actual != expected => {
                    return Err(DataError::SchemaMismatch(format!(
                        "Volume column '{name}' must be {expected:?}, got {actual:?}"
                    ))
                    .into());
                }
                Some(_) => {}
            }
        }
        Ok(())
    }
}

impl Default for VolumeBook {
    fn default() -> Self {
        let df = DataFrame::empty_with_schema(&Self::to_schema());
        Self { df }
    }
}

impl ToSchema for VolumeBook {
    fn to_schema() -> SchemaRef {
        let fields: Vec<Field> = VolumeCol::iter()
            .map(|col| {
                let dtype = match col {
                    VolumeCol::Day => DataType::Datetime(TimeUnit::Microseconds, None),
                    VolumeCol::VolumeUsd => DataType::Float64,
                };
                Field::new(col.into(), dtype)
            })
            .collect();

        Arc::new(Schema::from_iter(fields))
    }
}
