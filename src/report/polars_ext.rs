use polars::prelude::{
    Column, DataFrame, DataType, Expr, Field, IntoColumn, IntoSeries, JsonFormat, JsonWriter,
    LazyFrame, PolarsResult, SchemaRef, SerWriter, StringChunked, TimeUnit, col,
};
use serde_json::Value;

use crate::error::{DataError, IoError, LvrLabError, LvrLabResult};

pub(super) fn polars_to_report_error(report: &str, e: polars::error::PolarsError) -> LvrLabError {
    LvrLabError::Data(DataError::DataFrame(format!(
        "Error while building the {report} report: {e}"
    )))
}

pub trait ExprExt {
    /// Formats a Duration column into a human-readable string (e.g., "2days 3h").
    /// Returns null if the duration is negative or null.
    fn human_duration(self) -> Expr;
}

impl ExprExt for Expr {
    fn human_duration(self) -> Expr {
        self.map(fmt_duration_udf, |_, _| {
            Ok(Field {
                name: "tmp".into(),
                dtype: DataType::String,
            })
        })
    }
}

pub trait DataFrameExt {
    fn to_json_rows(&self) -> LvrLabResult<Vec<serde_json::Map<String, Value>>>;
}

impl DataFrameExt for DataFrame {
    fn to_json_rows(&self) -> LvrLabResult<Vec<serde_json::Map<String, Value>>> {
        if self.height() == 0 {
            return Ok(Vec::new());
        }

        let mut buf = Vec::with_capacity(self.height() * self.width() * (1 << 6));
        JsonWriter::new(&mut buf)
            .with_json_format(JsonFormat::Json)
            .finish(&mut self.clone())
            .map_err(|e| DataError::DataFrame(e.to_string()))?;

        let json_val: Value = serde_json::from_slice(&buf).map_err(IoError::Json)?;

        match json_val {
            Value::Array(rows) => Ok(rows
                .into_iter()
                .filter_map(|v| match v {
                    Value::Object(map) => Some(map),
                    _ => None,
                })
                .collect()),
            _ => Err(DataError::DataFrame("Polars JSON output was not an array".to_string()).into()),
        }
    }
}

pub trait LazyFrameExt {
    fn with_human_durations(self, schema: SchemaRef) -> Self;
}

impl LazyFrameExt for LazyFrame {
    fn with_human_durations(self, schema: SchemaRef) -> Self {
        let duration_exprs = schema
            .iter()
            .filter_map(|(name, dtype)| {
                if matches!(dtype, DataType::Duration(_)) {
                    Some(col(name.as_str()).human_duration().alias(name.as_str()))
                } else {
                    None
                }
            })
            .collect::<Vec<_>>();

        if duration_exprs.is_empty() {
            return self;
        }

        self.with_columns(duration_exprs)
    }
}

// ================================================================================================
// Helper Functions
// ================================================================================================

fn fmt_duration_udf(c: Column) -> PolarsResult<Column> {
    let ca = c.duration()?;
    let unit = ca.time_unit();

    let out = ca
        .physical()
        .into_iter()
        .map(|opt_val| {
            opt_val.and_then(|v| {
                let val = u64::try_from(v).ok()?;
                let duration = match unit {
                    TimeUnit::Microseconds => std::time::Duration::from_micros(val),
                    TimeUnit::Milliseconds => std::time::Duration::from_millis(val),
                    TimeUnit::Nanoseconds => std::time::Duration::from_nanos(val),
                };
                Some(humantime::format_duration(duration).to_string())
            })
        })
        .collect::<StringChunked>()
        .into_series()
        .into_column();
    Ok(out)
}
