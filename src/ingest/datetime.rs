use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use polars::prelude::{Column, DataType, Expr, Field, Int64Chunked, IntoColumn, IntoSeries,
    PolarsResult, TimeUnit};

/// Primary formats, in contract order. Higher-precision forms come first so
/// sub-second precision is never silently truncated by a looser match.
const PRIMARY_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%d %H:%M:%S"];

/// Permissive fallback formats carrying a time component.
const FALLBACK_DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y/%m/%d %H:%M:%S"];

/// Permissive fallback formats without a time component; they parse as
/// midnight.
const FALLBACK_DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

/// Parses a raw timestamp string from a dataset export.
///
/// Strips surrounding whitespace, then tries the primary formats in order,
/// then a permissive set of common forms (RFC 3339, `T`-separated, slashed
/// and date-only variants). Returns `None` if nothing matches; unparseable
/// inputs are a row-level data-quality issue, never an error.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    for fmt in PRIMARY_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }

    for fmt in FALLBACK_DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }

    for fmt in FALLBACK_DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d.and_time(NaiveTime::MIN));
        }
    }

    None
}

/// Maps a raw string column to `Datetime(Microseconds, None)` via
/// [`parse_timestamp`]; unparseable entries become null.
pub fn normalized_timestamp_expr(raw: Expr) -> Expr {
    raw.map(normalize_timestamps_udf, |_, _| {
        Ok(Field {
            name: "tmp".into(),
            dtype: DataType::Datetime(TimeUnit::Microseconds, None),
        })
    })
}

fn normalize_timestamps_udf(column: Column) -> PolarsResult<Column> {
    let ca = column.str()?;

    let out = ca
        .into_iter()
        .map(|opt_raw| {
            opt_raw
                .and_then(parse_timestamp)
                .map(|dt| dt.and_utc().timestamp_micros())
        })
        .collect::<Int64Chunked>()
        .into_datetime(TimeUnit::Microseconds, None)
        .into_series()
        .into_column();

    Ok(out)
}

#[cfg(test)]
mod tests {
    use polars::{df, prelude::{IntoLazy, col}};

    use super::*;

    fn ymd_hms_micro(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32, micro: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_micro_opt(h, min, s, micro)
            .unwrap()
    }

    // ============================================================================================
    // Scalar Contract
    // ============================================================================================

    #[test]
    fn test_microsecond_precision_is_preserved() {
        let have = parse_timestamp("2024-01-02 03:04:05.123456").expect("should parse");
        assert_eq!(have, ymd_hms_micro(2024, 1, 2, 3, 4, 5, 123_456));
    }

    #[test]
    fn test_second_precision_form() {
        let have = parse_timestamp("2024-01-02 03:04:05").expect("should parse");
        assert_eq!(have, ymd_hms_micro(2024, 1, 2, 3, 4, 5, 0));
    }

    #[test]
    fn test_surrounding_whitespace_is_stripped() {
        let have = parse_timestamp("  2024-01-02 03:04:05  ").expect("should parse");
        assert_eq!(have, ymd_hms_micro(2024, 1, 2, 3, 4, 5, 0));
    }

    #[test]
    fn test_permissive_fallback_forms() {
        let cases = vec![
            ("2024-01-02T03:04:05Z", ymd_hms_micro(2024, 1, 2, 3, 4, 5, 0)),
            (
                "2024-01-02T03:04:05.500000",
                ymd_hms_micro(2024, 1, 2, 3, 4, 5, 500_000),
            ),
            ("2024/01/02 03:04:05", ymd_hms_micro(2024, 1, 2, 3, 4, 5, 0)),
            ("2024-01-02", ymd_hms_micro(2024, 1, 2, 0, 0, 0, 0)),
            ("2024/01/02", ymd_hms_micro(2024, 1, 2, 0, 0, 0, 0)),
            ("01/31/2024", ymd_hms_micro(2024, 1, 31, 0, 0, 0, 0)),
        ];

        for (raw, want) in cases {
            let have = parse_timestamp(raw);
            assert_eq!(have, Some(want), "input: {raw:?}");
        }
    }

    #[test]
    fn test_unparseable_inputs_yield_the_invalid_sentinel() {
        let junk = ["not-a-date", "", "   ", "2024-13-45 99:99:99", "null"];
        for raw in junk {
            assert_eq!(parse_timestamp(raw), None, "input: {raw:?}");
        }
    }

    // ============================================================================================
    // Column UDF
    // ============================================================================================

    #[test]
    fn test_column_normalization_nulls_invalid_rows() {
        let df = df![
            "DATE" => &[
                "2024-01-02 03:04:05.123456",
                "not-a-date",
                "2024-01-03 00:00:00",
            ],
        ]
        .expect("failed to create input frame");

        let out = df
            .lazy()
            .select([normalized_timestamp_expr(col("DATE")).alias("date")])
            .collect()
            .expect("failed to normalize column");

        let date = out.column("date").unwrap();
        assert_eq!(
            date.dtype(),
            &DataType::Datetime(TimeUnit::Microseconds, None)
        );
        assert_eq!(date.null_count(), 1, "exactly the junk row must be null");

        let micros = date.datetime().unwrap().physical();
        assert_eq!(
            micros.get(0),
            Some(
                ymd_hms_micro(2024, 1, 2, 3, 4, 5, 123_456)
                    .and_utc()
                    .timestamp_micros()
            )
        );
        assert_eq!(micros.get(1), None);
    }
}
