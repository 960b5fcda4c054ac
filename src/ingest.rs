pub mod datetime;

use std::path::Path;

use polars::prelude::{LazyCsvReader, LazyFileListReader, LazyFrame, PlPath};

use crate::error::{IoError, LvrLabResult};

/// Scans a raw dataset CSV with every column typed as a string.
///
/// Schema inference is disabled so heterogeneous date strings and literal
/// `"null"` markers reach the cleaning expressions untouched. Header names
/// are normalized: a UTF-8 BOM and surrounding whitespace are stripped, so
/// `utf-8-sig` exports resolve their first column by plain name.
pub(crate) fn scan_raw_csv(path: &Path) -> LvrLabResult<LazyFrame> {
    let uri = path.to_str().ok_or_else(|| {
        IoError::FileSystem(format!(
            "Path contains invalid UTF-8 characters: {}",
            path.display()
        ))
    })?;

    let lf = LazyCsvReader::new(PlPath::new(uri))
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .finish()
        .map_err(|e| IoError::ReadFailed(format!("Failed to open '{}': {e}", path.display())))?;

    with_clean_headers(lf)
}

fn with_clean_headers(mut lf: LazyFrame) -> LvrLabResult<LazyFrame> {
    let schema = lf
        .collect_schema()
        .map_err(|e| IoError::ReadFailed(format!("Failed to resolve CSV header: {e}")))?;

    let (raw, clean): (Vec<String>, Vec<String>) = schema
        .iter_names()
        .filter_map(|name| {
            let cleaned = name.trim_start_matches('\u{feff}').trim();
            if cleaned == name.as_str() {
                None
            } else {
                Some((name.to_string(), cleaned.to_string()))
            }
        })
        .unzip();

    if raw.is_empty() {
        return Ok(lf);
    }

    tracing::debug!(renamed = raw.len(), "normalized CSV header names");
    Ok(lf.rename(raw, clean, true))
}
