//! Catalog line parsing
//!
//! A catalog line is `<reference>\t<sensitive>\t<attribution>`. The line is
//! split on at most two tabs, so the attribution keeps any further tabs it
//! contains. Fields are not trimmed: a reference written as `"a.png "` keeps
//! its trailing space and will most likely fail to resolve.

use crate::error::{CatalogError, Result};
use crate::types::CatalogRecord;

const FIELD_COUNT: usize = 3;

/// Parse one catalog line. `line_number` is 1-based and only used in errors.
pub fn parse_record(line: &str, line_number: usize) -> Result<CatalogRecord> {
    let fields: Vec<&str> = line.splitn(FIELD_COUNT, '\t').collect();
    if fields.len() != FIELD_COUNT {
        return Err(CatalogError::MalformedRecord {
            line: line_number,
            fields: fields.len(),
        }
        .into());
    }

    let sensitive =
        parse_bool(fields[1]).ok_or_else(|| CatalogError::InvalidBooleanField {
            line: line_number,
            value: fields[1].to_string(),
        })?;

    Ok(CatalogRecord {
        reference: fields[0].to_string(),
        sensitive,
        attribution: fields[2].to_string(),
    })
}

/// Accepts `true` and `false` in any ASCII case.
fn parse_bool(value: &str) -> Option<bool> {
    if value.eq_ignore_ascii_case("true") {
        Some(true)
    } else if value.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}
