use std::path::Path;

use crate::dash::*;

pub const COL_CAMPUS: &str = "Campus";
pub const COL_TOTAL_USERS: &str = "Total Users";
pub const COL_ACTIVE_USERS: &str = "Active Users";
pub const COL_ADOPTION_PCT: &str = "Adoption %";
pub const COL_LATITUDE: &str = "Latitude";
pub const COL_LONGITUDE: &str = "Longitude";

pub fn simplify_file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or(path)
        .to_string()
}

/// The provider to use for a file, based on its extension.
pub fn infer_provider(path: &str) -> &'static str {
    match Path::new(path)
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_ascii_lowercase())
        .as_deref()
    {
        Some("xlsx") | Some("xlsm") => "xlsx",
        _ => "csv",
    }
}

/// The position of the required columns in a row.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub struct ColumnIndexes {
    pub campus: usize,
    pub total_users: usize,
    pub active_users: usize,
    pub adoption_pct: usize,
    pub latitude: usize,
    pub longitude: usize,
}

impl ColumnIndexes {
    /// Finds the required columns in the header. Extra columns are ignored.
    pub fn from_header(header: &[String], path: &str) -> DashResult<ColumnIndexes> {
        let find = |column: &str| -> DashResult<usize> {
            header
                .iter()
                .position(|h| h.trim() == column)
                .context(MissingColumnSnafu {
                    column,
                    path: simplify_file_name(path),
                })
        };
        Ok(ColumnIndexes {
            campus: find(COL_CAMPUS)?,
            total_users: find(COL_TOTAL_USERS)?,
            active_users: find(COL_ACTIVE_USERS)?,
            adoption_pct: find(COL_ADOPTION_PCT)?,
            latitude: find(COL_LATITUDE)?,
            longitude: find(COL_LONGITUDE)?,
        })
    }
}

pub fn parse_number(lineno: usize, column: &str, content: &str) -> DashResult<f64> {
    content
        .trim()
        .parse::<f64>()
        .ok()
        .context(ParsingNumberSnafu {
            lineno,
            column,
            content,
        })
}
