// ********* Input data structures ***********

use std::error::Error;
use std::fmt::Display;

/// The content of a percentage cell, as found in the source.
///
/// Spreadsheets store the adoption rate either as a number or as a
/// string such as `"42%"`.
#[derive(PartialEq, Debug, Clone)]
pub enum PctField {
    Number(f64),
    Text(String),
    /// A cell that is neither a number nor a string (boolean, error, ...).
    Other(String),
}

/// The content of a user count cell, as found in the source.
///
/// Text is kept as written so that large integers are not rounded
/// through a float.
#[derive(PartialEq, Debug, Clone)]
pub enum CountField {
    Integer(u64),
    Number(f64),
    Text(String),
}

/// A site, as parsed by the readers.
/// This is before checking the counts and the percentage.
#[derive(PartialEq, Debug, Clone)]
pub struct RawSiteRecord {
    /// The line in the source, used for error reporting.
    pub lineno: usize,
    pub id: String,
    pub total_users: CountField,
    pub active_users: CountField,
    pub adoption_pct: PctField,
    pub latitude: f64,
    pub longitude: f64,
}

/// A site of the baseline dataset. Immutable once loaded.
#[derive(PartialEq, Debug, Clone)]
pub struct Site {
    pub id: String,
    pub total_users: u64,
    pub baseline_active_users: u64,
    pub latitude: f64,
    pub longitude: f64,
    /// The adoption rate as written in the source. Displayed values are
    /// always recomputed from the counts.
    pub reported_adoption_pct: f64,
}

// ******** Session data structures *********

/// Which values the dashboard displays.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum Mode {
    /// The baseline values from the source.
    Actual,
    /// The simulated values of the session.
    WhatIf,
}

impl Mode {
    pub fn toggled(self) -> Mode {
        match self {
            Mode::Actual => Mode::WhatIf,
            Mode::WhatIf => Mode::Actual,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Actual => "actual",
            Mode::WhatIf => "whatIf",
        }
    }
}

/// Errors raised while loading the dataset or editing a session.
#[derive(PartialEq, Debug, Clone)]
pub enum ModelError {
    /// The percentage field is neither a number nor a `%`-suffixed number.
    ParsePct { lineno: usize, value: String },
    /// A user count that is not a non-negative integer, or a float too
    /// large to hold an exact integer.
    InvalidCount {
        lineno: usize,
        column: &'static str,
        value: String,
    },
    /// The sum of the total users over all the sites does not fit in a u64.
    TotalUsersOverflow { lineno: usize, id: String },
    ZeroTotalUsers { lineno: usize, id: String },
    ActiveExceedsTotal {
        lineno: usize,
        id: String,
        active_users: u64,
        total_users: u64,
    },
    DuplicateSite { lineno: usize, id: String },
    UnknownSite { id: String },
}

impl Error for ModelError {}

impl Display for ModelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelError::ParsePct { lineno, value } => {
                write!(f, "line {}: cannot parse adoption percentage {:?}", lineno, value)
            }
            ModelError::InvalidCount {
                lineno,
                column,
                value,
            } => write!(
                f,
                "line {}: column {:?} must be a non-negative integer, found {:?}",
                lineno, column, value
            ),
            ModelError::ZeroTotalUsers { lineno, id } => {
                write!(f, "line {}: site {:?} has no users", lineno, id)
            }
            ModelError::ActiveExceedsTotal {
                lineno,
                id,
                active_users,
                total_users,
            } => write!(
                f,
                "line {}: site {:?} has {} active users for {} total users",
                lineno, id, active_users, total_users
            ),
            ModelError::TotalUsersOverflow { lineno, id } => write!(
                f,
                "line {}: site {:?}: the total number of users over all sites is too large",
                lineno, id
            ),
            ModelError::DuplicateSite { lineno, id } => {
                write!(f, "line {}: site {:?} is already defined", lineno, id)
            }
            ModelError::UnknownSite { id } => write!(f, "unknown site {:?}", id),
        }
    }
}
