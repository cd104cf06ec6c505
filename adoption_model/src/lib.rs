/*!
Adoption metrics for a fixed set of sites, with a what-if simulation mode.

A [`Dataset`] holds the baseline values of every site, as loaded from the
source. It is never modified. A [`Session`] borrows a dataset and holds the
state of one user of the dashboard: the display [`Mode`] and the simulated
active-user counts. Any number of sessions can share the same dataset.

```
use adoption_model::builder::Builder;
use adoption_model::Mode;
# use adoption_model::ModelError;

let dataset = Builder::new()
    .site("A", 100, 50, 34.0, -118.0)
    .site("B", 200, 50, 37.0, -122.0)
    .build()?;

let mut session = dataset.session();
assert_eq!(session.mode(), Mode::Actual);
session.toggle_mode();
session.set_active("A", 100)?;
assert_eq!(session.global_adoption_pct(), 50.0);
# Ok::<(), ModelError>(())
```
*/
pub mod buckets;
pub mod builder;
mod config;
pub mod manual;
pub mod view;

use log::{debug, info, warn};

use std::collections::HashMap;

pub use crate::config::*;

/// Parses a percentage, either numeric or written as a string such as `"42%"`.
pub fn parse_pct(field: &PctField) -> Option<f64> {
    match field {
        PctField::Number(x) => Some(*x),
        PctField::Text(s) => s.replace('%', "").trim().parse::<f64>().ok(),
        PctField::Other(_) => None,
    }
}

/// Rounds a percentage to one decimal. Ties go to the even digit.
pub fn round_pct(pct: f64) -> f64 {
    (pct * 10.0).round_ties_even() / 10.0
}

// 2^53: above this, a float no longer holds every integer.
const MAX_EXACT_FLOAT_COUNT: f64 = 9_007_199_254_740_992.0;

fn exact_count(x: f64) -> Option<u64> {
    if x.is_finite() && x >= 0.0 && x.fract() == 0.0 && x < MAX_EXACT_FLOAT_COUNT {
        Some(x as u64)
    } else {
        None
    }
}

/// Reads a user count. Integers written as text are read exactly, floats
/// must be integral and below 2^53.
pub fn read_count(
    lineno: usize,
    column: &'static str,
    field: &CountField,
) -> Result<u64, ModelError> {
    let res = match field {
        CountField::Integer(n) => Some(*n),
        CountField::Number(x) => exact_count(*x),
        CountField::Text(s) => {
            let s = s.trim();
            s.parse::<u64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(exact_count))
        }
    };
    res.ok_or_else(|| ModelError::InvalidCount {
        lineno,
        column,
        value: match field {
            CountField::Integer(n) => n.to_string(),
            CountField::Number(x) => x.to_string(),
            CountField::Text(s) => s.clone(),
        },
    })
}

/// Checks the records read from a source and turns them into sites.
///
/// The order of the records is preserved. The first invalid record stops
/// the loading. The sum of the total users must fit in a `u64`, so that
/// the totals of a session never overflow.
pub fn load_sites(records: &[RawSiteRecord]) -> Result<Vec<Site>, ModelError> {
    info!("load_sites: Processing {} records", records.len());
    let mut res: Vec<Site> = Vec::new();
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut all_users: u64 = 0;
    for r in records.iter() {
        debug!("load_sites: record: {:?}", r);
        let reported_adoption_pct = parse_pct(&r.adoption_pct).ok_or(ModelError::ParsePct {
            lineno: r.lineno,
            value: match &r.adoption_pct {
                PctField::Number(x) => x.to_string(),
                PctField::Text(s) | PctField::Other(s) => s.clone(),
            },
        })?;
        let total_users = read_count(r.lineno, "Total Users", &r.total_users)?;
        let baseline_active_users = read_count(r.lineno, "Active Users", &r.active_users)?;
        if total_users == 0 {
            return Err(ModelError::ZeroTotalUsers {
                lineno: r.lineno,
                id: r.id.clone(),
            });
        }
        if baseline_active_users > total_users {
            return Err(ModelError::ActiveExceedsTotal {
                lineno: r.lineno,
                id: r.id.clone(),
                active_users: baseline_active_users,
                total_users,
            });
        }
        if seen.insert(r.id.clone(), r.lineno).is_some() {
            return Err(ModelError::DuplicateSite {
                lineno: r.lineno,
                id: r.id.clone(),
            });
        }
        all_users = all_users
            .checked_add(total_users)
            .ok_or_else(|| ModelError::TotalUsersOverflow {
                lineno: r.lineno,
                id: r.id.clone(),
            })?;
        res.push(Site {
            id: r.id.clone(),
            total_users,
            baseline_active_users,
            latitude: r.latitude,
            longitude: r.longitude,
            reported_adoption_pct,
        });
    }
    Ok(res)
}

/// The baseline values of all the sites, in source order.
#[derive(PartialEq, Debug, Clone)]
pub struct Dataset {
    sites: Vec<Site>,
    index: HashMap<String, usize>,
}

impl Dataset {
    /// Builds the dataset from records read from a source.
    pub fn from_records(records: &[RawSiteRecord]) -> Result<Dataset, ModelError> {
        let sites = load_sites(records)?;
        Ok(Dataset::from_checked_sites(sites))
    }

    // The sites must have passed the checks of load_sites.
    fn from_checked_sites(sites: Vec<Site>) -> Dataset {
        let index = sites
            .iter()
            .enumerate()
            .map(|(idx, s)| (s.id.clone(), idx))
            .collect();
        Dataset { sites, index }
    }

    pub fn sites(&self) -> &[Site] {
        &self.sites
    }

    pub fn len(&self) -> usize {
        self.sites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }

    pub fn site(&self, id: &str) -> Option<&Site> {
        self.index.get(id).map(|idx| &self.sites[*idx])
    }

    fn position(&self, id: &str) -> Result<usize, ModelError> {
        self.index
            .get(id)
            .cloned()
            .ok_or_else(|| ModelError::UnknownSite { id: id.to_string() })
    }

    /// Starts a new session, in actual mode and with the baseline values.
    pub fn session(&self) -> Session<'_> {
        Session::new(self)
    }
}

/// The state of one user of the dashboard.
///
/// Invariant: every simulated count is between 0 and the total number of
/// users of its site.
#[derive(PartialEq, Debug, Clone)]
pub struct Session<'a> {
    dataset: &'a Dataset,
    mode: Mode,
    active_users: Vec<u64>,
}

impl<'a> Session<'a> {
    pub fn new(dataset: &'a Dataset) -> Session<'a> {
        Session {
            dataset,
            mode: Mode::Actual,
            active_users: baseline(dataset),
        }
    }

    pub fn dataset(&self) -> &'a Dataset {
        self.dataset
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: Mode) {
        debug!("set_mode: {:?} -> {:?}", self.mode, mode);
        self.mode = mode;
    }

    /// Switches between the actual and the what-if values.
    /// The simulated counts are kept.
    pub fn toggle_mode(&mut self) -> Mode {
        self.set_mode(self.mode.toggled());
        self.mode
    }

    /// Sets the simulated number of active users of a site.
    ///
    /// Values outside of `[0, total_users]` are clamped. Returns the value
    /// that was stored. The value is stored in both modes, but it is only
    /// displayed in what-if mode.
    pub fn set_active(&mut self, id: &str, value: i64) -> Result<u64, ModelError> {
        let idx = self.dataset.position(id)?;
        let total = self.dataset.sites[idx].total_users;
        let clamped = if value < 0 {
            0
        } else {
            (value as u64).min(total)
        };
        if clamped as i64 != value {
            warn!(
                "set_active: site {:?}: value {} clamped to {} (total users: {})",
                id, value, clamped, total
            );
        }
        self.active_users[idx] = clamped;
        Ok(clamped)
    }

    /// Restores the baseline values. The mode is not changed.
    pub fn reset(&mut self) {
        debug!("reset: restoring {} baseline values", self.active_users.len());
        self.active_users = baseline(self.dataset);
    }

    /// The simulated number of active users, regardless of the mode.
    pub fn active_users(&self, id: &str) -> Result<u64, ModelError> {
        let idx = self.dataset.position(id)?;
        Ok(self.active_users[idx])
    }

    /// The number of active users that is displayed for this site.
    pub fn effective_active_users(&self, id: &str) -> Result<u64, ModelError> {
        let idx = self.dataset.position(id)?;
        Ok(self.effective_at(idx))
    }

    pub(crate) fn effective_at(&self, idx: usize) -> u64 {
        match self.mode {
            Mode::WhatIf => self.active_users[idx],
            Mode::Actual => self.dataset.sites[idx].baseline_active_users,
        }
    }

    pub(crate) fn simulated_at(&self, idx: usize) -> u64 {
        self.active_users[idx]
    }

    pub(crate) fn site_pct_at(&self, idx: usize) -> f64 {
        let total = self.dataset.sites[idx].total_users;
        round_pct(100.0 * self.effective_at(idx) as f64 / total as f64)
    }

    /// The adoption rate of a site, rounded to one decimal.
    pub fn site_adoption_pct(&self, id: &str) -> Result<f64, ModelError> {
        let idx = self.dataset.position(id)?;
        Ok(self.site_pct_at(idx))
    }

    // No overflow: the sum of the totals is checked at load and every
    // count is at most the total of its site.
    pub fn total_active_users(&self) -> u64 {
        (0..self.dataset.len()).map(|idx| self.effective_at(idx)).sum()
    }

    pub fn total_users(&self) -> u64 {
        self.dataset.sites.iter().map(|s| s.total_users).sum()
    }

    /// The adoption rate over all the sites (not rounded).
    /// It is 0 for an empty dataset.
    pub fn global_adoption_pct(&self) -> f64 {
        let total = self.total_users();
        if total == 0 {
            0.0
        } else {
            100.0 * self.total_active_users() as f64 / total as f64
        }
    }
}

fn baseline(dataset: &Dataset) -> Vec<u64> {
    dataset
        .sites
        .iter()
        .map(|s| s.baseline_active_users)
        .collect()
}
