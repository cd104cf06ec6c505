pub use crate::config::*;
use crate::Dataset;

/// A builder for datasets that do not come from a file.
///
/// The sites go through the same checks as the ones read from a file. Their
/// position (starting at 1) is used as line number in the errors.
///
/// ```
/// use adoption_model::builder::Builder;
/// # use adoption_model::ModelError;
///
/// let dataset = Builder::new()
///     .site("Fresno", 12_000, 3_000, 36.81, -119.75)
///     .site_with_pct("Chico", 8_000, 800, "10%", 39.73, -121.85)
///     .build()?;
///
/// assert_eq!(dataset.len(), 2);
/// # Ok::<(), ModelError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Builder {
    _records: Vec<RawSiteRecord>,
}

impl Builder {
    pub fn new() -> Builder {
        Builder {
            _records: Vec::new(),
        }
    }

    /// Adds a site. The reported adoption rate is computed from the counts.
    pub fn site(
        self,
        id: &str,
        total_users: u64,
        active_users: u64,
        latitude: f64,
        longitude: f64,
    ) -> Builder {
        let pct = if total_users == 0 {
            0.0
        } else {
            100.0 * active_users as f64 / total_users as f64
        };
        self.add(
            id,
            total_users,
            active_users,
            PctField::Number(pct),
            latitude,
            longitude,
        )
    }

    /// Adds a site with the adoption rate written as in a spreadsheet.
    pub fn site_with_pct(
        self,
        id: &str,
        total_users: u64,
        active_users: u64,
        adoption_pct: &str,
        latitude: f64,
        longitude: f64,
    ) -> Builder {
        self.add(
            id,
            total_users,
            active_users,
            PctField::Text(adoption_pct.to_string()),
            latitude,
            longitude,
        )
    }

    fn add(
        mut self,
        id: &str,
        total_users: u64,
        active_users: u64,
        adoption_pct: PctField,
        latitude: f64,
        longitude: f64,
    ) -> Builder {
        let lineno = self._records.len() + 1;
        self._records.push(RawSiteRecord {
            lineno,
            id: id.to_string(),
            total_users: CountField::Integer(total_users),
            active_users: CountField::Integer(active_users),
            adoption_pct,
            latitude,
            longitude,
        });
        self
    }

    pub fn build(&self) -> Result<Dataset, ModelError> {
        Dataset::from_records(&self._records)
    }
}
