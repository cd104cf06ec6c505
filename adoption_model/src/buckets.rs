//! Severity colors for adoption rates.

/// The severity of an adoption rate, from lowest to highest.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
pub enum Bucket {
    Red,
    Orange,
    Yellow,
    LightGreen,
    DarkGreen,
    /// The rate falls in none of the ranges.
    Fallback,
}

/// The buckets in the order they are checked, with their inclusive bounds.
///
/// The bounds leave gaps between consecutive buckets: 10.5 or 25.5 are in no
/// bucket and get the fallback color.
pub const ADOPTION_BUCKETS: [(f64, f64, Bucket); 5] = [
    (0.0, 10.0, Bucket::Red),
    (11.0, 25.0, Bucket::Orange),
    (26.0, 50.0, Bucket::Yellow),
    (51.0, 75.0, Bucket::LightGreen),
    (76.0, 100.0, Bucket::DarkGreen),
];

/// The continuous color bands drawn on the background of a gauge.
pub const GAUGE_STEPS: [(f64, f64, Bucket); 5] = [
    (0.0, 10.0, Bucket::Red),
    (10.0, 25.0, Bucket::Orange),
    (25.0, 50.0, Bucket::Yellow),
    (50.0, 75.0, Bucket::LightGreen),
    (75.0, 100.0, Bucket::DarkGreen),
];

impl Bucket {
    pub fn color(self) -> &'static str {
        match self {
            Bucket::Red => "#FF4B4B",
            Bucket::Orange => "#FFA500",
            Bucket::Yellow => "#FFD700",
            Bucket::LightGreen => "#90EE90",
            Bucket::DarkGreen => "#228B22",
            Bucket::Fallback => "#CCCCCC",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Bucket::Red => "red",
            Bucket::Orange => "orange",
            Bucket::Yellow => "yellow",
            Bucket::LightGreen => "lightGreen",
            Bucket::DarkGreen => "darkGreen",
            Bucket::Fallback => "fallback",
        }
    }
}

pub fn bucket(adoption_pct: f64) -> Bucket {
    ADOPTION_BUCKETS
        .iter()
        .find(|(low, high, _)| *low <= adoption_pct && adoption_pct <= *high)
        .map(|(_, _, b)| *b)
        .unwrap_or(Bucket::Fallback)
}

pub fn adoption_color(adoption_pct: f64) -> &'static str {
    bucket(adoption_pct).color()
}
