use std::fmt;

// ---------------------------------------------------------------------------
// RepeatCategory – how long a customer kept ordering
// ---------------------------------------------------------------------------

/// Bucket for the days between a customer's first and last order.
///
/// Buckets are right-closed: `[0,7]`, `(7,14]`, `(14,30]`, `(30,90]`,
/// `(90,180]`, `(180,365]`, `(365,∞)`. A customer with a single order has a
/// span of zero and lands in the first bucket. Spans that cannot occur for
/// well-formed data (negative or missing) go to `Invalid`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RepeatCategory {
    UpToOneWeek,
    UpToTwoWeeks,
    UpToOneMonth,
    UpToThreeMonths,
    UpToSixMonths,
    UpToOneYear,
    OverOneYear,
    Invalid,
}

impl RepeatCategory {
    /// The seven valid buckets in chart order.
    pub const BUCKETS: [RepeatCategory; 7] = [
        RepeatCategory::UpToOneWeek,
        RepeatCategory::UpToTwoWeeks,
        RepeatCategory::UpToOneMonth,
        RepeatCategory::UpToThreeMonths,
        RepeatCategory::UpToSixMonths,
        RepeatCategory::UpToOneYear,
        RepeatCategory::OverOneYear,
    ];

    /// Inclusive upper bounds (days) of the first six buckets.
    const UPPER_BOUNDS: [i64; 6] = [7, 14, 30, 90, 180, 365];

    pub fn from_span(span_days: Option<i64>) -> Self {
        let Some(days) = span_days.filter(|d| *d >= 0) else {
            return RepeatCategory::Invalid;
        };
        Self::UPPER_BOUNDS
            .iter()
            .position(|&bound| days <= bound)
            .map_or(RepeatCategory::OverOneYear, |i| Self::BUCKETS[i])
    }

    pub fn label(self) -> &'static str {
        match self {
            RepeatCategory::UpToOneWeek => "≤ 1 minggu",
            RepeatCategory::UpToTwoWeeks => "≤ 2 minggu",
            RepeatCategory::UpToOneMonth => "≤ 1 bulan",
            RepeatCategory::UpToThreeMonths => "≤ 3 bulan",
            RepeatCategory::UpToSixMonths => "≤ 6 bulan",
            RepeatCategory::UpToOneYear => "≤ 1 tahun",
            RepeatCategory::OverOneYear => "> 1 tahun",
            RepeatCategory::Invalid => "tidak valid",
        }
    }
}

impl fmt::Display for RepeatCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
