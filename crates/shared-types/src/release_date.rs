//! Release-date types and the rule tags used to explain how each date
//! was reached.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

// ─── Release Date Types ────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReleaseDateType {
    /// Sentence and licence expiry date.
    Sled,
    /// Sentence expiry date.
    Sed,
    /// Licence expiry date.
    Led,
    /// Conditional release date.
    Crd,
    /// Automatic release date.
    Ard,
    /// Parole eligibility date.
    Ped,
    /// Non-parole date.
    Npd,
    /// Mid-term date (detention and training orders).
    Mtd,
    /// Home detention curfew eligibility date.
    Hdced,
    /// Home detention curfew eligibility date, four-year-plus scheme.
    #[serde(rename = "HDCED4PLUS")]
    Hdced4Plus,
    /// Early removal scheme eligibility date.
    Ersed,
    /// Top-up supervision expiry date.
    Tused,
    /// Post-recall release date.
    Prrd,
}

impl ReleaseDateType {
    /// Release types that mark the end of the custodial period, in the
    /// order a sentence's own release type is chosen.
    pub const RELEASE_TYPES: [ReleaseDateType; 4] = [Self::Crd, Self::Ard, Self::Npd, Self::Mtd];

    pub fn abbreviation(&self) -> &'static str {
        match self {
            Self::Sled => "SLED",
            Self::Sed => "SED",
            Self::Led => "LED",
            Self::Crd => "CRD",
            Self::Ard => "ARD",
            Self::Ped => "PED",
            Self::Npd => "NPD",
            Self::Mtd => "MTD",
            Self::Hdced => "HDCED",
            Self::Hdced4Plus => "HDCED4PLUS",
            Self::Ersed => "ERSED",
            Self::Tused => "TUSED",
            Self::Prrd => "PRRD",
        }
    }

    pub fn is_release(&self) -> bool {
        Self::RELEASE_TYPES.contains(self) || *self == Self::Prrd
    }

    /// Eligibility dates (earliest point a release may be considered).
    pub fn is_eligibility(&self) -> bool {
        matches!(self, Self::Hdced | Self::Hdced4Plus | Self::Ersed | Self::Ped)
    }
}

impl fmt::Display for ReleaseDateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.abbreviation())
    }
}

// ─── Calculation Rules ─────────────────────────────────────────

/// Tag naming the statutory rule that produced (or altered) a date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CalculationRule {
    ConsecutiveAggregate,
    SingleTermAggregate,
    SharedSentenceGroupAdjustments,
    Sds40TrancheOneCommencement,
    Sds40TrancheTwoCommencement,
    HdcedGeMinPeriodLtMidpoint,
    HdcedGeMidpointLtMaxPeriod,
    HdcedMinimumCustodialPeriod,
    Hdced4PlusGeMinPeriodLtMidpoint,
    Hdced4PlusGeMidpoint,
    Hdced4PlusMinimumCustodialPeriod,
    ErsedOneHalfCustodialPeriod,
    ErsedMaxPeriod,
    ErsedBeforeSentenceDate,
    TusedLicencePeriodLtOneYear,
    PrrdStandardRecall,
    PrrdFixedTermShort,
    PrrdFixedTermLong,
    PrrdCappedAtExpiry,
}

/// Explanation of one date: which rules applied, the date before
/// adjustments, the net adjustment in days, and the resulting date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateBreakdown {
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub rules: BTreeSet<CalculationRule>,
    pub unadjusted_date: NaiveDate,
    pub adjusted_days: i64,
    pub release_date: NaiveDate,
}

impl DateBreakdown {
    pub fn new(unadjusted_date: NaiveDate, adjusted_days: i64, release_date: NaiveDate) -> Self {
        Self {
            rules: BTreeSet::new(),
            unadjusted_date,
            adjusted_days,
            release_date,
        }
    }

    pub fn with_rule(mut self, rule: CalculationRule) -> Self {
        self.rules.insert(rule);
        self
    }

    pub fn has_rule(&self, rule: CalculationRule) -> bool {
        self.rules.contains(&rule)
    }
}
