use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::common::Fraction;
use crate::error::CalculationError;

// ---------------------------------------------------------------------------
// Calculator configuration
// ---------------------------------------------------------------------------

/// Release-point fractions, one per track (and per secondary date).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleasePointMultipliers {
    pub sds_before_cja_laspo: Fraction,
    pub sds_standard_release: Fraction,
    pub sds_plus_release: Fraction,
    pub sds_early_release: Fraction,
    pub eds_automatic_release: Fraction,
    pub eds_discretionary_parole_eligibility: Fraction,
    pub sopc_parole_eligibility_before_pcsc: Fraction,
    pub sopc_parole_eligibility_after_pcsc: Fraction,
    pub afine: Fraction,
    pub dto: Fraction,
    pub pre_cja_licence_expiry: Fraction,
    pub pre_cja_non_parole: Fraction,
}

impl Default for ReleasePointMultipliers {
    fn default() -> Self {
        Self {
            sds_before_cja_laspo: Fraction::HALF,
            sds_standard_release: Fraction::HALF,
            sds_plus_release: Fraction::TWO_THIRDS,
            sds_early_release: Fraction::TWO_FIFTHS,
            eds_automatic_release: Fraction::TWO_THIRDS,
            eds_discretionary_parole_eligibility: Fraction::TWO_THIRDS,
            sopc_parole_eligibility_before_pcsc: Fraction::HALF,
            sopc_parole_eligibility_after_pcsc: Fraction::TWO_THIRDS,
            afine: Fraction::HALF,
            dto: Fraction::HALF,
            pre_cja_licence_expiry: Fraction::THREE_QUARTERS,
            pre_cja_non_parole: Fraction::TWO_THIRDS,
        }
    }
}

impl ReleasePointMultipliers {
    fn all(&self) -> [(&'static str, Fraction); 12] {
        [
            ("sds_before_cja_laspo", self.sds_before_cja_laspo),
            ("sds_standard_release", self.sds_standard_release),
            ("sds_plus_release", self.sds_plus_release),
            ("sds_early_release", self.sds_early_release),
            ("eds_automatic_release", self.eds_automatic_release),
            ("eds_discretionary_parole_eligibility", self.eds_discretionary_parole_eligibility),
            ("sopc_parole_eligibility_before_pcsc", self.sopc_parole_eligibility_before_pcsc),
            ("sopc_parole_eligibility_after_pcsc", self.sopc_parole_eligibility_after_pcsc),
            ("afine", self.afine),
            ("dto", self.dto),
            ("pre_cja_licence_expiry", self.pre_cja_licence_expiry),
            ("pre_cja_non_parole", self.pre_cja_non_parole),
        ]
    }
}

/// Home detention curfew thresholds, in days.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HdcedConfiguration {
    pub minimum_days_on_hdc: i64,
    pub minimum_custodial_period_days: i64,
    pub custodial_period_mid_point_days: i64,
    pub custodial_period_below_midpoint_minimum_deduction_days: i64,
    pub custodial_period_above_midpoint_deduction_days: i64,
}

impl Default for HdcedConfiguration {
    fn default() -> Self {
        Self {
            minimum_days_on_hdc: 14,
            minimum_custodial_period_days: 28,
            custodial_period_mid_point_days: 360,
            custodial_period_below_midpoint_minimum_deduction_days: 28,
            custodial_period_above_midpoint_deduction_days: 179,
        }
    }
}

/// Thresholds for the four-year-plus HDC scheme. Same shape as
/// [`HdcedConfiguration`] but configured independently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hdced4PlusConfiguration {
    pub minimum_days_on_hdc: i64,
    pub minimum_custodial_period_days: i64,
    pub custodial_period_mid_point_days: i64,
    pub custodial_period_below_midpoint_minimum_deduction_days: i64,
    pub custodial_period_above_midpoint_deduction_days: i64,
}

impl Default for Hdced4PlusConfiguration {
    fn default() -> Self {
        Self {
            minimum_days_on_hdc: 14,
            minimum_custodial_period_days: 28,
            custodial_period_mid_point_days: 360,
            custodial_period_below_midpoint_minimum_deduction_days: 28,
            custodial_period_above_midpoint_deduction_days: 179,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErsedConfiguration {
    pub max_period_days: i64,
    pub release_point: Fraction,
}

impl Default for ErsedConfiguration {
    fn default() -> Self {
        Self {
            max_period_days: 544,
            release_point: Fraction::HALF,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TusedConfiguration {
    pub supervision_months: u32,
}

impl Default for TusedConfiguration {
    fn default() -> Self {
        Self {
            supervision_months: 12,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixedTermRecallConfiguration {
    pub short_recall_days: i64,
    pub long_recall_days: i64,
    /// Sentences shorter than this many months take the short recall.
    pub duration_threshold_months: u32,
}

impl Default for FixedTermRecallConfiguration {
    fn default() -> Self {
        Self {
            short_recall_days: 14,
            long_recall_days: 28,
            duration_threshold_months: 12,
        }
    }
}

/// Commencement dates of the 40% early-release tranches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sds40Configuration {
    pub tranche_one_commencement: NaiveDate,
    pub tranche_two_commencement: NaiveDate,
    pub tranche_two_minimum_duration_years: u32,
}

impl Default for Sds40Configuration {
    fn default() -> Self {
        Self {
            tranche_one_commencement: NaiveDate::from_ymd_opt(2024, 9, 10).unwrap_or_default(),
            tranche_two_commencement: NaiveDate::from_ymd_opt(2024, 10, 22).unwrap_or_default(),
            tranche_two_minimum_duration_years: 5,
        }
    }
}

/// Top-level structure matching `calculation.toml`. Missing sections take
/// their statutory defaults; a present section must be complete.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationConfig {
    #[serde(default)]
    pub release_points: ReleasePointMultipliers,
    #[serde(default)]
    pub hdced: HdcedConfiguration,
    #[serde(default)]
    pub hdced4plus: Hdced4PlusConfiguration,
    #[serde(default)]
    pub ersed: ErsedConfiguration,
    #[serde(default)]
    pub tused: TusedConfiguration,
    #[serde(default)]
    pub fixed_term_recall: FixedTermRecallConfiguration,
    #[serde(default)]
    pub sds40: Sds40Configuration,
}

impl CalculationConfig {
    /// Reject fractions and periods the calculators cannot use.
    pub fn validate(&self) -> Result<(), CalculationError> {
        for (name, fraction) in self.release_points.all() {
            if !fraction.is_valid() {
                return Err(CalculationError::configuration(format!(
                    "release point {name} = {fraction} is not a fraction in [0, 1]"
                )));
            }
        }
        if !self.ersed.release_point.is_valid() {
            return Err(CalculationError::configuration(format!(
                "ersed release point {} is not a fraction in [0, 1]",
                self.ersed.release_point
            )));
        }
        if self.hdced.custodial_period_mid_point_days <= 0
            || self.hdced4plus.custodial_period_mid_point_days <= 0
        {
            return Err(CalculationError::configuration(
                "hdc custodial period midpoint must be positive",
            ));
        }
        if self.sds40.tranche_two_commencement < self.sds40.tranche_one_commencement {
            return Err(CalculationError::configuration(
                "sds40 tranche two commences before tranche one",
            ));
        }
        Ok(())
    }
}
