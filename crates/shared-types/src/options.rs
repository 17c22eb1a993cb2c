use serde::{Deserialize, Serialize};

/// Per-request switches for optional date types and schemes.
///
/// Every field defaults to `false`, so a missing or partial options
/// document calculates only the statutory core dates.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct CalculationOptions {
    #[serde(default)]
    pub calculate_ersed: bool,
    #[serde(default)]
    pub calculate_hdced4plus: bool,
    /// Apply the 40% early-release scheme to eligible standard sentences.
    #[serde(default)]
    pub sds40_enabled: bool,
}

impl CalculationOptions {
    pub fn with_ersed(mut self) -> Self {
        self.calculate_ersed = true;
        self
    }

    pub fn with_hdced4plus(mut self) -> Self {
        self.calculate_hdced4plus = true;
        self
    }

    pub fn with_sds40(mut self) -> Self {
        self.sds40_enabled = true;
        self
    }
}
