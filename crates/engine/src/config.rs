use shared_types::{CalculationConfig, CalculationError};
use std::path::Path;
use std::sync::OnceLock;

static CONFIG: OnceLock<CalculationConfig> = OnceLock::new();
static DEFAULT: OnceLock<CalculationConfig> = OnceLock::new();

/// Path to the calculator configuration, relative to the working directory.
const CONFIG_PATH: &str = "calculation.toml";

/// Parse and validate a `calculation.toml` document.
pub fn parse_calculation_config(contents: &str) -> Result<CalculationConfig, CalculationError> {
    let config: CalculationConfig = toml::from_str(contents)
        .map_err(|e| CalculationError::configuration(format!("failed to parse {CONFIG_PATH}: {e}")))?;
    config.validate()?;
    Ok(config)
}

/// Read a configuration file. A missing file yields the statutory
/// defaults; a present but malformed file is an error.
pub fn read_calculation_config(path: &Path) -> Result<CalculationConfig, CalculationError> {
    match std::fs::read_to_string(path) {
        Ok(contents) => {
            let config = parse_calculation_config(&contents)?;
            tracing::info!(path = %path.display(), "loaded calculation configuration");
            Ok(config)
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "calculation configuration not found, using defaults");
            Ok(CalculationConfig::default())
        }
    }
}

/// Load `calculation.toml` into the process-wide configuration. Only the
/// first successful call has effect.
pub fn load_calculation_config() -> Result<&'static CalculationConfig, CalculationError> {
    if let Some(config) = CONFIG.get() {
        return Ok(config);
    }
    let config = read_calculation_config(Path::new(CONFIG_PATH))?;
    Ok(CONFIG.get_or_init(|| config))
}

/// The loaded configuration, or the statutory defaults if
/// `load_calculation_config()` hasn't been called yet.
pub fn calculation_config() -> &'static CalculationConfig {
    CONFIG
        .get()
        .unwrap_or_else(|| DEFAULT.get_or_init(CalculationConfig::default))
}
