use crate::common::*;
use engine::config::{calculation_config, parse_calculation_config, read_calculation_config};
use pretty_assertions::assert_eq;
use shared_types::{
    CalculationConfig, CalculationErrorKind, FixedTermRecallConfiguration, Fraction,
    HdcedConfiguration,
};
use std::path::Path;

#[test]
fn sections_override_their_defaults() {
    let config = parse_calculation_config(
        r#"
        [tused]
        supervision_months = 6

        [fixed_term_recall]
        short_recall_days = 10
        long_recall_days = 20
        duration_threshold_months = 12

        [sds40]
        tranche_one_commencement = "2024-09-10"
        tranche_two_commencement = "2024-10-22"
        tranche_two_minimum_duration_years = 4
        "#,
    )
    .unwrap();

    assert_eq!(config.tused.supervision_months, 6);
    assert_eq!(
        config.fixed_term_recall,
        FixedTermRecallConfiguration {
            short_recall_days: 10,
            long_recall_days: 20,
            duration_threshold_months: 12,
        }
    );
    assert_eq!(config.sds40.tranche_one_commencement, date(2024, 9, 10));
    assert_eq!(config.sds40.tranche_two_minimum_duration_years, 4);
    assert_eq!(config.hdced, HdcedConfiguration::default());
}

#[test]
fn empty_document_is_the_statutory_default() {
    assert_eq!(parse_calculation_config("").unwrap(), CalculationConfig::default());
}

#[test]
fn incomplete_section_is_rejected() {
    let error = parse_calculation_config("[tused]\n").unwrap_err();
    assert_eq!(error.kind(), CalculationErrorKind::Configuration);
}

#[test]
fn invalid_fraction_fails_validation() {
    let error = parse_calculation_config(
        r#"
        [ersed]
        max_period_days = 544
        release_point = { numerator = 3, denominator = 2 }
        "#,
    )
    .unwrap_err();
    assert_eq!(error.kind(), CalculationErrorKind::Configuration);
    assert!(error.to_string().contains("3/2"));
}

#[test]
fn tranches_must_commence_in_order() {
    let mut config = CalculationConfig::default();
    config.sds40.tranche_two_commencement = date(2024, 1, 1);
    assert!(config.validate().is_err());

    config = CalculationConfig::default();
    config.release_points.sds_standard_release = Fraction::new(1, 0);
    assert!(config.validate().is_err());
}

#[test]
fn missing_file_falls_back_to_defaults() {
    let config = read_calculation_config(Path::new("/nonexistent/calculation.toml")).unwrap();
    assert_eq!(config, CalculationConfig::default());
}

#[test]
fn unloaded_process_config_is_the_default() {
    assert_eq!(calculation_config(), &CalculationConfig::default());
}
