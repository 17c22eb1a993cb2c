//! Release date calculation
//!
//! [`calculate_booking`] runs the whole pipeline for one booking. The rule
//! modules are public so each stage can be exercised on its own.

pub mod booking;
pub mod consecutive;
pub mod duration_aggregator;
pub mod ersed;
pub mod extraction;
pub mod hdced;
pub mod hdced4plus;
pub mod identification;
pub mod recall;
pub mod remand_overlap;
pub mod sentence_calculation;
pub mod single_term;
pub mod timeline;
pub mod tused;
pub mod working_days;

pub use booking::calculate_booking;
pub use extraction::{effective_sentence_length, extract};
pub use sentence_calculation::calculate_sentence;
pub use timeline::{walk_timeline, TimelineOutcome};
pub use working_days::{
    adjust_for_working_days, BankHolidays, EnglandAndWalesBankHolidays, NonWorkingDayAdjustment,
};
