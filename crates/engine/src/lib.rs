pub mod config;

// Release date calculation engine
pub mod calculation;

pub use calculation::calculate_booking;
