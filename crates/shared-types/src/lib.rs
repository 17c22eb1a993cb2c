pub mod error;
pub mod options;

// Release-date calculation domain
pub mod adjustment;
pub mod booking;
pub mod calculation;
pub mod common;
pub mod config;
pub mod duration;
pub mod release_date;
pub mod sentence;

pub use error::*;
pub use options::*;

pub use adjustment::*;
pub use booking::*;
pub use calculation::*;
pub use common::*;
pub use config::*;
pub use duration::*;
pub use release_date::*;
pub use sentence::*;
