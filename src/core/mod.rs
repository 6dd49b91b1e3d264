pub mod cache;
pub mod retrieve;
pub mod time;
pub mod types;

pub use crate::domain::model::{FetchPeriod, Record};
pub use crate::domain::ports::PeriodFetcher;
pub use crate::utils::error::Result;
