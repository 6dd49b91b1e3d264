//! Retrieval of climate, forecast, precipitation and population datasets from
//! remote providers (CDS, ECMWF, CHC, WorldPop), with a local file cache, and
//! reformatting of harmonized tabular results for DHIS2 and Chap.

pub mod config;
pub mod core;
pub mod data;
pub mod domain;
pub mod integrations;
pub mod utils;

pub use crate::config::{Credentials, CredentialsFile};
pub use crate::core::types::BBox;
pub use crate::data::jobs::JobClient;
pub use crate::domain::model::{FetchPeriod, Record};
pub use crate::utils::error::{EoError, Result};
