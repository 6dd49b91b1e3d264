//! Reformatting layers for downstream consumers.

pub mod chap;
pub mod dhis2;
pub mod org_units;
