//! Copernicus Climate Data Store adapters.

pub mod cordex;
pub mod cordex_models;
pub mod era5_land;
