use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "dhis2eo")]
#[command(about = "Download climate, forecast, precipitation and population data")]
pub struct Cli {
    /// Enable verbose output
    #[arg(long, global = true)]
    pub verbose: bool,

    /// TOML credentials file with [cds] and [ecmwf] tables
    #[arg(long, global = true)]
    pub credentials: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Hourly ERA5-Land reanalysis from the CDS, one file per month
    Era5Land {
        /// Start month (YYYY-MM)
        #[arg(long)]
        start: String,
        /// End month (YYYY-MM), inclusive
        #[arg(long)]
        end: String,
        /// Bounding box as xmin,ymin,xmax,ymax (lon/lat)
        #[arg(long)]
        bbox: String,
        #[arg(long, default_value = "./downloads")]
        dir: PathBuf,
        #[arg(long, default_value = "era5_land")]
        prefix: String,
        /// CDS variable names (defaults to 2m_temperature, total_precipitation)
        #[arg(long, value_delimiter = ',')]
        variables: Vec<String>,
        /// Re-download months already on disk
        #[arg(long)]
        overwrite: bool,
    },
    /// Daily CORDEX climate projections from the CDS
    Cordex {
        /// Start year (YYYY or a full date)
        #[arg(long)]
        start: String,
        /// End year (YYYY or a full date), inclusive
        #[arg(long)]
        end: String,
        /// CORDEX domain, e.g. africa
        #[arg(long)]
        domain: String,
        /// Emissions scenario, e.g. rcp_4_5
        #[arg(long)]
        scenario: String,
        /// Horizontal resolution, e.g. 0_22_degree_x_0_22_degree
        #[arg(long)]
        resolution: String,
        #[arg(long, value_delimiter = ',')]
        variables: Vec<String>,
        #[arg(long, default_value = "./downloads")]
        dir: PathBuf,
        #[arg(long, default_value = "cordex")]
        prefix: String,
        #[arg(long)]
        overwrite: bool,
    },
    /// SEAS5 seasonal forecasts from the ECMWF archive
    Seas5 {
        #[arg(long)]
        start: String,
        #[arg(long)]
        end: String,
        #[arg(long)]
        bbox: String,
        #[arg(long, value_delimiter = ',')]
        variables: Vec<String>,
        /// Grid resolution in degrees (native 0.25)
        #[arg(long)]
        resolution: Option<f64>,
        #[arg(long, default_value = "./downloads")]
        dir: PathBuf,
        #[arg(long, default_value = "seas5")]
        prefix: String,
        #[arg(long)]
        overwrite: bool,
    },
    /// TIGGE control forecasts from the ECMWF archive
    Tigge {
        #[arg(long)]
        start: String,
        #[arg(long)]
        end: String,
        #[arg(long)]
        bbox: String,
        #[arg(long, value_delimiter = ',')]
        variables: Vec<String>,
        #[arg(long, default_value = "./downloads")]
        dir: PathBuf,
        #[arg(long, default_value = "tigge")]
        prefix: String,
        #[arg(long)]
        overwrite: bool,
    },
    /// IFS open-data forecasts, one grib2 file per forecast step
    Ifs {
        /// Start day (YYYY-MM-DD)
        #[arg(long)]
        start: String,
        /// End day (YYYY-MM-DD), inclusive
        #[arg(long)]
        end: String,
        #[arg(long, default_value = "./downloads")]
        dir: PathBuf,
        #[arg(long, default_value = "ifs")]
        prefix: String,
        #[arg(long)]
        overwrite: bool,
    },
    /// Daily CHIRPS v3 precipitation GeoTIFFs
    Chirps {
        #[arg(long)]
        start: String,
        #[arg(long)]
        end: String,
        /// Product stage: final or prelim
        #[arg(long, default_value = "final")]
        stage: String,
        /// Product flavor: rnl or sat
        #[arg(long, default_value = "rnl")]
        flavor: String,
        #[arg(long, default_value = "./downloads")]
        dir: PathBuf,
        #[arg(long, default_value = "chirps3")]
        prefix: String,
        #[arg(long)]
        overwrite: bool,
    },
    /// Yearly WorldPop population GeoTIFFs for a country
    Worldpop {
        /// Start year
        #[arg(long)]
        start: String,
        /// End year, inclusive
        #[arg(long)]
        end: String,
        /// ISO3 country code, e.g. MWI
        #[arg(long)]
        country: String,
        #[arg(long, default_value = "./downloads")]
        dir: PathBuf,
        #[arg(long, default_value = "worldpop")]
        prefix: String,
        #[arg(long)]
        overwrite: bool,
    },
}
