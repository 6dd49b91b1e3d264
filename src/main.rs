use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Parser;

use dhis2eo::config::cli::{Cli, Commands};
use dhis2eo::data::cds::cordex::{self, CordexRequest};
use dhis2eo::data::cds::cordex_models::models_for;
use dhis2eo::data::cds::era5_land;
use dhis2eo::data::chc::{self, Flavor, Stage};
use dhis2eo::data::ecmwf::{ifs, seas5, tigge};
use dhis2eo::data::worldpop;
use dhis2eo::utils::logger;
use dhis2eo::{BBox, Credentials, CredentialsFile, JobClient};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logger::init_cli_logger(cli.verbose);

    let credentials_file = match &cli.credentials {
        Some(path) => Some(CredentialsFile::load(path)?),
        None => None,
    };

    let files = run(cli.command, credentials_file.as_ref()).await?;
    for file in &files {
        println!("{}", file.display());
    }
    tracing::info!("{} file(s) on disk", files.len());
    Ok(())
}

fn cds_client(file: Option<&CredentialsFile>) -> Result<JobClient> {
    let creds = Credentials::cds(file)?;
    Ok(JobClient::new(creds.url, creds.key))
}

fn ecmwf_client(file: Option<&CredentialsFile>) -> Result<JobClient> {
    let creds = Credentials::ecmwf(file)?;
    Ok(JobClient::new(creds.url, creds.key))
}

async fn run(command: Commands, creds: Option<&CredentialsFile>) -> Result<Vec<PathBuf>> {
    match command {
        Commands::Era5Land {
            start,
            end,
            bbox,
            dir,
            prefix,
            variables,
            overwrite,
        } => {
            let client = cds_client(creds)?;
            let bbox = BBox::parse(&bbox)?;
            let variables = if variables.is_empty() {
                None
            } else {
                Some(variables.as_slice())
            };
            Ok(era5_land::retrieve_hourly(
                &client, &start, &end, bbox, dir, &prefix, !overwrite, variables,
            )
            .await?)
        }
        Commands::Cordex {
            start,
            end,
            domain,
            scenario,
            resolution,
            variables,
            dir,
            prefix,
            overwrite,
        } => {
            let client = cds_client(creds)?;
            let Some(models) = models_for(&domain, &resolution, &scenario) else {
                bail!(
                    "No known model combinations for domain '{}', resolution '{}', scenario '{}'",
                    domain,
                    resolution,
                    scenario
                );
            };
            let request = CordexRequest {
                domain,
                scenario,
                resolution,
                variables,
                models: models.to_vec(),
            };
            Ok(cordex::retrieve(&client, &start, &end, &request, dir, &prefix, overwrite).await?)
        }
        Commands::Seas5 {
            start,
            end,
            bbox,
            variables,
            resolution,
            dir,
            prefix,
            overwrite,
        } => {
            let client = ecmwf_client(creds)?;
            let bbox = BBox::parse(&bbox)?;
            Ok(seas5::download(
                &client, &start, &end, bbox, dir, &prefix, &variables, resolution, overwrite,
            )
            .await?)
        }
        Commands::Tigge {
            start,
            end,
            bbox,
            variables,
            dir,
            prefix,
            overwrite,
        } => {
            let client = ecmwf_client(creds)?;
            let bbox = BBox::parse(&bbox)?;
            Ok(tigge::download(&client, &start, &end, bbox, dir, &prefix, &variables, overwrite)
                .await?)
        }
        Commands::Ifs {
            start,
            end,
            dir,
            prefix,
            overwrite,
        } => Ok(ifs::download(&start, &end, dir, &prefix, None, overwrite).await?),
        Commands::Chirps {
            start,
            end,
            stage,
            flavor,
            dir,
            prefix,
            overwrite,
        } => {
            let stage = match stage.as_str() {
                "final" => Stage::Final,
                "prelim" => Stage::Prelim,
                other => bail!("stage must be 'final' or 'prelim', got '{}'", other),
            };
            let flavor = match flavor.as_str() {
                "rnl" => Flavor::Rnl,
                "sat" => Flavor::Sat,
                other => bail!("flavor must be 'rnl' or 'sat', got '{}'", other),
            };
            Ok(chc::retrieve(&start, &end, dir, &prefix, stage, flavor, None, !overwrite).await?)
        }
        Commands::Worldpop {
            start,
            end,
            country,
            dir,
            prefix,
            overwrite,
        } => {
            Ok(worldpop::retrieve(&start, &end, &country, dir, &prefix, None, !overwrite).await?)
        }
    }
}
