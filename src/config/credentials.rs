use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::utils::error::{EoError, Result};
use crate::utils::validation::{validate_non_empty_string, validate_url, Validate};

pub const DEFAULT_CDS_URL: &str = "https://cds.climate.copernicus.eu/api";
pub const DEFAULT_ECMWF_URL: &str = "https://api.ecmwf.int/v1";

/// Access credentials for one remote job service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub url: String,
    pub key: String,
}

/// TOML credentials file with one table per service:
///
/// ```toml
/// [cds]
/// url = "https://cds.climate.copernicus.eu/api"
/// key = "..."
///
/// [ecmwf]
/// key = "..."
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CredentialsFile {
    pub cds: Option<CredentialsEntry>,
    pub ecmwf: Option<CredentialsEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialsEntry {
    pub url: Option<String>,
    pub key: String,
}

impl CredentialsFile {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&text)?)
    }
}

impl Credentials {
    fn from_entry(entry: &CredentialsEntry, default_url: &str) -> Self {
        Self {
            url: entry.url.clone().unwrap_or_else(|| default_url.to_string()),
            key: entry.key.clone(),
        }
    }

    fn from_env(url_var: &str, key_var: &str, default_url: &str) -> Option<Self> {
        let key = std::env::var(key_var).ok()?;
        let url = std::env::var(url_var).unwrap_or_else(|_| default_url.to_string());
        Some(Self { url, key })
    }

    /// CDS credentials: `CDS_API_URL`/`CDS_API_KEY` env vars, falling back to
    /// the `[cds]` table of the credentials file when given.
    pub fn cds(file: Option<&CredentialsFile>) -> Result<Self> {
        Self::from_env("CDS_API_URL", "CDS_API_KEY", DEFAULT_CDS_URL)
            .or_else(|| {
                file.and_then(|f| f.cds.as_ref())
                    .map(|entry| Self::from_entry(entry, DEFAULT_CDS_URL))
            })
            .ok_or_else(|| {
                EoError::config("No CDS credentials: set CDS_API_KEY or provide a credentials file")
            })
            .and_then(|c| {
                c.validate()?;
                Ok(c)
            })
    }

    /// ECMWF credentials: `ECMWF_API_URL`/`ECMWF_API_KEY` env vars, falling
    /// back to the `[ecmwf]` table of the credentials file when given.
    pub fn ecmwf(file: Option<&CredentialsFile>) -> Result<Self> {
        Self::from_env("ECMWF_API_URL", "ECMWF_API_KEY", DEFAULT_ECMWF_URL)
            .or_else(|| {
                file.and_then(|f| f.ecmwf.as_ref())
                    .map(|entry| Self::from_entry(entry, DEFAULT_ECMWF_URL))
            })
            .ok_or_else(|| {
                EoError::config(
                    "No ECMWF credentials: set ECMWF_API_KEY or provide a credentials file",
                )
            })
            .and_then(|c| {
                c.validate()?;
                Ok(c)
            })
    }
}

impl Validate for Credentials {
    fn validate(&self) -> Result<()> {
        validate_url("credentials.url", &self.url)?;
        validate_non_empty_string("credentials.key", &self.key)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_credentials_file() {
        let text = r#"
            [cds]
            key = "abc123"

            [ecmwf]
            url = "https://example.org/v1"
            key = "def456"
        "#;
        let file: CredentialsFile = toml::from_str(text).unwrap();
        let cds = Credentials::from_entry(file.cds.as_ref().unwrap(), DEFAULT_CDS_URL);
        assert_eq!(cds.url, DEFAULT_CDS_URL);
        assert_eq!(cds.key, "abc123");
        let ecmwf = Credentials::from_entry(file.ecmwf.as_ref().unwrap(), DEFAULT_ECMWF_URL);
        assert_eq!(ecmwf.url, "https://example.org/v1");
    }

    #[test]
    fn validation_rejects_empty_key() {
        let creds = Credentials {
            url: DEFAULT_CDS_URL.to_string(),
            key: "  ".to_string(),
        };
        assert!(creds.validate().is_err());
    }
}
