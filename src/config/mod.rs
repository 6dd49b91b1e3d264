#[cfg(feature = "cli")]
pub mod cli;
pub mod credentials;

pub use credentials::{Credentials, CredentialsFile};
