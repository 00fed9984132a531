//! Download a zipball of every public repository a GitHub user owns.
//!
//! The pipeline is strictly linear: list the user's repositories page by
//! page, then download each repository's archive into a freshly created,
//! timestamped directory.

extern crate chrono;
extern crate failure;
#[macro_use]
extern crate failure_derive;
#[macro_use]
extern crate log;
extern crate reqwest;
extern crate serde;
#[macro_use]
extern crate serde_derive;
extern crate serde_json;
extern crate toml;

#[cfg(test)]
extern crate mockito;
#[cfg(test)]
extern crate tempfile;

pub mod client;
pub mod config;
mod driver;
pub mod errors;
mod export;
mod github;

pub use crate::client::{HttpClient, ReqwestClient};
pub use crate::config::{Config, General, GithubConfig};
pub use crate::driver::{output_dir_name, Driver};
pub use crate::errors::{ExportFailure, FailedRequest, InvalidRepositoryName, InvalidUsername};
pub use crate::export::Exporter;
pub use crate::github::{GitHub, Repository};
