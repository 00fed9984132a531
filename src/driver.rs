use chrono::{Local, NaiveDateTime};
use failure::{Error, ResultExt};
use std::fs;
use std::path::PathBuf;

use crate::client::HttpClient;
use crate::config::Config;
use crate::errors::InvalidUsername;
use crate::export::Exporter;
use crate::github::{GitHub, Repository};

/// The name of the directory a run's archives are saved in, e.g.
/// `bob-Date_2024-03-05-Time_14-07-22`.
pub fn output_dir_name(username: &str, timestamp: &NaiveDateTime) -> String {
    format!(
        "{}-Date_{}-Time_{}",
        username,
        timestamp.format("%Y-%m-%d"),
        timestamp.format("%H-%M-%S")
    )
}

/// Runs a single export from start to finish.
#[derive(Debug)]
pub struct Driver<C> {
    config: Config,
    client: C,
}

impl<C: HttpClient> Driver<C> {
    pub fn new(config: Config, client: C) -> Driver<C> {
        Driver { config, client }
    }

    /// Export all of `username`'s public repositories into a new directory
    /// named after the current local time.
    pub fn run(&self, username: &str) -> Result<PathBuf, Error> {
        self.run_at(username, Local::now().naive_local())
    }

    /// Export all of `username`'s public repositories, naming the output
    /// directory after `timestamp`.
    ///
    /// If any archives couldn't be downloaded the run still finishes, and
    /// the returned error is an `ExportFailure` listing them.
    pub fn run_at(&self, username: &str, timestamp: NaiveDateTime) -> Result<PathBuf, Error> {
        validate_username(username)?;
        info!("Http client: {}", self.client.name());

        let target = self
            .config
            .general
            .dest_dir
            .join(output_dir_name(username, &timestamp));

        if !target.exists() {
            info!("Creating directory {}", target.display());
            fs::create_dir_all(&target).with_context(|_| {
                format!("Couldn't create the target directory ({})", target.display())
            })?;
        }
        info!(
            "Saving zipball archives in following directory: {}",
            target.display()
        );

        let github = GitHub::new(&self.client, self.config.github.clone());
        let repos = github
            .list_public_repositories(username)
            .context("Unable to fetch repositories")?;
        print_received_repositories(&repos);

        let exporter = Exporter::new(&self.client, self.config.github.fallback_branch.as_str());
        let outcome = exporter.export_all(&repos, &target);
        info!("Completed");

        outcome?;
        Ok(target)
    }
}

fn print_received_repositories(repos: &[Repository]) {
    info!("Got public repositories: ");
    for repo in repos {
        info!("Public repository: {}", repo.name);
    }
}

fn validate_username(username: &str) -> Result<(), InvalidUsername> {
    if username.is_empty() || username.contains(|c: char| c == '/' || c == '\\') {
        Err(InvalidUsername {
            username: username.to_string(),
        })
    } else {
        Ok(())
    }
}
