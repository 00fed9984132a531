use failure::{Error, ResultExt};
use std::fmt::{self, Debug, Formatter};
use std::path::Path;

use crate::client::HttpClient;
use crate::errors::ExportFailure;
use crate::github::Repository;

/// Downloads repository archives, one at a time.
pub struct Exporter<'a> {
    client: &'a dyn HttpClient,
    fallback_branch: String,
}

impl<'a> Exporter<'a> {
    pub fn new<S: Into<String>>(client: &'a dyn HttpClient, fallback_branch: S) -> Exporter<'a> {
        Exporter {
            client,
            fallback_branch: fallback_branch.into(),
        }
    }

    /// Save a zipball of each repository in `directory`.
    ///
    /// A failed download doesn't stop the export, every failure is collected
    /// and handed back once all repositories have been tried.
    pub fn export_all(&self, repos: &[Repository], directory: &Path) -> Result<(), ExportFailure> {
        let mut failures = Vec::new();

        for repo in repos {
            if let Err(e) = self.export(repo, directory) {
                warn!("Saving {} failed, {}", repo.name, e);
                failures.push((repo.clone(), e));
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(ExportFailure { failures })
        }
    }

    fn export(&self, repo: &Repository, directory: &Path) -> Result<(), Error> {
        info!("Saving repository {} to {}", repo.name, directory.display());

        let url = repo.archive_url(&self.fallback_branch);
        let dest = directory.join(repo.archive_name()?);
        debug!("Downloading {} into {}", url, dest.display());

        self.client
            .download(&url, &dest)
            .context("Download failed")?;

        Ok(())
    }
}

impl<'a> Debug for Exporter<'a> {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.debug_struct("Exporter")
            .field("client", &self.client.name())
            .field("fallback_branch", &self.fallback_branch)
            .finish()
    }
}
