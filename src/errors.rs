//! The errors encountered in this crate.

use failure::Error;
use reqwest::StatusCode;
use std::io::Write;

use crate::github::Repository;

/// The server responded with a non-successful status code.
#[derive(Debug, Clone, PartialEq, Fail)]
#[fail(display = "Request failed with {}", status)]
pub struct FailedRequest {
    pub status: StatusCode,
    pub url: String,
}

/// The username can't be used to name the output directory.
#[derive(Debug, Clone, PartialEq, Fail)]
#[fail(display = "\"{}\" isn't a valid username", username)]
pub struct InvalidUsername {
    pub username: String,
}

/// A repository name which can't be used as a file name inside the output
/// directory.
#[derive(Debug, Clone, PartialEq, Fail)]
#[fail(display = "\"{}\" can't be used as an archive name", name)]
pub struct InvalidRepositoryName {
    pub name: String,
}

/// One or more archives couldn't be downloaded.
#[derive(Debug, Fail)]
#[fail(display = "One or more errors encountered while exporting repositories")]
pub struct ExportFailure {
    pub failures: Vec<(Repository, Error)>,
}

impl ExportFailure {
    pub fn display<W: Write>(&self, writer: &mut W) -> Result<(), Error> {
        writeln!(
            writer,
            "There were {} errors exporting repositories",
            self.failures.len()
        )?;

        for &(ref repo, ref err) in &self.failures {
            writeln!(writer, "Error: {} failed with {}", repo.name, err)?;
            for cause in err.iter_causes() {
                writeln!(writer, "\tCaused By: {}", cause)?;
            }
        }

        Ok(())
    }
}
