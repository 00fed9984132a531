//! Access to the forge over HTTP.

use failure::{Error, ResultExt};
use reqwest::blocking::{Client, Response};
use reqwest::header::{HeaderValue, ACCEPT};
use serde_json::Value;
use std::fmt::{self, Debug, Formatter};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::GithubConfig;
use crate::errors::FailedRequest;

const GITHUB_JSON: &str = "application/vnd.github.v3+json";

/// Everything the rest of the crate needs from an HTTP library.
pub trait HttpClient {
    /// A short name used when logging which client is in use.
    fn name(&self) -> &str;

    /// Send a `GET` request and parse the response body as JSON.
    fn get_json(&self, url: &str) -> Result<Value, Error>;

    /// Send a `GET` request and save the response body to `dest`.
    ///
    /// Nothing is written unless the server responds successfully.
    fn download(&self, url: &str, dest: &Path) -> Result<(), Error>;
}

/// A `HttpClient` backed by `reqwest`'s blocking client.
#[derive(Clone)]
pub struct ReqwestClient {
    inner: Client,
}

impl ReqwestClient {
    pub fn new(cfg: &GithubConfig) -> Result<ReqwestClient, Error> {
        let mut builder = Client::builder().user_agent(cfg.user_agent.as_str());

        if let Some(secs) = cfg.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        let inner = builder.build().context("Unable to create the HTTP client")?;

        Ok(ReqwestClient { inner })
    }

    fn send(&self, url: &str, accept: Option<&'static str>) -> Result<Response, Error> {
        debug!("Sending request to {:?}", url);

        let mut request = self.inner.get(url);
        if let Some(mime) = accept {
            request = request.header(ACCEPT, HeaderValue::from_static(mime));
        }

        let response = request.send().context("Unable to send request")?;
        let status = response.status();
        debug!("Received response ({})", status);

        if log_enabled!(log::Level::Trace) {
            for line in format!("Response Headers {:#?}", response.headers()).lines() {
                trace!("{}", line);
            }
        }

        if !status.is_success() {
            warn!("Request to {} failed with {}", url, status);

            let err = FailedRequest {
                status,
                url: url.to_string(),
            };
            return Err(err.into());
        }

        Ok(response)
    }
}

impl HttpClient for ReqwestClient {
    fn name(&self) -> &str {
        "reqwest"
    }

    fn get_json(&self, url: &str) -> Result<Value, Error> {
        let response = self.send(url, Some(GITHUB_JSON))?;
        let body: Value = response.json().context("Unable to parse the response as JSON")?;

        Ok(body)
    }

    fn download(&self, url: &str, dest: &Path) -> Result<(), Error> {
        let mut response = self.send(url, None)?;

        let partial = partial_path(dest);
        let written = File::create(&partial)
            .with_context(|_| format!("Unable to create {}", partial.display()))
            .map_err(Error::from)
            .and_then(|mut f| {
                response
                    .copy_to(&mut f)
                    .context("Unable to save the response body")
                    .map_err(Error::from)
            });

        match written {
            Ok(bytes) => {
                debug!("Wrote {} bytes to {}", bytes, dest.display());
                fs::rename(&partial, dest)
                    .with_context(|_| format!("Unable to move the archive to {}", dest.display()))?;
                Ok(())
            }
            Err(e) => {
                let _ = fs::remove_file(&partial);
                Err(e)
            }
        }
    }
}

impl Debug for ReqwestClient {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.debug_struct("ReqwestClient").finish()
    }
}

/// Where a download is streamed to before it's complete.
fn partial_path(dest: &Path) -> PathBuf {
    let mut name = dest
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".part");
    dest.with_file_name(name)
}
