use failure::{Error, ResultExt};
use serde_json::Value;
use std::fmt::{self, Debug, Formatter};
use std::path::{Component, Path};

use crate::client::HttpClient;
use crate::config::GithubConfig;
use crate::errors::InvalidRepositoryName;

/// The bits of a GitHub repository we care about.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Repository {
    pub name: String,
    pub html_url: String,
    #[serde(default)]
    pub default_branch: Option<String>,
}

impl Repository {
    pub fn new<N, U>(name: N, html_url: U) -> Repository
    where
        N: Into<String>,
        U: Into<String>,
    {
        Repository {
            name: name.into(),
            html_url: html_url.into(),
            default_branch: None,
        }
    }

    /// Where to download a zipball of the repository's default branch,
    /// falling back to `fallback_branch` when GitHub didn't tell us what the
    /// default branch is.
    pub fn archive_url(&self, fallback_branch: &str) -> String {
        let branch = match self.default_branch {
            Some(ref branch) if !branch.is_empty() => branch.as_str(),
            _ => fallback_branch,
        };

        format!("{}/zipball/{}/", self.html_url.trim_end_matches('/'), branch)
    }

    /// The name of the archive file this repository is saved as.
    ///
    /// The name must be a single, plain path component so the archive can't
    /// land outside the output directory.
    pub fn archive_name(&self) -> Result<String, InvalidRepositoryName> {
        let mut components = Path::new(&self.name).components();
        let is_plain = match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) => {
                !self.name.contains(|c: char| c == '/' || c == '\\')
            }
            _ => false,
        };

        if is_plain {
            Ok(format!("{}.zip", self.name))
        } else {
            Err(InvalidRepositoryName {
                name: self.name.clone(),
            })
        }
    }
}

/// An interface to the public repositories stored on GitHub.
pub struct GitHub<'a> {
    client: &'a dyn HttpClient,
    cfg: GithubConfig,
}

impl<'a> GitHub<'a> {
    pub fn new(client: &'a dyn HttpClient, cfg: GithubConfig) -> GitHub<'a> {
        GitHub { client, cfg }
    }

    /// Fetch every public repository owned by `username`, one page at a
    /// time.
    ///
    /// Listing stops at the first empty page, at the first page which isn't
    /// a JSON array, or once `max_pages` pages have been requested.
    pub fn list_public_repositories(&self, username: &str) -> Result<Vec<Repository>, Error> {
        debug!("Fetching public repositories for {}", username);

        let mut repos = Vec::new();

        for page in (self.cfg.first_page..).take(self.cfg.max_pages) {
            let url = self.page_url(username, page);
            let body = self
                .client
                .get_json(&url)
                .with_context(|_| format!("Unable to fetch page {} of {}'s repositories", page, username))?;

            let found = match parse_page(body)? {
                Some(found) => found,
                None => {
                    warn!("Page {} of {}'s repositories wasn't a list, stopping", page, username);
                    return Ok(repos);
                }
            };

            trace!("Page {} contained {} repos", page, found.len());

            if found.is_empty() {
                debug!("{} public repos", repos.len());
                return Ok(repos);
            }

            repos.extend(found);
        }

        warn!(
            "Stopped listing {}'s repositories after {} pages, some may be missing",
            username, self.cfg.max_pages
        );
        Ok(repos)
    }

    fn page_url(&self, username: &str, page: usize) -> String {
        format!(
            "{}/users/{}/repos?per_page={}&page={}",
            self.cfg.api_root.trim_end_matches('/'),
            username,
            self.cfg.per_page,
            page
        )
    }
}

impl<'a> Debug for GitHub<'a> {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.debug_struct("GitHub")
            .field("client", &self.client.name())
            .field("cfg", &self.cfg)
            .finish()
    }
}

/// Turn one page of the listing into repositories, returning `None` when the
/// body isn't a list at all (e.g. an error document).
fn parse_page(body: Value) -> Result<Option<Vec<Repository>>, Error> {
    match body {
        Value::Array(items) => {
            let repos = items
                .into_iter()
                .map(serde_json::from_value)
                .collect::<Result<Vec<Repository>, _>>()
                .context("Unable to deserialize response")?;
            Ok(Some(repos))
        }
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::mock::MockClient;
    use crate::errors::FailedRequest;
    use serde_json::json;

    fn page_url(page: usize) -> String {
        format!(
            "https://api.github.com/users/octocat/repos?per_page=100&page={}",
            page
        )
    }

    fn repo_json(name: &str) -> Value {
        json!({
            "id": 1296269,
            "name": name,
            "full_name": format!("octocat/{}", name),
            "html_url": format!("https://github.com/octocat/{}", name),
            "private": false,
        })
    }

    #[test]
    fn archive_url_for_a_repo_without_a_default_branch() {
        let repo = Repository::new("foo", "https://github.com/alice/foo");

        let got = repo.archive_url("master");

        assert_eq!(got, "https://github.com/alice/foo/zipball/master/");
        assert_eq!(repo.archive_name().unwrap(), "foo.zip");
    }

    #[test]
    fn archive_url_prefers_the_default_branch() {
        let mut repo = Repository::new("Spoon-Knife", "https://github.com/octocat/Spoon-Knife");
        repo.default_branch = Some(String::from("main"));

        let got = repo.archive_url("master");

        assert_eq!(got, "https://github.com/octocat/Spoon-Knife/zipball/main/");
    }

    #[test]
    fn archive_names_must_stay_inside_the_output_directory() {
        for name in &["../x", "/etc/passwd", "a/b", "trailing/", "a\\b", "..", ".", ""] {
            let repo = Repository::new(*name, "https://github.com/alice/x");

            let err = repo.archive_name().unwrap_err();

            assert_eq!(err.name, *name);
        }

        let dotted = Repository::new("my.repo", "https://github.com/alice/my.repo");
        assert_eq!(dotted.archive_name().unwrap(), "my.repo.zip");
    }

    #[test]
    fn deserialize_a_listing_entry_and_ignore_extra_fields() {
        let mut raw = repo_json("Hello-World");
        raw["default_branch"] = json!("master");

        let got: Repository = serde_json::from_value(raw).unwrap();

        assert_eq!(got.name, "Hello-World");
        assert_eq!(got.html_url, "https://github.com/octocat/Hello-World");
        assert_eq!(got.default_branch, Some(String::from("master")));
    }

    #[test]
    fn pages_are_concatenated_until_an_empty_one() {
        let client = MockClient::new()
            .with_json(&page_url(1), json!([repo_json("a"), repo_json("b")]))
            .with_json(&page_url(2), json!([repo_json("c")]))
            .with_json(&page_url(3), json!([]))
            .with_json(&page_url(4), json!([repo_json("never-seen")]));
        let gh = GitHub::new(&client, GithubConfig::default());

        let got = gh.list_public_repositories("octocat").unwrap();

        let names: Vec<_> = got.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
        assert_eq!(client.requests(), vec![page_url(1), page_url(2), page_url(3)]);
    }

    #[test]
    fn a_user_without_repositories() {
        let client = MockClient::new().with_json(&page_url(1), json!([]));
        let gh = GitHub::new(&client, GithubConfig::default());

        let got = gh.list_public_repositories("octocat").unwrap();

        assert!(got.is_empty());
    }

    #[test]
    fn stop_at_a_page_which_isnt_a_list() {
        let client = MockClient::new()
            .with_json(&page_url(1), json!([repo_json("a")]))
            .with_json(&page_url(2), json!({"message": "Something went wrong"}));
        let gh = GitHub::new(&client, GithubConfig::default());

        let got = gh.list_public_repositories("octocat").unwrap();

        assert_eq!(got.len(), 1);
        assert_eq!(client.requests().len(), 2);
    }

    #[test]
    fn never_request_more_than_max_pages() {
        let mut cfg = GithubConfig::default();
        cfg.max_pages = 2;
        let client = MockClient::new()
            .with_json(&page_url(1), json!([repo_json("a")]))
            .with_json(&page_url(2), json!([repo_json("b")]))
            .with_json(&page_url(3), json!([repo_json("c")]));
        let gh = GitHub::new(&client, cfg);

        let got = gh.list_public_repositories("octocat").unwrap();

        assert_eq!(got.len(), 2);
        assert_eq!(client.requests(), vec![page_url(1), page_url(2)]);
    }

    #[test]
    fn an_enormous_page_cap_still_stops_at_the_empty_page() {
        let mut cfg = GithubConfig::default();
        cfg.max_pages = usize::MAX;
        let client = MockClient::new()
            .with_json(&page_url(1), json!([repo_json("a")]))
            .with_json(&page_url(2), json!([]));
        let gh = GitHub::new(&client, cfg);

        let got = gh.list_public_repositories("octocat").unwrap();

        assert_eq!(got.len(), 1);
        assert_eq!(client.requests(), vec![page_url(1), page_url(2)]);
    }

    #[test]
    fn failed_requests_abort_the_listing() {
        let client = MockClient::new().with_json(&page_url(1), json!([repo_json("a")]));
        let gh = GitHub::new(&client, GithubConfig::default());

        let err = gh.list_public_repositories("octocat").unwrap_err();

        let failed = err
            .iter_chain()
            .filter_map(|cause| cause.downcast_ref::<FailedRequest>())
            .next()
            .unwrap();
        assert_eq!(failed.url, page_url(2));
    }

    #[test]
    fn malformed_entries_are_an_error() {
        let client = MockClient::new().with_json(&page_url(1), json!([{"id": 42}]));
        let gh = GitHub::new(&client, GithubConfig::default());

        assert!(gh.list_public_repositories("octocat").is_err());
    }

    #[test]
    fn honour_a_custom_api_root_and_page_size() {
        let mut cfg = GithubConfig::default();
        cfg.api_root = String::from("http://localhost:8080/");
        cfg.per_page = 5;
        let url = "http://localhost:8080/users/octocat/repos?per_page=5&page=1";
        let client = MockClient::new().with_json(url, json!([]));
        let gh = GitHub::new(&client, cfg);

        gh.list_public_repositories("octocat").unwrap();

        assert_eq!(client.requests(), vec![url.to_string()]);
    }
}
