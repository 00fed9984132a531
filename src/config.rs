use failure::{Error, ResultExt};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: General,
    pub github: GithubConfig,
}

impl Config {
    /// Load a `Config` from some file on disk.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Config, Error> {
        let path = path.as_ref();
        debug!("Reading config from {}", path.display());

        let content = fs::read_to_string(path)
            .with_context(|_| format!("Unable to read {}", path.display()))?;
        let cfg = toml::from_str(&content).context("Invalid config file")?;

        Ok(cfg)
    }

    /// Generate an example config.
    pub fn example() -> Config {
        let mut cfg = Config::default();
        cfg.general.dest_dir = PathBuf::from("/srv/archives");
        cfg.github.timeout_secs = Some(300);
        cfg
    }

    /// Serialize the `Config` as TOML.
    pub fn as_toml(&self) -> String {
        match toml::to_string_pretty(self) {
            Ok(s) => s,
            Err(e) => {
                panic!(
                    "Serializing a Config should never fail. {} {:#?}",
                    e, self
                );
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct General {
    /// The directory each run's output directory is created in.
    pub dest_dir: PathBuf,
}

impl Default for General {
    fn default() -> General {
        General {
            dest_dir: PathBuf::from("."),
        }
    }
}

/// Settings for talking to the GitHub API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct GithubConfig {
    pub api_root: String,
    pub user_agent: String,
    /// How many repositories to ask for in each listing request.
    pub per_page: usize,
    /// The index of the first page. GitHub pages start at 1.
    pub first_page: usize,
    /// The maximum number of listing requests made for a single user.
    pub max_pages: usize,
    /// The branch to archive when a repository doesn't report its default
    /// branch.
    pub fallback_branch: String,
    /// Request timeout in seconds, if `None` the HTTP client's default is
    /// used.
    pub timeout_secs: Option<u64>,
}

impl GithubConfig {
    pub const DEFAULT_API_ROOT: &'static str = "https://api.github.com";
    pub const DEFAULT_AGENT: &'static str = "zipball-backup";
}

impl Default for GithubConfig {
    fn default() -> GithubConfig {
        GithubConfig {
            api_root: GithubConfig::DEFAULT_API_ROOT.to_string(),
            user_agent: GithubConfig::DEFAULT_AGENT.to_string(),
            per_page: 100,
            first_page: 1,
            max_pages: 100,
            fallback_branch: String::from("master"),
            timeout_secs: None,
        }
    }
}
