//! Configuration model loaded from external sources.

use config::{Config, ConfigError, Environment, File, FileFormat, Map};
use serde::Deserialize;

use crate::pagination::DEFAULT_ITEMS_PER_PAGE;

pub const DEFAULT_PAGE_SIZE: usize = DEFAULT_ITEMS_PER_PAGE;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Clone, Debug, Deserialize)]
/// Settings shared by the list views of the application.
pub struct ClientConfig {
    /// Base URL of the remote REST API, e.g. `https://api.example.com/v1`.
    pub api_base_url: String,
    #[serde(default = "default_page_size")]
    pub default_page_size: usize,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Token forwarded as `Authorization: Bearer …` when present.
    #[serde(default)]
    pub bearer_token: Option<String>,
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

impl ClientConfig {
    /// Loads the YAML file at `path` (optional), then `CASE_DESK__*` variables.
    ///
    /// A `.env` file in the working directory is read first when present.
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Self::load_with_env(path, None)
    }

    /// Like [`load`](Self::load) but reads variables from `env` instead of
    /// the process environment when given.
    fn load_with_env(path: &str, env: Option<Map<String, String>>) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::new(path, FileFormat::Yaml).required(false))
            .add_source(
                Environment::with_prefix("CASE_DESK")
                    .prefix_separator("__")
                    .separator("__")
                    .source(env),
            )
            .build()?
            .try_deserialize()
    }

    /// Joins `resource_path` onto the API base URL.
    pub fn endpoint(&self, resource_path: &str) -> String {
        format!(
            "{}/{}",
            self.api_base_url.trim_end_matches('/'),
            resource_path.trim_start_matches('/')
        )
    }
}
