use crate::adapters::auth::DEFAULT_AUTH_ENDPOINT;
use crate::core::{ConfigProvider, SortMode, VisibleWindow};
use crate::utils::error::{CatalogError, Result};
use crate::utils::validation::Validate;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_STATE_DIR: &str = "./.psy-catalog";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 10;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub listing: ListingConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Document store root; without it the built-in catalog is used.
    pub database_url: Option<String>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    pub api_key: Option<String>,
    pub endpoint: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListingConfig {
    pub initial_count: Option<usize>,
    pub page_step: Option<usize>,
    pub default_sort: Option<SortMode>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    pub state_dir: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: Option<String>,
    pub json: Option<bool>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(CatalogError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);
        Ok(toml::from_str(&processed_content)?)
    }

    /// 替換環境變數 (例如 ${API_KEY})，未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> String {
        use regex::Regex;
        use std::sync::OnceLock;

        static ENV_VAR: OnceLock<Regex> = OnceLock::new();
        let re = ENV_VAR.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").unwrap());

        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .to_string()
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        if let Some(url) = &self.source.database_url {
            crate::utils::validation::validate_url("source.database_url", url)?;
        }

        if let Some(endpoint) = &self.auth.endpoint {
            crate::utils::validation::validate_url("auth.endpoint", endpoint)?;
        }

        if let Some(api_key) = &self.auth.api_key {
            crate::utils::validation::validate_non_empty_string("auth.api_key", api_key)?;
        }

        if let Some(timeout) = self.source.timeout_seconds {
            crate::utils::validation::validate_positive_number(
                "source.timeout_seconds",
                timeout as usize,
                1,
            )?;
        }

        if let Some(step) = self.listing.page_step {
            crate::utils::validation::validate_positive_number("listing.page_step", step, 1)?;
        }

        if let Some(count) = self.listing.initial_count {
            crate::utils::validation::validate_positive_number("listing.initial_count", count, 1)?;
        }

        crate::utils::validation::validate_path("storage.state_dir", self.state_dir())?;

        Ok(())
    }

    pub fn json_logs(&self) -> bool {
        self.logging.json.unwrap_or(false)
    }

    pub fn log_level(&self) -> Option<&str> {
        self.logging.level.as_deref()
    }
}

impl ConfigProvider for TomlConfig {
    fn database_url(&self) -> Option<&str> {
        self.source.database_url.as_deref()
    }

    fn api_key(&self) -> Option<&str> {
        self.auth.api_key.as_deref()
    }

    fn auth_endpoint(&self) -> &str {
        self.auth.endpoint.as_deref().unwrap_or(DEFAULT_AUTH_ENDPOINT)
    }

    fn request_timeout_seconds(&self) -> u64 {
        self.source.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECONDS)
    }

    fn initial_count(&self) -> usize {
        self.listing
            .initial_count
            .unwrap_or(VisibleWindow::INITIAL_COUNT)
    }

    fn page_step(&self) -> usize {
        self.listing.page_step.unwrap_or(VisibleWindow::STEP)
    }

    fn default_sort(&self) -> SortMode {
        self.listing.default_sort.unwrap_or_default()
    }

    fn state_dir(&self) -> &str {
        self.storage.state_dir.as_deref().unwrap_or(DEFAULT_STATE_DIR)
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
