use crate::core::ConfigProvider;
use crate::utils::error::{Result, StorefrontError};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";
const DEFAULT_REQUEST_TIMEOUT_SECONDS: u64 = 10;
const DEFAULT_SUBMISSION_TIMEOUT_SECONDS: u64 = 30;
const DEFAULT_CURRENCY: &str = "SAR";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorefrontConfig {
    pub api: ApiConfig,
    #[serde(default)]
    pub submission: SubmissionConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_seconds: Option<u64>,
    pub auth_token: Option<String>,
    pub headers: Option<HashMap<String, String>>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_seconds: None,
            auth_token: None,
            headers: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubmissionConfig {
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DisplayConfig {
    pub currency: Option<String>,
}

impl StorefrontConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(StorefrontError::Io)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| StorefrontError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${STOREFRONT_TOKEN})，未定義的保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| StorefrontError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_url("api.base_url", &self.api.base_url)?;

        if let Some(timeout) = self.api.timeout_seconds {
            validation::validate_positive_number("api.timeout_seconds", timeout, 1)?;
        }
        if let Some(timeout) = self.submission.timeout_seconds {
            validation::validate_positive_number("submission.timeout_seconds", timeout, 1)?;
        }
        if let Some(token) = &self.api.auth_token {
            validation::validate_non_empty_string("api.auth_token", token)?;
            // Placeholder survived substitution: the variable is not set.
            if token.starts_with("${") && token.ends_with('}') {
                return Err(StorefrontError::MissingConfigError {
                    field: format!("api.auth_token ({})", &token[2..token.len() - 1]),
                });
            }
        }
        if let Some(headers) = &self.api.headers {
            for (name, value) in headers {
                validation::validate_header("api.headers", name, value)?;
            }
        }
        validation::validate_non_empty_string("display.currency", self.currency())?;

        Ok(())
    }

    pub fn currency(&self) -> &str {
        self.display.currency.as_deref().unwrap_or(DEFAULT_CURRENCY)
    }
}

impl ConfigProvider for StorefrontConfig {
    fn api_base_url(&self) -> &str {
        self.api.base_url.trim_end_matches('/')
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_secs(
            self.api
                .timeout_seconds
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECONDS),
        )
    }

    fn submission_timeout(&self) -> Duration {
        Duration::from_secs(
            self.submission
                .timeout_seconds
                .unwrap_or(DEFAULT_SUBMISSION_TIMEOUT_SECONDS),
        )
    }

    fn auth_token(&self) -> Option<&str> {
        self.api.auth_token.as_deref()
    }

    fn extra_headers(&self) -> Option<&HashMap<String, String>> {
        self.api.headers.as_ref()
    }

    fn currency(&self) -> &str {
        StorefrontConfig::currency(self)
    }
}

impl Validate for StorefrontConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
