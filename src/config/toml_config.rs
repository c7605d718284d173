use crate::utils::error::{AppError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_path, validate_positive_number, validate_range,
    validate_url, Validate,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub server: ServerSection,
    pub database: DatabaseConfig,
    pub storage: StorageConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSection {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:3000".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite 檔案路徑，`:memory:` 為記憶體資料庫
    pub path: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Local,
    Memory,
    S3,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    #[serde(default = "default_projects_bucket")]
    pub projects_bucket: String,
    #[serde(default = "default_team_bucket")]
    pub team_bucket: String,
    pub public_base_url: String,
    pub local_root: Option<String>,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>,
}

fn default_projects_bucket() -> String {
    "projects".to_string()
}

fn default_team_bucket() -> String {
    "team".to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    #[default]
    Production,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyKind {
    #[default]
    AllowList,
    AlwaysAllow,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default)]
    pub environment: Environment,
    #[serde(default)]
    pub policy: PolicyKind,
    #[serde(default)]
    pub allow_list: Vec<String>,
    #[serde(default = "default_session_header")]
    pub session_header: String,
}

fn default_session_header() -> String {
    crate::adapters::session::DEFAULT_SESSION_HEADER.to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_ttl_seconds")]
    pub ttl_seconds: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: default_ttl_seconds(),
        }
    }
}

fn default_ttl_seconds() -> u64 {
    24 * 60 * 60
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub format: LogFormat,
}

impl ServerConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(AppError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| AppError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${S3_BUCKET})，未設定的保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| AppError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        self.server
            .bind
            .parse::<SocketAddr>()
            .map_err(|e| AppError::InvalidConfigValueError {
                field: "server.bind".to_string(),
                value: self.server.bind.clone(),
                reason: e.to_string(),
            })?;

        validate_path("database.path", &self.database.path)?;

        validate_url("storage.public_base_url", &self.storage.public_base_url)?;
        validate_non_empty_string("storage.projects_bucket", &self.storage.projects_bucket)?;
        validate_non_empty_string("storage.team_bucket", &self.storage.team_bucket)?;
        match self.storage.backend {
            StorageBackend::Local => {
                let root = self.storage.local_root.as_deref().ok_or_else(|| {
                    AppError::MissingConfigError {
                        field: "storage.local_root".to_string(),
                    }
                })?;
                validate_path("storage.local_root", root)?;
            }
            StorageBackend::S3 => {
                let region = self.storage.s3_region.as_deref().ok_or_else(|| {
                    AppError::MissingConfigError {
                        field: "storage.s3_region".to_string(),
                    }
                })?;
                validate_non_empty_string("storage.s3_region", region)?;
                if let Some(endpoint) = &self.storage.s3_endpoint {
                    validate_url("storage.s3_endpoint", endpoint)?;
                }
            }
            StorageBackend::Memory => {}
        }

        validate_non_empty_string("auth.session_header", &self.auth.session_header)?;
        match self.auth.policy {
            PolicyKind::AllowList => {
                if self.auth.allow_list.is_empty() {
                    return Err(AppError::MissingConfigError {
                        field: "auth.allow_list".to_string(),
                    });
                }
                for email in &self.auth.allow_list {
                    if !email.contains('@') {
                        return Err(AppError::InvalidConfigValueError {
                            field: "auth.allow_list".to_string(),
                            value: email.clone(),
                            reason: "Entries must be email addresses".to_string(),
                        });
                    }
                }
            }
            PolicyKind::AlwaysAllow => {
                // 放行策略會移除所有存取控制，正式環境一律拒絕啟動
                if self.auth.environment == Environment::Production {
                    return Err(AppError::InvalidConfigValueError {
                        field: "auth.policy".to_string(),
                        value: "always_allow".to_string(),
                        reason: "always_allow is only permitted when auth.environment = \"development\""
                            .to_string(),
                    });
                }
            }
        }

        validate_positive_number("cache.ttl_seconds", self.cache.ttl_seconds, 1)?;
        validate_range("cache.ttl_seconds", self.cache.ttl_seconds, 1, 7 * 24 * 60 * 60)?;

        Ok(())
    }
}

impl Validate for ServerConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
