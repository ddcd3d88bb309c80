use thiserror::Error;

pub const TABLE_ENV: &str = "ZOMBIE_BOSS_TABLE";
pub const PRE_REGISTER_TABLE_ENV: &str = "ZOMBIE_BOSS_PRE_REGISTER_TABLE";
pub const REGION_ENV: &str = "ZOMBIE_BOSS_REGION";
pub const BASE_PATH_ENV: &str = "ZOMBIE_BOSS_BASE_PATH";
pub const DYNAMODB_ENDPOINT_ENV: &str = "DYNAMODB_ENDPOINT_URL";

pub const DEFAULT_REGION: &str = "ap-northeast-2";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{0} must be configured")]
    Missing(&'static str),
}

/// Settings resolved once per cold start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub table_name: String,
    pub pre_register_table_name: String,
    pub region: String,
    /// Leading path segment (for example an API Gateway stage) stripped before routing.
    pub base_path: Option<String>,
    pub dynamodb_endpoint: Option<String>,
}

impl ApiConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let value = |key: &str| {
            lookup(key)
                .map(|raw| raw.trim().to_string())
                .filter(|raw| !raw.is_empty())
        };
        let required = |key: &'static str| value(key).ok_or(ConfigError::Missing(key));

        Ok(Self {
            table_name: required(TABLE_ENV)?,
            pre_register_table_name: required(PRE_REGISTER_TABLE_ENV)?,
            region: value(REGION_ENV).unwrap_or_else(|| DEFAULT_REGION.to_string()),
            base_path: value(BASE_PATH_ENV),
            dynamodb_endpoint: value(DYNAMODB_ENDPOINT_ENV),
        })
    }
}
