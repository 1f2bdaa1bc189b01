use serde::{Deserialize, Serialize};

use crate::errors::{Result, ShortieError};
use crate::utils::MAX_ID_LENGTH;

/// 旧版部署通过该环境变量启用 DynamoDB 后端
pub const LEGACY_DYNAMO_ENDPOINT_ENV: &str = "AWS_CUSTOM_DYNAMO_ENDPOINT";

/// 静态配置（从 TOML 加载，启动时使用）
///
/// 包含：
/// - server: 服务器地址、端口、CPU 数量、对外短链前缀
/// - storage: 存储后端选择与超时
/// - id: 短 ID 长度与冲突扩展策略
/// - logging: 日志配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StaticConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub id: IdConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl StaticConfig {
    /// 从 TOML 文件和环境变量加载配置
    ///
    /// 优先级：ENV > config.toml > 默认值
    /// ENV 前缀：SHORTIE，分隔符：__
    /// 示例：SHORTIE__SERVER__PORT=9999
    pub fn load_from(path: &str) -> Self {
        use config::{Config, Environment, File};

        let builder = Config::builder()
            // 1. 从 TOML 文件加载（可选）
            .add_source(File::with_name(path).required(false))
            // 2. 从环境变量覆盖，前缀 SHORTIE，分隔符 __
            .add_source(
                Environment::with_prefix("SHORTIE")
                    .separator("__")
                    .try_parsing(true),
            );

        match builder.build() {
            Ok(settings) => match settings.try_deserialize::<StaticConfig>() {
                Ok(config) => {
                    if std::path::Path::new(path).exists() {
                        eprintln!("[INFO] Configuration loaded from: {}", path);
                    }
                    config
                }
                Err(e) => {
                    eprintln!("[ERROR] Failed to deserialize config: {}", e);
                    Self::default()
                }
            },
            Err(e) => {
                eprintln!("[ERROR] Failed to build config: {}", e);
                Self::default()
            }
        }
    }

    /// 启动前校验配置
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(ShortieError::validation("server.port must not be 0"));
        }
        if self.id.length == 0 || self.id.length > MAX_ID_LENGTH {
            return Err(ShortieError::validation(format!(
                "id.length must be within 1..={}, got {}",
                MAX_ID_LENGTH, self.id.length
            )));
        }
        if self.id.max_length < self.id.length || self.id.max_length > MAX_ID_LENGTH {
            return Err(ShortieError::validation(format!(
                "id.max_length must be within {}..={}, got {}",
                self.id.length, MAX_ID_LENGTH, self.id.max_length
            )));
        }
        if self.id.extend_step == 0 {
            return Err(ShortieError::validation("id.extend_step must not be 0"));
        }
        if self.storage.resolve_backend() == StorageBackend::Dynamodb
            && self.storage.dynamodb.table_name.is_empty()
        {
            return Err(ShortieError::validation(
                "storage.dynamodb.table_name must not be empty",
            ));
        }
        Ok(())
    }

    /// 保存配置到 TOML 文件
    pub fn save_to_file<P: AsRef<std::path::Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ShortieError::serialization(e.to_string()))?;

        if let Some(parent) = path.as_ref().parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }
}

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_host")]
    pub host: String,
    #[serde(default = "default_server_port")]
    pub port: u16,
    #[serde(default = "default_cpu_count")]
    pub cpu_count: usize,
    /// 返回给客户端的短链前缀
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
}

/// 存储后端类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Memory,
    Dynamodb,
}

impl std::fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Memory => write!(f, "memory"),
            Self::Dynamodb => write!(f, "dynamodb"),
        }
    }
}

/// 存储配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// 未设置时：存在 `AWS_CUSTOM_DYNAMO_ENDPOINT` 则使用 dynamodb，否则 memory
    #[serde(default)]
    pub backend: Option<StorageBackend>,
    /// 单次存储调用（同步部分）的超时
    #[serde(default = "default_operation_timeout_ms")]
    pub operation_timeout_ms: u64,
    /// 关闭时等待后台计数任务的最长时间
    #[serde(default = "default_shutdown_drain_secs")]
    pub shutdown_drain_secs: u64,
    #[serde(default)]
    pub dynamodb: DynamoDbConfig,
}

impl StorageConfig {
    pub fn resolve_backend(&self) -> StorageBackend {
        if let Some(backend) = self.backend {
            return backend;
        }
        match std::env::var(LEGACY_DYNAMO_ENDPOINT_ENV) {
            Ok(endpoint) if !endpoint.is_empty() => StorageBackend::Dynamodb,
            _ => StorageBackend::Memory,
        }
    }
}

/// DynamoDB 配置
///
/// region / 凭证未配置时交给 AWS SDK 的默认链（AWS_REGION、AWS_ACCESS_KEY_ID 等）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DynamoDbConfig {
    #[serde(default = "default_table_name")]
    pub table_name: String,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub access_key_id: Option<String>,
    #[serde(default)]
    pub secret_access_key: Option<String>,
}

impl DynamoDbConfig {
    /// 显式配置优先，其次是旧版环境变量
    pub fn resolve_endpoint(&self) -> Option<String> {
        self.endpoint
            .clone()
            .filter(|e| !e.is_empty())
            .or_else(|| {
                std::env::var(LEGACY_DYNAMO_ENDPOINT_ENV)
                    .ok()
                    .filter(|e| !e.is_empty())
            })
    }
}

/// 短 ID 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdConfig {
    #[serde(default = "default_id_length")]
    pub length: usize,
    /// 冲突时最多扩展到的长度
    #[serde(default = "default_id_max_length")]
    pub max_length: usize,
    /// 每次冲突增加的字符数
    #[serde(default = "default_id_extend_step")]
    pub extend_step: usize,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default = "default_log_file")]
    pub file: Option<String>,
    #[serde(default = "default_max_backups")]
    pub max_backups: u32,
    #[serde(default = "default_enable_rotation")]
    pub enable_rotation: bool,
}

// ============================================================
// Default value functions for static config
// ============================================================

fn default_server_host() -> String {
    "0.0.0.0".to_string()
}

fn default_server_port() -> u16 {
    8421
}

fn default_cpu_count() -> usize {
    num_cpus::get()
}

fn default_public_base_url() -> String {
    "http://localhost:8421".to_string()
}

fn default_operation_timeout_ms() -> u64 {
    5000
}

fn default_shutdown_drain_secs() -> u64 {
    5
}

fn default_table_name() -> String {
    "shortie-urls".to_string()
}

fn default_id_length() -> usize {
    10
}

fn default_id_max_length() -> usize {
    MAX_ID_LENGTH
}

fn default_id_extend_step() -> usize {
    2
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_log_file() -> Option<String> {
    None
}

fn default_max_backups() -> u32 {
    5
}

fn default_enable_rotation() -> bool {
    true
}

// ============================================================
// Default implementations
// ============================================================

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
            cpu_count: default_cpu_count(),
            public_base_url: default_public_base_url(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: None,
            operation_timeout_ms: default_operation_timeout_ms(),
            shutdown_drain_secs: default_shutdown_drain_secs(),
            dynamodb: DynamoDbConfig::default(),
        }
    }
}

impl Default for DynamoDbConfig {
    fn default() -> Self {
        Self {
            table_name: default_table_name(),
            region: None,
            endpoint: None,
            access_key_id: None,
            secret_access_key: None,
        }
    }
}

impl Default for IdConfig {
    fn default() -> Self {
        Self {
            length: default_id_length(),
            max_length: default_id_max_length(),
            extend_step: default_id_extend_step(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: default_log_file(),
            max_backups: default_max_backups(),
            enable_rotation: default_enable_rotation(),
        }
    }
}
