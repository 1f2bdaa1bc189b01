use std::fmt;

#[derive(Debug, Clone)]
pub enum ShortieError {
    StorageConfig(String),
    StorageOperation(String),
    StorageTimeout(String),
    Serialization(String),
    FileOperation(String),
    Validation(String),
    IdSpaceExhausted(String),
}

impl ShortieError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            ShortieError::StorageConfig(_) => "E001",
            ShortieError::StorageOperation(_) => "E002",
            ShortieError::StorageTimeout(_) => "E003",
            ShortieError::Serialization(_) => "E004",
            ShortieError::FileOperation(_) => "E005",
            ShortieError::Validation(_) => "E006",
            ShortieError::IdSpaceExhausted(_) => "E007",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            ShortieError::StorageConfig(_) => "Storage Configuration Error",
            ShortieError::StorageOperation(_) => "Storage Operation Error",
            ShortieError::StorageTimeout(_) => "Storage Timeout",
            ShortieError::Serialization(_) => "Serialization Error",
            ShortieError::FileOperation(_) => "File Operation Error",
            ShortieError::Validation(_) => "Validation Error",
            ShortieError::IdSpaceExhausted(_) => "Identifier Space Exhausted",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> &str {
        match self {
            ShortieError::StorageConfig(msg) => msg,
            ShortieError::StorageOperation(msg) => msg,
            ShortieError::StorageTimeout(msg) => msg,
            ShortieError::Serialization(msg) => msg,
            ShortieError::FileOperation(msg) => msg,
            ShortieError::Validation(msg) => msg,
            ShortieError::IdSpaceExhausted(msg) => msg,
        }
    }

    /// 是否为存储后端失败（唯一允许穿过存储契约的错误类别）
    pub fn is_backend_failure(&self) -> bool {
        matches!(
            self,
            ShortieError::StorageOperation(_)
                | ShortieError::StorageTimeout(_)
                | ShortieError::Serialization(_)
        )
    }

    /// 格式化为彩色输出（用于 Server 模式）
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        format!(
            "{} {} {}\n  {}",
            "[ERROR]".red().bold(),
            self.code().yellow(),
            self.error_type().red(),
            self.message().white()
        )
    }

    /// 格式化为简洁输出（用于 CLI 模式）
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for ShortieError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // 默认使用简洁格式
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for ShortieError {}

// 便捷的构造函数
impl ShortieError {
    pub fn storage_config<T: Into<String>>(msg: T) -> Self {
        ShortieError::StorageConfig(msg.into())
    }

    pub fn storage_operation<T: Into<String>>(msg: T) -> Self {
        ShortieError::StorageOperation(msg.into())
    }

    pub fn storage_timeout<T: Into<String>>(msg: T) -> Self {
        ShortieError::StorageTimeout(msg.into())
    }

    pub fn serialization<T: Into<String>>(msg: T) -> Self {
        ShortieError::Serialization(msg.into())
    }

    pub fn file_operation<T: Into<String>>(msg: T) -> Self {
        ShortieError::FileOperation(msg.into())
    }

    pub fn validation<T: Into<String>>(msg: T) -> Self {
        ShortieError::Validation(msg.into())
    }

    pub fn id_space_exhausted<T: Into<String>>(msg: T) -> Self {
        ShortieError::IdSpaceExhausted(msg.into())
    }
}

// 为常见的错误类型实现 From trait
impl From<std::io::Error> for ShortieError {
    fn from(err: std::io::Error) -> Self {
        ShortieError::FileOperation(err.to_string())
    }
}

impl From<serde_json::Error> for ShortieError {
    fn from(err: serde_json::Error) -> Self {
        ShortieError::Serialization(err.to_string())
    }
}

impl From<tokio::time::error::Elapsed> for ShortieError {
    fn from(err: tokio::time::error::Elapsed) -> Self {
        ShortieError::StorageTimeout(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ShortieError>;
