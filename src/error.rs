use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum GenError {
    #[error("api not found: {0}")]
    ApiNotFound(String),

    #[error("config file already exists: {}", .0.display())]
    ConfigAlreadyExists(PathBuf),

    #[error("failed to read config file {}: {source}", path.display())]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {}: {source}", path.display())]
    ConfigParse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("failed to read payload {}: {source}", path.display())]
    PayloadRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("discovery failed: {0}")]
    Discovery(String),

    #[error("invalid openapi spec:\n{}", .0.join("\n"))]
    InvalidSpec(Vec<String>),

    #[error("container runtime unavailable: {0}")]
    RuntimeUnavailable(String),

    #[error("generator failed: {message}")]
    ToolFailed {
        message: String,
        exit_code: Option<i32>,
    },

    #[error("generator output exceeded {limit} bytes")]
    OutputLimitExceeded { limit: usize },

    #[error("hook `{command}` failed: {reason}")]
    HookFailed { command: String, reason: String },

    #[error("storage error: {0}")]
    StorageError(String),

    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),
}

impl GenError {
    /// 面向结构化结果的错误码：IO 错误取其 kind，其余为固定标识
    pub fn code(&self) -> Option<String> {
        match self {
            GenError::IoError(e)
            | GenError::ConfigRead { source: e, .. }
            | GenError::PayloadRead { source: e, .. } => Some(format!("{:?}", e.kind())),
            GenError::RuntimeUnavailable(_) => Some("RUNTIME_UNAVAILABLE".to_string()),
            GenError::InvalidSpec(_) => Some("INVALID_SPEC".to_string()),
            GenError::ToolFailed { exit_code, .. } => Some(match exit_code {
                Some(code) => format!("EXIT_{}", code),
                None => "TERMINATED".to_string(),
            }),
            GenError::OutputLimitExceeded { .. } => Some("OUTPUT_LIMIT".to_string()),
            GenError::HookFailed { .. } => Some("HOOK_FAILED".to_string()),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, GenError>;

/// 辅助性操作（临时文件清理、生成后保存配置等）：失败只记日志，不改变主流程结论。
pub fn advisory<T, E: std::fmt::Display>(what: &str, result: std::result::Result<T, E>) -> Option<T> {
    match result {
        Ok(v) => Some(v),
        Err(e) => {
            tracing::warn!("{}失败（已忽略）: {}", what, e);
            None
        }
    }
}
