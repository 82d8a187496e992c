use std::path::{Path, PathBuf};

/// 跟踪配置文件名
pub const CONFIG_FILENAME: &str = "apifox.config.json";
/// 工具注册文件名（发现阶段依赖它）
pub const REGISTRATION_FILENAME: &str = ".mcp.json";
/// 发现阶段需要的凭证环境变量
pub const CREDENTIAL_VAR: &str = "APIFOX_ACCESS_TOKEN";
pub const SCHEMA_URL: &str =
    "https://cdn.jsdelivr.net/npm/@claude/apifox-generator-plugin/schema.json";
pub const DEFAULT_IMAGE: &str = "openapitools/openapi-generator-cli:latest";
pub const DEFAULT_DOCKER_BIN: &str = "docker";
pub const DEFAULT_OUTPUT_BASE: &str = "src/api";
/// 生成器 stdout + stderr 上限，超出视为失败
pub const OUTPUT_LIMIT: usize = 10 * 1024 * 1024;

/// 运行时设置，由命令行参数和环境变量组装
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub working_dir: PathBuf,
    pub image: String,
    pub docker_bin: String,
    pub output_limit: usize,
}

impl Settings {
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        Self {
            working_dir: working_dir.into(),
            image: DEFAULT_IMAGE.to_string(),
            docker_bin: DEFAULT_DOCKER_BIN.to_string(),
            output_limit: OUTPUT_LIMIT,
        }
    }

    pub fn config_path(&self) -> PathBuf {
        config_path(&self.working_dir)
    }

    pub fn registration_path(&self) -> PathBuf {
        self.working_dir.join(REGISTRATION_FILENAME)
    }
}

pub fn config_path(working_dir: &Path) -> PathBuf {
    working_dir.join(CONFIG_FILENAME)
}
