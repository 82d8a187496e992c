use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};

/// 完整的跟踪配置（项目目录下的 apifox.config.json）
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ApifoxConfig {
    #[serde(rename = "$schema", default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global: Option<GlobalConfig>,
    #[serde(default)]
    pub apis: Vec<ApiConfig>,
}

/// 全局默认值，单个 API 缺省字段时回退到这里
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct GlobalConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_generator: Option<GeneratorType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_base_dir: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hooks: Option<HooksConfig>,
}

/// 单个 API 源：上游规范标识 + 生成目标
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ApiConfig {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub apifox: ApifoxProjectInfo,
    pub generator: GeneratorConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hooks: Option<HooksConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_generated: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_discovered: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ApifoxProjectInfo {
    #[serde(default)]
    pub project_id: String,
    #[serde(default)]
    pub document_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_count: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GeneratorConfig {
    #[serde(rename = "type")]
    pub generator_type: GeneratorType,
    #[serde(default)]
    pub output_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_file: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct HooksConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pre_generate: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_generate: Option<Vec<String>>,
}

/// openapi-generator 的 `-g` 取值
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum GeneratorType {
    TypescriptAxios,
    TypescriptFetch,
    TypescriptNode,
    Java,
    Go,
    Python,
    Kotlin,
    Swift,
}

impl GeneratorType {
    pub fn as_str(self) -> &'static str {
        match self {
            GeneratorType::TypescriptAxios => "typescript-axios",
            GeneratorType::TypescriptFetch => "typescript-fetch",
            GeneratorType::TypescriptNode => "typescript-node",
            GeneratorType::Java => "java",
            GeneratorType::Go => "go",
            GeneratorType::Python => "python",
            GeneratorType::Kotlin => "kotlin",
            GeneratorType::Swift => "swift",
        }
    }

    /// 生成代码运行时需要额外安装的依赖
    pub fn runtime_dependency(self) -> Option<&'static str> {
        match self {
            GeneratorType::TypescriptAxios => Some("pnpm install axios"),
            GeneratorType::TypescriptNode => Some("pnpm install request @types/request"),
            _ => None,
        }
    }
}

impl fmt::Display for GeneratorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---- 部分更新 ----

/// `update` 的部分字段；None 表示保持原值
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApiConfigPatch {
    pub description: Option<String>,
    pub apifox: Option<ApifoxPatch>,
    pub generator: Option<GeneratorPatch>,
    pub hooks: Option<HooksConfig>,
    pub last_generated: Option<DateTime<Utc>>,
    pub auto_discovered: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApifoxPatch {
    pub project_id: Option<String>,
    pub document_id: Option<String>,
    pub project_name: Option<String>,
    pub api_count: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeneratorPatch {
    pub generator_type: Option<GeneratorType>,
    pub output_path: Option<String>,
    pub config_file: Option<String>,
}

// ---- 外部发现接口返回的数据 ----

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ProjectInfo {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub member_count: Option<u32>,
    #[serde(default)]
    pub api_count: Option<u32>,
    #[serde(default)]
    pub documents: Option<Vec<DocumentInfo>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DocumentInfo {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub doc_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiInfo {
    pub id: String,
    pub name: String,
    pub path: String,
    pub method: String,
    #[serde(default)]
    pub description: Option<String>,
}

// ---- 推荐与生成结果（不落盘） ----

/// 推荐的生成器配置
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GeneratorProfile {
    pub generator: GeneratorType,
    pub output_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_file: Option<String>,
    pub reasons: Vec<String>,
}

impl From<GeneratorProfile> for GeneratorConfig {
    fn from(profile: GeneratorProfile) -> Self {
        GeneratorConfig {
            generator_type: profile.generator,
            output_path: profile.output_path,
            config_file: profile.config_file,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResult {
    pub success: bool,
    pub output_path: String,
    pub files: Vec<String>,
    #[serde(serialize_with = "serialize_millis")]
    pub duration: Duration,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<GenerationFailure>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct GenerationFailure {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

fn serialize_millis<S: Serializer>(duration: &Duration, s: S) -> std::result::Result<S::Ok, S::Error> {
    s.serialize_u64(duration.as_millis() as u64)
}
