use serde::Serialize;

use crate::models::{ApiConfig, ApifoxProjectInfo, GeneratorConfig, GlobalConfig};
use crate::settings::DEFAULT_OUTPUT_BASE;

/// 合并全局默认值之后的有效配置，读取时计算，不回写
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectiveApiConfig {
    pub name: String,
    pub apifox: ApifoxProjectInfo,
    pub generator: GeneratorConfig,
    pub pre_generate: Vec<String>,
    pub post_generate: Vec<String>,
}

/// 两级解析：单个 API 的字段优先，缺省时回退到 global。
/// hooks 按 preGenerate / postGenerate 分别回退；outputPath 为空时用 outputBaseDir + 名称。
pub fn resolve(entry: &ApiConfig, global: Option<&GlobalConfig>) -> EffectiveApiConfig {
    let global_hooks = global.and_then(|g| g.hooks.as_ref());
    let entry_hooks = entry.hooks.as_ref();

    let pre_generate = entry_hooks
        .and_then(|h| h.pre_generate.clone())
        .or_else(|| global_hooks.and_then(|h| h.pre_generate.clone()))
        .unwrap_or_default();
    let post_generate = entry_hooks
        .and_then(|h| h.post_generate.clone())
        .or_else(|| global_hooks.and_then(|h| h.post_generate.clone()))
        .unwrap_or_default();

    let mut generator = entry.generator.clone();
    if generator.output_path.trim().is_empty() {
        let base = global
            .and_then(|g| g.output_base_dir.as_deref())
            .unwrap_or(DEFAULT_OUTPUT_BASE);
        generator.output_path = format!(
            "{}/{}",
            base.trim_end_matches('/'),
            api_name_to_path(&entry.name)
        );
    }

    EffectiveApiConfig {
        name: entry.name.clone(),
        apifox: entry.apifox.clone(),
        generator,
        pre_generate,
        post_generate,
    }
}

/// API 名称转路径片段：camelCase 拆分，小写，非字母数字连续段替换为 `-`
pub fn api_name_to_path(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let mut prev_lower = false;
    for c in name.chars() {
        if c.is_ascii_uppercase() && prev_lower {
            out.push('-');
        }
        prev_lower = c.is_ascii_lowercase();
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        } else if !out.ends_with('-') {
            out.push('-');
        }
    }
    out.trim_matches('-').to_string()
}
