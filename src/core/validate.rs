use serde::Serialize;
use serde_json::Value;

use crate::models::ApifoxConfig;

/// 配置校验结果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfigValidation {
    pub valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ConfigValidation {
    fn from_parts(errors: Vec<String>, warnings: Vec<String>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
            warnings,
        }
    }

    pub fn missing() -> Self {
        Self::from_parts(vec!["config file not found".to_string()], vec![])
    }
}

/// 对类型化文档做校验（先转回 JSON，规则与原始文档一致）
pub fn validate_config(config: &ApifoxConfig) -> ConfigValidation {
    match serde_json::to_value(config) {
        Ok(doc) => validate_document(&doc),
        Err(e) => ConfigValidation::from_parts(vec![format!("cannot serialize config: {}", e)], vec![]),
    }
}

/// 校验原始 JSON 文档的结构
pub fn validate_document(doc: &Value) -> ConfigValidation {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    match doc.get("apis") {
        None => errors.push("missing `apis` field".to_string()),
        Some(Value::Array(apis)) => {
            for (index, api) in apis.iter().enumerate() {
                for field in [
                    "/name",
                    "/apifox/projectId",
                    "/apifox/documentId",
                    "/generator/type",
                    "/generator/outputPath",
                ] {
                    if !is_non_empty_str(api.pointer(field)) {
                        errors.push(format!(
                            "apis[{}]: missing `{}` field",
                            index,
                            field.trim_start_matches('/').replace('/', ".")
                        ));
                    }
                }

                if let Some(path) = api.pointer("/generator/outputPath").and_then(Value::as_str) {
                    if path.starts_with('/') {
                        warnings.push(format!(
                            "apis[{}]: generator.outputPath should be relative to the project",
                            index
                        ));
                    }
                }
            }

            let duplicates = duplicate_names(apis);
            if !duplicates.is_empty() {
                errors.push(format!("duplicate api names: {}", duplicates.join(", ")));
            }

            if apis.is_empty() {
                warnings.push("no apis are tracked yet".to_string());
            }
        }
        Some(_) => errors.push("`apis` must be an array".to_string()),
    }

    if let Some(hooks) = doc.pointer("/global/hooks") {
        for key in ["preGenerate", "postGenerate"] {
            match hooks.get(key) {
                None | Some(Value::Null) | Some(Value::Array(_)) => {}
                Some(_) => errors.push(format!("global.hooks.{} must be an array", key)),
            }
        }
    }

    ConfigValidation::from_parts(errors, warnings)
}

fn is_non_empty_str(value: Option<&Value>) -> bool {
    value
        .and_then(Value::as_str)
        .map(|s| !s.trim().is_empty())
        .unwrap_or(false)
}

/// 出现两次及以上的名称，按首次重复的顺序去重
fn duplicate_names(apis: &[Value]) -> Vec<String> {
    let names: Vec<&str> = apis
        .iter()
        .filter_map(|api| api.get("name").and_then(Value::as_str))
        .collect();

    let mut duplicates: Vec<String> = Vec::new();
    for (index, name) in names.iter().enumerate() {
        if names[..index].contains(name) && !duplicates.iter().any(|d| d == name) {
            duplicates.push(name.to_string());
        }
    }
    duplicates
}
