//! OpenAPI 文档的浅层检查：统计路径/操作/schema 数量，探测上传与 WebSocket 标记。
//!
//! 只读取 `paths` 与 `components.schemas`，不解析 `$ref`，缺失或格式错误的字段一律按零计数。

use serde::Serialize;
use serde_json::Value;

/// 计入操作数的 HTTP 方法
pub const HTTP_METHODS: [&str; 7] = ["get", "post", "put", "delete", "patch", "options", "head"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecStats {
    pub path_count: usize,
    pub operation_count: usize,
    pub schema_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpecValidation {
    pub valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub stats: SpecStats,
}

pub fn spec_stats(spec: &Value) -> SpecStats {
    let path_count = paths(spec).map(|p| p.len()).unwrap_or(0);
    let schema_count = spec
        .pointer("/components/schemas")
        .and_then(Value::as_object)
        .map(|s| s.len())
        .unwrap_or(0);

    SpecStats {
        path_count,
        operation_count: count_operations(spec),
        schema_count,
    }
}

pub fn count_operations(spec: &Value) -> usize {
    operations(spec).count()
}

/// 是否存在文件上传：requestBody 声明 multipart/form-data，或参数 schema 为 string/binary
pub fn has_file_upload(spec: &Value) -> bool {
    operations(spec).any(|op| {
        let multipart = op
            .pointer("/requestBody/content")
            .and_then(Value::as_object)
            .map(|content| content.contains_key("multipart/form-data"))
            .unwrap_or(false);

        multipart
            || op
                .get("parameters")
                .and_then(Value::as_array)
                .map(|params| params.iter().any(is_binary_param))
                .unwrap_or(false)
    })
}

/// 是否有操作的 tag 含 "websocket" 或 "ws"（不区分大小写）
pub fn has_websocket_marker(spec: &Value) -> bool {
    operations(spec).any(|op| {
        op.get("tags")
            .and_then(Value::as_array)
            .map(|tags| {
                tags.iter().filter_map(Value::as_str).any(|tag| {
                    let tag = tag.to_lowercase();
                    tag.contains("websocket") || tag.contains("ws")
                })
            })
            .unwrap_or(false)
    })
}

/// 生成前的结构校验。版本字段、info、非空 paths 缺一即无效；
/// paths 非空但没有可识别的操作只给警告。
pub fn validate_spec(spec: &Value) -> SpecValidation {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    if spec.get("openapi").is_none() && spec.get("swagger").is_none() {
        errors.push("missing version field (`openapi` or `swagger`)".to_string());
    }
    if spec.get("info").is_none() {
        errors.push("missing `info` field".to_string());
    }
    if paths(spec).map(|p| p.is_empty()).unwrap_or(true) {
        errors.push("no api paths defined".to_string());
    }

    let stats = spec_stats(spec);
    if stats.path_count > 0 && stats.operation_count == 0 {
        warnings.push("paths define no operations; generated client will be empty".to_string());
    }

    SpecValidation {
        valid: errors.is_empty(),
        errors,
        warnings,
        stats,
    }
}

fn paths(spec: &Value) -> Option<&serde_json::Map<String, Value>> {
    spec.get("paths").and_then(Value::as_object)
}

/// 遍历所有 (path, method) 下的操作对象
fn operations(spec: &Value) -> impl Iterator<Item = &Value> {
    paths(spec)
        .into_iter()
        .flat_map(|p| p.values())
        .filter_map(Value::as_object)
        .flat_map(|item| HTTP_METHODS.iter().filter_map(move |m| item.get(*m)))
        .filter(|op| !op.is_null())
}

fn is_binary_param(param: &Value) -> bool {
    let schema = match param.get("schema") {
        Some(s) => s,
        None => return false,
    };
    schema.get("type").and_then(Value::as_str) == Some("string")
        && schema.get("format").and_then(Value::as_str) == Some("binary")
}
