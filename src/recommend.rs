//! 根据规范形态和项目信息推荐生成器配置。
//!
//! 生成器选择是一张按顺序求值、首个命中即返回的规则表；
//! 全部未命中时固定落到 typescript-axios。`global.defaultGenerator` 不参与推荐。

use serde_json::{json, Map, Value};

use crate::inspect;
use crate::models::{ApiInfo, GeneratorProfile, GeneratorType, ProjectInfo};

/// 大项目阈值：操作数超过该值视为大规模
pub const LARGE_SPEC_OPERATIONS: usize = 50;

/// 规则求值所需的信号，一次性从输入中提取
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Signals {
    pub has_spec: bool,
    pub websocket: bool,
    pub file_upload: bool,
    pub operation_count: usize,
    pub has_api_list: bool,
    pub complex_methods: bool,
}

impl Signals {
    pub fn collect(apis: Option<&[ApiInfo]>, spec: Option<&Value>) -> Self {
        let mut signals = Signals::default();
        if let Some(spec) = spec {
            signals.has_spec = true;
            signals.websocket = inspect::has_websocket_marker(spec);
            signals.file_upload = inspect::has_file_upload(spec);
            signals.operation_count = inspect::count_operations(spec);
        }
        if let Some(apis) = apis.filter(|a| !a.is_empty()) {
            signals.has_api_list = true;
            signals.complex_methods = apis.iter().any(|api| {
                matches!(
                    api.method.to_uppercase().as_str(),
                    "PATCH" | "DELETE" | "OPTIONS"
                )
            });
        }
        signals
    }
}

pub struct Rule {
    pub name: &'static str,
    pub applies: fn(&Signals) -> bool,
    pub generator: GeneratorType,
    pub rationale: &'static str,
}

/// 规则表未命中时的生成器
pub const FALLBACK_GENERATOR: GeneratorType = GeneratorType::TypescriptAxios;

/// 目前每条规则都选 axios。轻量生成器（fetch）的选择条件尚未定义，
/// 表里也就没有对应规则。
pub static RULES: [Rule; 4] = [
    Rule {
        name: "websocket",
        applies: |s: &Signals| s.has_spec && s.websocket,
        generator: GeneratorType::TypescriptAxios,
        rationale: "websocket-tagged operations benefit from axios interceptors",
    },
    Rule {
        name: "file-upload",
        applies: |s: &Signals| s.file_upload,
        generator: GeneratorType::TypescriptAxios,
        rationale: "multipart uploads are handled better by axios",
    },
    Rule {
        name: "large-spec",
        applies: |s: &Signals| s.operation_count > LARGE_SPEC_OPERATIONS,
        generator: GeneratorType::TypescriptAxios,
        rationale: "large api surface, axios scales better",
    },
    Rule {
        name: "complex-methods",
        applies: |s: &Signals| !s.has_spec && s.has_api_list && s.complex_methods,
        generator: GeneratorType::TypescriptAxios,
        rationale: "PATCH/DELETE/OPTIONS endpoints are smoother with axios",
    },
];

#[derive(Debug, Clone, Copy, Default)]
pub struct Recommender;

impl Recommender {
    pub fn recommend(
        &self,
        project_name: &str,
        project: &ProjectInfo,
        apis: Option<&[ApiInfo]>,
        spec: Option<&Value>,
    ) -> GeneratorProfile {
        let signals = Signals::collect(apis, spec);
        let (generator, rationale) = self.select(&signals);

        let mut reasons = Vec::new();
        let endpoint_count = project
            .api_count
            .map(|c| c as usize)
            .filter(|c| *c > 0)
            .or_else(|| apis.map(|a| a.len()).filter(|c| *c > 0))
            .or_else(|| Some(signals.operation_count).filter(|c| *c > 0));
        if let Some(count) = endpoint_count {
            reasons.push(format!("project exposes {} api endpoints", count));
        }
        reasons.push(format!("{}: {}", describe(generator), rationale));
        reasons.push("output path derived from the project name".to_string());

        GeneratorProfile {
            generator,
            output_path: recommend_output_path(project_name),
            config_file: None,
            reasons,
        }
    }

    /// 首个命中的规则；都未命中则用 FALLBACK_GENERATOR
    pub fn select(&self, signals: &Signals) -> (GeneratorType, &'static str) {
        RULES
            .iter()
            .find(|rule| (rule.applies)(signals))
            .map(|rule| {
                tracing::debug!("推荐规则命中: {}", rule.name);
                (rule.generator, rule.rationale)
            })
            .unwrap_or((FALLBACK_GENERATOR, "default choice for remaining cases"))
    }
}

fn describe(generator: GeneratorType) -> &'static str {
    match generator {
        GeneratorType::TypescriptAxios => {
            "TypeScript + Axios (type safe, interceptor support, fits most projects)"
        }
        GeneratorType::TypescriptFetch => "TypeScript + Fetch (lightweight, fits simple projects)",
        GeneratorType::TypescriptNode => "TypeScript for Node.js",
        _ => "configured default generator",
    }
}

/// 项目名转输出路径：小写，去掉一个 -api/-service/-client 后缀，
/// 空白段变 `-`，丢弃 [a-z0-9-] 以外的字符。
pub fn recommend_output_path(project_name: &str) -> String {
    let mut name = project_name.to_lowercase();
    for suffix in ["api", "service", "client"] {
        name = strip_suffix(name, suffix);
    }

    let mut collapsed = String::with_capacity(name.len());
    let mut in_space = false;
    for c in name.chars() {
        if c.is_whitespace() {
            if !in_space {
                collapsed.push('-');
            }
            in_space = true;
        } else {
            collapsed.push(c);
            in_space = false;
        }
    }

    let cleaned: String = collapsed
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-')
        .collect();
    format!("src/api/{}", cleaned)
}

/// 去掉 `-<suffix>` 或 `_<suffix>` 结尾
fn strip_suffix(name: String, suffix: &str) -> String {
    match name.strip_suffix(suffix) {
        Some(rest) if rest.ends_with('-') || rest.ends_with('_') => {
            rest[..rest.len() - 1].to_string()
        }
        _ => name,
    }
}

/// 各生成器的 openapi-generator 选项，未知生成器返回空集合
pub fn options_for(generator: &str) -> Map<String, Value> {
    let options = match generator {
        "typescript-axios" => json!({
            "supportsES6": true,
            "withSeparateModelsAndApi": true,
            "modelPackage": "models",
            "apiPackage": "apis",
            "useSingleRequestParameter": true,
            "removeOperationIdPrefix": true,
            "nullSafeAdditionalProps": true,
            "stringEnums": false,
            "enumNameSuffix": "Enum",
            "modelPropertyNaming": "camelCase",
            "paramNaming": "camelCase",
            "withNullable": true,
            "sortParamsByRequiredFlag": true
        }),
        "typescript-fetch" => json!({
            "supportsES6": true,
            "useSingleRequestParameter": true,
            "modelPropertyNaming": "camelCase",
            "paramNaming": "camelCase"
        }),
        "typescript-node" => json!({
            "supportsES6": true,
            "npmName": "@myorg/api-client",
            "npmVersion": "1.0.0"
        }),
        _ => return Map::new(),
    };
    match options {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn api(method: &str) -> ApiInfo {
        ApiInfo {
            id: "1".into(),
            name: "op".into(),
            path: "/x".into(),
            method: method.into(),
            description: None,
        }
    }

    fn spec_with_ops(n: usize) -> Value {
        let mut paths = Map::new();
        for i in 0..n {
            paths.insert(format!("/p{}", i), json!({ "get": {} }));
        }
        json!({ "openapi": "3.0.0", "info": {}, "paths": paths })
    }

    #[test]
    fn test_multipart_selects_axios_regardless_of_size() {
        let spec = json!({ "paths": { "/u": { "post": {
            "requestBody": { "content": { "multipart/form-data": {} } }
        } } } });
        let profile = Recommender.recommend("Files", &ProjectInfo::default(), None, Some(&spec));
        assert_eq!(profile.generator, GeneratorType::TypescriptAxios);
        assert!(profile.reasons[1].contains("multipart"));
    }

    #[test]
    fn test_rule_order_websocket_first() {
        let signals = Signals {
            has_spec: true,
            websocket: true,
            file_upload: true,
            ..Default::default()
        };
        let (_, rationale) = Recommender::default().select(&signals);
        assert_eq!(rationale, RULES[0].rationale);
    }

    #[test]
    fn test_websocket_rule_needs_spec() {
        let signals = Signals {
            websocket: true,
            ..Default::default()
        };
        assert!(!(RULES[0].applies)(&signals));
    }

    #[test]
    fn test_large_spec_rule() {
        let big = Signals::collect(None, Some(&spec_with_ops(51)));
        assert!((RULES[2].applies)(&big));
        let small = Signals::collect(None, Some(&spec_with_ops(50)));
        assert!(!(RULES[2].applies)(&small));
    }

    #[test]
    fn test_complex_methods_rule_only_without_spec() {
        let apis = vec![api("get"), api("delete")];
        let without_spec = Signals::collect(Some(apis.as_slice()), None);
        assert!((RULES[3].applies)(&without_spec));

        let with_spec = Signals::collect(Some(apis.as_slice()), Some(&spec_with_ops(1)));
        assert!(!(RULES[3].applies)(&with_spec));

        let simple_apis = [api("GET"), api("post")];
        let simple = Signals::collect(Some(&simple_apis[..]), None);
        assert!(!(RULES[3].applies)(&simple));
    }

    #[test]
    fn test_fallback_is_always_axios() {
        let (generator, rationale) = Recommender.select(&Signals::default());
        assert_eq!(generator, GeneratorType::TypescriptAxios);
        assert_eq!(rationale, "default choice for remaining cases");
        assert!(RULES.iter().all(|rule| rule.generator == GeneratorType::TypescriptAxios));
    }

    #[test]
    fn test_zero_api_count_falls_back_to_api_list() {
        let project = ProjectInfo {
            api_count: Some(0),
            ..Default::default()
        };
        let apis = vec![api("get"), api("post")];
        let profile = Recommender.recommend("Pets", &project, Some(apis.as_slice()), None);
        assert_eq!(profile.reasons[0], "project exposes 2 api endpoints");

        let spec = spec_with_ops(3);
        let profile = Recommender.recommend("Pets", &project, None, Some(&spec));
        assert_eq!(profile.reasons[0], "project exposes 3 api endpoints");
    }

    #[test]
    fn test_reasons_cite_endpoint_count() {
        let project = ProjectInfo {
            api_count: Some(23),
            ..Default::default()
        };
        let profile = Recommender::default().recommend("Pet Store", &project, None, None);
        assert_eq!(profile.reasons.len(), 3);
        assert!(profile.reasons[0].contains("23"));
        assert_eq!(profile.output_path, "src/api/pet-store");

        let unknown = Recommender::default().recommend("x", &ProjectInfo::default(), None, None);
        assert_eq!(unknown.reasons.len(), 2);
    }

    #[test]
    fn test_recommend_output_path() {
        assert_eq!(recommend_output_path("My-Service"), "src/api/my");
        assert_eq!(recommend_output_path("user_api"), "src/api/user");
        assert_eq!(recommend_output_path("Orders-CLIENT"), "src/api/orders");
        assert_eq!(recommend_output_path("Pet  Store (v2)"), "src/api/pet-store-v2");
        assert_eq!(recommend_output_path("billingapi"), "src/api/billingapi");
        assert_eq!(recommend_output_path("商城 API"), "src/api/-api");
    }

    #[test]
    fn test_options_for() {
        let axios = options_for("typescript-axios");
        assert_eq!(axios["withSeparateModelsAndApi"], json!(true));
        assert_eq!(axios["modelPropertyNaming"], json!("camelCase"));
        assert_eq!(options_for("typescript-fetch").len(), 4);
        assert!(options_for("cobol").is_empty());
    }

    proptest! {
        #[test]
        fn prop_output_path_is_clean(name in "\\PC{0,40}") {
            let path = recommend_output_path(&name);
            let tail = path.strip_prefix("src/api/").unwrap();
            prop_assert!(tail.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'));
        }
    }
}
