//! 生成工作流：环境检查 → 发现 → 推荐 → 前置 hook → 生成 → 后置 hook → 保存配置。
//!
//! 每个阶段的进度都记录在 [`WorkflowOutcome::phases`] 里并写日志。
//! 工作流本身不返回 Err：所有失败都折叠为带说明文本的结果。

pub mod hooks;
pub mod report;

use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::Serialize;
use serde_json::Value;

use crate::core::{resolve, ConfigStore, EffectiveApiConfig};
use crate::discovery::Discovery;
use crate::error::{advisory, GenError, Result};
use crate::generator::{CodeGenerator, ContainerRuntime};
use crate::inspect;
use crate::models::{
    ApiConfig, ApiConfigPatch, ApiInfo, ApifoxPatch, ApifoxProjectInfo, GenerationResult, GeneratorProfile,
    GeneratorType, ProjectInfo,
};
use crate::preflight::{Preflight, PreflightReport};
use crate::recommend::Recommender;

pub use report::{format_duration, manual_generation_guide};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Phase {
    Preflight,
    Discovery,
    Recommend,
    PreHooks,
    Generate,
    PostHooks,
    SaveConfig,
}

impl Phase {
    const ALL: [Phase; 7] = [
        Phase::Preflight,
        Phase::Discovery,
        Phase::Recommend,
        Phase::PreHooks,
        Phase::Generate,
        Phase::PostHooks,
        Phase::SaveConfig,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Phase::Preflight => "环境检查",
            Phase::Discovery => "获取项目与规范",
            Phase::Recommend => "分析并推荐生成器",
            Phase::PreHooks => "执行前置 hook",
            Phase::Generate => "生成客户端代码",
            Phase::PostHooks => "执行后置 hook",
            Phase::SaveConfig => "保存配置",
        }
    }

    fn step(self) -> usize {
        Phase::ALL.iter().position(|p| *p == self).map(|i| i + 1).unwrap_or(0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PhaseStatus {
    Done,
    Skipped,
    Warned,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhaseEvent {
    pub phase: Phase,
    pub status: PhaseStatus,
    pub detail: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowOutcome {
    pub success: bool,
    pub message: String,
    pub phases: Vec<PhaseEvent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preflight: Option<PreflightReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<GeneratorProfile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<GenerationResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guide: Option<String>,
}

/// `generate` 的输入，未给出的字段由发现结果和推荐补齐
#[derive(Debug, Clone, Default)]
pub struct GenerateRequest {
    pub api_name: String,
    pub description: Option<String>,
    pub project_id: Option<String>,
    pub document_id: Option<String>,
    pub generator: Option<GeneratorType>,
    pub output_path: Option<String>,
    pub config_file: Option<String>,
}

/// 阶段进度记录器
struct Progress {
    phases: Vec<PhaseEvent>,
}

impl Progress {
    fn new() -> Self {
        Self { phases: Vec::new() }
    }

    fn record(&mut self, phase: Phase, status: PhaseStatus, detail: impl Into<String>) {
        let detail = detail.into();
        let step = phase.step();
        let total = Phase::ALL.len();
        match status {
            PhaseStatus::Done | PhaseStatus::Skipped => {
                tracing::info!("[{}/{}] {}: {}", step, total, phase.label(), detail)
            }
            PhaseStatus::Warned | PhaseStatus::Failed => {
                tracing::warn!("[{}/{}] {}: {}", step, total, phase.label(), detail)
            }
        }
        self.phases.push(PhaseEvent { phase, status, detail });
    }

    fn fail(mut self, phase: Phase, message: String) -> WorkflowOutcome {
        self.record(phase, PhaseStatus::Failed, first_line(&message));
        WorkflowOutcome {
            success: false,
            message,
            phases: self.phases,
            preflight: None,
            profile: None,
            result: None,
            guide: None,
        }
    }
}

/// 发现阶段的产物
struct Discovered {
    project: ProjectInfo,
    document_id: String,
    apis: Option<Vec<ApiInfo>>,
    spec: Value,
}

pub struct Workflow<'a> {
    runtime: &'a dyn ContainerRuntime,
    preflight: Preflight<'a>,
    working_dir: PathBuf,
}

impl<'a> Workflow<'a> {
    pub fn new(runtime: &'a dyn ContainerRuntime, working_dir: &Path) -> Self {
        Self::with_preflight(runtime, Preflight::new(runtime), working_dir)
    }

    pub fn with_preflight(runtime: &'a dyn ContainerRuntime, preflight: Preflight<'a>, working_dir: &Path) -> Self {
        Self {
            runtime,
            preflight,
            working_dir: working_dir.to_path_buf(),
        }
    }

    /// 首次生成（或按名称覆盖）一个 API 源，成功后写入跟踪配置
    pub fn run_generate(
        &self,
        store: &mut ConfigStore,
        request: &GenerateRequest,
        discovery: &dyn Discovery,
    ) -> WorkflowOutcome {
        tracing::info!("开始生成 {} 客户端", request.api_name);
        let mut progress = Progress::new();

        if let Err(outcome) = self.check_environment(&mut progress) {
            return *outcome;
        }

        let existing = store.get(&request.api_name).cloned();
        let project_id = request
            .project_id
            .clone()
            .or_else(|| existing.as_ref().map(|e| e.apifox.project_id.clone()));
        let document_id = request
            .document_id
            .clone()
            .or_else(|| existing.as_ref().map(|e| e.apifox.document_id.clone()));

        let discovered = match discover(discovery, project_id, document_id, &request.api_name) {
            Ok(d) => d,
            Err(e) => return progress.fail(Phase::Discovery, e.to_string()),
        };
        progress.record(
            Phase::Discovery,
            PhaseStatus::Done,
            format!("{} ({})", discovered.project.name, discovered.project.id),
        );

        let mut profile = Recommender.recommend(
            &discovered.project.name,
            &discovered.project,
            discovered.apis.as_deref(),
            Some(&discovered.spec),
        );
        if let Some(existing) = &existing {
            keep_tracked_settings(&mut profile, existing);
        }
        apply_overrides(&mut profile, request);
        progress.record(
            Phase::Recommend,
            PhaseStatus::Done,
            format!("{} -> {}", profile.generator, profile.output_path),
        );

        let mut entry = ApiConfig {
            name: request.api_name.clone(),
            description: request
                .description
                .clone()
                .or_else(|| existing.as_ref().and_then(|e| e.description.clone())),
            apifox: ApifoxProjectInfo {
                project_id: discovered.project.id.clone(),
                document_id: discovered.document_id.clone(),
                project_name: Some(discovered.project.name.clone()),
                api_count: api_count(&discovered),
            },
            generator: profile.clone().into(),
            hooks: existing.as_ref().and_then(|e| e.hooks.clone()),
            last_generated: None,
            auto_discovered: Some(request.project_id.is_none()),
        };
        let effective = resolve(&entry, store.global());

        let mut outcome = self.execute(&mut progress, &effective, &discovered.spec);
        outcome.profile = Some(profile);
        if !outcome.success {
            return outcome;
        }

        entry.last_generated = Some(Utc::now());
        match advisory("保存配置", store.add(entry)) {
            Some(()) => progress.record(Phase::SaveConfig, PhaseStatus::Done, store.path().display().to_string()),
            None => progress.record(
                Phase::SaveConfig,
                PhaseStatus::Warned,
                "config save failed, the code was generated",
            ),
        }
        outcome.phases = progress.phases;
        outcome
    }

    /// 按已跟踪的配置重新生成，刷新 lastGenerated 和 apiCount
    pub fn run_update(&self, store: &mut ConfigStore, api_name: &str, discovery: &dyn Discovery) -> WorkflowOutcome {
        tracing::info!("开始更新 {} 客户端", api_name);
        let mut progress = Progress::new();

        let effective = match store.resolve(api_name) {
            Some(e) => e,
            None => {
                return progress.fail(
                    Phase::Preflight,
                    GenError::ApiNotFound(api_name.to_string()).to_string(),
                )
            }
        };

        if let Err(outcome) = self.check_environment(&mut progress) {
            return *outcome;
        }

        let discovered = match discover(
            discovery,
            Some(effective.apifox.project_id.clone()),
            Some(effective.apifox.document_id.clone()),
            api_name,
        ) {
            Ok(d) => d,
            Err(e) => return progress.fail(Phase::Discovery, e.to_string()),
        };
        progress.record(
            Phase::Discovery,
            PhaseStatus::Done,
            format!("{} ({})", discovered.project.name, discovered.project.id),
        );
        progress.record(
            Phase::Recommend,
            PhaseStatus::Skipped,
            format!("using tracked generator {}", effective.generator.generator_type),
        );

        let mut outcome = self.execute(&mut progress, &effective, &discovered.spec);
        if !outcome.success {
            return outcome;
        }

        let patch = ApiConfigPatch {
            apifox: Some(ApifoxPatch {
                api_count: api_count(&discovered),
                ..Default::default()
            }),
            last_generated: Some(Utc::now()),
            ..Default::default()
        };
        match advisory("更新配置", store.update(api_name, patch)) {
            Some(true) => progress.record(Phase::SaveConfig, PhaseStatus::Done, store.path().display().to_string()),
            Some(false) | None => progress.record(
                Phase::SaveConfig,
                PhaseStatus::Warned,
                "config update failed, the code was generated",
            ),
        }
        outcome.phases = progress.phases;
        outcome
    }

    fn check_environment(&self, progress: &mut Progress) -> std::result::Result<(), Box<WorkflowOutcome>> {
        let report = self.preflight.check(&self.working_dir);
        if report.passed {
            progress.record(Phase::Preflight, PhaseStatus::Done, "environment ready");
            return Ok(());
        }

        let message = report.to_string();
        let mut outcome = std::mem::replace(progress, Progress::new()).fail(Phase::Preflight, message);
        outcome.preflight = Some(report);
        Err(Box::new(outcome))
    }

    /// hook + 生成 + hook；配置写回由调用方负责
    fn execute(&self, progress: &mut Progress, effective: &EffectiveApiConfig, spec: &Value) -> WorkflowOutcome {
        if effective.pre_generate.is_empty() {
            progress.record(Phase::PreHooks, PhaseStatus::Skipped, "no hooks");
        } else if let Err(e) = hooks::run_hooks(&effective.pre_generate, &self.working_dir) {
            return std::mem::replace(progress, Progress::new()).fail(Phase::PreHooks, e.to_string());
        } else {
            progress.record(
                Phase::PreHooks,
                PhaseStatus::Done,
                format!("{} hooks", effective.pre_generate.len()),
            );
        }

        let result = CodeGenerator::new(self.runtime).generate(spec, &effective.generator, &self.working_dir);
        if !result.success {
            let error = result
                .error
                .as_ref()
                .map(|e| e.message.clone())
                .unwrap_or_else(|| "unknown error".to_string());
            let guide = manual_generation_guide(
                &effective.name,
                Some(&effective.apifox.project_id),
                Some(&effective.apifox.document_id),
                effective.generator.generator_type,
            );
            let message = format!("{}\n{}", report::failure_message(&error), guide);

            let mut outcome = std::mem::replace(progress, Progress::new()).fail(Phase::Generate, message);
            outcome.result = Some(result);
            outcome.guide = Some(guide);
            return outcome;
        }
        progress.record(
            Phase::Generate,
            PhaseStatus::Done,
            format!(
                "{} files in {} ({})",
                result.files.len(),
                result.output_path,
                format_duration(result.duration)
            ),
        );

        if effective.post_generate.is_empty() {
            progress.record(Phase::PostHooks, PhaseStatus::Skipped, "no hooks");
        } else {
            match advisory(
                "执行后置 hook",
                hooks::run_hooks(&effective.post_generate, &self.working_dir),
            ) {
                Some(()) => progress.record(
                    Phase::PostHooks,
                    PhaseStatus::Done,
                    format!("{} hooks", effective.post_generate.len()),
                ),
                None => progress.record(Phase::PostHooks, PhaseStatus::Warned, "post-generate hook failed"),
            }
        }

        let mut message = format!(
            "generated {} files into {}",
            result.files.len(),
            result.output_path
        );
        if let Some(dependency) = effective.generator.generator_type.runtime_dependency() {
            message.push_str(&format!("\nruntime dependency: {}", dependency));
        }

        WorkflowOutcome {
            success: true,
            message,
            phases: Vec::new(),
            preflight: None,
            profile: None,
            result: Some(result),
            guide: None,
        }
    }
}

/// 从发现接口取项目、接口列表和规范；缺少规范无法继续
fn discover(
    discovery: &dyn Discovery,
    project_id: Option<String>,
    document_id: Option<String>,
    api_name: &str,
) -> Result<Discovered> {
    let project_id = match project_id.filter(|id| !id.is_empty()) {
        Some(id) => id,
        None => {
            let mut projects = discovery.list_projects()?;
            if projects.len() != 1 {
                return Err(GenError::Discovery(format!(
                    "cannot pick a project for `{}`: pass --project-id ({} candidates)",
                    api_name,
                    projects.len()
                )));
            }
            projects.remove(0).id
        }
    };

    let project = discovery.project_info(&project_id)?.unwrap_or_else(|| ProjectInfo {
        id: project_id.clone(),
        name: api_name.to_string(),
        ..Default::default()
    });

    let document_id = document_id
        .filter(|id| !id.is_empty())
        .or_else(|| {
            project
                .documents
                .as_ref()
                .and_then(|docs| docs.first())
                .map(|d| d.id.clone())
        })
        .ok_or_else(|| {
            GenError::Discovery(format!(
                "no document id for project {}: pass --document-id",
                project_id
            ))
        })?;

    let apis = discovery.list_apis(&project_id)?;
    let spec = discovery.openapi_spec(&project_id, &document_id)?.ok_or_else(|| {
        GenError::InvalidSpec(vec![format!(
            "no OpenAPI spec supplied for project {}",
            project_id
        )])
    })?;

    Ok(Discovered {
        project,
        document_id,
        apis,
        spec,
    })
}

/// 已跟踪的条目沿用原有生成器、输出目录和配置文件
fn keep_tracked_settings(profile: &mut GeneratorProfile, existing: &ApiConfig) {
    let tracked = &existing.generator;
    profile.generator = tracked.generator_type;
    if !tracked.output_path.is_empty() {
        profile.output_path = tracked.output_path.clone();
    }
    profile.config_file = tracked.config_file.clone();
    profile
        .reasons
        .push(format!("keeping tracked settings of `{}`", existing.name));
}

/// 显式指定的字段覆盖推荐结果
fn apply_overrides(profile: &mut GeneratorProfile, request: &GenerateRequest) {
    if let Some(generator) = request.generator {
        if generator != profile.generator {
            profile.reasons.push(format!("generator {} chosen explicitly", generator));
        }
        profile.generator = generator;
    }
    if let Some(output_path) = request.output_path.clone() {
        profile.output_path = output_path;
    }
    if let Some(config_file) = request.config_file.clone() {
        profile.config_file = Some(config_file);
    }
}

fn api_count(discovered: &Discovered) -> Option<u32> {
    discovered
        .apis
        .as_ref()
        .map(|apis| apis.len())
        .or_else(|| Some(inspect::count_operations(&discovered.spec)))
        .map(|count| count as u32)
}

fn first_line(message: &str) -> &str {
    message.lines().find(|l| !l.trim().is_empty()).unwrap_or(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::api::tests::sample_api;
    use crate::discovery::PayloadDiscovery;
    use crate::generator::fake::FakeRuntime;
    use crate::generator::RuntimeStatus;
    use crate::models::{DocumentInfo, GlobalConfig, HooksConfig};
    use crate::settings::{CONFIG_FILENAME, CREDENTIAL_VAR, REGISTRATION_FILENAME};
    use serde_json::json;
    use tempfile::TempDir;

    fn ready_dir() -> TempDir {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join(CONFIG_FILENAME), r#"{ "apis": [] }"#).unwrap();
        std::fs::write(tmp.path().join(REGISTRATION_FILENAME), "{}").unwrap();
        tmp
    }

    fn workflow<'a>(runtime: &'a FakeRuntime, dir: &Path) -> Workflow<'a> {
        let preflight = Preflight::with_env(runtime, |key| (key == CREDENTIAL_VAR).then(|| "APS-1".to_string()));
        Workflow::with_preflight(runtime, preflight, dir)
    }

    fn discovery() -> PayloadDiscovery {
        let project = ProjectInfo {
            id: "1001".to_string(),
            name: "Pet Store API".to_string(),
            documents: Some(vec![DocumentInfo {
                id: "2002".to_string(),
                name: "main".to_string(),
                doc_type: "http".to_string(),
            }]),
            ..Default::default()
        };
        let spec = json!({ "openapi": "3.0.0", "info": { "title": "Pets" },
                           "paths": { "/pets": { "get": {}, "post": {} }, "/pets/{id}": { "get": {} } } });
        PayloadDiscovery::new(Some(project), None, Some(spec))
    }

    fn request(name: &str) -> GenerateRequest {
        GenerateRequest {
            api_name: name.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_generate_tracks_new_api() {
        let tmp = ready_dir();
        let runtime = FakeRuntime::writing(&["index.ts"]);
        let mut store = ConfigStore::open(tmp.path()).unwrap();

        let outcome = workflow(&runtime, tmp.path()).run_generate(&mut store, &request("pets"), &discovery());

        assert!(outcome.success, "{}", outcome.message);
        assert_eq!(outcome.result.as_ref().unwrap().files, vec!["index.ts"]);
        assert_eq!(outcome.profile.as_ref().unwrap().output_path, "src/api/pet-store-api");
        let phases: Vec<_> = outcome.phases.iter().map(|p| p.phase).collect();
        assert_eq!(phases, Phase::ALL.to_vec());

        store.reload().unwrap();
        let saved = store.get("pets").unwrap();
        assert_eq!(saved.apifox.project_id, "1001");
        assert_eq!(saved.apifox.document_id, "2002");
        assert_eq!(saved.apifox.api_count, Some(3));
        assert_eq!(saved.auto_discovered, Some(true));
        assert!(saved.last_generated.is_some());
    }

    #[test]
    fn test_preflight_failure_stops_before_discovery() {
        let tmp = TempDir::new().unwrap();
        let runtime = FakeRuntime::with_status(RuntimeStatus::DaemonDown);
        let mut store = ConfigStore::open(tmp.path()).unwrap();

        let outcome = workflow(&runtime, tmp.path()).run_generate(&mut store, &request("pets"), &discovery());

        assert!(!outcome.success);
        assert_eq!(outcome.phases.len(), 1);
        assert_eq!(outcome.phases[0].status, PhaseStatus::Failed);
        assert_eq!(outcome.preflight.as_ref().unwrap().issues.len(), 3);
        assert!(outcome.message.contains("apifox.config.json not found"));
        assert!(outcome.message.contains("sudo systemctl start docker"));
        assert_eq!(runtime.calls(), 0);
        assert!(store.load().is_none());
    }

    #[test]
    fn test_generation_failure_offers_guide_and_skips_save() {
        let tmp = ready_dir();
        let runtime = FakeRuntime::failing(1, "Permission denied: /local/src/api");
        let mut store = ConfigStore::open(tmp.path()).unwrap();

        let req = GenerateRequest {
            project_id: Some("1001".to_string()),
            ..request("pets")
        };
        let outcome = workflow(&runtime, tmp.path()).run_generate(&mut store, &req, &discovery());

        assert!(!outcome.success);
        assert!(outcome.message.contains("chown"));
        let guide = outcome.guide.unwrap();
        assert!(guide.contains("project/1001"));
        assert!(guide.contains("\"documentId\": \"2002\""));
        assert_eq!(outcome.phases.last().unwrap().phase, Phase::Generate);
        store.reload().unwrap();
        assert!(store.get("pets").is_none());
    }

    #[test]
    fn test_missing_spec_fails_in_discovery() {
        let tmp = ready_dir();
        let runtime = FakeRuntime::available();
        let mut store = ConfigStore::open(tmp.path()).unwrap();
        let empty = PayloadDiscovery::new(None, None, None);

        let outcome = workflow(&runtime, tmp.path()).run_generate(&mut store, &request("pets"), &empty);

        assert!(!outcome.success);
        assert!(outcome.message.contains("--project-id"));
        assert_eq!(outcome.phases.last().unwrap().phase, Phase::Discovery);
        assert_eq!(runtime.calls(), 0);
    }

    #[test]
    fn test_explicit_choices_override_recommendation() {
        let tmp = ready_dir();
        let runtime = FakeRuntime::available();
        let mut store = ConfigStore::open(tmp.path()).unwrap();

        let req = GenerateRequest {
            generator: Some(GeneratorType::TypescriptFetch),
            output_path: Some("web/api".to_string()),
            project_id: Some("1001".to_string()),
            ..request("pets")
        };
        let outcome = workflow(&runtime, tmp.path()).run_generate(&mut store, &req, &discovery());

        assert!(outcome.success);
        let invocation = runtime.invocations.borrow()[0].clone();
        assert_eq!(invocation.generator, GeneratorType::TypescriptFetch);
        assert_eq!(invocation.output_path, "web/api");
        store.reload().unwrap();
        assert_eq!(store.get("pets").unwrap().auto_discovered, Some(false));
    }

    #[test]
    fn test_failing_pre_hook_aborts_generation() {
        let tmp = ready_dir();
        let runtime = FakeRuntime::available();
        let mut store = ConfigStore::open(tmp.path()).unwrap();
        store
            .update_global(GlobalConfig {
                hooks: Some(HooksConfig {
                    pre_generate: Some(vec!["exit 7".to_string()]),
                    post_generate: None,
                }),
                ..Default::default()
            })
            .unwrap();

        let outcome = workflow(&runtime, tmp.path()).run_generate(&mut store, &request("pets"), &discovery());

        assert!(!outcome.success);
        assert_eq!(outcome.phases.last().unwrap().phase, Phase::PreHooks);
        assert!(outcome.message.contains("exit code 7"));
        assert_eq!(runtime.calls(), 0);
    }

    #[test]
    fn test_failing_post_hook_is_advisory() {
        let tmp = ready_dir();
        let runtime = FakeRuntime::available();
        let mut store = ConfigStore::open(tmp.path()).unwrap();
        let mut entry = sample_api("pets");
        entry.hooks = Some(HooksConfig {
            pre_generate: None,
            post_generate: Some(vec!["false".to_string()]),
        });
        store.add(entry).unwrap();

        let outcome = workflow(&runtime, tmp.path()).run_generate(&mut store, &request("pets"), &discovery());

        assert!(outcome.success);
        let post = outcome.phases.iter().find(|p| p.phase == Phase::PostHooks).unwrap();
        assert_eq!(post.status, PhaseStatus::Warned);
        store.reload().unwrap();
        assert!(store.get("pets").unwrap().last_generated.is_some());
    }

    #[test]
    fn test_update_regenerates_tracked_api() {
        let tmp = ready_dir();
        let runtime = FakeRuntime::writing(&["api.ts"]);
        let mut store = ConfigStore::open(tmp.path()).unwrap();
        store.add(sample_api("pets")).unwrap();

        let outcome = workflow(&runtime, tmp.path()).run_update(&mut store, "pets", &discovery());

        assert!(outcome.success, "{}", outcome.message);
        assert_eq!(runtime.invocations.borrow()[0].output_path, "src/api/pets");
        store.reload().unwrap();
        let saved = store.get("pets").unwrap();
        assert_eq!(saved.apifox.api_count, Some(3));
        assert_eq!(saved.apifox.project_name.as_deref(), Some("Pet Store"));
        assert!(saved.last_generated.is_some());
    }

    #[test]
    fn test_update_unknown_api() {
        let tmp = ready_dir();
        let runtime = FakeRuntime::available();
        let mut store = ConfigStore::open(tmp.path()).unwrap();

        let outcome = workflow(&runtime, tmp.path()).run_update(&mut store, "ghost", &discovery());

        assert!(!outcome.success);
        assert!(outcome.message.contains("api not found: ghost"));
    }

    #[test]
    fn test_missing_document_id_fails_in_discovery() {
        let tmp = ready_dir();
        let runtime = FakeRuntime::available();
        let mut store = ConfigStore::open(tmp.path()).unwrap();
        let project = ProjectInfo {
            id: "1001".to_string(),
            name: "Pet Store API".to_string(),
            documents: Some(Vec::new()),
            ..Default::default()
        };
        let spec = json!({ "openapi": "3.0.0", "info": {}, "paths": { "/pets": { "get": {} } } });
        let no_documents = PayloadDiscovery::new(Some(project), None, Some(spec));

        let req = GenerateRequest {
            project_id: Some("1001".to_string()),
            ..request("pets")
        };
        let outcome = workflow(&runtime, tmp.path()).run_generate(&mut store, &req, &no_documents);

        assert!(!outcome.success);
        assert_eq!(outcome.phases.last().unwrap().phase, Phase::Discovery);
        assert!(outcome.message.contains("--document-id"));
        assert_eq!(runtime.calls(), 0);
        store.reload().unwrap();
        assert!(store.get("pets").is_none());
    }

    #[test]
    fn test_global_default_generator_does_not_change_recommendation() {
        let tmp = ready_dir();
        let runtime = FakeRuntime::available();
        let mut store = ConfigStore::open(tmp.path()).unwrap();
        store
            .update_global(GlobalConfig {
                default_generator: Some(GeneratorType::TypescriptFetch),
                ..Default::default()
            })
            .unwrap();

        let outcome = workflow(&runtime, tmp.path()).run_generate(&mut store, &request("pets"), &discovery());

        assert!(outcome.success, "{}", outcome.message);
        assert_eq!(outcome.profile.as_ref().unwrap().generator, GeneratorType::TypescriptAxios);
        assert_eq!(runtime.invocations.borrow()[0].generator, GeneratorType::TypescriptAxios);
    }

    #[test]
    fn test_regenerate_keeps_tracked_output_path() {
        let tmp = ready_dir();
        let runtime = FakeRuntime::available();
        let mut store = ConfigStore::open(tmp.path()).unwrap();
        let mut entry = sample_api("pets");
        entry.generator.generator_type = GeneratorType::TypescriptNode;
        store.add(entry).unwrap();

        let outcome = workflow(&runtime, tmp.path()).run_generate(&mut store, &request("pets"), &discovery());

        assert!(outcome.success, "{}", outcome.message);
        let invocation = runtime.invocations.borrow()[0].clone();
        assert_eq!(invocation.output_path, "src/api/pets");
        assert_eq!(invocation.generator, GeneratorType::TypescriptNode);
        store.reload().unwrap();
        let saved = store.get("pets").unwrap();
        assert_eq!(saved.generator.output_path, "src/api/pets");
        assert_eq!(saved.generator.generator_type, GeneratorType::TypescriptNode);
    }

    #[test]
    fn test_regenerate_with_explicit_output_moves_tracked_entry() {
        let tmp = ready_dir();
        let runtime = FakeRuntime::available();
        let mut store = ConfigStore::open(tmp.path()).unwrap();
        store.add(sample_api("pets")).unwrap();

        let req = GenerateRequest {
            output_path: Some("web/pets".to_string()),
            ..request("pets")
        };
        let outcome = workflow(&runtime, tmp.path()).run_generate(&mut store, &req, &discovery());

        assert!(outcome.success, "{}", outcome.message);
        assert_eq!(runtime.invocations.borrow()[0].output_path, "web/pets");
        store.reload().unwrap();
        assert_eq!(store.get("pets").unwrap().generator.output_path, "web/pets");
    }

    #[test]
    fn test_first_line_skips_blank_lines() {
        assert_eq!(first_line("\n\nfirst\nsecond"), "first");
        assert_eq!(first_line(""), "");
    }
}
