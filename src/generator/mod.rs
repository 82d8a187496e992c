//! 生成编排：运行时检查 → 规范校验 → 写临时规范 → 调用外部生成器 → 收集文件 → 清理。
//!
//! 线性流程，不重试。任何失败都在这里转换成 [`GenerationResult`]，不会向外抛出。

pub mod harvest;
pub mod runtime;

#[cfg(test)]
pub(crate) mod fake;

use std::path::{Path, PathBuf};
use std::time::Instant;

use serde_json::Value;

use crate::error::{advisory, GenError, Result};
use crate::inspect;
use crate::models::{GenerationFailure, GenerationResult, GeneratorConfig};
use crate::recommend;

pub use runtime::{ContainerRuntime, DockerRuntime, GeneratorInvocation, RuntimeStatus, ToolOutput};

const TEMP_SPEC_PREFIX: &str = ".temp-openapi-spec";

pub struct CodeGenerator<'a> {
    runtime: &'a dyn ContainerRuntime,
}

impl<'a> CodeGenerator<'a> {
    pub fn new(runtime: &'a dyn ContainerRuntime) -> Self {
        Self { runtime }
    }

    /// 生成客户端代码。耗时覆盖整个调用，失败时同样记录。
    pub fn generate(&self, spec: &Value, config: &GeneratorConfig, working_dir: &Path) -> GenerationResult {
        let started = Instant::now();

        match self.run_stages(spec, config, working_dir) {
            Ok(files) => {
                tracing::info!("生成完成，共 {} 个文件 -> {}", files.len(), config.output_path);
                GenerationResult {
                    success: true,
                    output_path: config.output_path.clone(),
                    files,
                    duration: started.elapsed(),
                    error: None,
                }
            }
            Err(e) => {
                tracing::warn!("生成失败: {}", e);
                GenerationResult {
                    success: false,
                    output_path: config.output_path.clone(),
                    files: vec![],
                    duration: started.elapsed(),
                    error: Some(GenerationFailure {
                        message: e.to_string(),
                        code: e.code(),
                    }),
                }
            }
        }
    }

    fn run_stages(&self, spec: &Value, config: &GeneratorConfig, working_dir: &Path) -> Result<Vec<String>> {
        let status = self.runtime.status();
        if !status.is_available() {
            return Err(GenError::RuntimeUnavailable(format!(
                "{}. {}",
                status.message(),
                status.remediation()
            )));
        }

        let validation = inspect::validate_spec(spec);
        if !validation.valid {
            return Err(GenError::InvalidSpec(validation.errors));
        }
        for warning in &validation.warnings {
            tracing::warn!("规范警告: {}", warning);
        }

        let temp = TempSpec::write(working_dir, spec)?;
        let invocation = build_invocation(config, working_dir, temp.file_name());

        let outcome = self
            .runtime
            .run(&invocation)
            .and_then(|output| {
                log_output(&output);
                if output.success() {
                    harvest::collect_files(&working_dir.join(&config.output_path))
                } else {
                    Err(tool_failure(&output))
                }
            });

        advisory("清理临时规范文件", temp.remove());
        outcome
    }
}

/// 组装调用参数。配置文件只有在磁盘上存在时才传递；
/// 未传配置文件时把该生成器的默认选项作为 additional-properties 传入。
pub fn build_invocation(config: &GeneratorConfig, working_dir: &Path, spec_file: &str) -> GeneratorInvocation {
    let config_file = config.config_file.as_ref().and_then(|file| {
        if working_dir.join(file).exists() {
            Some(file.clone())
        } else {
            tracing::warn!("生成器配置文件不存在，已忽略: {}", file);
            None
        }
    });

    let additional_properties = match config_file {
        Some(_) => serde_json::Map::new(),
        None => recommend::options_for(config.generator_type.as_str()),
    };

    GeneratorInvocation {
        working_dir: working_dir.to_path_buf(),
        spec_file: spec_file.to_string(),
        generator: config.generator_type,
        output_path: config.output_path.clone(),
        config_file,
        additional_properties,
    }
}

fn log_output(output: &ToolOutput) {
    if !output.stdout.trim().is_empty() {
        tracing::debug!("generator stdout:\n{}", output.stdout);
    }
    if !output.stderr.trim().is_empty() && !output.stderr.contains("Downloading") {
        tracing::warn!("generator stderr:\n{}", output.stderr);
    }
}

fn tool_failure(output: &ToolOutput) -> GenError {
    let detail = output
        .stderr
        .lines()
        .rev()
        .find(|line| !line.trim().is_empty())
        .map(|line| line.trim().to_string());

    let message = match (output.exit_code, detail) {
        (Some(code), Some(detail)) => format!("exit code {}: {}", code, detail),
        (Some(code), None) => format!("exit code {}", code),
        (None, Some(detail)) => format!("terminated by signal: {}", detail),
        (None, None) => "terminated by signal".to_string(),
    };
    GenError::ToolFailed {
        message,
        exit_code: output.exit_code,
    }
}

/// 工作目录下的一次性临时规范文件，文件名带 uuid，单次调用独占
struct TempSpec {
    path: PathBuf,
    file_name: String,
}

impl TempSpec {
    fn write(working_dir: &Path, spec: &Value) -> Result<Self> {
        let file_name = format!("{}-{}.json", TEMP_SPEC_PREFIX, uuid::Uuid::new_v4());
        let path = working_dir.join(&file_name);
        std::fs::write(&path, serde_json::to_string_pretty(spec)?)?;
        Ok(Self { path, file_name })
    }

    fn file_name(&self) -> &str {
        &self.file_name
    }

    fn remove(self) -> std::io::Result<()> {
        std::fs::remove_file(&self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::fake::FakeRuntime;
    use super::*;
    use crate::models::GeneratorType;
    use serde_json::json;
    use tempfile::TempDir;

    fn spec() -> Value {
        json!({ "openapi": "3.0.0", "info": { "title": "Pets", "version": "1" },
                "paths": { "/pets": { "get": {}, "post": {} } } })
    }

    fn config() -> GeneratorConfig {
        GeneratorConfig {
            generator_type: GeneratorType::TypescriptAxios,
            output_path: "src/api/pets".to_string(),
            config_file: None,
        }
    }

    fn leftover_temp_files(dir: &Path) -> usize {
        std::fs::read_dir(dir)
            .unwrap()
            .flatten()
            .filter(|e| e.file_name().to_string_lossy().starts_with(TEMP_SPEC_PREFIX))
            .count()
    }

    #[test]
    fn test_generate_success_harvests_files() {
        let tmp = TempDir::new().unwrap();
        let runtime = FakeRuntime::writing(&["index.ts", "apis/pets-api.ts"]);
        let result = CodeGenerator::new(&runtime).generate(&spec(), &config(), tmp.path());

        assert!(result.success);
        assert!(result.error.is_none());
        assert_eq!(result.output_path, "src/api/pets");
        assert_eq!(result.files, vec!["apis/pets-api.ts", "index.ts"]);
        assert_eq!(runtime.calls(), 1);
        assert_eq!(*runtime.spec_seen.borrow(), vec![true]);
        assert_eq!(leftover_temp_files(tmp.path()), 0);
    }

    #[test]
    fn test_missing_output_dir_is_success_with_no_files() {
        let tmp = TempDir::new().unwrap();
        let runtime = FakeRuntime::available();
        let result = CodeGenerator::new(&runtime).generate(&spec(), &config(), tmp.path());

        assert!(result.success);
        assert!(result.files.is_empty());
    }

    #[test]
    fn test_runtime_unavailable_fails_fast() {
        let tmp = TempDir::new().unwrap();
        let runtime = FakeRuntime::with_status(RuntimeStatus::DaemonDown);
        let result = CodeGenerator::new(&runtime).generate(&spec(), &config(), tmp.path());

        assert!(!result.success);
        let error = result.error.unwrap();
        assert!(error.message.contains("systemctl start docker"));
        assert_eq!(error.code.as_deref(), Some("RUNTIME_UNAVAILABLE"));
        assert_eq!(runtime.calls(), 0);
    }

    #[test]
    fn test_invalid_spec_fails_before_invocation() {
        let tmp = TempDir::new().unwrap();
        let runtime = FakeRuntime::available();
        let result = CodeGenerator::new(&runtime).generate(&json!({ "paths": {} }), &config(), tmp.path());

        assert!(!result.success);
        let error = result.error.unwrap();
        assert!(error.message.contains("info"));
        assert_eq!(runtime.calls(), 0);
        assert_eq!(leftover_temp_files(tmp.path()), 0);
    }

    #[test]
    fn test_tool_failure_is_structured() {
        let tmp = TempDir::new().unwrap();
        let runtime = FakeRuntime::failing(2, "Downloading...\n[error] permission denied on /local/src\n");
        let result = CodeGenerator::new(&runtime).generate(&spec(), &config(), tmp.path());

        assert!(!result.success);
        assert!(result.files.is_empty());
        let error = result.error.unwrap();
        assert!(error.message.contains("permission denied"));
        assert_eq!(error.code.as_deref(), Some("EXIT_2"));
        assert_eq!(leftover_temp_files(tmp.path()), 0);
    }

    #[test]
    fn test_spawn_error_carries_os_code() {
        let tmp = TempDir::new().unwrap();
        let mut runtime = FakeRuntime::available();
        runtime.spawn_error = Some(std::io::ErrorKind::PermissionDenied);
        let result = CodeGenerator::new(&runtime).generate(&spec(), &config(), tmp.path());

        assert!(!result.success);
        assert_eq!(result.error.unwrap().code.as_deref(), Some("PermissionDenied"));
        assert_eq!(leftover_temp_files(tmp.path()), 0);
    }

    #[test]
    fn test_config_file_passed_only_when_present() {
        let tmp = TempDir::new().unwrap();
        let mut cfg = config();
        cfg.config_file = Some("generator.json".to_string());

        let missing = build_invocation(&cfg, tmp.path(), "spec.json");
        assert!(missing.config_file.is_none());
        assert!(!missing.additional_properties.is_empty());

        std::fs::write(tmp.path().join("generator.json"), "{}").unwrap();
        let present = build_invocation(&cfg, tmp.path(), "spec.json");
        assert_eq!(present.config_file.as_deref(), Some("generator.json"));
        assert!(present.additional_properties.is_empty());
    }

    #[test]
    fn test_unknown_options_for_go_are_empty() {
        let tmp = TempDir::new().unwrap();
        let mut cfg = config();
        cfg.generator_type = GeneratorType::Go;
        let inv = build_invocation(&cfg, tmp.path(), "spec.json");
        assert_eq!(inv.generator, GeneratorType::Go);
        assert!(inv.additional_properties.is_empty());
    }

    #[test]
    fn test_tool_failure_message_without_stderr() {
        let err = tool_failure(&ToolOutput {
            exit_code: Some(1),
            ..Default::default()
        });
        assert_eq!(err.to_string(), "generator failed: exit code 1");
    }
}
