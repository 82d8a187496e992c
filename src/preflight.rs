//! 生成前的环境检查。
//!
//! 四项检查互相独立、全部执行，一次给出完整报告；
//! 任意一个 error 级别问题都会阻止后续生成。

use std::fmt;
use std::path::Path;

use serde::Serialize;

use crate::core::validate_document;
use crate::generator::ContainerRuntime;
use crate::settings::{self, CREDENTIAL_VAR, REGISTRATION_FILENAME};
use crate::storage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueCategory {
    Config,
    Registration,
    Env,
    Runtime,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Issue {
    pub severity: Severity,
    pub category: IssueCategory,
    pub message: String,
    pub remediation: String,
}

impl Issue {
    fn error(category: IssueCategory, message: impl Into<String>, remediation: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            category,
            message: message.into(),
            remediation: remediation.into(),
        }
    }

    fn warning(category: IssueCategory, message: impl Into<String>, remediation: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            category,
            message: message.into(),
            remediation: remediation.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreflightReport {
    pub passed: bool,
    pub issues: Vec<Issue>,
}

impl PreflightReport {
    /// passed 由 issues 推导，不单独设置
    pub fn from_issues(issues: Vec<Issue>) -> Self {
        let passed = !issues.iter().any(|i| i.severity == Severity::Error);
        Self { passed, issues }
    }

    pub fn errors(&self) -> impl Iterator<Item = &Issue> {
        self.issues.iter().filter(|i| i.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Issue> {
        self.issues.iter().filter(|i| i.severity == Severity::Warning)
    }
}

impl fmt::Display for PreflightReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.passed && self.issues.is_empty() {
            return writeln!(f, "environment check passed");
        }
        if !self.passed {
            writeln!(f, "environment check failed")?;
        }

        let errors: Vec<_> = self.errors().collect();
        if !errors.is_empty() {
            writeln!(f, "\nmust fix:")?;
            for (i, issue) in errors.iter().enumerate() {
                writeln!(f, "{}. {}", i + 1, issue.message)?;
                writeln!(f, "   fix: {}", issue.remediation)?;
            }
        }

        let warnings: Vec<_> = self.warnings().collect();
        if !warnings.is_empty() {
            writeln!(f, "\nshould fix:")?;
            for (i, issue) in warnings.iter().enumerate() {
                writeln!(f, "{}. {}", i + 1, issue.message)?;
                writeln!(f, "   suggestion: {}", issue.remediation)?;
            }
        }
        Ok(())
    }
}

type EnvLookup = Box<dyn Fn(&str) -> Option<String>>;

pub struct Preflight<'a> {
    runtime: &'a dyn ContainerRuntime,
    env_lookup: EnvLookup,
}

impl<'a> Preflight<'a> {
    /// 从进程环境读取凭证变量
    pub fn new(runtime: &'a dyn ContainerRuntime) -> Self {
        Self::with_env(runtime, |key| std::env::var(key).ok())
    }

    pub fn with_env(runtime: &'a dyn ContainerRuntime, lookup: impl Fn(&str) -> Option<String> + 'static) -> Self {
        Self {
            runtime,
            env_lookup: Box::new(lookup),
        }
    }

    pub fn check(&self, working_dir: &Path) -> PreflightReport {
        let mut issues = Vec::new();

        let config_path = settings::config_path(working_dir);
        if config_path.exists() {
            if let Some(issue) = config_warning(&config_path) {
                issues.push(issue);
            }
        } else {
            issues.push(Issue::error(
                IssueCategory::Config,
                format!("{} not found", settings::CONFIG_FILENAME),
                "run `apifox-gen init` to initialize the project",
            ));
        }

        if !working_dir.join(REGISTRATION_FILENAME).exists() {
            issues.push(Issue::error(
                IssueCategory::Registration,
                format!("{} not found", REGISTRATION_FILENAME),
                "register the Apifox tool server in .mcp.json for this project",
            ));
        }

        let credential = (self.env_lookup)(CREDENTIAL_VAR).filter(|v| !v.trim().is_empty());
        if credential.is_none() {
            issues.push(Issue::error(
                IssueCategory::Env,
                format!("environment variable {} is not set", CREDENTIAL_VAR),
                format!("export {}=\"APS-xxxxx\" and restart your session", CREDENTIAL_VAR),
            ));
        }

        let status = self.runtime.status();
        if !status.is_available() {
            issues.push(Issue::error(
                IssueCategory::Runtime,
                status.message(),
                status.remediation(),
            ));
        }

        let report = PreflightReport::from_issues(issues);
        if report.passed {
            tracing::info!("环境检查通过");
        } else {
            tracing::warn!("环境检查失败，{} 个问题", report.errors().count());
        }
        report
    }
}

/// 配置文件存在但结构有问题时给出警告，不影响 passed
fn config_warning(config_path: &Path) -> Option<Issue> {
    let message = match storage::read_raw(config_path) {
        Ok(Some(raw)) => {
            let validation = validate_document(&raw);
            if validation.valid {
                return None;
            }
            format!(
                "{} has problems: {}",
                settings::CONFIG_FILENAME,
                validation.errors.join("; ")
            )
        }
        Ok(None) => return None,
        Err(e) => e.to_string(),
    };
    Some(Issue::warning(
        IssueCategory::Config,
        message,
        "run `apifox-gen validate` and fix the reported fields",
    ))
}
