use std::io::Read;
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::sync::mpsc;
use std::thread;

use serde_json::{Map, Value};

use crate::error::{GenError, Result};
use crate::models::GeneratorType;
use crate::settings::Settings;

/// 容器内挂载点
pub const MOUNT_POINT: &str = "/local";

/// 容器运行时探测结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeStatus {
    Available,
    NotInstalled,
    DaemonDown,
}

impl RuntimeStatus {
    pub fn is_available(self) -> bool {
        self == RuntimeStatus::Available
    }

    pub fn message(self) -> &'static str {
        match self {
            RuntimeStatus::Available => "docker is available",
            RuntimeStatus::NotInstalled => "docker is not installed",
            RuntimeStatus::DaemonDown => "docker daemon is not running",
        }
    }

    pub fn remediation(self) -> &'static str {
        match self {
            RuntimeStatus::Available => "",
            RuntimeStatus::NotInstalled => {
                "install Docker Desktop (https://www.docker.com/products/docker-desktop) \
                 or run `brew install --cask docker`"
            }
            RuntimeStatus::DaemonDown => {
                "macOS: open -a Docker; Windows: start Docker Desktop; \
                 Linux: sudo systemctl start docker; then confirm with `docker ps`"
            }
        }
    }
}

/// 一次生成器调用需要的全部参数；路径均相对于 working_dir
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorInvocation {
    pub working_dir: PathBuf,
    pub spec_file: String,
    pub generator: GeneratorType,
    pub output_path: String,
    pub config_file: Option<String>,
    pub additional_properties: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ToolOutput {
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ToolOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// 外部生成器的能力接口，测试中用假实现替换 docker
pub trait ContainerRuntime {
    /// 廉价的存活探测
    fn status(&self) -> RuntimeStatus;

    /// 执行生成器并等待结束。进程无法启动或输出超限时返回 Err，
    /// 非零退出码放在 ToolOutput 里由调用方判断。
    fn run(&self, invocation: &GeneratorInvocation) -> Result<ToolOutput>;
}

/// 通过 `docker run` 调用 openapi-generator-cli
pub struct DockerRuntime {
    docker_bin: String,
    image: String,
    output_limit: usize,
}

impl DockerRuntime {
    pub fn new(settings: &Settings) -> Self {
        Self {
            docker_bin: settings.docker_bin.clone(),
            image: settings.image.clone(),
            output_limit: settings.output_limit,
        }
    }

    /// `docker` 之后的参数列表
    pub fn args(&self, invocation: &GeneratorInvocation) -> Vec<String> {
        let mount_source =
            std::path::absolute(&invocation.working_dir).unwrap_or_else(|_| invocation.working_dir.clone());
        let mut args = vec![
            "run".to_string(),
            "--rm".to_string(),
            "-v".to_string(),
            format!("{}:{}", mount_source.display(), MOUNT_POINT),
            self.image.clone(),
            "generate".to_string(),
            "-i".to_string(),
            container_path(&invocation.spec_file),
            "-g".to_string(),
            invocation.generator.to_string(),
            "-o".to_string(),
            container_path(&invocation.output_path),
            "--skip-validate-spec".to_string(),
        ];

        if let Some(config_file) = &invocation.config_file {
            args.push("-c".to_string());
            args.push(container_path(config_file));
        }

        if !invocation.additional_properties.is_empty() {
            args.push(format!(
                "--additional-properties={}",
                format_properties(&invocation.additional_properties)
            ));
        }

        args
    }

    fn quiet_status(&self, arg: &str) -> bool {
        Command::new(&self.docker_bin)
            .arg(arg)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|status| status.success())
            .unwrap_or(false)
    }
}

impl ContainerRuntime for DockerRuntime {
    fn status(&self) -> RuntimeStatus {
        if !self.quiet_status("--version") {
            return RuntimeStatus::NotInstalled;
        }
        if !self.quiet_status("ps") {
            return RuntimeStatus::DaemonDown;
        }
        RuntimeStatus::Available
    }

    fn run(&self, invocation: &GeneratorInvocation) -> Result<ToolOutput> {
        let args = self.args(invocation);
        tracing::info!("执行 {} {}", self.docker_bin, args.join(" "));

        let mut child = Command::new(&self.docker_bin)
            .args(&args)
            .current_dir(&invocation.working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        let (stdout, stderr) = match self.collect_output(&mut child) {
            Ok(streams) => streams,
            Err(e) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(e);
            }
        };

        if stdout.len() + stderr.len() > self.output_limit {
            let _ = child.kill();
            let _ = child.wait();
            tracing::warn!("生成器输出超过 {} 字节，已终止进程", self.output_limit);
            return Err(GenError::OutputLimitExceeded {
                limit: self.output_limit,
            });
        }

        let status = child.wait()?;
        Ok(ToolOutput {
            exit_code: status.code(),
            stdout: String::from_utf8_lossy(&stdout).into_owned(),
            stderr: String::from_utf8_lossy(&stderr).into_owned(),
        })
    }
}

#[derive(Debug, Clone, Copy)]
enum Stream {
    Stdout,
    Stderr,
}

impl DockerRuntime {
    /// 并发读取 stdout 和 stderr，每路最多读 limit + 1 字节。
    /// 合计超限时立即 kill 子进程，另一路随之读到 EOF。
    fn collect_output(&self, child: &mut Child) -> Result<(Vec<u8>, Vec<u8>)> {
        let cap = self.output_limit as u64 + 1;
        let (tx, rx) = mpsc::channel();

        if let Some(pipe) = child.stdout.take() {
            let tx = tx.clone();
            thread::spawn(move || {
                let _ = tx.send((Stream::Stdout, read_capped(pipe, cap)));
            });
        }
        if let Some(pipe) = child.stderr.take() {
            let tx = tx.clone();
            thread::spawn(move || {
                let _ = tx.send((Stream::Stderr, read_capped(pipe, cap)));
            });
        }
        drop(tx);

        let mut stdout = Vec::new();
        let mut stderr = Vec::new();
        for (stream, data) in rx {
            let data = data?;
            match stream {
                Stream::Stdout => stdout = data,
                Stream::Stderr => stderr = data,
            }
            if stdout.len() + stderr.len() > self.output_limit {
                let _ = child.kill();
            }
        }
        Ok((stdout, stderr))
    }
}

fn read_capped(pipe: impl Read, cap: u64) -> std::io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    pipe.take(cap).read_to_end(&mut buf)?;
    Ok(buf)
}

fn container_path(relative: &str) -> String {
    format!(
        "{}/{}",
        MOUNT_POINT,
        relative.trim_start_matches("./").trim_start_matches('/')
    )
}

/// `k=v,k2=v2`，字符串值不加引号
pub fn format_properties(props: &Map<String, Value>) -> String {
    props
        .iter()
        .map(|(k, v)| match v {
            Value::String(s) => format!("{}={}", k, s),
            other => format!("{}={}", k, other),
        })
        .collect::<Vec<_>>()
        .join(",")
}
