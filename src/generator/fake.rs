//! 测试用的假容器运行时：记录调用，按需在输出目录写文件

use std::cell::RefCell;

use crate::error::{GenError, Result};
use crate::generator::runtime::{ContainerRuntime, GeneratorInvocation, RuntimeStatus, ToolOutput};

pub struct FakeRuntime {
    pub status: RuntimeStatus,
    pub exit_code: Option<i32>,
    pub stderr: String,
    pub spawn_error: Option<std::io::ErrorKind>,
    /// 成功时写入 output_path 下的相对路径
    pub files: Vec<String>,
    pub invocations: RefCell<Vec<GeneratorInvocation>>,
    /// 调用时临时规范文件是否存在
    pub spec_seen: RefCell<Vec<bool>>,
}

impl FakeRuntime {
    pub fn available() -> Self {
        Self {
            status: RuntimeStatus::Available,
            exit_code: Some(0),
            stderr: String::new(),
            spawn_error: None,
            files: vec![],
            invocations: RefCell::new(vec![]),
            spec_seen: RefCell::new(vec![]),
        }
    }

    pub fn with_status(status: RuntimeStatus) -> Self {
        Self {
            status,
            ..Self::available()
        }
    }

    pub fn writing(files: &[&str]) -> Self {
        Self {
            files: files.iter().map(|f| f.to_string()).collect(),
            ..Self::available()
        }
    }

    pub fn failing(exit_code: i32, stderr: &str) -> Self {
        Self {
            exit_code: Some(exit_code),
            stderr: stderr.to_string(),
            ..Self::available()
        }
    }

    pub fn calls(&self) -> usize {
        self.invocations.borrow().len()
    }
}

impl ContainerRuntime for FakeRuntime {
    fn status(&self) -> RuntimeStatus {
        self.status
    }

    fn run(&self, invocation: &GeneratorInvocation) -> Result<ToolOutput> {
        self.invocations.borrow_mut().push(invocation.clone());
        self.spec_seen
            .borrow_mut()
            .push(invocation.working_dir.join(&invocation.spec_file).exists());

        if let Some(kind) = self.spawn_error {
            return Err(GenError::IoError(std::io::Error::new(kind, "spawn failed")));
        }

        if self.exit_code == Some(0) {
            let out = invocation.working_dir.join(&invocation.output_path);
            for file in &self.files {
                let path = out.join(file);
                if let Some(parent) = path.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                std::fs::write(path, "// generated\n")?;
            }
        }

        Ok(ToolOutput {
            exit_code: self.exit_code,
            stdout: "generated".to_string(),
            stderr: self.stderr.clone(),
        })
    }
}
