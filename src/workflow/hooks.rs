use std::path::Path;
use std::process::{Command, Stdio};

use crate::error::{GenError, Result};

/// 在工作目录中依次执行 hook 命令（`sh -c`），遇到第一个失败即停止
pub fn run_hooks(commands: &[String], working_dir: &Path) -> Result<()> {
    for command in commands {
        tracing::info!("执行 hook: {}", command);
        let output = Command::new("sh")
            .arg("-c")
            .arg(command)
            .current_dir(working_dir)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| GenError::HookFailed {
                command: command.clone(),
                reason: e.to_string(),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let reason = match output.status.code() {
                Some(code) => format!("exit code {}", code),
                None => "terminated by signal".to_string(),
            };
            let reason = match stderr.trim() {
                "" => reason,
                detail => format!("{}: {}", reason, detail),
            };
            return Err(GenError::HookFailed {
                command: command.clone(),
                reason,
            });
        }
    }
    Ok(())
}
