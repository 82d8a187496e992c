//! 生成失败后的提示文本：按错误信息分类给出排查步骤，以及手动生成指南。

use std::time::Duration;

use crate::core::api_name_to_path;
use crate::generator::runtime::format_properties;
use crate::models::GeneratorType;
use crate::recommend;
use crate::settings::{CONFIG_FILENAME, DEFAULT_IMAGE, DEFAULT_OUTPUT_BASE};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Runtime,
    Permission,
    Unclassified,
}

impl FailureKind {
    /// 按错误信息中的关键字分类，runtime 优先
    pub fn classify(message: &str) -> Self {
        let lower = message.to_lowercase();
        if lower.contains("docker") {
            FailureKind::Runtime
        } else if lower.contains("permission") {
            FailureKind::Permission
        } else {
            FailureKind::Unclassified
        }
    }

    pub fn remediation(self) -> String {
        match self {
            FailureKind::Runtime => format!(
                "possible causes:\n\
                 1. docker is not running\n\
                 2. the generator image failed to download\n\
                 3. the disk is full\n\
                 \n\
                 how to fix:\n\
                 1. confirm docker is running: docker ps\n\
                 2. pull the image by hand: docker pull {}\n\
                 3. check disk space: df -h\n",
                DEFAULT_IMAGE
            ),
            FailureKind::Permission => "possible cause: insufficient permissions\n\
                 \n\
                 how to fix:\n\
                 1. check the permissions of the output directory\n\
                 2. change the directory owner: sudo chown -R $USER .\n"
                .to_string(),
            FailureKind::Unclassified => "general steps:\n\
                 1. check the network connection\n\
                 2. restart docker\n\
                 3. rerun with RUST_LOG=debug for the full generator output\n\
                 4. follow the manual generation guide below\n"
                .to_string(),
        }
    }
}

/// 失败说明：错误信息 + 分类排查步骤
pub fn failure_message(error: &str) -> String {
    let kind = FailureKind::classify(error);
    format!("code generation failed\n\nerror: {}\n\n{}", error, kind.remediation())
}

/// 手动生成指南：导出规范、手动运行生成器、编辑跟踪配置、安装运行时依赖
pub fn manual_generation_guide(
    api_name: &str,
    project_id: Option<&str>,
    document_id: Option<&str>,
    generator: GeneratorType,
) -> String {
    let project_id = project_id.filter(|s| !s.is_empty()).unwrap_or("YOUR_PROJECT_ID");
    let document_id = document_id.filter(|s| !s.is_empty()).unwrap_or("YOUR_DOCUMENT_ID");
    let output_path = format!("{}/{}", DEFAULT_OUTPUT_BASE, api_name_to_path(api_name));

    let properties = format_properties(&recommend::options_for(generator.as_str()));
    let properties_line = if properties.is_empty() {
        String::new()
    } else {
        format!(" \\\n  --additional-properties={}", properties)
    };

    let mut guide = format!(
        r#"manual generation guide

automatic generation failed; you can finish it by hand.

step 1: export the OpenAPI spec

open https://app.apifox.com/project/{project_id}
choose "Export" -> "OpenAPI 3.0 JSON" and save it as openapi.json

step 2: generate the client

docker run --rm -v "${{PWD}}:/local" \
  {image} generate \
  -i /local/openapi.json \
  -g {generator} \
  -o /local/{output_path}{properties_line}

step 3: track it in {config}

{{
  "apis": [
    {{
      "name": "{api_name}",
      "apifox": {{ "projectId": "{project_id}", "documentId": "{document_id}" }},
      "generator": {{ "type": "{generator}", "outputPath": "{output_path}" }}
    }}
  ]
}}
"#,
        project_id = project_id,
        document_id = document_id,
        image = DEFAULT_IMAGE,
        generator = generator,
        output_path = output_path,
        properties_line = properties_line,
        config = CONFIG_FILENAME,
        api_name = api_name,
    );

    if let Some(dependency) = generator.runtime_dependency() {
        guide.push_str(&format!("\nstep 4: install the runtime dependency\n\n{}\n", dependency));
    }
    guide
}

/// 人类可读耗时：<1s 用毫秒，<1min 保留一位小数秒，否则 `Xm Ys`
pub fn format_duration(duration: Duration) -> String {
    let ms = duration.as_millis();
    if ms < 1_000 {
        format!("{}ms", ms)
    } else if ms < 60_000 {
        format!("{:.1}s", ms as f64 / 1000.0)
    } else {
        format!("{}m {}s", ms / 60_000, (ms % 60_000) / 1000)
    }
}
