//! 发现接口：列出/搜索项目、取项目信息、接口列表和 OpenAPI 文档。
//!
//! 真正的远程查询由外部工具完成，这里只消费它们的返回形态。
//! [`PayloadDiscovery`] 读取外部工具预先落盘的 JSON 文件。

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{GenError, Result};
use crate::models::{ApiInfo, ProjectInfo};

pub trait Discovery {
    fn list_projects(&self) -> Result<Vec<ProjectInfo>>;

    /// 名称或描述包含关键字（忽略大小写）
    fn search_projects(&self, keyword: &str) -> Result<Vec<ProjectInfo>> {
        let keyword = keyword.to_lowercase();
        Ok(self
            .list_projects()?
            .into_iter()
            .filter(|p| {
                p.name.to_lowercase().contains(&keyword)
                    || p.description
                        .as_deref()
                        .map(|d| d.to_lowercase().contains(&keyword))
                        .unwrap_or(false)
            })
            .collect())
    }

    fn project_info(&self, project_id: &str) -> Result<Option<ProjectInfo>>;

    fn list_apis(&self, project_id: &str) -> Result<Option<Vec<ApiInfo>>>;

    fn openapi_spec(&self, project_id: &str, document_id: &str) -> Result<Option<Value>>;
}

/// 基于文件的发现结果，每个部分都可缺省
#[derive(Debug, Clone, Default)]
pub struct PayloadDiscovery {
    project: Option<ProjectInfo>,
    apis: Option<Vec<ApiInfo>>,
    spec: Option<Value>,
}

#[derive(Debug, Clone, Default)]
pub struct PayloadPaths {
    pub project: Option<PathBuf>,
    pub apis: Option<PathBuf>,
    pub spec: Option<PathBuf>,
}

impl PayloadDiscovery {
    pub fn new(project: Option<ProjectInfo>, apis: Option<Vec<ApiInfo>>, spec: Option<Value>) -> Self {
        Self { project, apis, spec }
    }

    pub fn load(paths: &PayloadPaths) -> Result<Self> {
        Ok(Self {
            project: paths.project.as_deref().map(read_payload).transpose()?,
            apis: paths.apis.as_deref().map(read_payload).transpose()?,
            spec: paths.spec.as_deref().map(read_payload).transpose()?,
        })
    }

    pub fn project(&self) -> Option<&ProjectInfo> {
        self.project.as_ref()
    }

    pub fn apis(&self) -> Option<&[ApiInfo]> {
        self.apis.as_deref()
    }

    pub fn spec(&self) -> Option<&Value> {
        self.spec.as_ref()
    }

    /// 未指定项目文件时，项目 id 不做约束
    fn matches(&self, project_id: &str) -> bool {
        self.project
            .as_ref()
            .map(|p| p.id == project_id)
            .unwrap_or(true)
    }
}

impl Discovery for PayloadDiscovery {
    fn list_projects(&self) -> Result<Vec<ProjectInfo>> {
        Ok(self.project.iter().cloned().collect())
    }

    fn project_info(&self, project_id: &str) -> Result<Option<ProjectInfo>> {
        Ok(self.project.clone().filter(|p| p.id == project_id))
    }

    fn list_apis(&self, project_id: &str) -> Result<Option<Vec<ApiInfo>>> {
        Ok(self.apis.clone().filter(|_| self.matches(project_id)))
    }

    fn openapi_spec(&self, project_id: &str, _document_id: &str) -> Result<Option<Value>> {
        Ok(self.spec.clone().filter(|_| self.matches(project_id)))
    }
}

fn read_payload<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path).map_err(|source| GenError::PayloadRead {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!("读取发现数据: {}", path.display());
    Ok(serde_json::from_str(&content)?)
}
