use std::path::{Path, PathBuf};

use crate::error::{GenError, Result};
use crate::models::ApifoxConfig;
use crate::settings::SCHEMA_URL;

/// 存储引擎：内存状态 + JSON 文件持久化。
/// 文件不存在是合法的"未初始化"状态，state 为 None。
pub struct Storage {
    state: Option<ApifoxConfig>,
    file_path: PathBuf,
}

impl Storage {
    /// 从 JSON 文件加载。文件不存在得到空状态；读取或解析失败直接返回错误。
    pub fn load(file_path: &Path) -> Result<Self> {
        let state = read_document(file_path)?;
        Ok(Self {
            state,
            file_path: file_path.to_path_buf(),
        })
    }

    /// 整个文档重新序列化后写回，不做局部写入
    pub fn save(&self) -> Result<()> {
        let state = self
            .state
            .as_ref()
            .ok_or_else(|| GenError::StorageError("nothing to save".to_string()))?;

        let mut doc = state.clone();
        if doc.schema.is_none() {
            doc.schema = Some(SCHEMA_URL.to_string());
        }
        let json = serde_json::to_string_pretty(&doc)
            .map_err(|e| GenError::StorageError(e.to_string()))?;

        if let Some(parent) = self.file_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        std::fs::write(&self.file_path, json)?;
        tracing::debug!("配置已写入 {:?}", self.file_path);
        Ok(())
    }

    /// 重新从磁盘读取，丢弃内存状态
    pub fn reload(&mut self) -> Result<()> {
        self.state = read_document(&self.file_path)?;
        Ok(())
    }

    pub fn state(&self) -> Option<&ApifoxConfig> {
        self.state.as_ref()
    }

    pub fn state_mut(&mut self) -> Option<&mut ApifoxConfig> {
        self.state.as_mut()
    }

    /// 替换整个状态，返回旧值（用于失败回滚）
    pub fn replace_state(&mut self, state: Option<ApifoxConfig>) -> Option<ApifoxConfig> {
        std::mem::replace(&mut self.state, state)
    }

    /// 状态为空时创建一个只有空 apis 的文档
    pub fn state_or_init(&mut self) -> &mut ApifoxConfig {
        self.state.get_or_insert_with(ApifoxConfig::default)
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    pub fn exists(&self) -> bool {
        self.file_path.exists()
    }
}

/// 读取原始 JSON，不做类型映射（校验用）
pub fn read_raw(file_path: &Path) -> Result<Option<serde_json::Value>> {
    let content = match read_content(file_path)? {
        Some(c) => c,
        None => return Ok(None),
    };
    serde_json::from_str(&content)
        .map(Some)
        .map_err(|source| GenError::ConfigParse {
            path: file_path.to_path_buf(),
            source,
        })
}

fn read_document(file_path: &Path) -> Result<Option<ApifoxConfig>> {
    let content = match read_content(file_path)? {
        Some(c) => c,
        None => return Ok(None),
    };
    serde_json::from_str::<ApifoxConfig>(&content)
        .map(Some)
        .map_err(|source| GenError::ConfigParse {
            path: file_path.to_path_buf(),
            source,
        })
}

fn read_content(file_path: &Path) -> Result<Option<String>> {
    match std::fs::read_to_string(file_path) {
        Ok(c) => Ok(Some(c)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(GenError::ConfigRead {
            path: file_path.to_path_buf(),
            source,
        }),
    }
}
