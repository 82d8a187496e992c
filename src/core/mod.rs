pub mod api;
pub mod global;
pub mod resolve;
pub mod validate;

use std::path::Path;

use crate::error::Result;
use crate::models::{ApiConfig, ApiConfigPatch, ApifoxConfig, GlobalConfig};
use crate::settings;
use crate::storage::{self, Storage};

pub use resolve::{api_name_to_path, resolve, EffectiveApiConfig};
pub use validate::{validate_config, validate_document, ConfigValidation};

/// 跟踪配置的唯一读写入口，其余组件只拿到值
pub struct ConfigStore {
    storage: Storage,
}

impl ConfigStore {
    /// 打开工作目录下的 apifox.config.json
    pub fn open(working_dir: &Path) -> Result<Self> {
        Self::at(&settings::config_path(working_dir))
    }

    pub fn at(file_path: &Path) -> Result<Self> {
        let storage = Storage::load(file_path)?;
        Ok(Self { storage })
    }

    pub fn reload(&mut self) -> Result<()> {
        self.storage.reload()
    }

    /// 当前文档；文件不存在时为 None
    pub fn load(&self) -> Option<&ApifoxConfig> {
        self.storage.state()
    }

    pub fn get(&self, name: &str) -> Option<&ApiConfig> {
        api::get_api(&self.storage, name)
    }

    pub fn list(&self) -> Vec<&ApiConfig> {
        api::list_apis(&self.storage)
    }

    pub fn global(&self) -> Option<&GlobalConfig> {
        global::get_global(&self.storage)
    }

    pub fn add(&mut self, entry: ApiConfig) -> Result<()> {
        api::add_api(&mut self.storage, entry)
    }

    pub fn update(&mut self, name: &str, patch: ApiConfigPatch) -> Result<bool> {
        api::update_api(&mut self.storage, name, patch)
    }

    pub fn remove(&mut self, name: &str) -> Result<bool> {
        api::remove_api(&mut self.storage, name)
    }

    pub fn update_global(&mut self, patch: GlobalConfig) -> Result<()> {
        global::update_global(&mut self.storage, patch)
    }

    pub fn init(&mut self) -> Result<()> {
        global::init_config(&mut self.storage)
    }

    /// 传入文档则校验该文档，否则按原始 JSON 校验磁盘上的文件
    pub fn validate(&self, document: Option<&ApifoxConfig>) -> Result<ConfigValidation> {
        if let Some(doc) = document {
            return Ok(validate_config(doc));
        }
        Ok(match storage::read_raw(self.storage.file_path())? {
            Some(raw) => validate_document(&raw),
            None => ConfigValidation::missing(),
        })
    }

    /// 合并 global 后的有效配置
    pub fn resolve(&self, name: &str) -> Option<EffectiveApiConfig> {
        self.get(name).map(|entry| resolve(entry, self.global()))
    }

    pub fn path(&self) -> &Path {
        self.storage.file_path()
    }
}
