use crate::error::{GenError, Result};
use crate::models::{ApifoxConfig, GeneratorType, GlobalConfig};
use crate::settings::{DEFAULT_OUTPUT_BASE, SCHEMA_URL};
use crate::storage::Storage;

pub fn get_global(storage: &Storage) -> Option<&GlobalConfig> {
    storage.state()?.global.as_ref()
}

/// 合并全局配置（浅合并，Some 覆盖）。文档不存在时创建空 apis 的文档。
pub fn update_global(storage: &mut Storage, patch: GlobalConfig) -> Result<()> {
    let previous = storage.state().cloned();

    let state = storage.state_or_init();
    let global = state.global.get_or_insert_with(GlobalConfig::default);
    if patch.default_generator.is_some() {
        global.default_generator = patch.default_generator;
    }
    if patch.output_base_dir.is_some() {
        global.output_base_dir = patch.output_base_dir;
    }
    if patch.hooks.is_some() {
        global.hooks = patch.hooks;
    }

    if let Err(e) = storage.save() {
        storage.replace_state(previous);
        return Err(e);
    }
    Ok(())
}

/// 初始化配置文件骨架；文件已存在则报错
pub fn init_config(storage: &mut Storage) -> Result<()> {
    if storage.exists() {
        return Err(GenError::ConfigAlreadyExists(storage.file_path().to_path_buf()));
    }

    let skeleton = ApifoxConfig {
        schema: Some(SCHEMA_URL.to_string()),
        global: Some(GlobalConfig {
            default_generator: Some(GeneratorType::TypescriptAxios),
            output_base_dir: Some(DEFAULT_OUTPUT_BASE.to_string()),
            hooks: None,
        }),
        apis: vec![],
    };

    let previous = storage.replace_state(Some(skeleton));
    if let Err(e) = storage.save() {
        storage.replace_state(previous);
        return Err(e);
    }
    tracing::info!("已创建 {:?}", storage.file_path());
    Ok(())
}
