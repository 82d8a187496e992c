use crate::error::Result;
use crate::models::{ApiConfig, ApiConfigPatch};
use crate::storage::Storage;

/// 按名称查找 API 配置
pub fn get_api<'a>(storage: &'a Storage, name: &str) -> Option<&'a ApiConfig> {
    storage.state()?.apis.iter().find(|api| api.name == name)
}

/// 列出所有 API 配置（保持文档顺序）
pub fn list_apis(storage: &Storage) -> Vec<&ApiConfig> {
    match storage.state() {
        Some(state) => state.apis.iter().collect(),
        None => vec![],
    }
}

/// 添加 API 配置。同名则原位替换，否则追加；文档不存在时创建。
/// 写时持久化：先修改内存，保存失败则回滚。
pub fn add_api(storage: &mut Storage, api: ApiConfig) -> Result<()> {
    let previous = storage.state().cloned();

    let state = storage.state_or_init();
    match state.apis.iter().position(|a| a.name == api.name) {
        Some(pos) => state.apis[pos] = api,
        None => state.apis.push(api),
    }

    if let Err(e) = storage.save() {
        storage.replace_state(previous);
        return Err(e);
    }
    Ok(())
}

/// 部分更新。apifox / generator 子对象按字段合并，不整体替换。
/// 名称不存在时返回 false 且不写文件。
pub fn update_api(storage: &mut Storage, name: &str, patch: ApiConfigPatch) -> Result<bool> {
    let Some(state) = storage.state_mut() else {
        return Ok(false);
    };
    let Some(pos) = state.apis.iter().position(|a| a.name == name) else {
        return Ok(false);
    };

    let old = state.apis[pos].clone();
    merge_api(&mut state.apis[pos], patch);

    if let Err(e) = storage.save() {
        if let Some(state) = storage.state_mut() {
            state.apis[pos] = old;
        }
        return Err(e);
    }
    Ok(true)
}

/// 删除 API 配置，未找到返回 false 且不写文件
pub fn remove_api(storage: &mut Storage, name: &str) -> Result<bool> {
    let Some(state) = storage.state_mut() else {
        return Ok(false);
    };
    let Some(pos) = state.apis.iter().position(|a| a.name == name) else {
        return Ok(false);
    };

    let removed = state.apis.remove(pos);

    if let Err(e) = storage.save() {
        if let Some(state) = storage.state_mut() {
            state.apis.insert(pos, removed);
        }
        return Err(e);
    }
    Ok(true)
}

/// 顶层字段浅合并，apifox / generator 逐字段合并
pub fn merge_api(api: &mut ApiConfig, patch: ApiConfigPatch) {
    if let Some(description) = patch.description {
        api.description = Some(description);
    }
    if let Some(hooks) = patch.hooks {
        api.hooks = Some(hooks);
    }
    if let Some(ts) = patch.last_generated {
        api.last_generated = Some(ts);
    }
    if let Some(flag) = patch.auto_discovered {
        api.auto_discovered = Some(flag);
    }

    if let Some(apifox) = patch.apifox {
        if let Some(v) = apifox.project_id {
            api.apifox.project_id = v;
        }
        if let Some(v) = apifox.document_id {
            api.apifox.document_id = v;
        }
        if let Some(v) = apifox.project_name {
            api.apifox.project_name = Some(v);
        }
        if let Some(v) = apifox.api_count {
            api.apifox.api_count = Some(v);
        }
    }

    if let Some(generator) = patch.generator {
        if let Some(v) = generator.generator_type {
            api.generator.generator_type = v;
        }
        if let Some(v) = generator.output_path {
            api.generator.output_path = v;
        }
        if let Some(v) = generator.config_file {
            api.generator.config_file = Some(v);
        }
    }
}
