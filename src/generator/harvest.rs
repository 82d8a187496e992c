use std::path::Path;

use walkdir::WalkDir;

use crate::error::{GenError, Result};

/// 深度优先收集输出目录下的所有文件（不含目录），返回相对路径。
/// 目录不存在视为生成了零个文件。
pub fn collect_files(dir: &Path) -> Result<Vec<String>> {
    if !dir.exists() {
        return Ok(vec![]);
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.map_err(|e| GenError::IoError(e.into()))?;
        if entry.file_type().is_dir() {
            continue;
        }
        let relative = entry.path().strip_prefix(dir).unwrap_or(entry.path());
        files.push(relative.to_string_lossy().replace('\\', "/"));
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_collect_nested_files() {
        let tmp = TempDir::new().unwrap();
        let out = tmp.path().join("out");
        std::fs::create_dir_all(out.join("apis")).unwrap();
        std::fs::create_dir_all(out.join("models/empty")).unwrap();
        std::fs::write(out.join("index.ts"), "").unwrap();
        std::fs::write(out.join("apis/pet-api.ts"), "").unwrap();
        std::fs::write(out.join("models/pet.ts"), "").unwrap();

        let files = collect_files(&out).unwrap();
        assert_eq!(files, vec!["apis/pet-api.ts", "index.ts", "models/pet.ts"]);
    }

    #[test]
    fn test_missing_dir_is_empty() {
        let tmp = TempDir::new().unwrap();
        assert!(collect_files(&tmp.path().join("nope")).unwrap().is_empty());
    }

    #[test]
    fn test_empty_dir_is_empty() {
        let tmp = TempDir::new().unwrap();
        assert!(collect_files(tmp.path()).unwrap().is_empty());
    }
}
