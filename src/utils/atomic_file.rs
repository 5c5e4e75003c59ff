//! 原子写文件
//!
//! 先写临时文件并 fsync，再 rename 到目标路径；
//! 任何一步失败都删除临时文件，目标文件保持原样。

use std::io;
use std::path::Path;

use tokio::io::AsyncWriteExt;

use crate::error::{ExtractError, ExtractResult};

/// 把 `bytes` 原子地写到 `path`，`tmp_path` 为中间文件
pub async fn write_atomically(path: &Path, tmp_path: &Path, bytes: &[u8]) -> ExtractResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| ExtractError::io_failure(parent.display().to_string(), e))?;
    }

    if let Err(e) = write_then_rename(path, tmp_path, bytes).await {
        // 临时文件可能是别的东西（例如同名目录），删除失败不影响返回的错误
        let _ = tokio::fs::remove_file(tmp_path).await;
        return Err(e);
    }
    Ok(())
}

async fn write_then_rename(path: &Path, tmp_path: &Path, bytes: &[u8]) -> ExtractResult<()> {
    let io_err = |p: &Path| {
        let p = p.display().to_string();
        move |e: io::Error| ExtractError::io_failure(p, e)
    };

    let mut file = tokio::fs::File::create(tmp_path).await.map_err(io_err(tmp_path))?;
    file.write_all(bytes).await.map_err(io_err(tmp_path))?;
    file.sync_all().await.map_err(io_err(tmp_path))?;
    drop(file);

    tokio::fs::rename(tmp_path, path).await.map_err(io_err(path))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_writes_and_leaves_no_tmp() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sub").join("a.json");
        let tmp = dir.path().join("sub").join("a.json.tmp");

        write_atomically(&path, &tmp, b"{}").await.unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), b"{}");
        assert!(!tmp.exists());
    }

    #[tokio::test]
    async fn test_rename_failure_removes_tmp() {
        let dir = tempfile::tempdir().unwrap();
        // 目标是一个非空目录，rename 必然失败
        let path = dir.path().join("a.json");
        std::fs::create_dir(&path).unwrap();
        std::fs::write(path.join("keep"), b"x").unwrap();
        let tmp = dir.path().join("a.json.tmp");

        let err = write_atomically(&path, &tmp, b"{}").await.unwrap_err();

        assert!(matches!(err, ExtractError::IoFailure { .. }));
        assert!(!tmp.exists());
        assert!(path.join("keep").exists());
    }
}
