//! 失败记录服务 - 业务能力层
//!
//! 只负责"写 failed.txt"能力，不关心流程

use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::Local;
use tokio::io::AsyncWriteExt;
use tracing::debug;

/// 失败记录
///
/// 每个失败的题目追加一行：时间、语言、编号、原因。
pub struct FailureLog {
    path: PathBuf,
}

impl FailureLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 追加一条失败记录
    pub async fn append(&self, language: &str, id: u32, reason: &str) -> Result<()> {
        debug!("写入失败记录: 题目 {} | {}", id, reason);

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;

        let line = format!(
            "{} | {} | 题目 {} | {}\n",
            Local::now().format("%Y-%m-%d %H:%M:%S"),
            language,
            id,
            reason.replace('\n', " ")
        );
        file.write_all(line.as_bytes()).await?;

        Ok(())
    }
}
