//! 单题处理流程 - 流程层
//!
//! 核心职责：定义"一道题"的完整处理流程
//!
//! 流程顺序：
//! 1. 选中题号（限时）→ Located
//! 2. 等待页面稳定（轮询，限时）
//! 3. 显示答案、展开解析 → 读取内容 → 抽取字段 → Extracted
//! 4. 读取已有记录、补图片、合并 → Merged
//! 5. 原子写入 → Persisted
//!
//! 任一阶段失败都只影响当前题目，不做题目级重试。

use std::fmt::Display;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::config::{Config, RevealStrategy};
use crate::error::{ExtractError, SurfaceError};
use crate::extract::FieldExtractors;
use crate::models::{ContentNode, ExtractionResult, ImageRef, NodeMatcher, Translation};
use crate::services::{ImageCache, RecordStore};
use crate::surface::RenderSurface;
use crate::utils::logging::truncate_text;
use crate::workflow::target_ctx::TargetCtx;

/// 单题处理阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetStage {
    NotStarted,
    /// 已选中题号
    Located,
    /// 已抽取字段
    Extracted,
    /// 已合并到记录
    Merged,
    /// 已写入磁盘
    Persisted,
}

impl Display for TargetStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            TargetStage::NotStarted => "未开始",
            TargetStage::Located => "已定位",
            TargetStage::Extracted => "已抽取",
            TargetStage::Merged => "已合并",
            TargetStage::Persisted => "已写入",
        };
        f.write_str(name)
    }
}

/// 单题成功的结果
#[derive(Debug, Clone)]
pub struct TargetReport {
    /// 成功时总是 `Persisted`
    pub stage: TargetStage,
    pub path: PathBuf,
    pub option_count: usize,
    pub correct_answer: usize,
    pub image: ImageRef,
}

/// 单题失败：失败时所处的阶段和原因
#[derive(Debug)]
pub struct TargetFailure {
    /// 失败前最后到达的阶段
    pub stage: TargetStage,
    pub error: ExtractError,
}

impl TargetFailure {
    fn at(stage: TargetStage, error: ExtractError) -> Self {
        Self { stage, error }
    }
}

impl Display for TargetFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (阶段: {})", self.error, self.stage)
    }
}

/// 流程中的等待时间
#[derive(Debug, Clone, Copy)]
pub struct FlowTiming {
    pub select_timeout: Duration,
    pub settle_timeout: Duration,
    pub settle_poll: Duration,
    pub action_pause: Duration,
}

impl FlowTiming {
    pub fn from_config(config: &Config) -> Self {
        Self {
            select_timeout: config.select_timeout(),
            settle_timeout: config.settle_timeout(),
            settle_poll: config.settle_poll(),
            action_pause: config.action_pause(),
        }
    }
}

/// 单题处理流程
///
/// - 编排一道题的完整处理流程
/// - 不持有页面，页面由调用方传入
/// - 只依赖业务能力（extract / services）
pub struct TargetFlow {
    extractors: FieldExtractors,
    image_cache: ImageCache,
    store: RecordStore,
    timing: FlowTiming,
    reveal: RevealStrategy,
    verbose_logging: bool,
}

impl TargetFlow {
    pub fn new(config: &Config) -> Result<Self> {
        let extractors = FieldExtractors::from_config(config).context("无法构建字段抽取器")?;
        let image_cache = ImageCache::from_config(config).context("无法创建 HTTP 客户端")?;

        Ok(Self {
            extractors,
            image_cache,
            store: RecordStore::new(&config.questions_dir),
            timing: FlowTiming::from_config(config),
            reveal: config.reveal_strategy,
            verbose_logging: config.verbose_logging,
        })
    }

    pub async fn run<S: RenderSurface>(&self, surface: &S, ctx: &TargetCtx) -> Result<TargetReport, TargetFailure> {
        let id = ctx.id;

        // ========== 1. 选中题号 ==========
        self.locate(surface, id)
            .await
            .map_err(|e| TargetFailure::at(TargetStage::NotStarted, e))?;
        let stage = TargetStage::Located;
        info!("{} 🎯 已选中题目", ctx);

        tokio::time::sleep(self.timing.action_pause).await;

        // ========== 2. 等待渲染 ==========
        self.settle(surface, id).await.map_err(|e| TargetFailure::at(stage, e))?;

        // ========== 3. 显示答案 / 展开解析 / 抽取 ==========
        self.prepare_answer(surface, ctx).await.map_err(|e| TargetFailure::at(stage, e))?;

        let root = match surface.snapshot().await {
            Ok(root) => root,
            Err(e) => return Err(TargetFailure::at(stage, classify(surface, id, e).await)),
        };
        let extraction = self.extractors.extract_all(&root);
        self.log_extraction(ctx, &extraction);
        let stage = TargetStage::Extracted;

        // ========== 4. 合并 ==========
        let record = self.store.load_or_create(id).await;
        let image = if record.image.is_default() {
            self.image_cache
                .resolve(id, extraction.image_url.as_deref())
                .await
                .map_err(|e| TargetFailure::at(stage, e))?
        } else {
            debug!("{} 记录已有图片，跳过下载", ctx);
            record.image.clone()
        };
        let translation = Translation::from_extraction(&extraction);
        if translation.correct_answer != extraction.correct_index {
            warn!(
                "{} ⚠️ 正确答案序号 {} 超出选项范围 (共 {} 项)，回退为 1",
                ctx,
                extraction.correct_index,
                translation.options.len()
            );
        }
        let option_count = translation.options.len();
        let correct_answer = translation.correct_answer;
        let record = RecordStore::merge(record, ctx.language, translation, &image);
        let stage = TargetStage::Merged;

        // ========== 5. 写入 ==========
        let path = self
            .store
            .persist(&record)
            .await
            .map_err(|e| TargetFailure::at(stage, e))?;
        let stage = TargetStage::Persisted;
        info!("{} 💾 已保存 {} ({})", ctx, path.display(), stage);

        Ok(TargetReport {
            stage,
            path,
            option_count,
            correct_answer,
            image: record.image,
        })
    }

    /// 在限定时间内选中题号
    async fn locate<S: RenderSurface>(&self, surface: &S, id: u32) -> Result<(), ExtractError> {
        match tokio::time::timeout(self.timing.select_timeout, surface.select_target(id)).await {
            Ok(Ok(true)) => Ok(()),
            Ok(Ok(false)) => Err(ExtractError::NavigationFailed {
                id,
                reason: "未找到题号按钮".to_string(),
            }),
            Ok(Err(e)) => Err(classify(surface, id, e).await),
            Err(_) => Err(ExtractError::NavigationFailed {
                id,
                reason: format!("选择超时 ({}ms)", self.timing.select_timeout.as_millis()),
            }),
        }
    }

    /// 轮询直到页面出现本题的选项
    ///
    /// 超时后本题失败（`TransientRenderTimeout`），页面上可能仍是上一题的内容。
    async fn settle<S: RenderSurface>(&self, surface: &S, id: u32) -> Result<(), ExtractError> {
        let poll = async {
            loop {
                match surface.snapshot().await {
                    Ok(root) if renders_target(&root, id) => return Ok(()),
                    Ok(_) => {}
                    Err(e) => {
                        if !surface.is_reachable().await {
                            return Err(ExtractError::SurfaceUnavailable(e.to_string()));
                        }
                        debug!("  题目 {} 读取内容失败，继续等待: {}", id, e);
                    }
                }
                tokio::time::sleep(self.timing.settle_poll).await;
            }
        };

        match tokio::time::timeout(self.timing.settle_timeout, poll).await {
            Ok(result) => result,
            Err(_) => Err(ExtractError::TransientRenderTimeout {
                id,
                waited_ms: self.timing.settle_timeout.as_millis() as u64,
            }),
        }
    }

    /// 显示正确答案并展开解析，尽力而为
    async fn prepare_answer<S: RenderSurface>(&self, surface: &S, ctx: &TargetCtx) -> Result<(), ExtractError> {
        if self.reveal == RevealStrategy::ClickFirstOption {
            match surface.reveal_answer(ctx.id).await {
                Ok(true) => tokio::time::sleep(self.timing.action_pause).await,
                Ok(false) => warn!("{} ⚠️ 未找到可点击的选项", ctx),
                Err(e) => best_effort(surface, ctx.id, "显示答案", e).await?,
            }
        }

        match surface.expand_explanation().await {
            Ok(true) => tokio::time::sleep(self.timing.action_pause).await,
            Ok(false) => debug!("{} 未找到解析按钮", ctx),
            Err(e) => best_effort(surface, ctx.id, "展开解析", e).await?,
        }

        Ok(())
    }

    // ========== 日志辅助方法 ==========

    fn log_extraction(&self, ctx: &TargetCtx, extraction: &ExtractionResult) {
        info!(
            "{} 📝 题干: {} | 选项 {} 个 | 正确答案 {}",
            ctx,
            truncate_text(&extraction.text, 80),
            extraction.options.len(),
            extraction.correct_index
        );

        if self.verbose_logging {
            for (i, option) in extraction.options.iter().enumerate() {
                debug!("{}   {}. {}", ctx, i + 1, option);
            }
            debug!("{}   解析: {}", ctx, truncate_text(&extraction.explanation, 120));
            debug!("{}   图片: {:?}", ctx, extraction.image_url);
        }
    }
}

/// 页面上是否已经出现 `for="<id>-opt-<n>"` 的选项
pub fn renders_target(root: &ContentNode, id: u32) -> bool {
    let prefix = format!("{}-opt-", id);
    root.find_all(&NodeMatcher::any())
        .into_iter()
        .any(|node| node.attr("for").is_some_and(|value| value.starts_with(&prefix)))
}

/// 页面调用失败时区分"页面已不可用"和"本题导航失败"
async fn classify<S: RenderSurface>(surface: &S, id: u32, err: SurfaceError) -> ExtractError {
    if surface.is_reachable().await {
        ExtractError::NavigationFailed {
            id,
            reason: err.to_string(),
        }
    } else {
        ExtractError::SurfaceUnavailable(err.to_string())
    }
}

/// 辅助动作失败只记日志，除非页面已经不可用
async fn best_effort<S: RenderSurface>(
    surface: &S,
    id: u32,
    action: &str,
    err: SurfaceError,
) -> Result<(), ExtractError> {
    if !surface.is_reachable().await {
        return Err(ExtractError::SurfaceUnavailable(err.to_string()));
    }
    warn!("⚠️  题目 {} {}失败: {}", id, action, err);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_renders_target_requires_exact_id_prefix() {
        let root = ContentNode::element(
            "div",
            &[],
            vec![ContentNode::element(
                "label",
                &[("for", "17-opt-0")],
                vec![ContentNode::text_node("Вариант")],
            )],
        );

        assert!(renders_target(&root, 17));
        assert!(!renders_target(&root, 7));
        assert!(!renders_target(&root, 1));
    }

    #[test]
    fn test_failure_display_mentions_stage() {
        let failure = TargetFailure::at(
            TargetStage::Located,
            ExtractError::NavigationFailed {
                id: 3,
                reason: "x".to_string(),
            },
        );
        assert!(failure.to_string().contains("已定位"));
    }
}
