//! 单轮抽取 - 编排层
//!
//! ## 职责
//!
//! 按顺序遍历题目编号，对每个编号执行 [`TargetFlow`]，并统计结果。
//!
//! - 单个题目失败：记录到失败日志，继续下一个
//! - 页面不可用：立即停止，仍然返回统计
//! - 取消标志：在两个题目之间检查

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, warn};

use crate::models::Language;
use crate::services::FailureLog;
use crate::surface::RenderSurface;
use crate::workflow::{TargetCtx, TargetFlow};

/// 一轮抽取的统计
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassSummary {
    pub succeeded: usize,
    pub failed: usize,
    pub total: usize,
    /// 失败的题目编号，按处理顺序
    pub failed_ids: Vec<u32>,
    /// 是否因页面不可用或取消而提前结束
    pub aborted: bool,
}

impl PassSummary {
    fn new(total: usize) -> Self {
        Self {
            total,
            ..Default::default()
        }
    }

    /// 未处理的题目数（提前结束时大于 0）
    pub fn unprocessed(&self) -> usize {
        self.total.saturating_sub(self.succeeded + self.failed)
    }
}

/// 单轮抽取执行器
pub struct PassRunner {
    flow: TargetFlow,
    failure_log: FailureLog,
    inter_id_pause: Duration,
    cancel: Arc<AtomicBool>,
}

impl PassRunner {
    pub fn new(flow: TargetFlow, failure_log: FailureLog, inter_id_pause: Duration) -> Self {
        Self {
            flow,
            failure_log,
            inter_id_pause,
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    /// 取消标志，置为 true 后在下一个题目开始前停止
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        self.cancel.clone()
    }

    pub async fn run<S: RenderSurface>(&self, surface: &S, language: Language, ids: &[u32]) -> PassSummary {
        let mut summary = PassSummary::new(ids.len());

        for (index, &id) in ids.iter().enumerate() {
            if self.cancel.load(Ordering::SeqCst) {
                warn!("⛔ 收到取消请求，停止抽取");
                summary.aborted = true;
                break;
            }

            let ctx = TargetCtx::new(id, language, index + 1, ids.len());
            info!("\n📝 {} 开始处理", ctx);

            match self.flow.run(surface, &ctx).await {
                Ok(report) => {
                    summary.succeeded += 1;
                    info!(
                        "{} ✅ 处理成功 [{}] (选项 {} 个, 正确答案 {}, 图片 {})",
                        ctx,
                        report.stage,
                        report.option_count,
                        report.correct_answer,
                        report.image.as_str()
                    );
                }
                Err(failure) => {
                    summary.failed += 1;
                    summary.failed_ids.push(id);
                    error!("{} ❌ 处理失败: {}", ctx, failure);

                    if let Err(e) = self
                        .failure_log
                        .append(language.code(), id, &failure.to_string())
                        .await
                    {
                        warn!("⚠️  写入失败记录失败 ({}): {}", self.failure_log.path().display(), e);
                    }

                    if failure.error.is_fatal() {
                        error!("⛔ 页面不可用，终止本轮抽取");
                        summary.aborted = true;
                        break;
                    }
                }
            }

            if index + 1 < ids.len() {
                tokio::time::sleep(self.inter_id_pause).await;
            }
        }

        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unprocessed_count() {
        let summary = PassSummary {
            succeeded: 3,
            failed: 1,
            total: 10,
            failed_ids: vec![2],
            aborted: true,
        };
        assert_eq!(summary.unprocessed(), 6);
    }
}
