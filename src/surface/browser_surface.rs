use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::error::SurfaceResult;
use crate::infrastructure::JsExecutor;
use crate::models::content::ContentNode;
use crate::surface::scripts::{EXPAND_EXPLANATION_SCRIPT, REVEAL_ANSWER_FN, SELECT_TARGET_FN, SNAPSHOT_SCRIPT};
use crate::surface::RenderSurface;

/// 题号点击脚本的返回值
#[derive(Debug, Deserialize)]
struct SelectOutcome {
    clicked: bool,
    strategy: Option<String>,
}

/// 基于浏览器页面的实现
pub struct BrowserSurface {
    executor: JsExecutor,
}

impl BrowserSurface {
    pub fn new(executor: JsExecutor) -> Self {
        Self { executor }
    }
}

impl RenderSurface for BrowserSurface {
    async fn select_target(&self, id: u32) -> SurfaceResult<bool> {
        let outcome: SelectOutcome = self.executor.call(SELECT_TARGET_FN, &json!({ "id": id })).await?;
        match &outcome.strategy {
            Some(strategy) => debug!("  题号 {} 通过 {} 定位", id, strategy),
            None => debug!("  题号 {} 的按钮未找到", id),
        }
        Ok(outcome.clicked)
    }

    async fn snapshot(&self) -> SurfaceResult<ContentNode> {
        self.executor.eval_as(SNAPSHOT_SCRIPT).await
    }

    async fn reveal_answer(&self, id: u32) -> SurfaceResult<bool> {
        self.executor.call(REVEAL_ANSWER_FN, &json!({ "id": id })).await
    }

    async fn expand_explanation(&self) -> SurfaceResult<bool> {
        self.executor.eval_as(EXPAND_EXPLANATION_SCRIPT).await
    }

    async fn is_reachable(&self) -> bool {
        self.executor.is_alive().await
    }
}
