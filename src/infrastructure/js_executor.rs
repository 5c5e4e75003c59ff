//! JS 执行器 - 基础设施层
//!
//! 持有唯一的 page 资源，只暴露"执行 JS"的能力

use chromiumoxide::Page;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value as JsonValue;
use tracing::debug;

use crate::error::SurfaceResult;

/// JS 执行器
///
/// 职责：
/// - 持有唯一的 Page 资源
/// - 暴露 eval() 能力
/// - 不认识题目 / 记录
pub struct JsExecutor {
    page: Page,
}

impl JsExecutor {
    pub fn new(page: Page) -> Self {
        Self { page }
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    /// 执行 JS 代码并返回 JSON 结果
    pub async fn eval(&self, js_code: impl Into<String>) -> SurfaceResult<JsonValue> {
        let js_code: String = js_code.into();
        let result = self.page.evaluate(js_code).await?;
        let json_value: JsonValue = result.into_value()?;
        Ok(json_value)
    }

    /// 执行 JS 代码并反序列化为指定类型
    pub async fn eval_as<T: DeserializeOwned>(&self, js_code: impl Into<String>) -> SurfaceResult<T> {
        let json_value = self.eval(js_code).await?;
        let typed_value = serde_json::from_value(json_value)?;
        Ok(typed_value)
    }

    /// 以 JSON 参数调用一个 JS 函数表达式
    ///
    /// `function_src` 形如 `(args) => {...}`，参数序列化后原样嵌入。
    pub async fn call<A: Serialize, T: DeserializeOwned>(&self, function_src: &str, args: &A) -> SurfaceResult<T> {
        let js_code = format!("({})({})", function_src, serde_json::to_string(args)?);
        self.eval_as(js_code).await
    }

    /// 页面是否仍可执行脚本
    pub async fn is_alive(&self) -> bool {
        match self.eval("1 + 1").await {
            Ok(value) => value.as_i64() == Some(2),
            Err(e) => {
                debug!("页面探活失败: {}", e);
                false
            }
        }
    }
}
