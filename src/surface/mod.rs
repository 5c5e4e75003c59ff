//! 渲染页面（外部协作方）
//!
//! 抽取流程只通过 [`RenderSurface`] 与页面交互，
//! 真实实现是基于浏览器的 [`BrowserSurface`]，测试中可以替换为脚本化的假页面。

pub mod browser_surface;
pub mod scripts;

pub use browser_surface::BrowserSurface;

use crate::error::SurfaceResult;
use crate::models::content::ContentNode;

/// 可切换题目、可读取内容树的页面
///
/// 页面是有状态且顺序相关的：题目 N 的内容只在选中 N 之后有效，
/// 因此所有调用都是串行的。
#[allow(async_fn_in_trait)]
pub trait RenderSurface {
    /// 选中目标题目，返回是否找到并点击了题号
    async fn select_target(&self, id: u32) -> SurfaceResult<bool>;

    /// 读取当前渲染内容
    async fn snapshot(&self) -> SurfaceResult<ContentNode>;

    /// 让页面显示正确答案（选中任意选项后页面会标出正确项）
    async fn reveal_answer(&self, id: u32) -> SurfaceResult<bool>;

    /// 展开解析面板
    async fn expand_explanation(&self) -> SurfaceResult<bool>;

    /// 页面是否仍然可用
    async fn is_reachable(&self) -> bool;
}
