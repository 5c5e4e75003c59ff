//! # Ticket Extractor
//!
//! 从练习页面逐题抽取题目（题干、选项、正确答案、解析、图片），
//! 按语言合并到每题一个的 JSON 记录中。
//!
//! ## 架构设计
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有稀缺资源（Page），只暴露能力
//! - `JsExecutor` - 唯一的 page owner，提供 eval() 能力
//! - `surface/` - `RenderSurface` 抽象：选中题号、读取内容树、显示答案
//!
//! ### ② 抽取层（Extract）
//! - `extract/` - 多策略字段抽取，策略链是声明式数据
//! - `SelectorResolver` - 按顺序尝试策略，过滤不合格候选
//! - `FieldExtractors` - 题干 / 选项 / 正确答案 / 解析 / 图片
//!
//! ### ③ 业务能力层（Services）
//! - `RecordStore` - 读取、合并、原子写入记录
//! - `ImageCache` - 先查缓存再下载，失败回退默认图片
//! - `FailureLog` - 写 failed.txt
//!
//! ### ④ 流程层（Workflow）
//! - `TargetFlow` - 单题流程（选中 → 等待 → 抽取 → 合并 → 写入）
//!
//! ### ⑤ 编排层（Orchestration）
//! - `PassRunner` - 顺序处理一轮题目并统计
//! - `App` - 浏览器、操作员交互、Ctrl-C

pub mod browser;
pub mod config;
pub mod error;
pub mod extract;
pub mod infrastructure;
pub mod models;
pub mod operator;
pub mod orchestrator;
pub mod services;
pub mod surface;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{ExtractError, SurfaceError};
pub use orchestrator::{App, PassRunner, PassSummary};
pub use surface::RenderSurface;
pub use workflow::TargetFlow;
