//! 编排层（Orchestration Layer）
//!
//! ## 模块划分
//!
//! ### `app` - 应用生命周期
//! - 写日志文件头、连接或启动浏览器、准备目录
//! - 询问语言和题目范围，等待操作员确认
//! - 安装 Ctrl-C 处理，运行一轮抽取，输出统计
//!
//! ### `pass_runner` - 单轮抽取
//! - 按顺序遍历题目编号
//! - 委托 `workflow::TargetFlow` 处理单个题目
//! - 统计成功 / 失败
//!
//! ## 层次关系
//!
//! ```text
//! app (持有 Browser)
//!     ↓
//! pass_runner (处理 Vec<u32>)
//!     ↓
//! workflow::TargetFlow (处理单个题目)
//!     ↓
//! extract / services (能力层：抽取 / 记录 / 图片)
//!     ↓
//! surface → infrastructure (JsExecutor)
//! ```

pub mod app;
pub mod pass_runner;

pub use app::App;
pub use pass_runner::{PassRunner, PassSummary};
