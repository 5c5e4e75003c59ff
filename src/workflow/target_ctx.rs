//! 题目处理上下文
//!
//! 封装"我正在用哪种语言处理第几个题目"这一信息

use std::fmt::Display;

use crate::models::Language;

/// 题目处理上下文
#[derive(Debug, Clone, Copy)]
pub struct TargetCtx {
    /// 题目编号
    pub id: u32,

    /// 本轮抽取的语言
    pub language: Language,

    /// 在本轮中的序号（从1开始，仅用于日志显示）
    pub position: usize,

    /// 本轮题目总数
    pub total: usize,
}

impl TargetCtx {
    pub fn new(id: u32, language: Language, position: usize, total: usize) -> Self {
        Self {
            id,
            language,
            position,
            total,
        }
    }
}

impl Display for TargetCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}/{} 题目#{} {}]",
            self.position,
            self.total,
            self.id,
            self.language.code()
        )
    }
}
