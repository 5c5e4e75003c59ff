//! 按顺序回退的选择器解析器
//!
//! 一个字段的抽取规则被描述为一组有序的策略（从最具体的结构匹配
//! 到最宽泛的全文扫描），由 [`SelectorResolver`] 统一执行：
//! 依次尝试每个策略，返回第一个产出合格候选的策略结果；
//! 全部失败时返回 [`Resolution::NotFound`]，不会向上抛错。

use crate::extract::deny_list::DenyList;
use crate::models::content::{ContentNode, NodeMatcher};

/// 候选文本从哪里来
#[derive(Debug, Clone)]
pub enum Locator {
    /// 匹配元素的全部文本
    Elements(NodeMatcher),
    /// 页面上所有非空文本节点
    TextNodes,
}

/// 从合格候选中如何取值
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// 文档顺序中的第一个
    First,
    /// 最长的一个，长度相同时取先出现的
    Longest,
    /// 全部（去重，保持文档顺序）
    All,
    /// 按字母数量打分取前 n 个（去重）
    Top(usize),
}

/// 单个策略
#[derive(Clone)]
pub struct Strategy {
    pub name: &'static str,
    pub locator: Locator,
    pub selection: Selection,
    /// 本策略额外的过滤条件
    pub filter: Option<fn(&str) -> bool>,
    /// 替换解析器黑名单，只对本策略生效
    pub deny_list: Option<DenyList>,
}

impl Strategy {
    pub fn new(name: &'static str, locator: Locator, selection: Selection) -> Self {
        Self {
            name,
            locator,
            selection,
            filter: None,
            deny_list: None,
        }
    }

    pub fn elements(name: &'static str, matcher: NodeMatcher, selection: Selection) -> Self {
        Self::new(name, Locator::Elements(matcher), selection)
    }

    pub fn with_filter(mut self, filter: fn(&str) -> bool) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn with_deny_list(mut self, deny_list: DenyList) -> Self {
        self.deny_list = Some(deny_list);
        self
    }
}

/// 解析结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution<T> {
    Found { value: T, strategy: &'static str },
    NotFound,
}

impl<T> Resolution<T> {
    pub fn is_found(&self) -> bool {
        matches!(self, Resolution::Found { .. })
    }

    /// 命中的策略名
    pub fn strategy(&self) -> Option<&'static str> {
        match self {
            Resolution::Found { strategy, .. } => Some(strategy),
            Resolution::NotFound => None,
        }
    }

    pub fn value(self) -> Option<T> {
        match self {
            Resolution::Found { value, .. } => Some(value),
            Resolution::NotFound => None,
        }
    }

    /// 未找到时使用默认值
    pub fn unwrap_or(self, default: T) -> T {
        self.value().unwrap_or(default)
    }

    pub fn unwrap_or_default(self) -> T
    where
        T: Default,
    {
        self.value().unwrap_or_default()
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Resolution<U> {
        match self {
            Resolution::Found { value, strategy } => Resolution::Found {
                value: f(value),
                strategy,
            },
            Resolution::NotFound => Resolution::NotFound,
        }
    }
}

/// 选择器解析器
pub struct SelectorResolver {
    strategies: Vec<Strategy>,
    accept: fn(&str) -> bool,
    deny_list: DenyList,
}

impl SelectorResolver {
    /// 创建解析器
    ///
    /// # 参数
    /// - `deny_list`: 默认黑名单，策略可用 [`Strategy::with_deny_list`] 替换
    /// - `accept`: 对所有策略生效的合格条件
    pub fn new(deny_list: DenyList, accept: fn(&str) -> bool) -> Self {
        Self {
            strategies: Vec::new(),
            accept,
            deny_list,
        }
    }

    /// 追加一个策略（越靠后越宽泛）
    pub fn then(mut self, strategy: Strategy) -> Self {
        self.strategies.push(strategy);
        self
    }

    /// 解析单值字段
    pub fn resolve_one(&self, root: &ContentNode) -> Resolution<String> {
        self.resolve_many(root)
            .map(|values| values.into_iter().next().unwrap_or_default())
    }

    /// 解析多值字段：返回第一个有结果的策略的全部选中值
    pub fn resolve_many(&self, root: &ContentNode) -> Resolution<Vec<String>> {
        for strategy in &self.strategies {
            let candidates = self.candidates(strategy, root);
            let selected = select(strategy.selection, candidates);
            if !selected.is_empty() {
                return Resolution::Found {
                    value: selected,
                    strategy: strategy.name,
                };
            }
        }
        Resolution::NotFound
    }

    /// 某个策略下的合格候选（文档顺序）
    fn candidates(&self, strategy: &Strategy, root: &ContentNode) -> Vec<String> {
        let raw: Vec<String> = match &strategy.locator {
            Locator::Elements(matcher) => root
                .find_all(matcher)
                .into_iter()
                .map(|node| node.text_content())
                .collect(),
            Locator::TextNodes => root.text_nodes(),
        };

        let deny_list = strategy.deny_list.unwrap_or(self.deny_list);
        raw.into_iter()
            .filter(|text| !text.is_empty())
            .filter(|text| (self.accept)(text))
            .filter(|text| strategy.filter.map_or(true, |f| f(text)))
            .filter(|text| !deny_list.matches(text))
            .collect()
    }
}

/// 按选择方式从候选中取值
fn select(selection: Selection, candidates: Vec<String>) -> Vec<String> {
    match selection {
        Selection::First => candidates.into_iter().take(1).collect(),
        Selection::Longest => {
            let mut best: Option<String> = None;
            for candidate in candidates {
                let longer = best
                    .as_ref()
                    .map_or(true, |b| candidate.chars().count() > b.chars().count());
                if longer {
                    best = Some(candidate);
                }
            }
            best.into_iter().collect()
        }
        Selection::All => dedup(candidates),
        Selection::Top(n) => {
            let mut unique = dedup(candidates);
            // 稳定排序，分数相同保持出现顺序
            unique.sort_by(|a, b| score(b).cmp(&score(a)));
            unique.truncate(n);
            unique
        }
    }
}

/// 启发式得分：长度 × 字母占比，即字母个数；再以总长度区分
pub fn score(text: &str) -> (usize, usize) {
    let alphabetic = text.chars().filter(|c| c.is_alphabetic()).count();
    (alphabetic, text.chars().count())
}

/// 按完全相同的文本去重，保留首次出现
pub fn dedup(values: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    values
        .into_iter()
        .filter(|v| seen.insert(v.clone()))
        .collect()
}
