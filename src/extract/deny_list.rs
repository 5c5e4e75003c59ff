//! 界面文字黑名单
//!
//! 覆盖三种界面语言的导航按钮和提示文字，
//! 结构化策略按整段匹配剔除，启发式文本扫描按包含关系剔除。

/// 导航按钮文字（小写）
const NAVIGATION_LABELS: &[&str] = &[
    // ru
    "назад",
    "далее",
    "завершить",
    // uz
    "oldingi",
    "keyingi",
    "yakunlash",
    // uzk
    "олдинги",
    "кейинги",
    "якунлаш",
];

/// 导航按钮之外的界面文字（小写）
const UI_LABELS: &[&str] = &[
    "savol",
    "izoh",
    "bilet",
    "natija",
    "показать",
    "объяснение",
    "изоҳ",
    "савол",
    "билет",
    "натижа",
];

const NAVIGATION_GROUPS: &[&[&str]] = &[NAVIGATION_LABELS];
const BOILERPLATE_GROUPS: &[&[&str]] = &[NAVIGATION_LABELS, UI_LABELS];
const NO_GROUPS: &[&[&str]] = &[];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MatchMode {
    /// 整段文字等于某个条目
    Exact,
    /// 文字中包含某个条目
    Substring,
}

/// 黑名单
#[derive(Debug, Clone, Copy)]
pub struct DenyList {
    groups: &'static [&'static [&'static str]],
    mode: MatchMode,
}

impl DenyList {
    /// 只排除恰好是导航按钮的文字（用于题干）
    pub const fn navigation() -> Self {
        Self {
            groups: NAVIGATION_GROUPS,
            mode: MatchMode::Exact,
        }
    }

    /// 只排除整段等于某个界面文字的候选（用于结构化选项）
    ///
    /// 真实选项里常出现"далее""назад"之类的词，不能按包含关系排除。
    pub const fn labels() -> Self {
        Self {
            groups: BOILERPLATE_GROUPS,
            mode: MatchMode::Exact,
        }
    }

    /// 排除包含任意界面文字的候选（仅用于全文扫描）
    pub const fn boilerplate() -> Self {
        Self {
            groups: BOILERPLATE_GROUPS,
            mode: MatchMode::Substring,
        }
    }

    /// 空黑名单
    pub const fn empty() -> Self {
        Self {
            groups: NO_GROUPS,
            mode: MatchMode::Exact,
        }
    }

    /// 候选文字是否命中黑名单
    pub fn matches(&self, text: &str) -> bool {
        let lowered = text.trim().to_lowercase();
        self.groups.iter().flat_map(|g| g.iter()).any(|label| match self.mode {
            MatchMode::Exact => lowered == *label,
            MatchMode::Substring => lowered.contains(label),
        })
    }
}
