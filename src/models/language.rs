use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

/// 页面支持的语言
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    /// 乌兹别克语（拉丁字母）
    Uz,
    /// 俄语
    Ru,
    /// 乌兹别克语（西里尔字母）
    Uzk,
}

impl Language {
    pub const ALL: [Language; 3] = [Language::Uz, Language::Ru, Language::Uzk];

    /// 记录中使用的语言代码
    pub fn code(self) -> &'static str {
        match self {
            Language::Uz => "uz",
            Language::Ru => "ru",
            Language::Uzk => "uzk",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Language::Uz => "Oʻzbekcha (lotin)",
            Language::Ru => "Русский",
            Language::Uzk => "Ўзбекча (кирилл)",
        }
    }
}

impl FromStr for Language {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "uz" => Ok(Language::Uz),
            "ru" => Ok(Language::Ru),
            "uzk" => Ok(Language::Uzk),
            other => Err(ConfigError::UnknownLanguage(other.to_string())),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// 单轮最多处理的题目数
pub const MAX_IDS_PER_PASS: u32 = 10_000;

/// 解析题目范围："7" 或 "17-75"（闭区间，起止颠倒时自动交换）
///
/// 超过 [`MAX_IDS_PER_PASS`] 个题目时报错，不会先分配整个列表。
pub fn parse_id_range(input: &str) -> Result<Vec<u32>, ConfigError> {
    let input = input.trim();
    let invalid = || ConfigError::InvalidIdRange(input.to_string());

    match input.split_once('-') {
        Some((start, end)) => {
            let start: u32 = start.trim().parse().map_err(|_| invalid())?;
            let end: u32 = end.trim().parse().map_err(|_| invalid())?;
            let (start, end) = if start > end { (end, start) } else { (start, end) };
            let count = u64::from(end - start) + 1;
            if count > u64::from(MAX_IDS_PER_PASS) {
                return Err(ConfigError::IdRangeTooLarge {
                    input: input.to_string(),
                    count,
                    max: MAX_IDS_PER_PASS,
                });
            }
            Ok((start..=end).collect())
        }
        None => {
            let id: u32 = input.parse().map_err(|_| invalid())?;
            Ok(vec![id])
        }
    }
}
