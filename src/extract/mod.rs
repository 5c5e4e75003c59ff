//! 字段抽取层
//!
//! - `resolver` - 通用的有序回退解析器
//! - `deny_list` - 界面文字黑名单
//! - `fields` - 各字段的策略链

pub mod deny_list;
pub mod fields;
pub mod resolver;

pub use deny_list::DenyList;
pub use fields::FieldExtractors;
pub use resolver::{Locator, Resolution, Selection, SelectorResolver, Strategy};
