use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::extraction::ExtractionResult;

/// 默认图片（占位符）
pub const DEFAULT_IMAGE: &str = "data/images/defaultpic.jpg";

/// 记录中的图片引用
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ImageRef {
    /// 使用默认占位图
    #[default]
    Default,
    /// 已缓存图片的相对路径
    Path(String),
}

impl ImageRef {
    pub fn is_default(&self) -> bool {
        matches!(self, ImageRef::Default)
    }

    pub fn as_str(&self) -> &str {
        match self {
            ImageRef::Default => DEFAULT_IMAGE,
            ImageRef::Path(path) => path,
        }
    }
}

impl From<String> for ImageRef {
    fn from(value: String) -> Self {
        if value.is_empty() || value == DEFAULT_IMAGE {
            ImageRef::Default
        } else {
            ImageRef::Path(value)
        }
    }
}

impl From<ImageRef> for String {
    fn from(value: ImageRef) -> Self {
        value.as_str().to_string()
    }
}

/// 某一语言下的题目内容
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Translation {
    pub text: String,
    /// 带 "F<n>. " 前缀的选项
    pub options: Vec<String>,
    /// 正确答案序号（从 1 开始）
    pub correct_answer: usize,
    #[serde(default)]
    pub explanation: String,
}

impl Translation {
    /// 由抽取结果生成，选项按顺序加上 "F1. "、"F2. " 前缀，不补齐
    ///
    /// 正确答案序号超出 `[1, 选项数]` 时回退到 1。
    pub fn from_extraction(result: &ExtractionResult) -> Self {
        let options: Vec<String> = result
            .options
            .iter()
            .enumerate()
            .map(|(i, opt)| format!("F{}. {}", i + 1, opt))
            .collect();

        let correct_answer = if (1..=options.len()).contains(&result.correct_index) {
            result.correct_index
        } else {
            1
        };

        Self {
            text: result.text.clone(),
            options,
            correct_answer,
            explanation: result.explanation.clone(),
        }
    }
}

/// 单道题目的持久化记录，累积所有语言的内容
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    #[serde(alias = "questionId")]
    id: u32,
    #[serde(default)]
    pub image: ImageRef,
    #[serde(default)]
    pub translations: BTreeMap<String, Translation>,
}

impl Record {
    /// 新建空记录：默认图片，没有任何语言
    pub fn skeleton(id: u32) -> Self {
        Self {
            id,
            image: ImageRef::Default,
            translations: BTreeMap::new(),
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extraction(options: &[&str], correct_index: usize) -> ExtractionResult {
        ExtractionResult {
            text: "Qaysi javob to'g'ri?".to_string(),
            options: options.iter().map(|s| s.to_string()).collect(),
            correct_index,
            explanation: String::new(),
            image_url: None,
        }
    }

    #[test]
    fn test_options_labeled_contiguously_without_padding() {
        let t = Translation::from_extraction(&extraction(&["Alpha", "Beta", "Gamma"], 3));
        assert_eq!(t.options, vec!["F1. Alpha", "F2. Beta", "F3. Gamma"]);
        assert_eq!(t.correct_answer, 3);
    }

    #[test]
    fn test_out_of_range_index_falls_back_to_one() {
        assert_eq!(Translation::from_extraction(&extraction(&["Alpha", "Beta"], 4)).correct_answer, 1);
        assert_eq!(Translation::from_extraction(&extraction(&["Alpha"], 0)).correct_answer, 1);
        assert_eq!(Translation::from_extraction(&extraction(&[], 2)).correct_answer, 1);
    }

    #[test]
    fn test_image_ref_serializes_as_plain_string() {
        let record = Record::skeleton(12);
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["id"], 12);
        assert_eq!(json["image"], DEFAULT_IMAGE);

        let cached: ImageRef = serde_json::from_str("\"data/images/ticket_1_q12.png\"").unwrap();
        assert_eq!(cached, ImageRef::Path("data/images/ticket_1_q12.png".to_string()));
    }

    #[test]
    fn test_legacy_question_id_key_is_accepted() {
        let json = r#"{
            "questionId": 5,
            "image": "data/images/defaultpic.jpg",
            "translations": {
                "uz": { "text": "Savol matni?", "options": ["F1. Ha"], "correctAnswer": 1, "explanation": "" }
            }
        }"#;
        let record: Record = serde_json::from_str(json).unwrap();
        assert_eq!(record.id(), 5);
        assert!(record.image.is_default());
        assert_eq!(record.translations["uz"].options, vec!["F1. Ha"]);
    }
}
