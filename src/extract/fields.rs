//! 字段抽取器
//!
//! 每个字段对应一条 [`SelectorResolver`] 策略链。单个字段找不到不算失败，
//! 只会取该字段的默认值（题干/解析为空、正确答案为 1、图片为默认图）。

use regex::Regex;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::ExtractError;
use crate::extract::deny_list::DenyList;
use crate::extract::resolver::{Locator, Resolution, Selection, SelectorResolver, Strategy};
use crate::models::content::{ContentNode, NodeMatcher};
use crate::models::extraction::ExtractionResult;

/// 正确答案图标的 class（新旧两种 lucide 命名）
const CONFIRMATION_MARKERS: &[&str] = &["lucide-check-circle", "lucide-circle-check"];

/// 选项 label 的 `for` 属性格式：`<题号>-opt-<从 0 开始的槽位>`
const SLOT_PATTERN: &str = r"-opt-(\d+)$";

/// 启发式扫描最多保留的选项数
const MAX_HEURISTIC_OPTIONS: usize = 4;

fn is_question_text(text: &str) -> bool {
    text.chars().count() > 10 && (text.contains('?') || text.contains('？'))
}

fn is_option_text(text: &str) -> bool {
    text.chars().count() > 3
}

fn is_explanation_text(text: &str) -> bool {
    text.chars().count() > 10
}

/// 全文扫描时"看起来像选项"的文本
fn looks_like_option(text: &str) -> bool {
    let len = text.chars().count();
    (5..=200).contains(&len)
        && !text.chars().all(|c| c.is_ascii_digit())
        && !text.contains('?')
        && text.chars().filter(|c| c.is_alphabetic()).count() > 3
}

/// 字段抽取器集合
pub struct FieldExtractors {
    question: SelectorResolver,
    options: SelectorResolver,
    explanation: SelectorResolver,
    slot_pattern: Regex,
    site_base_url: String,
    image_namespace: String,
}

impl FieldExtractors {
    /// 创建抽取器
    ///
    /// # 参数
    /// - `site_base_url`: 补全相对图片地址用的站点根地址
    /// - `image_namespace`: 题目图片路径中固定出现的片段
    pub fn new(site_base_url: impl Into<String>, image_namespace: impl Into<String>) -> Result<Self, regex::Error> {
        Ok(Self {
            question: question_resolver(),
            options: options_resolver(),
            explanation: explanation_resolver(),
            slot_pattern: Regex::new(SLOT_PATTERN)?,
            site_base_url: site_base_url.into(),
            image_namespace: image_namespace.into(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, regex::Error> {
        Self::new(config.site_base_url.clone(), config.image_namespace.clone())
    }

    /// 对一份页面快照执行所有字段抽取
    pub fn extract_all(&self, root: &ContentNode) -> ExtractionResult {
        let text = self.question_text(root);
        let options = self.options(root);
        let correct = self.correct_answer_index(root);
        let explanation = self.explanation(root);
        let image = self.image_url(root);

        log_resolution("题干", &text);
        log_resolution("选项", &options);
        log_resolution("正确答案", &correct);
        log_resolution("解析", &explanation);
        log_resolution("图片", &image);

        ExtractionResult {
            text: text.unwrap_or_default(),
            options: options.unwrap_or_default(),
            correct_index: correct.unwrap_or(1),
            explanation: explanation.unwrap_or_default(),
            image_url: image.value(),
        }
    }

    /// 题干
    pub fn question_text(&self, root: &ContentNode) -> Resolution<String> {
        self.question.resolve_one(root)
    }

    /// 选项（去重，不补齐）
    pub fn options(&self, root: &ContentNode) -> Resolution<Vec<String>> {
        self.options.resolve_many(root)
    }

    /// 正确答案序号（从 1 开始）
    ///
    /// 找到正确答案图标后向上找最近的 label：
    /// 优先用 `for` 属性里的槽位号（0 起）+ 1，
    /// 没有可解析的槽位时用该 label 在所有选项 label 中的位置。
    pub fn correct_answer_index(&self, root: &ContentNode) -> Resolution<usize> {
        let option_labels = root.find_all(&option_label_matcher());

        let mut found = Resolution::NotFound;
        root.walk(|node, ancestors| {
            if found.is_found() || !is_confirmation_marker(node) {
                return;
            }
            let Some(label) = ancestors.iter().rev().find(|a| a.tag == "label") else {
                return;
            };

            if let Some(slot) = label.attr("for").and_then(|f| self.parse_slot(f)) {
                found = Resolution::Found {
                    value: slot + 1,
                    strategy: "marker-slot",
                };
            } else if let Some(position) = option_labels.iter().position(|l| std::ptr::eq(*l, *label)) {
                found = Resolution::Found {
                    value: position + 1,
                    strategy: "marker-position",
                };
            }
        });
        found
    }

    /// 解析（需要先展开解析面板）
    pub fn explanation(&self, root: &ContentNode) -> Resolution<String> {
        self.explanation.resolve_one(root)
    }

    /// 题目图片的绝对地址
    pub fn image_url(&self, root: &ContentNode) -> Resolution<String> {
        let matcher = NodeMatcher::tag("img").attr_contains("src", self.image_namespace.as_str());
        match root.find_all(&matcher).first().and_then(|img| img.attr("src")) {
            Some(src) => Resolution::Found {
                value: absolutize(&self.site_base_url, src),
                strategy: "img-namespace",
            },
            None => Resolution::NotFound,
        }
    }

    fn parse_slot(&self, for_attr: &str) -> Option<usize> {
        self.slot_pattern
            .captures(for_attr)
            .and_then(|cap| cap.get(1))
            .and_then(|m| m.as_str().parse().ok())
    }
}

fn question_resolver() -> SelectorResolver {
    SelectorResolver::new(DenyList::navigation(), is_question_text)
        .then(Strategy::elements(
            "h3.tracking-tight",
            NodeMatcher::tag("h3").class_contains("tracking-tight"),
            Selection::First,
        ))
        .then(Strategy::elements(
            "h3.font-semibold",
            NodeMatcher::tag("h3").class_contains("font-semibold"),
            Selection::First,
        ))
        .then(Strategy::elements("h3", NodeMatcher::tag("h3"), Selection::First))
        .then(Strategy::elements(
            ".question-text",
            NodeMatcher::any().class_contains("question-text"),
            Selection::First,
        ))
        .then(Strategy::elements(
            "div.question",
            NodeMatcher::tag("div").class_contains("question"),
            Selection::First,
        ))
        .then(Strategy::elements(
            "p.question",
            NodeMatcher::tag("p").class_contains("question"),
            Selection::First,
        ))
        .then(Strategy::new("text-scan", Locator::TextNodes, Selection::Longest))
}

fn options_resolver() -> SelectorResolver {
    SelectorResolver::new(DenyList::labels(), is_option_text)
        .then(Strategy::elements(
            "answer-rows",
            NodeMatcher::tag("span").class_contains("flex-1").class_contains("text-sm"),
            Selection::All,
        ))
        .then(Strategy::elements(
            "option-labels",
            NodeMatcher::tag("span").inside(NodeMatcher::tag("label").attr_contains("for", "-opt-")),
            Selection::All,
        ))
        .then(Strategy::elements(
            "radio-labels",
            NodeMatcher::tag("span").inside(
                NodeMatcher::tag("label").has_descendant(NodeMatcher::tag("input").attr_equals("type", "radio")),
            ),
            Selection::All,
        ))
        .then(
            Strategy::new("text-scan", Locator::TextNodes, Selection::Top(MAX_HEURISTIC_OPTIONS))
                .with_filter(looks_like_option)
                .with_deny_list(DenyList::boilerplate()),
        )
}

fn explanation_resolver() -> SelectorResolver {
    SelectorResolver::new(DenyList::empty(), is_explanation_text).then(Strategy::elements(
        "p.text-foreground/80",
        NodeMatcher::tag("p")
            .class_contains("text-xs")
            .class_contains("sm:text-sm")
            .class_contains("text-foreground/80"),
        Selection::First,
    ))
}

/// 承载选项的 label：带槽位号，或内含单选框
fn option_label_matcher() -> NodeMatcher {
    NodeMatcher::tag("label").has_descendant(NodeMatcher::tag("input").attr_equals("type", "radio"))
}

fn is_confirmation_marker(node: &ContentNode) -> bool {
    node.tag == "svg" && CONFIRMATION_MARKERS.iter().any(|m| node.class_attr().contains(m))
}

/// 把页面上的图片地址补全为绝对地址
pub fn absolutize(base: &str, src: &str) -> String {
    if src.starts_with("http://") || src.starts_with("https://") {
        return src.to_string();
    }
    if let Some(rest) = src.strip_prefix("//") {
        return format!("https://{}", rest);
    }
    match reqwest::Url::parse(base).and_then(|b| b.join(src)) {
        Ok(url) => url.to_string(),
        Err(_) => format!("{}/{}", base.trim_end_matches('/'), src.trim_start_matches('/')),
    }
}

fn log_resolution<T: std::fmt::Debug>(field: &'static str, resolution: &Resolution<T>) {
    match resolution {
        Resolution::Found { value, strategy } => {
            debug!("    ✓ {} ({}): {:?}", field, strategy, value);
        }
        Resolution::NotFound => {
            warn!("    ⚠️ {}，使用默认值", ExtractError::NotFound { field });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractors() -> FieldExtractors {
        FieldExtractors::new("https://avtoimtihon.uz", "/quiz-images/").unwrap()
    }

    fn text(t: &str) -> ContentNode {
        ContentNode::text_node(t)
    }

    fn option_label(id: u32, slot: usize, body: &str, correct: bool) -> ContentNode {
        let for_attr = format!("{}-opt-{}", id, slot);
        let mut children = vec![
            ContentNode::element("input", &[("type", "radio")], vec![]),
            ContentNode::element("span", &[("class", "flex-1 text-sm")], vec![text(body)]),
        ];
        if correct {
            children.push(ContentNode::element(
                "svg",
                &[("class", "lucide lucide-check-circle h-5 w-5")],
                vec![],
            ));
        }
        ContentNode::element("label", &[("for", for_attr.as_str())], children)
    }

    fn page(children: Vec<ContentNode>) -> ContentNode {
        ContentNode::element("body", &[], children)
    }

    #[test]
    fn test_question_text_prefers_structural_heading() {
        let root = page(vec![
            ContentNode::element("button", &[], vec![text("Назад")]),
            ContentNode::element(
                "h3",
                &[("class", "font-semibold tracking-tight")],
                vec![text("Какой знак запрещает остановку?")],
            ),
            ContentNode::element("p", &[], vec![text("Очень длинный посторонний текст с вопросом внутри?")]),
        ]);
        let resolution = extractors().question_text(&root);
        assert_eq!(resolution.strategy(), Some("h3.tracking-tight"));
        assert_eq!(resolution.value().unwrap(), "Какой знак запрещает остановку?");
    }

    #[test]
    fn test_question_text_rejects_short_and_non_questions() {
        let root = page(vec![
            ContentNode::element("h3", &[], vec![text("Bilet 1")]),
            ContentNode::element("div", &[], vec![text("Qisqa?")]),
            ContentNode::element("div", &[], vec![text("Haydovchi qaysi holatda to'xtashi kerak?")]),
        ]);
        let resolution = extractors().question_text(&root);
        assert_eq!(resolution.strategy(), Some("text-scan"));
        assert_eq!(resolution.value().unwrap(), "Haydovchi qaysi holatda to'xtashi kerak?");
    }

    #[test]
    fn test_question_text_not_found() {
        let root = page(vec![ContentNode::element("h3", &[], vec![text("Без вопроса")])]);
        assert_eq!(extractors().question_text(&root), Resolution::NotFound);
    }

    #[test]
    fn test_options_from_answer_rows_in_order() {
        let root = page(vec![
            option_label(3, 0, "Faqat chapga", false),
            option_label(3, 1, "Faqat o'ngga", true),
            option_label(3, 2, "Faqat to'g'riga", false),
        ]);
        let options = extractors().options(&root);
        assert_eq!(options.strategy(), Some("answer-rows"));
        assert_eq!(
            options.value().unwrap(),
            vec!["Faqat chapga", "Faqat o'ngga", "Faqat to'g'riga"]
        );
    }

    #[test]
    fn test_options_mentioning_navigation_words_are_kept() {
        let root = page(vec![
            option_label(11, 0, "Продолжить движение прямо", false),
            option_label(11, 1, "Сдать назад до перекрёстка", true),
            option_label(11, 2, "Повернуть направо и далее прямо", false),
            ContentNode::element("button", &[], vec![text("Далее")]),
        ]);
        let extractors = extractors();

        let options = extractors.options(&root);
        assert_eq!(options.strategy(), Some("answer-rows"));
        assert_eq!(
            options.value().unwrap(),
            vec![
                "Продолжить движение прямо",
                "Сдать назад до перекрёстка",
                "Повернуть направо и далее прямо",
            ]
        );

        let extraction = extractors.extract_all(&root);
        assert_eq!(extraction.options.len(), 3);
        assert_eq!(extraction.correct_index, 2);
    }

    #[test]
    fn test_options_fall_back_to_label_pairs() {
        let label = |slot: usize, body: &str| {
            let for_attr = format!("9-opt-{}", slot);
            ContentNode::element(
                "label",
                &[("for", for_attr.as_str())],
                vec![ContentNode::element("span", &[], vec![text(body)])],
            )
        };
        let root = page(vec![label(0, "Вариант А"), label(1, "Вариант Б"), label(2, "Вариант А")]);
        let options = extractors().options(&root);
        assert_eq!(options.strategy(), Some("option-labels"));
        assert_eq!(options.value().unwrap(), vec!["Вариант А", "Вариант Б"]);
    }

    #[test]
    fn test_options_heuristic_scan_keeps_top_four() {
        let root = page(vec![
            ContentNode::element("div", &[], vec![text("Savol 5")]),
            ContentNode::element("div", &[], vec![text("12345")]),
            ContentNode::element("div", &[], vec![text("Bu qanday belgi?")]),
            ContentNode::element("div", &[], vec![text("Birinchi variant matni")]),
            ContentNode::element("div", &[], vec![text("Ikkinchi variant")]),
            ContentNode::element("div", &[], vec![text("Uchinchi javob varianti uzun")]),
            ContentNode::element("div", &[], vec![text("To'rtinchi")]),
            ContentNode::element("div", &[], vec![text("Beshinchi va eng uzun javob varianti")]),
        ]);
        let options = extractors().options(&root);
        assert_eq!(options.strategy(), Some("text-scan"));
        assert_eq!(
            options.value().unwrap(),
            vec![
                "Beshinchi va eng uzun javob varianti",
                "Uchinchi javob varianti uzun",
                "Birinchi variant matni",
                "Ikkinchi variant",
            ]
        );
    }

    #[test]
    fn test_correct_answer_from_marker_slot() {
        let root = page(vec![
            option_label(7, 0, "Вариант А", false),
            option_label(7, 1, "Вариант Б", true),
        ]);
        let correct = extractors().correct_answer_index(&root);
        assert_eq!(correct.strategy(), Some("marker-slot"));
        assert_eq!(correct.value(), Some(2));
    }

    #[test]
    fn test_correct_answer_from_label_position() {
        let radio_label = |body: &str, correct: bool| {
            let mut children = vec![
                ContentNode::element("input", &[("type", "radio")], vec![]),
                ContentNode::element("span", &[], vec![text(body)]),
            ];
            if correct {
                children.push(ContentNode::element("svg", &[("class", "lucide-circle-check")], vec![]));
            }
            ContentNode::element("label", &[], children)
        };
        let root = page(vec![
            radio_label("Birinchi", false),
            radio_label("Ikkinchi", false),
            radio_label("Uchinchi", true),
        ]);
        let correct = extractors().correct_answer_index(&root);
        assert_eq!(correct.strategy(), Some("marker-position"));
        assert_eq!(correct.value(), Some(3));
    }

    #[test]
    fn test_missing_marker_defaults_to_first_option() {
        let root = page(vec![option_label(4, 0, "Birinchi", false), option_label(4, 1, "Ikkinchi", false)]);
        let ex = extractors();
        assert_eq!(ex.correct_answer_index(&root), Resolution::NotFound);
        assert_eq!(ex.extract_all(&root).correct_index, 1);
    }

    #[test]
    fn test_explanation_signature() {
        let root = page(vec![
            ContentNode::element("p", &[("class", "text-xs")], vec![text("Boshqa matn juda uzun")]),
            ContentNode::element(
                "p",
                &[("class", "text-xs sm:text-sm text-foreground/80")],
                vec![text("Yo'l harakati qoidalarining 5-bandiga ko'ra.")],
            ),
        ]);
        assert_eq!(
            extractors().explanation(&root).value().unwrap(),
            "Yo'l harakati qoidalarining 5-bandiga ko'ra."
        );
        assert_eq!(extractors().explanation(&page(vec![])), Resolution::NotFound);
    }

    #[test]
    fn test_image_url_is_absolutized() {
        let root = page(vec![
            ContentNode::element("img", &[("src", "/logo.png")], vec![]),
            ContentNode::element("img", &[("src", "/quiz-images/42.webp")], vec![]),
        ]);
        assert_eq!(
            extractors().image_url(&root).value().unwrap(),
            "https://avtoimtihon.uz/quiz-images/42.webp"
        );
        assert!(!extractors().image_url(&page(vec![])).is_found());
    }

    #[test]
    fn test_absolutize_keeps_absolute_urls() {
        assert_eq!(
            absolutize("https://avtoimtihon.uz", "https://cdn.example.com/quiz-images/1.png"),
            "https://cdn.example.com/quiz-images/1.png"
        );
        assert_eq!(
            absolutize("https://avtoimtihon.uz", "//cdn.example.com/a.png"),
            "https://cdn.example.com/a.png"
        );
    }
}
