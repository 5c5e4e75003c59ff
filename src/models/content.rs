//! 页面内容树
//!
//! 页面快照脚本把 `document.body` 序列化成这个结构，
//! 所有字段抽取都在 Rust 侧对这棵树进行，不再依赖浏览器。

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// 文本节点的标签名
pub const TEXT_TAG: &str = "#text";

/// 内容树节点（元素或文本）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentNode {
    /// 小写标签名，文本节点为 `#text`
    #[serde(default)]
    pub tag: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attrs: BTreeMap<String, String>,
    /// 仅文本节点有值
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ContentNode>,
}

impl ContentNode {
    /// 构造元素节点
    pub fn element(tag: &str, attrs: &[(&str, &str)], children: Vec<ContentNode>) -> Self {
        Self {
            tag: tag.to_lowercase(),
            attrs: attrs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            text: None,
            children,
        }
    }

    /// 构造文本节点
    pub fn text_node(text: impl Into<String>) -> Self {
        Self {
            tag: TEXT_TAG.to_string(),
            attrs: BTreeMap::new(),
            text: Some(text.into()),
            children: Vec::new(),
        }
    }

    pub fn is_text(&self) -> bool {
        self.tag == TEXT_TAG
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    /// class 属性的原始字符串
    pub fn class_attr(&self) -> &str {
        self.attr("class").unwrap_or("")
    }

    /// 节点内全部文本，逐段去除首尾空白后以单个空格连接
    pub fn text_content(&self) -> String {
        let mut parts = Vec::new();
        self.collect_text(&mut parts);
        parts.join(" ")
    }

    fn collect_text<'a>(&'a self, parts: &mut Vec<&'a str>) {
        if let Some(text) = &self.text {
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                parts.push(trimmed);
            }
        }
        for child in &self.children {
            child.collect_text(parts);
        }
    }

    /// 先序遍历，回调同时拿到从根到父节点的祖先链
    pub fn walk<'a, F>(&'a self, mut visit: F)
    where
        F: FnMut(&'a ContentNode, &[&'a ContentNode]),
    {
        let mut ancestors = Vec::new();
        self.walk_inner(&mut ancestors, &mut visit);
    }

    fn walk_inner<'a, F>(&'a self, ancestors: &mut Vec<&'a ContentNode>, visit: &mut F)
    where
        F: FnMut(&'a ContentNode, &[&'a ContentNode]),
    {
        visit(self, ancestors);
        ancestors.push(self);
        for child in &self.children {
            child.walk_inner(ancestors, visit);
        }
        ancestors.pop();
    }

    /// 按文档顺序查找所有匹配的元素
    pub fn find_all(&self, matcher: &NodeMatcher) -> Vec<&ContentNode> {
        let mut found = Vec::new();
        self.walk(|node, ancestors| {
            if matcher.matches(node, ancestors) {
                found.push(node);
            }
        });
        found
    }

    /// 所有非空文本节点（已去除首尾空白）
    pub fn text_nodes(&self) -> Vec<String> {
        let mut texts = Vec::new();
        self.walk(|node, _| {
            if let Some(text) = &node.text {
                let trimmed = text.trim();
                if !trimmed.is_empty() {
                    texts.push(trimmed.to_string());
                }
            }
        });
        texts
    }
}

/// 声明式的节点匹配条件
///
/// 相当于一个简化的 CSS 选择器：标签名、class 片段、属性条件，
/// 以及"位于某祖先之内"/"包含某后代"两种结构条件。
#[derive(Debug, Clone, Default)]
pub struct NodeMatcher {
    tag: Option<String>,
    class_fragments: Vec<String>,
    attr_equals: Vec<(String, String)>,
    attr_contains: Vec<(String, String)>,
    inside: Option<Box<NodeMatcher>>,
    has_descendant: Option<Box<NodeMatcher>>,
}

impl NodeMatcher {
    /// 匹配任意元素
    pub fn any() -> Self {
        Self::default()
    }

    pub fn tag(tag: &str) -> Self {
        Self {
            tag: Some(tag.to_lowercase()),
            ..Self::default()
        }
    }

    /// class 属性包含该片段（等价于 `[class*=...]`）
    pub fn class_contains(mut self, fragment: &str) -> Self {
        self.class_fragments.push(fragment.to_string());
        self
    }

    pub fn attr_equals(mut self, name: &str, value: impl Into<String>) -> Self {
        self.attr_equals.push((name.to_string(), value.into()));
        self
    }

    pub fn attr_contains(mut self, name: &str, fragment: impl Into<String>) -> Self {
        self.attr_contains.push((name.to_string(), fragment.into()));
        self
    }

    /// 要求某个祖先满足条件
    pub fn inside(mut self, ancestor: NodeMatcher) -> Self {
        self.inside = Some(Box::new(ancestor));
        self
    }

    /// 要求某个后代满足条件
    pub fn has_descendant(mut self, descendant: NodeMatcher) -> Self {
        self.has_descendant = Some(Box::new(descendant));
        self
    }

    /// 判断节点是否匹配；`ancestors` 为从根到父节点的链
    pub fn matches(&self, node: &ContentNode, ancestors: &[&ContentNode]) -> bool {
        if node.is_text() {
            return false;
        }
        if let Some(tag) = &self.tag {
            if &node.tag != tag {
                return false;
            }
        }

        let class_attr = node.class_attr();
        if !self
            .class_fragments
            .iter()
            .all(|fragment| class_attr.contains(fragment.as_str()))
        {
            return false;
        }

        if !self
            .attr_equals
            .iter()
            .all(|(name, value)| node.attr(name) == Some(value.as_str()))
        {
            return false;
        }

        if !self.attr_contains.iter().all(|(name, fragment)| {
            node.attr(name)
                .map(|v| v.contains(fragment.as_str()))
                .unwrap_or(false)
        }) {
            return false;
        }

        if let Some(ancestor) = &self.inside {
            let found = ancestors
                .iter()
                .enumerate()
                .any(|(i, candidate)| ancestor.matches(candidate, &ancestors[..i]));
            if !found {
                return false;
            }
        }

        if let Some(descendant) = &self.has_descendant {
            let mut found = false;
            for child in &node.children {
                if !child.find_all(descendant).is_empty() {
                    found = true;
                    break;
                }
            }
            if !found {
                return false;
            }
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tree() -> ContentNode {
        ContentNode::element(
            "body",
            &[],
            vec![
                ContentNode::element(
                    "h3",
                    &[("class", "text-lg font-semibold tracking-tight")],
                    vec![ContentNode::text_node("  Qaysi belgi?  ")],
                ),
                ContentNode::element(
                    "label",
                    &[("for", "7-opt-0")],
                    vec![
                        ContentNode::element("input", &[("type", "radio")], vec![]),
                        ContentNode::element(
                            "span",
                            &[("class", "flex-1 text-sm")],
                            vec![ContentNode::text_node("Birinchi")],
                        ),
                    ],
                ),
            ],
        )
    }

    #[test]
    fn test_text_content_trims_and_joins() {
        let node = ContentNode::element(
            "p",
            &[],
            vec![
                ContentNode::text_node(" Hello "),
                ContentNode::element("b", &[], vec![ContentNode::text_node("world ")]),
                ContentNode::text_node("   "),
            ],
        );
        assert_eq!(node.text_content(), "Hello world");
    }

    #[test]
    fn test_class_fragment_matching() {
        let tree = sample_tree();
        let matcher = NodeMatcher::tag("h3").class_contains("tracking-tight");
        let found = tree.find_all(&matcher);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].text_content(), "Qaysi belgi?");

        let none = tree.find_all(&NodeMatcher::tag("h3").class_contains("question"));
        assert!(none.is_empty());
    }

    #[test]
    fn test_inside_and_has_descendant() {
        let tree = sample_tree();

        let spans_in_option_labels =
            NodeMatcher::tag("span").inside(NodeMatcher::tag("label").attr_contains("for", "-opt-"));
        assert_eq!(tree.find_all(&spans_in_option_labels).len(), 1);

        let radio_labels =
            NodeMatcher::tag("label").has_descendant(NodeMatcher::tag("input").attr_equals("type", "radio"));
        assert_eq!(tree.find_all(&radio_labels).len(), 1);

        let checkbox_labels = NodeMatcher::tag("label")
            .has_descendant(NodeMatcher::tag("input").attr_equals("type", "checkbox"));
        assert!(tree.find_all(&checkbox_labels).is_empty());
    }

    #[test]
    fn test_deserialize_snapshot_json() {
        let json = serde_json::json!({
            "tag": "div",
            "attrs": { "class": "explain" },
            "children": [
                { "tag": "#text", "text": "matn" }
            ]
        });
        let node: ContentNode = serde_json::from_value(json).unwrap();
        assert_eq!(node.class_attr(), "explain");
        assert!(node.children[0].is_text());
        assert_eq!(node.text_nodes(), vec!["matn".to_string()]);
    }
}
