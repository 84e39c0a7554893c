//! 文档树快照
//!
//! 页面通过 JS 序列化为扁平的 [`FlatNode`] 列表，在 Rust 侧重建为 `DomNode` 树，
//! 定位逻辑全部在 Rust 侧完成。扁平列表的 JSON 嵌套深度固定，不受页面 DOM 深度影响。

use serde::{Deserialize, Serialize};

use crate::error::{AppResult, DocumentError};

/// 题目节点的 ARIA role
pub const ROLE_LIST_ITEM: &str = "listitem";
pub const ROLE_HEADING: &str = "heading";
pub const ROLE_RADIO_GROUP: &str = "radiogroup";

/// 文档节点
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum DomNode {
    Element(Element),
    Text { text: String },
}

/// 元素节点
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Element {
    /// 小写标签名
    pub tag: String,
    #[serde(default)]
    pub role: Option<String>,
    /// 仅 img 有值（页面侧为绝对地址）
    #[serde(default)]
    pub src: Option<String>,
    /// 内联样式，只有新插入的标注块会带
    #[serde(default)]
    pub style: Option<String>,
    #[serde(default)]
    pub children: Vec<DomNode>,
}

/// 扁平快照中的一项，按先序排列
///
/// `parent` 为父项在列表中的下标，顶层节点为 `None`。
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FlatNode {
    Element {
        parent: Option<usize>,
        tag: String,
        #[serde(default)]
        role: Option<String>,
        #[serde(default)]
        src: Option<String>,
    },
    Text {
        parent: Option<usize>,
        text: String,
    },
}

impl DomNode {
    pub fn text(text: impl Into<String>) -> Self {
        DomNode::Text { text: text.into() }
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            DomNode::Element(el) => Some(el),
            DomNode::Text { .. } => None,
        }
    }
}

impl From<Element> for DomNode {
    fn from(el: Element) -> Self {
        DomNode::Element(el)
    }
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Default::default()
        }
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    pub fn with_src(mut self, src: impl Into<String>) -> Self {
        self.src = Some(src.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(DomNode::text(text));
        self
    }

    pub fn with_child(mut self, child: impl Into<DomNode>) -> Self {
        self.children.push(child.into());
        self
    }

    /// 由扁平快照重建文档树，顶层节点挂在 `body` 下
    ///
    /// 父项必须排在子项之前且为元素节点。
    pub fn from_flat(nodes: Vec<FlatNode>) -> AppResult<Element> {
        let mut parents = Vec::with_capacity(nodes.len());
        let mut built: Vec<Option<DomNode>> = Vec::with_capacity(nodes.len());

        for (index, node) in nodes.into_iter().enumerate() {
            let (parent, dom) = match node {
                FlatNode::Element { parent, tag, role, src } => (
                    parent,
                    DomNode::Element(Element {
                        tag,
                        role,
                        src,
                        ..Default::default()
                    }),
                ),
                FlatNode::Text { parent, text } => (parent, DomNode::Text { text }),
            };
            if parent.is_some_and(|p| p >= index) {
                return Err(DocumentError::MalformedSnapshot { index }.into());
            }
            parents.push(parent);
            built.push(Some(dom));
        }

        // 倒序挂载：处理到某一项时它的子项都已挂好，只需把顺序翻回来
        let mut root = Element::new("body");
        for index in (0..built.len()).rev() {
            let Some(mut node) = built[index].take() else {
                continue;
            };
            if let DomNode::Element(el) = &mut node {
                el.children.reverse();
            }
            match parents[index] {
                None => root.children.push(node),
                Some(p) => match built.get_mut(p) {
                    Some(Some(DomNode::Element(parent))) => parent.children.push(node),
                    _ => return Err(DocumentError::MalformedSnapshot { index }.into()),
                },
            }
        }
        root.children.reverse();
        Ok(root)
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.role.as_deref() == Some(role)
    }

    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(DomNode::as_element)
    }

    /// 所有文本后代按文档顺序拼接
    pub fn inner_text(&self) -> String {
        let mut out = String::new();
        collect_text(self, &mut out);
        out
    }

    /// 先序遍历中第一个满足条件的后代（不含自身）
    pub fn find_descendant(&self, pred: &impl Fn(&Element) -> bool) -> Option<&Element> {
        for child in self.child_elements() {
            if pred(child) {
                return Some(child);
            }
            if let Some(found) = child.find_descendant(pred) {
                return Some(found);
            }
        }
        None
    }

    /// 先序遍历中所有满足条件的后代（不含自身）
    pub fn find_descendants<'a>(&'a self, pred: &impl Fn(&Element) -> bool) -> Vec<&'a Element> {
        let mut found = Vec::new();
        collect_matching(self, pred, &mut found);
        found
    }
}

fn collect_text(el: &Element, out: &mut String) {
    for child in &el.children {
        match child {
            DomNode::Text { text } => out.push_str(text),
            DomNode::Element(inner) => collect_text(inner, out),
        }
    }
}

fn collect_matching<'a>(
    el: &'a Element,
    pred: &impl Fn(&Element) -> bool,
    found: &mut Vec<&'a Element>,
) {
    for child in el.child_elements() {
        if pred(child) {
            found.push(child);
        }
        collect_matching(child, pred, found);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inner_text_concatenates_in_order() {
        let el = Element::new("div")
            .with_text("  Capital ")
            .with_child(Element::new("b").with_text("of"))
            .with_text(" France?  ");
        assert_eq!(el.inner_text(), "  Capital of France?  ");
    }

    #[test]
    fn test_find_descendant_is_preorder() {
        let tree = Element::new("div")
            .with_child(
                Element::new("div")
                    .with_child(Element::new("span").with_text("deep")),
            )
            .with_child(Element::new("span").with_text("shallow"));

        let first = tree.find_descendant(&|el| el.tag == "span").unwrap();
        assert_eq!(first.inner_text(), "deep");
        assert_eq!(tree.find_descendants(&|el| el.tag == "span").len(), 2);
    }

    #[test]
    fn test_snapshot_json_shape() {
        let json = r#"{
            "type": "element", "tag": "div", "role": "listitem",
            "children": [
                {"type": "text", "text": "hi"},
                {"type": "element", "tag": "img", "src": "https://x/q.png"}
            ]
        }"#;
        let node: DomNode = serde_json::from_str(json).unwrap();
        let el = node.as_element().unwrap();
        assert!(el.has_role(ROLE_LIST_ITEM));
        assert_eq!(el.children.len(), 2);
        assert_eq!(
            el.find_descendant(&|e| e.tag == "img").unwrap().src.as_deref(),
            Some("https://x/q.png")
        );
    }

    #[test]
    fn test_flat_snapshot_rebuilds_nested_units() {
        let json = r#"[
            {"type": "element", "parent": null, "tag": "div", "role": "listitem"},
            {"type": "element", "parent": 0, "tag": "div", "role": "heading"},
            {"type": "text", "parent": 1, "text": "Outer"},
            {"type": "element", "parent": 0, "tag": "div", "role": "listitem"},
            {"type": "element", "parent": 3, "tag": "img", "src": "https://x/q.png"},
            {"type": "text", "parent": 0, "text": "tail"},
            {"type": "element", "parent": null, "tag": "div", "role": "listitem"}
        ]"#;
        let nodes: Vec<FlatNode> = serde_json::from_str(json).unwrap();
        let root = Element::from_flat(nodes).unwrap();

        let expected = Element::new("body")
            .with_child(
                Element::new("div")
                    .with_role("listitem")
                    .with_child(Element::new("div").with_role("heading").with_text("Outer"))
                    .with_child(
                        Element::new("div")
                            .with_role("listitem")
                            .with_child(Element::new("img").with_src("https://x/q.png")),
                    )
                    .with_text("tail"),
            )
            .with_child(Element::new("div").with_role("listitem"));
        assert_eq!(root, expected);
    }

    #[test]
    fn test_deep_flat_snapshot_parses() {
        // 嵌套 JSON 超过 128 层会被 serde_json 拒绝，扁平列表不受影响
        let depth = 300;
        let mut items = vec![r#"{"type":"element","parent":null,"tag":"div","role":"listitem"}"#.to_string()];
        for index in 1..depth {
            items.push(format!(r#"{{"type":"element","parent":{},"tag":"div"}}"#, index - 1));
        }
        items.push(format!(r#"{{"type":"text","parent":{},"text":"Deep question?"}}"#, depth - 1));
        let json = format!("[{}]", items.join(","));

        let nodes: Vec<FlatNode> = serde_json::from_str(&json).unwrap();
        let root = Element::from_flat(nodes).unwrap();

        let unit = root.find_descendant(&|el| el.has_role(ROLE_LIST_ITEM)).unwrap();
        assert_eq!(unit.inner_text(), "Deep question?");
        assert_eq!(unit.find_descendants(&|el| el.tag == "div").len(), depth - 1);
    }

    #[test]
    fn test_flat_snapshot_rejects_forward_parent() {
        let nodes = vec![
            FlatNode::Text { parent: Some(1), text: "orphan".into() },
            FlatNode::Element { parent: None, tag: "div".into(), role: None, src: None },
        ];
        assert!(Element::from_flat(nodes).is_err());

        let nodes = vec![
            FlatNode::Text { parent: None, text: "text".into() },
            FlatNode::Text { parent: Some(0), text: "child of text".into() },
        ];
        assert!(Element::from_flat(nodes).is_err());
    }
}
