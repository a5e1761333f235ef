//! Immutable virtual node tree and its HTML serialization.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

pub type Attributes = IndexMap<String, String>;

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VNode {
    Text(String),
    Element(VElement),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VElement {
    pub tag: String,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub attrs: Attributes,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<VNode>,
}

impl VElement {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attrs: Attributes::new(),
            children: Vec::new(),
        }
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }

    pub fn attr_opt<V: Into<String>>(self, name: impl Into<String>, value: Option<V>) -> Self {
        match value {
            Some(value) => self.attr(name, value),
            None => self,
        }
    }

    pub fn child(mut self, child: impl Into<VNode>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn children(mut self, children: impl IntoIterator<Item = VNode>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn text(self, text: impl Into<String>) -> Self {
        self.child(VNode::Text(text.into()))
    }
}

impl From<VElement> for VNode {
    fn from(element: VElement) -> Self {
        Self::Element(element)
    }
}

impl VNode {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    pub fn tag(&self) -> Option<&str> {
        match self {
            Self::Element(element) => Some(&element.tag),
            Self::Text(_) => None,
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        match self {
            Self::Element(element) => element.attrs.get(name).map(String::as_str),
            Self::Text(_) => None,
        }
    }

    pub fn children(&self) -> &[VNode] {
        match self {
            Self::Element(element) => &element.children,
            Self::Text(_) => &[],
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Element(_) => None,
        }
    }

    pub fn descendants(&self) -> Descendants<'_> {
        Descendants { stack: vec![self] }
    }

    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out, false);
        out
    }

    fn write_html(&self, out: &mut String, raw_text: bool) {
        match self {
            Self::Text(text) if raw_text => out.push_str(text),
            Self::Text(text) => escape_into(out, text, false),
            Self::Element(element) => {
                out.push('<');
                out.push_str(&element.tag);
                for (name, value) in &element.attrs {
                    if !is_attribute_name(name) {
                        continue;
                    }
                    out.push(' ');
                    out.push_str(name);
                    out.push_str("=\"");
                    escape_into(out, value, true);
                    out.push('"');
                }
                out.push('>');

                let tag = element.tag.to_ascii_lowercase();
                if VOID_ELEMENTS.contains(&tag.as_str()) {
                    return;
                }

                let raw = RAW_TEXT_ELEMENTS.contains(&tag.as_str());
                for child in &element.children {
                    child.write_html(out, raw);
                }

                out.push_str("</");
                out.push_str(&element.tag);
                out.push('>');
            }
        }
    }
}

pub struct Descendants<'a> {
    stack: Vec<&'a VNode>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a VNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children().iter().rev());
        Some(node)
    }
}

/// Names that would break out of the start tag are dropped from markup.
fn is_attribute_name(name: &str) -> bool {
    !name.is_empty()
        && !name.chars().any(|ch| {
            ch.is_whitespace() || ch.is_control() || matches!(ch, '"' | '\'' | '<' | '>' | '/' | '=')
        })
}

fn escape_into(out: &mut String, raw: &str, attribute: bool) {
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            other => out.push(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn element_markup_keeps_attribute_insertion_order() {
        let node: VNode = VElement::new("a")
            .attr("id", "x1")
            .attr("href", "#")
            .text("go")
            .into();

        assert_eq!(node.to_html(), r##"<a id="x1" href="#">go</a>"##);
    }

    #[test]
    fn text_and_attributes_are_escaped() {
        let node: VNode = VElement::new("span")
            .attr("title", "say \"hi\" & <bye>")
            .text("1 < 2 & 3 > 2")
            .into();

        assert_eq!(
            node.to_html(),
            r#"<span title="say &quot;hi&quot; &amp; &lt;bye&gt;">1 &lt; 2 &amp; 3 &gt; 2</span>"#
        );
    }

    #[test]
    fn malformed_attribute_names_are_dropped() {
        let node: VNode = VElement::new("meta")
            .attr("property", "og:title")
            .attr("x\"><script>", "1")
            .attr("a b", "2")
            .attr("", "3")
            .attr("data-ok", "4")
            .into();

        assert_eq!(node.to_html(), r#"<meta property="og:title" data-ok="4">"#);
    }

    #[test]
    fn void_elements_have_no_end_tag() {
        let node: VNode = VElement::new("meta").attr("charset", "utf-8").into();
        assert_eq!(node.to_html(), r#"<meta charset="utf-8">"#);
    }

    #[test]
    fn script_bodies_are_not_escaped() {
        let node: VNode = VElement::new("script").text("if (a < b) { go(); }").into();
        assert_eq!(node.to_html(), "<script>if (a < b) { go(); }</script>");
    }

    #[test]
    fn descendants_walk_in_document_order() {
        let node: VNode = VElement::new("ul")
            .child(VElement::new("li").text("a"))
            .child(VElement::new("li").text("b"))
            .into();

        let order: Vec<String> = node
            .descendants()
            .map(|n| n.tag().map_or_else(|| n.as_text().unwrap_or("").to_string(), String::from))
            .collect();

        assert_eq!(order, ["ul", "li", "a", "li", "b"]);
    }

    #[test]
    fn serde_shape_is_untagged() {
        let node: VNode = serde_json::from_str(r#"{"tag":"span","children":["x"]}"#)
            .expect("decode vnode");
        assert_eq!(node, VElement::new("span").text("x").into());
    }
}
