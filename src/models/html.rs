//! Rich text node trees
//!
//! An `html` node's `value` is an ordered array of fragments. Each fragment is
//! classified as:
//!
//! 1. text: no `elem` key (or a bare JSON string)
//! 2. void element: `elem` in [`VOID_ELEMENTS`]
//! 3. link: `elem == "a"`, built through [`Link`]
//! 4. any other element, with its own ordered children
//!
//! Fragment order is preserved; it is the rendered markup order.

use serde_json::Value;
use std::collections::BTreeMap;

use super::{scalar_string, Base, Link};

/// Elements rendered without a closing tag
pub const VOID_ELEMENTS: [&str; 14] = [
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
    "source", "track", "wbr",
];

pub type Attributes = BTreeMap<String, String>;

/// One fragment of a rich text tree
#[derive(Debug, Clone, PartialEq)]
pub enum HtmlNode {
    Text(String),
    /// Markup delivered as a plain string, rendered verbatim
    Raw(String),
    Void {
        elem: String,
        attrs: Attributes,
    },
    Link {
        link: Link,
        attrs: Attributes,
        children: Vec<HtmlNode>,
    },
    Element {
        elem: String,
        attrs: Attributes,
        children: Vec<HtmlNode>,
    },
}

impl HtmlNode {
    /// Classify one fragment
    pub fn from_fragment(fragment: &Value) -> Self {
        let Some(map) = fragment.as_object() else {
            return HtmlNode::Text(scalar_string(fragment));
        };
        let Some(elem) = map.get("elem").and_then(Value::as_str) else {
            let text = map
                .get("value")
                .or_else(|| map.get("text"))
                .map(scalar_string)
                .unwrap_or_default();
            return HtmlNode::Text(text);
        };

        let elem = elem.to_lowercase();
        let attrs = read_attrs(map.get("attr").or_else(|| map.get("attrs")));

        if VOID_ELEMENTS.contains(&elem.as_str()) {
            return HtmlNode::Void { elem, attrs };
        }

        let children = children_of(map.get("value"));
        if elem == "a" {
            let href = attrs.get("href").cloned().unwrap_or_default();
            let label: String = children.iter().map(HtmlNode::text).collect();
            HtmlNode::Link {
                link: Link::from_href(href, label),
                attrs,
                children,
            }
        } else {
            HtmlNode::Element {
                elem,
                attrs,
                children,
            }
        }
    }

    /// Plain text content
    pub fn text(&self) -> String {
        match self {
            HtmlNode::Text(t) | HtmlNode::Raw(t) => t.clone(),
            HtmlNode::Void { .. } => String::new(),
            HtmlNode::Link { children, .. } | HtmlNode::Element { children, .. } => {
                children.iter().map(HtmlNode::text).collect()
            }
        }
    }

    /// Append markup for this node to `out`
    pub fn render_into(&self, out: &mut String) {
        match self {
            HtmlNode::Text(t) => out.push_str(&escape(t)),
            HtmlNode::Raw(markup) => out.push_str(markup),
            HtmlNode::Void { elem, attrs } => {
                out.push('<');
                out.push_str(elem);
                push_attrs(out, attrs);
                out.push('>');
            }
            HtmlNode::Link {
                link,
                attrs,
                children,
            } => {
                out.push_str("<a href=\"");
                out.push_str(&escape(link.href()));
                out.push('"');
                let rest: Attributes = attrs
                    .iter()
                    .filter(|(k, _)| k.as_str() != "href")
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect();
                push_attrs(out, &rest);
                out.push('>');
                for child in children {
                    child.render_into(out);
                }
                out.push_str("</a>");
            }
            HtmlNode::Element {
                elem,
                attrs,
                children,
            } => {
                out.push('<');
                out.push_str(elem);
                push_attrs(out, attrs);
                out.push('>');
                for child in children {
                    child.render_into(out);
                }
                out.push_str("</");
                out.push_str(elem);
                out.push('>');
            }
        }
    }

    fn collect_links<'a>(&'a self, out: &mut Vec<&'a Link>) {
        match self {
            HtmlNode::Link { link, children, .. } => {
                out.push(link);
                children.iter().for_each(|c| c.collect_links(out));
            }
            HtmlNode::Element { children, .. } => {
                children.iter().for_each(|c| c.collect_links(out));
            }
            _ => {}
        }
    }
}

/// Parsed rich text node
#[derive(Debug, Clone, PartialEq)]
pub struct Html {
    pub(crate) base: Base,
    nodes: Vec<HtmlNode>,
}

impl Html {
    pub fn from_base(base: Base) -> Self {
        let nodes = match base.value() {
            Value::Array(fragments) => fragments.iter().map(HtmlNode::from_fragment).collect(),
            Value::String(markup) => vec![HtmlNode::Raw(markup.clone())],
            Value::Null => Vec::new(),
            other => vec![HtmlNode::from_fragment(other)],
        };
        Self { base, nodes }
    }

    pub fn nodes(&self) -> &[HtmlNode] {
        &self.nodes
    }

    /// Markup in fragment order
    pub fn render(&self) -> String {
        let mut out = String::new();
        for node in &self.nodes {
            node.render_into(&mut out);
        }
        out
    }

    /// Text content without markup
    pub fn text(&self) -> String {
        self.nodes.iter().map(HtmlNode::text).collect()
    }

    /// Every link in document order
    pub fn links(&self) -> Vec<&Link> {
        let mut out = Vec::new();
        for node in &self.nodes {
            node.collect_links(&mut out);
        }
        out
    }
}

fn children_of(value: Option<&Value>) -> Vec<HtmlNode> {
    match value {
        Some(Value::Array(items)) => items.iter().map(HtmlNode::from_fragment).collect(),
        Some(Value::Null) | None => Vec::new(),
        Some(other) => vec![HtmlNode::Text(scalar_string(other))],
    }
}

fn read_attrs(value: Option<&Value>) -> Attributes {
    value
        .and_then(Value::as_object)
        .map(|map| {
            map.iter()
                .filter_map(|(k, v)| match v {
                    Value::Null | Value::Bool(false) => None,
                    Value::Bool(true) => Some((k.clone(), String::new())),
                    other => Some((k.clone(), scalar_string(other))),
                })
                .collect()
        })
        .unwrap_or_default()
}

fn push_attrs(out: &mut String, attrs: &Attributes) {
    for (key, value) in attrs {
        out.push(' ');
        out.push_str(key);
        if !value.is_empty() {
            out.push_str("=\"");
            out.push_str(&escape(value));
            out.push('"');
        }
    }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LinkKind;
    use serde_json::json;

    fn html(value: Value) -> Html {
        Html::from_base(Base::from_node("html", &json!({ "type": "html", "value": value })))
    }

    #[test]
    fn test_fragment_classes_keep_order() {
        let tree = html(json!([
            { "value": "Hello " },
            { "elem": "strong", "value": [{ "value": "world" }] },
            { "elem": "br" },
            { "elem": "a", "attr": { "href": "mailto:hi@example.com" }, "value": [{ "value": "mail" }] }
        ]));
        assert!(matches!(tree.nodes()[0], HtmlNode::Text(_)));
        assert!(matches!(tree.nodes()[1], HtmlNode::Element { .. }));
        assert!(matches!(tree.nodes()[2], HtmlNode::Void { .. }));
        assert!(matches!(tree.nodes()[3], HtmlNode::Link { .. }));
        assert_eq!(
            tree.render(),
            "Hello <strong>world</strong><br><a href=\"mailto:hi@example.com\">mail</a>"
        );
    }

    #[test]
    fn test_links_are_collected_recursively() {
        let tree = html(json!([
            { "elem": "p", "value": [
                { "elem": "a", "attr": { "href": "/about" }, "value": ["About"] }
            ]}
        ]));
        let links = tree.links();
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].kind(), LinkKind::Page);
        assert_eq!(links[0].label(), "About");
    }

    #[test]
    fn test_text_is_escaped_and_attrs_sorted() {
        let tree = html(json!([
            { "elem": "img", "attr": { "src": "a.jpg", "alt": "x \"y\"" } },
            "1 < 2"
        ]));
        assert_eq!(tree.render(), "<img alt=\"x &quot;y&quot;\" src=\"a.jpg\">1 &lt; 2");
        assert_eq!(tree.text(), "1 < 2");
    }

    #[test]
    fn test_string_value_is_raw_markup() {
        let tree = html(json!("<p>ready</p>"));
        assert_eq!(tree.render(), "<p>ready</p>");
    }
}
