//! Document tree node model
//!
//! A parse produces a [`Document`] owning an ordered sequence of block
//! [`Node`]s. `Node` is a closed tagged union; traversal dispatches
//! exhaustively over it in `super::visit`. Every composite node owns its
//! children exclusively, the tree is acyclic, and no node stores a parent
//! pointer; ancestry is reconstructed with an explicit stack where a
//! pass needs it (see `crate::wikitext::sections`).
//!
//! All nodes carry a mandatory `span`; optional payloads (parameter
//! defaults, category sort keys, link anchors) are `Option`s, never
//! sentinel strings.

use super::span::Span;
use serde::{Deserialize, Serialize};

/// The root of a parsed page.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Document {
    pub nodes: Vec<Node>,
    pub span: Span,
}

impl Document {
    pub fn new(nodes: Vec<Node>, span: Span) -> Self {
        Self { nodes, span }
    }

    /// True when the whole document reduces to a redirect directive.
    pub fn is_redirect(&self) -> bool {
        matches!(self.nodes.as_slice(), [Node::Redirect(_)])
    }
}

/// Any element that can appear in document content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Node {
    Text(Text),
    Formatting(Formatting),
    Link(Link),
    ExternalLink(ExternalLink),
    Template(Template),
    Parameter(Parameter),
    Heading(Heading),
    List(List),
    ListItem(ListItem),
    Table(Table),
    TableRow(TableRow),
    TableCell(TableCell),
    HtmlTag(HtmlTag),
    Paragraph(Paragraph),
    Comment(Comment),
    NoWiki(NoWiki),
    Redirect(Redirect),
    Category(Category),
    MagicWord(MagicWord),
    HorizontalRule(HorizontalRule),
}

impl Node {
    pub fn span(&self) -> &Span {
        match self {
            Node::Text(n) => &n.span,
            Node::Formatting(n) => &n.span,
            Node::Link(n) => &n.span,
            Node::ExternalLink(n) => &n.span,
            Node::Template(n) => &n.span,
            Node::Parameter(n) => &n.span,
            Node::Heading(n) => &n.span,
            Node::List(n) => &n.span,
            Node::ListItem(n) => &n.span,
            Node::Table(n) => &n.span,
            Node::TableRow(n) => &n.span,
            Node::TableCell(n) => &n.span,
            Node::HtmlTag(n) => &n.span,
            Node::Paragraph(n) => &n.span,
            Node::Comment(n) => &n.span,
            Node::NoWiki(n) => &n.span,
            Node::Redirect(n) => &n.span,
            Node::Category(n) => &n.span,
            Node::MagicWord(n) => &n.span,
            Node::HorizontalRule(n) => &n.span,
        }
    }

    /// Short variant name, used in diagnostics and tree dumps.
    pub fn node_type(&self) -> &'static str {
        match self {
            Node::Text(_) => "text",
            Node::Formatting(_) => "formatting",
            Node::Link(_) => "link",
            Node::ExternalLink(_) => "external_link",
            Node::Template(_) => "template",
            Node::Parameter(_) => "parameter",
            Node::Heading(_) => "heading",
            Node::List(_) => "list",
            Node::ListItem(_) => "list_item",
            Node::Table(_) => "table",
            Node::TableRow(_) => "table_row",
            Node::TableCell(_) => "table_cell",
            Node::HtmlTag(_) => "html_tag",
            Node::Paragraph(_) => "paragraph",
            Node::Comment(_) => "comment",
            Node::NoWiki(_) => "nowiki",
            Node::Redirect(_) => "redirect",
            Node::Category(_) => "category",
            Node::MagicWord(_) => "magic_word",
            Node::HorizontalRule(_) => "horizontal_rule",
        }
    }

    pub fn as_text(&self) -> Option<&Text> {
        match self {
            Node::Text(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_paragraph(&self) -> Option<&Paragraph> {
        match self {
            Node::Paragraph(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_heading(&self) -> Option<&Heading> {
        match self {
            Node::Heading(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&List> {
        match self {
            Node::List(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_table(&self) -> Option<&Table> {
        match self {
            Node::Table(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_template(&self) -> Option<&Template> {
        match self {
            Node::Template(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_link(&self) -> Option<&Link> {
        match self {
            Node::Link(n) => Some(n),
            _ => None,
        }
    }
}

/// A leaf run of decoded text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Text {
    pub content: String,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FormatStyle {
    Bold,
    Italic,
}

/// Bold or italic inline formatting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Formatting {
    pub style: FormatStyle,
    pub children: Vec<Node>,
    pub span: Span,
}

/// An internal `[[target|display]]` link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub target: String,
    /// Fragment after `#` in the target, if any.
    pub anchor: Option<String>,
    /// Display children; absent when the link has no `|` part.
    pub display: Option<Vec<Node>>,
    pub span: Span,
}

/// An external `[url display]` link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalLink {
    pub url: String,
    pub display: Vec<Node>,
    pub span: Span,
}

/// One parameter of a template invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateParam {
    /// None for positional parameters.
    pub name: Option<String>,
    pub value: Vec<Node>,
    pub span: Span,
}

/// A `{{Name|…}}` template invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Template {
    pub name: String,
    pub params: Vec<TemplateParam>,
    pub span: Span,
}

/// A `{{{name|default}}}` parameter placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub default: Option<Vec<Node>>,
    pub span: Span,
}

/// A `== Title ==` heading, level 1–6.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Heading {
    pub level: u8,
    pub children: Vec<Node>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ListKind {
    Bullet,
    Numbered,
}

/// A list at one nesting level; deeper lists hang off their parent item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct List {
    pub kind: ListKind,
    pub level: u8,
    pub items: Vec<ListItem>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListItem {
    pub children: Vec<Node>,
    pub span: Span,
}

/// One parsed `name` or `name=value` attribute on a tag or table element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    pub value: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub attributes: Vec<Attribute>,
    pub rows: Vec<TableRow>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRow {
    pub attributes: Vec<Attribute>,
    pub cells: Vec<TableCell>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableCell {
    pub header: bool,
    pub attributes: Vec<Attribute>,
    pub children: Vec<Node>,
    pub span: Span,
}

/// An HTML-like element such as `<ref>` or `<div class="x">`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HtmlTag {
    pub name: String,
    pub attributes: Vec<Attribute>,
    pub self_closing: bool,
    pub children: Vec<Node>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paragraph {
    pub children: Vec<Node>,
    pub span: Span,
}

/// An HTML comment, only present when comment preservation is on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub content: String,
    pub span: Span,
}

/// Verbatim `<nowiki>` text, never re-tokenized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoWiki {
    pub content: String,
    pub span: Span,
}

/// A `#REDIRECT [[Target]]` page; valid only as the sole content of a
/// document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Redirect {
    pub target: String,
    pub span: Span,
}

/// A `[[Category:Name|sort key]]` membership.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    pub sort_key: Option<String>,
    pub span: Span,
}

/// A `__DIRECTIVE__` behavior switch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MagicWord {
    pub name: String,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HorizontalRule {
    pub span: Span,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redirect_document() {
        let doc = Document::new(
            vec![Node::Redirect(Redirect {
                target: "Target".to_string(),
                span: Span::default(),
            })],
            Span::default(),
        );
        assert!(doc.is_redirect());
        assert!(!Document::default().is_redirect());
    }

    #[test]
    fn test_node_accessors() {
        let node = Node::Text(Text {
            content: "x".to_string(),
            span: Span::default(),
        });
        assert!(node.as_text().is_some());
        assert!(node.as_list().is_none());
        assert_eq!(node.node_type(), "text");
    }

    #[test]
    fn test_nodes_serialize() {
        let node = Node::Category(Category {
            name: "Examples".to_string(),
            sort_key: None,
            span: Span::default(),
        });
        let json = serde_json::to_string(&node).unwrap();
        assert!(json.contains("Examples"));
        let back: Node = serde_json::from_str(&json).unwrap();
        assert_eq!(back, node);
    }
}
