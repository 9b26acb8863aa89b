//! Generic tree traversal
//!
//! [`Visitor`] has one method per node variant; every default
//! implementation delegates to the matching `walk_*` function, which
//! descends into the node's owned children in stored order. Overriding a
//! method and *not* calling the walk function prunes that subtree, so
//! extractors that still want full coverage call it explicitly.
//!
//! Traversal is pre-order depth-first over owned children; that is the
//! only order this module guarantees.

use super::nodes::{
    Category, Comment, Document, ExternalLink, Formatting, Heading, HorizontalRule, HtmlTag, Link,
    List, ListItem, MagicWord, Node, NoWiki, Paragraph, Parameter, Redirect, Table, TableCell,
    TableRow, Template, Text,
};

/// Callbacks over the node variant set; unhandled variants descend.
pub trait Visitor {
    fn visit_document(&mut self, document: &Document) {
        walk_document(self, document)
    }
    fn visit_text(&mut self, _text: &Text) {}
    fn visit_formatting(&mut self, formatting: &Formatting) {
        walk_formatting(self, formatting)
    }
    fn visit_link(&mut self, link: &Link) {
        walk_link(self, link)
    }
    fn visit_external_link(&mut self, link: &ExternalLink) {
        walk_external_link(self, link)
    }
    fn visit_template(&mut self, template: &Template) {
        walk_template(self, template)
    }
    fn visit_parameter(&mut self, parameter: &Parameter) {
        walk_parameter(self, parameter)
    }
    fn visit_heading(&mut self, heading: &Heading) {
        walk_heading(self, heading)
    }
    fn visit_list(&mut self, list: &List) {
        walk_list(self, list)
    }
    fn visit_list_item(&mut self, item: &ListItem) {
        walk_list_item(self, item)
    }
    fn visit_table(&mut self, table: &Table) {
        walk_table(self, table)
    }
    fn visit_table_row(&mut self, row: &TableRow) {
        walk_table_row(self, row)
    }
    fn visit_table_cell(&mut self, cell: &TableCell) {
        walk_table_cell(self, cell)
    }
    fn visit_html_tag(&mut self, tag: &HtmlTag) {
        walk_html_tag(self, tag)
    }
    fn visit_paragraph(&mut self, paragraph: &Paragraph) {
        walk_paragraph(self, paragraph)
    }
    fn visit_comment(&mut self, _comment: &Comment) {}
    fn visit_no_wiki(&mut self, _no_wiki: &NoWiki) {}
    fn visit_redirect(&mut self, _redirect: &Redirect) {}
    fn visit_category(&mut self, _category: &Category) {}
    fn visit_magic_word(&mut self, _magic_word: &MagicWord) {}
    fn visit_horizontal_rule(&mut self, _rule: &HorizontalRule) {}
}

/// Run a visitor over a document. This is the only way consumers outside
/// the core obtain results from a parsed tree.
pub fn visit<V: Visitor + ?Sized>(document: &Document, visitor: &mut V) {
    visitor.visit_document(document);
}

/// Dispatch one node to the matching visitor method.
pub fn walk_node<V: Visitor + ?Sized>(visitor: &mut V, node: &Node) {
    match node {
        Node::Text(n) => visitor.visit_text(n),
        Node::Formatting(n) => visitor.visit_formatting(n),
        Node::Link(n) => visitor.visit_link(n),
        Node::ExternalLink(n) => visitor.visit_external_link(n),
        Node::Template(n) => visitor.visit_template(n),
        Node::Parameter(n) => visitor.visit_parameter(n),
        Node::Heading(n) => visitor.visit_heading(n),
        Node::List(n) => visitor.visit_list(n),
        Node::ListItem(n) => visitor.visit_list_item(n),
        Node::Table(n) => visitor.visit_table(n),
        Node::TableRow(n) => visitor.visit_table_row(n),
        Node::TableCell(n) => visitor.visit_table_cell(n),
        Node::HtmlTag(n) => visitor.visit_html_tag(n),
        Node::Paragraph(n) => visitor.visit_paragraph(n),
        Node::Comment(n) => visitor.visit_comment(n),
        Node::NoWiki(n) => visitor.visit_no_wiki(n),
        Node::Redirect(n) => visitor.visit_redirect(n),
        Node::Category(n) => visitor.visit_category(n),
        Node::MagicWord(n) => visitor.visit_magic_word(n),
        Node::HorizontalRule(n) => visitor.visit_horizontal_rule(n),
    }
}

pub fn walk_nodes<V: Visitor + ?Sized>(visitor: &mut V, nodes: &[Node]) {
    for node in nodes {
        walk_node(visitor, node);
    }
}

pub fn walk_document<V: Visitor + ?Sized>(visitor: &mut V, document: &Document) {
    walk_nodes(visitor, &document.nodes);
}

pub fn walk_formatting<V: Visitor + ?Sized>(visitor: &mut V, formatting: &Formatting) {
    walk_nodes(visitor, &formatting.children);
}

pub fn walk_link<V: Visitor + ?Sized>(visitor: &mut V, link: &Link) {
    if let Some(display) = &link.display {
        walk_nodes(visitor, display);
    }
}

pub fn walk_external_link<V: Visitor + ?Sized>(visitor: &mut V, link: &ExternalLink) {
    walk_nodes(visitor, &link.display);
}

pub fn walk_template<V: Visitor + ?Sized>(visitor: &mut V, template: &Template) {
    for param in &template.params {
        walk_nodes(visitor, &param.value);
    }
}

pub fn walk_parameter<V: Visitor + ?Sized>(visitor: &mut V, parameter: &Parameter) {
    if let Some(default) = &parameter.default {
        walk_nodes(visitor, default);
    }
}

pub fn walk_heading<V: Visitor + ?Sized>(visitor: &mut V, heading: &Heading) {
    walk_nodes(visitor, &heading.children);
}

pub fn walk_list<V: Visitor + ?Sized>(visitor: &mut V, list: &List) {
    for item in &list.items {
        visitor.visit_list_item(item);
    }
}

pub fn walk_list_item<V: Visitor + ?Sized>(visitor: &mut V, item: &ListItem) {
    walk_nodes(visitor, &item.children);
}

pub fn walk_table<V: Visitor + ?Sized>(visitor: &mut V, table: &Table) {
    for row in &table.rows {
        visitor.visit_table_row(row);
    }
}

pub fn walk_table_row<V: Visitor + ?Sized>(visitor: &mut V, row: &TableRow) {
    for cell in &row.cells {
        visitor.visit_table_cell(cell);
    }
}

pub fn walk_table_cell<V: Visitor + ?Sized>(visitor: &mut V, cell: &TableCell) {
    walk_nodes(visitor, &cell.children);
}

pub fn walk_html_tag<V: Visitor + ?Sized>(visitor: &mut V, tag: &HtmlTag) {
    walk_nodes(visitor, &tag.children);
}

pub fn walk_paragraph<V: Visitor + ?Sized>(visitor: &mut V, paragraph: &Paragraph) {
    walk_nodes(visitor, &paragraph.children);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wikitext::ast::span::Span;

    fn text(content: &str) -> Node {
        Node::Text(Text {
            content: content.to_string(),
            span: Span::default(),
        })
    }

    #[test]
    fn test_default_descent_reaches_nested_text() {
        struct Collector(Vec<String>);
        impl Visitor for Collector {
            fn visit_text(&mut self, text: &Text) {
                self.0.push(text.content.clone());
            }
        }

        let doc = Document::new(
            vec![Node::Paragraph(Paragraph {
                children: vec![
                    text("a"),
                    Node::Formatting(Formatting {
                        style: crate::wikitext::ast::nodes::FormatStyle::Bold,
                        children: vec![text("b")],
                        span: Span::default(),
                    }),
                ],
                span: Span::default(),
            })],
            Span::default(),
        );

        let mut collector = Collector(Vec::new());
        visit(&doc, &mut collector);
        assert_eq!(collector.0, vec!["a", "b"]);
    }

    #[test]
    fn test_preorder_parent_before_child() {
        struct Order(Vec<&'static str>);
        impl Visitor for Order {
            fn visit_paragraph(&mut self, paragraph: &Paragraph) {
                self.0.push("paragraph");
                walk_paragraph(self, paragraph);
            }
            fn visit_text(&mut self, _: &Text) {
                self.0.push("text");
            }
        }

        let doc = Document::new(
            vec![Node::Paragraph(Paragraph {
                children: vec![text("x")],
                span: Span::default(),
            })],
            Span::default(),
        );
        let mut order = Order(Vec::new());
        visit(&doc, &mut order);
        assert_eq!(order.0, vec!["paragraph", "text"]);
    }
}
