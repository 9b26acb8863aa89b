//! Built-in extractors
//!
//! Each extractor is a plain [`Visitor`] implementation that collects
//! into an ordered internal sequence during [`visit`] and exposes it
//! afterwards. They are also the reference examples for the extension
//! point: a new extractor needs nothing beyond the visitor trait, with
//! no parser or tree changes.

use crate::wikitext::ast::nodes::{
    Category, ExternalLink, Heading, Link, Node, Template, Text,
};
use crate::wikitext::ast::visit::{self, Visitor};

/// Flatten a node sequence to its visible text.
fn text_of(nodes: &[Node]) -> String {
    let mut extractor = PlainTextExtractor::new();
    visit::walk_nodes(&mut extractor, nodes);
    extractor.into_text()
}

/// Title of a heading: its Text descendants concatenated in traversal
/// order.
pub fn heading_title(heading: &Heading) -> String {
    text_of(&heading.children)
}

/// One recorded link occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedLink {
    pub target: String,
    /// Display text; falls back to the target when the link has none.
    pub display: String,
    pub external: bool,
}

/// Collects internal and external links in document order.
#[derive(Debug, Default)]
pub struct LinkExtractor {
    links: Vec<ExtractedLink>,
}

impl LinkExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn links(&self) -> &[ExtractedLink] {
        &self.links
    }

    pub fn into_links(self) -> Vec<ExtractedLink> {
        self.links
    }
}

impl Visitor for LinkExtractor {
    fn visit_link(&mut self, link: &Link) {
        let display = link
            .display
            .as_deref()
            .map(text_of)
            .filter(|text| !text.is_empty())
            .unwrap_or_else(|| link.target.clone());
        self.links.push(ExtractedLink {
            target: link.target.clone(),
            display,
            external: false,
        });
        visit::walk_link(self, link);
    }

    fn visit_external_link(&mut self, link: &ExternalLink) {
        let display = text_of(&link.display);
        let display = if display.is_empty() {
            link.url.clone()
        } else {
            display
        };
        self.links.push(ExtractedLink {
            target: link.url.clone(),
            display,
            external: true,
        });
        visit::walk_external_link(self, link);
    }
}

/// One recorded template invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedTemplate {
    pub name: String,
    /// Ordered parameters; `name` is None for positional ones. Values
    /// are flattened to their text content.
    pub params: Vec<(Option<String>, String)>,
}

/// Collects template invocations in document order, outermost first.
#[derive(Debug, Default)]
pub struct TemplateExtractor {
    templates: Vec<ExtractedTemplate>,
}

impl TemplateExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn templates(&self) -> &[ExtractedTemplate] {
        &self.templates
    }

    pub fn into_templates(self) -> Vec<ExtractedTemplate> {
        self.templates
    }
}

impl Visitor for TemplateExtractor {
    fn visit_template(&mut self, template: &Template) {
        let params = template
            .params
            .iter()
            .map(|param| (param.name.clone(), text_of(&param.value).trim().to_string()))
            .collect();
        self.templates.push(ExtractedTemplate {
            name: template.name.clone(),
            params,
        });
        // Nested invocations inside parameter values are recorded too
        visit::walk_template(self, template);
    }
}

/// Collects `(title, level)` pairs for every heading in document order.
#[derive(Debug, Default)]
pub struct SectionExtractor {
    sections: Vec<(String, u8)>,
}

impl SectionExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sections(&self) -> &[(String, u8)] {
        &self.sections
    }

    pub fn into_sections(self) -> Vec<(String, u8)> {
        self.sections
    }
}

impl Visitor for SectionExtractor {
    fn visit_heading(&mut self, heading: &Heading) {
        self.sections.push((heading_title(heading), heading.level));
    }
}

/// One recorded category membership.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedCategory {
    pub name: String,
    pub sort_key: Option<String>,
}

/// Collects category memberships in document order.
#[derive(Debug, Default)]
pub struct CategoryExtractor {
    categories: Vec<ExtractedCategory>,
}

impl CategoryExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn categories(&self) -> &[ExtractedCategory] {
        &self.categories
    }

    pub fn into_categories(self) -> Vec<ExtractedCategory> {
        self.categories
    }
}

impl Visitor for CategoryExtractor {
    fn visit_category(&mut self, category: &Category) {
        self.categories.push(ExtractedCategory {
            name: category.name.clone(),
            sort_key: category.sort_key.clone(),
        });
    }
}

/// Concatenates every Text node's content in traversal order.
///
/// Nothing is inserted between nodes; spacing and line-structure
/// decisions belong to rendering consumers, not this extractor.
#[derive(Debug, Default)]
pub struct PlainTextExtractor {
    text: String,
}

impl PlainTextExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn into_text(self) -> String {
        self.text
    }
}

impl Visitor for PlainTextExtractor {
    fn visit_text(&mut self, text: &Text) {
        self.text.push_str(&text.content);
    }
}
