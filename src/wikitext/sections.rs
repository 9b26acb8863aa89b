//! Section-tree construction
//!
//! A parsed document is flat: headings and their content are siblings in
//! document order. [`build_section_tree`] reconstructs the heading
//! hierarchy with a stack keyed by heading level, the same discipline the
//! parser applies to nested list markers. Content before the first
//! heading lands in the synthetic root section.
//!
//! The resulting tree keeps levels strictly increasing along any
//! root-to-leaf path: a `==` heading after a `====` one pops back up
//! rather than nesting under it.

use super::ast::nodes::{Document, Heading, Node};

/// One section of a document: its heading (none for the root), the
/// non-heading block nodes that follow it, and its subsections.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Section {
    pub heading: Option<Heading>,
    pub content: Vec<Node>,
    pub children: Vec<Section>,
}

impl Section {
    fn with_heading(heading: Heading) -> Self {
        Self {
            heading: Some(heading),
            content: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Heading level; the synthetic root sits below every real level.
    pub fn level(&self) -> u8 {
        self.heading.as_ref().map(|h| h.level).unwrap_or(0)
    }

    /// Total number of sections in this subtree, the root included.
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(Section::count).sum::<usize>()
    }
}

/// Build the section hierarchy for a parsed document.
///
/// Returns a synthetic root section whose children are the document's
/// top-level sections.
pub fn build_section_tree(document: &Document) -> Section {
    let mut stack = vec![Section::default()];

    for node in &document.nodes {
        match node {
            Node::Heading(heading) => {
                // Pop to the nearest strictly shallower section
                while stack.len() > 1 && stack.last().map(Section::level).unwrap_or(0) >= heading.level
                {
                    let done = stack.pop().expect("section stack");
                    stack.last_mut().expect("section stack").children.push(done);
                }
                stack.push(Section::with_heading(heading.clone()));
            }
            other => {
                stack
                    .last_mut()
                    .expect("section stack")
                    .content
                    .push(other.clone());
            }
        }
    }

    while stack.len() > 1 {
        let done = stack.pop().expect("section stack");
        stack.last_mut().expect("section stack").children.push(done);
    }
    stack.pop().expect("section stack")
}
