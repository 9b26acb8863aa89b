//! Document tree model and traversal

pub mod nodes;
pub mod span;
pub mod visit;

pub use nodes::{Document, Node};
pub use span::{LineIndex, Position, Span};
pub use visit::{visit, Visitor};
