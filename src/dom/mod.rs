// ReadFocus page model
// An in-memory document tree, a lenient HTML parser and a CSS-subset selector engine.

pub mod document;
pub mod parser;
pub mod selector;

pub use document::{Document, MutationRecord, NodeData, NodeId, RenderedSize};
pub use selector::Selector;
