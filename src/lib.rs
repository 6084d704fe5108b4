//! # PDF Outline
//!
//! A toolkit for the PDF document outline (bookmark) subsystem: load a
//! persisted outline graph into an in-memory ordered tree, validate the
//! tree's structural invariants, and rewrite the tree back into the
//! document's indirect-object store.
//!
//! ## Core Features
//!
//! - **Cycle-safe loading**: persisted outline graphs may alias or cycle;
//!   traversal truncates a chain at the first repeated identity instead of
//!   recursing forever.
//! - **Destination resolution**: /Dest arrays and /A actions are
//!   normalized to internal `(page, x, y)` targets or external URIs.
//! - **Invariant validation**: sibling/parent linkage is checked before
//!   any destructive rewrite.
//! - **Two-phase rewrite**: validate, clear the old persisted subtree,
//!   write the new one with threaded sibling links and signed visibility
//!   counts.
//!
//! ## Quick Start
//!
//! ```
//! use pdf_outline::{Destination, Document, Outline, OutlineNode};
//!
//! # fn main() -> pdf_outline::Result<()> {
//! let mut doc = Document::new();
//! doc.add_page(612.0, 792.0)?;
//!
//! let mut tree = Outline::new();
//! let ch1 = tree.push_back(
//!     None,
//!     OutlineNode::new("Chapter 1")
//!         .with_dest(Destination::Internal { page: 0, x: 0.0, y: 0.0 })
//!         .with_open(true),
//! );
//! tree.push_back(Some(ch1), OutlineNode::new("Section 1.1"));
//!
//! doc.rewrite_outline(&tree)?;
//! let loaded = doc.load_outline()?.expect("outline was written");
//! assert_eq!(loaded.node(loaded.first().unwrap()).title.as_deref(), Some("Chapter 1"));
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

// Error handling
pub mod error;

// Object store
pub mod document;
pub mod object;

// Page geometry and indexing
pub mod geometry;
pub mod pages;

// Link destinations and actions
pub mod links;

// Outline tree: model and loader
pub mod outline;

// Outline rewrite: validate, clear, write
pub mod rewrite;

// Re-exports
pub use document::Document;
pub use error::{Error, Result};
pub use object::{Object, ObjectRef};
pub use outline::{Destination, NodeId, Outline, OutlineNode};

// Version info
/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
