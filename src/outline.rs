//! PDF document outline (bookmarks) support.
//!
//! The persisted outline is a graph of dictionary objects linked by
//! Parent/First/Last/Next/Prev references. This module loads that graph
//! into an in-memory [`Outline`] tree, resolving each entry's destination
//! on the way. Persisted graphs may legally alias or illegally cycle, so
//! traversal marks every visited identity and treats a repeat as the end
//! of its chain rather than an error.
//!
//! The in-memory tree is an arena: `down` subtrees are owned through the
//! arena while `parent`/`prev`/`next` are plain [`NodeId`] handles, so
//! back- and sibling-references can never drive destruction.

use std::cell::RefCell;
use std::collections::HashSet;

use serde::Serialize;

use crate::document::Document;
use crate::error::Result;
use crate::links;
use crate::object::{Object, ObjectRef};

/// Handle to a node inside an [`Outline`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// A resolved jump target for an outline entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Destination {
    /// A location inside this document
    Internal {
        /// Zero-based page number
        page: usize,
        /// Horizontal viewport coordinate
        x: f32,
        /// Vertical viewport coordinate (origin top-left)
        y: f32,
    },
    /// A target outside this document
    External {
        /// The external URI
        uri: String,
    },
}

/// A single outline entry.
///
/// Link fields are handles into the owning [`Outline`]; callers normally
/// build trees through [`Outline::push_back`], which threads them, but the
/// fields stay public so trees can be edited (or deliberately corrupted,
/// for validation testing) in place.
#[derive(Debug, Clone, PartialEq)]
pub struct OutlineNode {
    /// Display title
    pub title: Option<String>,
    /// Jump target when activated
    pub dest: Option<Destination>,
    /// Whether descendants are shown expanded by default
    pub is_open: bool,
    /// Enclosing node, none for roots
    pub parent: Option<NodeId>,
    /// Preceding sibling
    pub prev: Option<NodeId>,
    /// Following sibling
    pub next: Option<NodeId>,
    /// First child
    pub down: Option<NodeId>,
}

impl OutlineNode {
    /// Create an unlinked entry with the given title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            dest: None,
            is_open: false,
            parent: None,
            prev: None,
            next: None,
            down: None,
        }
    }

    /// Set the jump target.
    pub fn with_dest(mut self, dest: Destination) -> Self {
        self.dest = Some(dest);
        self
    }

    /// Set whether the entry is initially open.
    pub fn with_open(mut self, open: bool) -> Self {
        self.is_open = open;
        self
    }
}

/// An in-memory outline tree.
#[derive(Debug, Default)]
pub struct Outline {
    nodes: Vec<OutlineNode>,
    first: Option<NodeId>,
}

impl Outline {
    /// Create an empty outline.
    pub fn new() -> Self {
        Self::default()
    }

    /// The first root-level entry.
    pub fn first(&self) -> Option<NodeId> {
        self.first
    }

    /// Whether the outline has no entries.
    pub fn is_empty(&self) -> bool {
        self.first.is_none()
    }

    /// Total number of entries in the arena.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Borrow a node.
    ///
    /// # Panics
    ///
    /// Panics if `id` does not belong to this outline.
    pub fn node(&self, id: NodeId) -> &OutlineNode {
        &self.nodes[id.0]
    }

    /// Borrow a node mutably.
    ///
    /// # Panics
    ///
    /// Panics if `id` does not belong to this outline.
    pub fn node_mut(&mut self, id: NodeId) -> &mut OutlineNode {
        &mut self.nodes[id.0]
    }

    /// Append an entry to the end of a sibling chain.
    ///
    /// With `parent == None` the entry joins the root chain; otherwise it
    /// becomes the last child of `parent`. All four link fields are
    /// threaded to preserve the tree invariants.
    pub fn push_back(&mut self, parent: Option<NodeId>, mut node: OutlineNode) -> NodeId {
        node.parent = parent;
        node.prev = None;
        node.next = None;
        node.down = None;
        let id = self.alloc(node);

        let head = match parent {
            None => self.first,
            Some(p) => self.node(p).down,
        };
        match head {
            None => match parent {
                None => self.first = Some(id),
                Some(p) => self.node_mut(p).down = Some(id),
            },
            Some(head) => {
                let mut last = head;
                while let Some(next) = self.node(last).next {
                    last = next;
                }
                self.node_mut(last).next = Some(id);
                self.node_mut(id).prev = Some(last);
            },
        }
        id
    }

    /// Iterate over a sibling chain starting at `from`.
    pub fn iter_chain(&self, from: Option<NodeId>) -> ChainIter<'_> {
        ChainIter { tree: self, cur: from }
    }

    /// Add a node to the arena without touching any chain.
    fn alloc(&mut self, node: OutlineNode) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        id
    }

    pub(crate) fn set_first(&mut self, first: Option<NodeId>) {
        self.first = first;
    }
}

/// Iterator over the `next` links of a sibling chain.
pub struct ChainIter<'a> {
    tree: &'a Outline,
    cur: Option<NodeId>,
}

impl Iterator for ChainIter<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.cur?;
        self.cur = self.tree.node(id).next;
        Some(id)
    }
}

/// Transient per-traversal marking of visited persisted identities.
///
/// The set is shared across the whole recursive traversal; each sibling
/// chain marks through its own [`ChainScope`], whose drop unmarks exactly
/// what that chain marked. After a top-level traversal finishes, by any
/// path, the set is empty again.
pub(crate) struct VisitTracker {
    seen: RefCell<HashSet<ObjectRef>>,
}

impl VisitTracker {
    pub(crate) fn new() -> Self {
        Self {
            seen: RefCell::new(HashSet::new()),
        }
    }

    /// Begin marking one sibling chain.
    pub(crate) fn scope(&self) -> ChainScope<'_> {
        ChainScope {
            tracker: self,
            marked: Vec::new(),
        }
    }

    /// Whether no identity is currently marked.
    pub(crate) fn is_empty(&self) -> bool {
        self.seen.borrow().is_empty()
    }
}

/// Scoped marks for one sibling chain; unmarks on drop.
pub(crate) struct ChainScope<'a> {
    tracker: &'a VisitTracker,
    marked: Vec<ObjectRef>,
}

impl ChainScope<'_> {
    /// Mark an identity as visited.
    ///
    /// Returns `false` if it was already marked anywhere in the current
    /// traversal, which ends the chain being walked.
    pub(crate) fn mark(&mut self, obj_ref: ObjectRef) -> bool {
        if self.tracker.seen.borrow_mut().insert(obj_ref) {
            self.marked.push(obj_ref);
            true
        } else {
            false
        }
    }
}

impl Drop for ChainScope<'_> {
    fn drop(&mut self) {
        let mut seen = self.tracker.seen.borrow_mut();
        for obj_ref in &self.marked {
            seen.remove(obj_ref);
        }
    }
}

impl Document {
    /// Load the document outline, if present.
    ///
    /// Resolves trailer → /Root → /Outlines → /First; a document without
    /// an outline yields `Ok(None)`. The page index is cached for the
    /// duration of the load and torn down before returning, whether the
    /// load succeeds or fails. On failure no partial tree is returned.
    pub fn load_outline(&mut self) -> Result<Option<Outline>> {
        let first_obj = {
            let Some(root) = self.trailer().get("Root") else {
                return Ok(None);
            };
            let Some(root_dict) = self.resolve_dict(root) else {
                return Ok(None);
            };
            let Some(outlines) = root_dict.get("Outlines") else {
                return Ok(None);
            };
            let Some(outlines_dict) = self.resolve_dict(outlines) else {
                return Ok(None);
            };
            match outlines_dict.get("First") {
                Some(first) => first.clone(),
                None => return Ok(None),
            }
        };

        // Cache the page tree for fast link destination lookups.
        self.load_page_index()?;
        let result = self.load_outline_root(&first_obj);
        self.drop_page_index();
        result.map(Some)
    }

    fn load_outline_root(&self, first_obj: &Object) -> Result<Outline> {
        let mut tree = Outline::new();
        let tracker = VisitTracker::new();
        let first = self.load_outline_chain(&tracker, None, first_obj, &mut tree)?;
        tree.set_first(first);
        debug_assert!(tracker.is_empty());
        Ok(tree)
    }

    /// Load one sibling chain, recursing into child chains.
    ///
    /// Returns the first node produced, or `None` for an empty chain. A
    /// node whose identity was already visited in this traversal ends the
    /// chain; the truncation is logged, not surfaced.
    fn load_outline_chain(
        &self,
        tracker: &VisitTracker,
        parent: Option<NodeId>,
        first_obj: &Object,
        tree: &mut Outline,
    ) -> Result<Option<NodeId>> {
        let mut scope = tracker.scope();
        let mut first: Option<NodeId> = None;
        let mut prev_sib: Option<NodeId> = None;
        let mut cur = first_obj.clone();

        loop {
            let Some(obj) = self.resolve(&cur).cloned() else {
                break;
            };
            let Some(dict) = obj.as_dict() else {
                break;
            };
            if let Some(obj_ref) = cur.as_reference() {
                if !scope.mark(obj_ref) {
                    log::warn!("Outline chain revisits {}, truncating", obj_ref);
                    break;
                }
            }

            let title = dict
                .get("Title")
                .and_then(|t| self.resolve(t))
                .and_then(|t| t.to_text_string());

            let uri = if let Some(dest) = dict.get("Dest") {
                links::parse_link_dest(self, dest)?
            } else if let Some(action) = dict.get("A") {
                links::parse_link_action(self, action)?
            } else {
                None
            };
            let dest = match uri {
                Some(uri) if !links::is_external_link(&uri) => {
                    let (page, x, y) = links::resolve_link(self, &uri)?;
                    Some(Destination::Internal { page, x, y })
                },
                Some(uri) => Some(Destination::External { uri }),
                None => None,
            };

            let id = tree.alloc(OutlineNode {
                title,
                dest,
                is_open: false,
                parent,
                prev: prev_sib,
                next: None,
                down: None,
            });
            if let Some(prev) = prev_sib {
                tree.node_mut(prev).next = Some(id);
            }
            if first.is_none() {
                first = Some(id);
            }
            prev_sib = Some(id);

            if let Some(first_child) = dict.get("First") {
                let down = self.load_outline_chain(tracker, Some(id), first_child, tree)?;
                tree.node_mut(id).down = down;
                if down.is_some() {
                    let count = dict
                        .get("Count")
                        .and_then(|c| self.resolve(c))
                        .and_then(|c| c.as_integer())
                        .unwrap_or(0);
                    if count > 0 {
                        tree.node_mut(id).is_open = true;
                    }
                }
            }

            match dict.get("Next") {
                Some(next) => cur = next.clone(),
                None => break,
            }
        }

        Ok(first)
    }
}
