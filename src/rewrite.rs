//! Outline validation and persisted rewrite.
//!
//! Replacing a document's outline is a three-stage pipeline: validate the
//! in-memory tree's linkage invariants, delete the previously persisted
//! outline subtree, then serialize the new tree into freshly allocated
//! objects with threaded sibling/parent links and signed visibility
//! counts. The writer assumes the validator has run; it does not
//! re-derive the invariants it depends on.
//!
//! The clear-then-write sequence is not transactional: a failure after
//! clearing leaves the document with no outline rather than the old one.

use std::collections::HashMap;

use crate::document::Document;
use crate::error::{Error, Result};
use crate::object::{Object, ObjectRef};
use crate::outline::{Destination, NodeId, Outline};
use crate::pages;

impl Outline {
    /// Check the structural invariants of this tree.
    ///
    /// Every sibling chain must start with a null `prev`, every member
    /// must name the chain's common parent, and every `prev` must point at
    /// the immediately preceding sibling. The first violation found is
    /// returned; an empty tree is valid.
    pub fn validate(&self) -> Result<()> {
        match self.first() {
            None => Ok(()),
            Some(first) => match self.check_chain(first, None) {
                Some(reason) => Err(Error::InvalidOutline(reason)),
                None => Ok(()),
            },
        }
    }

    fn check_chain(&self, first: NodeId, parent: Option<NodeId>) -> Option<&'static str> {
        if self.node(first).prev.is_some() {
            return Some("first child's prev is not null");
        }

        let mut prev: Option<NodeId> = None;
        let mut cur = Some(first);
        while let Some(id) = cur {
            let node = self.node(id);
            if node.parent != parent {
                return Some("parent does not match");
            }
            if node.prev != prev {
                return Some("prev does not match");
            }
            if let Some(down) = node.down {
                if let Some(reason) = self.check_chain(down, Some(id)) {
                    return Some(reason);
                }
            }
            prev = Some(id);
            cur = node.next;
        }
        None
    }
}

impl Document {
    /// Remove the persisted outline tree, if any.
    ///
    /// /Root, /Outlines, and /First must be indirect where present;
    /// a violation aborts with a structural error naming the offending
    /// link. A document without an outline is a no-op. Deletion is
    /// best-effort: a structural fault found mid-subtree leaves earlier
    /// deletions in place.
    pub fn clear_outline(&mut self) -> Result<()> {
        let root_ref = self.catalog_ref()?;

        let outlines_obj = match self.get_dict(root_ref)?.get("Outlines") {
            Some(outlines) => outlines.clone(),
            None => return Ok(()),
        };
        let outlines_ref = outlines_obj
            .as_reference()
            .ok_or_else(|| Error::Structure("/Outlines is not indirect".to_string()))?;

        let first_obj = match self
            .get(outlines_ref)
            .ok()
            .and_then(|o| o.as_dict())
            .and_then(|d| d.get("First"))
        {
            Some(first) => first.clone(),
            None => return Ok(()),
        };
        if first_obj.as_reference().is_none() {
            return Err(Error::Structure("/First is not indirect".to_string()));
        }

        // Cache the page tree for the duration of the operation.
        self.load_page_index()?;
        let result = (|| -> Result<()> {
            self.clear_outline_chain(&first_obj)?;
            self.delete_object(outlines_ref);
            self.dict_del(root_ref, "Outlines")
        })();
        self.drop_page_index();
        result
    }

    /// Delete one persisted sibling chain and its subtrees.
    fn clear_outline_chain(&mut self, first: &Object) -> Result<()> {
        let mut cur = first.clone();
        while let Some(obj_ref) = cur.as_reference() {
            let (down, next) = {
                let Some(dict) = self.get(obj_ref).ok().and_then(|o| o.as_dict()) else {
                    // Dangling links (including cycles back into deleted
                    // nodes) terminate the chain.
                    break;
                };
                (dict.get("First").cloned(), dict.get("Next").cloned())
            };

            if let Some(down) = &down {
                if down.as_reference().is_none() {
                    return Err(Error::Structure("/Down is not indirect".to_string()));
                }
            }
            if let Some(next) = &next {
                if next.as_reference().is_none() {
                    return Err(Error::Structure("/Next is not indirect".to_string()));
                }
            }

            self.delete_object(obj_ref);

            if let Some(down) = down {
                self.clear_outline_chain(&down)?;
            }
            cur = next.unwrap_or(Object::Null);
        }
        Ok(())
    }

    /// Serialize an outline tree into newly allocated persisted objects.
    ///
    /// The document must not already carry an outline. An empty tree
    /// writes nothing (no /Outlines entry is created).
    pub fn write_outline(&mut self, tree: &Outline) -> Result<()> {
        if tree.is_empty() {
            return Ok(());
        }

        let root_ref = self.catalog_ref()?;
        if self.get_dict(root_ref)?.get("Outlines").is_some() {
            return Err(Error::OutlineExists);
        }

        // The top-level container is treated as an always-open parent.
        let outlines_ref = self.add_object(Object::Dictionary(HashMap::new()));
        self.write_outline_chain(tree, tree.first(), outlines_ref, true)?;
        self.dict_put(root_ref, "Outlines", Object::Reference(outlines_ref))
    }

    /// Write one sibling chain under `parent_ref`.
    ///
    /// Threads Next/Prev between siblings as they are produced, recurses
    /// into each node's children with that node as the new parent, and
    /// finally writes the parent's First/Last/Count. An empty chain
    /// leaves the parent without those entries.
    fn write_outline_chain(
        &mut self,
        tree: &Outline,
        first: Option<NodeId>,
        parent_ref: ObjectRef,
        parent_open: bool,
    ) -> Result<()> {
        let Some(first) = first else {
            return Ok(());
        };

        let mut first_ref: Option<ObjectRef> = None;
        let mut last_ref: Option<ObjectRef> = None;
        let mut count: i64 = 0;

        let mut cur = Some(first);
        while let Some(id) = cur {
            let node = tree.node(id).clone();

            let mut dict = HashMap::new();
            if let Some(title) = &node.title {
                dict.insert("Title".to_string(), Object::from_text_str(title));
            }
            dict.insert("Parent".to_string(), Object::Reference(parent_ref));
            let this_ref = self.add_object(Object::Dictionary(dict));

            match &node.dest {
                Some(Destination::Internal { page, x, y }) => {
                    let dest = self.build_dest_array(*page, *x, *y)?;
                    self.dict_put(this_ref, "Dest", dest)?;
                },
                Some(Destination::External { uri }) => {
                    let mut action = HashMap::new();
                    action.insert("S".to_string(), Object::Name("URI".to_string()));
                    action.insert("URI".to_string(), Object::from_text_str(uri));
                    self.dict_put(this_ref, "A", Object::Dictionary(action))?;
                },
                None => {},
            }

            if first_ref.is_none() {
                first_ref = Some(this_ref);
            }
            if let Some(last) = last_ref {
                self.dict_put(last, "Next", Object::Reference(this_ref))?;
                self.dict_put(this_ref, "Prev", Object::Reference(last))?;
            }
            last_ref = Some(this_ref);

            self.write_outline_chain(tree, node.down, this_ref, node.is_open)?;

            count += 1;
            cur = node.next;
        }

        if let (Some(first_ref), Some(last_ref)) = (first_ref, last_ref) {
            self.dict_put(parent_ref, "First", Object::Reference(first_ref))?;
            self.dict_put(parent_ref, "Last", Object::Reference(last_ref))?;
        }
        self.dict_put(
            parent_ref,
            "Count",
            Object::Integer(if parent_open { count } else { -count }),
        )
    }

    /// Build a `[page /XYZ x y 0]` destination array.
    ///
    /// The y-coordinate is mapped from the viewport convention back into
    /// the page's native space as `h - y`, except that `y == 0` bypasses
    /// the inversion entirely. That asymmetry mirrors the load-side parse
    /// and keeps destination round-trips stable.
    fn build_dest_array(&self, page: usize, x: f32, y: f32) -> Result<Object> {
        let page_ref = self
            .lookup_page_obj(page)
            .ok_or(Error::PageNotFound(page))?;
        let h = pages::page_bounds(self, page_ref)?.height();
        let y_out = if y != 0.0 { h - y } else { 0.0 };

        Ok(Object::Array(vec![
            Object::Reference(page_ref),
            Object::Name("XYZ".to_string()),
            Object::Real(x as f64),
            Object::Real(y_out as f64),
            Object::Integer(0),
        ]))
    }

    /// Replace the document's outline with `tree`.
    ///
    /// Validates the tree, clears any previously persisted outline, then
    /// writes the new one. A validation failure leaves the persisted
    /// state untouched; a failure between clear and write leaves the
    /// document with no outline (see module docs).
    pub fn rewrite_outline(&mut self, tree: &Outline) -> Result<()> {
        tree.validate()?;
        self.clear_outline()?;
        self.write_outline(tree)
    }
}
