//! Page-tree indexing.
//!
//! [`PageIndex`] is a fast page-number lookup built by walking the
//! document's page tree once. The outline loader and clearer build it at
//! the start of a top-level operation (via
//! [`Document::load_page_index`](crate::document::Document::load_page_index))
//! and tear it down before returning, so destination resolution inside the
//! traversal is O(1) instead of a tree walk per node.

use std::collections::{HashMap, HashSet};

use crate::document::Document;
use crate::error::{Error, Result};
use crate::geometry::{Matrix, Rect};
use crate::object::{Object, ObjectRef};

/// Default media box when a page does not declare one (US Letter).
const DEFAULT_MEDIA_BOX: Rect = Rect {
    x0: 0.0,
    y0: 0.0,
    x1: 612.0,
    y1: 792.0,
};

/// Ordered page lookup over a document's page tree.
#[derive(Debug)]
pub struct PageIndex {
    /// Page object references in document order
    pages: Vec<ObjectRef>,
    /// Reverse lookup from page object to page number
    by_ref: HashMap<ObjectRef, usize>,
}

impl PageIndex {
    /// Build the index by walking Root → Pages → Kids.
    ///
    /// Intermediate `Pages` nodes are descended into; a visited set guards
    /// against malformed page trees that cycle.
    pub fn build(doc: &Document) -> Result<PageIndex> {
        let catalog_ref = doc.catalog_ref()?;
        let catalog = doc.get_dict(catalog_ref)?;

        let mut pages = Vec::new();
        if let Some(pages_obj) = catalog.get("Pages") {
            let mut visited = HashSet::new();
            collect_pages(doc, pages_obj, &mut pages, &mut visited)?;
        }

        let by_ref = pages.iter().enumerate().map(|(i, &r)| (r, i)).collect();
        log::debug!("Built page index over {} pages", pages.len());
        Ok(PageIndex { pages, by_ref })
    }

    /// The page object for a zero-based page number.
    pub fn page_ref(&self, page_no: usize) -> Option<ObjectRef> {
        self.pages.get(page_no).copied()
    }

    /// The zero-based page number of a page object.
    pub fn page_number(&self, page_ref: ObjectRef) -> Option<usize> {
        self.by_ref.get(&page_ref).copied()
    }

    /// Number of pages in the document.
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    /// Whether the document has no pages.
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

/// Recursively collect page leaves from a page-tree node.
fn collect_pages(
    doc: &Document,
    node: &Object,
    out: &mut Vec<ObjectRef>,
    visited: &mut HashSet<ObjectRef>,
) -> Result<()> {
    // Cyclic or aliased page trees terminate rather than recurse forever.
    if let Some(r) = node.as_reference() {
        if !visited.insert(r) {
            log::warn!("Page tree references {} more than once, skipping", r);
            return Ok(());
        }
    }

    let Some(dict) = doc.resolve_dict(node) else {
        return Ok(());
    };

    match dict.get("Type").and_then(|t| t.as_name()) {
        Some("Page") => {
            let page_ref = node.as_reference().ok_or_else(|| {
                Error::Structure("page object is not indirect".to_string())
            })?;
            out.push(page_ref);
        },
        Some("Pages") => {
            if let Some(kids) = dict.get("Kids").and_then(|k| doc.resolve(k)) {
                if let Some(kids) = kids.as_array() {
                    for kid in kids {
                        collect_pages(doc, kid, out, visited)?;
                    }
                }
            }
        },
        _ => {},
    }
    Ok(())
}

/// Compute a page's displayable box under its transform.
///
/// Applies the page's /Rotate to its /MediaBox and returns the resulting
/// bounding rectangle; its height is the `h` used when converting
/// destination y-coordinates between viewport and page space.
pub fn page_bounds(doc: &Document, page_ref: ObjectRef) -> Result<Rect> {
    let page = doc.get_dict(page_ref)?;

    let media_box = page
        .get("MediaBox")
        .and_then(|b| doc.resolve(b))
        .and_then(|b| b.as_array())
        .and_then(|b| parse_rect(b))
        .unwrap_or(DEFAULT_MEDIA_BOX);

    let rotate = page
        .get("Rotate")
        .and_then(|r| doc.resolve(r))
        .and_then(|r| r.as_integer())
        .unwrap_or(0);

    Ok(media_box.transform(&Matrix::rotate(rotate)).normalized())
}

/// Parse a 4-element number array as a rectangle.
fn parse_rect(arr: &[Object]) -> Option<Rect> {
    if arr.len() != 4 {
        return None;
    }
    let mut v = [0.0f32; 4];
    for (i, obj) in arr.iter().enumerate() {
        v[i] = obj.as_number()? as f32;
    }
    Some(Rect::new(v[0], v[1], v[2], v[3]).normalized())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_over_flat_page_tree() {
        let mut doc = Document::new();
        let p0 = doc.add_page(612.0, 792.0).unwrap();
        let p1 = doc.add_page(595.0, 842.0).unwrap();

        let index = PageIndex::build(&doc).unwrap();
        assert_eq!(index.len(), 2);
        assert_eq!(index.page_ref(0), Some(p0));
        assert_eq!(index.page_ref(1), Some(p1));
        assert_eq!(index.page_number(p1), Some(1));
        assert_eq!(index.page_number(ObjectRef::new(99, 0)), None);
    }

    #[test]
    fn test_index_over_empty_document() {
        let doc = Document::new();
        let index = PageIndex::build(&doc).unwrap();
        assert!(index.is_empty());
        assert_eq!(index.page_ref(0), None);
    }

    #[test]
    fn test_nested_pages_nodes() {
        let mut doc = Document::new();
        let p0 = doc.add_page(612.0, 792.0).unwrap();

        // Hang a nested Pages node with one leaf off the root Pages node.
        let mut leaf = std::collections::HashMap::new();
        leaf.insert("Type".to_string(), Object::Name("Page".to_string()));
        let leaf_ref = doc.add_object(Object::Dictionary(leaf));

        let mut inner = std::collections::HashMap::new();
        inner.insert("Type".to_string(), Object::Name("Pages".to_string()));
        inner.insert(
            "Kids".to_string(),
            Object::Array(vec![Object::Reference(leaf_ref)]),
        );
        let inner_ref = doc.add_object(Object::Dictionary(inner));

        let catalog_ref = doc.catalog_ref().unwrap();
        let pages_ref = doc
            .get_dict(catalog_ref)
            .unwrap()
            .get("Pages")
            .unwrap()
            .as_reference()
            .unwrap();
        let kids = doc.get_dict(pages_ref).unwrap().get("Kids").unwrap().clone();
        let mut kids = kids.as_array().unwrap().clone();
        kids.push(Object::Reference(inner_ref));
        doc.dict_put(pages_ref, "Kids", Object::Array(kids)).unwrap();

        let index = PageIndex::build(&doc).unwrap();
        assert_eq!(index.len(), 2);
        assert_eq!(index.page_ref(0), Some(p0));
        assert_eq!(index.page_ref(1), Some(leaf_ref));
    }

    #[test]
    fn test_cyclic_page_tree_terminates() {
        let mut doc = Document::new();
        doc.add_page(612.0, 792.0).unwrap();

        // Point the root Pages node's Kids back at itself.
        let catalog_ref = doc.catalog_ref().unwrap();
        let pages_ref = doc
            .get_dict(catalog_ref)
            .unwrap()
            .get("Pages")
            .unwrap()
            .as_reference()
            .unwrap();
        let mut kids = doc
            .get_dict(pages_ref)
            .unwrap()
            .get("Kids")
            .unwrap()
            .as_array()
            .unwrap()
            .clone();
        kids.push(Object::Reference(pages_ref));
        doc.dict_put(pages_ref, "Kids", Object::Array(kids)).unwrap();

        let index = PageIndex::build(&doc).unwrap();
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_page_bounds_default_media_box() {
        let mut doc = Document::new();
        let page_ref = doc.add_page(612.0, 792.0).unwrap();
        doc.dict_del(page_ref, "MediaBox").unwrap();

        let bounds = page_bounds(&doc, page_ref).unwrap();
        assert_eq!(bounds.height(), 792.0);
    }

    #[test]
    fn test_page_bounds_rotation_swaps_height() {
        let mut doc = Document::new();
        let page_ref = doc.add_page(612.0, 792.0).unwrap();
        doc.dict_put(page_ref, "Rotate", Object::Integer(90)).unwrap();

        let bounds = page_bounds(&doc, page_ref).unwrap();
        assert_eq!(bounds.height(), 612.0);
        assert_eq!(bounds.width(), 792.0);
    }
}
