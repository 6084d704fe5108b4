//! In-memory PDF document model.
//!
//! [`Document`] is an indirect-object store: a table of numbered objects
//! plus a trailer dictionary pointing at the catalog. It provides the
//! object allocation, deletion, and dereference services the outline
//! subsystem is built on, together with the scoped page-index cache used
//! to amortize destination lookups during a single load or clear.

use std::collections::HashMap;

use indexmap::IndexMap;

use crate::error::{Error, Result};
use crate::object::{Object, ObjectRef};
use crate::pages::PageIndex;

/// Maximum number of indirections followed when resolving a reference.
const MAX_REF_DEPTH: u32 = 32;

/// An in-memory PDF document.
///
/// Objects are owned by the store and addressed by [`ObjectRef`]. The
/// store assumes exclusive access: all mutating operations take
/// `&mut self` and there is no interior locking.
#[derive(Debug)]
pub struct Document {
    /// Indirect objects by object number
    objects: IndexMap<u32, Object>,
    /// Next object number to allocate
    next_id: u32,
    /// Trailer dictionary (holds the /Root entry)
    trailer: HashMap<String, Object>,
    /// Page-number lookup cache, present only inside a top-level
    /// load/clear operation
    page_index: Option<PageIndex>,
}

impl Document {
    /// Create a document with a catalog and an empty page tree.
    pub fn new() -> Self {
        let mut doc = Self::empty();

        let mut pages = HashMap::new();
        pages.insert("Type".to_string(), Object::Name("Pages".to_string()));
        pages.insert("Kids".to_string(), Object::Array(Vec::new()));
        pages.insert("Count".to_string(), Object::Integer(0));
        let pages_ref = doc.add_object(Object::Dictionary(pages));

        let mut catalog = HashMap::new();
        catalog.insert("Type".to_string(), Object::Name("Catalog".to_string()));
        catalog.insert("Pages".to_string(), Object::Reference(pages_ref));
        let catalog_ref = doc.add_object(Object::Dictionary(catalog));

        doc.trailer
            .insert("Root".to_string(), Object::Reference(catalog_ref));
        doc
    }

    /// Create a completely empty document (no trailer entries, no objects).
    ///
    /// Useful for constructing malformed documents in tests.
    pub fn empty() -> Self {
        Self {
            objects: IndexMap::new(),
            next_id: 1,
            trailer: HashMap::new(),
            page_index: None,
        }
    }

    /// Add a new indirect object, returning its reference.
    pub fn add_object(&mut self, obj: Object) -> ObjectRef {
        let id = self.next_id;
        self.next_id += 1;
        log::debug!("Allocating object {} ({})", id, obj.type_name());
        self.objects.insert(id, obj);
        ObjectRef::new(id, 0)
    }

    /// Delete an indirect object by identity.
    ///
    /// Deleting an absent object is a no-op; references to the deleted
    /// object become dangling and no longer resolve.
    pub fn delete_object(&mut self, obj_ref: ObjectRef) {
        log::debug!("Deleting object {}", obj_ref.id);
        self.objects.shift_remove(&obj_ref.id);
    }

    /// Check whether an object exists in the store.
    pub fn contains(&self, obj_ref: ObjectRef) -> bool {
        self.objects.contains_key(&obj_ref.id)
    }

    /// Number of live indirect objects.
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// Look up an indirect object.
    pub fn get(&self, obj_ref: ObjectRef) -> Result<&Object> {
        self.objects
            .get(&obj_ref.id)
            .ok_or(Error::ObjectNotFound(obj_ref))
    }

    /// Resolve a value to its direct form.
    ///
    /// References are followed (to a bounded depth); dangling references
    /// and reference loops resolve to `None`. Direct values resolve to
    /// themselves.
    pub fn resolve<'a>(&'a self, obj: &'a Object) -> Option<&'a Object> {
        let mut cur = obj;
        for _ in 0..MAX_REF_DEPTH {
            match cur {
                Object::Reference(r) => cur = self.objects.get(&r.id)?,
                _ => return Some(cur),
            }
        }
        None
    }

    /// Resolve a value and cast it to a dictionary.
    pub fn resolve_dict<'a>(&'a self, obj: &'a Object) -> Option<&'a HashMap<String, Object>> {
        self.resolve(obj)?.as_dict()
    }

    /// Look up an indirect object and cast it to a dictionary.
    pub fn get_dict(&self, obj_ref: ObjectRef) -> Result<&HashMap<String, Object>> {
        let obj = self.get(obj_ref)?;
        obj.as_dict().ok_or_else(|| Error::InvalidObjectType {
            expected: "Dictionary".to_string(),
            found: obj.type_name().to_string(),
        })
    }

    /// Insert a key into an indirect dictionary object.
    pub fn dict_put(&mut self, obj_ref: ObjectRef, key: &str, value: Object) -> Result<()> {
        match self.objects.get_mut(&obj_ref.id) {
            Some(Object::Dictionary(dict)) => {
                dict.insert(key.to_string(), value);
                Ok(())
            },
            Some(other) => Err(Error::InvalidObjectType {
                expected: "Dictionary".to_string(),
                found: other.type_name().to_string(),
            }),
            None => Err(Error::ObjectNotFound(obj_ref)),
        }
    }

    /// Remove a key from an indirect dictionary object.
    pub fn dict_del(&mut self, obj_ref: ObjectRef, key: &str) -> Result<()> {
        match self.objects.get_mut(&obj_ref.id) {
            Some(Object::Dictionary(dict)) => {
                dict.remove(key);
                Ok(())
            },
            Some(other) => Err(Error::InvalidObjectType {
                expected: "Dictionary".to_string(),
                found: other.type_name().to_string(),
            }),
            None => Err(Error::ObjectNotFound(obj_ref)),
        }
    }

    /// The trailer dictionary.
    pub fn trailer(&self) -> &HashMap<String, Object> {
        &self.trailer
    }

    /// Mutable access to the trailer dictionary.
    pub fn trailer_mut(&mut self) -> &mut HashMap<String, Object> {
        &mut self.trailer
    }

    /// The catalog (document root) reference from the trailer.
    ///
    /// The /Root entry must exist and must be indirect; anything else is a
    /// structural error.
    pub fn catalog_ref(&self) -> Result<ObjectRef> {
        let root = self
            .trailer
            .get("Root")
            .ok_or_else(|| Error::Structure("/Root does not exist".to_string()))?;
        root.as_reference()
            .ok_or_else(|| Error::Structure("/Root is not indirect".to_string()))
    }

    /// Append a page of the given size to the page tree.
    pub fn add_page(&mut self, width: f32, height: f32) -> Result<ObjectRef> {
        let catalog_ref = self.catalog_ref()?;
        let catalog = self.get_dict(catalog_ref)?;
        let pages_ref = catalog
            .get("Pages")
            .and_then(|p| p.as_reference())
            .ok_or_else(|| Error::Structure("/Pages is not indirect".to_string()))?;

        let mut page = HashMap::new();
        page.insert("Type".to_string(), Object::Name("Page".to_string()));
        page.insert("Parent".to_string(), Object::Reference(pages_ref));
        page.insert(
            "MediaBox".to_string(),
            Object::Array(vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Real(width as f64),
                Object::Real(height as f64),
            ]),
        );
        let page_ref = self.add_object(Object::Dictionary(page));

        match self.objects.get_mut(&pages_ref.id) {
            Some(Object::Dictionary(pages)) => {
                match pages.get_mut("Kids") {
                    Some(Object::Array(kids)) => kids.push(Object::Reference(page_ref)),
                    _ => {
                        pages.insert(
                            "Kids".to_string(),
                            Object::Array(vec![Object::Reference(page_ref)]),
                        );
                    },
                }
                let count = pages.get("Count").and_then(|c| c.as_integer()).unwrap_or(0);
                pages.insert("Count".to_string(), Object::Integer(count + 1));
            },
            _ => return Err(Error::ObjectNotFound(pages_ref)),
        }

        Ok(page_ref)
    }

    /// Build the page-number lookup cache for the duration of a top-level
    /// operation.
    ///
    /// Callers must pair this with [`Document::drop_page_index`] on every
    /// exit path; the cache must not outlive the operation it was built
    /// for.
    pub fn load_page_index(&mut self) -> Result<()> {
        if self.page_index.is_none() {
            self.page_index = Some(PageIndex::build(self)?);
        }
        Ok(())
    }

    /// Tear down the page-number lookup cache.
    pub fn drop_page_index(&mut self) {
        self.page_index = None;
    }

    /// The page-index cache, if one is currently loaded.
    pub fn page_index(&self) -> Option<&PageIndex> {
        self.page_index.as_ref()
    }

    /// Find the page object for a zero-based page number.
    ///
    /// Uses the cache when present, otherwise walks the page tree.
    pub fn lookup_page_obj(&self, page_no: usize) -> Option<ObjectRef> {
        match &self.page_index {
            Some(index) => index.page_ref(page_no),
            None => PageIndex::build(self).ok()?.page_ref(page_no),
        }
    }

    /// Find the zero-based page number of a page object.
    pub fn find_page_number(&self, page_ref: ObjectRef) -> Option<usize> {
        match &self.page_index {
            Some(index) => index.page_number(page_ref),
            None => PageIndex::build(self).ok()?.page_number(page_ref),
        }
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_document_has_catalog() {
        let doc = Document::new();
        let catalog_ref = doc.catalog_ref().unwrap();
        let catalog = doc.get_dict(catalog_ref).unwrap();
        assert_eq!(catalog.get("Type").unwrap().as_name(), Some("Catalog"));
    }

    #[test]
    fn test_empty_document_has_no_root() {
        let doc = Document::empty();
        assert!(matches!(doc.catalog_ref(), Err(Error::Structure(_))));
    }

    #[test]
    fn test_add_and_delete_object() {
        let mut doc = Document::empty();
        let r = doc.add_object(Object::Integer(7));
        assert!(doc.contains(r));
        assert_eq!(doc.get(r).unwrap().as_integer(), Some(7));

        doc.delete_object(r);
        assert!(!doc.contains(r));
        assert!(matches!(doc.get(r), Err(Error::ObjectNotFound(_))));
    }

    #[test]
    fn test_resolve_follows_references() {
        let mut doc = Document::empty();
        let inner = doc.add_object(Object::Integer(42));
        let outer = doc.add_object(Object::Reference(inner));

        let via = Object::Reference(outer);
        assert_eq!(doc.resolve(&via).unwrap().as_integer(), Some(42));
    }

    #[test]
    fn test_resolve_dangling_reference() {
        let doc = Document::empty();
        let dangling = Object::Reference(ObjectRef::new(99, 0));
        assert!(doc.resolve(&dangling).is_none());
    }

    #[test]
    fn test_resolve_reference_loop() {
        let mut doc = Document::empty();
        let a = doc.add_object(Object::Null);
        let b = doc.add_object(Object::Reference(a));
        // Patch a to point back at b.
        doc.objects.insert(a.id, Object::Reference(b));

        assert!(doc.resolve(&Object::Reference(a)).is_none());
    }

    #[test]
    fn test_dict_put_and_del() {
        let mut doc = Document::empty();
        let r = doc.add_object(Object::Dictionary(HashMap::new()));

        doc.dict_put(r, "Count", Object::Integer(3)).unwrap();
        assert_eq!(
            doc.get_dict(r).unwrap().get("Count").unwrap().as_integer(),
            Some(3)
        );

        doc.dict_del(r, "Count").unwrap();
        assert!(doc.get_dict(r).unwrap().get("Count").is_none());
    }

    #[test]
    fn test_dict_put_on_non_dict() {
        let mut doc = Document::empty();
        let r = doc.add_object(Object::Integer(1));
        assert!(matches!(
            doc.dict_put(r, "Key", Object::Null),
            Err(Error::InvalidObjectType { .. })
        ));
    }

    #[test]
    fn test_add_page_grows_page_tree() {
        let mut doc = Document::new();
        let p0 = doc.add_page(612.0, 792.0).unwrap();
        let p1 = doc.add_page(612.0, 792.0).unwrap();

        assert_eq!(doc.lookup_page_obj(0), Some(p0));
        assert_eq!(doc.lookup_page_obj(1), Some(p1));
        assert_eq!(doc.lookup_page_obj(2), None);
        assert_eq!(doc.find_page_number(p1), Some(1));
    }

    #[test]
    fn test_page_index_lifecycle() {
        let mut doc = Document::new();
        doc.add_page(612.0, 792.0).unwrap();

        assert!(doc.page_index().is_none());
        doc.load_page_index().unwrap();
        assert!(doc.page_index().is_some());
        doc.drop_page_index();
        assert!(doc.page_index().is_none());
    }
}
