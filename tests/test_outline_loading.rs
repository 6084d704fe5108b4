//! Integration tests for loading persisted outline graphs, including
//! malformed ones (cycles, aliased chains, non-dictionary terminators).

use std::collections::HashMap;

use pdf_outline::{Destination, Document, Object, ObjectRef};

/// Allocate an empty outline item dictionary.
fn new_item(doc: &mut Document, title: &str) -> ObjectRef {
    let mut dict = HashMap::new();
    dict.insert("Title".to_string(), Object::from_text_str(title));
    doc.add_object(Object::Dictionary(dict))
}

/// Allocate the /Outlines container and attach it to the catalog.
fn attach_outlines(doc: &mut Document, first: ObjectRef, last: ObjectRef) -> ObjectRef {
    let mut dict = HashMap::new();
    dict.insert("First".to_string(), Object::Reference(first));
    dict.insert("Last".to_string(), Object::Reference(last));
    let outlines_ref = doc.add_object(Object::Dictionary(dict));

    let root_ref = doc.catalog_ref().unwrap();
    doc.dict_put(root_ref, "Outlines", Object::Reference(outlines_ref))
        .unwrap();
    outlines_ref
}

fn xyz_dest(page_ref: ObjectRef, x: i64, y: i64) -> Object {
    Object::Array(vec![
        Object::Reference(page_ref),
        Object::Name("XYZ".to_string()),
        Object::Integer(x),
        Object::Integer(y),
        Object::Integer(0),
    ])
}

#[test]
fn test_document_without_outline_loads_none() {
    let mut doc = Document::new();
    doc.add_page(612.0, 792.0).unwrap();
    assert!(doc.load_outline().unwrap().is_none());
}

#[test]
fn test_outlines_without_first_loads_none() {
    let mut doc = Document::new();
    let outlines_ref = doc.add_object(Object::Dictionary(HashMap::new()));
    let root_ref = doc.catalog_ref().unwrap();
    doc.dict_put(root_ref, "Outlines", Object::Reference(outlines_ref))
        .unwrap();

    assert!(doc.load_outline().unwrap().is_none());
}

#[test]
fn test_load_two_level_hierarchy() {
    let mut doc = Document::new();
    let p0 = doc.add_page(612.0, 792.0).unwrap();
    let p1 = doc.add_page(612.0, 792.0).unwrap();

    let a = new_item(&mut doc, "Chapter 1");
    let a1 = new_item(&mut doc, "Section 1.1");
    let b = new_item(&mut doc, "Chapter 2");
    let outlines = attach_outlines(&mut doc, a, b);

    doc.dict_put(a, "Parent", Object::Reference(outlines)).unwrap();
    doc.dict_put(a, "Next", Object::Reference(b)).unwrap();
    doc.dict_put(a, "First", Object::Reference(a1)).unwrap();
    doc.dict_put(a, "Last", Object::Reference(a1)).unwrap();
    doc.dict_put(a, "Count", Object::Integer(1)).unwrap();
    doc.dict_put(a, "Dest", xyz_dest(p0, 10, 692)).unwrap();

    doc.dict_put(a1, "Parent", Object::Reference(a)).unwrap();
    doc.dict_put(a1, "Dest", xyz_dest(p1, 0, 0)).unwrap();

    doc.dict_put(b, "Parent", Object::Reference(outlines)).unwrap();
    doc.dict_put(b, "Prev", Object::Reference(a)).unwrap();

    let tree = doc.load_outline().unwrap().unwrap();
    assert_eq!(tree.len(), 3);
    assert!(tree.validate().is_ok());

    let first = tree.first().unwrap();
    let node_a = tree.node(first);
    assert_eq!(node_a.title.as_deref(), Some("Chapter 1"));
    assert!(node_a.is_open); // Count = 1 > 0 with a non-empty child chain
    assert_eq!(
        node_a.dest,
        // y flipped against the 792pt page: 792 - 692 = 100.
        Some(Destination::Internal {
            page: 0,
            x: 10.0,
            y: 100.0
        })
    );

    let child = tree.node(node_a.down.unwrap());
    assert_eq!(child.title.as_deref(), Some("Section 1.1"));
    assert_eq!(child.parent, Some(first));
    assert!(!child.is_open);

    let node_b = tree.node(node_a.next.unwrap());
    assert_eq!(node_b.title.as_deref(), Some("Chapter 2"));
    assert_eq!(node_b.dest, None);
    assert!(node_b.next.is_none());
}

#[test]
fn test_load_negative_count_keeps_children_closed() {
    let mut doc = Document::new();
    let a = new_item(&mut doc, "Closed");
    let a1 = new_item(&mut doc, "Hidden child");
    attach_outlines(&mut doc, a, a);
    doc.dict_put(a, "First", Object::Reference(a1)).unwrap();
    doc.dict_put(a, "Count", Object::Integer(-1)).unwrap();

    let tree = doc.load_outline().unwrap().unwrap();
    let node = tree.node(tree.first().unwrap());
    assert!(node.down.is_some());
    assert!(!node.is_open);
}

#[test]
fn test_load_action_destinations() {
    let mut doc = Document::new();
    let p0 = doc.add_page(612.0, 792.0).unwrap();

    let mut uri_action = HashMap::new();
    uri_action.insert("S".to_string(), Object::Name("URI".to_string()));
    uri_action.insert(
        "URI".to_string(),
        Object::from_text_str("https://example.com/spec"),
    );

    let mut goto_action = HashMap::new();
    goto_action.insert("S".to_string(), Object::Name("GoTo".to_string()));
    goto_action.insert("D".to_string(), xyz_dest(p0, 50, 0));

    let a = new_item(&mut doc, "External");
    let b = new_item(&mut doc, "GoTo");
    attach_outlines(&mut doc, a, b);
    doc.dict_put(a, "Next", Object::Reference(b)).unwrap();
    doc.dict_put(a, "A", Object::Dictionary(uri_action)).unwrap();
    doc.dict_put(b, "Prev", Object::Reference(a)).unwrap();
    doc.dict_put(b, "A", Object::Dictionary(goto_action)).unwrap();

    let tree = doc.load_outline().unwrap().unwrap();
    let node_a = tree.node(tree.first().unwrap());
    assert_eq!(
        node_a.dest,
        Some(Destination::External {
            uri: "https://example.com/spec".to_string()
        })
    );

    let node_b = tree.node(node_a.next.unwrap());
    assert_eq!(
        node_b.dest,
        Some(Destination::Internal {
            page: 0,
            x: 50.0,
            y: 0.0
        })
    );
}

#[test]
fn test_cyclic_sibling_chain_truncates() {
    let mut doc = Document::new();
    let a = new_item(&mut doc, "A");
    let b = new_item(&mut doc, "B");
    attach_outlines(&mut doc, a, b);
    doc.dict_put(a, "Next", Object::Reference(b)).unwrap();
    // B's Next points back at A: the chain must end there, not loop.
    doc.dict_put(b, "Next", Object::Reference(a)).unwrap();

    let tree = doc.load_outline().unwrap().unwrap();
    assert_eq!(tree.len(), 2);

    let node_a = tree.node(tree.first().unwrap());
    let node_b = tree.node(node_a.next.unwrap());
    assert_eq!(node_b.title.as_deref(), Some("B"));
    assert!(node_b.next.is_none());
    assert!(tree.validate().is_ok());
}

#[test]
fn test_self_referencing_child_chain_is_empty() {
    let mut doc = Document::new();
    let a = new_item(&mut doc, "A");
    attach_outlines(&mut doc, a, a);
    // A claims itself as its first child.
    doc.dict_put(a, "First", Object::Reference(a)).unwrap();
    doc.dict_put(a, "Count", Object::Integer(1)).unwrap();

    let tree = doc.load_outline().unwrap().unwrap();
    assert_eq!(tree.len(), 1);
    let node = tree.node(tree.first().unwrap());
    assert!(node.down.is_none());
    // The child chain came back empty, so Count must not open the node.
    assert!(!node.is_open);
}

#[test]
fn test_sibling_aliased_as_child_loads_once_per_chain() {
    let mut doc = Document::new();
    let a = new_item(&mut doc, "A");
    let b = new_item(&mut doc, "B");
    attach_outlines(&mut doc, a, b);
    doc.dict_put(a, "Next", Object::Reference(b)).unwrap();
    doc.dict_put(b, "Prev", Object::Reference(a)).unwrap();
    // B aliases the already-visited A as its child chain.
    doc.dict_put(b, "First", Object::Reference(a)).unwrap();
    doc.dict_put(b, "Count", Object::Integer(1)).unwrap();

    let tree = doc.load_outline().unwrap().unwrap();
    assert_eq!(tree.len(), 2);
    let node_a = tree.node(tree.first().unwrap());
    let node_b = tree.node(node_a.next.unwrap());
    assert!(node_b.down.is_none());
}

#[test]
fn test_non_dictionary_next_terminates_chain() {
    let mut doc = Document::new();
    let a = new_item(&mut doc, "A");
    let junk = doc.add_object(Object::Integer(12));
    attach_outlines(&mut doc, a, a);
    doc.dict_put(a, "Next", Object::Reference(junk)).unwrap();

    let tree = doc.load_outline().unwrap().unwrap();
    assert_eq!(tree.len(), 1);
}

#[test]
fn test_dangling_first_loads_empty_tree() {
    let mut doc = Document::new();
    let mut dict = HashMap::new();
    dict.insert(
        "First".to_string(),
        Object::Reference(ObjectRef::new(999, 0)),
    );
    let outlines_ref = doc.add_object(Object::Dictionary(dict));
    let root_ref = doc.catalog_ref().unwrap();
    doc.dict_put(root_ref, "Outlines", Object::Reference(outlines_ref))
        .unwrap();

    let tree = doc.load_outline().unwrap().unwrap();
    assert!(tree.is_empty());
}

#[test]
fn test_missing_title_loads_as_none() {
    let mut doc = Document::new();
    let a = doc.add_object(Object::Dictionary(HashMap::new()));
    attach_outlines(&mut doc, a, a);

    let tree = doc.load_outline().unwrap().unwrap();
    assert_eq!(tree.node(tree.first().unwrap()).title, None);
}

#[test]
fn test_page_index_torn_down_after_load() {
    let mut doc = Document::new();
    doc.add_page(612.0, 792.0).unwrap();
    let a = new_item(&mut doc, "A");
    attach_outlines(&mut doc, a, a);

    doc.load_outline().unwrap().unwrap();
    assert!(doc.page_index().is_none());
}
