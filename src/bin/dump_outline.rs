//! Build a sample document, rewrite an outline into it, load it back,
//! and dump the loaded tree as JSON.
//!
//! Exercises the full load/validate/clear/write pipeline end to end.
//! Run with `RUST_LOG=debug` to watch the object-store traffic.

use pdf_outline::{Destination, Document, NodeId, Outline, OutlineNode, Result};
use serde::Serialize;

/// JSON-friendly snapshot of one outline entry.
#[derive(Serialize)]
struct Entry {
    title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    dest: Option<Destination>,
    is_open: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    children: Vec<Entry>,
}

fn snapshot(tree: &Outline, from: Option<NodeId>) -> Vec<Entry> {
    tree.iter_chain(from)
        .map(|id| {
            let node = tree.node(id);
            Entry {
                title: node.title.clone(),
                dest: node.dest.clone(),
                is_open: node.is_open,
                children: snapshot(tree, node.down),
            }
        })
        .collect()
}

fn main() -> Result<()> {
    env_logger::init();

    let mut doc = Document::new();
    for _ in 0..3 {
        doc.add_page(612.0, 792.0)?;
    }

    let mut tree = Outline::new();
    let ch1 = tree.push_back(
        None,
        OutlineNode::new("Chapter 1")
            .with_dest(Destination::Internal {
                page: 0,
                x: 72.0,
                y: 100.0,
            })
            .with_open(true),
    );
    tree.push_back(
        Some(ch1),
        OutlineNode::new("Section 1.1").with_dest(Destination::Internal {
            page: 1,
            x: 72.0,
            y: 200.0,
        }),
    );
    tree.push_back(
        None,
        OutlineNode::new("Chapter 2").with_dest(Destination::Internal {
            page: 2,
            x: 0.0,
            y: 0.0,
        }),
    );
    tree.push_back(
        None,
        OutlineNode::new("Project home").with_dest(Destination::External {
            uri: "https://example.com".to_string(),
        }),
    );

    doc.rewrite_outline(&tree)?;
    log::info!("Wrote outline ({} entries)", tree.len());

    let loaded = doc.load_outline()?.unwrap_or_default();
    let entries = snapshot(&loaded, loaded.first());
    println!(
        "{}",
        serde_json::to_string_pretty(&entries).expect("outline snapshot serializes")
    );
    Ok(())
}
