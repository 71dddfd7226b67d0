//! Whole-tree passes run once the builder is done.
use std::sync::Arc;

use crate::tags::TagRef;

use super::{Document, NodeId};

/// Runs every node's sanitize hook, children before their parent, root last.
pub fn sanitize(doc: &mut Document, erroneous: &TagRef, drop_erroneous: bool) {
    let mut breadcrumb = Vec::new();
    let root = doc.root();
    sanitize_node(doc, root, &mut breadcrumb, erroneous, drop_erroneous);
}

fn sanitize_node(
    doc: &mut Document,
    id: NodeId,
    breadcrumb: &mut Vec<NodeId>,
    erroneous: &TagRef,
    drop_erroneous: bool,
) {
    // Hooks may unwrap a child into its siblings, so walk a snapshot.
    let children = doc.children(id).to_vec();
    breadcrumb.push(id);
    for child in children {
        sanitize_node(doc, child, breadcrumb, erroneous, drop_erroneous);
    }
    breadcrumb.pop();

    let tag = Arc::clone(&doc.node(id).tag);
    tag.sanitize(doc, id, breadcrumb, erroneous, drop_erroneous);
}

/// Runs post-process hooks top-down. A hook returning `false` keeps the pass out of that
/// node's children.
pub fn post_process(doc: &mut Document) {
    let root = doc.root();
    post_process_node(doc, root);
}

fn post_process_node(doc: &mut Document, id: NodeId) {
    let tag = Arc::clone(&doc.node(id).tag);
    if !tag.post_process(doc, id) {
        return;
    }

    let children = doc.children(id).to_vec();
    for child in children {
        post_process_node(doc, child);
    }
}
