//! Tests for tree mutation methods: add_child, remove_child, insert_before.

use bramble_dom::{DomTree, ElementData, NodeId, NodeType};

/// Helper to create an element node and return its NodeId.
fn alloc_element(tree: &mut DomTree, tag: &str) -> NodeId {
    tree.alloc(NodeType::Element(ElementData::new(tag)))
}

/// Helper to create a self-closing element node.
fn alloc_void(tree: &mut DomTree, tag: &str) -> NodeId {
    tree.alloc(NodeType::SelfClosing(ElementData::new(tag)))
}

/// Assert that every child of `parent` points back at it with the right index.
fn assert_consistent(tree: &DomTree, parent: NodeId) {
    for (index, &child) in tree.children(parent).iter().enumerate() {
        assert_eq!(tree.parent(child), Some(parent));
        assert_eq!(tree.child_index(child), Some(index));
    }
}

// ========== add_child ==========

#[test]
fn test_add_child_sets_parent_and_index() {
    let mut tree = DomTree::new();
    let div = alloc_element(&mut tree, "div");
    let a = alloc_element(&mut tree, "a");
    let b = alloc_element(&mut tree, "b");

    assert!(tree.add_child(NodeId::ROOT, div));
    assert!(tree.add_child(div, a));
    assert!(tree.add_child(div, b));

    assert_eq!(tree.children(div), &[a, b]);
    assert_eq!(tree.child_index(b), Some(1));
    assert_consistent(&tree, div);
}

#[test]
fn test_add_child_to_self_closing_is_refused() {
    let mut tree = DomTree::new();
    let br = alloc_void(&mut tree, "br");
    let span = alloc_element(&mut tree, "span");

    assert!(!tree.add_child(br, span));
    assert!(tree.children(br).is_empty());
    assert_eq!(tree.parent(span), None);
}

#[test]
fn test_add_child_to_text_is_refused() {
    let mut tree = DomTree::new();
    let text = tree.alloc(NodeType::Text("hello".to_string()));
    let span = alloc_element(&mut tree, "span");

    assert!(!tree.add_child(text, span));
}

#[test]
fn test_add_child_reparents() {
    let mut tree = DomTree::new();
    let first = alloc_element(&mut tree, "div");
    let second = alloc_element(&mut tree, "div");
    let a = alloc_element(&mut tree, "a");
    let b = alloc_element(&mut tree, "b");
    assert!(tree.add_child(NodeId::ROOT, first));
    assert!(tree.add_child(NodeId::ROOT, second));
    assert!(tree.add_child(first, a));
    assert!(tree.add_child(first, b));

    assert!(tree.add_child(second, a));

    assert_eq!(tree.children(first), &[b]);
    assert_eq!(tree.children(second), &[a]);
    assert_eq!(tree.parent(a), Some(second));
    assert_consistent(&tree, first);
    assert_consistent(&tree, second);
}

#[test]
fn test_add_child_twice_is_refused() {
    let mut tree = DomTree::new();
    let div = alloc_element(&mut tree, "div");
    let a = alloc_element(&mut tree, "a");
    assert!(tree.add_child(div, a));

    assert!(!tree.add_child(div, a));
    assert_eq!(tree.children(div), &[a]);
}

#[test]
fn test_add_child_refuses_cycles() {
    let mut tree = DomTree::new();
    let outer = alloc_element(&mut tree, "div");
    let inner = alloc_element(&mut tree, "div");
    assert!(tree.add_child(outer, inner));

    assert!(!tree.add_child(inner, outer));
    assert!(!tree.add_child(outer, outer));
    assert!(!tree.add_child(outer, NodeId::ROOT));
}

// ========== remove_child ==========

#[test]
fn test_remove_child_single_child() {
    let mut tree = DomTree::new();
    let parent = alloc_element(&mut tree, "div");
    assert!(tree.add_child(NodeId::ROOT, parent));

    let child = alloc_element(&mut tree, "p");
    assert!(tree.add_child(parent, child));

    assert_eq!(tree.children(parent).len(), 1);

    assert!(tree.remove_child(parent, child));

    assert_eq!(tree.children(parent).len(), 0);
    assert_eq!(tree.parent(child), None);
    assert_eq!(tree.prev_sibling(child), None);
    assert_eq!(tree.next_sibling(child), None);
    // Detached, not destroyed.
    assert!(tree.contains(child));
}

#[test]
fn test_remove_child_first_of_three() {
    let mut tree = DomTree::new();
    let parent = alloc_element(&mut tree, "div");
    assert!(tree.add_child(NodeId::ROOT, parent));

    let a = alloc_element(&mut tree, "a");
    let b = alloc_element(&mut tree, "b");
    let c = alloc_element(&mut tree, "c");
    assert!(tree.add_child(parent, a));
    assert!(tree.add_child(parent, b));
    assert!(tree.add_child(parent, c));

    assert!(tree.remove_child(parent, a));

    // b is now first child, c is second
    assert_eq!(tree.children(parent), &[b, c]);
    assert_eq!(tree.prev_sibling(b), None);
    assert_eq!(tree.next_sibling(b), Some(c));
    assert_eq!(tree.prev_sibling(c), Some(b));
    assert_consistent(&tree, parent);
}

#[test]
fn test_remove_child_middle_of_three() {
    let mut tree = DomTree::new();
    let parent = alloc_element(&mut tree, "div");
    assert!(tree.add_child(NodeId::ROOT, parent));

    let a = alloc_element(&mut tree, "a");
    let b = alloc_element(&mut tree, "b");
    let c = alloc_element(&mut tree, "c");
    assert!(tree.add_child(parent, a));
    assert!(tree.add_child(parent, b));
    assert!(tree.add_child(parent, c));

    assert!(tree.remove_child(parent, b));

    // a and c are siblings now
    assert_eq!(tree.children(parent), &[a, c]);
    assert_eq!(tree.next_sibling(a), Some(c));
    assert_eq!(tree.prev_sibling(c), Some(a));
    assert_consistent(&tree, parent);
}

#[test]
fn test_remove_child_of_wrong_parent() {
    let mut tree = DomTree::new();
    let parent = alloc_element(&mut tree, "div");
    let other = alloc_element(&mut tree, "div");
    let child = alloc_element(&mut tree, "p");
    assert!(tree.add_child(parent, child));

    assert!(!tree.remove_child(other, child));
    assert_eq!(tree.parent(child), Some(parent));
}

// ========== insert_before ==========

#[test]
fn test_insert_before_first() {
    let mut tree = DomTree::new();
    let parent = alloc_element(&mut tree, "ul");
    let a = alloc_element(&mut tree, "li");
    let b = alloc_element(&mut tree, "li");
    assert!(tree.add_child(parent, a));

    assert!(tree.insert_before(parent, b, a));

    assert_eq!(tree.children(parent), &[b, a]);
    assert_consistent(&tree, parent);
}

#[test]
fn test_insert_before_moves_within_parent() {
    let mut tree = DomTree::new();
    let parent = alloc_element(&mut tree, "ul");
    let a = alloc_element(&mut tree, "li");
    let b = alloc_element(&mut tree, "li");
    let c = alloc_element(&mut tree, "li");
    assert!(tree.add_child(parent, a));
    assert!(tree.add_child(parent, b));
    assert!(tree.add_child(parent, c));

    assert!(tree.insert_before(parent, c, a));

    assert_eq!(tree.children(parent), &[c, a, b]);
    assert_consistent(&tree, parent);
}

#[test]
fn test_insert_before_requires_reference_child() {
    let mut tree = DomTree::new();
    let parent = alloc_element(&mut tree, "ul");
    let stranger = alloc_element(&mut tree, "li");
    let new = alloc_element(&mut tree, "li");

    assert!(!tree.insert_before(parent, new, stranger));
    assert!(tree.children(parent).is_empty());
}

// ========== traversal ==========

#[test]
fn test_descendants_in_document_order() {
    let mut tree = DomTree::new();
    let html = alloc_element(&mut tree, "html");
    let head = alloc_element(&mut tree, "head");
    let title = alloc_element(&mut tree, "title");
    let body = alloc_element(&mut tree, "body");
    assert!(tree.add_child(NodeId::ROOT, html));
    assert!(tree.add_child(html, head));
    assert!(tree.add_child(head, title));
    assert!(tree.add_child(html, body));

    let order: Vec<NodeId> = tree.descendants(NodeId::ROOT).collect();
    assert_eq!(order, vec![html, head, title, body]);

    let ancestors: Vec<NodeId> = tree.ancestors(title).collect();
    assert_eq!(ancestors, vec![head, html, NodeId::ROOT]);

    assert_eq!(tree.preceding_siblings(body).collect::<Vec<_>>(), vec![head]);
    assert!(tree.is_descendant_of(title, html));
    assert!(!tree.is_descendant_of(html, title));
}
