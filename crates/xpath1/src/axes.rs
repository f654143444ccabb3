//! Pure functions for collecting nodes along each supported XPath axis.

use std::collections::HashSet;
use xmlbench_doc::XmlNode;

use crate::ast::Axis;

fn add_node<'a, 'input>(
    node: XmlNode<'a, 'input>,
    seen: &mut HashSet<XmlNode<'a, 'input>>,
    results: &mut Vec<XmlNode<'a, 'input>>,
) {
    if seen.insert(node) {
        results.push(node);
    }
}

/// Collects the nodes reachable from `node` along `axis`, deduplicated
/// against `seen`. Forward axes are produced in document order, reverse
/// axes nearest-first.
pub fn collect<'a, 'input>(
    axis: Axis,
    node: XmlNode<'a, 'input>,
    seen: &mut HashSet<XmlNode<'a, 'input>>,
    results: &mut Vec<XmlNode<'a, 'input>>,
) {
    match axis {
        Axis::SelfAxis => add_node(node, seen, results),
        Axis::Child => {
            for child in node.children() {
                add_node(child, seen, results);
            }
        }
        Axis::Attribute => {
            for attr in node.attributes() {
                add_node(attr, seen, results);
            }
        }
        Axis::Descendant => collect_descendants(node, seen, results),
        Axis::DescendantOrSelf => {
            add_node(node, seen, results);
            collect_descendants(node, seen, results);
        }
        Axis::Parent => {
            if let Some(parent) = node.parent() {
                add_node(parent, seen, results);
            }
        }
        Axis::Ancestor => {
            let mut current = node.parent();
            while let Some(p) = current {
                add_node(p, seen, results);
                current = p.parent();
            }
        }
        Axis::FollowingSibling => {
            if let Some(parent) = node.parent() {
                let mut found_self = false;
                for sibling in parent.children() {
                    if found_self {
                        add_node(sibling, seen, results);
                    }
                    if sibling == node {
                        found_self = true;
                    }
                }
            }
        }
        Axis::PrecedingSibling => {
            if let Some(parent) = node.parent() {
                let mut siblings = Vec::new();
                for sibling in parent.children() {
                    if sibling == node {
                        break;
                    }
                    siblings.push(sibling);
                }
                // Nearest sibling first.
                for sibling in siblings.into_iter().rev() {
                    add_node(sibling, seen, results);
                }
            }
        }
    }
}

// Preorder traversal keeps descendants in document order, which the
// positional predicates depend on.
fn collect_descendants<'a, 'input>(
    node: XmlNode<'a, 'input>,
    seen: &mut HashSet<XmlNode<'a, 'input>>,
    results: &mut Vec<XmlNode<'a, 'input>>,
) {
    if let Some(tree) = node.tree_node() {
        for descendant in tree.descendants().skip(1) {
            add_node(XmlNode::Tree(descendant), seen, results);
        }
    }
}
