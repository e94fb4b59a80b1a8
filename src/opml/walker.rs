// src/opml/walker.rs
// =============================================================================
// This module walks the <outline> tree and removes dead feed entries.
//
// How it works, for each direct child of a node:
// 1. If the child has children of its own (a folder), walk it first
// 2. If the child has an xmlUrl (or, failing that, an htmlUrl), ask
//    `is_reachable(url)` and mark the child for removal if it says no
// 3. After all children were visited, remove the marked ones
//
// Removal happens in a second pass so we never change a Vec while
// iterating over it. Folders without a URL are never removed, even if
// every feed inside them was dead.
//
// The walker itself never touches the network: the caller passes in the
// verdicts. That keeps this module synchronous and easy to test.
// =============================================================================

use super::document::{Element, Node};
use crate::progress::progress;
use serde::Serialize;
use std::collections::HashSet;

// Shown when an outline has no `text` attribute
const UNKNOWN_TEXT: &str = "Unknown";

// A feed entry that was removed from the tree
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Removal {
    pub text: String,
    pub url: String,
}

// The URL we check for an outline: xmlUrl first, then htmlUrl
//
// Empty attributes count as missing.
pub fn outline_url(outline: &Element) -> Option<&str> {
    outline
        .attr("xmlUrl")
        .filter(|url| !url.is_empty())
        .or_else(|| outline.attr("htmlUrl").filter(|url| !url.is_empty()))
}

fn outline_text(outline: &Element) -> &str {
    outline.attr("text").unwrap_or(UNKNOWN_TEXT)
}

// Collects every URL the walker will check under `node`
//
// Returns them in walk order with duplicates removed, so the caller can
// check each URL exactly once before pruning.
pub fn collect_urls(node: &Element) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut urls = Vec::new();
    collect_into(node, &mut seen, &mut urls);
    urls
}

fn collect_into(node: &Element, seen: &mut HashSet<String>, urls: &mut Vec<String>) {
    for child in node.child_elements() {
        if child.has_child_elements() {
            collect_into(child, seen, urls);
        }
        if let Some(url) = outline_url(child) {
            if seen.insert(url.to_string()) {
                urls.push(url.to_string());
            }
        }
    }
}

// Prunes unreachable feed entries below `node`, depth-first
//
// Parameters:
//   node: the container to prune (normally <body>), mutated in place
//   is_reachable: verdict for a URL (true = keep)
//
// Returns: every removed entry, innermost folders first
pub fn prune_children<F>(node: &mut Element, is_reachable: &mut F) -> Vec<Removal>
where
    F: FnMut(&str) -> bool,
{
    let mut removed = Vec::new();
    // Indexes into node.children of elements to drop
    let mut marked = Vec::new();

    for (index, child) in node.children.iter_mut().enumerate() {
        let Node::Element(child) = child else {
            continue;
        };

        if child.has_child_elements() {
            removed.extend(prune_children(child, is_reachable));
        }

        // A folder that also carries a URL is checked like a feed
        let Some(url) = outline_url(child) else {
            continue;
        };

        progress!("[*] Checking: {} ({})", outline_text(child), url);
        if !is_reachable(url) {
            marked.push(index);
        }
    }

    if marked.is_empty() {
        return removed;
    }

    // Second pass: drop the marked elements (and the indentation in front)
    let mut drop = vec![false; node.children.len()];
    for &index in &marked {
        drop[index] = true;
        if index > 0 && is_whitespace(&node.children[index - 1]) {
            drop[index - 1] = true;
        }
    }

    let children = std::mem::take(&mut node.children);
    for (child, dropped) in children.into_iter().zip(drop) {
        if !dropped {
            node.children.push(child);
            continue;
        }
        if let Node::Element(outline) = child {
            progress!("[x] Removing: {}", outline_text(&outline));
            removed.push(Removal {
                text: outline_text(&outline).to_string(),
                url: outline_url(&outline).unwrap_or_default().to_string(),
            });
        }
    }

    removed
}

fn is_whitespace(node: &Node) -> bool {
    matches!(node, Node::Text(text) if text.trim().is_empty())
}

// -----------------------------------------------------------------------------
// NOTES:
//
// 1. Why `&mut F` and not `F`?
//    - The function calls itself for nested folders
//    - Passing the closure by mutable reference lets every level share it
//      instead of needing F: Copy
//
// 2. Why `let ... else`?
//    - `let Node::Element(child) = child else { continue; }` binds the
//      element or skips text/comment nodes in one line
//
// 3. Why std::mem::take?
//    - It moves the Vec out and leaves an empty one behind
//    - We can then rebuild node.children from the kept nodes without cloning
// -----------------------------------------------------------------------------
