// src/opml/mod.rs
// =============================================================================
// This module contains everything that touches the OPML document itself.
//
// Submodules:
// - document: Parses XML into a tree and serializes it back
// - walker: Finds feed URLs in the tree and prunes dead entries
//
// Nothing in here makes network requests; see the checker module for that.
// =============================================================================

mod document;
mod walker;

pub use document::{Document, Element};
pub use walker::{collect_urls, prune_children, Removal};
