// src/icon/mod.rs
// =============================================================================
// This module implements the `pad-icon` subcommand.
//
// Submodules:
// - pad: Shrinks an image and centers it on a transparent canvas
// =============================================================================

mod pad;

pub use pad::{add_padding, DEFAULT_SCALE};
