//! Avatar animation binary format
//!
//! Little-endian POD layout with no magic bytes; the header version fields
//! identify the format.

pub mod anim;

pub use anim::*;

/// File extension for animation assets
pub const ANIM_EXT: &str = "anim";
