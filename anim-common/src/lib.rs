//! Shared types for avatar animation assets
//!
//! This crate is shared between the exporter library, its CLI and any tool
//! that needs to read `.anim` files back.
//!
//! # Modules
//!
//! - [`formats`] - `.anim` document model, quantization, binary reader/writer

pub mod formats;

// Re-export commonly used format items
pub use formats::{
    encode_document, AnimHeader, AnimParams, AnimReader, AnimWriter, AnimationDocument, Constraint,
    ConstraintRecord, DecodedAnim, DecodedJoint, JointChannel, PositionKey, QuantizedKey,
    RotationKey, ANIM_EXT, ANIM_SUB_VERSION, ANIM_VERSION,
};
