//! anim-export library
//!
//! Samples skeletal animation from a host (any [`host::PoseProvider`], or a
//! glTF file through [`gltf_host::GltfScene`]) and writes `.anim` assets.

pub mod animation;
pub mod error;
pub mod formats;
pub mod gltf_host;
pub mod host;
pub mod manifest;
pub mod reduce;
pub mod sampler;
pub mod skeleton;

// Re-export the file format from anim-common
pub use anim_common::{AnimationDocument, Constraint, DecodedAnim, JointChannel, ANIM_EXT};

pub use animation::{build_document, export_animation, validate_target, ExportSettings};
pub use error::ExportError;
pub use gltf_host::{GltfOptions, GltfScene, Selector};
pub use host::{BoneRest, ChannelKind, ExportTarget, ObjectKind, PoseProvider, SceneBounds};
pub use skeleton::{is_recognized_bone, ChannelMembership, Skeleton, SkeletonFilter};
