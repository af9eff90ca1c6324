//! Avatar animation binary format (.anim)
//!
//! Keyframed joint animation with per-joint rotation and position channels.
//! All integers and floats are little-endian; floats are IEEE-754 single precision.
//!
//! # Layout
//! ```text
//! Header (12 bytes):
//! 0x00: version u16          - Format version (1)
//! 0x02: sub_version u16      - Format sub-version (0)
//! 0x04: base_priority u32    - Default joint priority
//! 0x08: duration f32         - Length in seconds
//!
//! emote_name                 - Null-terminated string (may be empty)
//!
//! Params (28 bytes):
//! 0x00: loop_in_point f32    - Seconds
//! 0x04: loop_out_point f32   - Seconds
//! 0x08: loop u32             - 0 or 1
//! 0x0C: ease_in f32          - Seconds
//! 0x10: ease_out f32         - Seconds
//! 0x14: hand_pose u32
//! 0x18: joint_count u32
//!
//! Joint (repeated joint_count times):
//! name                       - Null-terminated string
//! priority u32
//! rotation_count u32
//! rotation keys              - rotation_count × (time u16, x u16, y u16, z u16)
//! position_count u32
//! position keys              - position_count × (time u16, x u16, y u16, z u16)
//!
//! constraint_count u32
//! Constraint (86 bytes each):
//! chain_length u8, constraint_type u8,
//! source_volume [u8; 16], source_offset f32 × 3,
//! target_volume [u8; 16], target_offset f32 × 3,
//! target_dir f32 × 3,
//! ease_in_start f32, ease_in_stop f32, ease_out_start f32, ease_out_stop f32
//! ```
//!
//! Rotation keys store only x, y, z of a quaternion canonicalized to w >= 0;
//! readers rebuild w. See [`encoding`] for the quantization maps.

mod encoding;
mod header;
mod reader;
mod types;
mod writer;


// Re-export public API
pub use encoding::{
    canonicalize_quat, dequantize_position, dequantize_rotation, fixed_name, frame_time_u16,
    quantize_position, quantize_position_component, quantize_rotation,
    quantize_rotation_component, read_fixed_name,
};
pub use header::{AnimHeader, AnimParams, ConstraintRecord};
pub use reader::{AnimReader, DecodedAnim, DecodedJoint};
pub use types::{
    AnimationDocument, Constraint, JointChannel, PositionKey, QuantizedKey, RotationKey,
    ANIM_SUB_VERSION, ANIM_VERSION, KEY_SIZE, VOLUME_NAME_SIZE,
};
pub use writer::{encode_document, AnimWriter};
