//! Animation document model

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

/// Format version written in the header
pub const ANIM_VERSION: u16 = 1;

/// Format sub-version written in the header
pub const ANIM_SUB_VERSION: u16 = 0;

/// Size of one encoded key (time + three quantized components)
pub const KEY_SIZE: usize = 8;

/// Fixed width of the volume name fields in a constraint record
pub const VOLUME_NAME_SIZE: usize = 16;

/// Rotation keyframe (unit quaternion, not yet sign-canonicalized)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RotationKey {
    /// Fraction of the total duration mapped onto 0..=65535
    pub time: u16,
    pub w: f32,
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl RotationKey {
    /// Build a key from an `[x, y, z, w]` quaternion
    pub fn from_xyzw(time: u16, q: [f32; 4]) -> Self {
        Self {
            time,
            x: q[0],
            y: q[1],
            z: q[2],
            w: q[3],
        }
    }

    /// Quaternion as `[x, y, z, w]`
    pub fn xyzw(&self) -> [f32; 4] {
        [self.x, self.y, self.z, self.w]
    }
}

/// Position keyframe, in half-scaled scene units
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionKey {
    /// Fraction of the total duration mapped onto 0..=65535
    pub time: u16,
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl PositionKey {
    pub fn new(time: u16, position: [f32; 3]) -> Self {
        Self {
            time,
            x: position[0],
            y: position[1],
            z: position[2],
        }
    }

    pub fn xyz(&self) -> [f32; 3] {
        [self.x, self.y, self.z]
    }
}

/// Encoded key as stored in the file (8 bytes)
///
/// Note: Not packed - we use explicit byte serialization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[repr(C)]
pub struct QuantizedKey {
    pub time: u16,
    pub x: u16,
    pub y: u16,
    pub z: u16,
}

impl QuantizedKey {
    /// Parse from raw bytes (8 bytes)
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < KEY_SIZE {
            return None;
        }
        Some(Self {
            time: u16::from_le_bytes([bytes[0], bytes[1]]),
            x: u16::from_le_bytes([bytes[2], bytes[3]]),
            y: u16::from_le_bytes([bytes[4], bytes[5]]),
            z: u16::from_le_bytes([bytes[6], bytes[7]]),
        })
    }

    /// Write to raw bytes (8 bytes)
    pub fn to_bytes(&self) -> [u8; KEY_SIZE] {
        let mut bytes = [0u8; KEY_SIZE];
        bytes[0..2].copy_from_slice(&self.time.to_le_bytes());
        bytes[2..4].copy_from_slice(&self.x.to_le_bytes());
        bytes[4..6].copy_from_slice(&self.y.to_le_bytes());
        bytes[6..8].copy_from_slice(&self.z.to_le_bytes());
        bytes
    }
}

/// Keyframe channels of one joint
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JointChannel {
    /// Bone name, used as the key of the joint map in the JSON dump
    #[serde(skip)]
    pub name: String,
    pub priority: u32,
    pub rotation_keys: Vec<RotationKey>,
    pub position_keys: Vec<PositionKey>,
}

impl JointChannel {
    pub fn new(name: impl Into<String>, priority: u32) -> Self {
        Self {
            name: name.into(),
            priority,
            rotation_keys: Vec::new(),
            position_keys: Vec::new(),
        }
    }
}

/// IK / look-at descriptor, passed through to the file unmodified
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Constraint {
    pub chain_length: u8,
    pub constraint_type: u8,
    /// Truncated to 16 bytes when written
    pub source_volume: String,
    pub source_offset: [f32; 3],
    /// Truncated to 16 bytes when written
    pub target_volume: String,
    pub target_offset: [f32; 3],
    pub target_dir: [f32; 3],
    pub ease_in_start: f32,
    pub ease_in_stop: f32,
    pub ease_out_start: f32,
    pub ease_out_stop: f32,
}

/// In-memory animation, built once per export and consumed by [`super::AnimWriter`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnimationDocument {
    pub version: u16,
    pub sub_version: u16,
    pub base_priority: u32,
    /// Seconds
    pub duration: f32,
    pub emote_name: String,
    #[serde(rename = "loop")]
    pub looping: bool,
    /// Seconds from the first frame
    pub loop_in_point: f32,
    /// Seconds from the first frame
    pub loop_out_point: f32,
    pub ease_in_duration: f32,
    pub ease_out_duration: f32,
    pub hand_pose: u32,
    pub constraints: Vec<Constraint>,
    /// Joints in insertion order
    #[serde(serialize_with = "serialize_joint_map")]
    pub joints: Vec<JointChannel>,
}

impl AnimationDocument {
    /// Empty document with the current format version and no loop
    pub fn new(base_priority: u32, duration: f32) -> Self {
        Self {
            version: ANIM_VERSION,
            sub_version: ANIM_SUB_VERSION,
            base_priority,
            duration,
            emote_name: String::new(),
            looping: false,
            loop_in_point: 0.0,
            loop_out_point: duration,
            ease_in_duration: 0.0,
            ease_out_duration: 0.0,
            hand_pose: 0,
            constraints: Vec::new(),
            joints: Vec::new(),
        }
    }

    /// Look up a joint by bone name
    pub fn joint(&self, name: &str) -> Option<&JointChannel> {
        self.joints.iter().find(|j| j.name == name)
    }

    /// Total number of rotation and position keys across all joints
    pub fn key_count(&self) -> usize {
        self.joints
            .iter()
            .map(|j| j.rotation_keys.len() + j.position_keys.len())
            .sum()
    }
}

/// Joints are dumped as an object keyed by bone name, preserving order
#[allow(clippy::ptr_arg)]
fn serialize_joint_map<S: Serializer>(
    joints: &Vec<JointChannel>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(joints.len()))?;
    for joint in joints {
        map.serialize_entry(&joint.name, joint)?;
    }
    map.end()
}
