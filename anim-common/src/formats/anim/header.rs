//! Fixed-size records: header, params block and constraint

use super::encoding::{fixed_name, read_fixed_name};
use super::types::{AnimationDocument, Constraint, VOLUME_NAME_SIZE};

/// Animation header (12 bytes)
///
/// Note: Not packed - we use explicit byte serialization.
#[derive(Debug, Clone, Copy, PartialEq)]
#[repr(C)]
pub struct AnimHeader {
    pub version: u16,
    pub sub_version: u16,
    pub base_priority: u32,
    /// Seconds
    pub duration: f32,
}

impl AnimHeader {
    pub const SIZE: usize = 12;

    pub fn new(version: u16, sub_version: u16, base_priority: u32, duration: f32) -> Self {
        Self {
            version,
            sub_version,
            base_priority,
            duration,
        }
    }

    pub fn from_document(doc: &AnimationDocument) -> Self {
        Self::new(doc.version, doc.sub_version, doc.base_priority, doc.duration)
    }

    /// Write header to bytes
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        bytes[0..2].copy_from_slice(&self.version.to_le_bytes());
        bytes[2..4].copy_from_slice(&self.sub_version.to_le_bytes());
        bytes[4..8].copy_from_slice(&self.base_priority.to_le_bytes());
        bytes[8..12].copy_from_slice(&self.duration.to_le_bytes());
        bytes
    }

    /// Read header from bytes
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < Self::SIZE {
            return None;
        }
        Some(Self {
            version: u16::from_le_bytes([bytes[0], bytes[1]]),
            sub_version: u16::from_le_bytes([bytes[2], bytes[3]]),
            base_priority: u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]),
            duration: f32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]),
        })
    }
}

/// Playback parameters following the emote name (28 bytes)
#[derive(Debug, Clone, Copy, PartialEq)]
#[repr(C)]
pub struct AnimParams {
    pub loop_in_point: f32,
    pub loop_out_point: f32,
    /// 0 or 1
    pub looping: u32,
    pub ease_in_duration: f32,
    pub ease_out_duration: f32,
    pub hand_pose: u32,
    pub joint_count: u32,
}

impl AnimParams {
    pub const SIZE: usize = 28;

    pub fn from_document(doc: &AnimationDocument) -> Self {
        Self {
            loop_in_point: doc.loop_in_point,
            loop_out_point: doc.loop_out_point,
            looping: u32::from(doc.looping),
            ease_in_duration: doc.ease_in_duration,
            ease_out_duration: doc.ease_out_duration,
            hand_pose: doc.hand_pose,
            joint_count: doc.joints.len() as u32,
        }
    }

    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        bytes[0..4].copy_from_slice(&self.loop_in_point.to_le_bytes());
        bytes[4..8].copy_from_slice(&self.loop_out_point.to_le_bytes());
        bytes[8..12].copy_from_slice(&self.looping.to_le_bytes());
        bytes[12..16].copy_from_slice(&self.ease_in_duration.to_le_bytes());
        bytes[16..20].copy_from_slice(&self.ease_out_duration.to_le_bytes());
        bytes[20..24].copy_from_slice(&self.hand_pose.to_le_bytes());
        bytes[24..28].copy_from_slice(&self.joint_count.to_le_bytes());
        bytes
    }

    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < Self::SIZE {
            return None;
        }
        let u32_at = |i: usize| u32::from_le_bytes([bytes[i], bytes[i + 1], bytes[i + 2], bytes[i + 3]]);
        let f32_at = |i: usize| f32::from_bits(u32_at(i));
        Some(Self {
            loop_in_point: f32_at(0),
            loop_out_point: f32_at(4),
            looping: u32_at(8),
            ease_in_duration: f32_at(12),
            ease_out_duration: f32_at(16),
            hand_pose: u32_at(20),
            joint_count: u32_at(24),
        })
    }
}

/// Constraint as stored in the file (86 bytes)
#[derive(Debug, Clone, Copy, PartialEq)]
#[repr(C)]
pub struct ConstraintRecord {
    pub chain_length: u8,
    pub constraint_type: u8,
    pub source_volume: [u8; VOLUME_NAME_SIZE],
    pub source_offset: [f32; 3],
    pub target_volume: [u8; VOLUME_NAME_SIZE],
    pub target_offset: [f32; 3],
    pub target_dir: [f32; 3],
    /// ease_in_start, ease_in_stop, ease_out_start, ease_out_stop
    pub easing: [f32; 4],
}

impl ConstraintRecord {
    pub const SIZE: usize = 86;

    /// Volume names longer than 16 bytes are truncated
    pub fn from_constraint(c: &Constraint) -> Self {
        Self {
            chain_length: c.chain_length,
            constraint_type: c.constraint_type,
            source_volume: fixed_name(&c.source_volume),
            source_offset: c.source_offset,
            target_volume: fixed_name(&c.target_volume),
            target_offset: c.target_offset,
            target_dir: c.target_dir,
            easing: [
                c.ease_in_start,
                c.ease_in_stop,
                c.ease_out_start,
                c.ease_out_stop,
            ],
        }
    }

    pub fn to_constraint(&self) -> Constraint {
        Constraint {
            chain_length: self.chain_length,
            constraint_type: self.constraint_type,
            source_volume: read_fixed_name(&self.source_volume),
            source_offset: self.source_offset,
            target_volume: read_fixed_name(&self.target_volume),
            target_offset: self.target_offset,
            target_dir: self.target_dir,
            ease_in_start: self.easing[0],
            ease_in_stop: self.easing[1],
            ease_out_start: self.easing[2],
            ease_out_stop: self.easing[3],
        }
    }

    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        bytes[0] = self.chain_length;
        bytes[1] = self.constraint_type;
        bytes[2..18].copy_from_slice(&self.source_volume);
        write_floats(&mut bytes[18..30], &self.source_offset);
        bytes[30..46].copy_from_slice(&self.target_volume);
        write_floats(&mut bytes[46..58], &self.target_offset);
        write_floats(&mut bytes[58..70], &self.target_dir);
        write_floats(&mut bytes[70..86], &self.easing);
        bytes
    }

    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < Self::SIZE {
            return None;
        }
        let mut source_volume = [0u8; VOLUME_NAME_SIZE];
        source_volume.copy_from_slice(&bytes[2..18]);
        let mut target_volume = [0u8; VOLUME_NAME_SIZE];
        target_volume.copy_from_slice(&bytes[30..46]);
        Some(Self {
            chain_length: bytes[0],
            constraint_type: bytes[1],
            source_volume,
            source_offset: read_floats(&bytes[18..30]),
            target_volume,
            target_offset: read_floats(&bytes[46..58]),
            target_dir: read_floats(&bytes[58..70]),
            easing: read_floats(&bytes[70..86]),
        })
    }
}

fn write_floats(out: &mut [u8], values: &[f32]) {
    for (chunk, v) in out.chunks_exact_mut(4).zip(values) {
        chunk.copy_from_slice(&v.to_le_bytes());
    }
}

fn read_floats<const N: usize>(bytes: &[u8]) -> [f32; N] {
    let mut values = [0.0f32; N];
    for (v, chunk) in values.iter_mut().zip(bytes.chunks_exact(4)) {
        *v = f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
    }
    values
}
