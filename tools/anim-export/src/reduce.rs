//! Keyframe reduction
//!
//! Drops interior keys whose every component matches both neighbours within
//! [`KEY_TOLERANCE`]. Eligibility is decided against the input sequence in a
//! single pass; first and last keys are always kept.

use anim_common::formats::{JointChannel, PositionKey, RotationKey};

/// Absolute per-component tolerance
pub const KEY_TOLERANCE: f32 = 1e-4;

/// A keyframe whose value can be compared component-wise
pub trait ReducibleKey {
    /// Fixed-size component array
    type Components: AsRef<[f32]>;

    /// Components checked against the neighbours (w included for rotations)
    fn components(&self) -> Self::Components;
}

impl ReducibleKey for RotationKey {
    type Components = [f32; 4];

    fn components(&self) -> [f32; 4] {
        self.xyzw()
    }
}

impl ReducibleKey for PositionKey {
    type Components = [f32; 3];

    fn components(&self) -> [f32; 3] {
        self.xyz()
    }
}

fn near<K: ReducibleKey>(a: &K, b: &K) -> bool {
    let (a, b) = (a.components(), b.components());
    a.as_ref()
        .iter()
        .zip(b.as_ref())
        .all(|(x, y)| (x - y).abs() <= KEY_TOLERANCE)
}

/// Remove redundant interior keys from one channel
///
/// Returns the number of keys removed.
pub fn reduce_keys<K: ReducibleKey>(keys: &mut Vec<K>) -> usize {
    let len = keys.len();
    if len < 3 {
        return 0;
    }

    let keep: Vec<bool> = (0..len)
        .map(|i| {
            i == 0
                || i == len - 1
                || !(near(&keys[i], &keys[i - 1]) && near(&keys[i], &keys[i + 1]))
        })
        .collect();

    let mut flags = keep.iter();
    keys.retain(|_| flags.next().copied().unwrap_or(true));
    len - keys.len()
}

/// Reduce both channels of one joint
pub fn reduce_joint(joint: &mut JointChannel) -> usize {
    reduce_keys(&mut joint.rotation_keys) + reduce_keys(&mut joint.position_keys)
}

/// Reduce every joint; joints are independent so this runs in parallel
pub fn reduce_joints(joints: &mut [JointChannel]) -> usize {
    use rayon::prelude::*;

    let removed: usize = joints.par_iter_mut().map(reduce_joint).sum();
    tracing::debug!("Keyframe reduction removed {} keys", removed);
    removed
}
