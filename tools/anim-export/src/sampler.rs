//! Per-frame pose sampling
//!
//! Walks the skeleton once per frame and turns each bone's evaluated pose into
//! a parent-relative delta anchored at its rest head. Every function except
//! [`PoseSampler::sample`] is pure; the Euler continuity hint is threaded
//! through explicitly.

use std::f32::consts::{FRAC_PI_2, PI, TAU};

use anim_common::formats::{frame_time_u16, JointChannel, PositionKey, RotationKey};
use glam::{EulerRot, Mat4, Quat, Vec3};

use crate::error::ExportError;
use crate::host::{PoseProvider, SceneBounds};
use crate::skeleton::{is_root_motion_bone, BoneRecord, ChannelMembership, Skeleton};

/// Translation channels are written at half the scene's unit scale
const TRANSLATION_SCALE: f32 = 0.5;

/// Wrap threshold used when matching an angle to the previous frame
const EULER_WRAP_THRESHOLD: f32 = 5.1;

/// Rotation from the authoring tool's forward axis to the engine's (+90° about Z)
pub fn forward_axis_correction() -> Mat4 {
    Mat4::from_rotation_z(FRAC_PI_2)
}

/// Armature-space pose of one bone at one frame
#[derive(Debug, Clone, Copy)]
pub struct PoseSample {
    pub pose: Mat4,
    pub pose_inverse: Mat4,
}

impl PoseSample {
    pub fn new(pose: Mat4) -> Self {
        Self {
            pose,
            pose_inverse: pose.inverse(),
        }
    }
}

/// Euler angles (radians, X-Y-Z application order) of the previous frame
///
/// Only used to pick the branch of the next decomposition closest to this
/// one; never written to the output.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EulerHint(pub [f32; 3]);

/// Decomposed delta of one bone at one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoneDelta {
    /// Delta translation plus the bone's rest offset, not yet scaled
    pub translation: Vec3,
    /// Not sign-canonicalized
    pub rotation: Quat,
}

/// Delta transform of `bone` relative to its parent's current pose and its
/// own rest pose, conjugated so it pivots about the rest head
pub fn delta_transform(
    bone: &BoneRecord,
    parent: Option<(&BoneRecord, &PoseSample)>,
    sample: &PoseSample,
) -> Mat4 {
    let delta = match parent {
        Some((parent, parent_sample)) => {
            parent.rest_world * parent_sample.pose_inverse * sample.pose * bone.rest_world_inverse
        }
        None => sample.pose * bone.rest_world_inverse,
    };
    Mat4::from_translation(-bone.head) * delta * Mat4::from_translation(bone.head)
}

/// Decompose one bone's delta and advance its Euler hint
pub fn sample_bone(
    hint: EulerHint,
    bone: &BoneRecord,
    parent: Option<(&BoneRecord, &PoseSample)>,
    sample: &PoseSample,
) -> (EulerHint, BoneDelta) {
    let delta = delta_transform(bone, parent, sample);
    let (_, rotation, translation) = delta.to_scale_rotation_translation();

    let rest_offset = match parent {
        Some((parent, _)) => bone.head - parent.head,
        None => bone.head,
    };

    let next_hint = compatible_euler(rotation, hint);
    (
        next_hint,
        BoneDelta {
            translation: translation + rest_offset,
            rotation,
        },
    )
}

/// Value written to a bone's position channel
///
/// Halved, and for the root-motion bone re-centered on its authored rest head.
pub fn position_value(bone: &BoneRecord, delta: &BoneDelta) -> Vec3 {
    let scaled = delta.translation * TRANSLATION_SCALE;
    if is_root_motion_bone(&bone.name) {
        scaled - bone.authored_head * TRANSLATION_SCALE
    } else {
        scaled
    }
}

/// Euler decomposition of `rotation` closest to `prev`
pub fn compatible_euler(rotation: Quat, prev: EulerHint) -> EulerHint {
    // R = Rz * Ry * Rx; glam returns the angles outermost first
    let (z, y, x) = rotation.to_euler(EulerRot::ZYX);
    let primary = wrap_towards([x, y, z], prev.0);
    let flipped = wrap_towards([x + PI, PI - y, z + PI], prev.0);

    let distance = |e: &[f32; 3]| -> f32 {
        e.iter()
            .zip(prev.0.iter())
            .map(|(a, b)| (a - b).abs())
            .sum()
    };
    if distance(&flipped) < distance(&primary) {
        EulerHint(flipped)
    } else {
        EulerHint(primary)
    }
}

fn wrap_towards(mut euler: [f32; 3], prev: [f32; 3]) -> [f32; 3] {
    for (angle, &reference) in euler.iter_mut().zip(prev.iter()) {
        let diff = *angle - reference;
        if diff.abs() > EULER_WRAP_THRESHOLD {
            *angle -= TAU * (diff / TAU).round();
        }
    }
    euler
}

// ============================================================================
// Frame loop
// ============================================================================

/// Samples every frame of a scene into joint channels
pub struct PoseSampler<'a> {
    skeleton: &'a Skeleton,
    membership: &'a ChannelMembership,
    priority: u32,
}

impl<'a> PoseSampler<'a> {
    pub fn new(skeleton: &'a Skeleton, membership: &'a ChannelMembership, priority: u32) -> Self {
        Self {
            skeleton,
            membership,
            priority,
        }
    }

    /// Evaluate `start_frame..=end_frame` in order and collect one key per
    /// active channel per frame
    ///
    /// Joints appear in skeleton order, created when first sampled.
    pub fn sample<P: PoseProvider + ?Sized>(
        &self,
        provider: &mut P,
        bounds: SceneBounds,
    ) -> Result<Vec<JointChannel>, ExportError> {
        let bones = self.skeleton.bones();
        let correction = self.skeleton.correction();

        let mut hints = vec![EulerHint::default(); bones.len()];
        let mut joint_slots: Vec<Option<usize>> = vec![None; bones.len()];
        let mut joints: Vec<JointChannel> = Vec::new();
        let mut samples: Vec<PoseSample> = Vec::with_capacity(bones.len());

        let total = bounds.frame_count();
        for (n, frame) in (bounds.start_frame..=bounds.end_frame).enumerate() {
            let poses = provider.evaluate(frame)?;
            if poses.len() != bones.len() {
                return Err(ExportError::PoseMismatch {
                    frame,
                    got: poses.len(),
                    expected: bones.len(),
                });
            }

            samples.clear();
            samples.extend(
                bones
                    .iter()
                    .map(|bone| PoseSample::new(correction * poses[bone.source_index])),
            );

            let time = frame_time_u16(frame, bounds.start_frame, bounds.end_frame);

            for (i, bone) in bones.iter().enumerate() {
                let wants_rotation = self.membership.has_rotation(&bone.name);
                let wants_translation = self.membership.has_translation(&bone.name);
                if !wants_rotation && !wants_translation {
                    continue;
                }

                let parent = bone.parent.map(|p| (&bones[p], &samples[p]));
                let (hint, delta) = sample_bone(hints[i], bone, parent, &samples[i]);
                hints[i] = hint;

                let slot = *joint_slots[i].get_or_insert_with(|| {
                    joints.push(JointChannel::new(bone.name.clone(), self.priority));
                    joints.len() - 1
                });
                let joint = &mut joints[slot];

                if wants_translation {
                    let p = position_value(bone, &delta);
                    joint.position_keys.push(PositionKey::new(time, p.to_array()));
                }
                if wants_rotation {
                    joint
                        .rotation_keys
                        .push(RotationKey::from_xyzw(time, delta.rotation.to_array()));
                }
            }

            tracing::debug!("Sampled frame {} ({}/{})", frame, n + 1, total);
        }

        Ok(joints)
    }
}
