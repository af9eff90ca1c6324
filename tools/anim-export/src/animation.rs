//! Animation export (host pose data -> .anim)
//!
//! Validates the export target, drives the sampler and reducer, and assembles
//! the [`AnimationDocument`] handed to the binary writer.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use anim_common::formats::{encode_document, AnimationDocument, Constraint};

use crate::error::ExportError;
use crate::formats::{dump_path, write_anim_bytes, write_anim_dump};
use crate::host::{ObjectKind, PoseProvider, SceneBounds};
use crate::reduce::reduce_joints;
use crate::sampler::{forward_axis_correction, PoseSampler};
use crate::skeleton::{ChannelMembership, Skeleton, SkeletonFilter};

/// Default joint priority
pub const DEFAULT_PRIORITY: u32 = 4;

/// Default ease-in / ease-out duration in seconds
pub const DEFAULT_EASE: f32 = 0.8;

/// User-facing export options
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ExportSettings {
    /// Base priority, also given to every joint (conventionally 0-6)
    pub priority: u32,
    #[serde(rename = "loop")]
    pub looping: bool,
    /// Frame where the loop starts; defaults to the first frame
    pub loop_in_frame: Option<i32>,
    /// Frame where the loop ends; defaults to the last frame
    pub loop_out_frame: Option<i32>,
    /// Seconds
    pub ease_in: f32,
    /// Seconds
    pub ease_out: f32,
    /// Export animated translation on bones other than the root-motion bone
    pub export_translations: bool,
    /// Also write the document as JSON next to the output
    pub dump_json: bool,
    pub emote_name: String,
    /// Names accepted in addition to the built-in skeleton
    pub extra_bones: Vec<String>,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            priority: DEFAULT_PRIORITY,
            looping: false,
            loop_in_frame: None,
            loop_out_frame: None,
            ease_in: DEFAULT_EASE,
            ease_out: DEFAULT_EASE,
            export_translations: false,
            dump_json: false,
            emote_name: String::new(),
            extra_bones: Vec::new(),
        }
    }
}

/// Check everything that can fail before the first frame is sampled
pub fn validate_target<P: PoseProvider + ?Sized>(provider: &P) -> Result<SceneBounds, ExportError> {
    let target = provider.active_object().ok_or(ExportError::NoActiveObject)?;

    if let ObjectKind::Other(kind) = &target.kind {
        return Err(ExportError::NotAnArmature {
            name: target.name,
            kind: kind.clone(),
        });
    }
    if !target.has_action {
        return Err(ExportError::NoAction(target.name));
    }

    let bounds = provider.scene_bounds();
    if !bounds.samples_per_second.is_finite() || bounds.samples_per_second <= 0.0 {
        return Err(ExportError::InvalidFrameRate(bounds.samples_per_second));
    }
    if bounds.end_frame < bounds.start_frame {
        return Err(ExportError::InvalidFrameRange {
            start: bounds.start_frame,
            end: bounds.end_frame,
        });
    }

    Ok(bounds)
}

/// Sample, reduce and assemble the animation of the provider's active object
pub fn build_document<P: PoseProvider + ?Sized>(
    provider: &mut P,
    settings: &ExportSettings,
    constraints: &[Constraint],
) -> Result<AnimationDocument, ExportError> {
    let bounds = validate_target(&*provider)?;

    let rest = provider.bone_hierarchy();
    if rest.is_empty() {
        return Err(ExportError::NoBones);
    }

    let animated = provider.animated_channels();
    if animated.is_empty() {
        return Err(ExportError::EmptyAnimation);
    }

    let filter = SkeletonFilter::with_extra_bones(settings.extra_bones.iter().cloned());
    let membership = ChannelMembership::decide(&filter, &animated, settings.export_translations);
    if membership.is_empty() {
        tracing::warn!("No animated bone belongs to the avatar skeleton; exporting no joints");
    }

    let skeleton = Skeleton::from_rest(&rest, forward_axis_correction())?;

    tracing::info!(
        "Sampling frames {}..={} at {} fps ({} bones)",
        bounds.start_frame,
        bounds.end_frame,
        bounds.samples_per_second,
        skeleton.len()
    );

    let mut joints =
        PoseSampler::new(&skeleton, &membership, settings.priority).sample(provider, bounds)?;
    reduce_joints(&mut joints);

    let mut doc = AnimationDocument::new(settings.priority, bounds.duration());
    doc.emote_name = settings.emote_name.clone();
    doc.looping = settings.looping;
    let loop_in = settings.loop_in_frame.unwrap_or(bounds.start_frame);
    let loop_out = settings.loop_out_frame.unwrap_or(bounds.end_frame);
    doc.loop_in_point = bounds.seconds_from_start(bounds.clamp_frame(loop_in));
    doc.loop_out_point = bounds.seconds_from_start(bounds.clamp_frame(loop_out));
    doc.ease_in_duration = settings.ease_in;
    doc.ease_out_duration = settings.ease_out;
    doc.constraints = constraints.to_vec();
    doc.joints = joints;

    Ok(doc)
}

/// Export the provider's animation to `output`
///
/// The byte stream is produced in memory first, so a failed export never
/// leaves a partial file behind.
pub fn export_animation<P: PoseProvider + ?Sized>(
    provider: &mut P,
    settings: &ExportSettings,
    constraints: &[Constraint],
    output: &Path,
) -> Result<AnimationDocument> {
    let doc = build_document(provider, settings, constraints)?;
    let bytes = encode_document(&doc).context("Failed to encode animation")?;

    write_anim_bytes(output, &bytes)?;

    if settings.dump_json {
        let dump = dump_path(output);
        write_anim_dump(&dump, &doc)?;
        tracing::info!("Wrote debug dump {:?}", dump);
    }

    tracing::info!(
        "Exported animation: {} joints, {} keys, {:.2}s, {} bytes",
        doc.joints.len(),
        doc.key_count(),
        doc.duration,
        bytes.len()
    );

    Ok(doc)
}
