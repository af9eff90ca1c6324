//! Host application interface
//!
//! The exporter never owns the scene. Everything it knows about the rig comes
//! through [`PoseProvider`], which wraps the host's shared "current frame"
//! state behind a single `evaluate` call.

use glam::Mat4;

use crate::error::ExportError;

/// Kind of animated channel authored on a bone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelKind {
    Rotation,
    Translation,
}

/// Frame range and sample rate of the scene
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneBounds {
    pub start_frame: i32,
    /// Inclusive
    pub end_frame: i32,
    pub samples_per_second: f32,
}

impl SceneBounds {
    pub fn new(start_frame: i32, end_frame: i32, samples_per_second: f32) -> Self {
        Self {
            start_frame,
            end_frame,
            samples_per_second,
        }
    }

    /// Number of sampled frames (both ends included)
    pub fn frame_count(&self) -> usize {
        (self.end_frame - self.start_frame + 1).max(0) as usize
    }

    /// Length in seconds
    pub fn duration(&self) -> f32 {
        self.seconds_from_start(self.end_frame)
    }

    pub fn clamp_frame(&self, frame: i32) -> i32 {
        frame.clamp(self.start_frame, self.end_frame)
    }

    pub fn seconds_from_start(&self, frame: i32) -> f32 {
        (frame - self.start_frame) as f32 / self.samples_per_second
    }
}

/// What the host reports the export target to be
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectKind {
    Armature,
    /// Any other object type, by the host's name for it
    Other(String),
}

/// The host's active object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportTarget {
    pub name: String,
    pub kind: ObjectKind,
    /// Whether an action (animation) is assigned
    pub has_action: bool,
}

/// Rest-pose data of one bone
#[derive(Debug, Clone, PartialEq)]
pub struct BoneRest {
    pub name: String,
    pub parent: Option<String>,
    /// Relative to the parent bone
    pub rest_local: Mat4,
    /// Armature space
    pub rest_world: Mat4,
}

/// Host collaborator that owns the rig and its pose evaluation
///
/// `evaluate` mutates host state; frames are requested in strictly increasing
/// order and never concurrently.
pub trait PoseProvider {
    /// Object selected for export, if any
    fn active_object(&self) -> Option<ExportTarget>;

    fn scene_bounds(&self) -> SceneBounds;

    /// Bones with their rest poses, in the host's order
    fn bone_hierarchy(&self) -> Vec<BoneRest>;

    /// `(bone name, channel kind)` pairs with authored animation
    fn animated_channels(&self) -> Vec<(String, ChannelKind)>;

    /// Advance the host to `frame` and return every bone's armature-space pose
    /// transform, in [`PoseProvider::bone_hierarchy`] order
    fn evaluate(&mut self, frame: i32) -> Result<Vec<Mat4>, ExportError>;
}
