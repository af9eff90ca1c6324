//! glTF-backed pose provider
//!
//! Loads a skin and one animation clip from a glTF/GLB file and evaluates the
//! joint hierarchy at any frame. glTF is Y-up; poses are converted to the Z-up
//! authoring convention before they reach the sampler.

use anyhow::{bail, Context, Result};
use glam::{Mat4, Quat, Vec3};
use gltf::animation::util::ReadOutputs;
use hashbrown::{HashMap, HashSet};
use serde::Deserialize;
use std::f32::consts::FRAC_PI_2;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::error::ExportError;
use crate::host::{BoneRest, ChannelKind, ExportTarget, ObjectKind, PoseProvider, SceneBounds};

/// Default sample rate for animations (frames per second)
pub const DEFAULT_FRAME_RATE: f32 = 30.0;

/// Picks a skin or an animation by position or by name
///
/// A name made only of digits selects by index, whether it comes from the
/// command line or a manifest (`animation = 2` and `animation = "2"` agree).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "SelectorValue")]
pub enum Selector {
    Index(usize),
    Name(String),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SelectorValue {
    Index(usize),
    Name(String),
}

impl From<SelectorValue> for Selector {
    fn from(value: SelectorValue) -> Self {
        match value {
            SelectorValue::Index(i) => Selector::Index(i),
            SelectorValue::Name(name) => match name.parse::<usize>() {
                Ok(i) => Selector::Index(i),
                Err(_) => Selector::Name(name),
            },
        }
    }
}

impl Selector {
    fn matches(&self, index: usize, name: Option<&str>) -> bool {
        match self {
            Selector::Index(i) => *i == index,
            Selector::Name(n) => name == Some(n.as_str()),
        }
    }
}

impl FromStr for Selector {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match s.parse::<usize>() {
            Ok(i) => Selector::Index(i),
            Err(_) => Selector::Name(s.to_string()),
        })
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::Index(i) => write!(f, "#{}", i),
            Selector::Name(n) => write!(f, "'{}'", n),
        }
    }
}

/// What to load from a glTF file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GltfOptions {
    /// Defaults to the first animation
    pub animation: Option<Selector>,
    /// Defaults to the first skin
    pub skin: Option<Selector>,
    /// Defaults to [`DEFAULT_FRAME_RATE`]
    pub frame_rate: Option<f32>,
}

/// Local TRS of one node
#[derive(Debug, Clone, Copy)]
struct Trs {
    translation: Vec3,
    rotation: Quat,
    scale: Vec3,
}

impl Trs {
    fn from_node(node: &gltf::Node) -> Self {
        let (t, r, s) = node.transform().decomposed();
        Self {
            translation: Vec3::from_array(t),
            rotation: Quat::from_array(r),
            scale: Vec3::from_array(s),
        }
    }

    fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }
}

/// Joint placement in the hierarchy
#[derive(Debug, Clone)]
struct JointLink {
    /// Nearest ancestor that is also a joint
    parent: Option<usize>,
    /// Non-joint nodes between that ancestor (or the scene root) and this joint
    prefix: Mat4,
    rest: Trs,
}

#[derive(Debug, Clone)]
enum TrackValues {
    Translation(Vec<Vec3>),
    Rotation(Vec<Quat>),
    Scale(Vec<Vec3>),
}

impl TrackValues {
    fn len(&self) -> usize {
        match self {
            TrackValues::Translation(v) | TrackValues::Scale(v) => v.len(),
            TrackValues::Rotation(v) => v.len(),
        }
    }

    fn label(&self) -> &'static str {
        match self {
            TrackValues::Translation(_) => "translation",
            TrackValues::Rotation(_) => "rotation",
            TrackValues::Scale(_) => "scale",
        }
    }
}

/// One sampled animation channel targeting a joint
#[derive(Debug, Clone)]
struct Track {
    joint: usize,
    times: Vec<f32>,
    values: TrackValues,
    step: bool,
}

/// A skinned glTF scene exposed through [`PoseProvider`]
#[derive(Debug, Clone)]
pub struct GltfScene {
    target: ExportTarget,
    bounds: SceneBounds,
    names: Vec<String>,
    links: Vec<JointLink>,
    /// Joint indices, parents before children
    order: Vec<usize>,
    tracks: Vec<Track>,
}

impl GltfScene {
    /// Load a glTF/GLB file
    pub fn load(input: &Path, options: &GltfOptions) -> Result<Self> {
        let (document, buffers, _images) =
            gltf::import(input).with_context(|| format!("Failed to load glTF: {:?}", input))?;
        Self::from_document(&document, &buffers, options)
    }

    /// Build from an already imported document
    ///
    /// A file without skins loads as a non-armature object and one without
    /// animations as an armature with no action, so the export preconditions
    /// report them.
    pub fn from_document(
        document: &gltf::Document,
        buffers: &[gltf::buffer::Data],
        options: &GltfOptions,
    ) -> Result<Self> {
        let frame_rate = options.frame_rate.unwrap_or(DEFAULT_FRAME_RATE);

        let skin = match &options.skin {
            Some(selector) => Some(
                document
                    .skins()
                    .find(|s| selector.matches(s.index(), s.name()))
                    .with_context(|| format!("Skin {} not found in glTF", selector))?,
            ),
            None => document.skins().next(),
        };

        let Some(skin) = skin else {
            return Ok(Self {
                target: ExportTarget {
                    name: "scene".to_string(),
                    kind: ObjectKind::Other("scene without a skin".to_string()),
                    has_action: document.animations().next().is_some(),
                },
                bounds: SceneBounds::new(0, 0, frame_rate),
                names: Vec::new(),
                links: Vec::new(),
                order: Vec::new(),
                tracks: Vec::new(),
            });
        };

        let animation = match &options.animation {
            Some(selector) => Some(
                document
                    .animations()
                    .find(|a| selector.matches(a.index(), a.name()))
                    .with_context(|| {
                        let available: Vec<_> =
                            document.animations().filter_map(|a| a.name()).collect();
                        format!(
                            "Animation {} not found in glTF. Available animations: {:?}",
                            selector, available
                        )
                    })?,
            ),
            None => document.animations().next(),
        };

        let joints: Vec<gltf::Node> = skin.joints().collect();
        let joint_map: HashMap<usize, usize> = joints
            .iter()
            .enumerate()
            .map(|(i, j)| (j.index(), i))
            .collect();

        let node_parent: HashMap<usize, usize> = document
            .nodes()
            .flat_map(|n| {
                let parent = n.index();
                n.children().map(move |c| (c.index(), parent))
            })
            .collect();
        let nodes: Vec<gltf::Node> = document.nodes().collect();

        let mut links = Vec::with_capacity(joints.len());
        for joint in &joints {
            let mut prefix = Mat4::IDENTITY;
            let mut parent = None;
            let mut cursor = node_parent.get(&joint.index()).copied();
            let mut steps = 0;
            while let Some(node) = cursor {
                if let Some(&p) = joint_map.get(&node) {
                    parent = Some(p);
                    break;
                }
                prefix = Trs::from_node(&nodes[node]).matrix() * prefix;
                cursor = node_parent.get(&node).copied();
                steps += 1;
                if steps > nodes.len() {
                    bail!("Node hierarchy contains a cycle");
                }
            }
            links.push(JointLink {
                parent,
                prefix,
                rest: Trs::from_node(joint),
            });
        }

        let names: Vec<String> = joints
            .iter()
            .map(|j| {
                j.name()
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("joint_{}", j.index()))
            })
            .collect();

        let order = parents_first(&links)?;

        let mut tracks = Vec::new();
        let mut max_time = 0.0f32;
        if let Some(animation) = &animation {
            for (c, channel) in animation.channels().enumerate() {
                let Some(&joint) = joint_map.get(&channel.target().node().index()) else {
                    continue;
                };
                let reader = channel.reader(|buffer| buffers.get(buffer.index()).map(|d| &d[..]));
                let times: Vec<f32> = reader
                    .read_inputs()
                    .with_context(|| format!("Animation channel {} has no key times", c))?
                    .collect();
                if let Some(&t) = times.last() {
                    max_time = max_time.max(t);
                }

                let interpolation = channel.sampler().interpolation();
                let outputs = reader
                    .read_outputs()
                    .with_context(|| format!("Animation channel {} has no output values", c))?;
                let values = match outputs {
                    ReadOutputs::Translations(iter) => TrackValues::Translation(
                        keyframe_values(iter.collect(), interpolation)
                            .into_iter()
                            .map(Vec3::from_array)
                            .collect(),
                    ),
                    ReadOutputs::Rotations(rotations) => TrackValues::Rotation(
                        keyframe_values(rotations.into_f32().collect(), interpolation)
                            .into_iter()
                            .map(|q| Quat::from_array(q).normalize())
                            .collect(),
                    ),
                    ReadOutputs::Scales(iter) => TrackValues::Scale(
                        keyframe_values(iter.collect(), interpolation)
                            .into_iter()
                            .map(Vec3::from_array)
                            .collect(),
                    ),
                    ReadOutputs::MorphTargetWeights(_) => continue,
                };

                if values.len() < times.len() {
                    bail!(
                        "Animation channel {} targeting '{}' has {} keys but {} values",
                        c,
                        names[joint],
                        times.len(),
                        values.len()
                    );
                }

                tracks.push(Track {
                    joint,
                    times,
                    values,
                    step: interpolation == gltf::animation::Interpolation::Step,
                });
            }
        }

        let end_frame = (max_time * frame_rate).round() as i32;

        tracing::debug!(
            "Loaded skin '{}': {} joints, {} animated channels",
            skin.name().unwrap_or("unnamed"),
            joints.len(),
            tracks.len()
        );

        Ok(Self {
            target: ExportTarget {
                name: skin.name().unwrap_or("Armature").to_string(),
                kind: ObjectKind::Armature,
                has_action: animation.is_some(),
            },
            bounds: SceneBounds::new(0, end_frame, frame_rate),
            names,
            links,
            order,
            tracks,
        })
    }

    /// Armature-space transforms of every joint for the given local poses
    fn world_transforms(&self, locals: &[Mat4]) -> Vec<Mat4> {
        let up = y_up_to_z_up();
        let mut world = vec![Mat4::IDENTITY; self.links.len()];
        for &i in &self.order {
            let link = &self.links[i];
            let base = match link.parent {
                Some(p) => world[p],
                None => up,
            };
            world[i] = base * link.prefix * locals[i];
        }
        world
    }
}

impl PoseProvider for GltfScene {
    fn active_object(&self) -> Option<ExportTarget> {
        Some(self.target.clone())
    }

    fn scene_bounds(&self) -> SceneBounds {
        self.bounds
    }

    fn bone_hierarchy(&self) -> Vec<BoneRest> {
        let locals: Vec<Mat4> = self.links.iter().map(|l| l.rest.matrix()).collect();
        let world = self.world_transforms(&locals);
        self.links
            .iter()
            .enumerate()
            .map(|(i, link)| {
                let rest_local = match link.parent {
                    Some(_) => link.prefix * locals[i],
                    None => world[i],
                };
                BoneRest {
                    name: self.names[i].clone(),
                    parent: link.parent.map(|p| self.names[p].clone()),
                    rest_local,
                    rest_world: world[i],
                }
            })
            .collect()
    }

    fn animated_channels(&self) -> Vec<(String, ChannelKind)> {
        let mut seen = HashSet::new();
        let mut channels = Vec::new();
        for track in &self.tracks {
            let kind = match track.values {
                TrackValues::Translation(_) => ChannelKind::Translation,
                TrackValues::Rotation(_) => ChannelKind::Rotation,
                TrackValues::Scale(_) => continue,
            };
            if seen.insert((track.joint, kind)) {
                channels.push((self.names[track.joint].clone(), kind));
            }
        }
        channels
    }

    fn evaluate(&mut self, frame: i32) -> Result<Vec<Mat4>, ExportError> {
        let t = frame as f32 / self.bounds.samples_per_second;
        let mut poses: Vec<Trs> = self.links.iter().map(|l| l.rest).collect();

        for track in &self.tracks {
            let short = || {
                ExportError::Host(format!(
                    "{} track of '{}' has fewer values than keys",
                    track.values.label(),
                    self.names[track.joint]
                ))
            };
            if track.values.len() < track.times.len() {
                return Err(short());
            }
            let Some((i, factor)) = locate(&track.times, t, track.step) else {
                continue;
            };
            let pose = &mut poses[track.joint];
            match &track.values {
                TrackValues::Translation(v) => {
                    pose.translation = blend_at(v, i, factor, Vec3::lerp).ok_or_else(short)?;
                }
                TrackValues::Scale(v) => {
                    pose.scale = blend_at(v, i, factor, Vec3::lerp).ok_or_else(short)?;
                }
                TrackValues::Rotation(v) => {
                    pose.rotation = blend_at(v, i, factor, Quat::slerp).ok_or_else(short)?;
                }
            }
        }

        let locals: Vec<Mat4> = poses.iter().map(Trs::matrix).collect();
        Ok(self.world_transforms(&locals))
    }
}

/// +90° about X: glTF's +Y up becomes +Z up
fn y_up_to_z_up() -> Mat4 {
    Mat4::from_rotation_x(FRAC_PI_2)
}

fn parents_first(links: &[JointLink]) -> Result<Vec<usize>> {
    let mut children: Vec<Vec<usize>> = vec![Vec::new(); links.len()];
    let mut stack = Vec::new();
    for (i, link) in links.iter().enumerate() {
        match link.parent {
            Some(p) => children[p].push(i),
            None => stack.push(i),
        }
    }
    stack.reverse();

    let mut order = Vec::with_capacity(links.len());
    while let Some(i) = stack.pop() {
        order.push(i);
        stack.extend(children[i].iter().rev());
    }
    if order.len() != links.len() {
        bail!("Skin joint hierarchy is not a tree");
    }
    Ok(order)
}

// ============================================================================
// Sampling
// ============================================================================

/// Key index and blend factor for time `t`, clamped to the track ends
fn locate(times: &[f32], t: f32, step: bool) -> Option<(usize, f32)> {
    if times.is_empty() {
        return None;
    }
    // First key strictly after t
    let next = times.partition_point(|&k| k <= t);
    if next == 0 {
        return Some((0, 0.0));
    }
    if next >= times.len() {
        return Some((times.len() - 1, 0.0));
    }
    let i = next - 1;
    if step {
        return Some((i, 0.0));
    }
    let (t0, t1) = (times[i], times[next]);
    let factor = if t1 > t0 { (t - t0) / (t1 - t0) } else { 0.0 };
    Some((i, factor.clamp(0.0, 1.0)))
}

/// Blend key `i` towards key `i + 1`; the last key holds its value
fn blend_at<T: Copy>(values: &[T], i: usize, factor: f32, mix: fn(T, T, f32) -> T) -> Option<T> {
    let a = *values.get(i)?;
    let b = values.get(i + 1).copied().unwrap_or(a);
    Some(mix(a, b, factor))
}

/// Keyframe values of a sampler output; cubic-spline tangents are dropped
fn keyframe_values<const N: usize>(
    values: Vec<[f32; N]>,
    interpolation: gltf::animation::Interpolation,
) -> Vec<[f32; N]> {
    match interpolation {
        gltf::animation::Interpolation::CubicSpline => {
            values.chunks_exact(3).map(|triple| triple[1]).collect()
        }
        _ => values,
    }
}

/// Log the animations and skins available in a glTF file
pub fn list_contents(input: &Path) -> Result<()> {
    let (document, buffers, _images) =
        gltf::import(input).with_context(|| format!("Failed to load glTF: {:?}", input))?;

    let skins: Vec<_> = document.skins().collect();
    if skins.is_empty() {
        tracing::info!("No skins found in {:?}", input);
    } else {
        tracing::info!("Skins in {:?}:", input);
        for skin in &skins {
            tracing::info!(
                "  [{}] '{}': {} joints",
                skin.index(),
                skin.name().unwrap_or("unnamed"),
                skin.joints().count()
            );
        }
    }

    let animations: Vec<_> = document.animations().collect();
    if animations.is_empty() {
        tracing::info!("No animations found in {:?}", input);
        return Ok(());
    }

    tracing::info!("Animations in {:?}:", input);
    for anim in &animations {
        let mut max_time = 0.0f32;
        for channel in anim.channels() {
            let reader = channel.reader(|buffer| buffers.get(buffer.index()).map(|d| &d[..]));
            if let Some(t) = reader.read_inputs().and_then(|times| times.last()) {
                max_time = max_time.max(t);
            }
        }

        tracing::info!(
            "  [{}] '{}': {} channels, {:.2}s",
            anim.index(),
            anim.name().unwrap_or("unnamed"),
            anim.channels().count(),
            max_time
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine;

    const EPSILON: f32 = 1e-5;

    fn floats(values: &[f32]) -> Vec<u8> {
        values.iter().flat_map(|v| v.to_le_bytes()).collect()
    }

    /// Two-joint rig: root translates, child turns 90° about Y over one second
    fn rig_gltf() -> Vec<u8> {
        let half = std::f32::consts::FRAC_1_SQRT_2;
        let mut data = floats(&[0.0, 1.0]);
        data.extend(floats(&[0.0, 0.0, 0.0, 1.0, 0.0, half, 0.0, half]));
        data.extend(floats(&[0.0, 1.0, 0.0, 0.0, 1.0, 0.5]));
        let uri = format!(
            "data:application/octet-stream;base64,{}",
            base64::engine::general_purpose::STANDARD.encode(&data)
        );

        let json = serde_json::json!({
            "asset": { "version": "2.0" },
            "scene": 0,
            "scenes": [{ "nodes": [0] }],
            "nodes": [
                { "name": "Armature", "children": [1] },
                { "name": "mPelvis", "translation": [0.0, 1.0, 0.0], "children": [2] },
                { "name": "mChest", "translation": [0.0, 0.4, 0.0] }
            ],
            "skins": [{ "name": "Avatar", "joints": [1, 2] }],
            "buffers": [{ "byteLength": data.len(), "uri": uri }],
            "bufferViews": [
                { "buffer": 0, "byteOffset": 0, "byteLength": 8 },
                { "buffer": 0, "byteOffset": 8, "byteLength": 32 },
                { "buffer": 0, "byteOffset": 40, "byteLength": 24 }
            ],
            "accessors": [
                { "bufferView": 0, "componentType": 5126, "count": 2, "type": "SCALAR", "min": [0.0], "max": [1.0] },
                { "bufferView": 1, "componentType": 5126, "count": 2, "type": "VEC4" },
                { "bufferView": 2, "componentType": 5126, "count": 2, "type": "VEC3" }
            ],
            "animations": [{
                "name": "wave",
                "samplers": [
                    { "input": 0, "output": 1, "interpolation": "LINEAR" },
                    { "input": 0, "output": 2, "interpolation": "LINEAR" }
                ],
                "channels": [
                    { "sampler": 0, "target": { "node": 2, "path": "rotation" } },
                    { "sampler": 1, "target": { "node": 1, "path": "translation" } }
                ]
            }]
        });
        serde_json::to_vec(&json).unwrap()
    }

    /// Same rig, child rotation stored as normalized i16
    fn quantized_rig_gltf() -> Vec<u8> {
        let mut data = floats(&[0.0, 1.0]);
        let rotations: [i16; 8] = [0, 0, 0, 32767, 0, 23170, 0, 23170];
        data.extend(rotations.iter().flat_map(|v| v.to_le_bytes()));
        let uri = format!(
            "data:application/octet-stream;base64,{}",
            base64::engine::general_purpose::STANDARD.encode(&data)
        );

        let json = serde_json::json!({
            "asset": { "version": "2.0" },
            "scene": 0,
            "scenes": [{ "nodes": [0] }],
            "nodes": [
                { "name": "Armature", "children": [1] },
                { "name": "mPelvis", "translation": [0.0, 1.0, 0.0], "children": [2] },
                { "name": "mChest", "translation": [0.0, 0.4, 0.0] }
            ],
            "skins": [{ "name": "Avatar", "joints": [1, 2] }],
            "buffers": [{ "byteLength": data.len(), "uri": uri }],
            "bufferViews": [
                { "buffer": 0, "byteOffset": 0, "byteLength": 8 },
                { "buffer": 0, "byteOffset": 8, "byteLength": 16 }
            ],
            "accessors": [
                { "bufferView": 0, "componentType": 5126, "count": 2, "type": "SCALAR", "min": [0.0], "max": [1.0] },
                { "bufferView": 1, "componentType": 5122, "normalized": true, "count": 2, "type": "VEC4" }
            ],
            "animations": [{
                "name": "turn",
                "samplers": [{ "input": 0, "output": 1, "interpolation": "LINEAR" }],
                "channels": [{ "sampler": 0, "target": { "node": 2, "path": "rotation" } }]
            }]
        });
        serde_json::to_vec(&json).unwrap()
    }

    fn load(options: &GltfOptions) -> Result<GltfScene> {
        let (document, buffers, _images) = gltf::import_slice(rig_gltf())?;
        GltfScene::from_document(&document, &buffers, options)
    }

    #[test]
    fn test_selector_parsing() {
        assert_eq!("2".parse::<Selector>().unwrap(), Selector::Index(2));
        assert_eq!(
            "walk".parse::<Selector>().unwrap(),
            Selector::Name("walk".to_string())
        );
    }

    #[test]
    fn test_selector_deserializes_like_the_cli() {
        let parse = |json: &str| serde_json::from_str::<Selector>(json).unwrap();
        assert_eq!(parse("0"), Selector::Index(0));
        assert_eq!(parse("\"0\""), Selector::Index(0));
        assert_eq!(parse("\"12\""), "12".parse::<Selector>().unwrap());
        assert_eq!(parse("\"walk\""), Selector::Name("walk".to_string()));
    }

    #[test]
    fn test_locate_clamps_and_blends() {
        let times = [0.0, 1.0, 2.0];
        assert_eq!(locate(&times, -1.0, false), Some((0, 0.0)));
        assert_eq!(locate(&times, 0.5, false), Some((0, 0.5)));
        assert_eq!(locate(&times, 1.5, true), Some((1, 0.0)));
        assert_eq!(locate(&times, 5.0, false), Some((2, 0.0)));
        assert_eq!(locate(&[], 0.0, false), None);
    }

    #[test]
    fn test_cubic_spline_keeps_values() {
        let values = vec![[0.0], [1.0], [0.0], [0.0], [2.0], [0.0]];
        let kept = keyframe_values(values, gltf::animation::Interpolation::CubicSpline);
        assert_eq!(kept, vec![[1.0], [2.0]]);
    }

    #[test]
    fn test_scene_bounds_and_channels() {
        let scene = load(&GltfOptions::default()).unwrap();
        let bounds = scene.scene_bounds();
        assert_eq!((bounds.start_frame, bounds.end_frame), (0, 30));

        let target = scene.active_object().unwrap();
        assert_eq!(target.name, "Avatar");
        assert_eq!(target.kind, ObjectKind::Armature);
        assert!(target.has_action);

        let channels = scene.animated_channels();
        assert!(channels.contains(&("mChest".to_string(), ChannelKind::Rotation)));
        assert!(channels.contains(&("mPelvis".to_string(), ChannelKind::Translation)));
        assert_eq!(channels.len(), 2);
    }

    #[test]
    fn test_rest_pose_is_z_up() {
        let scene = load(&GltfOptions::default()).unwrap();
        let bones = scene.bone_hierarchy();
        assert_eq!(bones[0].name, "mPelvis");
        assert_eq!(bones[1].parent.as_deref(), Some("mPelvis"));

        let pelvis_head = bones[0].rest_world.w_axis.truncate();
        let chest_head = bones[1].rest_world.w_axis.truncate();
        assert!(pelvis_head.abs_diff_eq(Vec3::new(0.0, 0.0, 1.0), EPSILON));
        assert!(chest_head.abs_diff_eq(Vec3::new(0.0, 0.0, 1.4), EPSILON));
    }

    #[test]
    fn test_evaluate_interpolates() {
        let mut scene = load(&GltfOptions {
            frame_rate: Some(10.0),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(scene.scene_bounds().end_frame, 10);

        let poses = scene.evaluate(10).unwrap();
        // Root moved +0.5 along glTF Z, which is -Y after the up-axis change
        let pelvis_head = poses[0].w_axis.truncate();
        assert!(pelvis_head.abs_diff_eq(Vec3::new(0.0, -0.5, 1.0), EPSILON));

        let poses = scene.evaluate(5).unwrap();
        let pelvis_head = poses[0].w_axis.truncate();
        assert!(pelvis_head.abs_diff_eq(Vec3::new(0.0, -0.25, 1.0), EPSILON));
    }

    #[test]
    fn test_normalized_integer_rotations() {
        let (document, buffers, _images) = gltf::import_slice(quantized_rig_gltf()).unwrap();
        let mut scene =
            GltfScene::from_document(&document, &buffers, &GltfOptions::default()).unwrap();
        assert_eq!(scene.scene_bounds().end_frame, 30);
        assert_eq!(
            scene.animated_channels(),
            vec![("mChest".to_string(), ChannelKind::Rotation)]
        );

        let poses = scene.evaluate(30).unwrap();
        let (_, rotation, _) = poses[1].to_scale_rotation_translation();
        let expected = Quat::from_rotation_x(FRAC_PI_2) * Quat::from_rotation_y(FRAC_PI_2);
        assert!(rotation.dot(expected).abs() > 1.0 - 1e-4, "{:?}", rotation);
    }

    #[test]
    fn test_short_tracks_fail_alike() {
        let short_tracks = [
            TrackValues::Translation(vec![Vec3::ZERO]),
            TrackValues::Rotation(vec![Quat::IDENTITY]),
            TrackValues::Scale(vec![Vec3::ONE]),
        ];
        for values in short_tracks {
            let mut scene = load(&GltfOptions::default()).unwrap();
            scene.tracks.push(Track {
                joint: 0,
                times: vec![0.0, 1.0],
                values,
                step: false,
            });
            let err = scene.evaluate(15).unwrap_err();
            assert!(
                matches!(&err, ExportError::Host(msg) if msg.contains("'mPelvis'")),
                "{:?}",
                err
            );
        }
    }

    #[test]
    fn test_missing_selection_is_an_error() {
        let err = load(&GltfOptions {
            animation: Some(Selector::Name("run".to_string())),
            ..Default::default()
        })
        .unwrap_err();
        assert!(err.to_string().contains("'run'"));

        assert!(load(&GltfOptions {
            skin: Some(Selector::Index(3)),
            ..Default::default()
        })
        .is_err());
    }
}
