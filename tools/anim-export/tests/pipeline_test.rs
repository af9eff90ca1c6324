//! Library pipeline tests
//!
//! Drives the exporter with an in-memory rig and decodes the written file.

use anim_export::formats::{dump_path, DecodedAnim};
use anim_export::{
    build_document, export_animation, BoneRest, ChannelKind, Constraint, ExportError,
    ExportSettings, ExportTarget, ObjectKind, PoseProvider, SceneBounds,
};
use glam::{Mat4, Quat, Vec3};
use tempfile::tempdir;

const PELVIS_HEAD: Vec3 = Vec3::new(0.0, 0.0, 1.0);
const CHEST_HEAD: Vec3 = Vec3::new(0.0, 0.0, 1.4);

/// Pelvis walks forward, chest twists, an unrecognized prop bone spins
struct WalkingRig {
    bounds: SceneBounds,
    evaluated: Vec<i32>,
}

impl WalkingRig {
    fn new(start: i32, end: i32) -> Self {
        Self {
            bounds: SceneBounds::new(start, end, 10.0),
            evaluated: Vec::new(),
        }
    }

    fn progress(&self, frame: i32) -> f32 {
        let span = (self.bounds.end_frame - self.bounds.start_frame).max(1) as f32;
        (frame - self.bounds.start_frame) as f32 / span
    }
}

impl PoseProvider for WalkingRig {
    fn active_object(&self) -> Option<ExportTarget> {
        Some(ExportTarget {
            name: "Avatar".to_string(),
            kind: ObjectKind::Armature,
            has_action: true,
        })
    }

    fn scene_bounds(&self) -> SceneBounds {
        self.bounds
    }

    fn bone_hierarchy(&self) -> Vec<BoneRest> {
        vec![
            BoneRest {
                name: "mPelvis".to_string(),
                parent: None,
                rest_local: Mat4::from_translation(PELVIS_HEAD),
                rest_world: Mat4::from_translation(PELVIS_HEAD),
            },
            BoneRest {
                name: "mChest".to_string(),
                parent: Some("mPelvis".to_string()),
                rest_local: Mat4::from_translation(CHEST_HEAD - PELVIS_HEAD),
                rest_world: Mat4::from_translation(CHEST_HEAD),
            },
            BoneRest {
                name: "PropSword".to_string(),
                parent: Some("mChest".to_string()),
                rest_local: Mat4::IDENTITY,
                rest_world: Mat4::from_translation(CHEST_HEAD),
            },
        ]
    }

    fn animated_channels(&self) -> Vec<(String, ChannelKind)> {
        vec![
            ("mPelvis".to_string(), ChannelKind::Translation),
            ("mPelvis".to_string(), ChannelKind::Rotation),
            ("mChest".to_string(), ChannelKind::Rotation),
            ("mChest".to_string(), ChannelKind::Translation),
            ("PropSword".to_string(), ChannelKind::Rotation),
        ]
    }

    fn evaluate(&mut self, frame: i32) -> Result<Vec<Mat4>, ExportError> {
        self.evaluated.push(frame);
        let p = self.progress(frame);
        let walk = Mat4::from_translation(Vec3::new(0.0, p * 0.8, 0.0));
        let twist = Mat4::from_translation(CHEST_HEAD)
            * Mat4::from_rotation_z(p * 0.6)
            * Mat4::from_translation(-CHEST_HEAD);
        let pelvis = walk * Mat4::from_translation(PELVIS_HEAD);
        let chest = walk * twist * Mat4::from_translation(CHEST_HEAD);
        let sword = chest * Mat4::from_rotation_x(p * 3.0);
        Ok(vec![pelvis, chest, sword])
    }
}

#[test]
fn test_export_and_decode() {
    let dir = tempdir().expect("Failed to create temp dir");
    let output = dir.path().join("walk.anim");

    let constraint = Constraint {
        chain_length: 2,
        constraint_type: 1,
        source_volume: "L_HAND".to_string(),
        target_volume: "R_HAND".to_string(),
        target_dir: [0.0, 0.0, 1.0],
        ease_in_stop: 0.25,
        ..Default::default()
    };
    let settings = ExportSettings {
        priority: 3,
        looping: true,
        loop_in_frame: Some(6),
        ..Default::default()
    };

    let mut rig = WalkingRig::new(1, 11);
    export_animation(&mut rig, &settings, std::slice::from_ref(&constraint), &output)
        .expect("export failed");
    assert_eq!(rig.evaluated, (1..=11).collect::<Vec<_>>());

    let bytes = std::fs::read(&output).expect("Failed to read output");
    let anim = DecodedAnim::from_bytes(&bytes).expect("Failed to decode output");

    assert_eq!(anim.header.version, 1);
    assert_eq!(anim.header.sub_version, 0);
    assert_eq!(anim.header.base_priority, 3);
    assert!((anim.header.duration - 1.0).abs() < 1e-6);
    assert_eq!(anim.emote_name, "");
    assert_eq!(anim.params.looping, 1);
    assert!((anim.params.loop_in_point - 0.5).abs() < 1e-6);
    assert!((anim.params.loop_out_point - 1.0).abs() < 1e-6);
    assert_eq!(anim.params.hand_pose, 0);

    let names: Vec<&str> = anim.joints.iter().map(|j| j.name.as_str()).collect();
    assert_eq!(names, ["mPelvis", "mChest"]);

    let pelvis = anim.joint("mPelvis").unwrap();
    assert_eq!(pelvis.priority, 3);
    // Static rotation reduces to its endpoints; root motion is kept per frame
    assert_eq!(pelvis.rotation_keys.len(), 2);
    assert_eq!(pelvis.position_keys.len(), 11);
    assert_eq!(pelvis.position_keys.first().unwrap().time, 0);
    assert_eq!(pelvis.position_keys.last().unwrap().time, 65535);

    // Forward travel along +Y becomes -X after the forward-axis correction, halved
    let (_, last) = pelvis.positions().last().unwrap();
    assert!((last[0] + 0.4).abs() < 1e-3, "{:?}", last);
    assert!(last[1].abs() < 1e-3, "{:?}", last);
    assert!(last[2].abs() < 1e-3, "{:?}", last);

    let chest = anim.joint("mChest").unwrap();
    assert!(chest.position_keys.is_empty());
    assert_eq!(chest.rotation_keys.len(), 11);
    let (_, q) = chest.rotations().last().unwrap();
    let q = Quat::from_array(q);
    assert!(q.abs_diff_eq(Quat::from_rotation_z(0.6), 1e-3), "{:?}", q);

    assert_eq!(anim.constraints, vec![constraint]);
    assert!(!dump_path(&output).exists());
}

#[test]
fn test_single_frame_export() {
    let dir = tempdir().expect("Failed to create temp dir");
    let output = dir.path().join("pose.anim");
    let settings = ExportSettings {
        dump_json: true,
        ..Default::default()
    };

    let mut rig = WalkingRig::new(1, 1);
    let doc = export_animation(&mut rig, &settings, &[], &output).expect("export failed");
    assert_eq!(doc.duration, 0.0);
    for joint in &doc.joints {
        assert!(joint.rotation_keys.iter().all(|k| k.time == 0));
        assert!(joint.position_keys.iter().all(|k| k.time == 0));
    }

    let dump = std::fs::read_to_string(dump_path(&output)).expect("Failed to read dump");
    let json: serde_json::Value = serde_json::from_str(&dump).expect("Invalid dump");
    assert!(json["joints"]["mPelvis"].is_object());
    assert!(json["joints"]["mChest"].is_object());
    // Insertion order survives in the text
    let pelvis = dump.find("\"mPelvis\"").unwrap();
    let chest = dump.find("\"mChest\"").unwrap();
    assert!(pelvis < chest);
    assert_eq!(json["loop"], false);
    assert_eq!(json["hand_pose"], 0);
}

#[test]
fn test_translations_opt_in() {
    let settings = ExportSettings {
        export_translations: true,
        ..Default::default()
    };
    let mut rig = WalkingRig::new(0, 4);
    let doc = build_document(&mut rig, &settings, &[]).expect("build failed");
    let chest = doc.joint("mChest").unwrap();
    // The chest never moves relative to the pelvis
    assert_eq!(chest.position_keys.len(), 2);
    let p = Vec3::from_array(chest.position_keys[0].xyz());
    assert!(p.abs_diff_eq(Vec3::new(0.0, 0.0, 0.2), 1e-5), "{:?}", p);
}

#[test]
fn test_extra_bones_are_exported() {
    let settings = ExportSettings {
        extra_bones: vec!["PropSword".to_string()],
        ..Default::default()
    };
    let mut rig = WalkingRig::new(0, 4);
    let doc = build_document(&mut rig, &settings, &[]).expect("build failed");
    assert!(doc.joint("PropSword").is_some());
}
