//! Test asset generators
//!
//! Writes small glTF files with embedded (base64) buffers.

use base64::Engine;
use std::path::Path;

fn floats(values: &[f32]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}

/// Avatar rig with one "wave" clip over one second
///
/// Nodes: Armature -> mPelvis -> mChest -> mHead, plus an unrecognized
/// Ponytail bone under mHead. The pelvis rises 0.2 units (glTF +Y), the chest
/// turns 90° about glTF +Y and the ponytail swings.
pub fn generate_rig_gltf(path: &Path, with_skin: bool) -> std::io::Result<()> {
    let half = std::f32::consts::FRAC_1_SQRT_2;

    // 0..12: times (3 keys)
    let mut data = floats(&[0.0, 0.5, 1.0]);
    // 12..60: chest rotation
    data.extend(floats(&[
        0.0, 0.0, 0.0, 1.0, //
        0.0, 0.382_683_4, 0.0, 0.923_879_5, //
        0.0, half, 0.0, half,
    ]));
    // 60..96: pelvis translation
    data.extend(floats(&[
        0.0, 1.0, 0.0, //
        0.0, 1.1, 0.0, //
        0.0, 1.2, 0.0,
    ]));
    // 96..144: ponytail rotation
    data.extend(floats(&[
        0.0, 0.0, 0.0, 1.0, //
        half, 0.0, 0.0, half, //
        0.0, 0.0, 0.0, 1.0,
    ]));

    let uri = format!(
        "data:application/octet-stream;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(&data)
    );

    let mut json = serde_json::json!({
        "asset": { "version": "2.0", "generator": "anim-export tests" },
        "scene": 0,
        "scenes": [{ "nodes": [0] }],
        "nodes": [
            { "name": "Armature", "children": [1] },
            { "name": "mPelvis", "translation": [0.0, 1.0, 0.0], "children": [2] },
            { "name": "mChest", "translation": [0.0, 0.4, 0.0], "children": [3] },
            { "name": "mHead", "translation": [0.0, 0.3, 0.0], "children": [4] },
            { "name": "Ponytail", "translation": [0.0, 0.1, -0.1] }
        ],
        "buffers": [{ "byteLength": data.len(), "uri": uri }],
        "bufferViews": [
            { "buffer": 0, "byteOffset": 0, "byteLength": 12 },
            { "buffer": 0, "byteOffset": 12, "byteLength": 48 },
            { "buffer": 0, "byteOffset": 60, "byteLength": 36 },
            { "buffer": 0, "byteOffset": 96, "byteLength": 48 }
        ],
        "accessors": [
            { "bufferView": 0, "componentType": 5126, "count": 3, "type": "SCALAR", "min": [0.0], "max": [1.0] },
            { "bufferView": 1, "componentType": 5126, "count": 3, "type": "VEC4" },
            { "bufferView": 2, "componentType": 5126, "count": 3, "type": "VEC3" },
            { "bufferView": 3, "componentType": 5126, "count": 3, "type": "VEC4" }
        ],
        "animations": [{
            "name": "wave",
            "samplers": [
                { "input": 0, "output": 1, "interpolation": "LINEAR" },
                { "input": 0, "output": 2, "interpolation": "LINEAR" },
                { "input": 0, "output": 3, "interpolation": "LINEAR" }
            ],
            "channels": [
                { "sampler": 0, "target": { "node": 2, "path": "rotation" } },
                { "sampler": 1, "target": { "node": 1, "path": "translation" } },
                { "sampler": 2, "target": { "node": 4, "path": "rotation" } }
            ]
        }]
    });

    if with_skin {
        json["skins"] = serde_json::json!([{ "name": "Avatar", "joints": [1, 2, 3, 4] }]);
    }

    let text = serde_json::to_string_pretty(&json).map_err(std::io::Error::other)?;
    std::fs::write(path, text)
}

/// Constraint list with one look-at record
pub fn generate_constraints_json(path: &Path) -> std::io::Result<()> {
    std::fs::write(
        path,
        r#"[
            {
                "chain_length": 1,
                "constraint_type": 1,
                "source_volume": "HEAD",
                "source_offset": [0.0, 0.1, 0.0],
                "target_volume": "A_VERY_LONG_VOLUME_NAME",
                "target_dir": [1.0, 0.0, 0.0],
                "ease_in_start": 0.0,
                "ease_in_stop": 0.2,
                "ease_out_start": 0.8,
                "ease_out_stop": 1.0
            }
        ]"#,
    )
}
