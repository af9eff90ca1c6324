//! Binary format definitions for avatar animation files
//!
//! Re-exports from anim-common for writing and reading `.anim` files.

pub use anim_common::formats::*;

use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Write an already encoded `.anim` stream to `output`
pub fn write_anim_bytes(output: &Path, bytes: &[u8]) -> Result<()> {
    fs::write(output, bytes).with_context(|| format!("Failed to write output: {:?}", output))
}

/// Path of the JSON dump written next to `output` (`walk.anim` -> `walk.anim.json`)
pub fn dump_path(output: &Path) -> PathBuf {
    let mut name = output.as_os_str().to_owned();
    name.push(".json");
    PathBuf::from(name)
}

/// Write the pre-codec document as pretty-printed JSON
pub fn write_anim_dump(path: &Path, doc: &AnimationDocument) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("Failed to create dump: {:?}", path))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, doc)
        .with_context(|| format!("Failed to serialize dump: {:?}", path))?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

/// Read a JSON array of constraint records
pub fn read_constraints(path: &Path) -> Result<Vec<Constraint>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read constraints: {:?}", path))?;
    serde_json::from_str(&text).with_context(|| format!("Invalid constraints file: {:?}", path))
}

/// Read and decode a `.anim` file
pub fn read_anim(path: &Path) -> Result<DecodedAnim> {
    let bytes = fs::read(path).with_context(|| format!("Failed to read: {:?}", path))?;
    DecodedAnim::from_bytes(&bytes).with_context(|| format!("Invalid animation file: {:?}", path))
}
