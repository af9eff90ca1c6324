//! Binary animation writer
//!
//! Serializes an [`AnimationDocument`] into the `.anim` byte stream.

use byteorder::{LittleEndian, WriteBytesExt};
use std::io::{self, Write};

use super::encoding::{quantize_position, quantize_rotation};
use super::header::{AnimHeader, AnimParams, ConstraintRecord};
use super::types::{AnimationDocument, JointChannel, QuantizedKey};

/// Writer for the binary animation format
pub struct AnimWriter<W: Write> {
    writer: W,
}

impl<W: Write> AnimWriter<W> {
    /// Create a new animation writer
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Write a complete animation to the output
    pub fn write_document(&mut self, doc: &AnimationDocument) -> io::Result<()> {
        self.writer.write_all(&AnimHeader::from_document(doc).to_bytes())?;
        self.write_cstr(&doc.emote_name)?;
        self.writer.write_all(&AnimParams::from_document(doc).to_bytes())?;

        for joint in &doc.joints {
            self.write_joint(joint)?;
        }

        self.writer
            .write_u32::<LittleEndian>(doc.constraints.len() as u32)?;
        for constraint in &doc.constraints {
            let record = ConstraintRecord::from_constraint(constraint);
            self.writer.write_all(&record.to_bytes())?;
        }

        Ok(())
    }

    /// Write one joint: name, priority, rotation keys, position keys
    fn write_joint(&mut self, joint: &JointChannel) -> io::Result<()> {
        self.write_cstr(&joint.name)?;
        self.writer.write_u32::<LittleEndian>(joint.priority)?;

        self.writer
            .write_u32::<LittleEndian>(joint.rotation_keys.len() as u32)?;
        for key in &joint.rotation_keys {
            let [x, y, z] = quantize_rotation(key.xyzw());
            let encoded = QuantizedKey {
                time: key.time,
                x,
                y,
                z,
            };
            self.writer.write_all(&encoded.to_bytes())?;
        }

        self.writer
            .write_u32::<LittleEndian>(joint.position_keys.len() as u32)?;
        for key in &joint.position_keys {
            let [x, y, z] = quantize_position(key.xyz());
            let encoded = QuantizedKey {
                time: key.time,
                x,
                y,
                z,
            };
            self.writer.write_all(&encoded.to_bytes())?;
        }

        Ok(())
    }

    fn write_cstr(&mut self, s: &str) -> io::Result<()> {
        self.writer.write_all(s.as_bytes())?;
        self.writer.write_u8(0)
    }

    /// Consume the writer and return the inner writer
    pub fn into_inner(self) -> W {
        self.writer
    }
}

/// Encode a document to an in-memory byte stream
pub fn encode_document(doc: &AnimationDocument) -> io::Result<Vec<u8>> {
    let mut writer = AnimWriter::new(Vec::new());
    writer.write_document(doc)?;
    Ok(writer.into_inner())
}
