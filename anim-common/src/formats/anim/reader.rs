//! Binary animation reader
//!
//! Decodes `.anim` byte streams. Keys stay quantized; use the `dequantize_*`
//! helpers on [`DecodedJoint`] to get floating-point values back.

use byteorder::{LittleEndian, ReadBytesExt};
use std::io::{self, Cursor, Read};

use super::encoding::{dequantize_position, dequantize_rotation};
use super::header::{AnimHeader, AnimParams, ConstraintRecord};
use super::types::{Constraint, QuantizedKey, KEY_SIZE};

/// Longest null-terminated name accepted before the stream is considered corrupt
const MAX_NAME_LEN: usize = 1024;

/// Upper bound on preallocation driven by counts read from the stream
const MAX_PREALLOC: usize = 4096;

/// Joint as read from the file
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedJoint {
    pub name: String,
    pub priority: u32,
    pub rotation_keys: Vec<QuantizedKey>,
    pub position_keys: Vec<QuantizedKey>,
}

impl DecodedJoint {
    /// Rotation keys as `(time, [x, y, z, w])`
    pub fn rotations(&self) -> impl Iterator<Item = (u16, [f32; 4])> + '_ {
        self.rotation_keys
            .iter()
            .map(|k| (k.time, dequantize_rotation([k.x, k.y, k.z])))
    }

    /// Position keys as `(time, [x, y, z])`
    pub fn positions(&self) -> impl Iterator<Item = (u16, [f32; 3])> + '_ {
        self.position_keys
            .iter()
            .map(|k| (k.time, dequantize_position([k.x, k.y, k.z])))
    }
}

/// Complete decoded animation
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedAnim {
    pub header: AnimHeader,
    pub emote_name: String,
    pub params: AnimParams,
    pub joints: Vec<DecodedJoint>,
    pub constraints: Vec<Constraint>,
}

impl DecodedAnim {
    /// Decode a complete file held in memory, rejecting trailing bytes
    pub fn from_bytes(bytes: &[u8]) -> io::Result<Self> {
        let mut cursor = Cursor::new(bytes);
        let anim = AnimReader::new(&mut cursor).read_anim()?;
        if cursor.position() as usize != bytes.len() {
            return Err(invalid_data(format!(
                "{} trailing bytes after constraint block",
                bytes.len() - cursor.position() as usize
            )));
        }
        Ok(anim)
    }

    pub fn joint(&self, name: &str) -> Option<&DecodedJoint> {
        self.joints.iter().find(|j| j.name == name)
    }
}

/// Reader for the binary animation format
pub struct AnimReader<R: Read> {
    reader: R,
}

impl<R: Read> AnimReader<R> {
    /// Create a new animation reader
    pub fn new(reader: R) -> Self {
        Self { reader }
    }

    /// Read a complete animation from the input
    ///
    /// Input that ends early is reported as `InvalidData`, like any other
    /// malformed stream.
    pub fn read_anim(&mut self) -> io::Result<DecodedAnim> {
        self.read_records().map_err(|e| match e.kind() {
            io::ErrorKind::UnexpectedEof => invalid_data(format!("truncated animation: {}", e)),
            _ => e,
        })
    }

    fn read_records(&mut self) -> io::Result<DecodedAnim> {
        let mut header_bytes = [0u8; AnimHeader::SIZE];
        self.reader.read_exact(&mut header_bytes)?;
        let header = AnimHeader::from_bytes(&header_bytes)
            .ok_or_else(|| invalid_data("short animation header"))?;

        let emote_name = self.read_cstr()?;

        let mut params_bytes = [0u8; AnimParams::SIZE];
        self.reader.read_exact(&mut params_bytes)?;
        let params = AnimParams::from_bytes(&params_bytes)
            .ok_or_else(|| invalid_data("short params block"))?;

        let joint_count = params.joint_count as usize;
        let mut joints = Vec::with_capacity(joint_count.min(MAX_PREALLOC));
        for _ in 0..joint_count {
            joints.push(self.read_joint()?);
        }

        let constraint_count = self.reader.read_u32::<LittleEndian>()? as usize;
        let mut constraints = Vec::with_capacity(constraint_count.min(MAX_PREALLOC));
        for _ in 0..constraint_count {
            let mut bytes = [0u8; ConstraintRecord::SIZE];
            self.reader.read_exact(&mut bytes)?;
            let record = ConstraintRecord::from_bytes(&bytes)
                .ok_or_else(|| invalid_data("short constraint record"))?;
            constraints.push(record.to_constraint());
        }

        Ok(DecodedAnim {
            header,
            emote_name,
            params,
            joints,
            constraints,
        })
    }

    fn read_joint(&mut self) -> io::Result<DecodedJoint> {
        let name = self.read_cstr()?;
        let priority = self.reader.read_u32::<LittleEndian>()?;
        let rotation_keys = self.read_keys()?;
        let position_keys = self.read_keys()?;
        Ok(DecodedJoint {
            name,
            priority,
            rotation_keys,
            position_keys,
        })
    }

    fn read_keys(&mut self) -> io::Result<Vec<QuantizedKey>> {
        let count = self.reader.read_u32::<LittleEndian>()? as usize;
        let mut keys = Vec::with_capacity(count.min(MAX_PREALLOC));
        let mut bytes = [0u8; KEY_SIZE];
        for _ in 0..count {
            self.reader.read_exact(&mut bytes)?;
            let key =
                QuantizedKey::from_bytes(&bytes).ok_or_else(|| invalid_data("short keyframe"))?;
            keys.push(key);
        }
        Ok(keys)
    }

    fn read_cstr(&mut self) -> io::Result<String> {
        let mut bytes = Vec::new();
        loop {
            let b = self.reader.read_u8()?;
            if b == 0 {
                break;
            }
            if bytes.len() == MAX_NAME_LEN {
                return Err(invalid_data("unterminated name"));
            }
            bytes.push(b);
        }
        String::from_utf8(bytes).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    /// Consume the reader and return the inner reader
    pub fn into_inner(self) -> R {
        self.reader
    }
}

fn invalid_data(msg: impl Into<String>) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, msg.into())
}
