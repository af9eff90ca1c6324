//! Quantization and decoding functions for animation data
//!
//! Arithmetic is done in f64 and rounded half away from zero so that the
//! same input always lands on the same 16-bit value.

use super::types::VOLUME_NAME_SIZE;

const U16_SCALE: f64 = 65535.0;

/// Divisor of the position map; the encodable range is `[-2.5, 2.5]`
const POSITION_SPAN: f64 = 5.0;

// ============================================================================
// Time
// ============================================================================

/// Map a frame onto the 16-bit time axis of the animation
///
/// `round((frame - start) / (end - start) * 65535)`, or 0 for a single-frame
/// animation.
pub fn frame_time_u16(frame: i32, start_frame: i32, end_frame: i32) -> u16 {
    if end_frame <= start_frame {
        return 0;
    }
    let t = f64::from(frame - start_frame) / f64::from(end_frame - start_frame);
    (t.clamp(0.0, 1.0) * U16_SCALE).round() as u16
}

// ============================================================================
// Rotation
// ============================================================================

/// Flip a quaternion `[x, y, z, w]` into the w >= 0 hemisphere
#[inline]
pub fn canonicalize_quat(q: [f32; 4]) -> [f32; 4] {
    if q[3] < 0.0 {
        [-q[0], -q[1], -q[2], -q[3]]
    } else {
        q
    }
}

/// Map one quaternion component from `[-1, 1]` onto `[0, 65535]`
#[inline]
pub fn quantize_rotation_component(v: f32) -> u16 {
    let v = f64::from(v).clamp(-1.0, 1.0);
    (((v + 1.0) / 2.0) * U16_SCALE).round() as u16
}

/// Encode a quaternion `[x, y, z, w]` as three 16-bit components
///
/// The quaternion is canonicalized first so the dropped w is never negative.
pub fn quantize_rotation(q: [f32; 4]) -> [u16; 3] {
    let [x, y, z, _] = canonicalize_quat(q);
    [
        quantize_rotation_component(x),
        quantize_rotation_component(y),
        quantize_rotation_component(z),
    ]
}

/// Decode three 16-bit components back to a quaternion `[x, y, z, w]`
///
/// w is rebuilt as `sqrt(max(0, 1 - x² - y² - z²))`.
pub fn dequantize_rotation(q: [u16; 3]) -> [f32; 4] {
    let decode = |v: u16| (f64::from(v) / U16_SCALE * 2.0 - 1.0) as f32;
    let (x, y, z) = (decode(q[0]), decode(q[1]), decode(q[2]));
    let w = (1.0 - x * x - y * y - z * z).max(0.0).sqrt();
    [x, y, z, w]
}

// ============================================================================
// Position
// ============================================================================

/// Map one position component onto `[0, 65535]`
///
/// The value is clamped to `[-1, 1]` before `(v / 5 + 0.5) * 65535`, so the
/// clamped extremes do not reach the ends of the 16-bit range.
#[inline]
pub fn quantize_position_component(v: f32) -> u16 {
    let v = f64::from(v).clamp(-1.0, 1.0);
    ((v / POSITION_SPAN + 0.5) * U16_SCALE).round() as u16
}

/// Encode a position as three 16-bit components
pub fn quantize_position(p: [f32; 3]) -> [u16; 3] {
    [
        quantize_position_component(p[0]),
        quantize_position_component(p[1]),
        quantize_position_component(p[2]),
    ]
}

/// Decode three 16-bit position components
pub fn dequantize_position(q: [u16; 3]) -> [f32; 3] {
    let decode = |v: u16| ((f64::from(v) / U16_SCALE - 0.5) * POSITION_SPAN) as f32;
    [decode(q[0]), decode(q[1]), decode(q[2])]
}

// ============================================================================
// Fixed-width names
// ============================================================================

/// Null-pad or truncate a name to the 16-byte volume field
///
/// A name of 16 bytes or more fills the field with no terminator.
pub fn fixed_name(name: &str) -> [u8; VOLUME_NAME_SIZE] {
    let mut field = [0u8; VOLUME_NAME_SIZE];
    let bytes = name.as_bytes();
    let len = bytes.len().min(VOLUME_NAME_SIZE);
    field[..len].copy_from_slice(&bytes[..len]);
    field
}

/// Read a 16-byte volume field up to the first null
pub fn read_fixed_name(field: &[u8; VOLUME_NAME_SIZE]) -> String {
    let end = field.iter().position(|&b| b == 0).unwrap_or(VOLUME_NAME_SIZE);
    String::from_utf8_lossy(&field[..end]).into_owned()
}
