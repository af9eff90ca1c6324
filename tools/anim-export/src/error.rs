//! Export error type

/// Errors raised while validating or sampling an export target
///
/// Everything except [`ExportError::Host`] and [`ExportError::Io`] is a
/// precondition failure detected before the first frame is sampled.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("no active object - select an armature")]
    NoActiveObject,

    #[error("'{name}' is a {kind}, not an armature")]
    NotAnArmature { name: String, kind: String },

    #[error("armature '{0}' has no action")]
    NoAction(String),

    #[error("action has no animated rotation or translation channels")]
    EmptyAnimation,

    #[error("armature has no bones")]
    NoBones,

    #[error("invalid sample rate {0} (must be > 0)")]
    InvalidFrameRate(f32),

    #[error("invalid frame range {start}..={end}")]
    InvalidFrameRange { start: i32, end: i32 },

    #[error("duplicate bone name '{0}'")]
    DuplicateBone(String),

    #[error("bone '{bone}' references unknown parent '{parent}'")]
    UnknownParent { bone: String, parent: String },

    #[error("bone hierarchy contains a cycle through '{0}'")]
    CyclicHierarchy(String),

    #[error("frame {frame}: host returned {got} pose transforms for {expected} bones")]
    PoseMismatch {
        frame: i32,
        got: usize,
        expected: usize,
    },

    #[error("host failed: {0}")]
    Host(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
