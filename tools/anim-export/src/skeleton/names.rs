//! Recognized bone names of the target avatar skeleton
//!
//! Plain data: extend these tables (or pass extra names through the export
//! settings) to accept more bones.

/// Bone whose translation is always exported when animated
pub const ROOT_MOTION_BONE: &str = "mPelvis";

/// Base skeleton plus the named (unpatterned) extension bones
pub const BASE_BONES: &[&str] = &[
    "mPelvis",
    "mTorso",
    "mChest",
    "mNeck",
    "mHead",
    "mSkull",
    "mEyeRight",
    "mEyeLeft",
    "mCollarLeft",
    "mShoulderLeft",
    "mElbowLeft",
    "mWristLeft",
    "mCollarRight",
    "mShoulderRight",
    "mElbowRight",
    "mWristRight",
    "mHipRight",
    "mKneeRight",
    "mAnkleRight",
    "mFootRight",
    "mToeRight",
    "mHipLeft",
    "mKneeLeft",
    "mAnkleLeft",
    "mFootLeft",
    "mToeLeft",
    "mGroin",
    "mWingsRoot",
    "mHindLimbsRoot",
    // Face rig center line
    "mFaceRoot",
    "mFaceForeheadCenter",
    "mFaceNoseBase",
    "mFaceNoseCenter",
    "mFaceNoseBridge",
    "mFaceJaw",
    "mFaceJawShaper",
    "mFaceChin",
    "mFaceTeethLower",
    "mFaceTeethUpper",
    "mFaceLipLowerCenter",
    "mFaceLipUpperCenter",
    "mFaceTongueBase",
    "mFaceTongueTip",
];

/// Soft-tissue collision volumes
pub const VOLUME_BONES: &[&str] = &[
    "PELVIS",
    "BUTT",
    "BELLY",
    "LEFT_HANDLE",
    "RIGHT_HANDLE",
    "LOWER_BACK",
    "UPPER_BACK",
    "CHEST",
    "LEFT_PEC",
    "RIGHT_PEC",
    "NECK",
    "HEAD",
    "L_CLAVICLE",
    "L_UPPER_ARM",
    "L_LOWER_ARM",
    "L_HAND",
    "R_CLAVICLE",
    "R_UPPER_ARM",
    "R_LOWER_ARM",
    "R_HAND",
    "L_UPPER_LEG",
    "L_LOWER_LEG",
    "L_FOOT",
    "R_UPPER_LEG",
    "R_LOWER_LEG",
    "R_FOOT",
];

const SIDES: &[&str] = &["Left", "Right"];
const NO_SIDE: &[&str] = &[""];

/// A family of names shaped `<stem><index?><side>`
#[derive(Debug, Clone, Copy)]
pub struct BoneFamily {
    pub stems: &'static [&'static str],
    /// Inclusive index range; `None` means the name carries no index
    pub indices: Option<(u8, u8)>,
    /// Accepted suffixes after the index
    pub sides: &'static [&'static str],
}

pub const BONE_FAMILIES: &[BoneFamily] = &[
    // Digits: mHandIndex2Left
    BoneFamily {
        stems: &[
            "mHandThumb",
            "mHandIndex",
            "mHandMiddle",
            "mHandRing",
            "mHandPinky",
        ],
        indices: Some((1, 3)),
        sides: SIDES,
    },
    // Tail: mTail1 .. mTail6
    BoneFamily {
        stems: &["mTail"],
        indices: Some((1, 6)),
        sides: NO_SIDE,
    },
    // Spine: mSpine1 .. mSpine4
    BoneFamily {
        stems: &["mSpine"],
        indices: Some((1, 4)),
        sides: NO_SIDE,
    },
    // Wings: mWing1Left .. mWing4Right, mWing4FanLeft
    BoneFamily {
        stems: &["mWing"],
        indices: Some((1, 4)),
        sides: SIDES,
    },
    BoneFamily {
        stems: &["mWing4Fan"],
        indices: None,
        sides: SIDES,
    },
    // Auxiliary limbs: mHindLimb1Left .. mHindLimb4Right
    BoneFamily {
        stems: &["mHindLimb"],
        indices: Some((1, 4)),
        sides: SIDES,
    },
    // Face rig: <region><subpart><side>
    BoneFamily {
        stems: &[
            "mFaceEyebrowOuter",
            "mFaceEyebrowCenter",
            "mFaceEyebrowInner",
            "mFaceEyeLidUpper",
            "mFaceEyeLidLower",
            "mFaceEyeAlt",
            "mFaceEyecornerInner",
            "mFaceForehead",
            "mFaceNose",
            "mFaceCheekUpper",
            "mFaceCheekLower",
            "mFaceLipUpper",
            "mFaceLipLower",
            "mFaceLipCorner",
        ],
        indices: None,
        sides: SIDES,
    },
    BoneFamily {
        stems: &["mFaceEar"],
        indices: Some((1, 2)),
        sides: SIDES,
    },
];

impl BoneFamily {
    /// Whether `name` is a member of this family
    pub fn matches(&self, name: &str) -> bool {
        self.stems.iter().any(|stem| {
            name.strip_prefix(stem)
                .is_some_and(|rest| self.matches_suffix(rest))
        })
    }

    fn matches_suffix(&self, rest: &str) -> bool {
        let side = match self.indices {
            None => rest,
            Some((min, max)) => {
                let digits = rest.len() - rest.trim_start_matches(|c: char| c.is_ascii_digit()).len();
                // Indices are written without padding: "mTail1", never "mTail01"
                if digits == 0 || rest.starts_with('0') {
                    return false;
                }
                match rest[..digits].parse::<u8>() {
                    Ok(index) if (min..=max).contains(&index) => &rest[digits..],
                    _ => return false,
                }
            }
        };
        self.sides.contains(&side)
    }
}
