//! Skeleton model and bone filtering
//!
//! Builds the bone arena from the host's rest pose and decides, once per
//! export, which bones carry rotation and translation channels.

pub mod names;

use glam::{Mat4, Vec3};
use hashbrown::{HashMap, HashSet};

use crate::error::ExportError;
use crate::host::{BoneRest, ChannelKind};
use names::{BASE_BONES, BONE_FAMILIES, ROOT_MOTION_BONE, VOLUME_BONES};

// ============================================================================
// Skeleton filter
// ============================================================================

/// Allow-list of bone names understood by the target skeleton
#[derive(Debug, Clone, Default)]
pub struct SkeletonFilter {
    extra: HashSet<String>,
}

impl SkeletonFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept additional names on top of the built-in tables
    pub fn with_extra_bones<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            extra: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether `name` belongs to the target skeleton
    pub fn accepts(&self, name: &str) -> bool {
        is_recognized_bone(name) || self.extra.contains(name)
    }
}

/// Whether `name` is in the built-in base, volume or patterned bone sets
pub fn is_recognized_bone(name: &str) -> bool {
    BASE_BONES.contains(&name)
        || VOLUME_BONES.contains(&name)
        || BONE_FAMILIES.iter().any(|family| family.matches(name))
}

/// Whether `name` is the bone whose translation is exported unconditionally
pub fn is_root_motion_bone(name: &str) -> bool {
    name == ROOT_MOTION_BONE
}

// ============================================================================
// Channel membership
// ============================================================================

/// Bones carrying rotation and translation channels, decided before sampling
#[derive(Debug, Clone, Default)]
pub struct ChannelMembership {
    rotation: HashSet<String>,
    translation: HashSet<String>,
}

impl ChannelMembership {
    /// Decide channel membership from the host's animated channels
    ///
    /// Rotation requires host animation and a recognized name. Translation
    /// additionally requires `export_translations`, except for the root-motion
    /// bone, whose animated translation is always kept.
    pub fn decide(
        filter: &SkeletonFilter,
        animated: &[(String, ChannelKind)],
        export_translations: bool,
    ) -> Self {
        let mut membership = Self::default();
        let mut rejected: HashSet<&str> = HashSet::new();

        for (bone, kind) in animated {
            if !filter.accepts(bone) {
                rejected.insert(bone);
                continue;
            }
            match kind {
                ChannelKind::Rotation => {
                    membership.rotation.insert(bone.clone());
                }
                ChannelKind::Translation => {
                    if export_translations || is_root_motion_bone(bone) {
                        membership.translation.insert(bone.clone());
                    }
                }
            }
        }

        for bone in rejected {
            tracing::debug!("Skipping '{}': not a recognized skeleton bone", bone);
        }

        membership
    }

    pub fn has_rotation(&self, bone: &str) -> bool {
        self.rotation.contains(bone)
    }

    pub fn has_translation(&self, bone: &str) -> bool {
        self.translation.contains(bone)
    }

    pub fn has_any(&self, bone: &str) -> bool {
        self.has_rotation(bone) || self.has_translation(bone)
    }

    pub fn is_empty(&self) -> bool {
        self.rotation.is_empty() && self.translation.is_empty()
    }
}

// ============================================================================
// Bone arena
// ============================================================================

/// One bone of the skeleton, addressed by its index in [`Skeleton::bones`]
#[derive(Debug, Clone)]
pub struct BoneRecord {
    pub name: String,
    pub parent: Option<usize>,
    /// Position in the host's hierarchy list (and in each evaluated pose)
    pub source_index: usize,
    /// Armature space, forward-axis correction applied
    pub rest_world: Mat4,
    pub rest_world_inverse: Mat4,
    /// Rest head, forward-axis correction applied
    pub head: Vec3,
    /// Rest head as authored, before the forward-axis correction
    pub authored_head: Vec3,
}

/// Bone hierarchy stored parents-before-children
#[derive(Debug, Clone)]
pub struct Skeleton {
    bones: Vec<BoneRecord>,
    by_name: HashMap<String, usize>,
    correction: Mat4,
}

impl Skeleton {
    /// Build the arena from the host's rest pose
    ///
    /// `correction` is baked into every armature-space rest transform, the
    /// same as rotating the rig object and applying the rotation.
    pub fn from_rest(rest: &[BoneRest], correction: Mat4) -> Result<Self, ExportError> {
        let mut source_by_name: HashMap<&str, usize> = HashMap::with_capacity(rest.len());
        for (i, bone) in rest.iter().enumerate() {
            if source_by_name.insert(bone.name.as_str(), i).is_some() {
                return Err(ExportError::DuplicateBone(bone.name.clone()));
            }
        }

        // Children lists in source order, plus roots
        let mut source_children: Vec<Vec<usize>> = vec![Vec::new(); rest.len()];
        let mut roots = Vec::new();
        for (i, bone) in rest.iter().enumerate() {
            match &bone.parent {
                Some(parent) => {
                    let &p = source_by_name.get(parent.as_str()).ok_or_else(|| {
                        ExportError::UnknownParent {
                            bone: bone.name.clone(),
                            parent: parent.clone(),
                        }
                    })?;
                    source_children[p].push(i);
                }
                None => roots.push(i),
            }
        }

        // Depth-first from each root so parents always precede children
        let mut order = Vec::with_capacity(rest.len());
        let mut stack: Vec<usize> = roots.into_iter().rev().collect();
        while let Some(i) = stack.pop() {
            order.push(i);
            stack.extend(source_children[i].iter().rev());
        }

        if order.len() != rest.len() {
            let mut reached = vec![false; rest.len()];
            for &i in &order {
                reached[i] = true;
            }
            let first = reached.iter().position(|r| !r).unwrap_or_default();
            return Err(ExportError::CyclicHierarchy(rest[first].name.clone()));
        }

        let mut arena_index = vec![0usize; rest.len()];
        for (arena, &source) in order.iter().enumerate() {
            arena_index[source] = arena;
        }

        let bones: Vec<BoneRecord> = order
            .iter()
            .map(|&source| {
                let bone = &rest[source];
                let parent = bone
                    .parent
                    .as_deref()
                    .and_then(|p| source_by_name.get(p))
                    .map(|&p| arena_index[p]);
                let rest_world = correction * bone.rest_world;
                BoneRecord {
                    name: bone.name.clone(),
                    parent,
                    source_index: source,
                    rest_world,
                    rest_world_inverse: rest_world.inverse(),
                    head: rest_world.w_axis.truncate(),
                    authored_head: bone.rest_world.w_axis.truncate(),
                }
            })
            .collect();

        let by_name = bones
            .iter()
            .enumerate()
            .map(|(i, b)| (b.name.clone(), i))
            .collect();

        Ok(Self {
            bones,
            by_name,
            correction,
        })
    }

    /// Bones, parents before children
    pub fn bones(&self) -> &[BoneRecord] {
        &self.bones
    }

    pub fn get(&self, name: &str) -> Option<&BoneRecord> {
        self.by_name.get(name).map(|&i| &self.bones[i])
    }

    /// Transform baked into the rest pose; must also be applied to evaluated poses
    pub fn correction(&self) -> Mat4 {
        self.correction
    }

    pub fn len(&self) -> usize {
        self.bones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }
}
