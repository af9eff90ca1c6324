//! Manifest parsing and batch export
//!
//! Parses anims.toml and exports every listed clip.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use crate::animation::{export_animation, ExportSettings};
use crate::formats::{read_constraints, ANIM_EXT};
use crate::gltf_host::{GltfOptions, GltfScene, Selector};

/// Root manifest structure
#[derive(Debug, Deserialize)]
pub struct AnimManifest {
    #[serde(default)]
    pub output: OutputConfig,
    /// Settings shared by every entry
    #[serde(default)]
    pub defaults: ExportSettings,
    /// Entries keyed by output name (`wave` -> `wave.anim`)
    #[serde(default)]
    pub animations: BTreeMap<String, AnimEntry>,
    /// Directory relative paths are resolved against
    #[serde(skip)]
    pub base_dir: PathBuf,
}

#[derive(Debug, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("anims/")
}

/// One clip to export
#[derive(Debug, Deserialize)]
pub struct AnimEntry {
    /// glTF/GLB source
    pub input: PathBuf,
    /// Output file, relative to the output directory (default `<name>.anim`)
    #[serde(default)]
    pub output: Option<PathBuf>,
    #[serde(default)]
    pub animation: Option<Selector>,
    #[serde(default)]
    pub skin: Option<Selector>,
    #[serde(default)]
    pub frame_rate: Option<f32>,
    /// JSON array of constraint records
    #[serde(default)]
    pub constraints: Option<PathBuf>,
    #[serde(flatten)]
    pub overrides: SettingsOverrides,
}

impl AnimEntry {
    pub fn gltf_options(&self) -> GltfOptions {
        GltfOptions {
            animation: self.animation.clone(),
            skin: self.skin.clone(),
            frame_rate: self.frame_rate,
        }
    }
}

/// Per-entry replacements for [`ExportSettings`] fields
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SettingsOverrides {
    pub priority: Option<u32>,
    #[serde(rename = "loop")]
    pub looping: Option<bool>,
    pub loop_in_frame: Option<i32>,
    pub loop_out_frame: Option<i32>,
    pub ease_in: Option<f32>,
    pub ease_out: Option<f32>,
    pub export_translations: Option<bool>,
    pub dump_json: Option<bool>,
    pub emote_name: Option<String>,
    pub extra_bones: Option<Vec<String>>,
}

impl SettingsOverrides {
    /// `base` with every set field replaced
    pub fn apply(&self, base: &ExportSettings) -> ExportSettings {
        let mut settings = base.clone();
        if let Some(priority) = self.priority {
            settings.priority = priority;
        }
        if let Some(looping) = self.looping {
            settings.looping = looping;
        }
        if self.loop_in_frame.is_some() {
            settings.loop_in_frame = self.loop_in_frame;
        }
        if self.loop_out_frame.is_some() {
            settings.loop_out_frame = self.loop_out_frame;
        }
        if let Some(ease_in) = self.ease_in {
            settings.ease_in = ease_in;
        }
        if let Some(ease_out) = self.ease_out {
            settings.ease_out = ease_out;
        }
        if let Some(export_translations) = self.export_translations {
            settings.export_translations = export_translations;
        }
        if let Some(dump_json) = self.dump_json {
            settings.dump_json = dump_json;
        }
        if let Some(emote_name) = &self.emote_name {
            settings.emote_name = emote_name.clone();
        }
        if let Some(extra_bones) = &self.extra_bones {
            settings.extra_bones = extra_bones.clone();
        }
        settings
    }
}

impl AnimManifest {
    /// Parse manifest text; relative paths resolve against `base_dir`
    pub fn parse(content: &str, base_dir: &Path) -> Result<Self> {
        let mut manifest: AnimManifest = toml::from_str(content)?;
        manifest.base_dir = base_dir.to_path_buf();
        Ok(manifest)
    }

    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    /// Effective settings of one entry
    pub fn settings_for(&self, entry: &AnimEntry) -> ExportSettings {
        entry.overrides.apply(&self.defaults)
    }

    /// Where the entry `name` is written inside `output_dir`
    pub fn output_path(&self, name: &str, entry: &AnimEntry, output_dir: &Path) -> PathBuf {
        match &entry.output {
            Some(path) => output_dir.join(path),
            None => output_dir.join(format!("{}.{}", name, ANIM_EXT)),
        }
    }
}

/// Load and parse a manifest file
pub fn load_manifest(path: &Path) -> Result<AnimManifest> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read manifest: {:?}", path))?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new(""));
    AnimManifest::parse(&content, base_dir)
        .with_context(|| format!("Failed to parse manifest: {:?}", path))
}

/// Validate a manifest without exporting
pub fn validate(manifest: &AnimManifest) -> Result<()> {
    if manifest.animations.is_empty() {
        bail!("Manifest lists no animations");
    }
    let mut outputs = HashSet::new();
    for (name, entry) in &manifest.animations {
        let output = manifest.output_path(name, entry, &manifest.output.dir);
        if !outputs.insert(output.clone()) {
            bail!("Animation '{}' writes {:?}, which another entry also writes", name, output);
        }
        let input = manifest.resolve(&entry.input);
        if !input.exists() {
            bail!("Animation '{}' source not found: {:?}", name, input);
        }
        if let Some(constraints) = &entry.constraints {
            read_constraints(&manifest.resolve(constraints))
                .with_context(|| format!("Animation '{}' has invalid constraints", name))?;
        }
        if let Some(rate) = entry.frame_rate {
            if !rate.is_finite() || rate <= 0.0 {
                bail!("Animation '{}' has invalid frame rate {}", name, rate);
            }
        }
        let settings = manifest.settings_for(entry);
        if settings.ease_in < 0.0 || settings.ease_out < 0.0 {
            bail!("Animation '{}' has a negative ease duration", name);
        }
    }
    Ok(())
}

/// Export every animation in a manifest, returning the written paths
pub fn build_all(manifest: &AnimManifest, output_override: Option<&Path>) -> Result<Vec<PathBuf>> {
    let output_dir = match output_override {
        Some(dir) => dir.to_path_buf(),
        None => manifest.resolve(&manifest.output.dir),
    };
    std::fs::create_dir_all(&output_dir)
        .with_context(|| format!("Failed to create output directory: {:?}", output_dir))?;

    let mut written = Vec::with_capacity(manifest.animations.len());
    for (name, entry) in &manifest.animations {
        let input = manifest.resolve(&entry.input);
        let output = manifest.output_path(name, entry, &output_dir);
        if let Some(parent) = output.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create output directory: {:?}", parent))?;
        }
        tracing::info!("Exporting animation: {} -> {:?}", name, output);

        let constraints = match &entry.constraints {
            Some(path) => read_constraints(&manifest.resolve(path))?,
            None => Vec::new(),
        };
        let mut scene = GltfScene::load(&input, &entry.gltf_options())?;
        export_animation(&mut scene, &manifest.settings_for(entry), &constraints, &output)
            .with_context(|| format!("Failed to export animation '{}'", name))?;
        written.push(output);
    }

    Ok(written)
}
