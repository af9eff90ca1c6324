//! anim-export - avatar animation export tool
//!
//! Samples skeletal animation from glTF/GLB files into `.anim` assets.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

// Use modules from library
use anim_export::animation::{export_animation, ExportSettings};
use anim_export::formats::{read_anim, read_constraints, ANIM_EXT};
use anim_export::gltf_host::{list_contents, GltfOptions, GltfScene, Selector};
use anim_export::manifest;

#[derive(Parser)]
#[command(name = "anim-export")]
#[command(about = "Avatar animation export tool")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Export one animation clip from glTF
    Export {
        /// Input glTF/GLB file
        input: PathBuf,

        /// Output .anim file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Animation index or name (default: first animation)
        #[arg(short, long)]
        animation: Option<Selector>,

        /// Skin index or name (default: first skin)
        #[arg(short, long)]
        skin: Option<Selector>,

        /// Frame rate for sampling (default: 30)
        #[arg(short, long)]
        frame_rate: Option<f32>,

        /// Base and joint priority
        #[arg(short, long, default_value_t = anim_export::animation::DEFAULT_PRIORITY)]
        priority: u32,

        /// Loop the animation
        #[arg(long = "loop")]
        looping: bool,

        /// Loop start frame (default: first frame)
        #[arg(long)]
        loop_in: Option<i32>,

        /// Loop end frame (default: last frame)
        #[arg(long)]
        loop_out: Option<i32>,

        /// Ease-in duration in seconds
        #[arg(long, default_value_t = anim_export::animation::DEFAULT_EASE)]
        ease_in: f32,

        /// Ease-out duration in seconds
        #[arg(long, default_value_t = anim_export::animation::DEFAULT_EASE)]
        ease_out: f32,

        /// Export translation of bones other than mPelvis
        #[arg(long)]
        translations: bool,

        /// Also write the document as <output>.json
        #[arg(long)]
        dump_json: bool,

        /// Emote name stored in the header
        #[arg(long, default_value = "")]
        emote: String,

        /// JSON file with constraint records
        #[arg(long)]
        constraints: Option<PathBuf>,

        /// Accept an additional bone name (repeatable)
        #[arg(long = "extra-bone")]
        extra_bones: Vec<String>,
    },

    /// Export animations from a manifest file
    Build {
        /// Path to anims.toml manifest
        #[arg(default_value = "anims.toml")]
        manifest: PathBuf,

        /// Output directory (overrides manifest)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Validate manifest without exporting
    Check {
        /// Path to anims.toml manifest
        #[arg(default_value = "anims.toml")]
        manifest: PathBuf,
    },

    /// Print the contents of an .anim file
    Inspect {
        /// Input .anim file
        input: PathBuf,

        /// Print every key
        #[arg(long)]
        keys: bool,
    },

    /// List skins and animations in a glTF file
    List {
        /// Input glTF/GLB file
        input: PathBuf,
    },
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Export {
            input,
            output,
            animation,
            skin,
            frame_rate,
            priority,
            looping,
            loop_in,
            loop_out,
            ease_in,
            ease_out,
            translations,
            dump_json,
            emote,
            constraints,
            extra_bones,
        } => {
            let output = output.unwrap_or_else(|| input.with_extension(ANIM_EXT));
            tracing::info!("Exporting animation {:?} -> {:?}", input, output);

            let settings = ExportSettings {
                priority,
                looping,
                loop_in_frame: loop_in,
                loop_out_frame: loop_out,
                ease_in,
                ease_out,
                export_translations: translations,
                dump_json,
                emote_name: emote,
                extra_bones,
            };
            let constraints = match constraints {
                Some(path) => read_constraints(&path)?,
                None => Vec::new(),
            };
            let options = GltfOptions {
                animation,
                skin,
                frame_rate,
            };

            let mut scene = GltfScene::load(&input, &options)?;
            export_animation(&mut scene, &settings, &constraints, &output)?;
            tracing::info!("Done!");
        }

        Commands::Build {
            manifest,
            output,
            verbose,
        } => {
            if verbose {
                tracing::info!("Building animations from {:?}", manifest);
            }
            let config = manifest::load_manifest(&manifest)?;
            let written = manifest::build_all(&config, output.as_deref())?;
            tracing::info!("Build complete! {} animations exported", written.len());
        }

        Commands::Check { manifest } => {
            tracing::info!("Checking manifest {:?}", manifest);
            let config = manifest::load_manifest(&manifest)?;
            manifest::validate(&config)?;
            tracing::info!("Manifest is valid!");
        }

        Commands::Inspect { input, keys } => {
            let anim = read_anim(&input)?;
            let header = &anim.header;
            let params = &anim.params;
            tracing::info!(
                "{:?}: version {}.{}, priority {}, {:.3}s, emote '{}'",
                input,
                header.version,
                header.sub_version,
                header.base_priority,
                header.duration,
                anim.emote_name
            );
            tracing::info!(
                "  loop {} ({:.3}s..{:.3}s), ease in {:.3}s, ease out {:.3}s, hand pose {}",
                params.looping != 0,
                params.loop_in_point,
                params.loop_out_point,
                params.ease_in_duration,
                params.ease_out_duration,
                params.hand_pose
            );
            tracing::info!(
                "  {} joints, {} constraints",
                anim.joints.len(),
                anim.constraints.len()
            );
            for joint in &anim.joints {
                tracing::info!(
                    "  '{}': priority {}, {} rotation keys, {} position keys",
                    joint.name,
                    joint.priority,
                    joint.rotation_keys.len(),
                    joint.position_keys.len()
                );
                if keys {
                    for (time, [x, y, z, w]) in joint.rotations() {
                        tracing::info!(
                            "    rot t={:5} ({:.4}, {:.4}, {:.4}, {:.4})",
                            time,
                            x,
                            y,
                            z,
                            w
                        );
                    }
                    for (time, [x, y, z]) in joint.positions() {
                        tracing::info!("    pos t={:5} ({:.4}, {:.4}, {:.4})", time, x, y, z);
                    }
                }
            }
            for constraint in &anim.constraints {
                tracing::info!(
                    "  constraint: type {}, chain {}, '{}' -> '{}'",
                    constraint.constraint_type,
                    constraint.chain_length,
                    constraint.source_volume,
                    constraint.target_volume
                );
            }
        }

        Commands::List { input } => {
            list_contents(&input)?;
        }
    }

    Ok(())
}
