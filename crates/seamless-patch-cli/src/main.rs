use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use seamless_patch_core::prelude::*;
use seamless_patch_core::save_mask_png;
use serde::Deserialize;
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "seamless-patch",
    about = "Crop an image region for external editing and blend the edit back seamlessly",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Base data directory (originals/, patches/, edited_patches/, outputs/ below it)
    #[arg(long, global = true, help_heading = "Layout")]
    data_dir: Option<PathBuf>,
    /// YAML file overriding individual layout roots
    #[arg(long, global = true, help_heading = "Layout")]
    layout: Option<PathBuf>,
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action=ArgAction::Count, global=true, help_heading = "Logging/UX")]
    verbose: u8,
    /// Quiet mode (overrides verbose)
    #[arg(
        short,
        long,
        default_value_t = false,
        global = true,
        help_heading = "Logging/UX"
    )]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Crop a padded region and write the patch + session metadata
    Prepare(PrepareArgs),
    /// Blend the edited patch of a session back into the original
    Blend(BlendArgs),
    /// Write the soft mask for a given patch size (inspection/debugging)
    Mask(MaskArgs),
}

#[derive(Parser, Debug, Clone)]
struct PrepareArgs {
    /// Image name (resolved to <originals>/<image>.png)
    image: String,
    x1: u32,
    y1: u32,
    x2: u32,
    y2: u32,
    /// Padding in pixels added around the region
    padding: u32,
    /// Session name used for all derived file names
    session: String,
    /// Print the crop record as JSON instead of the next-steps guide
    #[arg(long, default_value_t = false)]
    json: bool,
    /// Free-text description of the intended edit
    description: Vec<String>,
}

impl PrepareArgs {
    fn to_request(&self) -> anyhow::Result<PrepareRequest> {
        let inner = BBox::new(self.x1, self.y1, self.x2, self.y2).with_context(|| {
            format!("invalid region ({}, {}, {}, {})", self.x1, self.y1, self.x2, self.y2)
        })?;
        Ok(PrepareRequest {
            image_name: self.image.clone(),
            inner,
            padding: self.padding,
            session_name: self.session.clone(),
            description: self.description.join(" "),
        })
    }
}

#[derive(Parser, Debug, Clone)]
struct BlendArgs {
    /// Image name
    image: String,
    /// Session name given to `prepare`
    session: String,
    /// Show a progress spinner (disable with --progress false or --quiet)
    #[arg(long, default_value_t = true, action=ArgAction::Set, help_heading = "Logging/UX")]
    progress: bool,
    #[command(flatten)]
    mask: MaskOptions,
}

#[derive(Parser, Debug, Clone)]
struct MaskArgs {
    width: u32,
    height: u32,
    padding: u32,
    /// Output PNG path
    out: PathBuf,
    #[command(flatten)]
    mask: MaskOptions,
}

#[derive(Parser, Debug, Clone)]
struct MaskOptions {
    /// Mask blur radius (defaults to the padding)
    #[arg(long, help_heading = "Mask")]
    blur_radius: Option<u32>,
    /// Buffer-zone falloff
    #[arg(long, value_parser = ["literal", "linear"], default_value = "literal", help_heading = "Mask")]
    falloff: String,
}

impl MaskOptions {
    fn to_blend_config(&self) -> anyhow::Result<BlendConfig> {
        let falloff: FalloffMode = self
            .falloff
            .parse()
            .map_err(|_| anyhow::anyhow!("unknown falloff mode: {}", self.falloff))?;
        let cfg = BlendConfig::builder()
            .blur_radius(self.blur_radius)
            .falloff(falloff)
            .build();
        cfg.validate()?;
        Ok(cfg)
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing_with_level(cli.quiet, cli.verbose);
    let layout = resolve_layout(cli.data_dir.as_deref(), cli.layout.as_deref())?;
    match &cli.command {
        Commands::Prepare(args) => run_prepare(&layout, args, cli.quiet),
        Commands::Blend(args) => run_blend(&layout, args, args.progress && !cli.quiet),
        Commands::Mask(args) => run_mask(args),
    }
}

fn run_prepare(layout: &WorkspaceLayout, args: &PrepareArgs, quiet: bool) -> anyhow::Result<()> {
    let req = args.to_request()?;
    let inner = req.inner;
    info!(
        source = %layout.original_image(&req.image_name).display(),
        region = %inner,
        w = inner.width(),
        h = inner.height(),
        padding = req.padding,
        "preparing patch"
    );
    let prepared = prepare_patch(layout, &req)
        .with_context(|| format!("prepare session {} for {}", req.session_name, req.image_name))?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&prepared.record)?);
    } else if !quiet {
        print_next_steps(&args.image, &prepared.record);
    }
    Ok(())
}

fn print_next_steps(image: &str, record: &CropRecord) {
    let rule = "=".repeat(70);
    let bbox = record.buffered_bbox;
    println!("{rule}");
    println!("Patch ready: {}", record.session_name);
    println!("  buffered bbox: {} ({}x{} px)", bbox, bbox.width(), bbox.height());
    println!("{rule}");
    println!("NEXT STEPS:");
    println!("1. Open the patch for editing:");
    println!("   {}", record.patch_path.display());
    println!("2. Apply this edit:");
    if record.description.is_empty() {
        println!("   [your edit description here]");
    } else {
        println!("   '{}'", record.description);
    }
    if let Some(edited) = &record.edited_patch_path {
        println!("3. Save the edited version to:");
        println!("   {}", edited.display());
    }
    println!("4. Blend it back:");
    println!("   seamless-patch blend {} {}", image, record.session_name);
    println!("{rule}");
}

fn run_blend(layout: &WorkspaceLayout, args: &BlendArgs, show_progress: bool) -> anyhow::Result<()> {
    let cfg = args.mask.to_blend_config()?;
    let spinner = if show_progress {
        let b = ProgressBar::new_spinner();
        b.set_style(ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] {wide_msg}")?);
        b.enable_steady_tick(Duration::from_millis(100));
        b.set_message(format!("blending {}/{}", args.image, args.session));
        Some(b)
    } else {
        None
    };
    let result = blend_result(layout, &args.image, &args.session, &cfg)
        .with_context(|| format!("blend session {} for {}", args.session, args.image));
    if let Some(b) = &spinner {
        b.finish_and_clear();
    }
    let out = result?;
    info!(out = %out.display(), "blend successful");
    println!("{}", out.display());
    Ok(())
}

fn run_mask(args: &MaskArgs) -> anyhow::Result<()> {
    let cfg = args.mask.to_blend_config()?;
    let mask = create_soft_mask(
        args.width,
        args.height,
        args.padding,
        cfg.effective_blur_radius(args.padding),
        cfg.falloff,
    )?;
    save_mask_png(&mask, &args.out).with_context(|| format!("write {}", args.out.display()))?;
    info!(out = %args.out.display(), "mask written");
    Ok(())
}

/// Optional per-root overrides; unset keys keep the base layout.
#[derive(Debug, Deserialize, Default)]
struct LayoutFile {
    originals_root: Option<PathBuf>,
    patches_root: Option<PathBuf>,
    edited_root: Option<PathBuf>,
    outputs_root: Option<PathBuf>,
}

impl LayoutFile {
    fn into_layout(self, mut layout: WorkspaceLayout) -> WorkspaceLayout {
        if let Some(v) = self.originals_root {
            layout.originals_root = v;
        }
        if let Some(v) = self.patches_root {
            layout.patches_root = v;
        }
        if let Some(v) = self.edited_root {
            layout.edited_root = v;
        }
        if let Some(v) = self.outputs_root {
            layout.outputs_root = v;
        }
        layout
    }
}

fn resolve_layout(data_dir: Option<&Path>, file: Option<&Path>) -> anyhow::Result<WorkspaceLayout> {
    let base = match data_dir {
        Some(dir) => WorkspaceLayout::rooted_at(dir),
        None => WorkspaceLayout::default(),
    };
    let Some(path) = file else {
        return Ok(base);
    };
    let text = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let overrides: LayoutFile =
        serde_yaml::from_str(&text).with_context(|| format!("parse {}", path.display()))?;
    Ok(overrides.into_layout(base))
}

fn init_tracing_with_level(quiet: bool, verbose: u8) {
    let level = if quiet {
        "error".to_string()
    } else {
        match verbose {
            0 => "info".into(),
            1 => "debug".into(),
            _ => "trace".into(),
        }
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(level)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind as ClapErrorKind;

    fn prepare_args(argv: &[&str]) -> PrepareArgs {
        let cli = Cli::try_parse_from(argv).expect("parse");
        match cli.command {
            Commands::Prepare(args) => args,
            other => panic!("expected prepare, got {other:?}"),
        }
    }

    #[test]
    fn json_flag_after_description_is_not_swallowed() {
        let args = prepare_args(&[
            "seamless-patch", "prepare", "portrait", "40", "40", "400", "350", "50", "sky", "add",
            "birds", "--json",
        ]);
        assert!(args.json);
        assert_eq!(args.description, ["add", "birds"]);
        assert_eq!(args.to_request().unwrap().description, "add birds");
    }

    #[test]
    fn description_words_are_joined() {
        let args = prepare_args(&[
            "seamless-patch", "prepare", "portrait", "40", "40", "400", "350", "50", "sky", "Add",
            "birds", "to", "sky",
        ]);
        assert!(!args.json);
        let req = args.to_request().unwrap();
        assert_eq!(req.description, "Add birds to sky");
        assert_eq!(req.inner, BBox::new(40, 40, 400, 350).unwrap());
        assert_eq!(req.session_name, "sky");

        let args = prepare_args(&[
            "seamless-patch", "prepare", "portrait", "40", "40", "400", "350", "50", "sky",
        ]);
        assert_eq!(args.to_request().unwrap().description, "");
    }

    #[test]
    fn degenerate_region_is_rejected() {
        let args = prepare_args(&[
            "seamless-patch", "prepare", "portrait", "40", "40", "40", "350", "50", "sky",
        ]);
        assert!(args.to_request().is_err());
    }

    #[test]
    fn missing_arguments_are_a_usage_error() {
        let err = Cli::try_parse_from(["seamless-patch", "prepare", "portrait", "40"]).unwrap_err();
        assert_eq!(err.kind(), ClapErrorKind::MissingRequiredArgument);
        let err = Cli::try_parse_from(["seamless-patch", "blend", "portrait"]).unwrap_err();
        assert_eq!(err.kind(), ClapErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn unknown_falloff_is_a_usage_error() {
        let err = Cli::try_parse_from([
            "seamless-patch", "blend", "portrait", "sky", "--falloff", "smooth",
        ])
        .unwrap_err();
        assert_eq!(err.kind(), ClapErrorKind::InvalidValue);

        let cli = Cli::try_parse_from([
            "seamless-patch", "blend", "portrait", "sky", "--falloff", "linear", "--blur-radius",
            "7",
        ])
        .expect("parse");
        let Commands::Blend(args) = cli.command else {
            panic!("expected blend");
        };
        let cfg = args.mask.to_blend_config().unwrap();
        assert_eq!(cfg.falloff, FalloffMode::Linear);
        assert_eq!(cfg.blur_radius, Some(7));
    }

    #[test]
    fn oversized_blur_radius_is_rejected() {
        let cli = Cli::try_parse_from([
            "seamless-patch", "mask", "64", "64", "8", "m.png", "--blur-radius", "100000",
        ])
        .expect("parse");
        let Commands::Mask(args) = cli.command else {
            panic!("expected mask");
        };
        assert!(args.mask.to_blend_config().is_err());
    }

    #[test]
    fn progress_flag_belongs_to_blend() {
        let cli = Cli::try_parse_from(["seamless-patch", "blend", "portrait", "sky", "--progress", "false"])
            .expect("parse");
        let Commands::Blend(args) = cli.command else {
            panic!("expected blend");
        };
        assert!(!args.progress);

        let cli = Cli::try_parse_from(["seamless-patch", "blend", "portrait", "sky"]).expect("parse");
        let Commands::Blend(args) = cli.command else {
            panic!("expected blend");
        };
        assert!(args.progress);

        let err = Cli::try_parse_from([
            "seamless-patch", "mask", "64", "64", "8", "m.png", "--progress", "false",
        ])
        .unwrap_err();
        assert_eq!(err.kind(), ClapErrorKind::UnknownArgument);
    }

    #[test]
    fn layout_file_overrides_data_dir_roots() {
        let dir = tempfile::tempdir().expect("tempdir");
        let yaml = dir.path().join("layout.yaml");
        fs::write(&yaml, "edited_root: /mnt/edits\noutputs_root: results\n").unwrap();

        let layout = resolve_layout(Some(Path::new("work")), Some(&yaml)).expect("layout");
        assert_eq!(layout.originals_root, PathBuf::from("work/originals"));
        assert_eq!(layout.patches_root, PathBuf::from("work/patches"));
        assert_eq!(layout.edited_root, PathBuf::from("/mnt/edits"));
        assert_eq!(layout.outputs_root, PathBuf::from("results"));

        let layout = resolve_layout(None, Some(&yaml)).expect("layout");
        assert_eq!(layout.originals_root, PathBuf::from("data/originals"));
        assert_eq!(layout.edited_root, PathBuf::from("/mnt/edits"));

        assert_eq!(resolve_layout(None, None).unwrap(), WorkspaceLayout::default());
        assert!(resolve_layout(None, Some(&dir.path().join("absent.yaml"))).is_err());
    }

    #[test]
    fn mask_command_writes_grayscale_png() {
        let dir = tempfile::tempdir().expect("tempdir");
        let out = dir.path().join("nested").join("mask.png");
        let out_arg = out.to_string_lossy().into_owned();
        let cli = Cli::try_parse_from([
            "seamless-patch", "mask", "48", "32", "6", out_arg.as_str(), "--falloff", "linear",
            "--blur-radius", "0",
        ])
        .expect("parse");
        let Commands::Mask(args) = cli.command else {
            panic!("expected mask");
        };
        run_mask(&args).expect("run mask");

        let img = image::open(&out).expect("reopen");
        assert_eq!(img.color(), image::ColorType::L8);
        assert_eq!(img.width(), 48);
        assert_eq!(img.height(), 32);
        let luma = img.to_luma8();
        assert_eq!(luma.get_pixel(24, 16)[0], 255);
        assert_eq!(luma.get_pixel(0, 16)[0], 0);
    }
}
