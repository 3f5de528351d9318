use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::{info, Level};

use vace_sequence::{
    config::Config,
    nodes::NodeRegistry,
    ops::{ClipDoctor, KeyframeInserter, MaskRangeEditor, SequenceSplicer},
    range::RangeSpec,
    sequence::{io, MaskSequence, SequencePair},
};

#[derive(Parser)]
#[command(
    name = "vace-sequence",
    version,
    about = "Edit frame and mask sequences for video inpainting",
    long_about = "VACE Sequence prepares image/mask sequence pairs for video inpainting: insert keyframes, force mask frames white or black, grey out frames and splice clips together."
)]
struct Cli {
    /// Configuration file (optional)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Overwrite frames at listed positions with keyframe images
    Keyframes(KeyframesArgs),
    /// Set mask frames to white or black by range
    Masks(MasksArgs),
    /// Grey out image frames and set mask frames by range
    Doctor(DoctorArgs),
    /// Overlay a second sequence onto the first at a frame offset
    Splice(SpliceArgs),
    /// List the available graph nodes and their ports
    Nodes,
}

#[derive(Args)]
struct KeyframesArgs {
    /// Directory of input frames
    #[arg(short, long)]
    images: PathBuf,

    /// Directory of input masks (defaults to fully white)
    #[arg(short, long)]
    masks: Option<PathBuf>,

    /// Comma-separated target positions, e.g. "0,15,30"
    #[arg(short, long)]
    positions: String,

    /// Keyframe image, one per position in listed order
    #[arg(short, long = "keyframe", required = true)]
    keyframes: Vec<PathBuf>,

    /// Mask value written at keyframe positions
    #[arg(long)]
    mask_value: Option<f32>,

    /// Output directory (receives images/ and masks/)
    #[arg(short, long)]
    output: PathBuf,
}

#[derive(Args)]
struct MasksArgs {
    /// Directory of input masks
    #[arg(short, long)]
    masks: PathBuf,

    /// Frames to set white, e.g. "0-10,15"
    #[arg(short, long, default_value = "")]
    white: String,

    /// Frames to set black, e.g. "20-25"
    #[arg(short, long, default_value = "")]
    black: String,

    /// Output directory (receives masks/)
    #[arg(short, long)]
    output: PathBuf,
}

#[derive(Args)]
struct DoctorArgs {
    /// Directory of input frames
    #[arg(short, long)]
    images: PathBuf,

    /// Directory of input masks
    #[arg(short, long)]
    masks: PathBuf,

    /// Frames to replace with flat grey
    #[arg(short, long, default_value = "")]
    grey: String,

    /// Frames to set white in the mask
    #[arg(short, long, default_value = "")]
    white: String,

    /// Frames to set black in the mask
    #[arg(short, long, default_value = "")]
    black: String,

    /// Output directory (receives images/ and masks/)
    #[arg(short, long)]
    output: PathBuf,
}

#[derive(Args)]
struct SpliceArgs {
    /// Directory of the first image sequence
    #[arg(long)]
    first: PathBuf,

    /// Masks for the first sequence
    #[arg(long)]
    first_masks: Option<PathBuf>,

    /// Directory of the second image sequence
    #[arg(long)]
    second: PathBuf,

    /// Masks for the second sequence
    #[arg(long)]
    second_masks: Option<PathBuf>,

    /// Frame index where the second sequence starts; may be negative
    #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
    offset: i64,

    /// Output directory (receives images/ and masks/)
    #[arg(short, long)]
    output: PathBuf,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt().with_max_level(log_level).init();

    info!("Starting VACE Sequence v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = match &cli.config {
        Some(config_path) => {
            info!("Loading configuration from {:?}", config_path);
            Config::from_file(config_path)?
        }
        None => {
            info!("Using default configuration");
            Config::default()
        }
    };

    rayon::ThreadPoolBuilder::new()
        .num_threads(config.processing.threads)
        .build_global()
        .context("failed to size the worker pool")?;

    match cli.command {
        Command::Keyframes(args) => run_keyframes(&config, args),
        Command::Masks(args) => run_masks(args),
        Command::Doctor(args) => run_doctor(&config, args),
        Command::Splice(args) => run_splice(&config, args),
        Command::Nodes => {
            list_nodes(&config);
            Ok(())
        }
    }
}

fn load_optional_masks(dir: Option<&Path>) -> Result<Option<MaskSequence>> {
    dir.map(io::load_masks).transpose().map_err(Into::into)
}

/// Log what a range argument selects; parse errors are left to the operation
fn log_selection(label: &str, text: &str) {
    if let Ok(spec) = RangeSpec::parse(text) {
        if !spec.is_empty() {
            info!("{}: {} frames [{}]", label, spec.len(), spec);
        }
    }
}

fn write_pair(pair: &SequencePair, output: &Path) -> Result<()> {
    io::save_frames(&pair.images, output.join("images"))?;
    io::save_masks(&pair.masks, output.join("masks"))?;
    info!("Wrote {} frames to {:?}", pair.len(), output);
    Ok(())
}

fn run_keyframes(config: &Config, args: KeyframesArgs) -> Result<()> {
    let images = io::load_frames(&args.images)?;
    let masks = load_optional_masks(args.masks.as_deref())?;
    let slots = args
        .keyframes
        .iter()
        .map(|path| {
            io::load_frame(path)
                .map(Some)
                .with_context(|| format!("failed to load keyframe {:?}", path))
        })
        .collect::<Result<Vec<_>>>()?;

    let inserter = KeyframeInserter::new(config.keyframe.clone());
    let pair = inserter
        .insert(&images, masks.as_ref(), &args.positions, &slots, args.mask_value)
        .map_err(|e| anyhow::anyhow!(e.user_message()))?;

    info!("Inserted {} keyframes at [{}]", slots.len(), args.positions);
    write_pair(&pair, &args.output)
}

fn run_masks(args: MasksArgs) -> Result<()> {
    let masks = io::load_masks(&args.masks)?;
    log_selection("White", &args.white);
    log_selection("Black", &args.black);
    let edited = MaskRangeEditor::new()
        .edit(&masks, &args.white, &args.black)
        .map_err(|e| anyhow::anyhow!(e.user_message()))?;

    io::save_masks(&edited, args.output.join("masks"))?;
    info!("Wrote {} masks to {:?}", edited.len(), args.output);
    Ok(())
}

fn run_doctor(config: &Config, args: DoctorArgs) -> Result<()> {
    let images = io::load_frames(&args.images)?;
    let masks = io::load_masks(&args.masks)?;
    log_selection("Grey", &args.grey);
    log_selection("White", &args.white);
    log_selection("Black", &args.black);

    let pair = ClipDoctor::new(config.fill.grey_level)
        .doctor(&images, &masks, &args.grey, &args.white, &args.black)
        .map_err(|e| anyhow::anyhow!(e.user_message()))?;
    write_pair(&pair, &args.output)
}

fn run_splice(config: &Config, args: SpliceArgs) -> Result<()> {
    let first = io::load_frames(&args.first)?;
    let first_masks = load_optional_masks(args.first_masks.as_deref())?;
    let second = io::load_frames(&args.second)?;
    let second_masks = load_optional_masks(args.second_masks.as_deref())?;

    let splicer = SequenceSplicer::new(config.splice.clone(), config.fill.grey_level);
    let pair = splicer
        .splice(
            &first,
            first_masks.as_ref(),
            &second,
            second_masks.as_ref(),
            args.offset,
        )
        .map_err(|e| anyhow::anyhow!(e.user_message()))?;

    info!("Spliced at offset {} into {} frames", args.offset, pair.len());
    write_pair(&pair, &args.output)
}

fn list_nodes(config: &Config) {
    let registry = NodeRegistry::with_config(config);
    for name in registry.available_nodes() {
        let Some(node) = registry.get_node(&name) else {
            continue;
        };
        println!("{} ({}) [{}]", node.name(), node.display_name(), node.category());
        println!("    {}", node.description());
        for port in node.inputs() {
            let marker = if port.required { "required" } else { "optional" };
            println!("    in  {:<22} {:<22} {}", port.name, port.port_type.to_string(), marker);
        }
        for port in node.outputs() {
            println!("    out {:<22} {}", port.name, port.port_type);
        }
    }
}
