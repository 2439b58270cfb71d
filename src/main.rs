//! ddsdecode CLI
//!
//! Command-line host for inspecting DDS textures and converting them to PNG.

use std::fs;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::{debug, error, info};

use ddsdecode_parsers::{
    dds::DdsHeader,
    dds_registration,
    logging::{self, TracingConfig},
    ColorModel, CompressionKind, DdsError, DecodeOptions, DecoderRegistry, Dimensions, ImageInfo,
    RegistryError,
};

/// ddsdecode - DirectDraw Surface texture decoder
#[derive(Parser)]
#[command(name = "ddsdecode")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Output format for structured data
    #[arg(long, global = true, default_value = "text")]
    format: OutputFormat,

    /// Also require the declared header and pixel format sizes
    #[arg(long, global = true)]
    strict: bool,

    /// Refuse surfaces larger than this many MiB once decoded
    #[arg(long, global = true, default_value = "512")]
    max_surface_mib: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown format: {}", s)),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Show dimensions, compression and color model of DDS files
    Info(InfoArgs),

    /// Decode DDS files to PNG
    Convert(ConvertArgs),

    /// List the registered decoders
    Decoders,
}

#[derive(Args)]
struct InfoArgs {
    /// DDS files to inspect
    #[arg(required = true)]
    files: Vec<PathBuf>,
}

#[derive(Args)]
struct ConvertArgs {
    /// DDS files to convert
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Output directory
    #[arg(short, long)]
    out_dir: PathBuf,

    /// Number of parallel conversion threads (0 = one per core)
    #[arg(long, default_value = "0")]
    threads: usize,

    /// Overwrite existing files
    #[arg(long)]
    overwrite: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_with_config(TracingConfig::default().with_verbosity(cli.verbose));

    let options = DecodeOptions {
        strict_validation: cli.strict,
        max_surface_bytes: cli.max_surface_mib.saturating_mul(1024 * 1024),
    };

    let mut registry = DecoderRegistry::new();
    registry
        .register(dds_registration(options.clone()))
        .context("Failed to register DDS decoder")?;

    match cli.command {
        Commands::Info(args) => cmd_info(&registry, &options, args, cli.format),
        Commands::Convert(args) => cmd_convert(&registry, args, cli.format),
        Commands::Decoders => cmd_decoders(&registry, cli.format),
    }
}

fn cmd_decoders(registry: &DecoderRegistry, format: OutputFormat) -> Result<()> {
    let decoders = registry.list();

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&decoders)?);
        }
        OutputFormat::Text => {
            println!("Registered decoders:");
            for decoder in &decoders {
                println!(
                    "  {:<8} {:<24} priority {:<4} .{}",
                    decoder.id,
                    decoder.name,
                    decoder.priority,
                    decoder.extensions.join(", .")
                );
            }
        }
    }

    Ok(())
}

/// Header summary as printed by `info`; the color model may be unrecognized
struct FileInfo {
    path: PathBuf,
    dimensions: Dimensions,
    compression: CompressionKind,
    color_model: Option<ColorModel>,
    mipmap_count: u32,
}

impl FileInfo {
    fn new(path: &Path, info: ImageInfo) -> Self {
        Self {
            path: path.to_path_buf(),
            dimensions: info.dimensions,
            compression: info.compression,
            color_model: Some(info.color_model),
            mipmap_count: info.mipmap_count,
        }
    }
}

fn cmd_info(
    registry: &DecoderRegistry,
    options: &DecodeOptions,
    args: InfoArgs,
    format: OutputFormat,
) -> Result<()> {
    let mut reports = Vec::with_capacity(args.files.len());

    for path in &args.files {
        reports.push(inspect_file(registry, options, path)?);
    }

    match format {
        OutputFormat::Json => {
            let json: Vec<_> = reports
                .iter()
                .map(|r| {
                    serde_json::json!({
                        "path": r.path,
                        "width": r.dimensions.width,
                        "height": r.dimensions.height,
                        "compression": r.compression,
                        "color_model": r.color_model,
                        "mipmap_count": r.mipmap_count,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        OutputFormat::Text => {
            for report in &reports {
                let model = report
                    .color_model
                    .map_or_else(|| "unknown".to_string(), |m| m.to_string());

                println!("DDS Texture: {}", report.path.display());
                println!("  Dimensions:   {}", report.dimensions);
                println!("  Compression:  {}", report.compression);
                println!("  Color model:  {}", model);
                println!("  Mipmaps:      {}", report.mipmap_count);
            }
        }
    }

    Ok(())
}

fn inspect_file(registry: &DecoderRegistry, options: &DecodeOptions, path: &Path) -> Result<FileInfo> {
    let file = fs::File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;

    match registry.describe(BufReader::new(file)) {
        Ok(info) => Ok(FileInfo::new(path, info)),
        Err(RegistryError::Decode(DdsError::UnsupportedPixelFormat { flags, rgb_bit_count })) => {
            debug!(path = %path.display(), flags, rgb_bit_count, "No color model for pixel format");

            // Re-read the header alone to report everything but the color model
            let file = fs::File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
            let header = DdsHeader::read(&mut BufReader::new(file), options.strict_validation)
                .with_context(|| format!("Failed to read header of {}", path.display()))?;

            Ok(FileInfo {
                path: path.to_path_buf(),
                dimensions: header.dimensions(),
                compression: header.compression(),
                color_model: None,
                mipmap_count: header.mipmap_count,
            })
        }
        Err(e) => Err(e).with_context(|| format!("Failed to describe {}", path.display())),
    }
}

fn cmd_convert(registry: &DecoderRegistry, args: ConvertArgs, format: OutputFormat) -> Result<()> {
    use rayon::prelude::*;

    fs::create_dir_all(&args.out_dir).context("Failed to create output directory")?;

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(args.threads)
        .build()
        .context("Failed to build thread pool")?;

    info!(files = args.files.len(), threads = pool.current_num_threads(), "Converting textures");

    let results: Vec<(PathBuf, Result<Option<PathBuf>>)> = pool.install(|| {
        args.files
            .par_iter()
            .map(|path| (path.clone(), convert_file(registry, path, &args.out_dir, args.overwrite)))
            .collect()
    });

    let mut converted = 0;
    let mut skipped = 0;
    let mut errors = 0;

    for (path, result) in &results {
        match result {
            Ok(Some(output)) => {
                converted += 1;
                debug!("Converted {} -> {}", path.display(), output.display());
            }
            Ok(None) => skipped += 1,
            Err(e) => {
                errors += 1;
                error!("Failed to convert {}: {:#}", path.display(), e);
            }
        }
    }

    match format {
        OutputFormat::Json => {
            let json = serde_json::json!({
                "converted": converted,
                "skipped": skipped,
                "errors": errors,
            });
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        OutputFormat::Text => {
            println!("Conversion complete:");
            println!("  Converted: {}", converted);
            println!("  Skipped:   {}", skipped);
            println!("  Errors:    {}", errors);
        }
    }

    if errors > 0 {
        bail!("{} of {} files failed to convert", errors, results.len());
    }

    Ok(())
}

/// Decode one file and write it as PNG; `None` if the output already exists
fn convert_file(
    registry: &DecoderRegistry,
    path: &Path,
    out_dir: &Path,
    overwrite: bool,
) -> Result<Option<PathBuf>> {
    let stem = path
        .file_stem()
        .with_context(|| format!("No file name in {}", path.display()))?;
    let output = out_dir.join(format!("{}.png", stem.to_string_lossy()));

    if output.exists() && !overwrite {
        debug!("Skipping existing file: {}", output.display());
        return Ok(None);
    }

    let file = fs::File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let name = path.display().to_string();
    let surface = logging::instrument_decode(&name, || registry.decode(BufReader::new(file)))
        .with_context(|| format!("Failed to decode {}", path.display()))?;

    let (width, height) = (surface.width(), surface.height());
    let image = image::RgbaImage::from_raw(width, height, surface.into_rgba8())
        .context("Decoded surface does not match its dimensions")?;

    image
        .save_with_format(&output, image::ImageFormat::Png)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    Ok(Some(output))
}
