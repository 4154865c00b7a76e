use clap::{Parser, Subcommand};
use photo_squeeze::imaging::RustBackend;
use photo_squeeze::types::FileSummary;
use photo_squeeze::{config, output, scan, upload};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "photo-squeeze")]
#[command(about = "Shrink listing photos to fit an upload size limit")]
#[command(long_about = "\
Shrink listing photos to fit an upload size limit

Photos at or under the size limit are copied unchanged. Larger photos are
resized to fit the width/height cap (very large files are scaled down
further) and re-encoded as JPEG, lowering quality up to five times until
the file fits.

Inputs may be files or directories; directories are searched recursively
for JPEG, PNG, WebP and TIFF files.

Settings come from squeeze.toml in the working directory (or --config),
and command-line flags override it. Run 'photo-squeeze gen-config' to
generate a documented squeeze.toml.")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

/// Flags that override `[compression]` settings from the config file.
#[derive(clap::Args, Clone, Default)]
struct CompressionArgs {
    /// Output width cap in pixels
    #[arg(long)]
    max_width: Option<u32>,
    /// Output height cap in pixels
    #[arg(long)]
    max_height: Option<u32>,
    /// Initial JPEG quality (0-1)
    #[arg(long)]
    quality: Option<f32>,
    /// Size limit per file in megabytes
    #[arg(long)]
    max_size_mb: Option<f64>,
}

#[derive(Subcommand)]
enum Command {
    /// Compress photos and write them to the output directory
    Compress {
        /// Image files or directories
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Output directory
        #[arg(long, default_value = "squeezed")]
        output: PathBuf,

        /// Config file (defaults to ./squeeze.toml when present)
        #[arg(long)]
        config: Option<PathBuf>,

        #[command(flatten)]
        overrides: CompressionArgs,

        /// Write a JSON report of every file to this path
        #[arg(long)]
        report: Option<PathBuf>,
    },
    /// List which photos exceed the size limit, without encoding
    Check {
        /// Image files or directories
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Config file (defaults to ./squeeze.toml when present)
        #[arg(long)]
        config: Option<PathBuf>,

        #[command(flatten)]
        overrides: CompressionArgs,
    },
    /// Print a stock squeeze.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "photo_squeeze=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Compress {
            inputs,
            output: output_dir,
            config: config_path,
            overrides,
            report,
        } => {
            let squeeze_config = load_config(config_path.as_deref(), &overrides)?;
            init_thread_pool(&squeeze_config.processing);
            let options = squeeze_config.to_options();

            let collected = scan::collect_inputs(&inputs)?;
            let loaded = scan::load_files(&collected.files);
            let mut unreadable = collected.unreadable;
            unreadable.extend(loaded.unreadable);
            let files = loaded.files;
            let original_bytes: u64 = files.iter().map(|f| f.size()).sum();
            info!("compressing {} files", files.len());

            let (tx, rx) = std::sync::mpsc::channel();
            let printer = std::thread::spawn(move || {
                for event in rx {
                    for line in output::format_compress_event(&event) {
                        println!("{}", line);
                    }
                }
            });
            let batch = upload::prepare_upload(&RustBackend::new(), files, &options, Some(tx));
            printer
                .join()
                .map_err(|_| "progress printer thread panicked")?;

            std::fs::create_dir_all(&output_dir)?;
            for file in &batch.ready {
                std::fs::write(output_dir.join(&file.name), &file.data)?;
            }
            if let Some(report_path) = report {
                let entries: Vec<FileSummary> = batch
                    .report
                    .iter()
                    .cloned()
                    .chain(unreadable.iter().map(unreadable_summary))
                    .collect();
                let json = serde_json::to_string_pretty(&entries)?;
                std::fs::write(&report_path, json)?;
            }

            println!();
            for line in output::format_upload_summary(&batch, original_bytes, &unreadable) {
                println!("{}", line);
            }
            println!("==> Output: {}", output_dir.display());

            let skipped = batch.skipped.len() + unreadable.len();
            if skipped > 0 {
                return Err(format!("{skipped} file(s) skipped").into());
            }
        }
        Command::Check {
            inputs,
            config: config_path,
            overrides,
        } => {
            let squeeze_config = load_config(config_path.as_deref(), &overrides)?;
            let max_bytes = squeeze_config.to_options().max_bytes();

            let collected = scan::collect_inputs(&inputs)?;
            let paths = collected.files;
            let mut unreadable = collected.unreadable.len();
            let mut over = 0;
            for (i, path) in paths.iter().enumerate() {
                let size = match std::fs::metadata(path) {
                    Ok(metadata) => metadata.len(),
                    Err(e) => {
                        warn!("cannot read {}: {}", path.display(), e);
                        unreadable += 1;
                        continue;
                    }
                };
                if size > max_bytes {
                    over += 1;
                }
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string());
                println!("{}", output::format_check_line(i + 1, &name, size, max_bytes));
            }
            println!(
                "==> {} of {} files need compression (limit {})",
                over,
                paths.len(),
                output::format_size(max_bytes)
            );
            if unreadable > 0 {
                return Err(format!("{unreadable} file(s) could not be read").into());
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Load the config file, then apply command-line overrides and re-validate.
fn load_config(
    path: Option<&Path>,
    overrides: &CompressionArgs,
) -> Result<config::SqueezeConfig, config::ConfigError> {
    let mut squeeze_config = config::load_config(path)?;
    let compression = &mut squeeze_config.compression;
    if let Some(w) = overrides.max_width {
        compression.max_width = w;
    }
    if let Some(h) = overrides.max_height {
        compression.max_height = h;
    }
    if let Some(q) = overrides.quality {
        compression.quality = q;
    }
    if let Some(mb) = overrides.max_size_mb {
        compression.max_size_mb = mb;
    }
    squeeze_config.validate()?;
    Ok(squeeze_config)
}

/// Report entry for an input that never reached compression.
fn unreadable_summary(entry: &scan::Unreadable) -> FileSummary {
    FileSummary {
        error: Some(entry.error.to_string()),
        ..FileSummary::new(entry.path.display().to_string(), 0)
    }
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
