use clap::{Parser, Subcommand};
use image_batcher::config::{self, AppConfig, SettingsOverrides};
use image_batcher::imaging::{OutputFormat, RustBackend};
use image_batcher::queue::FileQueue;
use image_batcher::source::SourceFile;
use image_batcher::{archive, estimate, output, process, render};
use std::path::{Path, PathBuf};
use tracing::warn;
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

/// Output settings shared by commands that transcode.
#[derive(clap::Args, Clone)]
struct SettingsArgs {
    /// Output format: png, jpeg or webp (webp files get a .png name)
    #[arg(long)]
    format: Option<OutputFormat>,

    /// Lossy quality from 0.0 to 1.0
    #[arg(long)]
    quality: Option<f64>,

    /// Fit inside this width, preserving aspect ratio
    #[arg(long)]
    width: Option<u32>,

    /// Fit inside this height, preserving aspect ratio
    #[arg(long)]
    height: Option<u32>,
}

impl SettingsArgs {
    fn overrides(&self) -> SettingsOverrides {
        SettingsOverrides {
            format: self.format,
            quality: self.quality,
            width: self.width,
            height: self.height,
        }
    }
}

#[derive(Parser)]
#[command(name = "image-batcher")]
#[command(about = "Batch resize and recompress images")]
#[command(long_about = "\
Batch resize and recompress images

Queue image files or directories, choose an output format, quality and
target box, and get optimized files back. A single result is written as-is;
several results are packed into one zip archive.

Settings resolution (later wins):
  stock defaults → image-batcher.toml in --config-dir → command-line flags

Run 'image-batcher gen-config' to generate a documented image-batcher.toml.")]
#[command(version)]
struct Cli {
    /// Directory containing image-batcher.toml
    #[arg(long, default_value = ".", global = true)]
    config_dir: PathBuf,

    /// Debug logging on stderr (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Transcode the queued images and write the result
    Optimize {
        /// Image files or directories (searched recursively)
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        #[command(flatten)]
        settings: SettingsArgs,

        /// Only process files with this name (repeatable)
        #[arg(long = "select", value_name = "NAME")]
        select: Vec<String>,

        /// Directory the optimized file or archive is written to
        #[arg(long, default_value = ".")]
        output: PathBuf,

        /// Print the final view as JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Print the projected output size without writing anything
    Estimate {
        /// Image files or directories (searched recursively)
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        #[command(flatten)]
        settings: SettingsArgs,
    },
    /// Print a stock image-batcher.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Optimize {
            inputs,
            settings,
            select,
            output: output_dir,
            json,
        } => {
            let app_config = load_settings(&cli.config_dir, &settings)?;
            let backend = RustBackend::new();

            let mut queue = FileQueue::new();
            let report = queue.add_files(collect_sources(&inputs), &backend)?;
            if !json {
                output::print_add_report(&report);
            }
            select_by_name(&mut queue, &select)?;
            if !json {
                output::print_view(&render::project(&queue, &app_config.archive.name));
            }

            let (events, printer) = if json {
                (None, None)
            } else {
                let (tx, rx) = std::sync::mpsc::channel();
                let printer = std::thread::spawn(move || {
                    for event in rx {
                        for line in output::format_process_event(&event) {
                            println!("{}", line);
                        }
                    }
                });
                (Some(tx), Some(printer))
            };
            let result = process::process(&mut queue, &backend, &app_config.settings(), events);
            if let Some(printer) = printer {
                printer
                    .join()
                    .map_err(|_| "progress printer thread panicked")?;
            }
            let summary = result?;

            let view = render::project(&queue, &app_config.archive.name);
            if json {
                println!("{}", serde_json::to_string_pretty(&view)?);
            } else {
                output::print_summary(&summary);
                output::print_panel(&view.panel);
            }

            if view.panel.download.is_some() {
                let artifact = archive::package(queue.outputs(), &app_config.archive.name)?;
                let path = artifact.save(&output_dir)?;
                if !json {
                    output::print_artifact(&artifact, &path);
                }
            }

            if let Some(message) = queue.message() {
                return Err(message.into());
            }
        }
        Command::Estimate { inputs, settings } => {
            let app_config = load_settings(&cli.config_dir, &settings)?;
            let backend = RustBackend::new();

            let mut queue = FileQueue::new();
            queue.add_files(collect_sources(&inputs), &backend)?;
            let result = estimate::estimate(&queue, &app_config.settings(), &backend);
            output::print_estimate(&result, queue.estimate_candidates().len());
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Install the stderr log subscriber. `RUST_LOG` wins over `--verbose`.
fn init_logging(verbose: bool) {
    let default = if verbose { "image_batcher=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .ok();
}

fn load_settings(
    config_dir: &Path,
    settings: &SettingsArgs,
) -> Result<AppConfig, config::ConfigError> {
    config::load_config(config_dir)?.with_overrides(&settings.overrides())
}

/// Expand inputs into source files. Directories are walked recursively in
/// name order; unreadable entries are logged and skipped.
fn collect_sources(inputs: &[PathBuf]) -> Vec<SourceFile> {
    let mut sources = Vec::new();
    for input in inputs {
        let walker = WalkDir::new(input).sort_by_file_name();
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(error = %e, "skipping unreadable path");
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            match SourceFile::from_path(entry.path()) {
                Ok(source) => sources.push(source),
                Err(e) => warn!(error = %e, "skipping unreadable file"),
            }
        }
    }
    sources
}

/// Select every queued item whose name is in `names`.
fn select_by_name(queue: &mut FileQueue, names: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    for name in names {
        let ids: Vec<_> = queue
            .items()
            .iter()
            .filter(|item| item.name() == name)
            .map(|item| item.id().clone())
            .collect();
        if ids.is_empty() {
            warn!(name = %name, "--select matched no queued file");
        }
        for id in ids {
            if !queue.is_selected(&id) {
                queue.toggle_selection(&id)?;
            }
        }
    }
    Ok(())
}
