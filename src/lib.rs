//! Relabel: small tools for image-annotation datasets.
//!
//! Two independent operations are provided:
//!
//! - [`remap`]: rewrite the class index of YOLO label lines by matching class
//!   names between an old and a new class list.
//! - [`rename`]: renumber image files in a directory as `<prefix>_<n><ext>`.
//!
//! # Modules
//!
//! - [`classes`]: class-list loading and old→new index mapping
//! - [`remap`]: label remapping, preview, background worker and session state
//! - [`rename`]: sequential image renaming
//! - [`error`]: error types for relabel operations

pub mod classes;
pub mod error;
mod listing;
pub mod remap;
pub mod rename;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;

pub use error::RelabelError;

/// The relabel CLI application.
#[derive(Parser)]
#[command(name = "relabel")]
#[command(version, about)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Remap class indices in a YOLO label directory by class name.
    Remap(RemapArgs),
    /// Show the remapped form of one label file without writing anything.
    Preview(PreviewArgs),
    /// List the label files a remap run would process.
    List(ListArgs),
    /// Rename image files with sequential, zero-padded numbering.
    Rename(RenameArgs),
}

/// Report output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ReportFormat {
    Text,
    Json,
}

/// The two class lists shared by `remap` and `preview`.
#[derive(clap::Args)]
struct ClassListArgs {
    /// Class list the labels were written with (.txt, or data.yaml).
    #[arg(long = "old")]
    old_classes: PathBuf,

    /// Class list to remap to (.txt, or data.yaml).
    #[arg(long = "new")]
    new_classes: PathBuf,
}

/// Arguments for the remap subcommand.
#[derive(clap::Args)]
struct RemapArgs {
    /// Directory of YOLO .txt label files.
    #[arg(long = "labels")]
    labels_dir: PathBuf,

    #[command(flatten)]
    classes: ClassListArgs,

    /// Directory to write remapped labels and classes_mapped.txt into.
    #[arg(long = "output", short = 'o')]
    output_dir: PathBuf,

    /// Skip the one-time <labels>_backup copy.
    #[arg(long)]
    no_backup: bool,

    /// Output format for the report.
    #[arg(long = "report", value_enum, default_value = "text")]
    report: ReportFormat,
}

/// Arguments for the preview subcommand.
#[derive(clap::Args)]
struct PreviewArgs {
    /// Label file to preview.
    file: PathBuf,

    #[command(flatten)]
    classes: ClassListArgs,

    /// Output format for the preview.
    #[arg(long = "report", value_enum, default_value = "text")]
    report: ReportFormat,
}

/// Arguments for the list subcommand.
#[derive(clap::Args)]
struct ListArgs {
    /// Directory of YOLO .txt label files.
    labels_dir: PathBuf,
}

/// Arguments for the rename subcommand.
#[derive(clap::Args)]
struct RenameArgs {
    /// Directory containing the images to rename.
    directory: PathBuf,

    /// Starting number for the sequence.
    #[arg(long, short = 's', default_value_t = 1, allow_negative_numbers = true)]
    start: i64,

    /// Prefix for the new file names.
    #[arg(long, short = 'p', default_value = "image", env = "RELABEL_RENAME_PREFIX")]
    prefix: String,

    /// Show what would be renamed without renaming anything.
    #[arg(long, short = 'd')]
    dry_run: bool,

    /// Additional file extensions to treat as images.
    #[arg(long, short = 'e', num_args = 1..)]
    extensions: Vec<String>,

    /// Output format for the report.
    #[arg(long = "report", value_enum, default_value = "text")]
    report: ReportFormat,
}

/// Run the relabel CLI.
///
/// This is the main entry point for the CLI, called from `main.rs`.
pub fn run() -> Result<(), RelabelError> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Remap(args) => run_remap(args),
        Commands::Preview(args) => run_preview(args),
        Commands::List(args) => run_list(args),
        Commands::Rename(args) => run_rename(args),
    }
}

fn run_remap(args: RemapArgs) -> Result<(), RelabelError> {
    let job = remap::RemapJob {
        labels_dir: args.labels_dir,
        output_dir: args.output_dir,
        old_classes: args.classes.old_classes,
        new_classes: args.classes.new_classes,
        options: remap::RemapOptions {
            create_backup: !args.no_backup,
        },
    };

    // The worker keeps the batch off this thread, same as an interactive caller.
    let report = remap::worker::spawn_remap(job).wait()?;
    emit(&report, args.report)
}

fn run_preview(args: PreviewArgs) -> Result<(), RelabelError> {
    let old = classes::read_class_list(&args.classes.old_classes)?;
    let new = classes::read_class_list(&args.classes.new_classes)?;
    let mapping = classes::ClassMapping::new(&old, &new);

    let preview = remap::preview_label_file(&args.file, &mapping)?;
    emit(&preview, args.report)
}

fn run_list(args: ListArgs) -> Result<(), RelabelError> {
    for name in remap::list_label_files(&args.labels_dir)? {
        println!("{}", name);
    }
    Ok(())
}

fn run_rename(args: RenameArgs) -> Result<(), RelabelError> {
    let opts = rename::RenameOptions {
        start: args.start,
        prefix: args.prefix,
        dry_run: args.dry_run,
        ..Default::default()
    }
    .with_extensions(&args.extensions);

    rename::validate_rename_options(&opts)?;

    if args.report == ReportFormat::Text {
        println!("Starting image renaming process...");
        println!("Directory: {}", args.directory.display());
        println!("Start number: {}", opts.start);
        println!("Prefix: {}", opts.prefix);
        println!("Dry run: {}", opts.dry_run);
        println!("{}", "-".repeat(50));
    }

    let report = rename::rename_images(&args.directory, &opts)?;
    emit(&report, args.report)
}

fn emit<R: Serialize + std::fmt::Display>(
    report: &R,
    format: ReportFormat,
) -> Result<(), RelabelError> {
    match format {
        ReportFormat::Text => print!("{}", report),
        ReportFormat::Json => {
            let json = serde_json::to_string_pretty(report).map_err(std::io::Error::from)?;
            println!("{}", json);
        }
    }
    Ok(())
}
