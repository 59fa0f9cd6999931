//! CLI tool for inserting images into PowerPoint decks from a template slide.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use deck_core::{cm_to_inches, default_backup_dir, BackupPolicy, BatchConfig, Position};
use deck_pptx::InsertOptions;
use std::path::{Path, PathBuf};

/// Insert images into PowerPoint decks by copying a template slide.
#[derive(Parser, Debug)]
#[command(name = "deck-insert")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a YAML batch configuration
    Batch {
        /// Config file
        config: PathBuf,
    },

    /// List slides with their titles
    List {
        /// Presentation (.pptx)
        pptx: PathBuf,
    },

    /// Show picture positions on a slide, in reading order
    Positions {
        pptx: PathBuf,

        /// Slide index (0-based)
        #[arg(short, long)]
        slide: usize,

        /// Only this picture (0-based, document order)
        #[arg(short, long)]
        picture: Option<usize>,

        /// Print JSON
        #[arg(long)]
        json: bool,
    },

    /// Show provenance and position of every picture
    Metadata {
        pptx: PathBuf,

        /// Print JSON
        #[arg(long)]
        json: bool,
    },

    /// Copy the template slide and fill its pictures with new images
    Copy {
        pptx: PathBuf,

        /// Template slide index (0-based)
        #[arg(short, long, default_value = "1")]
        template: usize,

        /// Images, in the template's reading order
        #[arg(required = true)]
        images: Vec<PathBuf>,

        /// Add a label listing the image paths
        #[arg(long)]
        label: bool,

        /// Do not store source paths on the pictures
        #[arg(long)]
        no_metadata: bool,

        /// Show label paths relative to this directory
        #[arg(long)]
        base_dir: Option<PathBuf>,
    },

    /// Replace the image on an existing slide
    Replace {
        pptx: PathBuf,

        /// Slide index (0-based)
        #[arg(short, long)]
        slide: usize,

        image: PathBuf,

        /// Do not add a label
        #[arg(long)]
        no_label: bool,

        /// Do not store the source path on the picture
        #[arg(long)]
        no_metadata: bool,

        /// Show label paths relative to this directory
        #[arg(long)]
        base_dir: Option<PathBuf>,
    },

    /// Label a slide from the source paths stored on its pictures
    Label {
        pptx: PathBuf,

        /// Slide index (0-based)
        #[arg(short, long)]
        slide: usize,

        /// Show label paths relative to this directory
        #[arg(long)]
        base_dir: Option<PathBuf>,
    },

    /// Insert an image at an explicit position
    Insert {
        pptx: PathBuf,

        /// Slide index (0-based)
        #[arg(short, long)]
        slide: usize,

        image: PathBuf,

        #[arg(long)]
        left: f64,

        #[arg(long)]
        top: f64,

        /// Width; give only this to keep the aspect ratio
        #[arg(long)]
        width: Option<f64>,

        /// Height; give only this to keep the aspect ratio
        #[arg(long)]
        height: Option<f64>,

        /// Values are in centimeters instead of inches
        #[arg(long)]
        cm: bool,
    },

    /// Delete slides by index (a backup is taken first)
    Delete {
        pptx: PathBuf,

        /// Slide indices (0-based)
        #[arg(required = true)]
        indices: Vec<usize>,

        /// Backup directory (default: <pptx dir>/backups)
        #[arg(long)]
        backup_dir: Option<PathBuf>,
    },

    /// Back up a presentation into the timed backup folders
    Backup {
        pptx: PathBuf,

        /// Backup directory (default: <pptx dir>/backups)
        #[arg(long)]
        backup_dir: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    if args.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    }

    run(args.command)
}

fn run(command: Command) -> Result<()> {
    match command {
        Command::Batch { config } => batch(&config),

        Command::List { pptx } => {
            let slides = deck_pptx::list_slides(&pptx)
                .with_context(|| format!("Failed to list slides of {}", pptx.display()))?;
            for slide in slides {
                println!("{}: {}", slide.index, slide.title);
            }
            Ok(())
        }

        Command::Positions {
            pptx,
            slide,
            picture,
            json,
        } => {
            let positions = match picture {
                Some(picture) => vec![deck_pptx::image_position(&pptx, slide, picture)?],
                None => deck_pptx::all_image_positions(&pptx, slide)?,
            };
            if json {
                println!("{}", serde_json::to_string_pretty(&positions)?);
            } else if positions.is_empty() {
                println!("Slide {} has no pictures", slide);
            } else {
                for (i, p) in positions.iter().enumerate() {
                    println!("{}: {}", i, format_position(p));
                }
            }
            Ok(())
        }

        Command::Metadata { pptx, json } => {
            let entries = deck_pptx::extract_image_metadata(&pptx)
                .with_context(|| format!("Failed to read {}", pptx.display()))?;
            if json {
                println!("{}", serde_json::to_string_pretty(&entries)?);
                return Ok(());
            }
            for entry in &entries {
                println!(
                    "Slide {}: {}",
                    entry.slide_number,
                    entry.filename.as_deref().unwrap_or("(unnamed)")
                );
                println!(
                    "  Path: {}",
                    entry.original_path.as_deref().unwrap_or("(not stored)")
                );
                println!("  Position: {}", format_position(&entry.position));
            }
            Ok(())
        }

        Command::Copy {
            pptx,
            template,
            images,
            label,
            no_metadata,
            base_dir,
        } => {
            let options = InsertOptions::default()
                .with_label(label)
                .with_metadata(!no_metadata)
                .with_base_dir(base_dir);
            let index = deck_pptx::copy_slide_replace_images(&pptx, template, &images, None, &options)
                .with_context(|| format!("Failed to add slide to {}", pptx.display()))?;
            println!("Created slide {} (index {})", index + 1, index);
            Ok(())
        }

        Command::Replace {
            pptx,
            slide,
            image,
            no_label,
            no_metadata,
            base_dir,
        } => {
            let options = InsertOptions::default()
                .with_label(!no_label)
                .with_metadata(!no_metadata)
                .with_base_dir(base_dir);
            deck_pptx::replace_image_on_existing_slide(&pptx, slide, &image, &options)
                .with_context(|| format!("Failed to replace image on slide {}", slide))?;
            println!("Replaced image on slide {}", slide + 1);
            Ok(())
        }

        Command::Label {
            pptx,
            slide,
            base_dir,
        } => {
            let labelled = deck_pptx::add_label_to_existing_slide(&pptx, slide, base_dir.as_deref())
                .with_context(|| format!("Failed to label slide {}", slide))?;
            if labelled {
                println!("Labelled slide {}", slide + 1);
            } else {
                println!("Slide {} has no pictures; nothing to label", slide + 1);
            }
            Ok(())
        }

        Command::Insert {
            pptx,
            slide,
            image,
            left,
            top,
            width,
            height,
            cm,
        } => {
            let unit = |v: f64| if cm { cm_to_inches(v) } else { v };
            let (left, top) = (unit(left), unit(top));
            let (width, height) = (width.map(unit), height.map(unit));

            let position = match (width, height) {
                (Some(width), Some(height)) => {
                    let position = Position::new(left, top, width, height);
                    deck_pptx::insert_image(&pptx, slide, &image, position)?;
                    position
                }
                (None, None) => bail!("give --width, --height or both"),
                _ => deck_pptx::insert_image_preserve_aspect(
                    &pptx, slide, &image, left, top, width, height,
                )?,
            };
            println!(
                "Inserted {} into slide {} at {}",
                image.display(),
                slide + 1,
                format_position(&position)
            );
            Ok(())
        }

        Command::Delete {
            pptx,
            indices,
            backup_dir,
        } => {
            let policy = backup_policy(&pptx, backup_dir);
            let deleted = deck_pptx::delete_slides(&pptx, &indices, &policy)
                .with_context(|| format!("Failed to delete slides from {}", pptx.display()))?;
            for index in &deleted {
                println!("Deleted slide {}", index + 1);
            }
            Ok(())
        }

        Command::Backup { pptx, backup_dir } => {
            let policy = backup_policy(&pptx, backup_dir);
            let copies = policy
                .backup(&pptx)
                .with_context(|| format!("Failed to back up {}", pptx.display()))?;
            if copies.is_empty() {
                println!("All backups are recent; nothing copied");
            }
            for (category, path) in &copies {
                println!("{}: {}", category, path.display());
            }
            Ok(())
        }
    }
}

fn batch(config_path: &Path) -> Result<()> {
    let config = BatchConfig::load(config_path)
        .with_context(|| format!("Failed to load config {}", config_path.display()))?;
    log::debug!(
        "Template slide {} (preserving {:?}), {} image entries",
        config.template_slide,
        config.preserve_slides(),
        config.images.len()
    );

    let report = deck_pptx::run_batch(&config).context("Batch run failed")?;

    if !report.deleted.is_empty() {
        println!("Deleted {} slide(s)", report.deleted.len());
    }
    for failure in &report.failures {
        eprintln!("[ERROR] entry {}: {}", failure.entry + 1, failure.error);
    }
    println!(
        "Successfully created: {}/{} slides in {}",
        report.created.len(),
        report.attempted(),
        report.presentation.display()
    );

    if !report.is_success() {
        bail!("{} image entries failed", report.failures.len());
    }
    Ok(())
}

fn backup_policy(pptx: &Path, backup_dir: Option<PathBuf>) -> BackupPolicy {
    BackupPolicy::standard(backup_dir.unwrap_or_else(|| default_backup_dir(pptx)))
}

fn format_position(p: &Position) -> String {
    format!(
        "left {:.2}\", top {:.2}\", width {:.2}\", height {:.2}\"",
        p.left, p.top, p.width, p.height
    )
}
