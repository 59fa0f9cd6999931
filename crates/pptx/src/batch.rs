//! Config-driven batch run: clear the deck down to the preserved slides,
//! then add one slide per image entry from the template.

use crate::lifecycle::delete_slides;
use crate::presentation::Presentation;
use crate::workflow::{copy_slide_replace_images, InsertOptions};
use deck_core::{BackupPolicy, BatchConfig, Error, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// One image entry that could not be turned into a slide.
#[derive(Debug, Clone, Serialize)]
pub struct BatchFailure {
    /// 0-based position of the entry in the config's `images` list.
    pub entry: usize,
    pub images: Vec<PathBuf>,
    pub error: String,
}

/// Outcome of a batch run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    /// The file that was edited.
    pub presentation: PathBuf,
    /// Original indices of the slides removed, highest first.
    pub deleted: Vec<usize>,
    /// Indices of the slides created, in creation order.
    pub created: Vec<usize>,
    pub failures: Vec<BatchFailure>,
}

impl BatchReport {
    /// Number of entries processed.
    pub fn attempted(&self) -> usize {
        self.created.len() + self.failures.len()
    }

    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Run a batch configuration.
///
/// Setup problems (missing presentation, template not preserved, failed
/// pre-delete backup) abort the run. Problems with individual image entries
/// are recorded in the report and the run moves on.
pub fn run_batch(config: &BatchConfig) -> Result<BatchReport> {
    if !config.presentation.is_file() {
        return Err(Error::FileNotFound(config.presentation.clone()));
    }
    let preserve = config.preserve_slides();
    if !preserve.contains(&config.template_slide) {
        return Err(Error::ConfigError(format!(
            "template_slide {} must be listed in preserve_slides",
            config.template_slide
        )));
    }
    let policy = BackupPolicy::standard(config.backup_dir());
    let target = prepare_target(config, &policy)?;

    let slide_count = Presentation::open(&target)?.slide_count();
    if config.template_slide >= slide_count {
        return Err(Error::slide_index(config.template_slide, slide_count));
    }

    let to_delete: Vec<usize> = (0..slide_count).filter(|i| !preserve.contains(i)).collect();
    let deleted = if to_delete.is_empty() {
        log::debug!("No slides to delete");
        Vec::new()
    } else {
        delete_slides(&target, &to_delete, &policy)?
    };

    // The template moves up by one for every deleted slide before it
    let template = config.template_slide - deleted.iter().filter(|&&i| i < config.template_slide).count();

    let options = InsertOptions {
        store_metadata: config.store_metadata,
        add_label: config.add_label,
        base_dir: config.label_base_dir().map(Path::to_path_buf),
    };
    let skip = usize::from(config.skip_first_image);
    let sets = config.image_sets();

    let mut report = BatchReport {
        presentation: target.clone(),
        deleted,
        ..Default::default()
    };

    let total = sets.len().saturating_sub(skip);
    for (n, (entry, images)) in sets.into_iter().enumerate().skip(skip).enumerate() {
        log::debug!("[{}/{}] entry {}: {} image(s)", n + 1, total, entry + 1, images.len());

        let result = match images.iter().find(|image| !image.is_file()) {
            Some(missing) => Err(Error::FileNotFound(missing.clone())),
            None => copy_slide_replace_images(
                &target,
                template,
                &images,
                config.positions.as_deref(),
                &options,
            ),
        };

        match result {
            Ok(index) => {
                log::info!("Created slide {} from entry {}", index + 1, entry + 1);
                report.created.push(index);
            }
            Err(e) => {
                log::warn!("Entry {} failed: {}", entry + 1, e);
                report.failures.push(BatchFailure {
                    entry,
                    images,
                    error: e.to_string(),
                });
            }
        }
    }

    log::info!(
        "Batch complete: {}/{} slides created",
        report.created.len(),
        report.attempted()
    );
    Ok(report)
}

/// The file to edit. With an output path, the presentation is copied there
/// first, and an existing output is backed up on a best-effort basis.
fn prepare_target(config: &BatchConfig, policy: &BackupPolicy) -> Result<PathBuf> {
    let output = config.working_path();
    if output == config.presentation {
        return Ok(output.to_path_buf());
    }

    if output.is_file() {
        if let Err(e) = policy.backup(output) {
            log::warn!("Could not back up {}: {}", output.display(), e);
        }
    }
    if let Some(dir) = output.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).map_err(|e| Error::from_write(e, dir))?;
    }
    std::fs::copy(&config.presentation, output).map_err(|e| Error::from_write(e, output))?;
    log::debug!(
        "Copied {} to {}",
        config.presentation.display(),
        output.display()
    );
    Ok(output.to_path_buf())
}
