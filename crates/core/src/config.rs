//! YAML batch configuration.
//!
//! ```yaml
//! presentation: decks/results.pptx
//! base_dir: /data/plots
//! template_slide: 1
//! images:
//!   - overview.png                 # joined onto base_dir
//!   - [control.png, treated.png]   # several pictures on one slide
//!   - path: /elsewhere/extra.png   # taken verbatim
//! ```

use crate::backup::default_backup_dir;
use crate::error::{Error, Result};
use crate::geometry::Position;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// One `images:` entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ImageEntry {
    /// A single file name, relative to `base_dir`.
    Path(String),
    /// Several file names for one slide, relative to `base_dir`, in reading order.
    Set(Vec<String>),
    /// A single path used as written.
    Entry { path: String },
}

/// Batch run configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Presentation to edit.
    pub presentation: PathBuf,

    /// Directory that plain image entries are relative to.
    #[serde(default)]
    pub base_dir: PathBuf,

    /// Images to insert, one entry per new slide.
    pub images: Vec<ImageEntry>,

    /// 0-based index of the template slide.
    #[serde(default = "default_template_slide")]
    pub template_slide: usize,

    /// Slides kept when the deck is cleared; defaults to `[0, template_slide]`.
    #[serde(default)]
    pub preserve_slides: Option<Vec<usize>>,

    /// Backup base directory; defaults to `<presentation dir>/backups`.
    #[serde(default)]
    pub backup_dir: Option<PathBuf>,

    /// Write to this copy instead of the original presentation.
    #[serde(default)]
    pub output_path: Option<PathBuf>,

    /// Explicit picture positions in inches; auto-detected from the template when absent.
    #[serde(default)]
    pub positions: Option<Vec<Position>>,

    /// Stamp source path and file name on each inserted picture.
    #[serde(default = "default_true")]
    pub store_metadata: bool,

    /// Add the visible bottom-right label listing the image paths.
    #[serde(default = "default_true")]
    pub add_label: bool,

    /// The first entry is what the template slide already shows; do not insert it again.
    #[serde(default = "default_true")]
    pub skip_first_image: bool,
}

fn default_template_slide() -> usize {
    1
}

fn default_true() -> bool {
    true
}

impl BatchConfig {
    /// Load and validate a config file.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(Error::FileNotFound(path.to_path_buf()));
        }
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_yaml_str(&text)?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Parse and validate YAML text.
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let config: Self =
            serde_yaml::from_str(text).map_err(|e| Error::ConfigError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check required fields and cross-field consistency.
    pub fn validate(&self) -> Result<()> {
        if self.presentation.as_os_str().is_empty() {
            return Err(Error::ConfigError("'presentation' must not be empty".into()));
        }
        if self.images.is_empty() {
            return Err(Error::ConfigError("'images' must list at least one image".into()));
        }
        for (i, entry) in self.images.iter().enumerate() {
            let empty = match entry {
                ImageEntry::Path(p) | ImageEntry::Entry { path: p } => p.trim().is_empty(),
                ImageEntry::Set(paths) => paths.is_empty() || paths.iter().any(|p| p.trim().is_empty()),
            };
            if empty {
                return Err(Error::ConfigError(format!("image entry {} is empty", i + 1)));
            }
        }
        if let Some(positions) = &self.positions {
            if positions.iter().any(|p| p.width <= 0.0 || p.height <= 0.0) {
                return Err(Error::ConfigError(
                    "'positions' entries need a positive width and height".into(),
                ));
            }
        }
        if !self.preserve_slides().contains(&self.template_slide) {
            log::warn!(
                "template_slide {} is not in preserve_slides; run_batch will refuse this config",
                self.template_slide
            );
        }
        Ok(())
    }

    /// Slides to keep, `[0, template_slide]` unless configured.
    pub fn preserve_slides(&self) -> Vec<usize> {
        self.preserve_slides
            .clone()
            .unwrap_or_else(|| vec![0, self.template_slide])
    }

    /// Backup base directory.
    pub fn backup_dir(&self) -> PathBuf {
        self.backup_dir
            .clone()
            .unwrap_or_else(|| default_backup_dir(&self.presentation))
    }

    /// The file all operations target: the output copy when set, else the presentation.
    pub fn working_path(&self) -> &Path {
        self.output_path.as_deref().unwrap_or(&self.presentation)
    }

    /// Resolve every entry to its image paths.
    pub fn image_sets(&self) -> Vec<Vec<PathBuf>> {
        self.images
            .iter()
            .map(|entry| match entry {
                ImageEntry::Path(p) => vec![self.resolve(p)],
                ImageEntry::Set(paths) => paths.iter().map(|p| self.resolve(p)).collect(),
                ImageEntry::Entry { path } => vec![PathBuf::from(path)],
            })
            .collect()
    }

    /// Base directory for label display, if configured.
    pub fn label_base_dir(&self) -> Option<&Path> {
        if self.base_dir.as_os_str().is_empty() {
            None
        } else {
            Some(&self.base_dir)
        }
    }

    fn resolve(&self, name: &str) -> PathBuf {
        if self.base_dir.as_os_str().is_empty() {
            PathBuf::from(name)
        } else {
            self.base_dir.join(name)
        }
    }
}
