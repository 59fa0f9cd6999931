//! Time-bucketed backups taken before destructive operations.
//!
//! A backup base directory holds one subdirectory per category. Each
//! category keeps a single copy of the presentation (same file name as the
//! source) and only refreshes it once its threshold has elapsed since the
//! newest file already in that directory was written.

use crate::error::{Error, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

/// One retention bucket: a directory name and the minimum age before refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupCategory {
    pub name: String,
    pub threshold: Duration,
}

impl BackupCategory {
    pub fn new(name: impl Into<String>, threshold: Duration) -> Self {
        Self {
            name: name.into(),
            threshold,
        }
    }
}

/// Where backups go and how often each category is refreshed.
///
/// Holds no cached state; every call re-scans the category directories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupPolicy {
    pub base_dir: PathBuf,
    pub categories: Vec<BackupCategory>,
}

impl BackupPolicy {
    /// The five standard categories: latest, 5min, 10min, 30min, hourly.
    pub fn standard(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            categories: vec![
                BackupCategory::new("latest", Duration::ZERO),
                BackupCategory::new("5min", Duration::from_secs(300)),
                BackupCategory::new("10min", Duration::from_secs(600)),
                BackupCategory::new("30min", Duration::from_secs(1800)),
                BackupCategory::new("hourly", Duration::from_secs(3600)),
            ],
        }
    }

    /// Back up `source` into every category whose threshold has elapsed.
    ///
    /// Returns the category name -> backup path of every copy written.
    pub fn backup(&self, source: &Path) -> Result<BTreeMap<String, PathBuf>> {
        self.backup_at(source, SystemTime::now())
    }

    /// Same as [`BackupPolicy::backup`] with an explicit clock reading.
    pub fn backup_at(&self, source: &Path, now: SystemTime) -> Result<BTreeMap<String, PathBuf>> {
        if !source.is_file() {
            return Err(Error::FileNotFound(source.to_path_buf()));
        }

        let file_name = source
            .file_name()
            .ok_or_else(|| Error::InvalidValue(format!("Not a file path: {}", source.display())))?;
        let extension = source.extension().map(|e| e.to_os_string());

        let mut created = BTreeMap::new();

        for category in &self.categories {
            let category_dir = self.base_dir.join(&category.name);
            fs::create_dir_all(&category_dir)?;

            let should_backup = if category.threshold.is_zero() {
                true
            } else {
                match newest_modification(&category_dir, extension.as_deref())? {
                    // A clock behind the file counts as "not yet due"
                    Some(modified) => now
                        .duration_since(modified)
                        .map(|age| age >= category.threshold)
                        .unwrap_or(false),
                    None => true,
                }
            };

            if should_backup {
                let backup_path = category_dir.join(file_name);
                fs::copy(source, &backup_path)?;
                log::debug!("Backed up {} to {}", source.display(), backup_path.display());
                created.insert(category.name.clone(), backup_path);
            }
        }

        Ok(created)
    }
}

/// Default backup location: `<presentation dir>/backups`.
pub fn default_backup_dir(presentation: &Path) -> PathBuf {
    presentation
        .parent()
        .unwrap_or_else(|| Path::new(""))
        .join("backups")
}

/// Newest modification time among files in `dir` with the given extension.
fn newest_modification(
    dir: &Path,
    extension: Option<&std::ffi::OsStr>,
) -> Result<Option<SystemTime>> {
    let mut newest: Option<SystemTime> = None;

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() || path.extension() != extension {
            continue;
        }
        let modified = entry.metadata()?.modified()?;
        newest = Some(match newest {
            Some(current) if current >= modified => current,
            _ => modified,
        });
    }

    Ok(newest)
}
