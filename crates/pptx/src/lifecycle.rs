//! Slide deletion on disk, with a backup taken first.

use crate::presentation::Presentation;
use deck_core::{BackupPolicy, Error, Result};
use std::path::Path;

/// Delete one slide from a presentation file.
///
/// The file on disk is backed up before anything is written. Deleting a
/// slide shifts the indices of every later slide, so callers removing
/// several slides one by one must go from the highest index down.
pub fn delete_slide(path: &Path, slide_index: usize, backup: &BackupPolicy) -> Result<()> {
    if !path.is_file() {
        return Err(Error::FileNotFound(path.to_path_buf()));
    }
    let mut pres = Presentation::open(path)?;
    pres.slide(slide_index)?;

    let copies = backup.backup(path)?;
    log::debug!("Backed up {} to {} categories", path.display(), copies.len());

    pres.delete_slide(slide_index)?;
    pres.save(path)?;
    log::info!("Deleted slide {} from {}", slide_index, path.display());
    Ok(())
}

/// Delete several slides in one pass, highest index first.
///
/// Every index is checked before the backup is taken, so a bad index
/// leaves the file untouched. Returns the indices deleted, in the order
/// they were removed.
pub fn delete_slides(path: &Path, indices: &[usize], backup: &BackupPolicy) -> Result<Vec<usize>> {
    if !path.is_file() {
        return Err(Error::FileNotFound(path.to_path_buf()));
    }
    let mut pres = Presentation::open(path)?;

    let mut ordered = indices.to_vec();
    ordered.sort_unstable_by(|a, b| b.cmp(a));
    ordered.dedup();
    for &index in &ordered {
        pres.slide(index)?;
    }
    if ordered.is_empty() {
        return Ok(ordered);
    }

    backup.backup(path)?;
    for &index in &ordered {
        pres.delete_slide(index)?;
    }
    pres.save(path)?;
    log::info!("Deleted {} slides from {}", ordered.len(), path.display());
    Ok(ordered)
}
