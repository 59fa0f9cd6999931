//! Core domain types for template-driven slide image insertion: errors,
//! geometry, provenance labels, backups and batch configuration.

pub mod backup;
pub mod config;
pub mod error;
pub mod geometry;
pub mod label;
pub mod types;

pub use backup::{default_backup_dir, BackupCategory, BackupPolicy};
pub use config::{BatchConfig, ImageEntry};
pub use error::{Error, Result};
pub use geometry::{cm_to_inches, emu_to_inches, inches_to_emu, EmuRect, Position, SlideSize};
pub use types::{ImageMetadata, PresentationFormat, Provenance, SlideSummary};
