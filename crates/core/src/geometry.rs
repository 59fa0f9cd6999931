//! Geometry, unit conversion and reading order for picture placement.
//!
//! Presentations store lengths as English Metric Units (EMU), 914400 per
//! inch. Everything exposed to callers and configuration is in inches.

use serde::{Deserialize, Serialize};

/// EMUs per inch. Fixed by the file format.
pub const EMU_PER_INCH: i64 = 914_400;

/// Centimeters per inch.
pub const CM_PER_INCH: f64 = 2.54;

/// Convert an EMU length to inches.
pub fn emu_to_inches(emu: i64) -> f64 {
    emu as f64 / EMU_PER_INCH as f64
}

/// Convert inches to the nearest EMU.
pub fn inches_to_emu(inches: f64) -> i64 {
    (inches * EMU_PER_INCH as f64).round() as i64
}

/// Convert centimeters to inches.
pub fn cm_to_inches(cm: f64) -> f64 {
    cm / CM_PER_INCH
}

/// Position and size of a picture, in inches.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Position {
    /// Create a position from inch values.
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Create a position from centimeter values.
    pub fn from_cm(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self::new(
            cm_to_inches(left),
            cm_to_inches(top),
            cm_to_inches(width),
            cm_to_inches(height),
        )
    }

    /// Convert to the stored EMU rectangle.
    pub fn to_emu(&self) -> EmuRect {
        EmuRect {
            x: inches_to_emu(self.left),
            y: inches_to_emu(self.top),
            cx: inches_to_emu(self.width),
            cy: inches_to_emu(self.height),
        }
    }

    /// Reading-order key: (top, left), each rounded to the nearest tenth of an inch.
    ///
    /// Pictures whose tops differ by less than the rounding step land in the
    /// same row and are then ordered left to right.
    pub fn reading_order_key(&self) -> (i64, i64) {
        (to_tenths(self.top), to_tenths(self.left))
    }

    /// Check whether two positions agree within `tolerance` inches on every edge.
    pub fn approx_eq(&self, other: &Position, tolerance: f64) -> bool {
        (self.left - other.left).abs() <= tolerance
            && (self.top - other.top).abs() <= tolerance
            && (self.width - other.width).abs() <= tolerance
            && (self.height - other.height).abs() <= tolerance
    }
}

// Rounds the exact value of the stored double, so 0.15 (stored just below)
// reads as one tenth rather than two as `(x * 10.0).round()` would give.
fn to_tenths(inches: f64) -> i64 {
    format!("{:.1}", inches).replace('.', "").parse().unwrap_or(0)
}

/// Sort positions into reading order (top-to-bottom, then left-to-right).
///
/// The sort is stable: positions with equal keys keep their document order.
pub fn sort_reading_order(positions: &mut [Position]) {
    positions.sort_by_key(Position::reading_order_key);
}

/// Rectangle in EMUs, as stored in `a:off` / `a:ext`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct EmuRect {
    pub x: i64,
    pub y: i64,
    pub cx: i64,
    pub cy: i64,
}

impl EmuRect {
    /// Convert to inches.
    pub fn to_position(&self) -> Position {
        Position {
            left: emu_to_inches(self.x),
            top: emu_to_inches(self.y),
            width: emu_to_inches(self.cx),
            height: emu_to_inches(self.cy),
        }
    }
}

/// Slide canvas size in EMUs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlideSize {
    pub cx: i64,
    pub cy: i64,
}

impl SlideSize {
    /// Width in inches.
    pub fn width_inches(&self) -> f64 {
        emu_to_inches(self.cx)
    }

    /// Height in inches.
    pub fn height_inches(&self) -> f64 {
        emu_to_inches(self.cy)
    }
}

impl Default for SlideSize {
    /// 10" x 7.5", the 4:3 default used when `p:sldSz` is absent.
    fn default() -> Self {
        Self {
            cx: 9_144_000,
            cy: 6_858_000,
        }
    }
}
