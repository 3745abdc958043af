// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Snapping a dragged boundary to an external reference point.
//!
//! Interactive callers use these helpers to resolve a proposed boundary
//! against something outside the segment collection (usually the playhead)
//! before handing the result to the segment model. The segment model itself
//! only enforces neighbor and minimum-length constraints.

use crate::MIN_SEGMENT_MS;

/// Screen distance, in pixels, within which a boundary snaps.
pub const SNAP_PIXELS: f64 = 10.0;

/// A reference point and the distance within which boundaries snap to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapTarget {
    pub reference_ms: i64,
    pub threshold_ms: i64,
}

impl SnapTarget {
    pub fn new(reference_ms: i64, threshold_ms: i64) -> Self {
        Self {
            reference_ms,
            threshold_ms,
        }
    }
}

/// Snap threshold for a timeline drawn at `pixels_per_second`, never below
/// the minimum segment length.
pub fn snap_threshold_ms(pixels_per_second: f64) -> i64 {
    if pixels_per_second <= 0.0 {
        return MIN_SEGMENT_MS;
    }
    let ms = (SNAP_PIXELS / pixels_per_second * 1000.0).round() as i64;
    ms.max(MIN_SEGMENT_MS)
}

/// Replace `proposed_ms` with the reference when it lies within threshold.
pub fn snap_to_reference(proposed_ms: i64, target: SnapTarget) -> i64 {
    if proposed_ms.saturating_sub(target.reference_ms).saturating_abs() <= target.threshold_ms {
        target.reference_ms
    } else {
        proposed_ms
    }
}

/// Resolve the start of a moved segment of `length_ms` so that whichever edge
/// is nearer the reference lands on it. The start edge wins ties.
pub fn snap_move_start(proposed_start_ms: i64, length_ms: i64, target: SnapTarget) -> i64 {
    let start_diff = proposed_start_ms
        .saturating_sub(target.reference_ms)
        .saturating_abs();
    let end_diff = proposed_start_ms
        .saturating_add(length_ms)
        .saturating_sub(target.reference_ms)
        .saturating_abs();
    if start_diff.min(end_diff) > target.threshold_ms {
        return proposed_start_ms;
    }
    if start_diff <= end_diff {
        target.reference_ms
    } else {
        target.reference_ms.saturating_sub(length_ms)
    }
}
