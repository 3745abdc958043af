// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Millisecond helpers.
//!
//! This module provides clamping for timeline positions and the
//! `MM:SS.d` rendering used by listings and the tabular export.

/// Clamp `value` into `[min, max]`.
///
/// Callers guarantee `min <= max`; the neighbor checks in the segment model
/// reject empty ranges before clamping.
pub fn clamp_ms(value: i64, min: i64, max: i64) -> i64 {
    value.min(max).max(min)
}

/// Format milliseconds as `MM:SS.d`, rounded half-up to the nearest tenth of
/// a second. Negative input renders as zero.
pub fn format_ms(ms: i64) -> String {
    let tenths = ms.max(0).saturating_add(50) / 100;
    let minutes = tenths / 600;
    let rem = tenths % 600;
    format!("{:02}:{:02}.{}", minutes, rem / 10, rem % 10)
}
