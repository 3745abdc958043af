// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Segment data structures.
//!
//! A segment is a half-open interval `[start_ms, end_ms)` on the media
//! timeline carrying an optional label and free text.

use crate::models::label::LabelId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Session-local handle for a segment.
///
/// Identifiers are assigned when a segment enters a collection and are never
/// written to disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SegmentId(pub(crate) u64);

impl fmt::Display for SegmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "seg-{}", self.0)
    }
}

/// A labeled time interval.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub id: SegmentId,
    pub start_ms: i64,
    pub end_ms: i64,
    pub label_id: Option<LabelId>,
    pub text: String,
}

impl Segment {
    /// Length of the interval in milliseconds.
    pub fn duration_ms(&self) -> i64 {
        self.end_ms.saturating_sub(self.start_ms)
    }

    /// True once the segment has non-blank text and a label.
    pub fn is_complete(&self) -> bool {
        !self.text.trim().is_empty() && self.label_id.is_some()
    }

    /// Strip the session identifier for persistence.
    pub fn to_record(&self) -> SegmentRecord {
        SegmentRecord {
            start_ms: self.start_ms,
            end_ms: self.end_ms,
            text: self.text.clone(),
            label_id: self.label_id,
        }
    }
}

/// A segment as stored in a project file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentRecord {
    pub start_ms: i64,
    pub end_ms: i64,
    pub text: String,
    pub label_id: Option<LabelId>,
}

/// Half-open interval intersection. Touching endpoints do not overlap.
pub fn is_overlap(start_a: i64, end_a: i64, start_b: i64, end_b: i64) -> bool {
    start_a < end_b && end_a > start_b
}
