// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Tabular export of a finished segment list.
//!
//! Output is comma-delimited with a `start,end,label,text` header and one
//! row per segment in canonical order. Callers only export once every
//! segment is complete; this module does not check.

use crate::models::timeline::SegmentCollection;
use crate::util::time::format_ms;
use std::borrow::Cow;

/// Header row of every export.
pub const CSV_HEADER: &str = "start,end,label,text";

/// Quote a field containing a comma, double quote or line break, doubling
/// any embedded quotes. Other fields pass through untouched.
pub fn escape_field(value: &str) -> Cow<'_, str> {
    if !value.contains(['"', ',', '\n', '\r']) {
        return Cow::Borrowed(value);
    }
    Cow::Owned(format!("\"{}\"", value.replace('"', "\"\"")))
}

/// Render the collection as export text. Rows are joined with `\n` and the
/// text has no trailing newline.
pub fn export_csv(segments: &SegmentCollection) -> String {
    let mut lines = Vec::with_capacity(segments.len() + 1);
    lines.push(CSV_HEADER.to_string());
    for seg in segments {
        let label = seg.label_id.map(|id| id.to_string()).unwrap_or_default();
        lines.push(format!(
            "{},{},{},{}",
            format_ms(seg.start_ms),
            format_ms(seg.end_ms),
            label,
            escape_field(&seg.text)
        ));
    }
    lines.join("\n")
}
