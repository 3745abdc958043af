// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Display names derived from file paths.
//!
//! Paths stored in project files may come from any platform, so both `/`
//! and `\` are treated as separators regardless of the host.

use crate::models::project::Role;

/// Last component of a path, or an empty string when the path ends in a
/// separator.
pub fn file_name(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or("")
}

/// File name without its last extension. A leading dot is not an extension.
pub fn base_name(file_name: &str) -> &str {
    match file_name.rfind('.') {
        Some(idx) if idx > 0 => &file_name[..idx],
        _ => file_name,
    }
}

/// Suggested project file name for a media path and role, e.g. `clip_A.ann`.
pub fn default_project_name(media_path: &str, role: Role) -> String {
    format!("{}_{}.ann", base_name(file_name(media_path)), role)
}

/// Suggested export file name for a media path and role, e.g. `clip_A.csv`.
pub fn default_export_name(media_path: &str, role: Role) -> String {
    format!("{}_{}.csv", base_name(file_name(media_path)), role)
}
