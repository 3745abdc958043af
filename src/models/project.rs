// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Annotation project state.
//!
//! The project is the persisted root: the media it annotates, the label
//! catalog its segments refer to, the annotator role and the segments.

use super::timeline::SegmentCollection;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Annotator role recorded with a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Role {
    #[default]
    A,
    B,
    C,
    D,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Role::A => "A",
            Role::B => "B",
            Role::C => "C",
            Role::D => "D",
        };
        f.write_str(s)
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "A" => Ok(Role::A),
            "B" => Ok(Role::B),
            "C" => Ok(Role::C),
            "D" => Ok(Role::D),
            other => Err(format!("unknown role '{}', expected one of A, B, C, D", other)),
        }
    }
}

/// Complete project data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    pub version: u32,
    pub media_path: String,
    pub labels_path: String,
    pub role: Role,
    pub segments: SegmentCollection,
}

impl Project {
    /// Create an empty project for the given media and catalog.
    pub fn new(media_path: String, labels_path: String, role: Role) -> Self {
        Self {
            version: crate::PROJECT_VERSION,
            media_path,
            labels_path,
            role,
            segments: SegmentCollection::new(),
        }
    }
}
