// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! SEGMARK - Segment Annotation Timeline
//!
//! Core engine for marking non-overlapping time segments over a media
//! timeline, attaching a label and free text to each, and persisting the
//! result as a project file or a tabular export.
//!
//! The engine modules ([`models`], [`io`], [`util`]) are pure: they never
//! perform file I/O on their own and never log. The [`session`] module is the
//! calling layer that wires them together for an interactive editor or the
//! command-line tool.

pub mod io;
pub mod models;
pub mod session;
pub mod util;

pub use io::catalog::{parse_catalog, CatalogError};
pub use io::csv::export_csv;
pub use io::project::{decode_project, encode_project, ProjectError};
pub use models::label::{Label, LabelCatalog, LabelId};
pub use models::project::{Project, Role};
pub use models::segment::{is_overlap, Segment, SegmentId};
pub use models::timeline::{EditError, SegmentCollection};
pub use session::{EditSession, SessionError};

/// Minimum length of any segment, in milliseconds.
pub const MIN_SEGMENT_MS: i64 = 50;

/// Length proposed for a newly created segment, in milliseconds.
pub const DEFAULT_SEGMENT_MS: i64 = 2000;

/// Largest time magnitude accepted from a project file, in milliseconds.
/// Matches the range in which every integer is exact as an IEEE double.
pub const MAX_TIME_MS: i64 = 1 << 53;

/// Version written into every encoded project file.
pub const PROJECT_VERSION: u32 = 1;

/// Result type for segmark operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for segmark operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Project(#[from] ProjectError),

    #[error(transparent)]
    Edit(#[from] EditError),

    #[error(transparent)]
    Session(#[from] SessionError),
}
