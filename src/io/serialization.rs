// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Reading and writing project and catalog files.
//!
//! Thin file wrappers around the codecs; the encoding of a project file is
//! chosen from its extension.

use super::catalog::parse_catalog;
use super::project::{decode_project_as, encode_project_as, ProjectFormat};
use crate::models::label::LabelCatalog;
use crate::models::project::Project;
use crate::Result;
use std::path::Path;

/// Write a project file, JSON or YAML depending on the extension.
pub fn write_project(project: &Project, path: &Path) -> Result<()> {
    let text = encode_project_as(
        ProjectFormat::from_path(path),
        &project.media_path,
        &project.labels_path,
        project.role,
        &project.segments,
    )?;
    std::fs::write(path, text)?;
    Ok(())
}

/// Read a project file, JSON or YAML depending on the extension.
pub fn read_project(path: &Path) -> Result<Project> {
    let text = std::fs::read_to_string(path)?;
    let project = decode_project_as(ProjectFormat::from_path(path), &text)?;
    Ok(project)
}

/// Read and validate a label catalog file.
pub fn read_catalog(path: &Path) -> Result<LabelCatalog> {
    let text = std::fs::read_to_string(path)?;
    let catalog = parse_catalog(&text)?;
    Ok(catalog)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::project::Role;
    use crate::models::segment::SegmentRecord;
    use crate::models::timeline::SegmentCollection;
    use std::path::PathBuf;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("segmark-{}-{}", std::process::id(), name))
    }

    fn sample_project() -> Project {
        let mut project = Project::new("clip.mp4".into(), "labels.xml".into(), Role::B);
        project.segments = SegmentCollection::from_records([SegmentRecord {
            start_ms: 100,
            end_ms: 900,
            text: "note".into(),
            label_id: Some(1),
        }]);
        project
    }

    #[test]
    fn test_project_file_roundtrip_json_and_yaml() {
        for name in ["roundtrip.ann", "roundtrip.yaml"] {
            let path = temp_path(name);
            let project = sample_project();
            write_project(&project, &path).unwrap();
            let loaded = read_project(&path).unwrap();
            std::fs::remove_file(&path).ok();

            assert_eq!(loaded.role, Role::B);
            assert_eq!(loaded.segments.records(), project.segments.records());
        }
    }

    #[test]
    fn test_yaml_extension_writes_yaml() {
        let path = temp_path("format.yml");
        write_project(&sample_project(), &path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert!(text.contains("video_path: clip.mp4"));
    }

    #[test]
    fn test_read_missing_files() {
        let path = temp_path("does-not-exist.ann");
        assert!(matches!(read_project(&path), Err(crate::Error::Io(_))));
        assert!(matches!(read_catalog(&path), Err(crate::Error::Io(_))));
    }

    #[test]
    fn test_read_catalog_reports_parse_errors() {
        let path = temp_path("labels.xml");
        std::fs::write(&path, r#"<labels><label id="0" display="A"/></labels>"#).unwrap();
        let result = read_catalog(&path);
        std::fs::remove_file(&path).ok();
        assert!(matches!(
            result,
            Err(crate::Error::Catalog(crate::CatalogError::MissingVersion))
        ));
    }
}
