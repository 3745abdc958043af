// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Project file encoding and decoding.
//!
//! The canonical project format is pretty-printed JSON:
//!
//! ```json
//! {
//!   "version": 1,
//!   "video_path": "/media/clip.mp4",
//!   "labels_path": "/media/labels.xml",
//!   "role": "A",
//!   "segments": [
//!     { "start_ms": 0, "end_ms": 1000, "text": "hello", "label_id": 2 }
//!   ]
//! }
//! ```
//!
//! YAML with the same fields is accepted as an alternate encoding. Decoding
//! is an explicit schema pass over the untyped document so that each
//! violation maps to a precise error, and a single bad segment rejects the
//! whole project.

use crate::models::label::LabelId;
use crate::models::project::{Project, Role};
use crate::models::segment::SegmentRecord;
use crate::models::timeline::SegmentCollection;
use crate::{MAX_TIME_MS, PROJECT_VERSION};
use serde::Serialize;
use serde_json::{Map, Value};
use std::path::Path;

/// Reasons a project document is rejected or cannot be written.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProjectError {
    #[error("invalid project file: {0}")]
    InvalidFormat(String),

    #[error("invalid segment #{index} in project file: {reason}")]
    InvalidSegments { index: usize, reason: String },

    #[error("failed to encode project: {0}")]
    Encode(String),
}

/// On-disk encoding of a project file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProjectFormat {
    #[default]
    Json,
    Yaml,
}

impl ProjectFormat {
    /// Pick the encoding from a file extension; `.yaml`/`.yml` select YAML,
    /// anything else JSON.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|s| s.to_str()) {
            Some("yaml") | Some("yml") => ProjectFormat::Yaml,
            _ => ProjectFormat::Json,
        }
    }
}

#[derive(Serialize)]
struct ProjectFile<'a> {
    version: u32,
    video_path: &'a str,
    labels_path: &'a str,
    role: Role,
    segments: Vec<SegmentRecord>,
}

/// Decode a JSON project document.
pub fn decode_project(text: &str) -> Result<Project, ProjectError> {
    decode_project_as(ProjectFormat::Json, text)
}

/// Decode a project document in the given encoding.
pub fn decode_project_as(format: ProjectFormat, text: &str) -> Result<Project, ProjectError> {
    let raw: Value = match format {
        ProjectFormat::Json => serde_json::from_str(text)
            .map_err(|e| ProjectError::InvalidFormat(format!("not valid JSON: {}", e)))?,
        ProjectFormat::Yaml => serde_yaml::from_str(text)
            .map_err(|e| ProjectError::InvalidFormat(format!("not valid YAML: {}", e)))?,
    };
    decode_value(&raw)
}

/// Encode a project as pretty-printed JSON with segment identifiers stripped.
pub fn encode_project(
    media_path: &str,
    labels_path: &str,
    role: Role,
    segments: &SegmentCollection,
) -> Result<String, ProjectError> {
    encode_project_as(ProjectFormat::Json, media_path, labels_path, role, segments)
}

/// Encode a project in the given encoding.
pub fn encode_project_as(
    format: ProjectFormat,
    media_path: &str,
    labels_path: &str,
    role: Role,
    segments: &SegmentCollection,
) -> Result<String, ProjectError> {
    let file = ProjectFile {
        version: PROJECT_VERSION,
        video_path: media_path,
        labels_path,
        role,
        segments: segments.sorted().records(),
    };
    match format {
        ProjectFormat::Json => {
            serde_json::to_string_pretty(&file).map_err(|e| ProjectError::Encode(e.to_string()))
        }
        ProjectFormat::Yaml => {
            serde_yaml::to_string(&file).map_err(|e| ProjectError::Encode(e.to_string()))
        }
    }
}

fn decode_value(raw: &Value) -> Result<Project, ProjectError> {
    let obj = raw
        .as_object()
        .ok_or_else(|| invalid("top level must be an object"))?;

    let version = obj
        .get("version")
        .and_then(as_whole_number)
        .and_then(|v| u32::try_from(v).ok())
        .ok_or_else(|| invalid("version must be a non-negative integer"))?;

    let media_path = string_field(obj, "video_path", "media_reference")?;
    let labels_path = string_field(obj, "labels_path", "catalog_reference")?;

    let role = obj
        .get("role")
        .and_then(Value::as_str)
        .and_then(|s| s.parse::<Role>().ok())
        .ok_or_else(|| invalid("role must be one of A, B, C, D"))?;

    let entries = obj
        .get("segments")
        .and_then(Value::as_array)
        .ok_or_else(|| invalid("segments must be a list"))?;

    let records = entries
        .iter()
        .enumerate()
        .map(|(index, entry)| decode_segment(index, entry))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Project {
        version,
        media_path,
        labels_path,
        role,
        segments: SegmentCollection::from_records(records),
    })
}

fn decode_segment(index: usize, entry: &Value) -> Result<SegmentRecord, ProjectError> {
    let bad = |reason: &str| ProjectError::InvalidSegments {
        index,
        reason: reason.to_string(),
    };

    let obj = entry.as_object().ok_or_else(|| bad("entry must be an object"))?;
    let start_ms = obj
        .get("start_ms")
        .and_then(as_millis)
        .ok_or_else(|| bad("start_ms must be a finite number within range"))?;
    let end_ms = obj
        .get("end_ms")
        .and_then(as_millis)
        .ok_or_else(|| bad("end_ms must be a finite number within range"))?;
    if start_ms >= end_ms {
        return Err(bad("start_ms must be less than end_ms"));
    }

    let text = obj
        .get("text")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    // Non-numeric label ids default to unlabeled; numeric ones must be whole
    let label_id: Option<LabelId> = match obj.get("label_id") {
        Some(value) if value.is_number() => Some(
            as_whole_number(value).ok_or_else(|| bad("label_id must be an integer"))?,
        ),
        _ => None,
    };

    Ok(SegmentRecord {
        start_ms,
        end_ms,
        text,
        label_id,
    })
}

fn string_field(obj: &Map<String, Value>, key: &str, alias: &str) -> Result<String, ProjectError> {
    obj.get(key)
        .or_else(|| obj.get(alias))
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| invalid(&format!("{} must be a string", key)))
}

/// Finite number rounded to the nearest millisecond, within
/// `[-MAX_TIME_MS, MAX_TIME_MS]`.
fn as_millis(value: &Value) -> Option<i64> {
    let ms = match value.as_i64() {
        Some(ms) => ms,
        None => value
            .as_f64()
            .filter(|f| f.is_finite() && f.abs() <= MAX_TIME_MS as f64)
            .map(|f| f.round() as i64)?,
    };
    (-MAX_TIME_MS..=MAX_TIME_MS).contains(&ms).then_some(ms)
}

/// Integer, or a float with no fractional part.
fn as_whole_number(value: &Value) -> Option<i64> {
    if let Some(n) = value.as_i64() {
        return Some(n);
    }
    value
        .as_f64()
        .filter(|f| f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64)
        .map(|f| f as i64)
}

fn invalid(reason: &str) -> ProjectError {
    ProjectError::InvalidFormat(reason.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_segments() -> SegmentCollection {
        SegmentCollection::from_records([
            SegmentRecord {
                start_ms: 2000,
                end_ms: 3000,
                text: "say \"hi\", then\nleave".to_string(),
                label_id: None,
            },
            SegmentRecord {
                start_ms: 0,
                end_ms: 1000,
                text: "hello".to_string(),
                label_id: Some(2),
            },
        ])
    }

    #[test]
    fn test_json_roundtrip() {
        let segments = sample_segments();
        let text = encode_project("/m/clip.mp4", "/m/labels.xml", Role::C, &segments).unwrap();
        let project = decode_project(&text).unwrap();
        assert_eq!(project.version, 1);
        assert_eq!(project.media_path, "/m/clip.mp4");
        assert_eq!(project.labels_path, "/m/labels.xml");
        assert_eq!(project.role, Role::C);
        assert_eq!(project.segments.records(), segments.records());
    }

    #[test]
    fn test_yaml_roundtrip() {
        let segments = sample_segments();
        let text =
            encode_project_as(ProjectFormat::Yaml, "clip.mp4", "labels.xml", Role::B, &segments)
                .unwrap();
        let project = decode_project_as(ProjectFormat::Yaml, &text).unwrap();
        assert_eq!(project.role, Role::B);
        assert_eq!(project.segments.records(), segments.records());
    }

    #[test]
    fn test_encode_writes_canonical_fields() {
        let text = encode_project("v.mp4", "l.xml", Role::A, &sample_segments()).unwrap();
        let value: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["version"], 1);
        assert_eq!(value["video_path"], "v.mp4");
        assert_eq!(value["labels_path"], "l.xml");
        assert_eq!(value["role"], "A");
        assert_eq!(value["segments"][0]["start_ms"], 0);
        assert_eq!(value["segments"][1]["label_id"], Value::Null);
        assert!(value["segments"][0].get("id").is_none());
    }

    #[test]
    fn test_decode_defaults_and_aliases() {
        let text = r#"{
            "version": 1,
            "media_reference": "clip.mp4",
            "catalog_reference": "labels.xml",
            "role": "D",
            "segments": [
                { "start_ms": 1500.4, "end_ms": 2000 },
                { "start_ms": 0, "end_ms": 100, "text": 7, "label_id": "x" }
            ]
        }"#;
        let project = decode_project(text).unwrap();
        assert_eq!(project.media_path, "clip.mp4");
        assert_eq!(project.labels_path, "labels.xml");
        let records = project.segments.records();
        assert_eq!(records[0].start_ms, 0);
        assert_eq!(records[0].text, "");
        assert_eq!(records[0].label_id, None);
        assert_eq!(records[1].start_ms, 1500);
    }

    #[test]
    fn test_decode_rejects_malformed_input() {
        assert!(matches!(decode_project("{not json"), Err(ProjectError::InvalidFormat(_))));
        assert!(matches!(decode_project("[]"), Err(ProjectError::InvalidFormat(_))));
    }

    #[test]
    fn test_decode_rejects_bad_fields() {
        let cases = [
            r#"{"version":"1","video_path":"v","labels_path":"l","role":"A","segments":[]}"#,
            r#"{"version":1,"video_path":3,"labels_path":"l","role":"A","segments":[]}"#,
            r#"{"version":1,"video_path":"v","role":"A","segments":[]}"#,
            r#"{"version":1,"video_path":"v","labels_path":"l","role":"E","segments":[]}"#,
            r#"{"version":1,"video_path":"v","labels_path":"l","role":"A","segments":{}}"#,
        ];
        for case in cases {
            assert!(
                matches!(decode_project(case), Err(ProjectError::InvalidFormat(_))),
                "accepted {}",
                case
            );
        }
    }

    #[test]
    fn test_decode_rejects_whole_project_on_bad_segment() {
        let text = r#"{"version":1,"video_path":"v","labels_path":"l","role":"A","segments":[
            {"start_ms":0,"end_ms":1000},
            {"start_ms":3000,"end_ms":2000}
        ]}"#;
        assert_eq!(
            decode_project(text),
            Err(ProjectError::InvalidSegments {
                index: 1,
                reason: "start_ms must be less than end_ms".to_string()
            })
        );

        let text = r#"{"version":1,"video_path":"v","labels_path":"l","role":"A","segments":[
            {"start_ms":"0","end_ms":1000}
        ]}"#;
        assert!(matches!(
            decode_project(text),
            Err(ProjectError::InvalidSegments { index: 0, .. })
        ));
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(ProjectFormat::from_path(Path::new("a.yaml")), ProjectFormat::Yaml);
        assert_eq!(ProjectFormat::from_path(Path::new("a.yml")), ProjectFormat::Yaml);
        assert_eq!(ProjectFormat::from_path(Path::new("a.ann")), ProjectFormat::Json);
        assert_eq!(ProjectFormat::from_path(Path::new("a")), ProjectFormat::Json);
    }

    #[test]
    fn test_decode_rejects_out_of_range_times() {
        let text = r#"{"version":1,"video_path":"v","labels_path":"l","role":"A","segments":[
            {"start_ms":0,"end_ms":9223372036854775807}
        ]}"#;
        assert!(matches!(
            decode_project(text),
            Err(ProjectError::InvalidSegments { index: 0, .. })
        ));

        let text = r#"{"version":1,"video_path":"v","labels_path":"l","role":"A","segments":[
            {"start_ms":-1e300,"end_ms":1000}
        ]}"#;
        assert!(matches!(
            decode_project(text),
            Err(ProjectError::InvalidSegments { index: 0, .. })
        ));

        let text = format!(
            r#"{{"version":1,"video_path":"v","labels_path":"l","role":"A","segments":[
                {{"start_ms":0,"end_ms":{}}}
            ]}}"#,
            MAX_TIME_MS
        );
        let project = decode_project(&text).unwrap();
        assert_eq!(project.segments.records()[0].end_ms, MAX_TIME_MS);
    }

    #[test]
    fn test_decode_rejects_fractional_label_id() {
        let text = r#"{"version":1,"video_path":"v","labels_path":"l","role":"A","segments":[
            {"start_ms":0,"end_ms":1000,"label_id":1.5}
        ]}"#;
        assert_eq!(
            decode_project(text),
            Err(ProjectError::InvalidSegments {
                index: 0,
                reason: "label_id must be an integer".to_string()
            })
        );

        let text = r#"{"version":1,"video_path":"v","labels_path":"l","role":"A","segments":[
            {"start_ms":0,"end_ms":1000,"label_id":3.0}
        ]}"#;
        assert_eq!(decode_project(text).unwrap().segments.records()[0].label_id, Some(3));
    }

    #[test]
    fn test_decode_version_must_be_whole_and_non_negative() {
        for version in ["-1", "1.5", "4294967296"] {
            let text = format!(
                r#"{{"version":{},"video_path":"v","labels_path":"l","role":"A","segments":[]}}"#,
                version
            );
            assert!(
                matches!(decode_project(&text), Err(ProjectError::InvalidFormat(_))),
                "accepted version {}",
                version
            );
        }
        let text = r#"{"version":2.0,"video_path":"v","labels_path":"l","role":"A","segments":[]}"#;
        assert_eq!(decode_project(text).unwrap().version, 2);
    }
}
