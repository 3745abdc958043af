// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Label catalog parsing.
//!
//! A catalog is an XML document with a `labels` element carrying a
//! `version` attribute and `label` children carrying `id` and `display`:
//!
//! ```xml
//! <labels version="1.0">
//!   <label id="0" display="Confident" />
//!   <label id="1" display="Neutral" />
//! </labels>
//! ```
//!
//! Any violation rejects the whole document.

use crate::models::label::{Label, LabelCatalog, LabelId};
use std::collections::HashSet;

/// Reasons a catalog document is rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("label catalog is not well-formed XML: {0}")]
    MalformedDocument(String),

    #[error("label catalog has no <labels> element")]
    MissingRoot,

    #[error("<labels> requires a non-empty version attribute")]
    MissingVersion,

    #[error("label #{index} is missing its {field} attribute")]
    MissingField { index: usize, field: &'static str },

    #[error("label id '{0}' is not an integer")]
    InvalidId(String),

    #[error("label id {0} appears more than once")]
    DuplicateId(LabelId),
}

/// Parse and validate a label catalog document.
pub fn parse_catalog(text: &str) -> Result<LabelCatalog, CatalogError> {
    let doc = roxmltree::Document::parse(text)
        .map_err(|e| CatalogError::MalformedDocument(e.to_string()))?;

    let root = doc
        .descendants()
        .find(|node| node.has_tag_name("labels"))
        .ok_or(CatalogError::MissingRoot)?;

    let version = root
        .attribute("version")
        .filter(|v| !v.is_empty())
        .ok_or(CatalogError::MissingVersion)?;

    let mut labels = Vec::new();
    let mut seen = HashSet::new();

    for (index, node) in root
        .descendants()
        .filter(|node| node.has_tag_name("label"))
        .enumerate()
    {
        let raw_id = node.attribute("id").ok_or(CatalogError::MissingField {
            index,
            field: "id",
        })?;
        let display = node.attribute("display").ok_or(CatalogError::MissingField {
            index,
            field: "display",
        })?;
        let id: LabelId = raw_id
            .trim()
            .parse()
            .map_err(|_| CatalogError::InvalidId(raw_id.to_string()))?;
        if !seen.insert(id) {
            return Err(CatalogError::DuplicateId(id));
        }
        labels.push(Label {
            id,
            display: display.to_string(),
        });
    }

    Ok(LabelCatalog::from_validated(version.to_string(), labels))
}
