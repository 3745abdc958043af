// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Label catalog data structures.

/// Identifier of a label within its catalog.
pub type LabelId = i64;

/// One entry of a label catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label {
    pub id: LabelId,
    pub display: String,
}

/// An ordered, versioned set of labels with unique identifiers.
///
/// Entries keep document order for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelCatalog {
    pub version: String,
    labels: Vec<Label>,
}

impl LabelCatalog {
    /// Build a catalog from labels already checked for unique identifiers.
    pub(crate) fn from_validated(version: String, labels: Vec<Label>) -> Self {
        Self { version, labels }
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    pub fn get(&self, id: LabelId) -> Option<&Label> {
        self.labels.iter().find(|label| label.id == id)
    }

    pub fn contains(&self, id: LabelId) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}
