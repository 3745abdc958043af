// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Data models for segments, labels and annotation projects.

pub mod label;
pub mod project;
pub mod segment;
pub mod timeline;
