// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Parsing and rendering of catalog, project and export files.

pub mod catalog;
pub mod csv;
pub mod project;
pub mod serialization;
