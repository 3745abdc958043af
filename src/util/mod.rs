// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Utility functions for time values, file paths and caller-side snapping.

pub mod path;
pub mod snap;
pub mod time;
