// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! I/O module - capture ingest, STL files, and reports

mod ingest;
mod report;
mod stl;

pub use ingest::{from_flat_buffers, merge_index_buffers, merge_submeshes, Submesh};
pub use report::{MeasurementError, MeasurementRecord, MeasurementReport};
pub use stl::{read_stl, write_stl};
