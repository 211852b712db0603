// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF module — locating and decoding the raster images embedded in pages.

pub mod decode;
pub mod reader;

pub use reader::{ImageRef, PdfReader};
