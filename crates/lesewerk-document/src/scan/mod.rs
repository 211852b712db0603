// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scanning pipeline — the OCR engine seam, the Tesseract command-line engine
// and its discovery, and post-processing of recognised text and hOCR.

pub mod hocr;
pub mod locate;
pub mod ocr;
pub mod text;

pub use locate::{HostSystem, LocateStrategy, SystemProbe};
pub use ocr::{OcrEngine, TesseractCli};
