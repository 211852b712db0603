// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// lesewerk-document — Document processing for the Lesewerk OCR pipeline.
//
// Provides embedded-image extraction from PDFs, image orientation correction,
// the OCR engine seam with its Tesseract command-line implementation, OCR text
// and hOCR post-processing, and plain-text to DOCX conversion.

pub mod convert;
pub mod docx;
pub mod extract;
pub mod image;
pub mod pdf;
pub mod scan;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

// Re-export the primary structs so callers can use `lesewerk_document::PdfReader` etc.
pub use docx::DocxWriter;
pub use extract::{Extraction, ImageExtractor};
pub use crate::image::processor::ImageProcessor;
pub use pdf::reader::PdfReader;
pub use scan::ocr::{OcrEngine, TesseractCli};
