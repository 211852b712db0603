// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Lesewerk.

use std::time::Duration;

use thiserror::Error;

/// Top-level error type for all Lesewerk operations.
#[derive(Debug, Error)]
pub enum LesewerkError {
    // -- Extraction errors --
    #[error("PDF operation failed: {0}")]
    PdfError(String),

    #[error("unsupported image encoding: {0}")]
    UnsupportedImage(String),

    #[error("image processing failed: {0}")]
    ImageError(String),

    // -- OCR errors --
    #[error("OCR failed: {0}")]
    OcrError(String),

    #[error("OCR executable could not be run: {0}")]
    Executable(String),

    // -- Translation errors --
    #[error("translation request failed: {0}")]
    Translation(String),

    #[error("translation service returned HTTP {status}: {message}")]
    TranslationStatus {
        status: u16,
        message: String,
        /// Wait requested by the service through `Retry-After`.
        retry_after: Option<Duration>,
    },

    #[error("unexpected translation response: {0}")]
    TranslationResponse(String),

    // -- Output errors --
    #[error("DOCX generation failed: {0}")]
    DocxError(String),

    // -- Configuration --
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, LesewerkError>;
