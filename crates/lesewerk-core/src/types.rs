// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Lesewerk OCR pipeline.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Stable identifier of a source PDF: its file name without the extension.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DocumentId(String);

impl DocumentId {
    pub fn new(base_name: impl Into<String>) -> Self {
        Self(base_name.into())
    }

    /// Derive the identifier from a PDF path (`pdf/sample.pdf` → `sample`).
    pub fn from_path(path: &Path) -> Option<Self> {
        path.file_stem()
            .map(|stem| Self(stem.to_string_lossy().into_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Separator line that introduces this document in the whole-run
    /// aggregate.
    pub fn separator(&self) -> String {
        format!("\n--- {} ---\n", self.0)
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Outcome of a best-effort operation: either it worked, or a fallback value
/// was substituted and the reason recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    Success(T),
    Degraded { value: T, reason: String },
}

impl<T> Outcome<T> {
    pub fn degraded(value: T, reason: impl Into<String>) -> Self {
        Self::Degraded {
            value,
            reason: reason.into(),
        }
    }

    pub fn value(&self) -> &T {
        match self {
            Self::Success(value) | Self::Degraded { value, .. } => value,
        }
    }

    pub fn into_value(self) -> T {
        match self {
            Self::Success(value) | Self::Degraded { value, .. } => value,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded { .. })
    }

    /// Why the fallback was used, if it was.
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Success(_) => None,
            Self::Degraded { reason, .. } => Some(reason),
        }
    }
}

/// One raster image extracted from a PDF and written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageImage {
    /// 1-based sequence number within its document.
    pub index: u32,
    /// 1-based page the image was found on.
    pub page: u32,
    /// Location of the PNG on disk.
    pub path: PathBuf,
    /// Clockwise rotation applied to make the text upright (0 if none).
    pub rotation: u32,
    /// Set when orientation detection failed and the image was kept as-is.
    pub orientation_note: Option<String>,
}

impl PageImage {
    /// File name for sequence number `index` (`img_0001.png`).
    pub fn file_name(index: u32) -> String {
        format!("img_{index:04}.png")
    }
}

/// Recognition output for a single page image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OcrResult {
    /// Plain text after line-end hyphenation repair.
    pub text: String,
    /// Raw hOCR markup as produced by the engine.
    pub hocr: String,
    /// Tesseract language code the text was recognised with.
    pub language: String,
}
