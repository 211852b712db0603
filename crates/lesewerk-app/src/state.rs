// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Run state — what each stage hands back to the driver, folded into one
// summary per run.

use std::path::PathBuf;

use lesewerk_core::{DocumentId, PageImage};

/// Outcome of processing one PDF.
#[derive(Debug, Clone)]
pub struct DocumentReport {
    pub document: DocumentId,
    /// Images extracted, in sequence order.
    pub images: Vec<PageImage>,
    /// Untranslated aggregate: each image's repaired text plus `\n`.
    pub aggregate_text: String,
    /// `<results>/<base>_libro.txt`
    pub text_path: PathBuf,
    /// `HTML/<base>/<base>_libro.html`
    pub html_path: PathBuf,
    /// Translated aggregate, when translation ran.
    pub translation_path: Option<PathBuf>,
    /// Images skipped for their encoding, plus best-effort steps that fell
    /// back (orientation, hOCR layout, translation).
    pub notes: Vec<String>,
}

/// A document the driver gave up on under `FailurePolicy::Continue`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentFailure {
    pub source: PathBuf,
    pub error: String,
}

/// Everything a run produced.
#[derive(Debug, Clone, Default)]
pub struct RunResult {
    pub reports: Vec<DocumentReport>,
    pub failures: Vec<DocumentFailure>,
    /// Whole-run aggregate written to `libro.txt`.
    pub global_text: String,
    pub global_text_path: PathBuf,
    pub global_translation_path: Option<PathBuf>,
    /// DOCX files written from the results folder.
    pub docx_paths: Vec<PathBuf>,
    /// Run-level fallbacks (discovery, global translation).
    pub notes: Vec<String>,
}

impl RunResult {
    pub fn documents_processed(&self) -> usize {
        self.reports.len()
    }

    pub fn images_processed(&self) -> usize {
        self.reports.iter().map(|r| r.images.len()).sum()
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    /// Degraded notes from the run and every document, in order.
    pub fn all_notes(&self) -> impl Iterator<Item = &str> {
        self.notes
            .iter()
            .chain(self.reports.iter().flat_map(|r| r.notes.iter()))
            .map(String::as_str)
    }
}
