// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Pipeline driver — reset the output trees, then extract, recognise and
// translate every PDF of the input folder in file-name order, build the
// whole-run aggregate, and convert the results to DOCX.

use std::fs;
use std::path::{Path, PathBuf};

use lesewerk_core::error::Result;
use lesewerk_core::{DocumentId, FailurePolicy, RunConfig};
use lesewerk_document::convert::{convert_directory, has_extension};
use lesewerk_document::{ImageExtractor, OcrEngine};
use lesewerk_translate::Translator;
use tracing::{error, info, instrument, warn};

use super::data_dir::reset_layout;
use super::ocr_runner::OcrRunner;
use crate::state::{DocumentFailure, DocumentReport, RunResult};

/// One run over the input folder.
pub struct Pipeline<'a> {
    config: &'a RunConfig,
    ocr: &'a dyn OcrEngine,
    translator: Option<&'a Translator>,
}

impl<'a> Pipeline<'a> {
    pub fn new(config: &'a RunConfig, ocr: &'a dyn OcrEngine) -> Self {
        Self {
            config,
            ocr,
            translator: None,
        }
    }

    /// Translate aggregates with `translator` when the config names a target.
    pub fn with_translator(mut self, translator: &'a Translator) -> Self {
        self.translator = Some(translator);
        self
    }

    fn translation(&self) -> Option<(&'a Translator, &'a str)> {
        Some((self.translator?, self.config.translate_to.as_deref()?))
    }

    #[instrument(skip_all, fields(input = %self.config.input_dir.display()))]
    pub fn run(&self) -> Result<RunResult> {
        self.config.validate()?;
        let layout = &self.config.layout;
        reset_layout(layout)?;

        let pdfs = list_pdfs(&self.config.input_dir)?;
        info!(pdfs = pdfs.len(), "Starting run");

        let mut result = RunResult {
            global_text_path: layout.global_text(),
            ..RunResult::default()
        };

        for pdf in pdfs {
            let Some(document) = DocumentId::from_path(&pdf) else {
                continue;
            };
            info!(pdf = %pdf.display(), "Processing PDF");

            match self.process_document(&pdf, &document) {
                Ok(report) => {
                    result.global_text.push_str(&document.separator());
                    result.global_text.push_str(&report.aggregate_text);
                    result.reports.push(report);
                }
                Err(err) => match self.config.failure_policy {
                    FailurePolicy::Halt => return Err(err),
                    FailurePolicy::Continue => {
                        error!(pdf = %pdf.display(), %err, "Document failed, continuing");
                        result.failures.push(DocumentFailure {
                            source: pdf,
                            error: err.to_string(),
                        });
                    }
                },
            }
        }

        fs::write(&result.global_text_path, &result.global_text)?;
        info!(path = %result.global_text_path.display(), "Whole-run aggregate written");

        if let Some((translator, target)) = self.translation()
            && !result.global_text.trim().is_empty()
        {
            let outcome = translator.translate(&result.global_text, target);
            if let Some(reason) = outcome.reason() {
                warn!(%reason, "Whole-run translation incomplete");
                result
                    .notes
                    .push(format!("whole-run translation incomplete: {reason}"));
            }
            let path = layout.global_translation(target);
            fs::write(&path, outcome.value())?;
            result.global_translation_path = Some(path);
        }

        result.docx_paths = convert_directory(&layout.results_root)?;
        info!(
            documents = result.documents_processed(),
            failures = result.failures.len(),
            docx = result.docx_paths.len(),
            "Run complete"
        );
        Ok(result)
    }

    fn process_document(&self, pdf: &Path, document: &DocumentId) -> Result<DocumentReport> {
        let image_dir = self.config.layout.image_dir(document);
        let extraction = ImageExtractor::new(self.ocr).extract(pdf, &image_dir)?;

        let mut runner = OcrRunner::new(
            self.ocr,
            &self.config.layout,
            &self.config.recognition_language,
        );
        if let Some((translator, target)) = self.translation() {
            runner = runner.with_translation(translator, target);
        }
        let mut report = runner.run(&image_dir, document)?;

        let mut notes: Vec<String> = extraction
            .skipped
            .iter()
            .map(|reason| format!("{}: image skipped: {reason}", pdf.display()))
            .collect();
        notes.extend(extraction.images.iter().filter_map(|image| {
            image
                .orientation_note
                .as_ref()
                .map(|note| format!("{}: {}", image.path.display(), note))
        }));
        notes.append(&mut report.notes);
        report.notes = notes;
        report.images = extraction.images;
        Ok(report)
    }
}

/// `*.pdf` files directly in `dir`, sorted by file name.
fn list_pdfs(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut pdfs = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && has_extension(&path, "pdf") {
            pdfs.push(path);
        }
    }
    pdfs.sort();
    Ok(pdfs)
}
