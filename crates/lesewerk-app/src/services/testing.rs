// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Test doubles for the OCR engine and translation service.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::path::Path;

use lesewerk_core::error::{LesewerkError, Result};
use lesewerk_document::OcrEngine;
use lesewerk_translate::TranslationService;

/// OCR engine answering from canned per-image data, keyed by file name.
#[derive(Default)]
pub struct CannedOcr {
    texts: HashMap<String, String>,
    hocr: HashMap<String, String>,
    rotations: HashMap<String, u32>,
    failing: HashSet<String>,
    languages: RefCell<Vec<String>>,
}

impl CannedOcr {
    pub fn with_text(mut self, image: &str, text: &str) -> Self {
        self.texts.insert(image.to_string(), text.to_string());
        self
    }

    pub fn with_hocr(mut self, image: &str, hocr: &str) -> Self {
        self.hocr.insert(image.to_string(), hocr.to_string());
        self
    }

    pub fn with_rotation(mut self, image: &str, degrees: u32) -> Self {
        self.rotations.insert(image.to_string(), degrees);
        self
    }

    pub fn failing_on(mut self, image: &str) -> Self {
        self.failing.insert(image.to_string());
        self
    }

    /// Languages passed to recognition calls, in call order.
    pub fn languages_seen(&self) -> Vec<String> {
        self.languages.borrow().clone()
    }

    fn name(image: &Path) -> String {
        image
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    fn check(&self, image: &Path, language: &str) -> Result<String> {
        self.languages.borrow_mut().push(language.to_string());
        let name = Self::name(image);
        if self.failing.contains(&name) {
            return Err(LesewerkError::OcrError(format!("cannot read {name}")));
        }
        Ok(name)
    }
}

impl OcrEngine for CannedOcr {
    fn detect_orientation(&self, image: &Path) -> Result<u32> {
        Ok(self.rotations.get(&Self::name(image)).copied().unwrap_or(0))
    }

    fn recognize_text(&self, image: &Path, language: &str) -> Result<String> {
        let name = self.check(image, language)?;
        Ok(self
            .texts
            .get(&name)
            .cloned()
            .unwrap_or_else(|| format!("text of {name}")))
    }

    fn recognize_hocr(&self, image: &Path, language: &str) -> Result<Vec<u8>> {
        let name = self.check(image, language)?;
        let markup = self.hocr.get(&name).cloned().unwrap_or_else(|| {
            format!(
                "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<html xmlns=\"http://www.w3.org/1999/xhtml\"><body><div class='ocr_page'><span class='ocrx_word'>{name}</span></div></body></html>"
            )
        });
        Ok(markup.into_bytes())
    }

    fn available_languages(&self) -> Result<Vec<String>> {
        Ok(vec!["eng".to_string(), "ita".to_string(), "osd".to_string()])
    }
}

/// Translation service that returns its input.
pub struct Identity;

impl TranslationService for Identity {
    fn translate_chunk(&self, text: &str, _target: &str) -> Result<String> {
        Ok(text.to_string())
    }
}

/// Translation service that is always down.
pub struct Offline;

impl TranslationService for Offline {
    fn translate_chunk(&self, _text: &str, _target: &str) -> Result<String> {
        Err(LesewerkError::Translation("network unreachable".to_string()))
    }
}
