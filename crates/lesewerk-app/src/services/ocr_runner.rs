// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// OCR runner — recognise every image of one document and write its text,
// HTML and hOCR artifacts plus the document aggregates.

use std::fs;
use std::path::{Path, PathBuf};

use lesewerk_core::error::{LesewerkError, Result};
use lesewerk_core::{DocumentId, OcrResult, OutputLayout};
use lesewerk_document::OcrEngine;
use lesewerk_document::convert::has_extension;
use lesewerk_document::scan::{hocr, text};
use lesewerk_translate::Translator;
use tracing::{debug, info, instrument, warn};

use super::data_dir::ensure_dir;
use crate::state::DocumentReport;

/// Runs recognition over a folder of page images.
pub struct OcrRunner<'a> {
    engine: &'a dyn OcrEngine,
    layout: &'a OutputLayout,
    language: &'a str,
    translation: Option<(&'a Translator, &'a str)>,
}

/// Aggregates and artifacts from one run over a folder.
struct Recognised {
    aggregate_text: String,
    aggregate_html: String,
    notes: Vec<String>,
}

impl<'a> OcrRunner<'a> {
    pub fn new(engine: &'a dyn OcrEngine, layout: &'a OutputLayout, language: &'a str) -> Self {
        Self {
            engine,
            layout,
            language,
            translation: None,
        }
    }

    /// Also translate the document aggregate into `target`.
    pub fn with_translation(mut self, translator: &'a Translator, target: &'a str) -> Self {
        self.translation = Some((translator, target));
        self
    }

    /// Recognise every `*.png` in `image_dir` (file-name order) for
    /// `document`.
    ///
    /// Writes, per image, `TXT/<base>/<image>.txt`, `HTML/<base>/<image>.html`
    /// and `HTML/<base>/<image>.hocr`; then the aggregate
    /// `<results>/<base>_libro.txt`, `HTML/<base>/<base>_libro.html` and, when
    /// translating a non-blank aggregate, the translated text.
    #[instrument(skip_all, fields(document = %document, language = %self.language))]
    pub fn run(&self, image_dir: &Path, document: &DocumentId) -> Result<DocumentReport> {
        let text_dir = self.layout.text_dir(document);
        let html_dir = self.layout.html_dir(document);
        ensure_dir(&text_dir)?;
        ensure_dir(&html_dir)?;
        ensure_dir(&self.layout.results_root)?;

        let images = list_images(image_dir)?;
        info!(images = images.len(), "Running OCR");

        let recognised = self.recognise_all(&images, &text_dir, &html_dir)?;
        let mut notes = recognised.notes;

        let text_path = self.layout.document_text(document);
        write_artifact(&text_path, &recognised.aggregate_text)?;
        let html_path = self.layout.document_html(document);
        write_artifact(&html_path, &recognised.aggregate_html)?;

        let mut translation_path = None;
        if let Some((translator, target)) = self.translation
            && !recognised.aggregate_text.trim().is_empty()
        {
            let outcome = translator.translate(&recognised.aggregate_text, target);
            if let Some(reason) = outcome.reason() {
                notes.push(format!("{document}: translation incomplete: {reason}"));
            }
            let path = self.layout.document_translation(document, target);
            write_artifact(&path, outcome.value())?;
            info!(path = %path.display(), "Translation written");
            translation_path = Some(path);
        }

        Ok(DocumentReport {
            document: document.clone(),
            images: Vec::new(),
            aggregate_text: recognised.aggregate_text,
            text_path,
            html_path,
            translation_path,
            notes,
        })
    }

    fn recognise_all(
        &self,
        images: &[PathBuf],
        text_dir: &Path,
        html_dir: &Path,
    ) -> Result<Recognised> {
        let mut recognised = Recognised {
            aggregate_text: String::new(),
            aggregate_html: String::new(),
            notes: Vec::new(),
        };

        for image in images {
            let name = image
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            debug!(image = %name, "Recognising");

            let result = self.recognise(image)?;
            debug!(
                image = %name,
                language = %result.language,
                chars = result.text.chars().count(),
                "Recognised"
            );
            let pretty = hocr::prettify(&result.hocr);
            if let Some(reason) = pretty.reason() {
                warn!(image = %name, %reason, "hOCR kept unformatted");
                recognised
                    .notes
                    .push(format!("{name}: hOCR kept unformatted: {reason}"));
            }
            let pretty = pretty.into_value();

            write_artifact(&text_dir.join(format!("{name}.txt")), &format!("{}\n", result.text))?;
            write_artifact(&html_dir.join(format!("{name}.html")), &pretty)?;
            write_artifact(&html_dir.join(format!("{name}.hocr")), &format!("{}\n", result.hocr))?;

            recognised.aggregate_text.push_str(&result.text);
            recognised.aggregate_text.push('\n');
            recognised.aggregate_html.push_str(&pretty);
        }

        Ok(recognised)
    }

    fn recognise(&self, image: &Path) -> Result<OcrResult> {
        let raw_text = self.engine.recognize_text(image, self.language)?;
        let hocr_bytes = self.engine.recognize_hocr(image, self.language)?;
        let hocr = String::from_utf8(hocr_bytes).map_err(|err| {
            LesewerkError::OcrError(format!(
                "hOCR for {} is not UTF-8: {}",
                image.display(),
                err
            ))
        })?;

        Ok(OcrResult {
            text: text::repair_hyphenation(&raw_text),
            hocr,
            language: self.language.to_string(),
        })
    }
}

/// `*.png` files directly in `dir`, sorted by file name.
fn list_images(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut images = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && has_extension(&path, "png") {
            images.push(path);
        }
    }
    images.sort();
    Ok(images)
}

fn write_artifact(path: &Path, contents: &str) -> Result<()> {
    fs::write(path, contents).map_err(|err| {
        LesewerkError::Io(std::io::Error::new(
            err.kind(),
            format!("cannot write {}: {}", path.display(), err),
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::{CannedOcr, Identity};
    use lesewerk_translate::RetryConfig;

    fn image_folder(dir: &Path, names: &[&str]) -> PathBuf {
        let images = dir.join("IMG").join("sample");
        fs::create_dir_all(&images).expect("mkdir");
        for name in names {
            fs::write(images.join(name), b"png").expect("write");
        }
        images
    }

    #[test]
    fn recognition_result_is_repaired_and_tagged_with_language() {
        let dir = tempfile::tempdir().expect("tempdir");
        let images = image_folder(dir.path(), &["img_0001.png"]);
        let layout = OutputLayout::under(dir.path());
        let engine = CannedOcr::default().with_text("img_0001.png", "cam-\nmino");

        let result = OcrRunner::new(&engine, &layout, "ita")
            .recognise(&images.join("img_0001.png"))
            .expect("recognise");

        assert_eq!(result.text, "cammino");
        assert_eq!(result.language, "ita");
        assert!(!result.hocr.is_empty());
    }

    #[test]
    fn writes_per_image_and_aggregate_artifacts() {
        let dir = tempfile::tempdir().expect("tempdir");
        let images = image_folder(dir.path(), &["img_0002.png", "img_0001.png", "notes.txt"]);
        let layout = OutputLayout::under(dir.path());
        let engine = CannedOcr::default()
            .with_text("img_0001.png", "exam-\nple one")
            .with_text("img_0002.png", "two");
        let doc = DocumentId::new("sample");

        let report = OcrRunner::new(&engine, &layout, "eng")
            .run(&images, &doc)
            .expect("run");

        assert_eq!(report.aggregate_text, "example one\ntwo\n");
        assert_eq!(
            fs::read_to_string(layout.document_text(&doc)).expect("aggregate"),
            "example one\ntwo\n"
        );
        let text_dir = layout.text_dir(&doc);
        assert_eq!(
            fs::read_to_string(text_dir.join("img_0001.png.txt")).expect("per image"),
            "example one\n"
        );
        let html_dir = layout.html_dir(&doc);
        assert!(html_dir.join("img_0001.png.html").is_file());
        let raw = fs::read_to_string(html_dir.join("img_0002.png.hocr")).expect("hocr");
        assert!(raw.ends_with("</html>\n"));
        assert!(layout.document_html(&doc).is_file());
        assert!(report.translation_path.is_none());
        assert!(report.notes.is_empty());
        assert_eq!(engine.languages_seen(), ["eng"; 4]);
    }

    #[test]
    fn aggregate_html_concatenates_pretty_markup_in_order() {
        let dir = tempfile::tempdir().expect("tempdir");
        let images = image_folder(dir.path(), &["img_0001.png", "img_0002.png"]);
        let layout = OutputLayout::under(dir.path());
        let engine = CannedOcr::default();
        let doc = DocumentId::new("sample");

        let report = OcrRunner::new(&engine, &layout, "ita")
            .run(&images, &doc)
            .expect("run");

        let html_dir = layout.html_dir(&doc);
        let first = fs::read_to_string(html_dir.join("img_0001.png.html")).expect("first");
        let second = fs::read_to_string(html_dir.join("img_0002.png.html")).expect("second");
        let aggregate = fs::read_to_string(&report.html_path).expect("aggregate");
        assert_eq!(aggregate, format!("{first}{second}"));
    }

    #[test]
    fn malformed_hocr_is_kept_raw_and_noted() {
        let dir = tempfile::tempdir().expect("tempdir");
        let images = image_folder(dir.path(), &["img_0001.png"]);
        let layout = OutputLayout::under(dir.path());
        let engine = CannedOcr::default().with_hocr("img_0001.png", "<div><span>x</div>");
        let doc = DocumentId::new("sample");

        let report = OcrRunner::new(&engine, &layout, "eng")
            .run(&images, &doc)
            .expect("run");

        let html = fs::read_to_string(layout.html_dir(&doc).join("img_0001.png.html"))
            .expect("html");
        assert_eq!(html, "<div><span>x</div>");
        assert_eq!(report.notes.len(), 1);
    }

    #[test]
    fn translation_written_when_aggregate_has_text() {
        let dir = tempfile::tempdir().expect("tempdir");
        let images = image_folder(dir.path(), &["img_0001.png"]);
        let layout = OutputLayout::under(dir.path());
        let engine = CannedOcr::default().with_text("img_0001.png", "ciao");
        let translator = Translator::new(Identity).with_retry(RetryConfig::none());
        let doc = DocumentId::new("sample");

        let report = OcrRunner::new(&engine, &layout, "ita")
            .with_translation(&translator, "en")
            .run(&images, &doc)
            .expect("run");

        let path = report.translation_path.expect("translated");
        assert_eq!(path, layout.document_translation(&doc, "en"));
        assert_eq!(fs::read_to_string(path).expect("read"), "ciao\n");
    }

    #[test]
    fn blank_aggregate_skips_translation() {
        let dir = tempfile::tempdir().expect("tempdir");
        let images = image_folder(dir.path(), &["img_0001.png"]);
        let layout = OutputLayout::under(dir.path());
        let engine = CannedOcr::default().with_text("img_0001.png", "  \n");
        let translator = Translator::new(Identity);
        let doc = DocumentId::new("sample");

        let report = OcrRunner::new(&engine, &layout, "ita")
            .with_translation(&translator, "en")
            .run(&images, &doc)
            .expect("run");

        assert!(report.translation_path.is_none());
        assert!(!layout.document_translation(&doc, "en").exists());
    }

    #[test]
    fn recognition_failure_propagates() {
        let dir = tempfile::tempdir().expect("tempdir");
        let images = image_folder(dir.path(), &["img_0001.png"]);
        let layout = OutputLayout::under(dir.path());
        let engine = CannedOcr::default().failing_on("img_0001.png");

        let result = OcrRunner::new(&engine, &layout, "eng").run(&images, &DocumentId::new("sample"));

        assert!(matches!(result, Err(LesewerkError::OcrError(_))));
    }

    #[test]
    fn empty_folder_yields_empty_aggregates() {
        let dir = tempfile::tempdir().expect("tempdir");
        let images = image_folder(dir.path(), &[]);
        let layout = OutputLayout::under(dir.path());
        let engine = CannedOcr::default();
        let doc = DocumentId::new("sample");

        let report = OcrRunner::new(&engine, &layout, "eng")
            .run(&images, &doc)
            .expect("run");

        assert_eq!(report.aggregate_text, "");
        assert_eq!(fs::read_to_string(&report.text_path).expect("read"), "");
    }
}
