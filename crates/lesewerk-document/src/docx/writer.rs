// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// DOCX writer — package plain text as a single-paragraph Word document using
// `zip` for the container and `quick-xml` for escaping.
//
// The package holds only the parts Word needs to open it:
//
// - `[Content_Types].xml`
// - `_rels/.rels`
// - `word/document.xml`
// - `docProps/core.xml`

use std::fmt::Write as _;
use std::fs;
use std::io::{Cursor, Write};
use std::path::Path;

use lesewerk_core::error::LesewerkError;
use quick_xml::escape::escape;
use tracing::{debug, instrument};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/><Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/></Types>"#;

const PACKAGE_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="docProps/core.xml"/></Relationships>"#;

const DOCUMENT_HEAD: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body><w:p><w:r>"#;

const DOCUMENT_TAIL: &str = "</w:r></w:p><w:sectPr/></w:body></w:document>";

/// Writes plain text into `.docx` files.
///
/// The whole text becomes one paragraph with one run: line breaks map to
/// `<w:br/>`, tabs to `<w:tab/>`, and everything else is kept verbatim.
#[derive(Debug, Clone, Default)]
pub struct DocxWriter {
    title: Option<String>,
}

impl DocxWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the title stored in the document properties.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    // -- Output ---------------------------------------------------------------

    /// Write `text` to `path` as a DOCX package, replacing any existing file.
    #[instrument(skip_all, fields(path = %path.as_ref().display(), text_len = text.len()))]
    pub fn write_paragraph(&self, text: &str, path: impl AsRef<Path>) -> Result<(), LesewerkError> {
        let path = path.as_ref();
        let bytes = self.to_bytes(text)?;
        fs::write(path, &bytes).map_err(|err| {
            LesewerkError::DocxError(format!("failed to write {}: {}", path.display(), err))
        })?;
        debug!(bytes = bytes.len(), "DOCX written");
        Ok(())
    }

    /// Build the DOCX package in memory.
    ///
    /// Entries carry a fixed timestamp so equal text always yields equal
    /// bytes.
    pub fn to_bytes(&self, text: &str) -> Result<Vec<u8>, LesewerkError> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .last_modified_time(DateTime::default());

        let parts = [
            ("[Content_Types].xml", CONTENT_TYPES.to_string()),
            ("_rels/.rels", PACKAGE_RELS.to_string()),
            ("word/document.xml", document_xml(text)),
            ("docProps/core.xml", self.core_xml()),
        ];
        for (name, body) in parts {
            zip.start_file(name, options)
                .map_err(|err| LesewerkError::DocxError(format!("failed to add {name}: {err}")))?;
            zip.write_all(body.as_bytes())
                .map_err(|err| LesewerkError::DocxError(format!("failed to write {name}: {err}")))?;
        }

        let cursor = zip
            .finish()
            .map_err(|err| LesewerkError::DocxError(format!("failed to finish package: {err}")))?;
        Ok(cursor.into_inner())
    }

    fn core_xml(&self) -> String {
        let title = self.title.as_deref().map(sanitize).unwrap_or_default();
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/"><dc:title>{}</dc:title><dc:creator>lesewerk</dc:creator></cp:coreProperties>"#,
            escape(title.as_str())
        )
    }
}

/// `word/document.xml` for a single run holding `text`.
fn document_xml(text: &str) -> String {
    let text = sanitize(text);
    let mut xml = String::with_capacity(DOCUMENT_HEAD.len() + text.len() + 64);
    xml.push_str(DOCUMENT_HEAD);

    let mut segment = String::new();
    for ch in text.chars() {
        match ch {
            '\n' | '\t' => {
                flush_segment(&mut xml, &mut segment);
                xml.push_str(if ch == '\n' { "<w:br/>" } else { "<w:tab/>" });
            }
            _ => segment.push(ch),
        }
    }
    flush_segment(&mut xml, &mut segment);

    xml.push_str(DOCUMENT_TAIL);
    xml
}

fn flush_segment(xml: &mut String, segment: &mut String) {
    if segment.is_empty() {
        return;
    }
    let _ = write!(xml, r#"<w:t xml:space="preserve">{}</w:t>"#, escape(segment.as_str()));
    segment.clear();
}

/// Drop characters XML 1.0 cannot carry, such as the form feed Tesseract
/// ends each page with. Carriage returns go too, leaving bare newlines.
fn sanitize(text: &str) -> String {
    text.chars()
        .filter(|&ch| {
            matches!(ch, '\t' | '\n')
                || matches!(ch, '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    fn read_part(bytes: &[u8], name: &str) -> String {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).expect("valid zip");
        let mut part = archive.by_name(name).expect("part present");
        let mut body = String::new();
        part.read_to_string(&mut body).expect("utf-8 part");
        body
    }

    #[test]
    fn package_contains_required_parts() {
        let bytes = DocxWriter::new().to_bytes("ciao").expect("docx");
        let archive = zip::ZipArchive::new(Cursor::new(bytes.as_slice())).expect("valid zip");
        let mut names: Vec<&str> = archive.file_names().collect();
        names.sort_unstable();
        assert_eq!(
            names,
            [
                "[Content_Types].xml",
                "_rels/.rels",
                "docProps/core.xml",
                "word/document.xml"
            ]
        );
    }

    #[test]
    fn newlines_and_tabs_become_breaks() {
        let bytes = DocxWriter::new().to_bytes("uno\ndue\tfine").expect("docx");
        let doc = read_part(&bytes, "word/document.xml");
        assert!(doc.contains(
            r#"<w:t xml:space="preserve">uno</w:t><w:br/><w:t xml:space="preserve">due</w:t><w:tab/><w:t xml:space="preserve">fine</w:t>"#
        ));
        assert_eq!(doc.matches("<w:p>").count(), 1);
    }

    #[test]
    fn markup_characters_are_escaped() {
        let bytes = DocxWriter::new().to_bytes("a < b & \"c\"").expect("docx");
        let doc = read_part(&bytes, "word/document.xml");
        assert!(doc.contains("a &lt; b &amp; &quot;c&quot;"));
    }

    #[test]
    fn control_characters_are_dropped() {
        let bytes = DocxWriter::new().to_bytes("page\u{c}next\r\nline").expect("docx");
        let doc = read_part(&bytes, "word/document.xml");
        assert!(doc.contains(">pagenext</w:t><w:br/>"));
        assert!(!doc.contains('\u{c}'));
    }

    #[test]
    fn output_is_deterministic() {
        let writer = DocxWriter::new().with_title("sample");
        assert_eq!(
            writer.to_bytes("stesso testo").expect("first"),
            writer.to_bytes("stesso testo").expect("second")
        );
        let core = read_part(&writer.to_bytes("").expect("docx"), "docProps/core.xml");
        assert!(core.contains("<dc:title>sample</dc:title>"));
    }

    #[test]
    fn writes_file_to_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("out.docx");
        DocxWriter::new()
            .write_paragraph("testo", &path)
            .expect("write");
        let bytes = std::fs::read(&path).expect("read back");
        assert!(read_part(&bytes, "word/document.xml").contains("testo"));
    }

    #[test]
    fn unwritable_destination_is_docx_error() {
        let result = DocxWriter::new().write_paragraph("x", "/nonexistent/lesewerk/out.docx");
        assert!(matches!(result, Err(LesewerkError::DocxError(_))));
    }
}
