// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Plain-text to DOCX conversion for the result files of a run.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use lesewerk_core::error::{LesewerkError, Result};

use crate::docx::DocxWriter;

/// Convert one UTF-8 text file into a single-paragraph DOCX.
pub fn convert_txt_to_docx(txt_path: &Path, docx_path: &Path) -> Result<()> {
    let text = fs::read_to_string(txt_path).map_err(|err| {
        LesewerkError::DocxError(format!("failed to read {}: {}", txt_path.display(), err))
    })?;

    let mut writer = DocxWriter::new();
    if let Some(stem) = txt_path.file_stem() {
        writer = writer.with_title(stem.to_string_lossy());
    }
    writer.write_paragraph(&text, docx_path)?;

    debug!(from = %txt_path.display(), to = %docx_path.display(), "Converted to DOCX");
    Ok(())
}

/// Convert every `.txt` file directly inside `dir` (extension matched
/// case-insensitively) into a sibling `<stem>.docx`.
///
/// Returns the written DOCX paths in file-name order.
pub fn convert_directory(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut sources = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && has_extension(&path, "txt") {
            sources.push(path);
        }
    }
    sources.sort();

    let mut written = Vec::with_capacity(sources.len());
    for txt_path in sources {
        let docx_path = txt_path.with_extension("docx");
        convert_txt_to_docx(&txt_path, &docx_path)?;
        written.push(docx_path);
    }

    info!(dir = %dir.display(), count = written.len(), "DOCX conversion complete");
    Ok(written)
}

/// Case-insensitive extension check.
pub fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case(extension))
}
