// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// OCR engine seam and its Tesseract implementation.
//
// Recognition itself is delegated to an external `tesseract` executable. The
// engine is invoked once per request and writes its result to stdout:
//
// ```sh
// tesseract page.png stdout -l ita          # plain text
// tesseract page.png stdout --psm 0         # orientation and script detection
// tesseract page.png stdout -l ita hocr     # hOCR markup
// tesseract --list-langs
// ```

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::sync::LazyLock;

use lesewerk_core::error::LesewerkError;
use regex::Regex;
use tracing::{debug, instrument};

static ROTATE_FIELD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\s*Rotate:\s*(\d+)").expect("static orientation pattern is valid")
});

/// Capabilities the pipeline needs from an OCR engine.
pub trait OcrEngine {
    /// Clockwise rotation, in degrees, that makes the text in `image` upright.
    fn detect_orientation(&self, image: &Path) -> Result<u32, LesewerkError>;

    /// Plain-text recognition in `language` (a Tesseract language code).
    fn recognize_text(&self, image: &Path, language: &str) -> Result<String, LesewerkError>;

    /// hOCR markup as produced by the engine.
    fn recognize_hocr(&self, image: &Path, language: &str) -> Result<Vec<u8>, LesewerkError>;

    /// Language codes with installed recognition data.
    fn available_languages(&self) -> Result<Vec<String>, LesewerkError>;
}

/// [`OcrEngine`] backed by the `tesseract` command-line program.
#[derive(Debug, Clone)]
pub struct TesseractCli {
    executable: PathBuf,
}

impl TesseractCli {
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
        }
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }

    fn run(&self, args: &[&OsStr]) -> Result<Output, LesewerkError> {
        let output = Command::new(&self.executable)
            .args(args)
            .output()
            .map_err(|err| {
                LesewerkError::Executable(format!(
                    "failed to start {}: {}",
                    self.executable.display(),
                    err
                ))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(LesewerkError::OcrError(format!(
                "{} exited with {}: {}",
                self.executable.display(),
                output.status,
                stderr.trim()
            )));
        }
        Ok(output)
    }

    fn run_on_image(
        &self,
        image: &Path,
        extra: &[&str],
    ) -> Result<Vec<u8>, LesewerkError> {
        let mut args = vec![image.as_os_str(), OsStr::new("stdout")];
        args.extend(extra.iter().map(|arg| OsStr::new(*arg)));
        Ok(self.run(&args)?.stdout)
    }
}

impl OcrEngine for TesseractCli {
    #[instrument(skip_all, fields(image = %image.display()))]
    fn detect_orientation(&self, image: &Path) -> Result<u32, LesewerkError> {
        let stdout = self.run_on_image(image, &["--psm", "0"])?;
        let rotation = parse_rotation(&String::from_utf8_lossy(&stdout));
        debug!(rotation, "Orientation detected");
        Ok(rotation)
    }

    #[instrument(skip_all, fields(image = %image.display(), language = %language))]
    fn recognize_text(&self, image: &Path, language: &str) -> Result<String, LesewerkError> {
        let stdout = self.run_on_image(image, &["-l", language])?;
        let text = String::from_utf8(stdout).map_err(|err| {
            LesewerkError::OcrError(format!(
                "non UTF-8 text for {}: {}",
                image.display(),
                err
            ))
        })?;
        debug!(chars = text.chars().count(), "Text recognised");
        Ok(text)
    }

    #[instrument(skip_all, fields(image = %image.display(), language = %language))]
    fn recognize_hocr(&self, image: &Path, language: &str) -> Result<Vec<u8>, LesewerkError> {
        let markup = self.run_on_image(image, &["-l", language, "hocr"])?;
        debug!(bytes = markup.len(), "hOCR produced");
        Ok(markup)
    }

    fn available_languages(&self) -> Result<Vec<String>, LesewerkError> {
        let output = self.run(&[OsStr::new("--list-langs")])?;
        // Older releases print the list on stderr.
        let mut listing = String::from_utf8_lossy(&output.stdout).into_owned();
        listing.push_str(&String::from_utf8_lossy(&output.stderr));
        Ok(parse_language_list(&listing))
    }
}

/// Extract the `Rotate:` field from OSD output. A missing field means the
/// image is already upright.
pub fn parse_rotation(osd: &str) -> u32 {
    ROTATE_FIELD
        .captures(osd)
        .and_then(|caps| caps[1].parse::<u32>().ok())
        .map(|degrees| degrees % 360)
        .unwrap_or(0)
}

/// Parse `--list-langs` output: a header line ending in `:` followed by one
/// language code per line.
pub fn parse_language_list(listing: &str) -> Vec<String> {
    listing
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.contains(':') && !line.contains(' '))
        .map(str::to_string)
        .collect()
}
