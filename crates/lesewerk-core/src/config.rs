// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Run configuration: language profile, output layout, failure policy, and the
// optional JSON config file that feeds them.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{LesewerkError, Result};
use crate::types::DocumentId;

/// Conventional name of the input folder.
pub const DEFAULT_INPUT_DIR: &str = "pdf";

/// Config file picked up from the working directory when present.
pub const DEFAULT_CONFIG_FILE: &str = "lesewerk.json";

/// Stem shared by every aggregate text artifact (`libro.txt`, `<base>_libro.txt`).
const AGGREGATE_STEM: &str = "libro";

/// The two supported recognition/translation pairings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LanguageProfile {
    /// Recognise Italian, translate to English.
    #[serde(rename = "ita")]
    Italian,
    /// Recognise English, translate to Italian.
    #[serde(rename = "eng")]
    English,
}

impl LanguageProfile {
    /// Profiles in prompt order (choice `1`, choice `2`).
    pub const ALL: [LanguageProfile; 2] = [LanguageProfile::Italian, LanguageProfile::English];

    /// Tesseract language code used for recognition.
    pub fn ocr_language(&self) -> &'static str {
        match self {
            Self::Italian => "ita",
            Self::English => "eng",
        }
    }

    /// Target language code handed to the translator.
    pub fn translate_to(&self) -> &'static str {
        match self {
            Self::Italian => "en",
            Self::English => "it",
        }
    }

    /// Human-readable label shown in the prompt.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Italian => "Italiano (ita)",
            Self::English => "Inglese (eng)",
        }
    }

    /// Map a numbered prompt answer to a profile. Surrounding whitespace is
    /// ignored; anything other than `1` or `2` is rejected.
    pub fn from_choice(choice: &str) -> Option<Self> {
        match choice.trim() {
            "1" => Some(Self::Italian),
            "2" => Some(Self::English),
            _ => None,
        }
    }
}

impl fmt::Display for LanguageProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.ocr_language())
    }
}

impl FromStr for LanguageProfile {
    type Err = LesewerkError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ita" | "it" | "italian" | "1" => Ok(Self::Italian),
            "eng" | "en" | "english" | "2" => Ok(Self::English),
            other => Err(LesewerkError::Config(format!(
                "unknown language profile '{other}' (expected 'ita' or 'eng')"
            ))),
        }
    }
}

/// What the driver does when a single document fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Propagate the first error and abort the run.
    #[default]
    Halt,
    /// Record the failure, move on to the next PDF, report at the end.
    Continue,
}

/// The four output trees rebuilt on every run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputLayout {
    /// Per-document folders of extracted images.
    pub image_root: PathBuf,
    /// Per-document folders of per-image plain text.
    pub text_root: PathBuf,
    /// Per-document folders of per-image HTML/hOCR plus the aggregate HTML.
    pub html_root: PathBuf,
    /// Aggregate text, translations, and DOCX conversions.
    pub results_root: PathBuf,
}

impl Default for OutputLayout {
    fn default() -> Self {
        Self::under(".")
    }
}

impl OutputLayout {
    /// Standard layout (`IMG`, `TXT`, `HTML`, `risultato`) below `base`.
    pub fn under(base: impl AsRef<Path>) -> Self {
        let base = base.as_ref();
        Self {
            image_root: base.join("IMG"),
            text_root: base.join("TXT"),
            html_root: base.join("HTML"),
            results_root: base.join("risultato"),
        }
    }

    /// All roots, in reset order.
    pub fn roots(&self) -> [&Path; 4] {
        [
            &self.image_root,
            &self.text_root,
            &self.html_root,
            &self.results_root,
        ]
    }

    pub fn image_dir(&self, doc: &DocumentId) -> PathBuf {
        self.image_root.join(doc.as_str())
    }

    pub fn text_dir(&self, doc: &DocumentId) -> PathBuf {
        self.text_root.join(doc.as_str())
    }

    pub fn html_dir(&self, doc: &DocumentId) -> PathBuf {
        self.html_root.join(doc.as_str())
    }

    /// `<results>/<base>_libro.txt`
    pub fn document_text(&self, doc: &DocumentId) -> PathBuf {
        self.results_root
            .join(format!("{}_{AGGREGATE_STEM}.txt", doc.as_str()))
    }

    /// `<results>/<base>_libro_translated_<lang>.txt`
    pub fn document_translation(&self, doc: &DocumentId, lang: &str) -> PathBuf {
        self.results_root
            .join(format!("{}_{AGGREGATE_STEM}_translated_{lang}.txt", doc.as_str()))
    }

    /// `HTML/<base>/<base>_libro.html`
    pub fn document_html(&self, doc: &DocumentId) -> PathBuf {
        self.html_dir(doc)
            .join(format!("{}_{AGGREGATE_STEM}.html", doc.as_str()))
    }

    /// `<results>/libro.txt`
    pub fn global_text(&self) -> PathBuf {
        self.results_root.join(format!("{AGGREGATE_STEM}.txt"))
    }

    /// `<results>/libro_translated_<lang>.txt`
    pub fn global_translation(&self, lang: &str) -> PathBuf {
        self.results_root
            .join(format!("{AGGREGATE_STEM}_translated_{lang}.txt"))
    }
}

/// Everything the pipeline driver needs to know about one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Folder scanned for `*.pdf` files.
    pub input_dir: PathBuf,
    /// Output trees.
    pub layout: OutputLayout,
    /// Tesseract language code.
    pub recognition_language: String,
    /// Translation target, `None` disables translation.
    pub translate_to: Option<String>,
    /// Per-document failure handling.
    pub failure_policy: FailurePolicy,
}

impl RunConfig {
    /// Config for `profile` with the conventional input folder and output
    /// layout relative to the working directory.
    pub fn new(profile: LanguageProfile) -> Self {
        Self {
            input_dir: PathBuf::from(DEFAULT_INPUT_DIR),
            layout: OutputLayout::default(),
            recognition_language: profile.ocr_language().to_string(),
            translate_to: Some(profile.translate_to().to_string()),
            failure_policy: FailurePolicy::Halt,
        }
    }

    pub fn with_input_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.input_dir = dir.into();
        self
    }

    pub fn with_layout(mut self, layout: OutputLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    pub fn without_translation(mut self) -> Self {
        self.translate_to = None;
        self
    }

    /// Check that the input folder exists outside every output tree and the
    /// language codes are usable.
    pub fn validate(&self) -> Result<()> {
        if !self.input_dir.is_dir() {
            return Err(LesewerkError::Config(format!(
                "input folder {} does not exist or is not a directory",
                self.input_dir.display()
            )));
        }
        let input = resolved(&self.input_dir)?;
        for root in self.layout.roots() {
            if input.starts_with(resolved(root)?) {
                return Err(LesewerkError::Config(format!(
                    "input folder {} lies inside output folder {}, which is emptied on every run",
                    self.input_dir.display(),
                    root.display()
                )));
            }
        }
        if self.recognition_language.trim().is_empty() {
            return Err(LesewerkError::Config(
                "recognition language must not be empty".to_string(),
            ));
        }
        if let Some(lang) = &self.translate_to
            && lang.trim().is_empty()
        {
            return Err(LesewerkError::Config(
                "translation target must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// `path` made absolute, with symlinks resolved for the part that exists.
fn resolved(path: &Path) -> Result<PathBuf> {
    let absolute = std::path::absolute(path)?;
    let mut existing = absolute.as_path();
    let mut missing = Vec::new();
    loop {
        if let Ok(mut real) = existing.canonicalize() {
            real.extend(missing.iter().rev());
            return Ok(real);
        }
        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(name)) => {
                missing.push(name.to_os_string());
                existing = parent;
            }
            _ => return Ok(absolute),
        }
    }
}

/// On-disk settings. Every field is optional; absent fields fall back to
/// command-line flags or built-in defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    pub profile: Option<LanguageProfile>,
    pub input_dir: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub tesseract: Option<PathBuf>,
    pub translate: Option<bool>,
    pub translate_endpoint: Option<String>,
    pub failure_policy: Option<FailurePolicy>,
}

impl ConfigFile {
    /// Parse a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path).map_err(|err| {
            LesewerkError::Config(format!("cannot read {}: {}", path.display(), err))
        })?;
        Ok(serde_json::from_str(&data)?)
    }
}
