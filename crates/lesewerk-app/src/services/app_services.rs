// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Central service layer — turns layered settings into a run configuration,
// locates Tesseract, builds the translator, and runs the pipeline.
//
// Settings are layered: built-in defaults, then the JSON config file, then
// command-line flags. The profile prompt fills the last gap.

use std::path::Path;

use lesewerk_core::config::ConfigFile;
use lesewerk_core::error::Result;
use lesewerk_core::{LanguageProfile, OutputLayout, RunConfig};
use lesewerk_document::scan::{HostSystem, SystemProbe};
use lesewerk_document::scan::locate::{default_strategies, discover, home_dir};
use lesewerk_document::{OcrEngine, TesseractCli};
use lesewerk_translate::google::GoogleConfig;
use lesewerk_translate::{GoogleTranslate, Translator};
use tracing::{info, warn};

use super::pipeline::Pipeline;
use crate::state::RunResult;

/// Load the config file layer.
///
/// An explicitly named file must exist and parse. Otherwise `fallback` is
/// read when present, and its absence leaves every setting unset.
pub fn load_settings(explicit: Option<&Path>, fallback: &Path) -> Result<ConfigFile> {
    match explicit {
        Some(path) => {
            info!(path = %path.display(), "Loading config file");
            ConfigFile::load(path)
        }
        None if fallback.is_file() => {
            info!(path = %fallback.display(), "Loading config file");
            ConfigFile::load(fallback)
        }
        None => Ok(ConfigFile::default()),
    }
}

/// Fold resolved settings and the chosen profile into a [`RunConfig`].
pub fn run_config(settings: &ConfigFile, profile: LanguageProfile) -> RunConfig {
    let mut config = RunConfig::new(profile);
    if let Some(dir) = &settings.input_dir {
        config = config.with_input_dir(dir);
    }
    if let Some(base) = &settings.output_dir {
        config = config.with_layout(OutputLayout::under(base));
    }
    if let Some(policy) = settings.failure_policy {
        config = config.with_failure_policy(policy);
    }
    if settings.translate == Some(false) {
        config = config.without_translation();
    }
    config
}

/// Warn when `language` has no installed Tesseract data. Never fatal:
/// recognition itself reports the problem if the data is really missing.
pub fn check_language(ocr: &dyn OcrEngine, language: &str) -> Option<String> {
    match ocr.available_languages() {
        Ok(languages) if languages.iter().any(|l| l == language) => None,
        Ok(languages) => {
            warn!(language, installed = ?languages, "Recognition language not installed");
            Some(format!(
                "Tesseract has no '{language}' language data (installed: {})",
                languages.join(", ")
            ))
        }
        Err(err) => {
            warn!(%err, "Could not list Tesseract languages");
            Some(format!("could not list Tesseract languages: {err}"))
        }
    }
}

/// Translator over the Google endpoint, optionally at `endpoint`.
pub fn build_translator(endpoint: Option<&str>) -> Result<Translator> {
    let mut config = GoogleConfig::default();
    if let Some(endpoint) = endpoint {
        config.endpoint = endpoint.to_string();
    }
    let service = GoogleTranslate::new(config)?;
    info!(endpoint = service.endpoint(), "Translation enabled");
    Ok(Translator::new(service))
}

/// Everything one run needs, initialised once at startup.
pub struct AppServices {
    config: RunConfig,
    ocr: TesseractCli,
    translator: Option<Translator>,
    /// Startup fallbacks reported with the run summary.
    notes: Vec<String>,
}

impl AppServices {
    /// Validate the configuration, locate Tesseract on this machine, and
    /// prepare the translator when translation is on.
    pub fn init(settings: &ConfigFile, profile: LanguageProfile) -> Result<Self> {
        Self::init_with(settings, profile, &HostSystem)
    }

    /// [`AppServices::init`] with Tesseract discovery answered by `probe`.
    pub fn init_with(
        settings: &ConfigFile,
        profile: LanguageProfile,
        probe: &dyn SystemProbe,
    ) -> Result<Self> {
        let config = run_config(settings, profile);
        config.validate()?;
        info!(
            profile = %profile,
            input = %config.input_dir.display(),
            translate_to = config.translate_to.as_deref().unwrap_or("-"),
            failure_policy = ?config.failure_policy,
            "Configuration resolved"
        );

        let mut notes = Vec::new();

        let home = home_dir();
        let strategies = default_strategies(settings.tesseract.as_deref(), home.as_deref());
        let located = discover(&strategies, probe);
        if let Some(reason) = located.reason() {
            notes.push(format!("Tesseract not found, assuming default path: {reason}"));
        }
        let ocr = TesseractCli::new(located.into_value());
        info!(tesseract = %ocr.executable().display(), "OCR engine ready");
        notes.extend(check_language(&ocr, &config.recognition_language));

        let translator = match config.translate_to {
            Some(_) => Some(build_translator(settings.translate_endpoint.as_deref())?),
            None => None,
        };

        Ok(Self {
            config,
            ocr,
            translator,
            notes,
        })
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Run the pipeline once over the input folder.
    pub fn run(&self) -> Result<RunResult> {
        let mut pipeline = Pipeline::new(&self.config, &self.ocr);
        if let Some(translator) = &self.translator {
            pipeline = pipeline.with_translator(translator);
        }
        let mut result = pipeline.run()?;
        let mut notes = self.notes.clone();
        notes.append(&mut result.notes);
        result.notes = notes;
        Ok(result)
    }
}
