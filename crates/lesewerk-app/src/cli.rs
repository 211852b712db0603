// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Command-line flags. Every flag is optional and overrides the matching
// config-file setting.

use std::path::PathBuf;

use clap::Parser;
use lesewerk_core::config::ConfigFile;
use lesewerk_core::{FailurePolicy, LanguageProfile};

#[derive(Debug, Clone, Default, Parser)]
#[command(
    name = "lesewerk",
    version,
    about = "Extract the images of every PDF in a folder, OCR them with Tesseract, \
             translate the text and write TXT/HTML/DOCX results"
)]
pub struct Cli {
    /// Language profile: `ita` (Italian → English) or `eng` (English → Italian).
    /// Prompted for when neither this flag nor the config file sets it.
    #[arg(long, value_name = "ita|eng")]
    pub profile: Option<LanguageProfile>,

    /// Folder scanned for PDF files [default: pdf]
    #[arg(long, value_name = "DIR")]
    pub input: Option<PathBuf>,

    /// Base folder for the IMG, TXT, HTML and risultato trees [default: .]
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Tesseract executable, tried before the usual install locations.
    #[arg(long, value_name = "PATH")]
    pub tesseract: Option<PathBuf>,

    /// Skip translation; only the recognised text is written.
    #[arg(long)]
    pub no_translate: bool,

    /// Record a failing PDF and carry on with the next one.
    #[arg(long)]
    pub keep_going: bool,

    /// Translation endpoint URL.
    #[arg(long, value_name = "URL")]
    pub translate_endpoint: Option<String>,

    /// JSON config file [default: lesewerk.json, when present]
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Layer the flags that were given on top of `base`.
    pub fn overlay(&self, base: ConfigFile) -> ConfigFile {
        ConfigFile {
            profile: self.profile.or(base.profile),
            input_dir: self.input.clone().or(base.input_dir),
            output_dir: self.output_dir.clone().or(base.output_dir),
            tesseract: self.tesseract.clone().or(base.tesseract),
            translate: if self.no_translate {
                Some(false)
            } else {
                base.translate
            },
            translate_endpoint: self.translate_endpoint.clone().or(base.translate_endpoint),
            failure_policy: if self.keep_going {
                Some(FailurePolicy::Continue)
            } else {
                base.failure_policy
            },
        }
    }
}
