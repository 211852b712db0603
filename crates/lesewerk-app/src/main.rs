// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Lesewerk — batch PDF to text/HTML/DOCX OCR with optional translation
//
// Entry point. Initialises logging, resolves the configuration (asking for the
// language profile when none is set), runs the pipeline, and reports.

mod cli;
mod prompt;
mod services;
mod state;

use std::io;
use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use lesewerk_core::config::DEFAULT_CONFIG_FILE;
use lesewerk_core::error::Result;

use cli::Cli;
use services::app_services::{AppServices, load_settings};
use state::RunResult;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    tracing::info!("Lesewerk starting");

    let cli = Cli::parse();
    match run(&cli) {
        Ok(result) => {
            report(&result);
            if result.has_failures() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(err) => {
            tracing::error!(error = %err, "Run aborted");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<RunResult> {
    let file = load_settings(cli.config.as_deref(), Path::new(DEFAULT_CONFIG_FILE))?;
    let settings = cli.overlay(file);

    let profile = match settings.profile {
        Some(profile) => profile,
        None => prompt::ask_profile(io::stdin().lock(), io::stdout())?,
    };

    let services = AppServices::init(&settings, profile)?;
    tracing::info!(
        results = %services.config().layout.results_root.display(),
        "Writing results"
    );
    services.run()
}

fn report(result: &RunResult) {
    for doc in &result.reports {
        tracing::info!(
            document = %doc.document,
            images = doc.images.len(),
            text = %doc.text_path.display(),
            html = %doc.html_path.display(),
            translation = ?doc.translation_path,
            "Document done"
        );
    }
    for note in result.all_notes() {
        tracing::warn!(note, "Degraded");
    }
    for failure in &result.failures {
        tracing::error!(
            pdf = %failure.source.display(),
            error = %failure.error,
            "Document failed"
        );
    }
    tracing::info!(
        documents = result.documents_processed(),
        images = result.images_processed(),
        failed = result.failures.len(),
        docx = result.docx_paths.len(),
        aggregate = %result.global_text_path.display(),
        translation = ?result.global_translation_path,
        "Lesewerk finished"
    );
}
