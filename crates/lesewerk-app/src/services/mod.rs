// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Service layer — bridges the command line to the lesewerk backend crates.
//
// `app_services` wires configuration, Tesseract discovery and the translator
// together; `pipeline` drives one run over the input folder, handing each
// document's images to `ocr_runner`.

pub mod app_services;
pub mod data_dir;
pub mod ocr_runner;
pub mod pipeline;

#[cfg(test)]
pub mod testing;
