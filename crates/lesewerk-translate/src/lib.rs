// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// lesewerk-translate — Best-effort machine translation for the Lesewerk OCR
// pipeline.
//
// Provides the translation service seam, a chunking translator that never
// fails the pipeline, the Google web-endpoint client, and the retry policy
// applied to each chunk.

pub mod google;
pub mod retry;
pub mod translator;

pub use google::GoogleTranslate;
pub use retry::RetryConfig;
pub use translator::{MAX_CHUNK_CHARS, TranslationService, Translator};
