// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Google Translate web endpoint client (blocking `reqwest`).
//
// One POST per chunk:
//
// ```text
// POST <endpoint>?client=gtx&sl=auto&tl=<target>&dt=t
// Content-Type: application/x-www-form-urlencoded
//
// q=<chunk>
// ```
//
// The reply is a nested JSON array. Its first element lists the translated
// segments as `[translated, source, ...]`; joining the `translated` parts
// gives the translation of the chunk.

use std::time::Duration;

use lesewerk_core::error::{LesewerkError, Result};
use reqwest::blocking::Client;
use reqwest::header::RETRY_AFTER;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::translator::TranslationService;

/// Public endpoint used when none is configured.
pub const DEFAULT_ENDPOINT: &str = "https://translate.googleapis.com/translate_a/single";

/// Longest slice of an error body carried into an error message.
const MAX_ERROR_BODY: usize = 200;

/// Configuration for [`GoogleTranslate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoogleConfig {
    /// Full URL of the `translate_a/single` endpoint.
    pub endpoint: String,
    /// Per-request timeout; `None` waits indefinitely.
    pub timeout: Option<Duration>,
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: None,
        }
    }
}

/// [`TranslationService`] over the Google web endpoint.
pub struct GoogleTranslate {
    client: Client,
    config: GoogleConfig,
}

impl GoogleTranslate {
    pub fn new(config: GoogleConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|err| LesewerkError::Translation(format!("cannot build HTTP client: {err}")))?;
        Ok(Self { client, config })
    }

    pub fn with_defaults() -> Result<Self> {
        Self::new(GoogleConfig::default())
    }

    pub fn endpoint(&self) -> &str {
        &self.config.endpoint
    }
}

impl TranslationService for GoogleTranslate {
    #[instrument(skip_all, fields(chars = text.chars().count(), target = %target))]
    fn translate_chunk(&self, text: &str, target: &str) -> Result<String> {
        let response = self
            .client
            .post(&self.config.endpoint)
            .query(&[("client", "gtx"), ("sl", "auto"), ("tl", target), ("dt", "t")])
            .form(&[("q", text)])
            .send()
            .map_err(|err| LesewerkError::Translation(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|value| value.to_str().ok())
                .and_then(parse_retry_after);
            let body = response.text().unwrap_or_default();
            return Err(LesewerkError::TranslationStatus {
                status: status.as_u16(),
                message: body.chars().take(MAX_ERROR_BODY).collect(),
                retry_after,
            });
        }

        let body: Value = response
            .json()
            .map_err(|err| LesewerkError::TranslationResponse(format!("invalid JSON: {err}")))?;
        let translated = parse_response(&body)?;
        debug!(chars = translated.chars().count(), "Chunk translated");
        Ok(translated)
    }
}

/// `Retry-After` in its delay-seconds form. The HTTP-date form is ignored
/// and the retry policy falls back to its own backoff.
pub fn parse_retry_after(value: &str) -> Option<Duration> {
    value.trim().parse().ok().map(Duration::from_secs)
}

/// Join the translated segments of an endpoint reply.
pub fn parse_response(body: &Value) -> Result<String> {
    let segments = body
        .get(0)
        .and_then(Value::as_array)
        .ok_or_else(|| LesewerkError::TranslationResponse("missing segment list".to_string()))?;

    let mut translated = String::new();
    for segment in segments {
        if let Some(piece) = segment.get(0).and_then(Value::as_str) {
            translated.push_str(piece);
        }
    }
    Ok(translated)
}
