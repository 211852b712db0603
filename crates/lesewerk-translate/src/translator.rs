// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Chunked, best-effort translation.
//
// Text is cut into pieces of at most `MAX_CHUNK_CHARS` characters, each piece
// is sent to the service in order, and the results are concatenated as-is.
// A piece that cannot be translated is kept in its original language, so the
// caller always gets text back.

use std::thread;

use lesewerk_core::Outcome;
use lesewerk_core::error::Result;
use tracing::{debug, info, instrument, warn};

use crate::retry::RetryConfig;

/// Largest piece of text sent in one request, in characters.
pub const MAX_CHUNK_CHARS: usize = 4500;

/// A machine-translation backend.
pub trait TranslationService {
    /// Translate `text` into the language `target` (e.g. `"en"`).
    fn translate_chunk(&self, text: &str, target: &str) -> Result<String>;
}

/// Translates arbitrarily long text through a [`TranslationService`].
pub struct Translator {
    service: Box<dyn TranslationService>,
    chunk_chars: usize,
    retry: RetryConfig,
}

impl Translator {
    pub fn new(service: impl TranslationService + 'static) -> Self {
        Self {
            service: Box::new(service),
            chunk_chars: MAX_CHUNK_CHARS,
            retry: RetryConfig::default(),
        }
    }

    /// Override the chunk size (clamped to at least one character).
    pub fn with_chunk_chars(mut self, chunk_chars: usize) -> Self {
        self.chunk_chars = chunk_chars.max(1);
        self
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Translate `text` into `target`.
    ///
    /// Never fails: chunks the service cannot translate are kept untranslated
    /// and the result is marked degraded.
    #[instrument(skip_all, fields(chars = text.chars().count(), target = %target))]
    pub fn translate(&self, text: &str, target: &str) -> Outcome<String> {
        let chunks = split_chunks(text, self.chunk_chars);
        info!(chunks = chunks.len(), "Translating");

        let mut translated = String::with_capacity(text.len());
        let mut failures = Vec::new();

        for (position, chunk) in chunks.iter().enumerate() {
            if chunk.trim().is_empty() {
                translated.push_str(chunk);
                continue;
            }
            match self.translate_with_retry(chunk, target) {
                Ok(piece) => translated.push_str(&piece),
                Err(err) => {
                    warn!(chunk = position + 1, %err, "Chunk left untranslated");
                    failures.push(format!("chunk {}: {}", position + 1, err));
                    translated.push_str(chunk);
                }
            }
        }

        if failures.is_empty() {
            Outcome::Success(translated)
        } else {
            let reason = format!(
                "{} of {} chunks left untranslated ({})",
                failures.len(),
                chunks.len(),
                failures.join("; ")
            );
            Outcome::degraded(translated, reason)
        }
    }

    fn translate_with_retry(&self, chunk: &str, target: &str) -> Result<String> {
        let mut retries = 0;
        loop {
            let err = match self.service.translate_chunk(chunk, target) {
                Ok(piece) => return Ok(piece),
                Err(err) => err,
            };
            let Some(wait) = self.retry.next_delay(&err, retries) else {
                return Err(err);
            };
            debug!(retries, %err, "Retrying chunk");
            thread::sleep(wait);
            retries += 1;
        }
    }
}

/// Split `text` into consecutive pieces of at most `max_chars` characters
/// (Unicode scalar values). Concatenating the pieces gives back `text`.
pub fn split_chunks(text: &str, max_chars: usize) -> Vec<&str> {
    let max_chars = max_chars.max(1);
    let mut chunks = Vec::new();
    let mut start = 0;
    let mut count = 0;

    for (offset, _) in text.char_indices() {
        if count == max_chars {
            chunks.push(&text[start..offset]);
            start = offset;
            count = 0;
        }
        count += 1;
    }
    if start < text.len() {
        chunks.push(&text[start..]);
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;
    use lesewerk_core::error::LesewerkError;
    use std::time::{Duration, Instant};
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Identity;

    impl TranslationService for Identity {
        fn translate_chunk(&self, text: &str, _target: &str) -> Result<String> {
            Ok(text.to_string())
        }
    }

    /// Upper-cases text and records every request it receives.
    #[derive(Clone, Default)]
    struct Recording {
        requests: Rc<RefCell<Vec<String>>>,
    }

    impl TranslationService for Recording {
        fn translate_chunk(&self, text: &str, _target: &str) -> Result<String> {
            self.requests.borrow_mut().push(text.to_string());
            Ok(text.to_uppercase())
        }
    }

    /// Fails according to a script, then behaves like `Identity`.
    struct Flaky {
        script: RefCell<Vec<LesewerkError>>,
        calls: Rc<RefCell<u32>>,
    }

    impl TranslationService for Flaky {
        fn translate_chunk(&self, text: &str, _target: &str) -> Result<String> {
            *self.calls.borrow_mut() += 1;
            let mut script = self.script.borrow_mut();
            if script.is_empty() {
                Ok(text.to_string())
            } else {
                Err(script.remove(0))
            }
        }
    }

    fn unavailable() -> LesewerkError {
        LesewerkError::TranslationStatus {
            status: 503,
            message: "unavailable".into(),
            retry_after: None,
        }
    }

    #[test]
    fn identity_service_round_trips_short_text() {
        let translator = Translator::new(Identity);
        let outcome = translator.translate("Ciao mondo\n", "en");
        assert_eq!(outcome, Outcome::Success("Ciao mondo\n".to_string()));
    }

    #[test]
    fn identity_service_round_trips_text_above_ceiling() {
        let text = "àèìòù parola ".repeat(1000);
        assert!(text.chars().count() > MAX_CHUNK_CHARS);
        let outcome = Translator::new(Identity).translate(&text, "en");
        assert!(!outcome.is_degraded());
        assert_eq!(outcome.into_value(), text);
    }

    #[test]
    fn chunks_respect_character_ceiling() {
        let text = "é".repeat(10_001);
        let chunks = split_chunks(&text, MAX_CHUNK_CHARS);
        assert_eq!(
            chunks.iter().map(|c| c.chars().count()).collect::<Vec<_>>(),
            [4500, 4500, 1001]
        );
        assert_eq!(chunks.concat(), text);
    }

    #[test]
    fn exact_multiple_has_no_empty_tail() {
        assert_eq!(split_chunks("abcdef", 3), ["abc", "def"]);
        assert!(split_chunks("", 3).is_empty());
    }

    #[test]
    fn chunks_are_sent_in_order_and_concatenated() {
        let service = Recording::default();
        let requests = Rc::clone(&service.requests);
        let translator = Translator::new(service).with_chunk_chars(4);

        let outcome = translator.translate("abcdefghij", "it");

        assert_eq!(outcome.into_value(), "ABCDEFGHIJ");
        assert_eq!(*requests.borrow(), ["abcd", "efgh", "ij"]);
    }

    #[test]
    fn whitespace_chunks_are_not_sent() {
        let service = Recording::default();
        let requests = Rc::clone(&service.requests);
        let translator = Translator::new(service).with_chunk_chars(3);

        let outcome = translator.translate("ab    cd", "it");

        assert_eq!(outcome.into_value(), "AB    CD");
        // "ab ", "   ", "cd": the blank middle chunk is passed through.
        assert_eq!(*requests.borrow(), ["ab ", "cd"]);
    }

    #[test]
    fn transient_failure_is_retried() {
        let calls = Rc::new(RefCell::new(0));
        let service = Flaky {
            script: RefCell::new(vec![unavailable()]),
            calls: Rc::clone(&calls),
        };
        let translator = Translator::new(service).with_retry(RetryConfig::immediate(2));

        let outcome = translator.translate("testo", "en");

        assert_eq!(outcome, Outcome::Success("testo".to_string()));
        assert_eq!(*calls.borrow(), 2);
    }

    #[test]
    fn throttled_chunk_waits_as_asked() {
        let calls = Rc::new(RefCell::new(0));
        let service = Flaky {
            script: RefCell::new(vec![LesewerkError::TranslationStatus {
                status: 429,
                message: "slow down".into(),
                retry_after: Some(Duration::from_millis(30)),
            }]),
            calls: Rc::clone(&calls),
        };
        let translator = Translator::new(service).with_retry(RetryConfig {
            max_retries: 1,
            base_delay: Duration::ZERO,
            max_delay: Duration::from_secs(1),
        });

        let started = Instant::now();
        let outcome = translator.translate("testo", "en");

        assert_eq!(outcome, Outcome::Success("testo".to_string()));
        assert_eq!(*calls.borrow(), 2);
        assert!(started.elapsed() >= Duration::from_millis(30));
    }

    #[test]
    fn persistent_failure_keeps_chunk_untranslated() {
        let calls = Rc::new(RefCell::new(0));
        let service = Flaky {
            script: RefCell::new(vec![unavailable(), unavailable(), unavailable()]),
            calls: Rc::clone(&calls),
        };
        let translator = Translator::new(service)
            .with_chunk_chars(5)
            .with_retry(RetryConfig::immediate(2));

        let outcome = translator.translate("primosecondo", "en");

        // The first chunk burns the whole script; later chunks succeed.
        assert!(outcome.is_degraded());
        assert!(outcome.reason().is_some_and(|r| r.starts_with("1 of 3 chunks")));
        assert_eq!(outcome.into_value(), "primosecondo");
        assert_eq!(*calls.borrow(), 5);
    }

    #[test]
    fn permanent_failure_is_not_retried() {
        let calls = Rc::new(RefCell::new(0));
        let service = Flaky {
            script: RefCell::new(vec![LesewerkError::TranslationResponse("garbage".into())]),
            calls: Rc::clone(&calls),
        };
        let translator = Translator::new(service).with_retry(RetryConfig::immediate(5));

        let outcome = translator.translate("testo", "en");

        assert!(outcome.is_degraded());
        assert_eq!(outcome.into_value(), "testo");
        assert_eq!(*calls.borrow(), 1);
    }
}
