// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Retry policy for translation requests.
//
// A chunk is sent again only when the failure says nothing about the chunk
// itself: the endpoint throttled the client, broke on its side, or the
// connection dropped. The wait doubles with every retry unless the endpoint
// asked for a specific one through `Retry-After`.

use std::time::Duration;

use lesewerk_core::error::LesewerkError;
use tracing::debug;

/// Retry configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    /// Maximum number of retry attempts after the first request.
    pub max_retries: u32,
    /// Wait before the first retry; doubled for each later one.
    pub base_delay: Duration,
    /// Upper bound on any wait, including one requested by the service.
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
        }
    }
}

impl RetryConfig {
    /// Never retry.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Retry `max_retries` times without sleeping.
    pub fn immediate(max_retries: u32) -> Self {
        Self {
            max_retries,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }

    /// How long to wait before sending the chunk again after `err`, or
    /// `None` to give up. `retries` counts the retries already made.
    pub fn next_delay(&self, err: &LesewerkError, retries: u32) -> Option<Duration> {
        if !is_transient(err) || retries >= self.max_retries {
            return None;
        }
        let wait = match err {
            LesewerkError::TranslationStatus {
                retry_after: Some(wait),
                ..
            } => *wait,
            _ => self.base_delay.saturating_mul(1 << retries.min(16)),
        };
        let wait = wait.min(self.max_delay);
        debug!(retries, wait_ms = wait.as_millis() as u64, "Translation retry scheduled");
        Some(wait)
    }
}

/// Whether sending the same chunk again may succeed: transport failures,
/// request timeouts (408), throttling (429), and server errors (5xx).
pub fn is_transient(err: &LesewerkError) -> bool {
    match err {
        LesewerkError::Translation(_) => true,
        LesewerkError::TranslationStatus { status, .. } => {
            matches!(status, 408 | 429 | 500..=599)
        }
        _ => false,
    }
}
