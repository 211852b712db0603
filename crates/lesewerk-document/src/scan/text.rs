// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Recognised-text cleanup.

use std::sync::LazyLock;

use regex::Regex;

static HYPHENATED_LINE_END: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\w+)-\n(\w+)").expect("static hyphenation pattern is valid")
});

/// Rejoin words split across a line break with a hyphen (`exam-\nple` ->
/// `example`). Only a hyphen immediately followed by a newline and flanked
/// by word characters is touched.
pub fn repair_hyphenation(text: &str) -> String {
    HYPHENATED_LINE_END.replace_all(text, "${1}${2}").into_owned()
}
