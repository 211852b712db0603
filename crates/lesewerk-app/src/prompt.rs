// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Interactive language prompt, shown when no profile was configured.

use std::io::{BufRead, Write};

use lesewerk_core::LanguageProfile;
use lesewerk_core::error::{LesewerkError, Result};

/// Ask for a profile on `output` until `input` yields `1` or `2`.
///
/// End of input before a valid answer is a configuration error.
pub fn ask_profile<R: BufRead, W: Write>(mut input: R, mut output: W) -> Result<LanguageProfile> {
    writeln!(output, "Scegli la lingua per l'OCR:")?;
    for (choice, profile) in (1..).zip(LanguageProfile::ALL) {
        writeln!(output, "{choice}. {}", profile.label())?;
    }

    loop {
        write!(output, "Inserisci 1 o 2: ")?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Err(LesewerkError::Config(
                "no language profile chosen before end of input".to_string(),
            ));
        }
        match LanguageProfile::from_choice(&line) {
            Some(profile) => return Ok(profile),
            None => writeln!(
                output,
                "Scelta non valida. Inserisci 1 per Italiano o 2 per Inglese."
            )?,
        }
    }
}
