// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// hOCR formatting — re-indent engine markup for the per-image and
// per-document HTML artifacts.

use lesewerk_core::Outcome;
use quick_xml::Writer;
use quick_xml::events::Event;
use quick_xml::reader::Reader;
use tracing::warn;

/// Pretty-print hOCR markup, one element per line with one-space
/// indentation.
///
/// Markup that cannot be parsed is returned unchanged as a degraded outcome.
pub fn prettify(raw: &str) -> Outcome<String> {
    if raw.trim().is_empty() {
        return Outcome::Success(String::new());
    }

    match reindent(raw) {
        Ok(pretty) => Outcome::Success(pretty),
        Err(reason) => {
            warn!(%reason, "hOCR left unformatted");
            Outcome::degraded(raw.to_string(), reason)
        }
    }
}

fn reindent(raw: &str) -> Result<String, String> {
    let mut reader = Reader::from_str(raw);
    reader.config_mut().trim_text(true);
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 1);

    loop {
        match reader.read_event() {
            Ok(Event::Eof) => break,
            Ok(event) => writer
                .write_event(event)
                .map_err(|err| format!("failed to write markup: {err}"))?,
            Err(err) => {
                return Err(format!(
                    "malformed markup near byte {}: {}",
                    reader.buffer_position(),
                    err
                ));
            }
        }
    }

    let mut pretty = String::from_utf8(writer.into_inner())
        .map_err(|err| format!("formatted markup is not UTF-8: {err}"))?;
    pretty.push('\n');
    Ok(pretty)
}
