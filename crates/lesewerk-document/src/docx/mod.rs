// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// DOCX module — minimal WordprocessingML packages holding plain text.

pub mod writer;

pub use writer::DocxWriter;
