// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// ESC/POS command stream builder.

use crate::codepage::CodePage;

const ESC: u8 = 0x1B;
const GS: u8 = 0x1D;
const LF: u8 = b'\n';

/// Builds the byte stream for one print job.
///
/// The stream always starts with initialise (`ESC @`) followed by the code
/// page select (`ESC t n`); text written afterwards is encoded with that page.
pub struct EscPosBuilder {
    buf: Vec<u8>,
    code_page: CodePage,
}

impl EscPosBuilder {
    pub fn new(code_page: CodePage) -> Self {
        let mut buf = Vec::with_capacity(256);
        buf.extend_from_slice(&[ESC, b'@']);
        buf.extend_from_slice(&[ESC, b't', code_page.escpos_number()]);
        Self { buf, code_page }
    }

    /// Encoded text followed by a line feed.
    pub fn line(&mut self, text: &str) -> &mut Self {
        self.buf.extend(self.code_page.encode(text));
        self.buf.push(LF);
        self
    }

    /// Print and feed `lines` lines (`ESC d n`).
    pub fn feed(&mut self, lines: u8) -> &mut Self {
        self.buf.extend_from_slice(&[ESC, b'd', lines]);
        self
    }

    /// Full cut (`GS V 0`).
    pub fn cut(&mut self) -> &mut Self {
        self.buf.extend_from_slice(&[GS, b'V', 0x00]);
        self
    }

    pub fn build(self) -> Vec<u8> {
        self.buf
    }
}
