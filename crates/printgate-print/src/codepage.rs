// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Printer character sets.
//
// Thermal printers render single-byte text through a selectable code page
// (`ESC t n`).  Each supported page pairs that selector with an encoder from
// Unicode.  Characters a page cannot represent print as `?`.

use encoding_rs::Encoding;
use tracing::warn;

use printgate_core::error::{PrintgateError, Result};

/// Replacement byte for unmappable characters.
const REPLACEMENT: u8 = b'?';

/// A code page the gateway can drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodePage {
    Pc437,
    Wpc1252,
    Pc866,
    Iso8859_2,
    Iso8859_15,
}

impl CodePage {
    /// Resolve a configured encoding name.
    ///
    /// Matching ignores case, `-`, `_` and spaces, so `PC437_USA`, `cp437`
    /// and `iso-8859-15` all resolve.
    pub fn from_name(name: &str) -> Result<Self> {
        let key: String = name
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .flat_map(char::to_uppercase)
            .collect();

        match key.as_str() {
            "PC437" | "PC437USA" | "CP437" => Ok(Self::Pc437),
            "WPC1252" | "WINDOWS1252" | "CP1252" => Ok(Self::Wpc1252),
            "PC866" | "PC866CYRILLIC2" | "CP866" | "IBM866" => Ok(Self::Pc866),
            "ISO88592" | "ISO88592LATIN2" => Ok(Self::Iso8859_2),
            "ISO885915" | "ISO885915LATIN9" => Ok(Self::Iso8859_15),
            _ => Err(PrintgateError::UnsupportedEncoding(name.to_string())),
        }
    }

    /// The `n` in `ESC t n` (Epson numbering).
    pub fn escpos_number(self) -> u8 {
        match self {
            Self::Pc437 => 0,
            Self::Wpc1252 => 16,
            Self::Pc866 => 17,
            Self::Iso8859_2 => 39,
            Self::Iso8859_15 => 40,
        }
    }

    /// Encode `text` for this page, one byte per character.
    pub fn encode(self, text: &str) -> Vec<u8> {
        let mut out = Vec::with_capacity(text.len());
        for ch in text.chars() {
            if ch.is_ascii() {
                out.push(ch as u8);
                continue;
            }
            match self.encode_char(ch) {
                Some(byte) => out.push(byte),
                None => {
                    warn!(page = ?self, ch = %ch, code = ch as u32, "unmapped character");
                    out.push(REPLACEMENT);
                }
            }
        }
        out
    }

    fn encode_char(self, ch: char) -> Option<u8> {
        let encoding: &'static Encoding = match self {
            Self::Pc437 => return unicode_to_cp437(ch),
            Self::Wpc1252 => encoding_rs::WINDOWS_1252,
            Self::Pc866 => encoding_rs::IBM866,
            Self::Iso8859_2 => encoding_rs::ISO_8859_2,
            Self::Iso8859_15 => encoding_rs::ISO_8859_15,
        };

        let mut utf8 = [0u8; 4];
        let (bytes, _, had_errors) = encoding.encode(ch.encode_utf8(&mut utf8));
        match (had_errors, &*bytes) {
            (false, [byte]) => Some(*byte),
            _ => None,
        }
    }
}

/// Upper half of IBM code page 437 (0x80-0xFF).
fn unicode_to_cp437(ch: char) -> Option<u8> {
    let byte = match ch {
        'Ç' => 0x80,
        'ü' => 0x81,
        'é' => 0x82,
        'â' => 0x83,
        'ä' => 0x84,
        'à' => 0x85,
        'å' => 0x86,
        'ç' => 0x87,
        'ê' => 0x88,
        'ë' => 0x89,
        'è' => 0x8A,
        'ï' => 0x8B,
        'î' => 0x8C,
        'ì' => 0x8D,
        'Ä' => 0x8E,
        'Å' => 0x8F,

        'É' => 0x90,
        'æ' => 0x91,
        'Æ' => 0x92,
        'ô' => 0x93,
        'ö' => 0x94,
        'ò' => 0x95,
        'û' => 0x96,
        'ù' => 0x97,
        'ÿ' => 0x98,
        'Ö' => 0x99,
        'Ü' => 0x9A,
        '¢' => 0x9B,
        '£' => 0x9C,
        '¥' => 0x9D,
        '₧' => 0x9E,
        'ƒ' => 0x9F,

        'á' => 0xA0,
        'í' => 0xA1,
        'ó' => 0xA2,
        'ú' => 0xA3,
        'ñ' => 0xA4,
        'Ñ' => 0xA5,
        'ª' => 0xA6,
        'º' => 0xA7,
        '¿' => 0xA8,
        '⌐' => 0xA9,
        '¬' => 0xAA,
        '½' => 0xAB,
        '¼' => 0xAC,
        '¡' => 0xAD,
        '«' => 0xAE,
        '»' => 0xAF,

        '░' => 0xB0,
        '▒' => 0xB1,
        '▓' => 0xB2,
        '│' => 0xB3,
        '┤' => 0xB4,
        '╡' => 0xB5,
        '╢' => 0xB6,
        '╖' => 0xB7,
        '╕' => 0xB8,
        '╣' => 0xB9,
        '║' => 0xBA,
        '╗' => 0xBB,
        '╝' => 0xBC,
        '╜' => 0xBD,
        '╛' => 0xBE,
        '┐' => 0xBF,

        '└' => 0xC0,
        '┴' => 0xC1,
        '┬' => 0xC2,
        '├' => 0xC3,
        '─' => 0xC4,
        '┼' => 0xC5,
        '╞' => 0xC6,
        '╟' => 0xC7,
        '╚' => 0xC8,
        '╔' => 0xC9,
        '╩' => 0xCA,
        '╦' => 0xCB,
        '╠' => 0xCC,
        '═' => 0xCD,
        '╬' => 0xCE,
        '╧' => 0xCF,

        '╨' => 0xD0,
        '╤' => 0xD1,
        '╥' => 0xD2,
        '╙' => 0xD3,
        '╘' => 0xD4,
        '╒' => 0xD5,
        '╓' => 0xD6,
        '╫' => 0xD7,
        '╪' => 0xD8,
        '┘' => 0xD9,
        '┌' => 0xDA,
        '█' => 0xDB,
        '▄' => 0xDC,
        '▌' => 0xDD,
        '▐' => 0xDE,
        '▀' => 0xDF,

        'α' => 0xE0,
        'ß' => 0xE1,
        'Γ' => 0xE2,
        'π' => 0xE3,
        'Σ' => 0xE4,
        'σ' => 0xE5,
        'µ' => 0xE6,
        'τ' => 0xE7,
        'Φ' => 0xE8,
        'Θ' => 0xE9,
        'Ω' => 0xEA,
        'δ' => 0xEB,
        '∞' => 0xEC,
        'φ' => 0xED,
        'ε' => 0xEE,
        '∩' => 0xEF,

        '≡' => 0xF0,
        '±' => 0xF1,
        '≥' => 0xF2,
        '≤' => 0xF3,
        '⌠' => 0xF4,
        '⌡' => 0xF5,
        '÷' => 0xF6,
        '≈' => 0xF7,
        '°' => 0xF8,
        '∙' => 0xF9,
        '·' => 0xFA,
        '√' => 0xFB,
        'ⁿ' => 0xFC,
        '²' => 0xFD,
        '■' => 0xFE,
        '\u{00A0}' => 0xFF,

        _ => return None,
    };
    Some(byte)
}
