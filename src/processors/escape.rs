//! Decoder for JSON string escapes
//!
//! Used by the fallback response extractor, which pulls the raw contents of a
//! `"text":"..."` field out with a regex instead of a JSON parser.

use std::str::CharIndices;
use thiserror::Error;

/// Invalid escape sequences
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EscapeError {
    #[error("invalid escape sequence: trailing backslash")]
    TrailingBackslash,

    #[error("invalid unicode escape at offset {0}")]
    InvalidUnicode(usize),

    #[error("unpaired surrogate U+{0:04X}")]
    LoneSurrogate(u32),

    #[error("unsupported escape sequence \\{0}")]
    Unsupported(char),
}

/// Decode the body of a JSON string literal (without the surrounding quotes).
///
/// Supports `\"`, `\\`, `\/`, `\b`, `\f`, `\n`, `\r`, `\t` and `\uXXXX`
/// (hex digits in either case, UTF-16 surrogate pairs combined).
pub fn decode_json_string(value: &str) -> Result<String, EscapeError> {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.char_indices();

    while let Some((pos, ch)) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }

        let (_, escape) = chars.next().ok_or(EscapeError::TrailingBackslash)?;
        match escape {
            '"' | '\\' | '/' => out.push(escape),
            'b' => out.push('\u{0008}'),
            'f' => out.push('\u{000C}'),
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            'u' => {
                let unit = read_hex4(&mut chars, pos)?;
                let decoded = match unit {
                    0xD800..=0xDBFF => {
                        let low = read_low_surrogate(&mut chars, pos).ok_or(EscapeError::LoneSurrogate(unit))??;
                        0x10000 + ((unit - 0xD800) << 10) + (low - 0xDC00)
                    }
                    0xDC00..=0xDFFF => return Err(EscapeError::LoneSurrogate(unit)),
                    _ => unit,
                };
                out.push(char::from_u32(decoded).ok_or(EscapeError::InvalidUnicode(pos))?);
            }
            other => return Err(EscapeError::Unsupported(other)),
        }
    }

    Ok(out)
}

fn read_hex4(chars: &mut CharIndices<'_>, pos: usize) -> Result<u32, EscapeError> {
    let mut unit = 0u32;
    for _ in 0..4 {
        let (_, c) = chars.next().ok_or(EscapeError::InvalidUnicode(pos))?;
        let digit = c.to_digit(16).ok_or(EscapeError::InvalidUnicode(pos))?;
        unit = unit * 16 + digit;
    }
    Ok(unit)
}

/// `None` when no `\uDC00`..`\uDFFF` follows; `chars` only advances on success
fn read_low_surrogate(
    chars: &mut CharIndices<'_>,
    pos: usize,
) -> Option<Result<u32, EscapeError>> {
    let mut lookahead = chars.clone();
    match (lookahead.next(), lookahead.next()) {
        (Some((_, '\\')), Some((_, 'u'))) => {}
        _ => return None,
    }
    match read_hex4(&mut lookahead, pos) {
        Ok(low) if (0xDC00..=0xDFFF).contains(&low) => {
            *chars = lookahead;
            Some(Ok(low))
        }
        Ok(_) => None,
        Err(e) => Some(Err(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Body of the JSON string literal serde_json produces for `s`
    fn json_escape(s: &str) -> String {
        let quoted = serde_json::to_string(s).unwrap();
        quoted[1..quoted.len() - 1].to_string()
    }

    #[test]
    fn test_simple_escapes() {
        assert_eq!(
            decode_json_string(r#"a\"b\\c\/d\be\ff\ng\rh\ti"#).unwrap(),
            "a\"b\\c/d\u{8}e\u{c}f\ng\rh\ti"
        );
    }

    #[test]
    fn test_unicode_escapes_case_insensitive() {
        assert_eq!(decode_json_string(r"\u00e9\u00C9").unwrap(), "\u{e9}\u{c9}");
        assert_eq!(decode_json_string(r"\u0041").unwrap(), "A");
    }

    #[test]
    fn test_surrogate_pair() {
        assert_eq!(decode_json_string(r"\uD83D\ude00!").unwrap(), "\u{1F600}!");
    }

    #[test]
    fn test_lone_surrogates_rejected() {
        assert_eq!(decode_json_string(r"\ud83d"), Err(EscapeError::LoneSurrogate(0xD83D)));
        assert_eq!(decode_json_string(r"\ud83dx"), Err(EscapeError::LoneSurrogate(0xD83D)));
        assert_eq!(decode_json_string(r"\ude00"), Err(EscapeError::LoneSurrogate(0xDE00)));
    }

    #[test]
    fn test_incomplete_escapes_rejected() {
        assert_eq!(decode_json_string("abc\\"), Err(EscapeError::TrailingBackslash));
        assert_eq!(decode_json_string(r"\u12"), Err(EscapeError::InvalidUnicode(0)));
        assert_eq!(decode_json_string(r"x\u12G4"), Err(EscapeError::InvalidUnicode(1)));
        assert_eq!(decode_json_string(r"\q"), Err(EscapeError::Unsupported('q')));
    }

    #[test]
    fn test_round_trip_against_serde_json() {
        let corpus = [
            "",
            "plain text",
            "quote \" and backslash \\ and slash /",
            "controls \u{0} \u{1} \u{8} \u{c} \n \r \t \u{1f}",
            "Grüße, 你好, こんにちは, Привет",
            "emoji 😀 and 𝄞 outside the BMP",
            "<b0>tag</b0> &amp; entity",
            "\\u0041 literal backslash-u",
        ];

        for original in corpus {
            let escaped = json_escape(original);
            assert_eq!(decode_json_string(&escaped).unwrap(), original, "escaped: {}", escaped);
        }
    }

    #[test]
    fn test_round_trip_all_escaped_code_points() {
        // escape every character as \uXXXX (pairs for astral ones)
        let original = "a\"\\/\u{7f}é€😀";
        let mut escaped = String::new();
        for ch in original.chars() {
            let mut buf = [0u16; 2];
            for unit in ch.encode_utf16(&mut buf) {
                escaped.push_str(&format!("\\u{:04x}", unit));
            }
        }
        assert_eq!(decode_json_string(&escaped).unwrap(), original);
    }
}
