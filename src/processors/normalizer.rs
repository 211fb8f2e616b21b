//! Post-processing of provider output and pre-send truncation

use regex::{Captures, Regex};
use std::borrow::Cow;
use std::sync::OnceLock;
use tracing::warn;

fn entity_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"&(#[0-9]{1,7}|#[xX][0-9a-fA-F]{1,6}|[a-zA-Z]+);").expect("entity pattern is valid")
    })
}

fn tag_then_space() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"</?[A-Za-z]+[0-9]+/?>\s+").expect("tag pattern is valid"))
}

fn space_then_tag() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\s+</?[A-Za-z]+[0-9]+/?>").expect("tag pattern is valid"))
}

/// Replace `&amp;`, `&lt;`, `&gt;`, `&quot;`, `&#39;`, `&apos;`, `&nbsp;` and
/// numeric entities. Anything else is left as written.
pub fn unescape_html(text: &str) -> Cow<'_, str> {
    entity_pattern().replace_all(text, |caps: &Captures<'_>| {
        let body = &caps[1];
        let decoded = match body {
            "amp" => Some('&'),
            "lt" => Some('<'),
            "gt" => Some('>'),
            "quot" => Some('"'),
            "apos" => Some('\''),
            "nbsp" => Some('\u{00A0}'),
            _ if body.starts_with("#x") || body.starts_with("#X") => {
                u32::from_str_radix(&body[2..], 16).ok().and_then(char::from_u32)
            }
            _ if body.starts_with('#') => body[1..].parse::<u32>().ok().and_then(char::from_u32),
            _ => None,
        };
        match decoded {
            Some(ch) => ch.to_string(),
            None => caps[0].to_string(),
        }
    })
}

/// Reconcile whitespace the provider put next to inline tags (`<b0>`,
/// `</b0>`, `<br1/>`) with the source text. A run not found verbatim in the
/// source becomes the source's own run at that tag and side, or is dropped
/// when the source has none.
pub fn clean_spaces_around_tags(translation: &str, source: &str) -> String {
    let after = tag_then_space()
        .replace_all(translation, |caps: &Captures<'_>| collapse(caps, source, Side::After));
    space_then_tag()
        .replace_all(&after, |caps: &Captures<'_>| collapse(caps, source, Side::Before))
        .into_owned()
}

#[derive(Debug, Clone, Copy)]
enum Side {
    Before,
    After,
}

fn collapse(caps: &Captures<'_>, source: &str, side: Side) -> String {
    let found = &caps[0];
    if source.contains(found) {
        return found.to_string();
    }

    let tag = found.trim();
    let spacing = source_spacing(source, tag, side).unwrap_or("");
    match side {
        Side::Before => format!("{}{}", spacing, tag),
        Side::After => format!("{}{}", tag, spacing),
    }
}

/// First non-empty whitespace run next to `tag` in the source
fn source_spacing<'a>(source: &'a str, tag: &str, side: Side) -> Option<&'a str> {
    source.match_indices(tag).find_map(|(at, _)| {
        let run = match side {
            Side::Before => {
                let head = &source[..at];
                &head[head.trim_end().len()..]
            }
            Side::After => {
                let rest = &source[at + tag.len()..];
                &rest[..rest.len() - rest.trim_start().len()]
            }
        };
        (!run.is_empty()).then_some(run)
    })
}

/// Unescapes entities and reconciles tag spacing against the source text
#[derive(Debug, Clone, Copy, Default)]
pub struct TextNormalizer;

impl TextNormalizer {
    pub fn new() -> Self {
        Self
    }

    pub fn normalize(&self, translated: &str, source: &str) -> String {
        let unescaped = unescape_html(translated);
        clean_spaces_around_tags(&unescaped, source)
    }
}

/// Outcome of [`truncate`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Truncated<'a> {
    pub text: Cow<'a, str>,
    pub truncated: bool,
}

/// Limit `text` to `max_len` characters, ending in `filler` when cut.
///
/// The first `max_len - filler_len` characters are kept, so the result is
/// exactly `max_len` characters long.
pub fn truncate<'a>(text: &'a str, max_len: usize, filler: &str) -> Truncated<'a> {
    let length = text.chars().count();
    if length <= max_len {
        return Truncated {
            text: Cow::Borrowed(text),
            truncated: false,
        };
    }

    let filler_len = filler.chars().count();
    let cut: String = if filler_len >= max_len {
        text.chars().take(max_len).collect()
    } else {
        let mut kept: String = text.chars().take(max_len - filler_len).collect();
        kept.push_str(filler);
        kept
    };

    warn!(
        "Text of {} characters truncated to {} characters before translation",
        length, max_len
    );

    Truncated {
        text: Cow::Owned(cut),
        truncated: true,
    }
}
