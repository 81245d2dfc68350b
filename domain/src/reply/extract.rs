//! Lenient JSON extraction from free-form model output.
//!
//! Backends routinely wrap the reply object in prose or code fences. The
//! extraction is deliberately greedy: it takes everything from the first
//! `{` to the last `}`, without balancing braces.

use std::borrow::Cow;

/// Greedy `{...}` span: first `{` through last `}`.
pub fn extract_json_span(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&raw[start..=end])
}

/// Replace `\uXXXX` escapes for code points above U+0080 with the literal
/// character. Surrogate pairs are combined; lone surrogates and ASCII
/// escapes are left untouched.
pub fn unescape_high_unicode(s: &str) -> Cow<'_, str> {
    let bytes = s.as_bytes();
    let mut out: Option<String> = None;
    let mut last = 0;
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'\\' {
            i += 1;
            continue;
        }
        if bytes.get(i + 1) == Some(&b'u')
            && let Some(code) = parse_hex4(&s[i + 2..])
            && code >= 0x80
            && let Some((ch, consumed)) = decode_escape(s, i, code)
        {
            let buf = out.get_or_insert_with(|| String::with_capacity(s.len()));
            buf.push_str(&s[last..i]);
            buf.push(ch);
            i += consumed;
            last = i;
            continue;
        }
        // Skip the escaped character so `\\u0041` stays a literal backslash.
        i += 2;
    }

    match out {
        Some(mut buf) => {
            buf.push_str(&s[last.min(s.len())..]);
            Cow::Owned(buf)
        }
        None => Cow::Borrowed(s),
    }
}

fn decode_escape(s: &str, at: usize, code: u32) -> Option<(char, usize)> {
    match code {
        0xD800..=0xDBFF => {
            let rest = &s[at + 6..];
            let low = rest.strip_prefix("\\u").and_then(parse_hex4)?;
            if !(0xDC00..=0xDFFF).contains(&low) {
                return None;
            }
            let combined = 0x10000 + ((code - 0xD800) << 10) + (low - 0xDC00);
            char::from_u32(combined).map(|ch| (ch, 12))
        }
        0xDC00..=0xDFFF => None,
        _ => char::from_u32(code).map(|ch| (ch, 6)),
    }
}

fn parse_hex4(s: &str) -> Option<u32> {
    let digits = s.get(..4)?;
    if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    u32::from_str_radix(digits, 16).ok()
}

/// Escape raw control characters (newlines, tabs) that appear inside JSON
/// string literals. Models often emit multi-line replies unescaped.
pub fn escape_raw_control_chars(s: &str) -> Cow<'_, str> {
    if !s.chars().any(|c| (c as u32) < 0x20) {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(s.len() + 16);
    let mut in_string = false;
    let mut escaped = false;

    for c in s.chars() {
        if !in_string {
            if c == '"' {
                in_string = true;
            }
            out.push(c);
            continue;
        }
        if escaped {
            escaped = false;
            out.push(c);
            continue;
        }
        match c {
            '\\' => {
                escaped = true;
                out.push(c);
            }
            '"' => {
                in_string = false;
                out.push(c);
            }
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    Cow::Owned(out)
}
