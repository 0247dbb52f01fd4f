// Bounded, HTML-safe representations of values

use crate::runtime::{ObjectId, Reflect};
use regex::Regex;
use std::sync::OnceLock;

/// Longest representation shown before the middle is elided
pub const MAX_REPR: usize = 100;

/// Escape the characters that are special in HTML text
pub fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Omit the middle of a string so it fits in `max` characters
pub fn cram(text: &str, max: usize) -> String {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= max {
        return text.to_string();
    }
    let pre = max.saturating_sub(3) / 2;
    let post = max.saturating_sub(3).saturating_sub(pre);
    let head: String = chars[..pre].iter().collect();
    let tail: String = chars[chars.len() - post..].iter().collect();
    format!("{}...{}", head, tail)
}

/// Drop the ` at 0x...` identity suffix of a default representation
pub fn stripid(text: &str) -> String {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    let pattern = PATTERN.get_or_init(|| Regex::new(r"(?i) at 0x[0-9a-f]{6,16}(>+)$").ok());
    match pattern {
        Some(re) => re.replace(text, "$1").into_owned(),
        None => text.to_string(),
    }
}

/// Render a quoted string representation, highlighting escape sequences.
///
/// Strings whose only backslashes are literal are shown as raw strings.
pub fn repr_string(repr: &str) -> String {
    let mut chars = repr.chars();
    let (Some(quote), Some(last)) = (chars.next(), chars.next_back()) else {
        return escape(&cram(repr, MAX_REPR));
    };
    if quote != last || !matches!(quote, '\'' | '"') {
        return escape(&cram(repr, MAX_REPR));
    }
    let inner = cram(chars.as_str(), MAX_REPR);

    if inner.contains("\\\\") && !inner.replace("\\\\", "").contains('\\') {
        let raw = inner.replace("\\\\", "\\");
        return format!("r{}{}{}", quote, escape(&raw), quote);
    }

    static ESCAPES: OnceLock<Option<Regex>> = OnceLock::new();
    let escaped = escape(&format!("{}{}{}", quote, inner, quote));
    let pattern = ESCAPES.get_or_init(|| {
        Regex::new(r#"((\\[\\abfnrtv'"]|\\[0-9]..|\\x..|\\u....)+)"#).ok()
    });
    match pattern {
        Some(re) => re
            .replace_all(&escaped, r#"<span class="repr">$1</span>"#)
            .into_owned(),
        None => escaped,
    }
}

/// HTML-safe representation of a live value
pub fn html_repr(rt: &impl Reflect, id: ObjectId) -> String {
    let repr = rt.repr(id);
    match rt.name(rt.type_of(id)) {
        Some("str") => repr_string(&repr),
        _ => escape(&cram(&stripid(&repr), MAX_REPR)),
    }
}
