// Prose converters
//
// Plain docstrings are pre-formatted so their layout survives in HTML.
// Markdown goes through pulldown-cmark; reStructuredText is handled for
// the constructs docstrings commonly use.

use super::repr::escape;
use super::MarkupSyntax;
use crate::analysis::docstring::expand_tabs;
use pulldown_cmark::{html, Options, Parser};
use regex::{Captures, Regex};
use std::sync::OnceLock;

/// Escape text and keep its whitespace layout
pub fn preformat(text: &str) -> String {
    escape(&expand_tabs(text))
        .replace("\n\n", "\n \n")
        .replace("\n\n", "\n \n")
        .replace(' ', "&nbsp;")
        .replace('\n', "<br>\n")
}

/// Format a text gap between recognized symbols
pub fn format_gap(syntax: MarkupSyntax, text: &str) -> String {
    match syntax {
        MarkupSyntax::Plain => preformat(text),
        MarkupSyntax::Rst | MarkupSyntax::Markdown => escape(text),
    }
}

/// Convert linked prose to HTML with the configured converter
pub fn to_html(syntax: MarkupSyntax, text: &str) -> String {
    match syntax {
        MarkupSyntax::Plain => text.to_string(),
        MarkupSyntax::Rst => rst_to_html(text),
        MarkupSyntax::Markdown => markdown_to_html(text),
    }
}

pub fn markdown_to_html(text: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    let parser = Parser::new_ext(text, options);
    let mut out = String::with_capacity(text.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}

fn indent_of(line: &str) -> usize {
    line.len() - line.trim_start().len()
}

fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

fn bullet_text(line: &str) -> Option<&str> {
    let trimmed = line.trim_start();
    ["- ", "* ", "+ "]
        .iter()
        .find_map(|marker| trimmed.strip_prefix(marker))
}

/// Title underline at least as long as the title
fn is_underline(line: &str, title_len: usize) -> bool {
    let line = line.trim_end();
    let Some(first) = line.chars().next() else {
        return false;
    };
    "=-~^\"'`#*+.:_".contains(first)
        && line.chars().all(|c| c == first)
        && line.chars().count() >= title_len.max(2)
}

/// Inline literal, strong and emphasis roles
fn rst_inline(text: &str) -> String {
    static INLINE: OnceLock<Option<Regex>> = OnceLock::new();
    let pattern = INLINE.get_or_init(|| {
        Regex::new(r"``(?P<lit>.+?)``|\*\*(?P<strong>.+?)\*\*|\*(?P<em>[^*\s][^*]*?)\*").ok()
    });
    let Some(re) = pattern else {
        return text.to_string();
    };
    re.replace_all(text, |caps: &Captures| {
        if let Some(lit) = caps.name("lit") {
            format!("<tt class=\"literal\">{}</tt>", lit.as_str())
        } else if let Some(strong) = caps.name("strong") {
            format!("<strong>{}</strong>", strong.as_str())
        } else if let Some(em) = caps.name("em") {
            format!("<em>{}</em>", em.as_str())
        } else {
            caps[0].to_string()
        }
    })
    .into_owned()
}

/// Convert a reStructuredText subset: section titles, paragraphs, bullet
/// lists, literal blocks introduced by `::`, and inline markup
pub fn rst_to_html(text: &str) -> String {
    let lines: Vec<&str> = text.lines().collect();
    let mut out = String::new();
    let mut literal_next = false;
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];
        if is_blank(line) {
            i += 1;
            continue;
        }

        if literal_next && indent_of(line) > 0 {
            let start = i;
            while i < lines.len() && (is_blank(lines[i]) || indent_of(lines[i]) > 0) {
                i += 1;
            }
            let block = &lines[start..i];
            let common = block
                .iter()
                .filter(|l| !is_blank(l))
                .map(|l| indent_of(l))
                .min()
                .unwrap_or(0);
            let body: Vec<&str> = block
                .iter()
                .map(|l| if is_blank(l) { "" } else { &l[common..] })
                .collect();
            out.push_str("<pre class=\"literal-block\">\n");
            out.push_str(body.join("\n").trim_end());
            out.push_str("\n</pre>\n");
            literal_next = false;
            continue;
        }
        literal_next = false;

        let title = line.trim();
        if i + 1 < lines.len() && is_underline(lines[i + 1], title.chars().count()) {
            out.push_str(&format!("<h4>{}</h4>\n", rst_inline(title)));
            i += 2;
            continue;
        }

        if bullet_text(line).is_some() {
            out.push_str("<ul class=\"simple\">\n");
            while let Some(first) = lines.get(i).and_then(|l| bullet_text(l)) {
                let mut item = first.trim().to_string();
                i += 1;
                while i < lines.len()
                    && !is_blank(lines[i])
                    && bullet_text(lines[i]).is_none()
                    && indent_of(lines[i]) > 0
                {
                    item.push(' ');
                    item.push_str(lines[i].trim());
                    i += 1;
                }
                out.push_str(&format!("<li>{}</li>\n", rst_inline(&item)));
            }
            out.push_str("</ul>\n");
            continue;
        }

        let mut paragraph = Vec::new();
        while i < lines.len() && !is_blank(lines[i]) {
            paragraph.push(lines[i].trim());
            i += 1;
        }
        let mut joined = paragraph.join("\n");
        if let Some(stripped) = joined.strip_suffix("::") {
            literal_next = true;
            joined = match stripped.strip_suffix(' ') {
                Some(bare) => bare.trim_end().to_string(),
                None => format!("{}:", stripped),
            };
            if joined.trim() == ":" || joined.trim().is_empty() {
                continue;
            }
        }
        out.push_str(&format!("<p>{}</p>\n", rst_inline(&joined)));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_preformat() {
        assert_eq!(preformat("a <b>\n\nc"), "a&nbsp;&lt;b&gt;<br>\n&nbsp;<br>\nc");
        assert_eq!(preformat("\tx"), "&nbsp;&nbsp;&nbsp;&nbsp;&nbsp;&nbsp;&nbsp;&nbsp;x");
    }

    #[test]
    fn test_plain_passthrough() {
        assert_eq!(to_html(MarkupSyntax::Plain, "<b>kept</b>"), "<b>kept</b>");
    }

    #[test]
    fn test_markdown() {
        let html = to_html(MarkupSyntax::Markdown, "Some *emphasis*\n\n- one\n- two");
        assert!(html.contains("<em>emphasis</em>"));
        assert!(html.contains("<li>one</li>"));
    }

    #[test]
    fn test_markdown_keeps_links() {
        let html = markdown_to_html(r##"See <a href="#Foo">Foo</a> here"##);
        assert!(html.contains(r##"<a href="#Foo">Foo</a>"##));
    }

    #[test]
    fn test_rst_paragraphs_and_inline() {
        let html = rst_to_html("First ``code`` and **bold**.\n\nSecond *soft* line.");
        assert_eq!(
            html,
            "<p>First <tt class=\"literal\">code</tt> and <strong>bold</strong>.</p>\n\
             <p>Second <em>soft</em> line.</p>\n"
        );
    }

    #[test]
    fn test_rst_title_and_list() {
        let html = rst_to_html("Usage\n=====\n\n- first item\n  continued\n- second");
        assert_eq!(
            html,
            "<h4>Usage</h4>\n<ul class=\"simple\">\n<li>first item continued</li>\n<li>second</li>\n</ul>\n"
        );
    }

    #[test]
    fn test_rst_literal_block() {
        let html = rst_to_html("Example::\n\n    x = 1\n      y = 2\n\nAfter.");
        assert_eq!(
            html,
            "<p>Example:</p>\n<pre class=\"literal-block\">\nx = 1\n  y = 2\n</pre>\n<p>After.</p>\n"
        );
    }

    #[test]
    fn test_rst_expanded_literal_marker() {
        let html = rst_to_html("Run it ::\n\n    go()\n");
        assert!(html.starts_with("<p>Run it</p>\n"));
        let html = rst_to_html("::\n\n    go()\n");
        assert!(html.starts_with("<pre"));
    }
}
