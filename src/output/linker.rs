// Cross-reference linking of prose
//
// One left-to-right scan turns URLs, RFC and PEP citations and known
// identifiers into hyperlinks. The text between matches is formatted for
// the configured markup syntax and the joined result is converted once.

use super::markup::{format_gap, to_html};
use super::MarkupSyntax;
use indexmap::IndexMap;
use regex::Regex;
use std::sync::OnceLock;

/// Symbol name to anchor or URL, scoped to one page
pub type AnchorMap = IndexMap<String, String>;

fn pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| {
            Regex::new(
                r"\b((http|https|ftp)://\S+[\w/]|RFC[- ]?(\d+)|PEP[- ]?(\d+)|(self\.)?(\w+))",
            )
            .ok()
        })
        .as_ref()
}

/// Link `name` with the first map that knows it
fn namelink(name: &str, maps: &[&AnchorMap]) -> String {
    maps.iter()
        .find_map(|map| map.get(name))
        .map(|url| format!("<a href=\"{}\">{}</a>", url, name))
        .unwrap_or_else(|| name.to_string())
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Linker {
    syntax: MarkupSyntax,
}

impl Linker {
    pub fn new(syntax: MarkupSyntax) -> Self {
        Self { syntax }
    }

    pub fn syntax(&self) -> MarkupSyntax {
        self.syntax
    }

    /// Markup without any symbol maps
    pub fn plain(&self, text: &str) -> String {
        let empty = AnchorMap::new();
        self.markup(text, &empty, &empty, &empty)
    }

    /// Replace linkable things in `text` with hyperlinks.
    ///
    /// A name followed by `(` is looked up in `methods`, then `funcs`, then
    /// `classes`; any other bare name only in `classes`.
    pub fn markup(&self, text: &str, funcs: &AnchorMap, classes: &AnchorMap, methods: &AnchorMap) -> String {
        let Some(re) = pattern() else {
            return to_html(self.syntax, &format_gap(self.syntax, text));
        };

        let mut results = String::with_capacity(text.len() * 2);
        let mut here = 0;
        for caps in re.captures_iter(text) {
            let Some(whole) = caps.get(0) else {
                continue;
            };
            let (start, end) = (whole.start(), whole.end());
            results.push_str(&format_gap(self.syntax, &text[here..start]));
            let called = text[end..].starts_with('(');

            if caps.get(2).is_some() {
                let url = format_gap(self.syntax, whole.as_str()).replace('"', "&quot;");
                results.push_str(&format!("<a href=\"{}\">{}</a>", url, url));
            } else if let Some(rfc) = caps.get(3) {
                let label = format_gap(self.syntax, whole.as_str());
                match rfc.as_str().parse::<u64>() {
                    Ok(number) => results.push_str(&format!(
                        "<a href=\"https://www.rfc-editor.org/rfc/rfc{}.txt\">{}</a>",
                        number, label
                    )),
                    Err(_) => results.push_str(&label),
                }
            } else if let Some(pep) = caps.get(4) {
                let label = format_gap(self.syntax, whole.as_str());
                match pep.as_str().parse::<u64>() {
                    Ok(number) => results.push_str(&format!(
                        "<a href=\"https://www.python.org/dev/peps/pep-{:04}/\">{}</a>",
                        number, label
                    )),
                    Err(_) => results.push_str(&label),
                }
            } else if let Some(name) = caps.get(6) {
                let name = name.as_str();
                if caps.get(5).is_some() {
                    if called {
                        results.push_str(&format!("self.{}", namelink(name, &[methods])));
                    } else {
                        results.push_str(&format!("self.<strong>{}</strong>", name));
                    }
                } else if called {
                    results.push_str(&namelink(name, &[methods, funcs, classes]));
                } else {
                    results.push_str(&namelink(name, &[classes]));
                }
            }
            here = end;
        }
        results.push_str(&format_gap(self.syntax, &text[here..]));
        to_html(self.syntax, &results)
    }
}
