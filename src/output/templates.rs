// Template engine for page chrome
//
// Page, heading and section wrappers live in tera templates embedded in
// the binary. Their content arguments are already HTML.

use crate::error::Result;
use std::collections::HashMap;
use tera::{Context, Tera, Value};

/// Template engine wrapping Tera with the embedded templates
pub struct TemplateEngine {
    tera: Tera,
}

impl TemplateEngine {
    /// Create a new template engine with embedded templates
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();

        tera.add_raw_templates(vec![
            ("page.html", include_str!("../../templates/page.html.tera")),
            ("heading.html", include_str!("../../templates/heading.html.tera")),
            ("section.html", include_str!("../../templates/section.html.tera")),
        ])?;
        // Fragments are assembled from pre-escaped HTML
        tera.autoescape_on(vec![]);
        tera.register_filter("nbsp", nbsp);

        Ok(Self { tera })
    }

    /// Create a template engine from a custom directory
    pub fn from_dir(template_dir: &str) -> Result<Self> {
        let pattern = format!("{}/**/*.tera", template_dir);
        let mut tera = Tera::new(&pattern)?;
        tera.autoescape_on(vec![]);
        tera.register_filter("nbsp", nbsp);
        Ok(Self { tera })
    }

    /// A complete HTML page
    pub fn page(&self, title: &str, contents: &str) -> Result<String> {
        let mut context = Context::new();
        context.insert("title", title);
        context.insert("contents", contents);
        Ok(self.tera.render("page.html", &context)?)
    }

    /// Page heading with a right-hand column of links
    pub fn heading(&self, title: &str, style: &str, extras: &str) -> Result<String> {
        let mut context = Context::new();
        context.insert("title", title);
        context.insert("style", style);
        context.insert("extras", extras);
        Ok(self.tera.render("heading.html", &context)?)
    }

    /// Titled section; `prelude` goes between the title and the contents
    pub fn section(&self, title: &str, style: &str, contents: &str, prelude: &str) -> Result<String> {
        let mut context = Context::new();
        context.insert("title", title);
        context.insert("style", style);
        context.insert("contents", contents);
        context.insert("prelude", prelude);
        context.insert("width", &3);
        Ok(self.tera.render("section.html", &context)?)
    }

    /// Section with a big heading
    pub fn bigsection(&self, title: &str, style: &str, contents: &str) -> Result<String> {
        let title = format!("<big><strong>{}</strong></big>", title);
        self.section(&title, style, contents, "")
    }
}

/// Repeat `&nbsp;` the given number of times
fn nbsp(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    let count = value.as_u64().unwrap_or(1) as usize;
    Ok(Value::String("&nbsp;".repeat(count)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_escapes_title_only() {
        let engine = TemplateEngine::new().unwrap();
        let html = engine.page("class <Foo>", "<p>body</p>").unwrap();
        assert!(html.contains("<title>class &lt;Foo&gt;</title>"));
        assert!(html.contains("<p>body</p>"));
        assert!(html.contains("href=\"style.css\""));
    }

    #[test]
    fn test_heading() {
        let engine = TemplateEngine::new().unwrap();
        let html = engine.heading("<strong>m</strong>", "module", "<a href=\".\">index</a>").unwrap();
        assert!(html.contains("<strong>m</strong>"));
        assert!(html.contains("class=\"heading-module\""));
        assert!(html.contains("<a href=\".\">index</a>"));
    }

    #[test]
    fn test_section_prelude() {
        let engine = TemplateEngine::new().unwrap();
        let with = engine.section("T", "class", "<dl></dl>", "<tt>doc</tt>").unwrap();
        assert!(with.contains("<tt>doc</tt>"));
        assert!(with.contains("&nbsp;&nbsp;&nbsp;"));
        let without = engine.section("T", "class", "<dl></dl>", "").unwrap();
        assert!(!without.contains("prelude"));
    }

    #[test]
    fn test_bigsection() {
        let engine = TemplateEngine::new().unwrap();
        let html = engine.bigsection("Classes", "classes", "x").unwrap();
        assert!(html.contains("<big><strong>Classes</strong></big>"));
        assert!(html.contains("section-classes"));
    }

    #[test]
    fn test_nbsp_filter() {
        let value = Value::Number(2.into());
        let result = nbsp(&value, &HashMap::new()).unwrap();
        assert_eq!(result.as_str().unwrap(), "&nbsp;&nbsp;");
    }
}
