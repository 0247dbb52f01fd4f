// Output generation: page rendering, prose markup and artifact writing

pub mod documenter;
pub mod html;
pub mod linker;
pub mod markup;
pub mod namer;
pub mod repr;
pub mod templates;
pub mod writer;

pub use documenter::{Documenter, GenerationReport};
pub use html::HtmlRenderer;
pub use linker::{AnchorMap, Linker};
pub use namer::{artifact_path, file_name, sanitize};
pub use templates::TemplateEngine;
pub use writer::{ArtifactStore, DirectoryStore, MemoryStore};

use serde::{Deserialize, Serialize};

/// Syntax docstrings are assumed to be written in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkupSyntax {
    /// Pre-formatted plain text
    #[default]
    Plain,
    /// reStructuredText
    Rst,
    Markdown,
}
