//! livedoc - Generate HTML reference pages from a live object graph
//!
//! Resolves dotted names against a runtime's module system, classifies
//! class members against their ancestry, hyperlinks docstring prose and
//! writes one page per entity. Modules mentioned along the way are
//! documented too, up to a configurable cap.

pub mod analysis;
pub mod cli;
pub mod config;
pub mod error;
pub mod output;
pub mod parser;
pub mod runtime;

// Re-export main types
pub use analysis::{Entity, EntityKind, Frontier, Reference, Resolver};
pub use config::Config;
pub use error::{Error, Result};
pub use output::{Documenter, GenerationReport, HtmlRenderer, MarkupSyntax, TemplateEngine};
pub use runtime::{load_snapshot, Interpreter, ModuleSystem, Reflect, Snapshot};
