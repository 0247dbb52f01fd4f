// Documentation driver
//
// Renders the requested names, walks packages below them, then drains the
// discovery frontier until it is empty or the cap is reached.

use super::html::HtmlRenderer;
use super::namer::file_name;
use super::templates::TemplateEngine;
use super::writer::ArtifactStore;
use crate::analysis::{Entity, EntityKind, Frontier, FrontierEntry, Reference, Resolver};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::runtime::{ModuleSystem, Reflect};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{debug, error, info, warn};

/// Outcome of one generation run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GenerationReport {
    /// Every page written, primary and discovered
    pub written: Vec<PathBuf>,
    /// Pages written while draining the frontier
    pub discovered: usize,
    /// Discovered pages left alone because they already existed
    pub skipped: usize,
    /// Requested names that could not be documented, with the reason
    pub failed: Vec<(String, String)>,
    /// Discovered entities whose page could not be written
    pub dropped: usize,
    /// Drain attempts counted against the cap
    pub attempts: usize,
    /// Entries still queued when the drain stopped
    pub remaining: usize,
}

impl GenerationReport {
    pub fn summary(&self) -> String {
        let mut summary = format!(
            "{} page(s) written ({} discovered), {} skipped, {} failed",
            self.written.len(),
            self.discovered,
            self.skipped,
            self.failed.len()
        );
        if self.dropped > 0 {
            summary.push_str(&format!(", {} discovered entity(ies) dropped", self.dropped));
        }
        if self.remaining > 0 {
            summary.push_str(&format!(", {} left undocumented by the cap", self.remaining));
        }
        summary
    }
}

/// Module name for a source file path such as `pkg/mod.py`
fn module_for_file(name: &str) -> String {
    let stem = name.strip_suffix(".py").unwrap_or(name);
    let stem = stem
        .strip_suffix("/__init__")
        .or_else(|| stem.strip_suffix("\\__init__"))
        .unwrap_or(stem);
    stem.trim_start_matches("./").replace(['/', '\\'], ".")
}

/// Drives one documentation run over a runtime
pub struct Documenter<'a, R, S> {
    rt: &'a mut R,
    store: &'a mut S,
    config: &'a Config,
    templates: &'a TemplateEngine,
    resolver: Resolver,
    frontier: Frontier,
    report: GenerationReport,
    show_progress: bool,
}

impl<'a, R, S> Documenter<'a, R, S>
where
    R: Reflect + ModuleSystem,
    S: ArtifactStore,
{
    pub fn new(rt: &'a mut R, store: &'a mut S, config: &'a Config, templates: &'a TemplateEngine) -> Self {
        Self {
            rt,
            store,
            config,
            templates,
            resolver: Resolver::new(),
            frontier: Frontier::new(config.discovery.transitive),
            report: GenerationReport::default(),
            show_progress: false,
        }
    }

    /// Re-import modules that are already loaded
    pub fn with_force_reload(mut self, force_reload: bool) -> Self {
        self.resolver = Resolver::new().with_force_reload(force_reload);
        self
    }

    /// Show a progress bar while draining
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn report(&self) -> &GenerationReport {
        &self.report
    }

    pub fn frontier(&self) -> &Frontier {
        &self.frontier
    }

    pub fn frontier_mut(&mut self) -> &mut Frontier {
        &mut self.frontier
    }

    /// Document the names, walk their packages, then drain discoveries
    pub fn run(mut self, names: &[String]) -> GenerationReport {
        self.document_batch(names);
        self.drain();
        self.report
    }

    /// Render and store the page of one requested name
    pub fn write_doc(&mut self, reference: Reference<'_>) -> Result<(Entity, PathBuf)> {
        let entity = self.resolver.resolve(&mut *self.rt, reference)?;
        // Requested entities never come back through the frontier
        self.frontier.retire(entity.handle);
        let path = self.write_entity(&entity)?;
        Ok((entity, path))
    }

    fn write_entity(&mut self, entity: &Entity) -> Result<PathBuf> {
        let page = {
            let renderer = HtmlRenderer::new(&*self.rt, self.config, self.templates)?;
            renderer.render_page(entity, &mut self.frontier)?
        };
        let name = file_name(&entity.display_name);
        let path = self.store.write(&name, &page)?;
        println!("wrote {}", name);
        self.report.written.push(path.clone());
        Ok(path)
    }

    fn record_failure(&mut self, name: &str, err: Error) {
        match &err {
            Error::Resolution(_) => warn!(name, "no documentation found"),
            err if err.is_skippable() => warn!(name, error = %err, "could not document"),
            err => error!(name, error = %err, "failed to write page"),
        }
        self.report.failed.push((name.to_string(), err.to_string()));
    }

    /// Document each primary name; modules also get every module below them
    pub fn document_batch(&mut self, names: &[String]) {
        for name in names {
            if name.ends_with(".py") {
                let module = module_for_file(name);
                if let Err(error) = self.write_doc(Reference::Path(&module)) {
                    self.record_failure(name, error);
                }
                continue;
            }

            let entity = match self.write_doc(Reference::Path(name)) {
                Ok((entity, _)) => entity,
                Err(error) => {
                    self.record_failure(name, error);
                    continue;
                }
            };
            if entity.kind != EntityKind::Module {
                continue;
            }
            for child in self.rt.iter_modules(&entity.qualified_name) {
                debug!(package = %entity.qualified_name, module = %child, "package walk");
                if let Err(error) = self.write_doc(Reference::Path(&child)) {
                    self.record_failure(&child, error);
                }
            }
        }
    }

    fn progress_bar(&self) -> Option<ProgressBar> {
        if !self.show_progress {
            return None;
        }
        let length = self.frontier.len().min(self.config.discovery.cap);
        let pb = ProgressBar::new(length as u64);
        if let Ok(style) = ProgressStyle::default_bar().template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}") {
            pb.set_style(style.progress_chars("#>-"));
        }
        Some(pb)
    }

    /// Consume the frontier until it is empty or `cap` pages were attempted.
    ///
    /// Entries whose page already exists are dropped without counting when
    /// existing pages are kept. Entries that fail are dropped quietly.
    pub fn drain(&mut self) {
        self.frontier.start_draining();
        let cap = self.config.discovery.cap;
        let progress = self.progress_bar();

        while self.report.attempts < cap {
            let Some(entry) = self.frontier.pop() else {
                break;
            };
            let name = file_name(&entry.name);
            if self.config.skip_if_written() && self.store.exists(&name) {
                debug!(file = %name, "already written, skipping");
                self.report.skipped += 1;
                continue;
            }

            self.report.attempts += 1;
            if let Some(ref pb) = progress {
                pb.set_length((self.report.attempts + self.frontier.len()).min(cap) as u64);
                pb.set_message(entry.name.clone());
                pb.inc(1);
            }
            match self.write_entry(&entry) {
                Ok(_) => self.report.discovered += 1,
                Err(err) => {
                    debug!(name = %entry.name, error = %err, "dropping discovered entity");
                    self.report.dropped += 1;
                }
            }
        }

        if let Some(pb) = progress {
            pb.finish_with_message("Drain complete");
        }
        self.report.remaining = self.frontier.len();
        if self.report.remaining > 0 {
            warn!(
                remaining = self.report.remaining,
                cap, "discovery cap reached, some entities were not documented"
            );
        } else {
            info!(attempts = self.report.attempts, "frontier drained");
        }
    }

    fn write_entry(&mut self, entry: &FrontierEntry) -> Result<PathBuf> {
        let entity = Entity::new(&*self.rt, entry.handle, entry.name.clone());
        self.write_entity(&entity)
    }
}
