// HTML page renderer
//
// Builds the body of a page for a module, class, routine, data descriptor
// or plain value. Modules mentioned along the way are queued on the
// discovery frontier so they get pages of their own.

use super::linker::{AnchorMap, Linker};
use super::repr::{escape, html_repr};
use super::templates::TemplateEngine;
use crate::analysis::{
    classify, classify_class_attrs, describe, get_doc, is_visible_in, module_exports, Entity, EntityKind, Frontier,
    MemberKind, MemberValue, Ownership,
};
use crate::config::Config;
use crate::error::Result;
use crate::runtime::{ModuleSystem, ObjectId, ObjectKind, Reflect, RoutineInfo, RoutineKind};
use indexmap::IndexMap;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, warn};

/// Modules documented online even when not marked as standard library
const KNOWN_STDLIB: &[&str] = &[
    "errno",
    "exceptions",
    "gc",
    "imp",
    "marshal",
    "posix",
    "signal",
    "sys",
    "_thread",
    "zipimport",
];

const COLUMNS: usize = 4;

/// Symbol maps used to link the prose of one fragment
#[derive(Debug, Clone, Copy)]
pub struct Links<'m> {
    pub funcs: &'m AnchorMap,
    pub classes: &'m AnchorMap,
    pub methods: &'m AnchorMap,
}

/// One class in an inheritance tree
#[derive(Debug, Clone, PartialEq)]
pub struct TreeEntry {
    pub class: ObjectId,
    pub bases: Vec<ObjectId>,
    pub children: Vec<TreeEntry>,
}

/// Inheritance forest of `classes`; each class appears once, under its
/// first base that is also in the list
pub fn class_tree(rt: &impl Reflect, classes: &[ObjectId]) -> Vec<TreeEntry> {
    let mut children: IndexMap<ObjectId, Vec<ObjectId>> = IndexMap::new();
    let mut roots = Vec::new();
    for &class in classes {
        let bases = rt.bases(class);
        if bases.is_empty() {
            if !roots.contains(&class) {
                roots.push(class);
            }
            continue;
        }
        for parent in bases {
            let siblings = children.entry(parent).or_default();
            if !siblings.contains(&class) {
                siblings.push(class);
            }
            if classes.contains(&parent) {
                break;
            }
        }
    }
    for &parent in children.keys() {
        if !classes.contains(&parent) {
            roots.push(parent);
        }
    }
    walk_tree(rt, roots, &children)
}

fn walk_tree(rt: &impl Reflect, mut level: Vec<ObjectId>, children: &IndexMap<ObjectId, Vec<ObjectId>>) -> Vec<TreeEntry> {
    level.sort_by(|a, b| (rt.module_name(*a), rt.name(*a)).cmp(&(rt.module_name(*b), rt.name(*b))));
    level
        .into_iter()
        .map(|class| TreeEntry {
            class,
            bases: rt.bases(class),
            children: children
                .get(&class)
                .map(|below| walk_tree(rt, below.clone(), children))
                .unwrap_or_default(),
        })
        .collect()
}

/// Lay items out in four columns, filled top to bottom
pub fn multicolumn(items: &[String]) -> String {
    let rows = items.len().div_ceil(COLUMNS);
    let mut result = String::new();
    for col in 0..COLUMNS {
        result.push_str(&format!("<td width=\"{}%\" valign=top>", 100 / COLUMNS));
        for item in items.iter().skip(rows * col).take(rows) {
            result.push_str(item);
            result.push_str("<br>\n");
        }
        result.push_str("</td>");
    }
    format!("<table width=\"100%\" summary=\"list\"><tr>{}</tr></table>", result)
}

fn file_link(path: &Path) -> String {
    let shown = path.display().to_string().replace('\\', "/");
    format!("<a href=\"file:{}\">{}</a>", shown, shown)
}

/// Bound to a receiver that is not a module
fn is_bound(rt: &impl Reflect, info: &RoutineInfo) -> bool {
    match info.kind {
        RoutineKind::BoundMethod => true,
        RoutineKind::Builtin => info.receiver.is_some_and(|receiver| !rt.is_module(receiver)),
        _ => false,
    }
}

/// Emits `<hr>` between member groups
struct Rule(bool);

impl Rule {
    fn maybe(&mut self, out: &mut String) {
        if self.0 {
            out.push_str("<hr>\n");
        }
        self.0 = true;
    }
}

/// Renders documentation pages for entities of one runtime
pub struct HtmlRenderer<'a, R> {
    rt: &'a R,
    config: &'a Config,
    templates: &'a TemplateEngine,
    linker: Linker,
    skip_modules: Vec<glob::Pattern>,
}

impl<'a, R: Reflect + ModuleSystem> HtmlRenderer<'a, R> {
    pub fn new(rt: &'a R, config: &'a Config, templates: &'a TemplateEngine) -> Result<Self> {
        let skip_modules = config
            .render
            .skip_modules
            .iter()
            .map(|pattern| glob::Pattern::new(pattern))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Self {
            rt,
            config,
            templates,
            linker: Linker::new(config.render.markup),
            skip_modules,
        })
    }

    /// Modules that are never linked or queued
    pub fn is_skipped(&self, module: &str) -> bool {
        self.skip_modules.iter().any(|pattern| pattern.matches(module))
    }

    /// Full page for an entity
    pub fn render_page(&self, entity: &Entity, frontier: &mut Frontier) -> Result<String> {
        let title = describe(self.rt, entity.handle);
        let contents = self.document(entity.handle, &entity.display_name, frontier)?;
        self.templates.page(&title, &contents)
    }

    /// Page body for any object
    pub fn document(&self, id: ObjectId, name: &str, frontier: &mut Frontier) -> Result<String> {
        let empty = AnchorMap::new();
        let links = Links {
            funcs: &empty,
            classes: &empty,
            methods: &empty,
        };
        match EntityKind::of(self.rt, id) {
            EntityKind::Module => self.doc_module(id, frontier),
            EntityKind::Class => self.doc_class(id, name, "", &links),
            EntityKind::Routine => Ok(self.doc_routine(id, name, "", &links, None)),
            EntityKind::DataDescriptor => Ok(self.doc_data(id, name)),
            EntityKind::OtherValue => Ok(self.doc_other(id, name)),
        }
    }

    /// Online reference page of a standard library module, when preferred
    pub fn getdocloc(&self, module: ObjectId) -> Option<String> {
        if !self.config.render.prefer_online_docs || !self.rt.is_module(module) {
            return None;
        }
        let name = self.rt.name(module)?;
        let stdlib = KNOWN_STDLIB.contains(&name) || self.rt.module_info(module).is_some_and(|info| info.stdlib);
        if !stdlib {
            return None;
        }

        let base = &self.config.render.online_docs_base;
        let page = format!("{}.html", name.to_lowercase());
        if base.starts_with("http://") || base.starts_with("https://") {
            Some(format!("{}/{}", base.trim_end_matches('/'), page))
        } else {
            Some(Path::new(base).join(page).display().to_string())
        }
    }

    /// Class name, qualified when it lives outside `modname`
    fn classname(&self, class: ObjectId, modname: &str) -> String {
        let name = self.rt.name(class).unwrap_or("");
        match self.rt.module_name(class) {
            Some(module) if module != modname => format!("{}.{}", module, name),
            _ => name.to_string(),
        }
    }

    /// Link to a class's anchor on its module page, when the module exposes it
    pub fn classlink(&self, class: ObjectId, modname: &str) -> String {
        let label = self.classname(class, modname);
        let (Some(name), Some(module)) = (self.rt.name(class), self.rt.module_name(class)) else {
            return label;
        };
        match self.rt.module_named(module) {
            Some(home) if matches!(self.rt.get_attr(home, name), Ok(Some(found)) if found == class) => {
                format!("<a href=\"{}.html#{}\">{}</a>", module, name, label)
            }
            _ => label,
        }
    }

    /// Link to a module page, queueing the module unless it is documented online
    fn modulelink(&self, module: ObjectId, frontier: &mut Frontier) -> String {
        let name = self.rt.name(module).unwrap_or("");
        let url = match self.getdocloc(module) {
            Some(location) => location,
            None => {
                frontier.add(module, name);
                format!("{}.html", name)
            }
        };
        format!("<a href=\"{}\">{}</a>", url, name)
    }

    fn module_package_link(&self, short: &str, parent: &str, is_package: bool) -> String {
        let url = if parent.is_empty() {
            format!("{}.html", short)
        } else {
            format!("{}.{}.html", parent, short)
        };
        let text = if is_package {
            format!("<strong>{}</strong>&nbsp;(package)", short)
        } else {
            short.to_string()
        };
        format!("<a href=\"{}\">{}</a>", url, text)
    }

    /// Queue the home module of an object defined elsewhere
    fn note_foreign_home(
        &self,
        value: ObjectId,
        module: ObjectId,
        from_modules: &mut BTreeMap<String, ObjectId>,
        frontier: &mut Frontier,
    ) -> ObjectId {
        let Some(home) = self.rt.module_of(value) else {
            return module;
        };
        if home != module {
            let home_name = self.rt.name(home).unwrap_or("").to_string();
            if !self.is_skipped(&home_name) {
                frontier.add(home, home_name.clone());
                from_modules.insert(home_name, home);
            }
        }
        home
    }

    fn doc_module(&self, module: ObjectId, frontier: &mut Frontier) -> Result<String> {
        let rt = self.rt;
        let name = rt.name(module).unwrap_or("");
        let info = rt.module_info(module);
        let exports = module_exports(rt, module, self.config);
        let exports = exports.as_deref();

        let parts: Vec<&str> = name.split('.').collect();
        let mut links: Vec<String> = (0..parts.len().saturating_sub(1))
            .map(|i| {
                format!(
                    "<a href=\"{}.html\"><span class=\"module-link\">{}</span></a>",
                    parts[..=i].join("."),
                    parts[i]
                )
            })
            .collect();
        if let Some(last) = parts.last() {
            links.push(last.to_string());
        }
        let mut head = format!("<big><big><strong>{}</strong></big></big>", links.join("."));

        let mut meta = Vec::new();
        if let Some(version) = info.and_then(|info| info.version.as_deref()) {
            let version = version
                .strip_prefix("$Revision: ")
                .and_then(|v| v.strip_suffix('$'))
                .map(str::trim)
                .unwrap_or(version);
            meta.push(format!("version {}", escape(version)));
        }
        if let Some(date) = info.and_then(|info| info.date.as_deref()) {
            meta.push(escape(date));
        }
        if !meta.is_empty() {
            head.push_str(&format!(" ({})", meta.join(", ")));
        }

        let file = match info.and_then(|info| info.file.as_deref()) {
            Some(path) => file_link(path),
            None => "(built-in)".to_string(),
        };
        let reference = match self.getdocloc(module) {
            Some(location) => format!("<br><a href=\"{}\">Module Reference</a>", location),
            None => String::new(),
        };
        let mut result = self.templates.heading(
            &head,
            "module",
            &format!("<a href=\".\">index</a><br>{}{}", file, reference),
        )?;

        let mut members = rt.list_members(module);
        members.sort_by(|a, b| a.0.cmp(b.0));

        let modules: Vec<ObjectId> = members
            .iter()
            .filter(|(key, value)| rt.is_module(*value) && !self.is_skipped(key))
            .map(|&(_, value)| value)
            .collect();

        let mut from_modules = BTreeMap::new();
        let mut classes = Vec::new();
        let mut class_dict = AnchorMap::new();
        for &(key, value) in members.iter().filter(|(_, value)| rt.is_class(*value)) {
            let home = self.note_foreign_home(value, module, &mut from_modules, frontier);
            if home == module && is_visible_in(rt, key, exports, Some(module)) {
                classes.push((key, value));
                class_dict.insert(key.to_string(), format!("#{}", key));
            }
        }
        for &(_, class) in &classes {
            for base in rt.bases(class) {
                let (Some(key), Some(modname)) = (rt.name(base), rt.module_name(base)) else {
                    continue;
                };
                if modname == name || class_dict.contains_key(key) {
                    continue;
                }
                let exposed = rt
                    .module_named(modname)
                    .is_some_and(|home| matches!(rt.get_attr(home, key), Ok(Some(found)) if found == base));
                if exposed {
                    class_dict.insert(key.to_string(), format!("{}.html#{}", modname, key));
                }
            }
        }

        let mut funcs = Vec::new();
        let mut function_dict = AnchorMap::new();
        for &(key, value) in members.iter().filter(|(_, value)| rt.kind(*value).is_routine()) {
            self.note_foreign_home(value, module, &mut from_modules, frontier);
            if is_visible_in(rt, key, exports, Some(module)) {
                funcs.push((key, value));
                function_dict.insert(key.to_string(), format!("#-{}", key));
            }
        }

        let mut data = Vec::new();
        for &(key, value) in &members {
            let kind = rt.kind(value);
            if matches!(kind, ObjectKind::Module | ObjectKind::Class) || kind.is_routine() {
                continue;
            }
            let type_module = rt.module_name(rt.type_of(value)).unwrap_or("");
            if self.is_skipped(type_module) {
                debug!(module = name, member = key, "skipping data from a skipped module");
                continue;
            }
            if is_visible_in(rt, key, exports, Some(module)) {
                data.push((key, value));
            }
        }

        let empty = AnchorMap::new();
        let doc = self.linker.markup(&get_doc(rt, module), &function_dict, &class_dict, &empty);
        if doc.is_empty() {
            result.push_str("<p></p>\n");
        } else {
            result.push_str(&format!("<p><tt>{}</tt></p>\n", doc));
        }

        if info.is_some_and(|info| info.package) {
            let below = format!("{}.", name);
            let mut entries = Vec::new();
            for child in rt.iter_modules(name) {
                let Some(short) = child.strip_prefix(&below) else {
                    continue;
                };
                if short.contains('.') || self.is_skipped(short) {
                    continue;
                }
                let child_id = rt.module_named(&child).filter(|_| rt.import_failure(&child).is_none());
                let is_package = child_id
                    .and_then(|id| rt.module_info(id))
                    .is_some_and(|info| info.package);
                match child_id {
                    Some(id) => {
                        frontier.add(id, child.clone());
                    }
                    None => warn!(module = %child, "cannot import, not documenting"),
                }
                entries.push(self.module_package_link(short, name, is_package));
            }
            result.push_str(&self.templates.bigsection("Package Contents", "modules", &multicolumn(&entries))?);
        } else if !modules.is_empty() {
            let entries: Vec<String> = modules.iter().map(|&m| self.modulelink(m, frontier)).collect();
            result.push_str(&self.templates.bigsection("Modules", "modules", &multicolumn(&entries))?);
        }

        if !from_modules.is_empty() {
            let entries: Vec<String> = from_modules.values().map(|&m| self.modulelink(m, frontier)).collect();
            result.push_str(&self.templates.bigsection("`from` Modules", "modules", &multicolumn(&entries))?);
        }

        let links = Links {
            funcs: &function_dict,
            classes: &class_dict,
            methods: &empty,
        };
        if !classes.is_empty() {
            let list: Vec<ObjectId> = classes.iter().map(|&(_, class)| class).collect();
            let mut contents = vec![self.format_tree(&class_tree(rt, &list), name, None)];
            for &(key, class) in &classes {
                contents.push(self.doc_class(class, key, name, &links)?);
            }
            result.push_str(&self.templates.bigsection("Classes", "classes", &contents.join(" "))?);
        }

        if !funcs.is_empty() {
            let contents: Vec<String> = funcs
                .iter()
                .map(|&(key, value)| self.doc_routine(value, key, name, &links, None))
                .collect();
            result.push_str(&self.templates.bigsection("Functions", "functions", &contents.join(" "))?);
        }

        if !data.is_empty() {
            let contents: Vec<String> = data.iter().map(|&(key, value)| self.doc_other(value, key)).collect();
            result.push_str(&self.templates.bigsection("Data", "data", &contents.join("<br>\n"))?);
        }

        if let Some(author) = info.and_then(|info| info.author.as_deref()) {
            result.push_str(&self.templates.bigsection("Author", "meta", &self.linker.plain(author))?);
        }
        if let Some(credits) = info.and_then(|info| info.credits.as_deref()) {
            result.push_str(&self.templates.bigsection("Credits", "meta", &self.linker.plain(credits))?);
        }

        Ok(result)
    }

    /// Nested definition lists for a class tree
    pub fn format_tree(&self, entries: &[TreeEntry], modname: &str, parent: Option<ObjectId>) -> String {
        let mut result = String::new();
        for entry in entries {
            result.push_str("<dt><span class=\"tree-entry\">");
            result.push_str(&self.classlink(entry.class, modname));
            let only_parent = entry.bases.len() == 1 && Some(entry.bases[0]) == parent;
            if !entry.bases.is_empty() && !only_parent {
                let parents: Vec<String> = entry.bases.iter().map(|&base| self.classlink(base, modname)).collect();
                result.push_str(&format!("({})", parents.join(", ")));
            }
            result.push_str("\n</span></dt>");
            if !entry.children.is_empty() {
                result.push_str(&format!(
                    "<dd>\n{}</dd>\n",
                    self.format_tree(&entry.children, modname, Some(entry.class))
                ));
            }
        }
        format!("<dl>\n{}</dl>\n", result)
    }

    /// Raw value of `name` in the first namespace along the ancestry
    fn static_attr(&self, class: ObjectId, name: &str) -> Option<ObjectId> {
        self.rt.ancestry(class).into_iter().find_map(|ancestor| {
            self.rt
                .list_members(ancestor)
                .into_iter()
                .find(|(member, _)| *member == name)
                .map(|(_, value)| value)
        })
    }

    fn doc_member(
        &self,
        value: ObjectId,
        name: &str,
        modname: &str,
        links: &Links<'_>,
        class: ObjectId,
    ) -> Result<String> {
        match EntityKind::of(self.rt, value) {
            EntityKind::Class => self.doc_class(value, name, modname, links),
            EntityKind::Routine => Ok(self.doc_routine(value, name, modname, links, Some(class))),
            EntityKind::DataDescriptor => Ok(self.doc_data(value, name)),
            EntityKind::Module | EntityKind::OtherValue => Ok(self.doc_other(value, name)),
        }
    }

    /// Class section: ancestry, members grouped by owner and kind, docstring
    pub fn doc_class(&self, class: ObjectId, name: &str, modname: &str, links: &Links<'_>) -> Result<String> {
        let rt = self.rt;
        let real_name = rt.name(class).unwrap_or("");
        let name = if name.is_empty() { real_name } else { name };
        let class_module = rt.module_name(class).unwrap_or("");

        let mut contents = String::new();
        let mut rule = Rule(false);

        let mro = rt.ancestry(class);
        if mro.len() > 2 {
            rule.maybe(&mut contents);
            contents.push_str("<dl><dt>Method resolution order:</dt>\n");
            for &base in &mro {
                contents.push_str(&format!("<dd>{}</dd>\n", self.classlink(base, class_module)));
            }
            contents.push_str("</dl>\n");
        }

        let mut module_dict = AnchorMap::new();
        for (key, ..) in classify_class_attrs(rt, class) {
            if is_visible_in(rt, &key, None, Some(class)) {
                let anchor = format!("#{}-{}", name, key);
                module_dict.insert(key, anchor);
            }
        }
        let member_links = Links {
            funcs: links.funcs,
            classes: links.classes,
            methods: &module_dict,
        };

        for group in classify(rt, class) {
            let tag = match group.ownership {
                Ownership::DefinedHere => "defined here".to_string(),
                Ownership::InheritedFrom(owner) => {
                    format!("inherited from {}", self.classlink(owner, class_module))
                }
            };
            rule.maybe(&mut contents);
            contents.push_str(&format!("{} {}:<br>\n", group.kind.label(), tag));

            for member in &group.members {
                let value = match member.value {
                    MemberValue::Resolved(value) => value,
                    MemberValue::Degraded(_) => {
                        contents.push_str(&self.doc_data(member.raw, &member.name));
                        continue;
                    }
                };
                match group.kind {
                    MemberKind::Method | MemberKind::ClassMethod | MemberKind::StaticMethod => {
                        contents.push_str(&self.doc_member(value, &member.name, modname, &member_links, class)?);
                        contents.push('\n');
                    }
                    MemberKind::ReadonlyProperty | MemberKind::DataDescriptor => {
                        contents.push_str(&self.doc_data(member.raw, &member.name));
                    }
                    MemberKind::PlainData => {
                        let base = self.doc_other(value, &member.name);
                        let doc = get_doc(rt, member.raw);
                        if doc.is_empty() {
                            contents.push_str(&format!("<dl><dt>{}</dl>\n", base));
                        } else {
                            let doc = self.linker.markup(&doc, links.funcs, links.classes, &module_dict);
                            contents.push_str(&format!("<dl><dt>{}<dd><tt>{}</tt></dl>\n", base, doc));
                        }
                        contents.push('\n');
                    }
                }
            }
        }

        let mut title = if name == real_name {
            format!("<a name=\"{}\">class <strong>{}</strong></a>", name, real_name)
        } else {
            format!("<strong>{}</strong> = <a name=\"{}\">class {}</a>", name, name, real_name)
        };
        let bases = rt.bases(class);
        if !bases.is_empty() {
            let parents: Vec<String> = bases.iter().map(|&base| self.classlink(base, class_module)).collect();
            title.push_str(&format!("({})", parents.join(", ")));
        }

        let mut doc = get_doc(rt, class);
        if let Some(signature) = rt.signature(class).filter(|s| !s.is_empty() && *s != "()") {
            doc = format!("{}{}\n\n{}", name, signature, doc);
        }
        let doc = self.linker.markup(&doc, links.funcs, links.classes, &module_dict);
        let doc = if doc.is_empty() {
            doc
        } else {
            format!("<tt>{}<br>&nbsp;</tt>", doc)
        };

        self.templates.section(&title, "class", &contents, &doc)
    }

    /// Definition entry for a function or method
    pub fn doc_routine(
        &self,
        routine: ObjectId,
        name: &str,
        modname: &str,
        links: &Links<'_>,
        class: Option<ObjectId>,
    ) -> String {
        let rt = self.rt;
        let real_name = rt.name(routine).unwrap_or(name);
        let name = if name.is_empty() { real_name } else { name };
        let class_name = class.and_then(|c| rt.name(c)).unwrap_or("");
        let anchor = format!("{}-{}", class_name, name);
        let info = rt.routine(routine);

        let mut note = String::new();
        if let Some(receiver) = info.filter(|info| is_bound(rt, info)).and_then(|info| info.receiver) {
            let receiver_class = rt.type_of(receiver);
            match class {
                Some(class) if receiver_class != class => {
                    note = format!(" from {}", self.classlink(receiver_class, modname));
                }
                Some(_) => {}
                None => {
                    note = format!(" method of {} instance", self.classlink(receiver_class, modname));
                }
            }
        }
        let async_prefix = if info.is_some_and(|info| info.is_async) {
            "async "
        } else {
            ""
        };

        let mut skip_docs = false;
        let mut title = if name == real_name {
            format!("<a name=\"{}\"><strong>{}</strong></a>", anchor, real_name)
        } else {
            let real_link = match class {
                Some(class) if self.static_attr(class, real_name) == Some(routine) => {
                    skip_docs = true;
                    format!("<a href=\"#{}-{}\">{}</a>", class_name, real_name, real_name)
                }
                _ => real_name.to_string(),
            };
            format!("<a name=\"{}\"><strong>{}</strong></a> = {}", anchor, name, real_link)
        };

        let mut argspec = rt.signature(routine).unwrap_or("").to_string();
        if real_name == "<lambda>" && !argspec.is_empty() {
            title = format!("<strong>{}</strong> <em>lambda</em> ", name);
            let mut inner = argspec.chars();
            inner.next();
            inner.next_back();
            argspec = inner.as_str().to_string();
        }
        if argspec.is_empty() {
            argspec = "(...)".to_string();
        }

        let note = if note.is_empty() {
            note
        } else {
            format!("<span class=\"disabled\">{}</span>", note)
        };
        let decl = format!("{}{}{}{}", async_prefix, title, escape(&argspec), note);
        if skip_docs {
            return format!("<dl><dt>{}</dt></dl>\n", decl);
        }

        let doc = self.linker.markup(&get_doc(rt, routine), links.funcs, links.classes, links.methods);
        let doc = if doc.is_empty() {
            doc
        } else {
            format!("<dd><tt>{}</tt></dd>", doc)
        };
        format!("<dl><dt>{}</dt>{}</dl>\n", decl, doc)
    }

    /// Definition entry for a data descriptor
    pub fn doc_data(&self, descriptor: ObjectId, name: &str) -> String {
        let mut result = String::new();
        if !name.is_empty() {
            result.push_str(&format!("<dl><dt><strong>{}</strong></dt>\n", name));
        }
        let doc = self.linker.plain(&get_doc(self.rt, descriptor));
        if !doc.is_empty() {
            result.push_str(&format!("<dd><tt>{}</tt></dd>\n", doc));
        }
        result.push_str("</dl>\n");
        result
    }

    /// `name = repr` line for a plain value
    pub fn doc_other(&self, value: ObjectId, name: &str) -> String {
        let lhs = if name.is_empty() {
            String::new()
        } else {
            format!("<strong>{}</strong> = ", name)
        };
        lhs + &html_repr(self.rt, value)
    }
}
