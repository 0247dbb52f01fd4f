use crate::error::{Error, Result};
use crate::output::MarkupSyntax;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub project: ProjectConfig,
    pub render: RenderConfig,
    pub output: OutputConfig,
    pub discovery: DiscoveryConfig,
    /// Per-module export list overrides (module name -> exported names)
    pub exports: IndexMap<String, Vec<String>>,
}

/// Project metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    pub name: String,
}

/// Rendering settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Syntax docstrings are written in
    pub markup: MarkupSyntax,
    /// Ignore export lists and show every public name
    pub document_internals: bool,
    /// Modules never linked or queued for documentation (glob patterns)
    pub skip_modules: Vec<String>,
    /// Link standard library modules to the online reference instead of local pages
    pub prefer_online_docs: bool,
    /// Base URL (or directory) of the online library reference
    pub online_docs_base: String,
}

/// Output settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub directory: PathBuf,
    /// Rewrite pages of discovered entities that already exist on disk
    pub overwrite_existing: bool,
    pub copy_assets: bool,
}

/// Discovery worklist settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Maximum number of discovered entities rendered per invocation
    pub cap: usize,
    /// Keep accepting entities discovered while the worklist drains
    pub transitive: bool,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            name: "Untitled Project".to_string(),
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            markup: MarkupSyntax::default(),
            document_internals: false,
            skip_modules: vec!["typing".to_string()],
            prefer_online_docs: false,
            online_docs_base: "https://docs.python.org/3/library".to_string(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("./livedoc-docs"),
            overwrite_existing: false,
            copy_assets: true,
        }
    }
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            cap: 100,
            transitive: false,
        }
    }
}

impl Config {
    /// Load config from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load config from file or return defaults
    pub fn load_or_default(path: &Path) -> Self {
        Self::load(path).unwrap_or_default()
    }

    /// Load the `[tool.livedoc]` table of `dir/pyproject.toml`.
    ///
    /// Returns `Ok(None)` when the file or the table is missing. Keys are
    /// matched loosely, so `--document-internals` and `document_internals`
    /// name the same setting.
    pub fn load_pyproject(dir: &Path) -> Result<Option<Self>> {
        let path = dir.join("pyproject.toml");
        if !path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(&path)?;
        let document: toml::Table = toml::from_str(&contents)?;

        let Some(table) = document
            .get("tool")
            .and_then(|tool| tool.get("livedoc"))
            .and_then(|section| section.as_table())
        else {
            return Ok(None);
        };

        let normalized = normalize_keys(table);
        let config: Config = toml::Value::Table(normalized).try_into()?;
        config.validate()?;
        Ok(Some(config))
    }

    /// Merge CLI arguments into config (CLI takes precedence)
    #[allow(clippy::too_many_arguments)]
    pub fn merge_cli(
        &mut self,
        output: Option<PathBuf>,
        markup: Option<String>,
        cap: Option<usize>,
        document_internals: bool,
        overwrite: bool,
        transitive: bool,
    ) {
        if let Some(out) = output {
            self.output.directory = out;
        }

        if let Some(syntax) = markup {
            self.render.markup = match syntax.as_str() {
                "rst" | "restructuredtext" => MarkupSyntax::Rst,
                "markdown" | "md" => MarkupSyntax::Markdown,
                _ => MarkupSyntax::Plain,
            };
        }

        if let Some(c) = cap {
            self.discovery.cap = c;
        }

        if document_internals {
            self.render.document_internals = true;
        }

        if overwrite {
            self.output.overwrite_existing = true;
        }

        if transitive {
            self.discovery.transitive = true;
        }
    }

    /// Whether discovered entities whose page already exists are skipped
    pub fn skip_if_written(&self) -> bool {
        !self.output.overwrite_existing
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.discovery.cap == 0 {
            return Err(Error::config_validation("discovery cap must be at least 1"));
        }

        if self.output.directory.as_os_str().is_empty() {
            return Err(Error::config_validation("output directory cannot be empty"));
        }

        for pattern in &self.render.skip_modules {
            glob::Pattern::new(pattern)?;
        }

        Ok(())
    }
}

/// Rewrite `--some-key` / `some-key` style keys to `some_key`, recursively.
fn normalize_keys(table: &toml::Table) -> toml::Table {
    table
        .iter()
        .map(|(key, value)| {
            let key = key.replace("--", "").replace('-', "_");
            let value = match value {
                toml::Value::Table(inner) => toml::Value::Table(normalize_keys(inner)),
                other => other.clone(),
            };
            (key, value)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.project.name, "Untitled Project");
        assert_eq!(config.discovery.cap, 100);
        assert!(!config.discovery.transitive);
        assert_eq!(config.render.markup, MarkupSyntax::Plain);
        assert_eq!(config.render.skip_modules, vec!["typing".to_string()]);
        assert!(config.skip_if_written());
    }

    #[test]
    fn test_load_valid_config() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[project]
name = "Shapes"

[render]
markup = "markdown"
document_internals = true

[discovery]
cap = 10

[exports]
shapes = ["Circle", "area"]
"#
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.project.name, "Shapes");
        assert_eq!(config.render.markup, MarkupSyntax::Markdown);
        assert!(config.render.document_internals);
        assert_eq!(config.discovery.cap, 10);
        assert_eq!(
            config.exports.get("shapes"),
            Some(&vec!["Circle".to_string(), "area".to_string()])
        );
    }

    #[test]
    fn test_load_missing_file() {
        let result = Config::load(Path::new("/nonexistent/config.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn test_validation_cap_zero() {
        let mut config = Config::default();
        config.discovery.cap = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_bad_glob() {
        let mut config = Config::default();
        config.render.skip_modules.push("[".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_pyproject_loose_keys() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("pyproject.toml"),
            r#"
[tool.livedoc.render]
document-internals = true
prefer-online-docs = true

[tool.livedoc.discovery]
"--cap" = 5
"#,
        )
        .unwrap();

        let config = Config::load_pyproject(dir.path()).unwrap().unwrap();
        assert!(config.render.document_internals);
        assert!(config.render.prefer_online_docs);
        assert_eq!(config.discovery.cap, 5);
    }

    #[test]
    fn test_load_pyproject_without_table() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("pyproject.toml"), "[tool.black]\nline-length = 88\n").unwrap();
        assert!(Config::load_pyproject(dir.path()).unwrap().is_none());

        let empty = TempDir::new().unwrap();
        assert!(Config::load_pyproject(empty.path()).unwrap().is_none());
    }

    #[test]
    fn test_merge_cli_output() {
        let mut config = Config::default();
        config.merge_cli(Some(PathBuf::from("/custom/output")), None, None, false, false, false);
        assert_eq!(config.output.directory, PathBuf::from("/custom/output"));
    }

    #[test]
    fn test_merge_cli_markup() {
        let mut config = Config::default();
        config.merge_cli(None, Some("rst".to_string()), None, false, false, false);
        assert_eq!(config.render.markup, MarkupSyntax::Rst);
    }

    #[test]
    fn test_merge_cli_flags() {
        let mut config = Config::default();
        config.merge_cli(None, None, Some(3), true, true, true);
        assert_eq!(config.discovery.cap, 3);
        assert!(config.render.document_internals);
        assert!(!config.skip_if_written());
        assert!(config.discovery.transitive);
    }

    #[test]
    fn test_markup_parsing() {
        let toml_str = r#"markup = "rst""#;
        let render: RenderConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(render.markup, MarkupSyntax::Rst);
    }
}
