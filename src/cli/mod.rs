//! CLI module for livedoc

mod args;

pub use args::{Args, Command};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::output::{DirectoryStore, Documenter, TemplateEngine};
use crate::runtime::{load_snapshot, ModuleSystem};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Stylesheet linked by every page
const STYLESHEET: &str = include_str!("../../assets/style.css");

/// Run the CLI application
pub fn run() -> ExitCode {
    let args = Args::parse_args();

    match execute(args) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(quiet: bool, verbose: bool) {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };

    let filter = EnvFilter::try_from_env("LIVEDOC_LOG").unwrap_or_else(|_| EnvFilter::new(level));
    // A subscriber may already be installed when embedded
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Explicit config file, else `livedoc.toml`, else `[tool.livedoc]` of
/// `pyproject.toml`, else defaults
fn load_config(explicit: Option<&Path>) -> Result<Config> {
    if let Some(path) = explicit {
        if !path.exists() {
            return Err(Error::PathNotFound(path.to_path_buf()));
        }
        return Config::load(path);
    }

    let default_path = Path::new("livedoc.toml");
    if default_path.exists() {
        return Config::load(default_path);
    }
    Ok(Config::load_pyproject(Path::new("."))?.unwrap_or_default())
}

/// Create the output directory and its static assets
fn prepare_output(config: &Config) -> Result<PathBuf> {
    let directory = config.output.directory.clone();
    std::fs::create_dir_all(&directory)?;
    if config.output.copy_assets {
        let stylesheet = directory.join("style.css");
        std::fs::write(&stylesheet, STYLESHEET)?;
        debug!(path = %stylesheet.display(), "stylesheet copied");
    }
    Ok(directory)
}

fn execute(args: Args) -> Result<()> {
    match args.command {
        Command::Document {
            names,
            snapshot,
            output,
            config,
            markup,
            cap,
            document_internals,
            overwrite,
            transitive,
            force_reload,
            verbose,
            quiet,
        } => {
            init_tracing(quiet, verbose);

            let mut cfg = load_config(config.as_deref())?;
            // CLI takes precedence
            cfg.merge_cli(output, markup, cap, document_internals, overwrite, transitive);
            cfg.validate()?;

            if verbose {
                println!("Snapshot: {}", snapshot.display());
                println!("Output: {}", cfg.output.directory.display());
                println!("Markup: {:?}", cfg.render.markup);
                println!("Cap: {}", cfg.discovery.cap);
                println!("Transitive: {}", cfg.discovery.transitive);
            }

            let mut rt = load_snapshot(&snapshot)?;
            let directory = prepare_output(&cfg)?;
            let templates = TemplateEngine::new()?;
            let mut store = DirectoryStore::new(&directory);

            let report = Documenter::new(&mut rt, &mut store, &cfg, &templates)
                .with_force_reload(force_reload)
                .with_progress(verbose)
                .run(&names);

            if !quiet {
                for (name, reason) in &report.failed {
                    eprintln!("  {}: {}", name, reason);
                }
                println!("{}", report.summary());
                println!("Documentation written to: {}", directory.display());
            }

            if report.written.is_empty() && !report.failed.is_empty() {
                return Err(Error::Other("nothing was documented".to_string()));
            }
            Ok(())
        }

        Command::List { snapshot, prefix } => {
            init_tracing(false, false);
            let rt = load_snapshot(&snapshot)?;
            for name in rt.iter_modules(prefix.as_deref().unwrap_or("")) {
                println!("{}", name);
            }
            Ok(())
        }

        Command::Version => {
            println!("livedoc {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_explicit_config() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "[discovery]\ncap = 7\n").unwrap();
        let config = load_config(Some(path.as_path())).unwrap();
        assert_eq!(config.discovery.cap, 7);
    }

    #[test]
    fn test_missing_explicit_config_is_an_error() {
        let err = load_config(Some(Path::new("/nonexistent/livedoc.toml"))).unwrap_err();
        assert!(matches!(err, Error::PathNotFound(_)));
    }

    #[test]
    fn test_prepare_output_copies_stylesheet() {
        let dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.output.directory = dir.path().join("docs");
        let directory = prepare_output(&config).unwrap();
        let css = std::fs::read_to_string(directory.join("style.css")).unwrap();
        assert!(css.contains(".heading-module"));

        config.output.directory = dir.path().join("bare");
        config.output.copy_assets = false;
        let directory = prepare_output(&config).unwrap();
        assert!(directory.exists());
        assert!(!directory.join("style.css").exists());
    }
}
