//! CLI argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Generate HTML documentation from a live object graph
#[derive(Parser, Debug)]
#[command(name = "livedoc")]
#[command(about = "Generate HTML documentation from a live object graph")]
#[command(version)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

impl Args {
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Write a page for each name, then for the modules they mention
    Document {
        /// Dotted names to document (modules, classes, functions, ...)
        #[arg(required = true)]
        names: Vec<String>,

        /// Object graph snapshot file, or a directory of them
        #[arg(short, long)]
        snapshot: PathBuf,

        /// Output directory
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Config file path
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Docstring markup (plain, rst, markdown)
        #[arg(long)]
        markup: Option<String>,

        /// Maximum number of discovered entities to document
        #[arg(long)]
        cap: Option<usize>,

        /// Show private members too
        #[arg(long)]
        document_internals: bool,

        /// Rewrite pages of discovered entities that already exist
        #[arg(long)]
        overwrite: bool,

        /// Keep following entities discovered while draining
        #[arg(long)]
        transitive: bool,

        /// Re-import modules that are already loaded
        #[arg(long)]
        force_reload: bool,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,

        /// Only report errors
        #[arg(short, long, conflicts_with = "verbose")]
        quiet: bool,
    },

    /// List the importable modules of a snapshot
    List {
        /// Object graph snapshot file, or a directory of them
        #[arg(short, long)]
        snapshot: PathBuf,

        /// Only modules below this package
        prefix: Option<String>,
    },

    /// Show version information
    Version,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_defaults() {
        let args = Args::try_parse_from(["livedoc", "document", "pkg", "--snapshot", "graph.json"]).unwrap();
        match args.command {
            Command::Document {
                names,
                snapshot,
                output,
                cap,
                markup,
                overwrite,
                transitive,
                verbose,
                quiet,
                ..
            } => {
                assert_eq!(names, vec!["pkg".to_string()]);
                assert_eq!(snapshot, PathBuf::from("graph.json"));
                assert!(output.is_none());
                assert!(cap.is_none());
                assert!(markup.is_none());
                assert!(!overwrite && !transitive && !verbose && !quiet);
            }
            _ => panic!("Expected Document command"),
        }
    }

    #[test]
    fn test_document_with_options() {
        let args = Args::try_parse_from([
            "livedoc", "document", "pkg.core", "pkg.util",
            "--snapshot", "snapshots/",
            "--output", "/tmp/docs",
            "--config", "custom.toml",
            "--markup", "rst",
            "--cap", "10",
            "--document-internals",
            "--overwrite",
            "--transitive",
            "--force-reload",
            "--verbose",
        ]).unwrap();

        match args.command {
            Command::Document {
                names, snapshot, output, config, markup, cap,
                document_internals, overwrite, transitive, force_reload, verbose, quiet,
            } => {
                assert_eq!(names, vec!["pkg.core".to_string(), "pkg.util".to_string()]);
                assert_eq!(snapshot, PathBuf::from("snapshots/"));
                assert_eq!(output, Some(PathBuf::from("/tmp/docs")));
                assert_eq!(config, Some(PathBuf::from("custom.toml")));
                assert_eq!(markup.as_deref(), Some("rst"));
                assert_eq!(cap, Some(10));
                assert!(document_internals && overwrite && transitive && force_reload && verbose);
                assert!(!quiet);
            }
            _ => panic!("Expected Document command"),
        }
    }

    #[test]
    fn test_document_requires_names_and_snapshot() {
        assert!(Args::try_parse_from(["livedoc", "document", "--snapshot", "g.json"]).is_err());
        assert!(Args::try_parse_from(["livedoc", "document", "pkg"]).is_err());
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        let result = Args::try_parse_from([
            "livedoc", "document", "pkg", "--snapshot", "g.json", "--quiet", "--verbose",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_list() {
        let args = Args::try_parse_from(["livedoc", "list", "--snapshot", "g.json", "pkg"]).unwrap();
        match args.command {
            Command::List { snapshot, prefix } => {
                assert_eq!(snapshot, PathBuf::from("g.json"));
                assert_eq!(prefix.as_deref(), Some("pkg"));
            }
            _ => panic!("Expected List command"),
        }
    }

    #[test]
    fn test_version_command() {
        let args = Args::try_parse_from(["livedoc", "version"]).unwrap();
        assert!(matches!(args.command, Command::Version));
    }
}
