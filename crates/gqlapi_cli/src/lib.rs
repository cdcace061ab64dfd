//! Command-line interface for gqlapi.
//!
//! # Usage
//!
//! ```bash
//! # Generate a client from a schema and operation documents
//! gqlapi generate --schema schema.graphql -o src/api.ts queries/
//!
//! # Use gqlapi.toml in the current directory
//! gqlapi generate
//!
//! # Emit free functions instead of the getAPI wrapper
//! gqlapi generate --no-wrapper --name-suffix Document
//!
//! # Check documents for syntax errors
//! gqlapi check queries/profile.graphql
//! ```

pub mod config;

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use config::{collect_documents, Config, ConfigError};
use gqlapi_codegen::{
    generate, generate_unformatted, DocumentFile, GenerationOptions, PluginOutput,
    TypeScriptFormatter,
};
use gqlapi_core::{Diagnostic, DiagnosticBag, Interner};
use gqlapi_syntax::parse;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Parser, Debug)]
#[command(name = "gqlapi")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a typed TypeScript client from GraphQL operations
    #[command(alias = "codegen")]
    Generate(GenerateArgs),

    /// Check GraphQL files for syntax errors
    Check {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Print version information
    Version,
}

#[derive(Args, Debug, Default)]
pub struct GenerateArgs {
    /// Configuration file (defaults to gqlapi.toml when present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Schema file path
    #[arg(short, long)]
    pub schema: Option<PathBuf>,

    /// Output file (stdout when omitted)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Suffix appended to document constant names
    #[arg(long)]
    pub name_suffix: Option<String>,

    /// Emit methods on a getAPI wrapper (the default)
    #[arg(long, overrides_with = "no_wrapper")]
    pub wrapper: bool,

    /// Emit free functions instead of a getAPI wrapper
    #[arg(long, overrides_with = "wrapper")]
    pub no_wrapper: bool,

    /// Skip formatting the generated program
    #[arg(long)]
    pub skip_format: bool,

    /// Operation documents or directories containing them
    pub documents: Vec<PathBuf>,
}

/// Inputs of a generation run after merging flags over configuration.
#[derive(Debug)]
pub struct GenerateSettings {
    pub schema: PathBuf,
    pub documents: Vec<PathBuf>,
    pub output: Option<PathBuf>,
    pub options: GenerationOptions,
    pub skip_format: bool,
}

impl GenerateSettings {
    /// Merges command-line flags over an optional configuration file.
    pub fn resolve(args: GenerateArgs, config: Option<Config>) -> Result<Self, ConfigError> {
        let config = config.unwrap_or_default();

        let schema = args
            .schema
            .or(config.schema)
            .ok_or(ConfigError::MissingSchema)?;

        let roots = if args.documents.is_empty() {
            config.documents
        } else {
            args.documents
        };
        let documents = collect_documents(&roots)?;
        if documents.is_empty() {
            return Err(ConfigError::NoDocuments);
        }

        let mut options = config.options;
        if let Some(suffix) = args.name_suffix {
            options.name_suffix = suffix;
        }
        if args.wrapper {
            options.with_wrapper = true;
        } else if args.no_wrapper {
            options.with_wrapper = false;
        }

        Ok(Self {
            schema,
            documents,
            output: args.output.or(config.output),
            options,
            skip_format: args.skip_format,
        })
    }
}

pub async fn run(cli: Cli) -> Result<i32, Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Generate(args) => {
            let cwd = std::env::current_dir()?;
            let config = Config::discover(args.config.as_deref(), &cwd)?;
            let settings = GenerateSettings::resolve(args, config)?;
            generate_client(&settings, cli.quiet).await
        }
        Commands::Check { files } => check_files(&files, cli.verbose),
        Commands::Version => {
            println!("gqlapi {}", env!("CARGO_PKG_VERSION"));
            Ok(0)
        }
    }
}

/// A file read from disk.
struct SourceFile {
    name: String,
    text: String,
}

impl SourceFile {
    fn read(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self {
            name: path.display().to_string(),
            text,
        })
    }
}

/// Prints diagnostics with source snippets. Returns the number of errors.
fn report(file: &SourceFile, diagnostics: &DiagnosticBag) -> usize {
    for diagnostic in diagnostics.iter() {
        let report =
            miette::Report::new(diagnostic.clone().with_source(&file.name, file.text.clone()));
        eprintln!("{report:?}");
    }
    diagnostics.error_count()
}

/// `path:line:column` of the first error, or the bare path.
fn error_location(file: &SourceFile, diagnostics: &DiagnosticBag) -> String {
    match diagnostics.errors().find_map(Diagnostic::primary_span) {
        Some(span) => {
            let (line, column) = span.line_col(&file.text);
            format!("{}:{line}:{column}", file.name)
        }
        None => file.name.clone(),
    }
}

async fn generate_client(
    settings: &GenerateSettings,
    quiet: bool,
) -> Result<i32, Box<dyn std::error::Error>> {
    let schema_file = SourceFile::read(&settings.schema)?;
    let document_files = settings
        .documents
        .iter()
        .map(|path| SourceFile::read(path))
        .collect::<Result<Vec<_>, _>>()?;

    let interner = Interner::new();
    let schema = parse(&schema_file.text, &interner);
    let mut errors = report(&schema_file, &schema.diagnostics);

    let parsed: Vec<_> = document_files
        .iter()
        .map(|file| {
            let result = parse(&file.text, &interner);
            errors += report(file, &result.diagnostics);
            result
        })
        .collect();

    if errors > 0 {
        eprintln!(
            "{} {errors} parse error(s) in input documents",
            "Error:".red().bold()
        );
        return Ok(1);
    }

    let documents: Vec<_> = document_files
        .iter()
        .zip(&parsed)
        .map(|(file, result)| DocumentFile::new(&file.name, &result.document))
        .collect();
    debug!(documents = documents.len(), "parsed operation documents");

    let output = if settings.skip_format {
        generate_unformatted(&schema.document, &documents, &settings.options, &interner)
    } else {
        generate(
            &schema.document,
            &documents,
            &settings.options,
            &interner,
            &TypeScriptFormatter::new(),
        )
        .await?
    };

    write_output(&output, settings.output.as_deref(), quiet)?;
    Ok(0)
}

fn write_output(
    output: &PluginOutput,
    path: Option<&Path>,
    quiet: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let rendered = output.render();
    match path {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, rendered)?;
            info!(path = %path.display(), "wrote generated client");
            if !quiet {
                println!("{} {}", "Generated".green(), path.display());
            }
        }
        None => print!("{rendered}"),
    }
    Ok(())
}

fn check_files(files: &[PathBuf], verbose: bool) -> Result<i32, Box<dyn std::error::Error>> {
    let mut has_errors = false;

    for path in files {
        if verbose {
            println!("{} {}", "Checking".blue(), path.display());
        }

        let file = SourceFile::read(path)?;
        let interner = Interner::new();
        let result = parse(&file.text, &interner);

        let errors = report(&file, &result.diagnostics);
        if errors > 0 {
            has_errors = true;
            eprintln!(
                "{} {} ({errors} error(s))",
                "Error".red().bold(),
                error_location(&file, &result.diagnostics)
            );
        } else if verbose {
            println!("{} {}", "OK".green(), path.display());
        }
    }

    if has_errors {
        Ok(1)
    } else {
        if !files.is_empty() {
            println!(
                "{} {} file(s) checked",
                "Success:".green().bold(),
                files.len()
            );
        }
        Ok(0)
    }
}
