//! Command-line interface for convcheck.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::{self, Config, CONFIG_FILE_NAMES};
use crate::conventions::Analyzer;
use crate::model::{Compilation, CompilationBuilder};
use crate::report;
use crate::summary::{self, FailOn};

/// Exit codes.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILED: i32 = 1;
pub const EXIT_ERROR: i32 = 2;

/// Model file extensions picked up from a directory.
const MODEL_EXTENSIONS: &[&str] = &["yaml", "yml", "json"];

/// API convention analyzer.
///
/// Checks every return statement of every API action against the responses
/// the action documents through response attributes, its controller and
/// its API conventions.
#[derive(Parser)]
#[command(name = "convcheck")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Log analysis progress to stderr (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check a compilation model against its documented responses
    #[command(visible_alias = "lint")]
    Check(CheckArgs),
    /// Create a new convcheck config from a template
    Init(InitArgs),
}

/// Arguments for the check command.
#[derive(Parser)]
pub struct CheckArgs {
    /// Model file or directory of model files
    pub path: PathBuf,

    /// Path to config YAML file (default: auto-discover)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output format: pretty, json, or sarif
    #[arg(short, long, default_value = "pretty")]
    pub format: String,

    /// Lowest severity that makes the run fail
    #[arg(long, value_enum, default_value_t = FailOn::Warning)]
    pub fail_on: FailOn,

    /// Analyze methods one at a time instead of in parallel
    #[arg(long)]
    pub sequential: bool,
}

/// Arguments for the init command.
#[derive(Parser)]
pub struct InitArgs {
    /// Output file path
    #[arg(short, long, default_value = "convcheck.yaml")]
    pub output: PathBuf,

    /// Template to use
    #[arg(short, long, default_value = "default")]
    pub template: String,

    /// List available templates
    #[arg(short, long)]
    pub list: bool,
}

/// Available config templates.
struct Template {
    name: &'static str,
    description: &'static str,
    content: &'static str,
}

static TEMPLATES: &[Template] = &[
    Template {
        name: "default",
        description: "Framework defaults - API controllers only, 200 as implicit success",
        content: include_str!("templates/default.yaml"),
    },
    Template {
        name: "strict",
        description: "Every finding is an error, all public controller methods analyzed",
        content: include_str!("templates/strict.yaml"),
    },
    Template {
        name: "lenient",
        description: "Default conventions applied everywhere, any 2xx counts as success",
        content: include_str!("templates/lenient.yaml"),
    },
];

/// Find a config next to the model, then in the current directory.
fn discover_config(root: &Path) -> Option<PathBuf> {
    let model_dir = if root.is_dir() { Some(root) } else { root.parent() };
    model_dir
        .and_then(Config::discover)
        .or_else(|| Config::discover("."))
}

/// Collect model files under `root`.
pub fn collect_model_files(root: &Path, config: &Config) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_entry(|e| {
            let name = e.file_name().to_string_lossy();
            // Skip hidden directories
            !(e.depth() > 0 && e.file_type().is_dir() && name.starts_with('.'))
        })
    {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
        if !MODEL_EXTENSIONS.contains(&ext) || CONFIG_FILE_NAMES.contains(&name) {
            continue;
        }
        if config.is_path_excluded(path) {
            tracing::debug!(path = %path.display(), "excluded model file");
            continue;
        }
        files.push(path.to_path_buf());
    }

    files.sort();
    Ok(files)
}

/// Model files to load for `path`: the file itself, or every model file under
/// the directory except the config file in use.
fn model_files(path: &Path, config: &Config, config_path: Option<&Path>) -> anyhow::Result<Vec<PathBuf>> {
    if !path.is_dir() {
        return Ok(vec![path.to_path_buf()]);
    }
    let mut files = collect_model_files(path, config)?;
    if let Some(config_path) = config_path.and_then(|p| p.canonicalize().ok()) {
        files.retain(|file| file.canonicalize().map_or(true, |file| file != config_path));
    }
    Ok(files)
}

/// Load every model file into one compilation.
pub fn load_compilation(files: &[PathBuf]) -> anyhow::Result<Compilation> {
    let mut builder = CompilationBuilder::new();
    for file in files {
        builder.add_file(file)?;
    }
    tracing::info!(files = builder.file_count(), "loading compilation model");
    Ok(builder.build()?)
}

/// Run the check command.
pub fn run_check(args: &CheckArgs) -> anyhow::Result<i32> {
    if args.format != "pretty" && args.format != "json" && args.format != "sarif" {
        eprintln!(
            "Error: invalid format {:?}, must be 'pretty', 'json', or 'sarif'",
            args.format
        );
        return Ok(EXIT_ERROR);
    }

    let abs_path = match args.path.canonicalize() {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error: cannot access path {:?}: {}", args.path, e);
            return Ok(EXIT_ERROR);
        }
    };

    let config_path = args.config.clone().or_else(|| discover_config(&abs_path));
    let config = match &config_path {
        Some(path) => match Config::parse_file(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error parsing config: {}", e);
                return Ok(EXIT_ERROR);
            }
        },
        None => Config::default(),
    };

    if let Err(e) = config::validate(&config) {
        eprintln!("Error: invalid config: {}", e);
        return Ok(EXIT_ERROR);
    }

    let files = model_files(&abs_path, &config, config_path.as_deref())?;

    if files.is_empty() {
        eprintln!("Warning: no model files to check");
        return Ok(EXIT_SUCCESS);
    }

    let compilation = match load_compilation(&files) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading model: {}", e);
            return Ok(EXIT_ERROR);
        }
    };

    let options = match config.analyzer_options(&compilation) {
        Ok(o) => o,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(EXIT_ERROR);
        }
    };

    let result = Analyzer::new(&compilation)
        .options(options)
        .parallel(!args.sequential)
        .run();

    if !result.missing_symbols.is_empty() {
        eprintln!("Warning: framework types missing from the model, nothing was analyzed");
    }

    let findings = report::findings(&compilation, &result.diagnostics, &config);
    let summary = summary::summarize(&result, &findings, args.fail_on);

    let config_path_str = config_path.map(|p| p.to_string_lossy().to_string());
    let path_str = args.path.to_string_lossy().to_string();

    match args.format.as_str() {
        "json" => report::write_json(&path_str, config_path_str.as_deref(), &findings, &summary)?,
        "sarif" => {
            let base = if abs_path.is_dir() {
                abs_path.as_path()
            } else {
                abs_path.parent().unwrap_or(Path::new(""))
            };
            report::write_sarif(base, &findings, &config)?
        }
        _ => report::write_pretty(&path_str, config_path_str.as_deref(), &findings, &summary),
    }

    if summary.passed {
        Ok(EXIT_SUCCESS)
    } else {
        Ok(EXIT_FAILED)
    }
}

/// Run the init command.
pub fn run_init(args: &InitArgs) -> anyhow::Result<i32> {
    if args.list {
        return list_templates();
    }

    let template = match TEMPLATES.iter().find(|t| t.name == args.template) {
        Some(t) => t,
        None => {
            eprintln!("Error: unknown template {:?}", args.template);
            eprintln!("Run 'convcheck init --list' to see available templates");
            return Ok(EXIT_ERROR);
        }
    };

    if args.output.exists() {
        eprintln!("Error: file already exists: {}", args.output.display());
        eprintln!("Remove it or use --output to specify a different path");
        return Ok(EXIT_ERROR);
    }

    if let Some(parent) = args.output.parent() {
        if !parent.as_os_str().is_empty() && parent != Path::new(".") {
            if let Err(e) = std::fs::create_dir_all(parent) {
                eprintln!("Error: failed to create directory: {}", e);
                return Ok(EXIT_ERROR);
            }
        }
    }

    if let Err(e) = std::fs::write(&args.output, template.content) {
        eprintln!("Error: failed to write config: {}", e);
        return Ok(EXIT_ERROR);
    }

    println!("Created {} from template '{}'", args.output.display(), template.name);
    println!();
    println!("Next steps:");
    println!("  1. Edit {} to match your framework", args.output.display());
    println!("  2. Run: convcheck check <model> --config {}", args.output.display());

    Ok(EXIT_SUCCESS)
}

fn list_templates() -> anyhow::Result<i32> {
    println!("Available templates:");
    println!();

    for template in TEMPLATES {
        let name = if template.name == "default" {
            format!("{} (default)", template.name)
        } else {
            template.name.to_string()
        };
        println!("  {:<20} {}", name, template.description);
    }

    println!();
    println!("Usage:");
    println!("  convcheck init --template <name>");

    Ok(EXIT_SUCCESS)
}
