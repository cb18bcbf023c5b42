use anyhow::Result;
use clap::{Parser, ValueEnum};
use log::{debug, info};
use std::path::PathBuf;

/// WADL generator - Convert Sphinx HTTP-domain doctrees into WADL API descriptions
#[derive(Parser, Debug)]
#[command(name = "wadl-from-rst")]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// A doctree dump, or a directory scanned for dumps (.json, .yaml, .yml)
    #[arg(value_name = "INPUT")]
    pub input_path: PathBuf,

    /// Directory receiving one output file per API document
    #[arg(short = 'o', long = "output", value_name = "DIR", default_value = ".")]
    pub output_dir: PathBuf,

    /// Output format (wadl, or a json/yaml dump of the model)
    #[arg(short = 'f', long = "format", value_enum, default_value = "wadl")]
    pub output_format: OutputFormat,

    /// YAML file mapping "<VERB> <path>" to operation ids
    #[arg(long = "ids", value_name = "FILE")]
    pub id_overrides: Option<PathBuf>,

    /// Value of the `base` attribute on the resources element
    #[arg(long = "base-url", value_name = "URL", default_value = crate::wadl::DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Reject parameter types other than int, list, unicode and Enum(...)
    #[arg(long = "strict-types")]
    pub strict_types: bool,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// WADL XML
    Wadl,
    /// JSON dump of the model
    Json,
    /// YAML dump of the model
    Yaml,
}

/// Parse command line arguments
pub fn parse_args() -> Result<CliArgs> {
    let args = CliArgs::parse();
    parse_args_from_parsed(args)
}

/// Validate and log already-parsed arguments
pub fn parse_args_from_parsed(args: CliArgs) -> Result<CliArgs> {
    debug!("Parsed arguments: {:?}", args);

    if !args.input_path.exists() {
        anyhow::bail!("Input path does not exist: {}", args.input_path.display());
    }
    if let Some(ref ids) = args.id_overrides {
        if !ids.is_file() {
            anyhow::bail!("Identifier override file does not exist: {}", ids.display());
        }
    }

    info!("Input: {}", args.input_path.display());
    info!("Output directory: {}", args.output_dir.display());
    info!("Output format: {:?}", args.output_format);
    if let Some(ref ids) = args.id_overrides {
        info!("Identifier overrides: {}", ids.display());
    }

    Ok(args)
}

/// Logger at `Debug` when verbose, else `Info`.
///
/// Filters read from `env` (normally `RUST_LOG`) are applied last, so they
/// override the level picked here.
pub fn logger_builder(verbose: bool, env: env_logger::Env<'_>) -> env_logger::Builder {
    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    let mut builder = env_logger::Builder::new();
    builder.filter_level(level).parse_env(env);
    builder
}

/// Run the main workflow
pub fn run(args: CliArgs) -> Result<()> {
    use crate::builder::{ConversionOptions, TypePolicy, WadlBuilder};
    use crate::identifier::OverrideTable;
    use crate::parser::{DoctreeParser, ParsedDoctree};
    use crate::scanner::DoctreeScanner;

    // Step 1: Find the doctrees
    let files = if args.input_path.is_dir() {
        info!("Scanning input directory...");
        let scan_result = DoctreeScanner::new(args.input_path.clone()).scan()?;
        for warning in &scan_result.warnings {
            log::warn!("{}", warning);
        }
        scan_result.doctree_files
    } else {
        vec![args.input_path.clone()]
    };
    info!("Found {} doctree files", files.len());

    if files.is_empty() {
        anyhow::bail!("No doctree files found in {}", args.input_path.display());
    }

    // Step 2: Load them; a dump that does not load counts as a failed document
    let mut failed = 0;
    let parsed: Vec<ParsedDoctree> = DoctreeParser::parse_files(&files)
        .into_iter()
        .filter_map(|r| match r {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                log::error!("Failed to load doctree: {:#}", e);
                failed += 1;
                None
            }
        })
        .collect();
    info!("Successfully loaded {} doctrees", parsed.len());

    // Step 3: Configure the conversion
    let overrides = match args.id_overrides {
        Some(ref path) => OverrideTable::load(path)?,
        None => OverrideTable::new(),
    };
    let options = ConversionOptions {
        base_url: args.base_url.clone(),
        type_policy: if args.strict_types {
            TypePolicy::Strict
        } else {
            TypePolicy::Lenient
        },
        ..ConversionOptions::default()
    }
    .with_resolver(overrides);
    let builder = WadlBuilder::new(args.output_dir.clone(), options).with_format(args.output_format);

    // Step 4: Convert each document on its own; one failure does not stop the rest
    let mut converted = 0;
    let mut skipped = 0;
    for doc in &parsed {
        match builder.write_doc(&doc.docname, &doc.doctree) {
            Ok(Some(_)) => converted += 1,
            Ok(None) => skipped += 1,
            Err(e) => {
                log::error!("Failed to convert {}: {:#}", doc.path.display(), e);
                failed += 1;
            }
        }
    }

    info!("Summary:");
    info!("  - Doctrees found: {}", files.len());
    info!("  - Converted: {}", converted);
    info!("  - Skipped (no API marker): {}", skipped);
    info!("  - Failed: {}", failed);

    if failed > 0 {
        anyhow::bail!("{} document(s) failed to convert", failed);
    }
    Ok(())
}
