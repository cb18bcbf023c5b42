//! WADL generator - Command-line tool converting Sphinx HTTP-domain doctrees to WADL.
//!
//! # Usage
//!
//! ```bash
//! wadl-from-rst [OPTIONS] <INPUT>
//! ```
//!
//! # Examples
//!
//! Convert every API document in a directory of doctree dumps:
//! ```bash
//! wadl-from-rst ./doctrees -o ./wadl
//! ```
//!
//! Supply ids for paths the generator cannot name:
//! ```bash
//! wadl-from-rst ./doctrees -o ./wadl --ids ids.yaml
//! ```
//!
//! Dump the extracted model instead of WADL, with verbose logging:
//! ```bash
//! wadl-from-rst ./doctrees/v2.json -f yaml -v
//! ```

use anyhow::Result;
use clap::Parser;
use log::info;
use wadl_from_rst::cli;

fn main() -> Result<()> {
    let args = cli::CliArgs::parse();

    cli::logger_builder(args.verbose, env_logger::Env::default()).init();

    info!("WADL generator starting...");

    let args = cli::parse_args_from_parsed(args)?;
    cli::run(args)?;

    info!("WADL generation completed successfully");

    Ok(())
}
