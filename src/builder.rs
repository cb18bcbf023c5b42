//! Per-document driver.
//!
//! [`WadlBuilder`] walks one doctree with a fresh [`WadlVisitor`], decides
//! whether the document is in scope, and writes the result next to its peers
//! in the output directory.

use crate::cli::OutputFormat;
use crate::doctree::Node;
use crate::error::Result;
use crate::serializer::{serialize_json, serialize_wadl, serialize_yaml, write_to_file};
use crate::visitor::WadlVisitor;
use crate::wadl::Application;
use crate::walker::walkabout;
use log::{debug, info};
use std::path::{Path, PathBuf};

pub use crate::visitor::{ConversionOptions, TypePolicy};

/// Suffix appended to the document base name for WADL output
pub const OUT_SUFFIX: &str = ".wadl";

/// Converts doctrees and writes one output file per in-scope document.
pub struct WadlBuilder {
    outdir: PathBuf,
    options: ConversionOptions,
    format: OutputFormat,
}

impl WadlBuilder {
    pub fn new(outdir: PathBuf, options: ConversionOptions) -> Self {
        debug!("Initializing WadlBuilder writing to {}", outdir.display());
        Self {
            outdir,
            options,
            format: OutputFormat::Wadl,
        }
    }

    /// Writes model dumps instead of WADL
    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    pub fn outdir(&self) -> &Path {
        &self.outdir
    }

    /// Walks `doctree` and returns its model, or `None` when the document does
    /// not carry the API marker.
    pub fn convert(&self, doctree: &Node) -> Result<Option<Application>> {
        let mut visitor = WadlVisitor::new(&self.options);
        walkabout(doctree, &mut visitor)?;
        Ok(visitor.into_application())
    }

    /// Output file for `docname`: its base name plus the format's suffix
    pub fn output_path(&self, docname: &str) -> PathBuf {
        let basename = Path::new(docname)
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| docname.to_string());
        let suffix = match self.format {
            OutputFormat::Wadl => OUT_SUFFIX,
            OutputFormat::Json => ".wadl.json",
            OutputFormat::Yaml => ".wadl.yaml",
        };
        self.outdir.join(format!("{}{}", basename, suffix))
    }

    /// Renders a finished model in the configured format
    pub fn render(&self, app: &Application) -> anyhow::Result<String> {
        match self.format {
            OutputFormat::Wadl => serialize_wadl(app),
            OutputFormat::Json => serialize_json(app),
            OutputFormat::Yaml => serialize_yaml(app),
        }
    }

    /// Converts and writes one document.
    ///
    /// Returns the written path, or `None` when the document was out of scope.
    /// Nothing is written when the conversion fails.
    pub fn write_doc(&self, docname: &str, doctree: &Node) -> anyhow::Result<Option<PathBuf>> {
        let app = match self.convert(doctree)? {
            Some(app) => app,
            None => {
                debug!("Skipping '{}': not an API document", docname);
                return Ok(None);
            }
        };

        let content = self.render(&app)?;
        let path = self.output_path(docname);
        write_to_file(&content, &path)?;
        info!(
            "Wrote {} methods from '{}' to {}",
            app.methods.len(),
            docname,
            path.display()
        );
        Ok(Some(path))
    }
}
