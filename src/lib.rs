//! WADL generator - API descriptions from Sphinx HTTP-domain documentation.
//!
//! This library converts a parsed reStructuredText document tree written for
//! Sphinx's HTTP domain into a WADL document: a nested `resources` hierarchy,
//! one `method` per documented endpoint, request parameters, and canonical JSON
//! request/response examples.
//!
//! A document is only converted when it carries a `docbookrestapi` comment
//! before its first section; other documents are skipped without error.
//!
//! # Architecture
//!
//! 1. [`scanner`] - Finds doctree dumps in an input directory
//! 2. [`parser`] - Loads a dump into a [`doctree::Node`] tree
//! 3. [`walker`] - Walks the tree, emitting visit/depart events
//! 4. [`visitor`] - State machine turning events into methods and parameters
//! 5. [`identifier`] - Derives operation ids (`listFoos`, `showFooBar`) from paths
//! 6. [`resources`] - Folds flat paths into the resource hierarchy
//! 7. [`wadl`] - The output model
//! 8. [`serializer`] - Renders and cleans up the XML, writes files
//! 9. [`builder`] - Drives one document from tree to output file
//!
//! # Example Usage
//!
//! ```no_run
//! use wadl_from_rst::{
//!     builder::{ConversionOptions, WadlBuilder},
//!     parser::DoctreeParser,
//! };
//! use std::path::{Path, PathBuf};
//!
//! let parsed = DoctreeParser::parse_file(Path::new("doctrees/v2.json")).unwrap();
//! let builder = WadlBuilder::new(PathBuf::from("out"), ConversionOptions::default());
//! match builder.write_doc(&parsed.docname, &parsed.doctree).unwrap() {
//!     Some(path) => println!("wrote {}", path.display()),
//!     None => println!("{} is not an API document", parsed.docname),
//! }
//! ```
//!
//! # Command-Line Interface
//!
//! For command-line usage, see the [`cli`] module.

pub mod builder;
pub mod cli;
pub mod doctree;
pub mod error;
pub mod identifier;
pub mod parser;
pub mod resources;
pub mod scanner;
pub mod serializer;
pub mod visitor;
pub mod wadl;
pub mod walker;
