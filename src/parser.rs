use crate::doctree::Node;
use anyhow::{Context, Result};
use log::{debug, warn};
use std::fs;
use std::path::{Path, PathBuf};

/// Loader for doctree dumps.
///
/// The documentation build serializes each parsed reStructuredText document as
/// a tree of [`Node`]s. `.yaml`/`.yml` files are read as YAML, everything else
/// as JSON.
///
/// # Example
///
/// ```no_run
/// use wadl_from_rst::parser::DoctreeParser;
/// use std::path::Path;
///
/// let parsed = DoctreeParser::parse_file(Path::new("doctrees/v2.json")).unwrap();
/// println!("{} has {} top-level nodes", parsed.docname, parsed.doctree.children.len());
/// ```
pub struct DoctreeParser;

/// A successfully loaded doctree.
#[derive(Debug)]
pub struct ParsedDoctree {
    /// Path to the dump file
    pub path: PathBuf,
    /// Document name, taken from the file stem
    pub docname: String,
    /// Root `document` node
    pub doctree: Node,
}

impl DoctreeParser {
    /// Loads a single doctree dump.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be read
    /// - The content is not a valid doctree in the format its extension implies
    pub fn parse_file(path: &Path) -> Result<ParsedDoctree> {
        debug!("Loading doctree: {}", path.display());

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read file: {}", path.display()))?;
        let doctree = Self::parse_str(&content, is_yaml(path))
            .with_context(|| format!("Failed to parse doctree in file: {}", path.display()))?;

        let docname = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();

        Ok(ParsedDoctree {
            path: path.to_path_buf(),
            docname,
            doctree,
        })
    }

    /// Parses doctree text already in memory
    pub fn parse_str(content: &str, yaml: bool) -> Result<Node> {
        let doctree: Node = if yaml {
            serde_yaml::from_str(content)?
        } else {
            serde_json::from_str(content)?
        };
        Ok(doctree)
    }

    /// Loads several dumps, continuing past failures.
    ///
    /// Files that fail to load are logged as warnings; the returned vector has
    /// one entry per input path.
    pub fn parse_files(paths: &[PathBuf]) -> Vec<Result<ParsedDoctree>> {
        debug!("Loading {} doctrees", paths.len());

        let results: Vec<Result<ParsedDoctree>> = paths
            .iter()
            .map(|path| {
                Self::parse_file(path).map_err(|e| {
                    warn!("Failed to load {}: {:#}", path.display(), e);
                    e
                })
            })
            .collect();

        let success_count = results.iter().filter(|r| r.is_ok()).count();
        debug!(
            "Loading complete: {} succeeded, {} failed",
            success_count,
            results.len() - success_count
        );

        results
    }
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|s| s.to_str()),
        Some("yaml") | Some("yml")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const JSON_DOCTREE: &str = r##"{
        "tagname": "document",
        "children": [
            {"tagname": "comment", "children": [{"tagname": "#text", "text": "docbookrestapi"}]}
        ]
    }"##;

    const YAML_DOCTREE: &str = "
tagname: document
children:
  - tagname: comment
    text: docbookrestapi
";

    #[test]
    fn test_parse_json_file() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("v2.json");
        fs::write(&file_path, JSON_DOCTREE).unwrap();

        let parsed = DoctreeParser::parse_file(&file_path).unwrap();

        assert_eq!(parsed.docname, "v2");
        assert_eq!(parsed.path, file_path);
        assert_eq!(parsed.doctree.children[0].astext(), "docbookrestapi");
    }

    #[test]
    fn test_parse_yaml_file() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("v2.yml");
        fs::write(&file_path, YAML_DOCTREE).unwrap();

        let parsed = DoctreeParser::parse_file(&file_path).unwrap();

        assert_eq!(parsed.doctree.tagname, "document");
        assert_eq!(parsed.doctree.children[0].astext(), "docbookrestapi");
    }

    #[test]
    fn test_parse_invalid_file() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("broken.json");
        fs::write(&file_path, "{\"tagname\": ").unwrap();

        let result = DoctreeParser::parse_file(&file_path);

        assert!(result.is_err());
        assert!(format!("{:#}", result.unwrap_err()).contains("broken.json"));
    }

    #[test]
    fn test_parse_nonexistent_file() {
        assert!(DoctreeParser::parse_file(Path::new("/nonexistent/v2.json")).is_err());
    }

    #[test]
    fn test_parse_files_mixed_results() {
        let temp_dir = TempDir::new().unwrap();
        let good = temp_dir.path().join("good.json");
        let bad = temp_dir.path().join("bad.json");
        fs::write(&good, JSON_DOCTREE).unwrap();
        fs::write(&bad, "not json").unwrap();

        let results = DoctreeParser::parse_files(&[good, bad]);

        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());
        assert!(results[1].is_err());
    }
}
