use anyhow::Result;
use log::warn;
use std::path::PathBuf;
use walkdir::WalkDir;

/// Extensions of doctree dump files
const DOCTREE_EXTENSIONS: [&str; 3] = ["json", "yaml", "yml"];

/// Scanner for directories of doctree dumps.
///
/// The `DoctreeScanner` recursively walks an input directory to find every
/// serialized doctree. It skips `target` and hidden directories (those
/// starting with `.`).
///
/// # Example
///
/// ```no_run
/// use wadl_from_rst::scanner::DoctreeScanner;
/// use std::path::PathBuf;
///
/// let scanner = DoctreeScanner::new(PathBuf::from("./doctrees"));
/// let result = scanner.scan().unwrap();
/// println!("Found {} doctrees", result.doctree_files.len());
/// ```
pub struct DoctreeScanner {
    root_path: PathBuf,
}

/// Result of directory scanning operation.
pub struct ScanResult {
    /// Paths of all discovered doctree dumps, in walk order
    pub doctree_files: Vec<PathBuf>,
    /// Warning messages for any entries that could not be read
    pub warnings: Vec<String>,
}

impl DoctreeScanner {
    pub fn new(root_path: PathBuf) -> Self {
        Self { root_path }
    }

    /// Scans the directory tree and collects all doctree files.
    ///
    /// Inaccessible entries are logged and recorded as warnings; scanning
    /// continues past them.
    pub fn scan(&self) -> Result<ScanResult> {
        let mut doctree_files = Vec::new();
        let mut warnings = Vec::new();

        for entry in WalkDir::new(&self.root_path)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| {
                if e.path() == self.root_path {
                    return true;
                }

                let file_name = e.file_name().to_string_lossy();
                !file_name.starts_with('.') && file_name != "target"
            })
        {
            match entry {
                Ok(entry) => {
                    let path = entry.path();
                    let is_doctree = path
                        .extension()
                        .and_then(|s| s.to_str())
                        .map(|ext| DOCTREE_EXTENSIONS.contains(&ext))
                        .unwrap_or(false);

                    if path.is_file() && is_doctree {
                        doctree_files.push(path.to_path_buf());
                    }
                }
                Err(e) => {
                    let warning = format!("Failed to access path: {}", e);
                    warn!("{}", warning);
                    warnings.push(warning);
                }
            }
        }

        Ok(ScanResult {
            doctree_files,
            warnings,
        })
    }
}
