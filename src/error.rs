use std::fmt;
use std::path::PathBuf;

use crate::wadl::Side;

/// Result type alias for the conversion core
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the conversion core.
///
/// Every variant aborts the conversion of the document in progress; nothing is
/// written for a document that produced one of these.
#[derive(Debug)]
pub enum Error {
    IoError(std::io::Error),
    ParseError { file: PathBuf, message: String },
    /// No rule could derive an operation id for this path and verb, and no
    /// override was supplied.
    IdentifierResolution { path: String, verb: String },
    /// Two methods in one document ended up with the same id.
    DuplicateIdentifier { id: String, path: String, verb: String },
    /// The text gathered for a JSON example is not valid JSON.
    MalformedExample {
        method_id: String,
        side: Side,
        source: serde_json::Error,
    },
    /// A parameter type matched no known prefix while the strict type policy
    /// was in effect.
    UnrecognizedParameterType { token: String, method_id: String },
    /// A parameter bullet did not look like `name (type) -- description`.
    MalformedParameter { text: String, method_id: String },
    SerializationError(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::IoError(e) => write!(f, "IO error: {}", e),
            Error::ParseError { file, message } => {
                write!(f, "parse error in {}: {}", file.display(), message)
            }
            Error::IdentifierResolution { path, verb } => write!(
                f,
                "cannot derive an operation id for {} {}; supply an override",
                verb.to_uppercase(),
                path
            ),
            Error::DuplicateIdentifier { id, path, verb } => write!(
                f,
                "operation id '{}' for {} {} is already used in this document",
                id,
                verb.to_uppercase(),
                path
            ),
            Error::MalformedExample {
                method_id,
                side,
                source,
            } => write!(
                f,
                "malformed {} JSON example in method '{}': {}",
                side, method_id, source
            ),
            Error::UnrecognizedParameterType { token, method_id } => write!(
                f,
                "unrecognized parameter type '{}' in method '{}'",
                token, method_id
            ),
            Error::MalformedParameter { text, method_id } => write!(
                f,
                "cannot parse parameter '{}' in method '{}': expected 'name (type) -- description'",
                text, method_id
            ),
            Error::SerializationError(msg) => write!(f, "serialization error: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::IoError(e) => Some(e),
            Error::MalformedExample { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::IoError(err)
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::SerializationError(format!("YAML error: {}", err))
    }
}
