//! Operation identifiers.
//!
//! Every WADL method needs a stable id. Ids are inferred from the REST path and
//! the HTTP verb (`GET /v2/foos/(foo_id)` becomes `showFoo`); when inference
//! fails, a caller-supplied [`IdentifierResolver`] has to provide one.

use crate::error::{Error, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Source of explicit operation ids, consulted before inference.
pub trait IdentifierResolver {
    /// Returns the id to use for `verb path`, or `None` to fall back to inference
    fn resolve(&self, path: &str, verb: &str) -> Option<String>;
}

impl<F> IdentifierResolver for F
where
    F: Fn(&str, &str) -> Option<String>,
{
    fn resolve(&self, path: &str, verb: &str) -> Option<String> {
        self(path, verb)
    }
}

/// Explicit ids keyed by `"<VERB> <path>"`, e.g. `"PATCH /v2/alarms/(alarm_id)"`.
///
/// Loaded from a YAML mapping:
///
/// ```yaml
/// PATCH /v2/alarms/(alarm_id): patchAlarm
/// GET /v2/capabilities: showCapabilities
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OverrideTable {
    entries: BTreeMap<String, String>,
}

impl OverrideTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a YAML mapping of `"<VERB> <path>"` to id
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let table: OverrideTable = serde_yaml::from_str(content)?;
        debug!("Loaded {} identifier overrides", table.len());
        Ok(table)
    }

    /// Reads a YAML override file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content).map_err(|e| Error::ParseError {
            file: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    pub fn insert(&mut self, verb: &str, path: &str, id: &str) {
        self.entries.insert(Self::key(verb, path), id.to_string());
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn key(verb: &str, path: &str) -> String {
        format!("{} {}", verb.to_uppercase(), path)
    }
}

impl IdentifierResolver for OverrideTable {
    fn resolve(&self, path: &str, verb: &str) -> Option<String> {
        // Keys may be written with either `(var)` or `{var}` placeholders.
        self.entries
            .get(&Self::key(verb, path))
            .or_else(|| self.entries.get(&Self::key(verb, &normalize_path(path))))
            .cloned()
    }
}

/// Picks the id for a method: an explicit override, then inference.
pub fn resolve_id(path: &str, verb: &str, resolver: &dyn IdentifierResolver) -> Result<String> {
    if let Some(id) = resolver.resolve(path, verb).filter(|id| !id.is_empty()) {
        debug!("Using override id '{}' for {} {}", id, verb, path);
        return Ok(id);
    }
    generate_id(path, verb)
}

/// Rewrites `(var)` placeholders as `{var}`.
pub fn normalize_path(path: &str) -> String {
    path.replace('(', "{").replace(')', "}")
}

/// Infers an operation id from a path template and an HTTP verb.
///
/// The leading version segment (`v1`, `v2`, ...) is ignored. Fails with
/// [`Error::IdentifierResolution`] when no rule applies.
pub fn generate_id(path: &str, verb: &str) -> Result<String> {
    let cleaned = path.replace(['(', ')'], "");
    let segments: Vec<&str> = cleaned
        .split('/')
        .filter(|s| !s.is_empty())
        .skip(1)
        .collect();

    infer_id(&segments, &verb.to_lowercase())
        .filter(|id| !id.is_empty())
        .ok_or_else(|| Error::IdentifierResolution {
            path: path.to_string(),
            verb: verb.to_string(),
        })
}

fn infer_id(segments: &[&str], verb: &str) -> Option<String> {
    let (last, rest) = segments.split_last()?;

    match verb {
        "delete" => last
            .strip_suffix("_id")
            .map(|stem| format!("delete{}", capitalize(stem))),
        "get" => {
            if let Some(stem) = key_stem(last) {
                return Some(format!("show{}", capitalize(stem)));
            }
            // `.../foos/foo_id/bar` describes a sub-resource of one foo.
            if let [.., collection, key, _] = segments {
                let owner = singular(collection);
                if *key == format!("{}_id", owner) || *key == format!("{}_name", owner) {
                    return Some(format!("show{}{}", capitalize(owner), capitalize(last)));
                }
            }
            Some(format!("list{}", capitalize(last)))
        }
        "post" => Some(match key_stem(last) {
            Some(stem) => format!("create{}", capitalize(stem)),
            None => format!("create{}", capitalize(singular(last))),
        }),
        "put" => {
            if let Some(stem) = last.strip_suffix("_id") {
                return Some(format!("update{}", capitalize(stem)));
            }
            rest.last()
                .and_then(|parent| parent.strip_suffix("_id"))
                .map(|stem| format!("update{}{}", capitalize(stem), capitalize(last)))
        }
        _ => None,
    }
}

/// Strips an `_id` or `_name` suffix
fn key_stem(segment: &str) -> Option<&str> {
    segment
        .strip_suffix("_id")
        .or_else(|| segment.strip_suffix("_name"))
}

fn singular(segment: &str) -> &str {
    segment.strip_suffix('s').unwrap_or(segment)
}

/// Upper-cases the first character and lower-cases the rest
fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Turns a camel-case id into a sentence: `showFooBar` becomes `Show foo bar`.
pub fn generate_title_from_id(id: &str) -> String {
    let mut words: Vec<String> = Vec::new();
    let mut current = String::new();

    for ch in id.chars() {
        if ch.is_uppercase() && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        current.extend(ch.to_lowercase());
    }
    if !current.is_empty() {
        words.push(current);
    }

    let sentence = words.join(" ");
    let mut chars = sentence.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_id() {
        let cases = [
            ("/v2/foos", "get", "listFoos"),
            ("/v2/foos/foo_id", "delete", "deleteFoo"),
            ("/v2/foos/foo_id", "get", "showFoo"),
            ("/v2/foos/foo_id", "post", "createFoo"),
            ("/v2/foos/foo_id", "put", "updateFoo"),
            ("/v2/foos/foo_id/bar", "get", "showFooBar"),
            ("/v2/foos/foo_id/bar", "put", "updateFooBar"),
            ("/v2/foos/foo_name", "get", "showFoo"),
            ("/v2/foos/foo_name", "post", "createFoo"),
            ("/v2/foos/foo_name/bar", "get", "showFooBar"),
        ];

        for (path, verb, expected) in cases {
            assert_eq!(generate_id(path, verb).unwrap(), expected, "{} {}", verb, path);
        }
    }

    #[test]
    fn test_generate_id_with_placeholders_and_slashes() {
        assert_eq!(generate_id("/v2/alarms/(alarm_id)/", "get").unwrap(), "showAlarm");
        assert_eq!(
            generate_id("/v2/alarms/(alarm_id)/state", "put").unwrap(),
            "updateAlarmState"
        );
        assert_eq!(generate_id("/v2/meters/", "post").unwrap(), "createMeter");
    }

    #[test]
    fn test_generate_id_verb_is_case_insensitive() {
        assert_eq!(generate_id("/v2/foos", "GET").unwrap(), "listFoos");
    }

    #[test]
    fn test_get_falls_back_to_list_for_deep_paths() {
        assert_eq!(
            generate_id("/v2/foos/foo_id/bars/baz", "get").unwrap(),
            "listBaz"
        );
    }

    #[test]
    fn test_unresolvable_ids() {
        let failures = [
            ("/v2/foos", "delete"),
            ("/v2/foos", "put"),
            ("/v2/foos/foo_id", "patch"),
            ("/v2", "get"),
            ("/", "post"),
        ];

        for (path, verb) in failures {
            match generate_id(path, verb) {
                Err(Error::IdentifierResolution { path: p, verb: v }) => {
                    assert_eq!(p, path);
                    assert_eq!(v, verb);
                }
                other => panic!("expected resolution error for {} {}, got {:?}", verb, path, other),
            }
        }
    }

    #[test]
    fn test_generate_title_from_id() {
        assert_eq!(generate_title_from_id("showFooBar"), "Show foo bar");
        assert_eq!(generate_title_from_id("listFoos"), "List foos");
        assert_eq!(generate_title_from_id("deleteFoo"), "Delete foo");
        assert_eq!(generate_title_from_id("ShowFoo"), "Show foo");
        assert_eq!(generate_title_from_id(""), "");
    }

    #[test]
    fn test_override_wins_over_inference() {
        let mut table = OverrideTable::new();
        table.insert("get", "/v2/foos", "getAllFoos");

        assert_eq!(resolve_id("/v2/foos", "get", &table).unwrap(), "getAllFoos");
        assert_eq!(resolve_id("/v2/foos/foo_id", "get", &table).unwrap(), "showFoo");
    }

    #[test]
    fn test_override_matches_normalized_placeholders() {
        let table = OverrideTable::from_yaml_str("PATCH /v2/foos/{foo_id}: patchFoo\n").unwrap();

        assert_eq!(table.len(), 1);
        assert_eq!(
            resolve_id("/v2/foos/(foo_id)", "patch", &table).unwrap(),
            "patchFoo"
        );
    }

    #[test]
    fn test_closure_resolver() {
        let resolver = |_: &str, verb: &str| {
            if verb == "patch" {
                Some("patchAnything".to_string())
            } else {
                None
            }
        };

        assert_eq!(resolve_id("/v2/x", "patch", &resolver).unwrap(), "patchAnything");
        assert!(resolve_id("/v2/x", "delete", &resolver).is_err());
    }

    #[test]
    fn test_invalid_override_yaml() {
        assert!(OverrideTable::from_yaml_str("- not\n- a mapping\n").is_err());
    }
}
