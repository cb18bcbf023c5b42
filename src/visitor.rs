//! The conversion state machine.
//!
//! [`WadlVisitor`] consumes [`Event`]s in document order and accumulates the
//! methods, parameters and JSON examples of one document. The source markup
//! carries little explicit structure, so the meaning of a paragraph depends on
//! which [`State`]s are active when it arrives.

use crate::error::{Error, Result};
use crate::identifier::{
    generate_title_from_id, normalize_path, resolve_id, IdentifierResolver, OverrideTable,
};
use crate::resources::{PathRegistry, ResourceTree};
use crate::wadl::{
    Application, MethodDefinition, ParamType, ParameterDescriptor, Side, DEFAULT_BASE_URL,
};
use crate::walker::{Event, Flow, NodeHandler};
use log::{debug, warn};
use serde::Serialize;
use std::collections::{BTreeSet, HashSet};

/// Text of the comment that marks a document as an API description
pub const SENTINEL: &str = "docbookrestapi";

const REQUEST_FIELD: &str = "Request json";
const RESPONSE_FIELD: &str = "Response json";

/// Field-list text that leaks into the first paragraph of a method
const FIELD_ARTIFACTS: [&str; 2] = [":type data:", ":return type:"];

/// How to treat parameter types with no known mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TypePolicy {
    /// Keep the token as the literal type name
    #[default]
    Lenient,
    /// Reject it with [`Error::UnrecognizedParameterType`]
    Strict,
}

/// Settings for one conversion run.
pub struct ConversionOptions {
    /// `base` attribute of the `resources` element
    pub base_url: String,
    pub type_policy: TypePolicy,
    /// Consulted before id inference
    pub resolver: Box<dyn IdentifierResolver>,
}

impl ConversionOptions {
    pub fn with_resolver<R: IdentifierResolver + 'static>(mut self, resolver: R) -> Self {
        self.resolver = Box::new(resolver);
        self
    }
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            type_policy: TypePolicy::Lenient,
            resolver: Box::new(OverrideTable::new()),
        }
    }
}

/// Named conversion states; any combination may be active at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum State {
    /// The sentinel comment was seen
    MustParse,
    /// Inside a `desc` node of the `http` domain
    InMethodDefinition,
    /// The next paragraph is the current method's summary
    NeedsMethodDescription,
    /// Paragraphs are parameter descriptions
    InBulletList,
    /// Collecting request example lines
    InRequest,
    /// Collecting response example lines
    InResponse,
}

/// Builds the WADL model of one document from traversal events.
pub struct WadlVisitor<'a> {
    options: &'a ConversionOptions,
    states: BTreeSet<State>,
    methods: Vec<MethodDefinition>,
    current: Option<MethodDefinition>,
    seen_ids: HashSet<String>,
    paths: PathRegistry,
    request_example: Vec<String>,
    response_example: Vec<String>,
    output: Option<Application>,
}

impl<'a> WadlVisitor<'a> {
    pub fn new(options: &'a ConversionOptions) -> Self {
        Self {
            options,
            states: BTreeSet::new(),
            methods: Vec::new(),
            current: None,
            seen_ids: HashSet::new(),
            paths: PathRegistry::new(),
            request_example: Vec::new(),
            response_example: Vec::new(),
            output: None,
        }
    }

    pub fn is_active(&self, state: State) -> bool {
        self.states.contains(&state)
    }

    /// Active states, in declaration order
    pub fn states(&self) -> impl Iterator<Item = State> + '_ {
        self.states.iter().copied()
    }

    /// The finished model, or `None` when the document was out of scope or
    /// has not been fully walked
    pub fn into_application(self) -> Option<Application> {
        self.output
    }

    fn reset(&mut self) {
        self.states.clear();
        self.methods.clear();
        self.current = None;
        self.seen_ids.clear();
        self.paths = PathRegistry::new();
        self.request_example.clear();
        self.response_example.clear();
        self.output = None;
    }

    fn begin_method(&mut self, verb: &str, path: &str) -> Result<()> {
        self.close_method()?;

        let id = resolve_id(path, verb, self.options.resolver.as_ref())?;
        if !self.seen_ids.insert(id.clone()) {
            return Err(Error::DuplicateIdentifier {
                id,
                path: path.to_string(),
                verb: verb.to_string(),
            });
        }
        debug!("Method {} {} -> {}", verb.to_uppercase(), path, id);

        self.paths.register(&normalize_path(path), &id);
        let title = generate_title_from_id(&id);
        self.current = Some(MethodDefinition::new(id, verb, title));
        self.states.insert(State::NeedsMethodDescription);
        Ok(())
    }

    /// Flushes pending examples into the current method and files it
    fn close_method(&mut self) -> Result<()> {
        self.finalize_examples()?;
        self.states.remove(&State::InRequest);
        self.states.remove(&State::InResponse);
        if let Some(method) = self.current.take() {
            self.methods.push(method);
        }
        Ok(())
    }

    fn on_paragraph(&mut self, text: String) -> Result<()> {
        if self.is_active(State::InMethodDefinition) && self.is_active(State::NeedsMethodDescription) {
            let summary = strip_field_artifacts(&text);
            if let Some(method) = self.current.as_mut() {
                method.short_description = Some(summary.to_string());
            }
            self.states.remove(&State::NeedsMethodDescription);
        } else if self.is_active(State::InBulletList) {
            let policy = self.options.type_policy;
            match self.current.as_mut() {
                Some(method) if self.states.contains(&State::InMethodDefinition) => {
                    let param = parse_parameter(&text, policy, &method.id)?;
                    debug!("Parameter '{}' on {}", param.name, method.id);
                    method.params.push(param);
                }
                _ => debug!("Ignoring bullet outside any method: {}", text),
            }
        } else {
            self.collect_example_line(text);
        }
        Ok(())
    }

    fn on_field_name(&mut self, name: &str) -> Result<()> {
        match name {
            REQUEST_FIELD => {
                self.states.insert(State::InRequest);
                self.states.remove(&State::InResponse);
            }
            RESPONSE_FIELD => {
                self.states.remove(&State::InRequest);
                self.states.insert(State::InResponse);
            }
            _ => {
                self.states.remove(&State::InRequest);
                self.states.remove(&State::InResponse);
                self.finalize_examples()?;
            }
        }
        Ok(())
    }

    fn collect_example_line(&mut self, text: String) {
        if self.is_active(State::InRequest) {
            self.request_example.push(text);
        } else if self.is_active(State::InResponse) {
            self.response_example.push(text);
        }
    }

    fn finalize_examples(&mut self) -> Result<()> {
        for side in [Side::Request, Side::Response] {
            let lines = match side {
                Side::Request => std::mem::take(&mut self.request_example),
                Side::Response => std::mem::take(&mut self.response_example),
            };
            if lines.is_empty() {
                continue;
            }

            let Some(method) = self.current.as_mut() else {
                warn!("Dropping {} example outside any method", side);
                continue;
            };
            let body = canonical_json(&lines.concat()).map_err(|source| Error::MalformedExample {
                method_id: method.id.clone(),
                side,
                source,
            })?;
            method.set_example(side, body);
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        if !self.is_active(State::MustParse) {
            return Ok(());
        }
        self.close_method()?;

        let resources = ResourceTree::build(&self.paths);
        debug!(
            "Document done: {} methods on {} paths",
            self.methods.len(),
            self.paths.len()
        );
        self.output = Some(Application {
            base: self.options.base_url.clone(),
            resources,
            methods: std::mem::take(&mut self.methods),
        });
        Ok(())
    }
}

impl NodeHandler for WadlVisitor<'_> {
    fn handle(&mut self, event: Event) -> Result<Flow> {
        let must_parse = self.is_active(State::MustParse);

        match event {
            Event::EnterDocument => self.reset(),
            Event::Comment(text) => {
                if text == SENTINEL {
                    self.states.insert(State::MustParse);
                }
            }
            Event::EnterSection => {
                if !must_parse {
                    debug!("No '{}' marker before the first section; skipping", SENTINEL);
                    return Ok(Flow::StopTraversal);
                }
            }
            Event::LeaveDocument => self.finish()?,
            // Nothing else matters until the document is known to be in scope.
            _ if !must_parse => {}
            Event::EnterDefinition { domain } => {
                if domain == "http" {
                    self.states.insert(State::InMethodDefinition);
                }
            }
            Event::LeaveDefinition => {
                self.states.remove(&State::InMethodDefinition);
            }
            Event::Signature {
                method: Some(verb),
                path: Some(path),
            } => self.begin_method(&verb, &path)?,
            Event::Signature { .. } => {}
            Event::EnterBulletList => {
                self.states.insert(State::InBulletList);
            }
            Event::LeaveBulletList => {
                self.states.remove(&State::InBulletList);
            }
            Event::Paragraph(text) => self.on_paragraph(text)?,
            Event::FieldName(name) => self.on_field_name(&name)?,
            Event::Term(text) => self.collect_example_line(text),
        }
        Ok(Flow::Continue)
    }
}

/// Cuts a method summary at the first field-list artifact
fn strip_field_artifacts(text: &str) -> &str {
    match FIELD_ARTIFACTS
        .iter()
        .filter_map(|marker| text.find(marker))
        .min()
    {
        Some(end) => text[..end].trim_end(),
        None => text,
    }
}

/// Parses `name (type) -- description`
fn parse_parameter(text: &str, policy: TypePolicy, method_id: &str) -> Result<ParameterDescriptor> {
    let malformed = || Error::MalformedParameter {
        text: text.to_string(),
        method_id: method_id.to_string(),
    };

    let (name, rest) = text.split_once(' ').ok_or_else(malformed)?;
    let (type_part, description) = rest.split_once("--").ok_or_else(malformed)?;
    let token = type_part.trim().strip_prefix('(').ok_or_else(malformed)?;
    let token = token.strip_suffix(')').unwrap_or(token);

    let param_type = parse_param_type(token, policy, method_id)?;
    Ok(ParameterDescriptor::new(
        name.to_string(),
        param_type,
        description.trim().to_string(),
    ))
}

fn parse_param_type(token: &str, policy: TypePolicy, method_id: &str) -> Result<ParamType> {
    if let Some(values) = token.strip_prefix("Enum") {
        let values = values.trim_start_matches('(').trim_end_matches(')');
        let values = values
            .split(',')
            .map(|v| v.trim().trim_matches(|c| c == '\'' || c == '"'))
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .collect();
        return Ok(ParamType::Enumeration(values));
    }
    if token.starts_with("int") {
        return Ok(ParamType::Integer);
    }
    if token.starts_with("list") {
        return Ok(ParamType::List);
    }
    if token.starts_with("unicode") {
        return Ok(ParamType::String);
    }

    match policy {
        TypePolicy::Lenient => Ok(ParamType::Literal(token.to_string())),
        TypePolicy::Strict => Err(Error::UnrecognizedParameterType {
            token: token.to_string(),
            method_id: method_id.to_string(),
        }),
    }
}

/// Re-serializes JSON with sorted keys and four-space indentation.
pub fn canonical_json(text: &str) -> serde_json::Result<String> {
    let value: serde_json::Value = serde_json::from_str(text)?;
    let mut out = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
    value.serialize(&mut serializer)?;
    Ok(String::from_utf8_lossy(&out).into_owned())
}
