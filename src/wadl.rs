//! WADL document model.
//!
//! These types hold everything the conversion extracts from one document.
//! [`crate::serializer`] turns them into XML (or dumps them as JSON/YAML).

use crate::resources::ResourceTree;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default value of the `base` attribute on `resources`
pub const DEFAULT_BASE_URL: &str = "http://www.example.com";

/// Which side of an exchange an example belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Request,
    Response,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Side::Request => write!(f, "request"),
            Side::Response => write!(f, "response"),
        }
    }
}

/// Semantic type of a request parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum ParamType {
    Integer,
    List,
    String,
    /// Only the listed values are accepted
    Enumeration(Vec<String>),
    /// A type token with no known mapping, kept as written
    Literal(String),
}

impl ParamType {
    /// Value of the WADL `type` attribute
    pub fn xsd_name(&self) -> &str {
        match self {
            ParamType::Integer => "xsd:int",
            ParamType::List => "xsd:list",
            ParamType::String => "xsd:string",
            ParamType::Enumeration(_) => "xsd:dict",
            ParamType::Literal(token) => token,
        }
    }

    /// Accepted values, for enumerations
    pub fn valid_values(&self) -> &[String] {
        match self {
            ParamType::Enumeration(values) => values,
            _ => &[],
        }
    }
}

/// A request parameter documented in a bullet list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterDescriptor {
    pub name: String,
    pub param_type: ParamType,
    pub description: String,
    /// The source format has no requiredness marker, so this is always false
    pub required: bool,
    pub style: String,
}

impl ParameterDescriptor {
    pub fn new(name: String, param_type: ParamType, description: String) -> Self {
        Self {
            name,
            param_type,
            description,
            required: false,
            style: "query".to_string(),
        }
    }
}

/// One HTTP method at one path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodDefinition {
    pub id: String,
    /// Upper-case HTTP verb
    pub name: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short_description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<ParameterDescriptor>,
    /// Canonical JSON of the request example
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_example: Option<String>,
    /// Canonical JSON of the response example
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_example: Option<String>,
}

impl MethodDefinition {
    pub fn new(id: String, verb: &str, title: String) -> Self {
        Self {
            id,
            name: verb.to_uppercase(),
            title,
            short_description: None,
            params: Vec::new(),
            request_example: None,
            response_example: None,
        }
    }

    pub fn example(&self, side: Side) -> Option<&str> {
        match side {
            Side::Request => self.request_example.as_deref(),
            Side::Response => self.response_example.as_deref(),
        }
    }

    pub fn set_example(&mut self, side: Side, body: String) {
        match side {
            Side::Request => self.request_example = Some(body),
            Side::Response => self.response_example = Some(body),
        }
    }
}

/// The complete description of one document's API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    /// `base` attribute of the `resources` element
    pub base: String,
    pub resources: ResourceTree,
    pub methods: Vec<MethodDefinition>,
}

impl Application {
    pub fn method(&self, id: &str) -> Option<&MethodDefinition> {
        self.methods.iter().find(|m| m.id == id)
    }
}
