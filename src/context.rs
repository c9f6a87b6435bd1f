//! Credential context URIs and data model versions.

use std::collections::HashMap as Map;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::one_or_many::OneOrMany;

pub const CREDENTIALS_V1_CONTEXT: &str = "https://www.w3.org/2018/credentials/v1";
pub const CREDENTIALS_V2_CONTEXT: &str = "https://www.w3.org/ns/credentials/v2";
pub const CREDENTIALS_EXAMPLES_V1_CONTEXT: &str = "https://www.w3.org/2018/credentials/examples/v1";
pub const CREDENTIALS_EXAMPLES_V2_CONTEXT: &str = "https://www.w3.org/ns/credentials/examples/v2";
pub const DATA_INTEGRITY_V2_CONTEXT: &str = "https://w3id.org/security/data-integrity/v2";
pub const ED25519_2020_V1_CONTEXT: &str = "https://w3id.org/security/suites/ed25519-2020/v1";

/// An entry of `@context`: either a URI or an inline context definition.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum Context {
    URI(String),
    Object(Map<String, Value>),
}

impl Context {
    pub fn as_uri(&self) -> Option<&str> {
        match self {
            Self::URI(uri) => Some(uri),
            Self::Object(_) => None,
        }
    }
}

impl From<&str> for Context {
    fn from(uri: &str) -> Self {
        Self::URI(uri.to_string())
    }
}

/// Version of the VC Data Model a document follows, identified by its base context.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Version {
    #[serde(rename = "1.0")]
    V1,
    #[serde(rename = "2.0")]
    V2,
}

impl Default for Version {
    fn default() -> Self {
        Version::V2
    }
}

impl Version {
    /// The context URI that must occupy `@context[0]` for this version.
    pub fn context_url(self) -> &'static str {
        match self {
            Version::V1 => CREDENTIALS_V1_CONTEXT,
            Version::V2 => CREDENTIALS_V2_CONTEXT,
        }
    }

    pub fn from_context_url(url: &str) -> Option<Self> {
        match url {
            CREDENTIALS_V1_CONTEXT => Some(Version::V1),
            CREDENTIALS_V2_CONTEXT => Some(Version::V2),
            _ => None,
        }
    }

    /// Single-element `@context` for a new document of this version.
    pub fn contexts(self) -> OneOrMany<Context> {
        OneOrMany::Many(vec![Context::from(self.context_url())])
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Version::V1 => f.write_str("1.0"),
            Version::V2 => f.write_str("2.0"),
        }
    }
}

/// Detect the data model version from the first credentials context URI
/// in `@context`.
///
/// The validator then requires that URI to be at index 0.
pub fn detect_version(contexts: &OneOrMany<Context>) -> Option<Version> {
    contexts
        .iter()
        .filter_map(Context::as_uri)
        .find_map(Version::from_context_url)
}

/// URIs of every `@context` entry given by reference.
pub fn context_uris(contexts: &OneOrMany<Context>) -> Vec<&str> {
    contexts.iter().filter_map(Context::as_uri).collect()
}
