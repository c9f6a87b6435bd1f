use std::convert::TryFrom;
use std::str::FromStr;

use iref::Iri;
use serde::{Deserialize, Serialize};

/// An absolute URI (an IRI with a scheme).
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct URI(String);

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid URI: {0}")]
pub struct URIParseErr(pub String);

/// Check that `uri` parses as an absolute URI.
///
/// DIDs, URNs and URLs all pass; bare strings and relative references do not.
pub fn is_absolute_uri(uri: &str) -> bool {
    !uri.is_empty() && Iri::new(uri).is_ok()
}

impl URI {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for URI {
    type Error = URIParseErr;
    fn try_from(uri: String) -> Result<Self, Self::Error> {
        if is_absolute_uri(&uri) {
            Ok(URI(uri))
        } else {
            Err(URIParseErr(uri))
        }
    }
}

impl FromStr for URI {
    type Err = URIParseErr;
    fn from_str(uri: &str) -> Result<Self, Self::Err> {
        URI::try_from(uri.to_string())
    }
}

impl From<URI> for String {
    fn from(uri: URI) -> String {
        uri.0
    }
}

impl std::fmt::Display for URI {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
