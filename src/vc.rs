use std::collections::HashMap as Map;

use chrono::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::context::{detect_version, Context, Version};
use crate::error::Error;
use crate::one_or_many::OneOrMany;

// ********************************************
// * Data Structures for Verifiable Credentials
// * https://www.w3.org/TR/vc-data-model/
// * https://www.w3.org/TR/vc-data-model-2.0/
// ********************************************
// Shape checks (context ordering, cardinality, URIs, dates) are done by
// `validation`, not by deserialization, so that a malformed document still
// parses and is rejected with a descriptive error.

pub const VERIFIABLE_CREDENTIAL_TYPE: &str = "VerifiableCredential";
pub const VERIFIABLE_PRESENTATION_TYPE: &str = "VerifiablePresentation";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Credential {
    #[serde(rename = "@context")]
    #[serde(default, skip_serializing_if = "OneOrMany::is_empty")]
    pub context: OneOrMany<Context>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "type")]
    #[serde(default, skip_serializing_if = "OneOrMany::is_empty")]
    pub type_: OneOrMany<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credential_subject: Option<OneOrMany<CredentialSubject>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issuer: Option<OneOrMany<Issuer>>,
    // Version 1.0 temporal fields.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issuance_date: Option<OneOrMany<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<String>,
    // Version 2.0 temporal fields.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_from: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_until: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credential_status: Option<Status>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evidence: Option<OneOrMany<Evidence>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proof: Option<OneOrMany<Proof>>,
    #[serde(flatten)]
    pub property_set: Option<Map<String, Value>>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CredentialSubject {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(flatten)]
    pub property_set: Option<Map<String, Value>>,
}

impl CredentialSubject {
    /// Whether the subject carries at least one property besides `id`.
    pub fn makes_claim(&self) -> bool {
        self.property_set
            .as_ref()
            .map(|properties| !properties.is_empty())
            .unwrap_or(false)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum Issuer {
    URI(String),
    Object(ObjectWithId),
}

impl Issuer {
    pub fn id(&self) -> &str {
        match self {
            Self::URI(uri) => uri,
            Self::Object(object_with_id) => &object_with_id.id,
        }
    }
}

impl From<&str> for Issuer {
    fn from(uri: &str) -> Self {
        Self::URI(uri.to_string())
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ObjectWithId {
    pub id: String,
    #[serde(flatten)]
    pub property_set: Option<Map<String, Value>>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Status {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "type")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_: Option<String>,
    #[serde(flatten)]
    pub property_set: Option<Map<String, Value>>,
}

/// Evidence given by reference or as an object, optionally identified by `id`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum Evidence {
    URI(String),
    Object(Map<String, Value>),
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Proof {
    #[serde(rename = "@context")]
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub context: Value,
    #[serde(rename = "type")]
    pub type_: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cryptosuite: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proof_purpose: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verification_method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub challenge: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nonce: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proof_value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jws: Option<String>,
    #[serde(flatten)]
    pub property_set: Option<Map<String, Value>>,
}

impl Proof {
    pub fn new(type_: &str) -> Self {
        Self {
            type_: type_.to_string(),
            ..Self::default()
        }
    }

    /// The proof without its signature value, as covered by the signature.
    pub fn without_signature(&self) -> Self {
        Self {
            proof_value: None,
            jws: None,
            ..self.clone()
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Presentation {
    #[serde(rename = "@context")]
    #[serde(default, skip_serializing_if = "OneOrMany::is_empty")]
    pub context: OneOrMany<Context>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "type")]
    #[serde(default, skip_serializing_if = "OneOrMany::is_empty")]
    pub type_: OneOrMany<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub holder: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verifiable_credential: Option<OneOrMany<Credential>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proof: Option<OneOrMany<Proof>>,
    #[serde(flatten)]
    pub property_set: Option<Map<String, Value>>,
}

/// A JSON-LD document that carries embedded proofs.
pub trait LinkedDataDocument {
    fn get_contexts(&self) -> &OneOrMany<Context>;

    fn get_proofs(&self) -> Option<&OneOrMany<Proof>>;

    fn add_proof(&mut self, proof: Proof);

    /// The JSON form of the document with every proof removed.
    fn to_value_without_proof(&self) -> Result<Value, Error>;

    fn get_issuer(&self) -> Option<&str> {
        None
    }
}

fn add_proof(proofs: &mut Option<OneOrMany<Proof>>, proof: Proof) {
    match proofs {
        Some(proofs) => proofs.push(proof),
        None => *proofs = Some(OneOrMany::One(proof)),
    }
}

fn strip_proof(mut value: Value) -> Value {
    if let Value::Object(ref mut map) = value {
        map.remove("proof");
    }
    value
}

impl Credential {
    pub fn from_json(s: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(s)?)
    }

    /// Parse a credential that must not carry a proof yet.
    pub fn from_json_unsigned(s: &str) -> Result<Self, Error> {
        let credential = Self::from_json(s)?;
        if credential.proof.is_some() {
            return Err(Error::InvalidProofState);
        }
        Ok(credential)
    }

    /// Data model version detected from `@context`.
    pub fn version(&self) -> Option<Version> {
        detect_version(&self.context)
    }

    /// The issuer id, when there is exactly one issuer.
    pub fn issuer_id(&self) -> Option<&str> {
        self.issuer
            .as_ref()
            .and_then(OneOrMany::to_single)
            .map(Issuer::id)
    }
}

impl LinkedDataDocument for Credential {
    fn get_contexts(&self) -> &OneOrMany<Context> {
        &self.context
    }

    fn get_proofs(&self) -> Option<&OneOrMany<Proof>> {
        self.proof.as_ref()
    }

    fn add_proof(&mut self, proof: Proof) {
        add_proof(&mut self.proof, proof)
    }

    fn to_value_without_proof(&self) -> Result<Value, Error> {
        Ok(strip_proof(serde_json::to_value(self)?))
    }

    fn get_issuer(&self) -> Option<&str> {
        self.issuer_id()
    }
}

impl Presentation {
    pub fn from_json(s: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn version(&self) -> Option<Version> {
        detect_version(&self.context)
    }

    /// Embedded credentials, in embedding order.
    pub fn credentials(&self) -> &[Credential] {
        match self.verifiable_credential {
            Some(OneOrMany::One(ref credential)) => std::slice::from_ref(credential),
            Some(OneOrMany::Many(ref credentials)) => credentials,
            None => &[],
        }
    }
}

impl LinkedDataDocument for Presentation {
    fn get_contexts(&self) -> &OneOrMany<Context> {
        &self.context
    }

    fn get_proofs(&self) -> Option<&OneOrMany<Proof>> {
        self.proof.as_ref()
    }

    fn add_proof(&mut self, proof: Proof) {
        add_proof(&mut self.proof, proof)
    }

    fn to_value_without_proof(&self) -> Result<Value, Error> {
        Ok(strip_proof(serde_json::to_value(self)?))
    }

    fn get_issuer(&self) -> Option<&str> {
        self.holder.as_deref()
    }
}
