use std::collections::HashMap as Map;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Error;
use crate::loader::DocumentLoader;
use crate::purpose::ProofPurpose;
use crate::vc::Proof;

// Controller document properties that may embed verification methods.
const VERIFICATION_METHOD_PROPERTIES: [&str; 5] = [
    "verificationMethod",
    "assertionMethod",
    "authentication",
    "capabilityInvocation",
    "capabilityDelegation",
];

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VerificationMethod {
    pub id: String,
    #[serde(rename = "type")]
    pub type_: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub controller: Option<String>,
    #[serde(flatten)]
    pub property_set: Option<Map<String, Value>>,
}

impl VerificationMethod {
    pub fn get_property(&self, name: &str) -> Option<&Value> {
        self.property_set.as_ref().and_then(|props| props.get(name))
    }
}

/// A signature suite producing and checking one type of proof.
///
/// Canonicalization and key handling are entirely up to the implementation.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait ProofSuite: Sync {
    /// The proof `type` this suite produces.
    fn proof_type(&self) -> &str;

    /// The verification method used for signing, if the suite can sign.
    fn verification_method(&self) -> Option<&str>;

    fn matches_proof(&self, proof: &Proof) -> bool {
        proof.type_ == self.proof_type()
    }

    /// Create a proof over `document`, which has no `proof` property.
    ///
    /// Implementations pass the new proof through [`ProofPurpose::update`]
    /// before signing it.
    async fn create_proof(
        &self,
        document: &Value,
        purpose: &ProofPurpose,
        loader: &dyn DocumentLoader,
    ) -> Result<Proof, Error>;

    /// Check the cryptographic value of `proof` over `document` and return the
    /// verification method it was checked against.
    async fn verify_proof(
        &self,
        document: &Value,
        proof: &Proof,
        loader: &dyn DocumentLoader,
    ) -> Result<VerificationMethod, Error>;
}

fn find_embedded_method(controller_document: &Value, id: &str) -> Option<Value> {
    let fragment = id.find('#').map(|i| &id[i..]);
    VERIFICATION_METHOD_PROPERTIES
        .iter()
        .filter_map(|property| controller_document.get(property))
        .filter_map(Value::as_array)
        .flatten()
        .find(|method| match method.get("id").and_then(Value::as_str) {
            Some(method_id) => method_id == id || Some(method_id) == fragment,
            None => false,
        })
        .cloned()
}

/// Resolve a verification method id through the loader.
///
/// When the loader does not know the full URL, the method is looked up in
/// the document identified by the part before the fragment.
pub async fn resolve_verification_method(
    id: &str,
    loader: &dyn DocumentLoader,
) -> Result<VerificationMethod, Error> {
    let document = match loader.load(id).await {
        Ok(remote) => remote.document,
        Err(err) => {
            let base = match id.find('#') {
                Some(i) => &id[..i],
                None => return Err(err),
            };
            let remote = loader.load(base).await?;
            let mut method = find_embedded_method(&remote.document, id)
                .ok_or_else(|| Error::DocumentNotFound(id.to_string()))?;
            // Relative ids resolve against the controller document.
            if let Some(object) = method.as_object_mut() {
                object.insert("id".to_string(), Value::String(id.to_string()));
            }
            method
        }
    };
    let mut method: VerificationMethod = serde_json::from_value(document)?;
    if let Some(ref mut props) = method.property_set {
        props.remove("@context");
    }
    Ok(method)
}
