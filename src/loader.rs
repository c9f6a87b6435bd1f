//! Document loading: `@context` documents, verification methods and controller documents.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::context::{
    CREDENTIALS_EXAMPLES_V1_CONTEXT, CREDENTIALS_EXAMPLES_V2_CONTEXT, CREDENTIALS_V1_CONTEXT,
    CREDENTIALS_V2_CONTEXT, DATA_INTEGRITY_V2_CONTEXT, ED25519_2020_V1_CONTEXT,
};
use crate::error::Error;

/// A document retrieved by a [`DocumentLoader`].
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteDocument {
    pub document: Value,
    pub document_url: String,
    pub context_url: Option<String>,
}

impl RemoteDocument {
    pub fn new(document_url: &str, document: Value) -> Self {
        Self {
            document,
            document_url: document_url.to_string(),
            context_url: None,
        }
    }
}

/// Resolves URLs (contexts, DID documents, verification methods) to documents.
///
/// Any timeout or caching policy belongs to the implementation; callers
/// treat a failed load as terminal for the document being processed.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait DocumentLoader: Sync {
    async fn load(&self, url: &str) -> Result<RemoteDocument, Error>;
}

lazy_static::lazy_static! {
    static ref CREDENTIALS_V1_CONTEXT_DOCUMENT: Value = json!({
        "@context": {
            "@version": 1.1,
            "@protected": true,
            "id": "@id",
            "type": "@type",
            "VerifiableCredential": {
                "@id": "https://www.w3.org/2018/credentials#VerifiableCredential"
            },
            "VerifiablePresentation": {
                "@id": "https://www.w3.org/2018/credentials#VerifiablePresentation"
            },
            "credentialSubject": {"@id": "cred:credentialSubject", "@type": "@id"},
            "credentialStatus": {"@id": "cred:credentialStatus", "@type": "@id"},
            "evidence": {"@id": "cred:evidence", "@type": "@id"},
            "expirationDate": {"@id": "cred:expirationDate", "@type": "xsd:dateTime"},
            "holder": {"@id": "cred:holder", "@type": "@id"},
            "issuanceDate": {"@id": "cred:issuanceDate", "@type": "xsd:dateTime"},
            "issuer": {"@id": "cred:issuer", "@type": "@id"},
            "proof": {"@id": "sec:proof", "@type": "@id", "@container": "@graph"},
            "verifiableCredential": {
                "@id": "cred:verifiableCredential",
                "@type": "@id",
                "@container": "@graph"
            },
            "cred": "https://www.w3.org/2018/credentials#",
            "sec": "https://w3id.org/security#",
            "xsd": "http://www.w3.org/2001/XMLSchema#"
        }
    });
    static ref CREDENTIALS_V2_CONTEXT_DOCUMENT: Value = json!({
        "@context": {
            "@protected": true,
            "id": "@id",
            "type": "@type",
            "description": "https://schema.org/description",
            "name": "https://schema.org/name",
            "VerifiableCredential": {
                "@id": "https://www.w3.org/2018/credentials#VerifiableCredential"
            },
            "VerifiablePresentation": {
                "@id": "https://www.w3.org/2018/credentials#VerifiablePresentation"
            },
            "credentialSubject": {"@id": "cred:credentialSubject", "@type": "@id"},
            "credentialStatus": {"@id": "cred:credentialStatus", "@type": "@id"},
            "evidence": {"@id": "cred:evidence", "@type": "@id"},
            "holder": {"@id": "cred:holder", "@type": "@id"},
            "issuer": {"@id": "cred:issuer", "@type": "@id"},
            "validFrom": {"@id": "cred:validFrom", "@type": "xsd:dateTime"},
            "validUntil": {"@id": "cred:validUntil", "@type": "xsd:dateTime"},
            "proof": {"@id": "sec:proof", "@type": "@id", "@container": "@graph"},
            "verifiableCredential": {
                "@id": "cred:verifiableCredential",
                "@type": "@id",
                "@container": "@graph"
            },
            "DataIntegrityProof": "sec:DataIntegrityProof",
            "cred": "https://www.w3.org/2018/credentials#",
            "sec": "https://w3id.org/security#",
            "xsd": "http://www.w3.org/2001/XMLSchema#"
        }
    });
    static ref CREDENTIALS_EXAMPLES_V1_CONTEXT_DOCUMENT: Value = json!({
        "@context": [{
            "@version": 1.1
        }, "https://www.w3.org/ns/odrl.jsonld", {
            "ex": "https://example.org/examples#",
            "schema": "http://schema.org/",
            "rdf": "http://www.w3.org/1999/02/22-rdf-syntax-ns#",
            "alumniOf": {"@id": "schema:alumniOf", "@type": "rdf:HTML"},
            "degree": "ex:degree",
            "UniversityDegreeCredential": "ex:UniversityDegreeCredential",
            "AlumniCredential": "ex:AlumniCredential"
        }]
    });
    static ref CREDENTIALS_EXAMPLES_V2_CONTEXT_DOCUMENT: Value = json!({
        "@context": {
            "@vocab": "https://www.w3.org/ns/credentials/examples#"
        }
    });
    static ref DATA_INTEGRITY_V2_CONTEXT_DOCUMENT: Value = json!({
        "@context": {
            "id": "@id",
            "type": "@type",
            "@protected": true,
            "proof": {"@id": "https://w3id.org/security#proof", "@type": "@id", "@container": "@graph"},
            "DataIntegrityProof": {
                "@id": "https://w3id.org/security#DataIntegrityProof",
                "@context": {
                    "@protected": true,
                    "challenge": "https://w3id.org/security#challenge",
                    "created": {"@id": "http://purl.org/dc/terms/created", "@type": "http://www.w3.org/2001/XMLSchema#dateTime"},
                    "cryptosuite": "https://w3id.org/security#cryptosuite",
                    "domain": "https://w3id.org/security#domain",
                    "nonce": "https://w3id.org/security#nonce",
                    "proofPurpose": {"@id": "https://w3id.org/security#proofPurpose", "@type": "@vocab"},
                    "proofValue": {"@id": "https://w3id.org/security#proofValue", "@type": "https://w3id.org/security#multibase"},
                    "verificationMethod": {"@id": "https://w3id.org/security#verificationMethod", "@type": "@id"}
                }
            }
        }
    });
    static ref ED25519_2020_V1_CONTEXT_DOCUMENT: Value = json!({
        "@context": {
            "id": "@id",
            "type": "@type",
            "@protected": true,
            "Ed25519VerificationKey2020": "https://w3id.org/security#Ed25519VerificationKey2020",
            "Ed25519Signature2020": "https://w3id.org/security#Ed25519Signature2020",
            "controller": {"@id": "https://w3id.org/security#controller", "@type": "@id"},
            "publicKeyMultibase": {"@id": "https://w3id.org/security#publicKeyMultibase", "@type": "https://w3id.org/security#multibase"}
        }
    });
}

/// Loader for the fixed set of contexts this crate knows about.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticLoader;

impl StaticLoader {
    fn get(url: &str) -> Option<&'static Value> {
        let document: &'static Value = match url {
            CREDENTIALS_V1_CONTEXT => &CREDENTIALS_V1_CONTEXT_DOCUMENT,
            CREDENTIALS_V2_CONTEXT => &CREDENTIALS_V2_CONTEXT_DOCUMENT,
            CREDENTIALS_EXAMPLES_V1_CONTEXT => &CREDENTIALS_EXAMPLES_V1_CONTEXT_DOCUMENT,
            CREDENTIALS_EXAMPLES_V2_CONTEXT => &CREDENTIALS_EXAMPLES_V2_CONTEXT_DOCUMENT,
            DATA_INTEGRITY_V2_CONTEXT => &DATA_INTEGRITY_V2_CONTEXT_DOCUMENT,
            ED25519_2020_V1_CONTEXT => &ED25519_2020_V1_CONTEXT_DOCUMENT,
            _ => return None,
        };
        Some(document)
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl DocumentLoader for StaticLoader {
    async fn load(&self, url: &str) -> Result<RemoteDocument, Error> {
        match Self::get(url) {
            Some(document) => Ok(RemoteDocument {
                document: document.clone(),
                document_url: url.to_string(),
                context_url: None,
            }),
            None => {
                log::warn!("unknown context {}", url);
                Err(Error::DocumentNotFound(url.to_string()))
            }
        }
    }
}

/// A loader backed by the [`StaticLoader`] and an optional map of extra documents.
///
/// The map is where app-specific documents go: extra contexts, DID
/// documents and verification methods.
#[derive(Debug, Clone)]
pub struct ContextLoader {
    // Checked before the document map when set.
    static_loader: Option<StaticLoader>,
    documents: HashMap<String, Value>,
}

impl ContextLoader {
    /// A loader that knows no documents at all.
    pub fn empty() -> Self {
        Self {
            static_loader: None,
            documents: HashMap::new(),
        }
    }

    pub fn with_static_loader(mut self) -> Self {
        self.static_loader = Some(StaticLoader);
        self
    }

    pub fn with_document(mut self, url: &str, document: Value) -> Self {
        self.documents.insert(url.to_string(), document);
        self
    }

    pub fn with_documents(mut self, documents: HashMap<String, Value>) -> Self {
        self.documents.extend(documents);
        self
    }
}

/// The default loader only serves the static contexts.
impl Default for ContextLoader {
    fn default() -> Self {
        Self::empty().with_static_loader()
    }
}

lazy_static::lazy_static! {
    static ref DEFAULT_LOADER: ContextLoader = ContextLoader::default();
}

/// Loader used by the pipelines when the caller does not supply one.
pub fn default_loader() -> &'static dyn DocumentLoader {
    &*DEFAULT_LOADER
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl DocumentLoader for ContextLoader {
    async fn load(&self, url: &str) -> Result<RemoteDocument, Error> {
        if self.static_loader.is_some() {
            if let Some(document) = StaticLoader::get(url) {
                return Ok(RemoteDocument::new(url, document.clone()));
            }
        }
        match self.documents.get(url) {
            Some(document) => Ok(RemoteDocument::new(url, document.clone())),
            None => {
                log::debug!("document not found: {}", url);
                Err(Error::DocumentNotFound(url.to_string()))
            }
        }
    }
}
