#![allow(dead_code)]

use std::convert::TryFrom;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::prelude::*;
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use multibase::Base;
use serde_json::{json, Value};

use vc_verifier::suite::resolve_verification_method;
use vc_verifier::{
    ContextLoader, Credential, DocumentLoader, Error, Proof, ProofPurpose, ProofSuite,
    StatusChecker, StatusResult, VerificationMethod,
};

pub const ISSUER: &str = "did:example:issuer";
pub const ISSUER_VM: &str = "did:example:issuer#key-1";
pub const HOLDER: &str = "did:example:holder";
pub const HOLDER_VM: &str = "did:example:holder#key-1";

pub const ISSUER_SEED: [u8; 32] = [1; 32];
pub const HOLDER_SEED: [u8; 32] = [2; 32];
pub const OTHER_SEED: [u8; 32] = [3; 32];

pub fn init_logger() {
    stderrlog::new().verbosity(4).init().ok();
}

/// `DataIntegrityProof` with Ed25519 over the JCS form of the proof options and document.
pub struct Ed25519JcsSuite {
    key: Option<SigningKey>,
    verification_method: Option<String>,
    verified_count: AtomicUsize,
}

impl Ed25519JcsSuite {
    pub fn new(seed: &[u8; 32], verification_method: &str) -> Self {
        Self {
            key: Some(SigningKey::from_bytes(seed)),
            verification_method: Some(verification_method.to_string()),
            verified_count: AtomicUsize::new(0),
        }
    }

    pub fn issuer() -> Self {
        Self::new(&ISSUER_SEED, ISSUER_VM)
    }

    pub fn holder() -> Self {
        Self::new(&HOLDER_SEED, HOLDER_VM)
    }

    /// A suite that can only verify.
    pub fn verifier() -> Self {
        Self {
            key: None,
            verification_method: None,
            verified_count: AtomicUsize::new(0),
        }
    }

    /// Number of proofs this suite was asked to verify.
    pub fn verified_count(&self) -> usize {
        self.verified_count.load(Ordering::SeqCst)
    }
}

pub fn public_key_multibase(seed: &[u8; 32]) -> String {
    let key = SigningKey::from_bytes(seed);
    multibase::encode(Base::Base58Btc, key.verifying_key().to_bytes())
}

fn signing_input(document: &Value, proof: &Proof) -> Result<Vec<u8>, Error> {
    let proof_options = serde_jcs::to_string(&proof.without_signature())?;
    let document = serde_jcs::to_string(document)?;
    Ok([proof_options.as_bytes(), document.as_bytes()].concat())
}

#[async_trait]
impl ProofSuite for Ed25519JcsSuite {
    fn proof_type(&self) -> &str {
        "DataIntegrityProof"
    }

    fn verification_method(&self) -> Option<&str> {
        self.verification_method.as_deref()
    }

    async fn create_proof(
        &self,
        document: &Value,
        purpose: &ProofPurpose,
        _loader: &dyn DocumentLoader,
    ) -> Result<Proof, Error> {
        let key = self.key.as_ref().ok_or(Error::MissingProofSignature)?;
        let mut proof = purpose.update(Proof {
            cryptosuite: Some("eddsa-jcs-2022".to_string()),
            verification_method: self.verification_method.clone(),
            created: Utc::now().with_nanosecond(0),
            ..Proof::new(self.proof_type())
        });
        let signature = key.sign(&signing_input(document, &proof)?);
        proof.proof_value = Some(multibase::encode(Base::Base58Btc, signature.to_bytes()));
        Ok(proof)
    }

    async fn verify_proof(
        &self,
        document: &Value,
        proof: &Proof,
        loader: &dyn DocumentLoader,
    ) -> Result<VerificationMethod, Error> {
        self.verified_count.fetch_add(1, Ordering::SeqCst);
        let vm_id = proof
            .verification_method
            .as_deref()
            .ok_or(Error::MissingVerificationMethod)?;
        let proof_value = proof
            .proof_value
            .as_deref()
            .ok_or(Error::MissingProofSignature)?;
        let vm = resolve_verification_method(vm_id, loader).await?;
        let public_key = vm
            .get_property("publicKeyMultibase")
            .and_then(Value::as_str)
            .ok_or(Error::InvalidSignature)?;
        let (_, public_key) = multibase::decode(public_key).map_err(|_| Error::InvalidSignature)?;
        let public_key =
            <[u8; 32]>::try_from(public_key.as_slice()).map_err(|_| Error::InvalidSignature)?;
        let public_key =
            VerifyingKey::from_bytes(&public_key).map_err(|_| Error::InvalidSignature)?;
        let (_, signature) = multibase::decode(proof_value).map_err(|_| Error::InvalidSignature)?;
        let signature = Signature::from_slice(&signature).map_err(|_| Error::InvalidSignature)?;
        public_key
            .verify(&signing_input(document, proof)?, &signature)
            .map_err(|_| Error::InvalidSignature)?;
        Ok(vm)
    }
}

fn did_document(did: &str, seed: &[u8; 32], relationships: &[&str]) -> Value {
    let vm_id = format!("{}#key-1", did);
    let mut document = json!({
        "@context": "https://www.w3.org/ns/did/v1",
        "id": did,
        "verificationMethod": [{
            "id": vm_id.clone(),
            "type": "Ed25519VerificationKey2020",
            "controller": did,
            "publicKeyMultibase": public_key_multibase(seed)
        }]
    });
    for relationship in relationships {
        document[*relationship] = json!([vm_id]);
    }
    document
}

/// Static contexts plus the DID documents of the test issuer and holder.
pub fn loader() -> ContextLoader {
    ContextLoader::default()
        .with_document(
            ISSUER,
            did_document(ISSUER, &ISSUER_SEED, &["assertionMethod", "authentication"]),
        )
        .with_document(HOLDER, did_document(HOLDER, &HOLDER_SEED, &["authentication"]))
}

pub fn credential_v1() -> Credential {
    serde_json::from_value(json!({
        "@context": [
            "https://www.w3.org/2018/credentials/v1",
            "https://www.w3.org/2018/credentials/examples/v1"
        ],
        "id": "http://example.edu/credentials/1872",
        "type": ["VerifiableCredential", "AlumniCredential"],
        "issuer": ISSUER,
        "credentialSubject": {
            "id": HOLDER,
            "alumniOf": "Example University"
        }
    }))
    .unwrap()
}

pub fn credential_v2() -> Credential {
    serde_json::from_value(json!({
        "@context": [
            "https://www.w3.org/ns/credentials/v2",
            "https://www.w3.org/ns/credentials/examples/v2"
        ],
        "id": "urn:uuid:58172aac-d8ba-11ed-83dd-0b3aef56cc33",
        "type": ["VerifiableCredential", "ExampleAlumniCredential"],
        "issuer": {"id": ISSUER, "name": "Example University"},
        "validFrom": "2020-01-01T19:23:24Z",
        "credentialSubject": {
            "id": HOLDER,
            "alumniOf": {"name": "Example University"}
        }
    }))
    .unwrap()
}

/// Numbered copies of the v2 credential, for presentations.
pub fn credential_n(n: usize) -> Credential {
    let mut credential = credential_v2();
    credential.id = Some(format!("urn:example:credential:{}", n));
    credential
}

/// Revokes the credentials whose status id is listed.
pub struct ListStatusChecker {
    pub revoked: Vec<String>,
    checked_count: AtomicUsize,
}

impl ListStatusChecker {
    pub fn new(revoked: &[&str]) -> Self {
        Self {
            revoked: revoked.iter().map(|id| id.to_string()).collect(),
            checked_count: AtomicUsize::new(0),
        }
    }

    pub fn checked_count(&self) -> usize {
        self.checked_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StatusChecker for ListStatusChecker {
    async fn check_status(
        &self,
        credential: &Credential,
        _loader: &dyn DocumentLoader,
    ) -> Result<StatusResult, Error> {
        self.checked_count.fetch_add(1, Ordering::SeqCst);
        let id = credential
            .credential_status
            .as_ref()
            .and_then(|status| status.id.as_deref())
            .ok_or_else(|| Error::Status("missing status id".to_string()))?;
        if self.revoked.iter().any(|revoked| revoked == id) {
            Ok(StatusResult::failed(Error::Status(format!("{} is revoked", id))))
        } else {
            Ok(StatusResult::verified())
        }
    }
}
