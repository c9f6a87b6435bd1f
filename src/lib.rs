//! Issuance and verification of [W3C Verifiable Credentials][vc-data-model]
//! and Verifiable Presentations, for both the [1.0][vc-data-model] and
//! [2.0][vc-data-model-2] data models.
//!
//! The crate decides whether a document is a well-formed credential or
//! presentation, whether its temporal claims hold, and whether its proofs
//! were made by a key its controller authorizes for the right purpose. It
//! does not implement signature algorithms, JSON-LD processing or DID
//! resolution: those are supplied by the caller through the [`ProofSuite`]
//! and [`DocumentLoader`] traits.
//!
//! - [`issue`] validates and signs a credential.
//! - [`verify_credential`] and [`verify`] verify a credential or a
//!   presentation with its embedded credentials.
//! - [`create_presentation`] and [`sign_presentation`] assemble and sign
//!   presentations.
//!
//! Configuration mistakes (a missing suite, no status checker for a
//! credential with `credentialStatus`, no challenge for a signed
//! presentation) are returned as [`ConfigError`]. Verification never fails
//! for a bad document: the reason is reported in the result.
//!
//! ```
//! use vc_verifier::{create_presentation, Credential, OneOrMany, PresentationOptions};
//!
//! let credential = Credential::from_json(r#"{
//!     "@context": ["https://www.w3.org/ns/credentials/v2"],
//!     "type": ["VerifiableCredential"],
//!     "issuer": "did:example:issuer",
//!     "credentialSubject": {"id": "did:example:alice", "name": "Alice"}
//! }"#).unwrap();
//!
//! let presentation = create_presentation(PresentationOptions {
//!     verifiable_credential: Some(OneOrMany::One(credential)),
//!     holder: Some("did:example:alice".to_string()),
//!     ..Default::default()
//! }).unwrap();
//! assert_eq!(presentation.credentials().len(), 1);
//! ```
//!
//! [vc-data-model]: <https://www.w3.org/TR/vc-data-model/>
//! [vc-data-model-2]: <https://www.w3.org/TR/vc-data-model-2.0/>

pub mod context;
pub mod date;
pub mod error;
pub mod issue;
pub mod loader;
pub mod one_or_many;
pub mod presentation;
pub mod proofs;
pub mod purpose;
pub mod status;
pub mod suite;
pub mod uri;
pub mod validation;
pub mod vc;
pub mod verify;

pub use context::{Context, Version, CREDENTIALS_V1_CONTEXT, CREDENTIALS_V2_CONTEXT};
pub use error::{ConfigError, Error};
pub use issue::{issue, IssueOptions};
pub use loader::{ContextLoader, DocumentLoader, RemoteDocument, StaticLoader};
pub use one_or_many::OneOrMany;
pub use presentation::{
    create_presentation, sign_presentation, PresentationOptions, SignPresentationOptions,
};
pub use proofs::{LinkedDataProofs, ProofResult, ProofSetResult};
pub use purpose::{
    AuthenticationPurpose, IssuancePurpose, ProofOptions, ProofPurpose, ProofPurposeHandler,
    PurposeContext, PurposeResult,
};
pub use status::{StatusChecker, StatusResult};
pub use suite::{ProofSuite, VerificationMethod};
pub use uri::URI;
pub use validation::{check_credential, check_presentation, CheckOptions, Mode};
pub use vc::{Credential, LinkedDataDocument, Presentation, Proof};
pub use verify::{
    verify, verify_credential, CredentialResult, PresentationResult, VerifyCredentialOptions,
    VerifyPresentationOptions,
};
