use std::sync::Arc;

use thiserror::Error;

/// Caller mistakes: missing required arguments or collaborators.
///
/// These are returned as `Err` from every entry point, including the
/// verification functions that otherwise report failures in their result.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("\"credential\" parameter is required for issuing.")]
    MissingCredential,
    #[error("\"presentation\" parameter is required for verifying.")]
    MissingPresentation,
    #[error("\"suite\" parameter is required for issuing.")]
    MissingSuite,
    #[error("\"suite.verificationMethod\" property is required.")]
    MissingVerificationMethod,
    #[error("A \"checkStatus\" function must be given to verify credentials with \"credentialStatus\".")]
    MissingCheckStatus,
    #[error("A \"challenge\" param is required for AuthenticationProofPurpose.")]
    MissingChallenge,
    #[error("A \"presentationPurpose\" or a \"challenge\" must be given.")]
    MissingPresentationPurpose,
}

/// Error type for `vc-verifier`.
#[derive(Error, Debug, Clone)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    // Structural validation.
    #[error("\"@context\" property is required.")]
    MissingContext,
    #[error("\"@context\" must begin with {expected}.")]
    InvalidContext { expected: String },
    #[error("\"type\" property is required.")]
    MissingType,
    #[error("\"type\" must include `VerifiableCredential`.")]
    MissingTypeVerifiableCredential,
    #[error("\"type\" must include `VerifiablePresentation`.")]
    MissingTypeVerifiablePresentation,
    #[error("\"credentialSubject\" property is required.")]
    MissingCredentialSubject,
    #[error("\"credentialSubject\" must make a claim.")]
    EmptyCredentialSubject,
    #[error("\"issuer\" property is required.")]
    MissingIssuer,
    #[error("\"issuer\" property must have exactly one value.")]
    IssuerCardinality,
    #[error("\"issuanceDate\" property is required.")]
    MissingIssuanceDate,
    #[error("\"issuanceDate\" property must have exactly one value.")]
    IssuanceDateCardinality,
    #[error("\"{property}\" must be a valid date: {value}")]
    InvalidDate { property: String, value: String },
    #[error("\"{property}\" must be a URI: \"{value}\".")]
    InvalidURI { property: String, value: String },
    #[error("The current date time ({now}) is before the \"{property}\" ({bound}).")]
    NotYetValid {
        property: String,
        now: String,
        bound: String,
    },
    #[error("Credential has expired: the current date time ({now}) is after the \"{property}\" ({bound}).")]
    Expired {
        property: String,
        now: String,
        bound: String,
    },
    #[error("\"credentialStatus\" must include an id and a type.")]
    InvalidStatus,
    #[error("\"evidence\" {0}")]
    InvalidEvidence(String),

    // Proofs and proof purposes.
    #[error("Document must not already contain a proof.")]
    InvalidProofState,
    #[error("No matching proofs found in the given document.")]
    NoMatchingProofs,
    #[error("Did not verify any proofs; insufficient proofs matched the acceptable suite(s) and required purpose(s).")]
    InsufficientProofs,
    #[error("Missing verification method")]
    MissingVerificationMethod,
    #[error("Missing proof signature")]
    MissingProofSignature,
    #[error("Invalid signature")]
    InvalidSignature,
    #[error("Proof purpose mismatch: expected \"{expected}\", found {found:?}")]
    ProofPurposeMismatch {
        expected: String,
        found: Option<String>,
    },
    #[error("Verification method \"{0}\" has no controller.")]
    MissingController(String),
    #[error("Verification method \"{vm}\" not authorized by controller for proof purpose \"{term}\".")]
    VerificationMethodNotAuthorized { vm: String, term: String },
    #[error("Credential issuer \"{issuer}\" must match the verification method controller \"{controller}\".")]
    IssuerMismatch { issuer: String, controller: String },
    #[error("The controller \"{actual}\" does not match the expected controller \"{expected}\".")]
    ControllerMismatch { expected: String, actual: String },
    #[error("The proof's challenge does not match.")]
    ChallengeMismatch,
    #[error("The proof's domain does not match.")]
    DomainMismatch,
    #[error("The proof's created timestamp is missing.")]
    MissingCreated,
    #[error("The proof's created timestamp ({created}) is out of range of {date}.")]
    ClockSkew { created: String, date: String },
    #[error("{0}")]
    ProofPurpose(String),
    /// Errors of every attempted proof, when none of them verified.
    #[error("Verification error(s): {}", display_errors(.errors))]
    Verification { errors: Vec<Error> },

    // Collaborators.
    #[error("Document not found: {0}")]
    DocumentNotFound(String),
    #[error("Unable to check credential status: {0}")]
    Status(String),
    #[error("Credential status is not verified.")]
    StatusNotVerified,
    #[error(transparent)]
    Json(Arc<serde_json::Error>),
}

fn display_errors(errors: &[Error]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<String>>()
        .join("; ")
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(Arc::new(err))
    }
}

impl Error {
    /// Nested errors carried by a failed multi-proof verification.
    pub fn errors(&self) -> &[Error] {
        match self {
            Self::Verification { errors } => errors,
            _ => &[],
        }
    }
}
