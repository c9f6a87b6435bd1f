//! Signing and verifying the proof set of a document.

use futures::future::join_all;
use serde_json::Value;

use crate::context::{context_uris, Context};
use crate::error::Error;
use crate::loader::DocumentLoader;
use crate::one_or_many::OneOrMany;
use crate::purpose::{ProofPurpose, PurposeContext, PurposeResult};
use crate::suite::{ProofSuite, VerificationMethod};
use crate::vc::{LinkedDataDocument, Proof};

/// Outcome of checking one proof.
#[derive(Debug, Clone)]
pub struct ProofResult {
    pub proof: Proof,
    pub verified: bool,
    pub verification_method: Option<VerificationMethod>,
    pub purpose_result: Option<PurposeResult>,
    pub error: Option<Error>,
}

/// Outcome of checking every proof of a document for one purpose.
#[derive(Debug, Clone, Default)]
pub struct ProofSetResult {
    /// Whether at least one matching proof verified.
    pub verified: bool,
    pub results: Vec<ProofResult>,
    pub error: Option<Error>,
}

impl ProofSetResult {
    fn from_error(error: Error) -> Self {
        Self {
            verified: false,
            results: Vec::new(),
            error: Some(error),
        }
    }
}

/// Load every `@context` given by reference. A failure here fails the whole document.
pub async fn load_contexts(
    contexts: &OneOrMany<Context>,
    loader: &dyn DocumentLoader,
) -> Result<(), Error> {
    for url in context_uris(contexts) {
        loader.load(url).await?;
    }
    Ok(())
}

pub struct LinkedDataProofs;

impl LinkedDataProofs {
    /// Create a proof over `document` (without its existing proofs).
    ///
    /// The caller attaches the returned proof to the document.
    pub async fn sign(
        document: &(dyn LinkedDataDocument + Sync),
        suite: &dyn ProofSuite,
        purpose: &ProofPurpose,
        loader: &dyn DocumentLoader,
    ) -> Result<Proof, Error> {
        load_contexts(document.get_contexts(), loader).await?;
        let value = document.to_value_without_proof()?;
        let proof = suite.create_proof(&value, purpose, loader).await?;
        log::debug!(
            "created {} proof with {:?}",
            proof.type_,
            proof.verification_method
        );
        Ok(proof)
    }

    /// Verify the proofs of `document` that claim `purpose`.
    ///
    /// Each such proof is checked with the first suite accepting its type.
    /// The document verifies if any of them verifies.
    pub async fn verify(
        document: &(dyn LinkedDataDocument + Sync),
        suites: &[&dyn ProofSuite],
        purpose: &ProofPurpose,
        loader: &dyn DocumentLoader,
    ) -> ProofSetResult {
        if let Err(err) = load_contexts(document.get_contexts(), loader).await {
            log::warn!("unable to load document context: {}", err);
            return ProofSetResult::from_error(err);
        }
        let value = match document.to_value_without_proof() {
            Ok(value) => value,
            Err(err) => return ProofSetResult::from_error(err),
        };

        let proofs: Vec<&Proof> = document
            .get_proofs()
            .map(|proofs| proofs.iter().filter(|proof| purpose.matches(proof)).collect())
            .unwrap_or_default();
        if proofs.is_empty() {
            return ProofSetResult::from_error(Error::NoMatchingProofs);
        }

        let matched: Vec<(&Proof, &dyn ProofSuite)> = proofs
            .into_iter()
            .filter_map(|proof| {
                let suite = suites.iter().find(|suite| suite.matches_proof(proof));
                log::trace!(
                    "proof {} matched suite: {}",
                    proof.type_,
                    suite.is_some()
                );
                suite.map(|suite| (proof, *suite))
            })
            .collect();
        if matched.is_empty() {
            return ProofSetResult::from_error(Error::InsufficientProofs);
        }

        let issuer = document.get_issuer();
        let results = join_all(matched.into_iter().map(|(proof, suite)| {
            verify_proof(&value, issuer, proof, suite, purpose, loader)
        }))
        .await;

        let verified = results.iter().any(|result| result.verified);
        let error = if verified {
            None
        } else {
            Some(Error::Verification {
                errors: results
                    .iter()
                    .filter_map(|result| result.error.clone())
                    .collect(),
            })
        };
        ProofSetResult {
            verified,
            results,
            error,
        }
    }
}

async fn verify_proof(
    document: &Value,
    issuer: Option<&str>,
    proof: &Proof,
    suite: &dyn ProofSuite,
    purpose: &ProofPurpose,
    loader: &dyn DocumentLoader,
) -> ProofResult {
    let verification_method = match suite.verify_proof(document, proof, loader).await {
        Ok(vm) => vm,
        Err(err) => {
            return ProofResult {
                proof: proof.clone(),
                verified: false,
                verification_method: None,
                purpose_result: None,
                error: Some(err),
            }
        }
    };
    let context = PurposeContext {
        document,
        issuer,
        verification_method: &verification_method,
    };
    let purpose_result = purpose.validate(proof, context, loader).await;
    ProofResult {
        proof: proof.clone(),
        verified: purpose_result.valid,
        error: purpose_result.error.clone(),
        verification_method: Some(verification_method),
        purpose_result: Some(purpose_result),
    }
}
