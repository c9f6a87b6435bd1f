//! Verification of credentials and presentations.
//!
//! Only configuration errors are returned as `Err`. Everything that is wrong
//! with the document itself ends up in the returned result.

use chrono::prelude::*;
use futures::future::join_all;

use crate::error::{ConfigError, Error};
use crate::loader::{default_loader, DocumentLoader};
use crate::proofs::{LinkedDataProofs, ProofSetResult};
use crate::purpose::{ProofOptions, ProofPurpose};
use crate::status::{check_status, StatusChecker, StatusResult};
use crate::suite::ProofSuite;
use crate::validation::{check_credential, check_presentation, CheckOptions};
use crate::vc::{Credential, Presentation};

/// Options for [`verify_credential`].
#[derive(Default, Clone, Copy)]
pub struct VerifyCredentialOptions<'a> {
    pub credential: Option<&'a Credential>,
    /// Candidate suites; the first one accepting a proof's type checks it.
    pub suites: &'a [&'a dyn ProofSuite],
    /// Defaults to the issuance (`assertionMethod`) purpose.
    pub purpose: Option<&'a ProofPurpose>,
    pub loader: Option<&'a dyn DocumentLoader>,
    /// Required when the credential has a `credentialStatus`.
    pub check_status: Option<&'a dyn StatusChecker>,
    /// Evaluation time of the temporal bounds. Defaults to the current time.
    pub now: Option<DateTime<Utc>>,
}

/// Options for [`verify`].
#[derive(Default)]
pub struct VerifyPresentationOptions<'a> {
    pub presentation: Option<&'a Presentation>,
    pub suites: &'a [&'a dyn ProofSuite],
    /// Skip the presentation's own proof and only verify its credentials.
    pub unsigned_presentation: bool,
    /// Purpose of the presentation proof. Built from `proof_options` when absent.
    pub presentation_purpose: Option<ProofPurpose>,
    /// `challenge`, `domain` and `controller` of the default authentication purpose.
    pub proof_options: ProofOptions,
    /// Purpose of the embedded credentials' proofs.
    pub purpose: Option<ProofPurpose>,
    pub loader: Option<&'a dyn DocumentLoader>,
    pub check_status: Option<&'a dyn StatusChecker>,
    pub now: Option<DateTime<Utc>>,
}

/// Options with every default filled in.
struct Resolved<'a> {
    purpose: ProofPurpose,
    loader: &'a dyn DocumentLoader,
    now: DateTime<Utc>,
}

impl<'a> VerifyCredentialOptions<'a> {
    fn resolve(&self) -> Resolved<'a> {
        Resolved {
            purpose: self.purpose.cloned().unwrap_or_default(),
            loader: match self.loader {
                Some(loader) => loader,
                None => default_loader(),
            },
            now: self.now.unwrap_or_else(Utc::now),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CredentialResult {
    pub verified: bool,
    /// `id` of the verified credential, for correlating results.
    pub credential_id: Option<String>,
    pub proof_result: Option<ProofSetResult>,
    pub status_result: Option<StatusResult>,
    pub error: Option<Error>,
}

impl CredentialResult {
    fn failed(credential_id: Option<String>, error: Error) -> Self {
        Self {
            verified: false,
            credential_id,
            error: Some(error),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PresentationResult {
    pub verified: bool,
    /// Result of the presentation's own proof, unless unsigned.
    pub presentation_result: Option<ProofSetResult>,
    /// One result per embedded credential, in embedding order.
    pub credential_results: Vec<CredentialResult>,
    pub error: Option<Error>,
}

impl PresentationResult {
    fn failed(error: Error) -> Self {
        Self {
            verified: false,
            error: Some(error),
            ..Self::default()
        }
    }
}

/// Verify a credential: structure, proof and purpose, then status.
pub async fn verify_credential(
    options: VerifyCredentialOptions<'_>,
) -> Result<CredentialResult, ConfigError> {
    let credential = match options.credential {
        Some(credential) => credential,
        None => {
            return Ok(CredentialResult::failed(
                None,
                ConfigError::MissingCredential.into(),
            ))
        }
    };
    if credential.credential_status.is_some() && options.check_status.is_none() {
        return Err(ConfigError::MissingCheckStatus);
    }
    let resolved = options.resolve();
    let id = credential.id.clone();
    log::debug!("verifying credential {:?}", id);

    if let Err(err) = check_credential(credential, &CheckOptions::verify_at(resolved.now)) {
        log::warn!("credential {:?} is invalid: {}", id, err);
        return Ok(CredentialResult::failed(id, err));
    }

    let proof_result = LinkedDataProofs::verify(
        credential,
        options.suites,
        &resolved.purpose,
        resolved.loader,
    )
    .await;
    if !proof_result.verified {
        log::warn!("credential {:?} failed to verify", id);
        return Ok(CredentialResult {
            verified: false,
            credential_id: id,
            error: proof_result.error.clone(),
            proof_result: Some(proof_result),
            status_result: None,
        });
    }

    let status_result = match (&credential.credential_status, options.check_status) {
        (Some(_), Some(checker)) => {
            log::debug!("checking status of credential {:?}", id);
            Some(check_status(checker, credential, resolved.loader).await)
        }
        _ => None,
    };
    let (verified, error) = match status_result {
        Some(ref status) if !status.verified => (
            false,
            Some(status.error.clone().unwrap_or(Error::StatusNotVerified)),
        ),
        _ => (true, None),
    };
    log::debug!("credential {:?} verified: {}", id, verified);
    Ok(CredentialResult {
        verified,
        credential_id: id,
        proof_result: Some(proof_result),
        status_result,
        error,
    })
}

fn credential_errors(results: &[CredentialResult]) -> Vec<Error> {
    results
        .iter()
        .filter_map(|result| result.error.clone())
        .collect()
}

/// Verify a presentation: its embedded credentials, concurrently, then its own proof.
pub async fn verify(
    options: VerifyPresentationOptions<'_>,
) -> Result<PresentationResult, ConfigError> {
    let presentation = options
        .presentation
        .ok_or(ConfigError::MissingPresentation)?;
    let presentation_purpose = if options.unsigned_presentation {
        None
    } else {
        match options.presentation_purpose {
            Some(ref purpose) => Some(purpose.clone()),
            None => Some(
                options
                    .proof_options
                    .authentication_purpose()
                    .map_err(|_| ConfigError::MissingPresentationPurpose)?,
            ),
        }
    };
    let credentials = presentation.credentials();
    if options.check_status.is_none()
        && credentials
            .iter()
            .any(|credential| credential.credential_status.is_some())
    {
        return Err(ConfigError::MissingCheckStatus);
    }

    let loader = match options.loader {
        Some(loader) => loader,
        None => default_loader(),
    };
    let now = options.now.unwrap_or_else(Utc::now);
    log::debug!("verifying presentation {:?}", presentation.id);

    if let Err(err) = check_presentation(presentation) {
        log::warn!("presentation {:?} is invalid: {}", presentation.id, err);
        return Ok(PresentationResult::failed(err));
    }

    // join_all yields results in input order, whatever the completion order.
    let credential_results = join_all(credentials.iter().map(|credential| {
        verify_credential(VerifyCredentialOptions {
            credential: Some(credential),
            suites: options.suites,
            purpose: options.purpose.as_ref(),
            loader: Some(loader),
            check_status: options.check_status,
            now: Some(now),
        })
    }))
    .await
    .into_iter()
    .collect::<Result<Vec<CredentialResult>, ConfigError>>()?;
    let all_verified = credential_results.iter().all(|result| result.verified);

    let purpose = match presentation_purpose {
        Some(purpose) => purpose,
        None => {
            log::debug!("unsigned presentation, credentials verified: {}", all_verified);
            let error = if all_verified {
                None
            } else {
                Some(Error::Verification {
                    errors: credential_errors(&credential_results),
                })
            };
            return Ok(PresentationResult {
                verified: all_verified,
                presentation_result: None,
                credential_results,
                error,
            });
        }
    };

    let presentation_result =
        LinkedDataProofs::verify(presentation, options.suites, &purpose, loader).await;
    let verified = all_verified && presentation_result.verified;
    let error = if !presentation_result.verified {
        presentation_result.error.clone()
    } else if !all_verified {
        Some(Error::Verification {
            errors: credential_errors(&credential_results),
        })
    } else {
        None
    };
    if !verified {
        log::warn!("presentation {:?} failed to verify", presentation.id);
    }
    Ok(PresentationResult {
        verified,
        presentation_result: Some(presentation_result),
        credential_results,
        error,
    })
}
