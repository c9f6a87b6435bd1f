//! Proof purposes: the policy deciding whether a cryptographically valid
//! proof is acceptable for what it is being used for.

use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::date::date_to_iso_string;
use crate::error::{ConfigError, Error};
use crate::loader::DocumentLoader;
use crate::suite::VerificationMethod;
use crate::uri::URI;
use crate::vc::Proof;

pub const ASSERTION_METHOD: &str = "assertionMethod";
pub const AUTHENTICATION: &str = "authentication";

/// What a purpose check gets to see besides the proof.
#[derive(Debug, Clone, Copy)]
pub struct PurposeContext<'a> {
    /// The document the proof is attached to, without its proofs.
    pub document: &'a Value,
    /// Issuer of a credential, or holder of a presentation.
    pub issuer: Option<&'a str>,
    /// The method the suite verified the proof against.
    pub verification_method: &'a VerificationMethod,
}

#[derive(Debug, Clone, Default)]
pub struct PurposeResult {
    pub valid: bool,
    /// Id of the resolved controller document.
    pub controller: Option<String>,
    pub error: Option<Error>,
}

impl PurposeResult {
    fn from_result(result: Result<String, Error>) -> Self {
        match result {
            Ok(controller) => Self {
                valid: true,
                controller: Some(controller),
                error: None,
            },
            Err(err) => Self {
                valid: false,
                controller: None,
                error: Some(err),
            },
        }
    }
}

/// An application-defined proof purpose.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait ProofPurposeHandler: Debug + Send + Sync {
    /// The `proofPurpose` value this purpose creates and accepts.
    fn term(&self) -> &str;

    fn update(&self, mut proof: Proof) -> Proof {
        proof.proof_purpose = Some(self.term().to_string());
        proof
    }

    async fn validate(
        &self,
        proof: &Proof,
        context: PurposeContext<'_>,
        loader: &dyn DocumentLoader,
    ) -> PurposeResult;
}

/// Expected controller and clock-skew bound, shared by the controller based purposes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ControllerOptions {
    pub controller: Option<String>,
    pub date: Option<DateTime<Utc>>,
    pub max_timestamp_delta: Option<chrono::Duration>,
}

/// Proofs made by the credential issuer (`assertionMethod`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IssuancePurpose {
    pub options: ControllerOptions,
}

/// Proofs made by a presentation holder in response to a challenge (`authentication`).
#[derive(Debug, Clone, PartialEq)]
pub struct AuthenticationPurpose {
    pub challenge: String,
    pub domain: Option<String>,
    pub options: ControllerOptions,
}

macro_rules! controller_builders {
    ($type:ty) => {
        impl $type {
            /// Require the verification method to be controlled by `controller`.
            pub fn controller(mut self, controller: &str) -> Self {
                self.options.controller = Some(controller.to_string());
                self
            }

            /// Reference date for the clock-skew check (default: now).
            pub fn date(mut self, date: DateTime<Utc>) -> Self {
                self.options.date = Some(date);
                self
            }

            pub fn max_timestamp_delta(mut self, delta: chrono::Duration) -> Self {
                self.options.max_timestamp_delta = Some(delta);
                self
            }
        }
    };
}

controller_builders!(IssuancePurpose);
controller_builders!(AuthenticationPurpose);

impl IssuancePurpose {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AuthenticationPurpose {
    pub fn new(challenge: &str) -> Self {
        Self {
            challenge: challenge.to_string(),
            domain: None,
            options: ControllerOptions::default(),
        }
    }

    pub fn domain(mut self, domain: &str) -> Self {
        self.domain = Some(domain.to_string());
        self
    }
}

#[derive(Debug, Clone)]
pub enum ProofPurpose {
    Issuance(IssuancePurpose),
    Authentication(AuthenticationPurpose),
    Custom(Arc<dyn ProofPurposeHandler>),
}

impl Default for ProofPurpose {
    fn default() -> Self {
        Self::issuance()
    }
}

impl From<IssuancePurpose> for ProofPurpose {
    fn from(purpose: IssuancePurpose) -> Self {
        Self::Issuance(purpose)
    }
}

impl From<AuthenticationPurpose> for ProofPurpose {
    fn from(purpose: AuthenticationPurpose) -> Self {
        Self::Authentication(purpose)
    }
}

impl ProofPurpose {
    pub fn issuance() -> Self {
        Self::Issuance(IssuancePurpose::new())
    }

    pub fn authentication(challenge: &str) -> Self {
        Self::Authentication(AuthenticationPurpose::new(challenge))
    }

    pub fn custom<H: ProofPurposeHandler + 'static>(handler: H) -> Self {
        Self::Custom(Arc::new(handler))
    }

    /// The verification relationship the verification method must be listed under.
    pub fn term(&self) -> &str {
        match self {
            Self::Issuance(_) => ASSERTION_METHOD,
            Self::Authentication(_) => AUTHENTICATION,
            Self::Custom(handler) => handler.term(),
        }
    }

    /// Whether a proof claims this purpose.
    pub fn matches(&self, proof: &Proof) -> bool {
        proof.proof_purpose.as_deref() == Some(self.term())
    }

    /// Set the purpose-specific properties of a proof about to be signed.
    pub fn update(&self, mut proof: Proof) -> Proof {
        match self {
            Self::Issuance(_) => {
                proof.proof_purpose = Some(ASSERTION_METHOD.to_string());
                proof
            }
            Self::Authentication(purpose) => {
                proof.proof_purpose = Some(AUTHENTICATION.to_string());
                proof.challenge = Some(purpose.challenge.clone());
                if let Some(ref domain) = purpose.domain {
                    proof.domain = Some(domain.clone());
                }
                proof
            }
            Self::Custom(handler) => handler.update(proof),
        }
    }

    /// Check a proof whose signature has already been verified.
    pub async fn validate(
        &self,
        proof: &Proof,
        context: PurposeContext<'_>,
        loader: &dyn DocumentLoader,
    ) -> PurposeResult {
        match self {
            Self::Issuance(purpose) => {
                PurposeResult::from_result(validate_issuance(purpose, proof, context, loader).await)
            }
            Self::Authentication(purpose) => PurposeResult::from_result(
                validate_authentication(purpose, proof, context, loader).await,
            ),
            Self::Custom(handler) => handler.validate(proof, context, loader).await,
        }
    }
}

fn check_created(proof: &Proof, options: &ControllerOptions) -> Result<(), Error> {
    let max_delta = match options.max_timestamp_delta {
        Some(max_delta) => max_delta,
        None => return Ok(()),
    };
    let created = proof.created.ok_or(Error::MissingCreated)?;
    let date = options.date.unwrap_or_else(Utc::now);
    let delta = if created > date {
        created - date
    } else {
        date - created
    };
    if delta > max_delta {
        return Err(Error::ClockSkew {
            created: date_to_iso_string(&created),
            date: date_to_iso_string(&date),
        });
    }
    Ok(())
}

/// Absolute form of a verification relationship entry: `#fragment`
/// references resolve against the controller document id.
fn absolute_method_id(controller_id: &str, id: &str) -> String {
    if id.starts_with('#') {
        format!("{}{}", controller_id, id)
    } else {
        id.to_string()
    }
}

fn lists_method(
    controller_document: &Value,
    controller_id: &str,
    term: &str,
    vm_id: &str,
) -> bool {
    let listed = |id: &str| absolute_method_id(controller_id, id) == vm_id;
    let methods = match controller_document.get(term) {
        Some(Value::Array(methods)) => methods.iter().collect::<Vec<_>>(),
        Some(method) => vec![method],
        None => return false,
    };
    methods.into_iter().any(|method| match method {
        Value::String(id) => listed(id.as_str()),
        Value::Object(object) => object.get("id").and_then(Value::as_str).map_or(false, listed),
        _ => false,
    })
}

/// Resolve the controller of the verification method and check that it
/// authorizes the method for `term`. Returns the controller document id.
async fn validate_controller(
    term: &str,
    proof: &Proof,
    context: PurposeContext<'_>,
    options: &ControllerOptions,
    loader: &dyn DocumentLoader,
) -> Result<String, Error> {
    if proof.proof_purpose.as_deref() != Some(term) {
        return Err(Error::ProofPurposeMismatch {
            expected: term.to_string(),
            found: proof.proof_purpose.clone(),
        });
    }
    check_created(proof, options)?;

    let vm = context.verification_method;
    let controller = vm
        .controller
        .as_deref()
        .ok_or_else(|| Error::MissingController(vm.id.clone()))?;
    if let Some(ref expected) = options.controller {
        if expected != controller {
            return Err(Error::ControllerMismatch {
                expected: expected.clone(),
                actual: controller.to_string(),
            });
        }
    }
    let controller_document = loader.load(controller).await?.document;
    let controller_id = controller_document
        .get("id")
        .and_then(Value::as_str)
        .unwrap_or(controller)
        .to_string();
    if !lists_method(&controller_document, &controller_id, term, &vm.id) {
        return Err(Error::VerificationMethodNotAuthorized {
            vm: vm.id.clone(),
            term: term.to_string(),
        });
    }
    log::trace!("{} authorized by {} for {}", vm.id, controller_id, term);
    Ok(controller_id)
}

async fn validate_issuance(
    purpose: &IssuancePurpose,
    proof: &Proof,
    context: PurposeContext<'_>,
    loader: &dyn DocumentLoader,
) -> Result<String, Error> {
    let controller =
        validate_controller(ASSERTION_METHOD, proof, context, &purpose.options, loader).await?;
    match context.issuer {
        Some(issuer) if issuer == controller => Ok(controller),
        issuer => Err(Error::IssuerMismatch {
            issuer: issuer.unwrap_or_default().to_string(),
            controller,
        }),
    }
}

async fn validate_authentication(
    purpose: &AuthenticationPurpose,
    proof: &Proof,
    context: PurposeContext<'_>,
    loader: &dyn DocumentLoader,
) -> Result<String, Error> {
    if proof.proof_purpose.as_deref() == Some(AUTHENTICATION) {
        if proof.challenge.as_ref() != Some(&purpose.challenge) {
            return Err(Error::ChallengeMismatch);
        }
        if let Some(ref domain) = purpose.domain {
            if proof.domain.as_ref() != Some(domain) {
                return Err(Error::DomainMismatch);
            }
        }
    }
    validate_controller(AUTHENTICATION, proof, context, &purpose.options, loader).await
}

/// Purpose configuration as plain data, e.g. from a request body.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
#[serde(deny_unknown_fields)]
pub struct ProofOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub challenge: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub controller: Option<URI>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<DateTime<Utc>>,
    /// Maximum clock skew of a proof's `created`, in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_timestamp_delta: Option<i64>,
}

impl ProofOptions {
    fn controller_options(&self) -> ControllerOptions {
        ControllerOptions {
            controller: self.controller.as_ref().map(ToString::to_string),
            date: self.date,
            max_timestamp_delta: self.max_timestamp_delta.map(chrono::Duration::seconds),
        }
    }

    pub fn issuance_purpose(&self) -> ProofPurpose {
        ProofPurpose::Issuance(IssuancePurpose {
            options: self.controller_options(),
        })
    }

    pub fn authentication_purpose(&self) -> Result<ProofPurpose, ConfigError> {
        let challenge = self
            .challenge
            .as_ref()
            .ok_or(ConfigError::MissingChallenge)?;
        Ok(ProofPurpose::Authentication(AuthenticationPurpose {
            challenge: challenge.clone(),
            domain: self.domain.clone(),
            options: self.controller_options(),
        }))
    }
}
