//! Structural checks of credentials and presentations.
//!
//! These run before any proof is created or verified and never touch the
//! network.

use chrono::prelude::*;

use crate::context::{Context, Version, CREDENTIALS_V1_CONTEXT, CREDENTIALS_V2_CONTEXT};
use crate::date::{date_to_iso_string, is_valid_date, parse_date, timestamp_ms};
use crate::error::Error;
use crate::one_or_many::OneOrMany;
use crate::uri::is_absolute_uri;
use crate::vc::{
    Credential, Evidence, Presentation, VERIFIABLE_CREDENTIAL_TYPE, VERIFIABLE_PRESENTATION_TYPE,
};

/// Whether a document is checked for issuing or for verifying.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Issue,
    Verify,
}

impl Default for Mode {
    fn default() -> Self {
        Mode::Verify
    }
}

/// Options for [`check_credential`].
///
/// Temporal bounds are only checked when `now` is given. In [`Mode::Verify`]
/// both bounds apply; in [`Mode::Issue`] only the lower one does.
#[derive(Debug, Clone, Copy, Default)]
pub struct CheckOptions {
    pub now: Option<DateTime<Utc>>,
    pub mode: Mode,
}

impl CheckOptions {
    pub fn verify_at(now: DateTime<Utc>) -> Self {
        Self {
            now: Some(now),
            mode: Mode::Verify,
        }
    }

    pub fn issue_at(now: Option<DateTime<Utc>>) -> Self {
        Self {
            now,
            mode: Mode::Issue,
        }
    }
}

fn check_uri(property: &str, value: &str) -> Result<(), Error> {
    if is_absolute_uri(value) {
        Ok(())
    } else {
        Err(Error::InvalidURI {
            property: property.to_string(),
            value: value.to_string(),
        })
    }
}

fn check_date(property: &str, value: &str) -> Result<(), Error> {
    if is_valid_date(value) {
        Ok(())
    } else {
        Err(Error::InvalidDate {
            property: property.to_string(),
            value: value.to_string(),
        })
    }
}

fn expected_contexts() -> String {
    format!("\"{}\" or \"{}\"", CREDENTIALS_V1_CONTEXT, CREDENTIALS_V2_CONTEXT)
}

/// Detect the version and require its context URI at `@context[0]`.
fn check_context(contexts: &OneOrMany<Context>) -> Result<Version, Error> {
    let first = contexts.first().ok_or(Error::MissingContext)?;
    let version = crate::context::detect_version(contexts).ok_or_else(|| Error::InvalidContext {
        expected: expected_contexts(),
    })?;
    if first.as_uri() != Some(version.context_url()) {
        return Err(Error::InvalidContext {
            expected: format!("\"{}\"", version.context_url()),
        });
    }
    Ok(version)
}

/// Lower and upper temporal bound of a credential, by property name.
fn temporal_bounds(
    credential: &Credential,
    version: Version,
) -> (Option<(&'static str, &str)>, Option<(&'static str, &str)>) {
    match version {
        Version::V1 => (
            credential
                .issuance_date
                .as_ref()
                .and_then(OneOrMany::to_single)
                .map(|date| ("issuanceDate", date.as_str())),
            credential
                .expiration_date
                .as_deref()
                .map(|date| ("expirationDate", date)),
        ),
        Version::V2 => (
            credential
                .valid_from
                .as_deref()
                .map(|date| ("validFrom", date)),
            credential
                .valid_until
                .as_deref()
                .map(|date| ("validUntil", date)),
        ),
    }
}

fn check_temporal(
    credential: &Credential,
    version: Version,
    now: &DateTime<Utc>,
    mode: Mode,
) -> Result<(), Error> {
    let (lower, upper) = temporal_bounds(credential, version);
    let now_ms = timestamp_ms(now);
    if let Some((property, value)) = lower {
        let bound = parse_date(value).map_err(|_| Error::InvalidDate {
            property: property.to_string(),
            value: value.to_string(),
        })?;
        if now_ms < timestamp_ms(&bound) {
            return Err(Error::NotYetValid {
                property: property.to_string(),
                now: date_to_iso_string(now),
                bound: date_to_iso_string(&bound),
            });
        }
    }
    if mode == Mode::Verify {
        if let Some((property, value)) = upper {
            let bound = parse_date(value).map_err(|_| Error::InvalidDate {
                property: property.to_string(),
                value: value.to_string(),
            })?;
            if now_ms > timestamp_ms(&bound) {
                return Err(Error::Expired {
                    property: property.to_string(),
                    now: date_to_iso_string(now),
                    bound: date_to_iso_string(&bound),
                });
            }
        }
    }
    Ok(())
}

fn check_evidence(evidence: &Evidence) -> Result<(), Error> {
    match evidence {
        Evidence::URI(uri) => {
            if !is_absolute_uri(uri) {
                return Err(Error::InvalidEvidence(format!("must be a URI: \"{}\".", uri)));
            }
        }
        Evidence::Object(object) => match object.get("id") {
            None => {}
            Some(serde_json::Value::String(id)) if is_absolute_uri(id) => {}
            Some(id) => {
                return Err(Error::InvalidEvidence(format!(
                    "\"id\" must be a URI: {}.",
                    id
                )))
            }
        },
    }
    Ok(())
}

/// Check that a credential has the shape required by its data model version.
pub fn check_credential(credential: &Credential, options: &CheckOptions) -> Result<(), Error> {
    let version = check_context(&credential.context)?;

    if credential.type_.is_empty() {
        return Err(Error::MissingType);
    }
    if !credential
        .type_
        .any(|type_| type_ == VERIFIABLE_CREDENTIAL_TYPE)
    {
        return Err(Error::MissingTypeVerifiableCredential);
    }
    if let Some(ref id) = credential.id {
        check_uri("id", id)?;
    }

    let subjects = match credential.credential_subject {
        Some(ref subjects) if !subjects.is_empty() => subjects,
        _ => return Err(Error::MissingCredentialSubject),
    };
    for subject in subjects {
        if !subject.makes_claim() {
            return Err(Error::EmptyCredentialSubject);
        }
        if let Some(ref id) = subject.id {
            check_uri("credentialSubject.id", id)?;
        }
    }

    let issuers = credential.issuer.as_ref().ok_or(Error::MissingIssuer)?;
    let issuer = issuers.to_single().ok_or(Error::IssuerCardinality)?;
    check_uri("issuer", issuer.id())?;

    match version {
        Version::V1 => {
            let issuance_dates = credential
                .issuance_date
                .as_ref()
                .ok_or(Error::MissingIssuanceDate)?;
            let issuance_date = issuance_dates
                .to_single()
                .ok_or(Error::IssuanceDateCardinality)?;
            check_date("issuanceDate", issuance_date)?;
            if let Some(ref expiration_date) = credential.expiration_date {
                check_date("expirationDate", expiration_date)?;
            }
        }
        Version::V2 => {
            if let Some(ref valid_from) = credential.valid_from {
                check_date("validFrom", valid_from)?;
            }
            if let Some(ref valid_until) = credential.valid_until {
                check_date("validUntil", valid_until)?;
            }
        }
    }

    if let Some(ref now) = options.now {
        check_temporal(credential, version, now, options.mode)?;
    }

    if let Some(ref status) = credential.credential_status {
        match (&status.id, &status.type_) {
            (Some(id), Some(_)) => check_uri("credentialStatus.id", id)?,
            _ => return Err(Error::InvalidStatus),
        }
    }
    if let Some(ref evidence) = credential.evidence {
        for evidence in evidence {
            check_evidence(evidence)?;
        }
    }
    Ok(())
}

/// Check the envelope of a presentation. Embedded credentials are not checked here.
pub fn check_presentation(presentation: &Presentation) -> Result<(), Error> {
    let first = presentation.context.first().ok_or(Error::MissingContext)?;
    if first.as_uri().and_then(Version::from_context_url).is_none() {
        return Err(Error::InvalidContext {
            expected: expected_contexts(),
        });
    }
    if presentation.type_.is_empty() {
        return Err(Error::MissingType);
    }
    if !presentation
        .type_
        .any(|type_| type_ == VERIFIABLE_PRESENTATION_TYPE)
    {
        return Err(Error::MissingTypeVerifiablePresentation);
    }
    if let Some(ref id) = presentation.id {
        check_uri("id", id)?;
    }
    if let Some(ref holder) = presentation.holder {
        check_uri("holder", holder)?;
    }
    Ok(())
}
