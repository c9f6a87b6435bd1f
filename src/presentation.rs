use crate::context::Version;
use crate::error::{ConfigError, Error};
use crate::loader::{default_loader, DocumentLoader};
use crate::one_or_many::OneOrMany;
use crate::proofs::LinkedDataProofs;
use crate::purpose::{ProofOptions, ProofPurpose};
use crate::suite::ProofSuite;
use crate::validation::{check_credential, check_presentation, CheckOptions};
use crate::vc::{Credential, LinkedDataDocument, Presentation, VERIFIABLE_PRESENTATION_TYPE};

/// Options for [`create_presentation`].
#[derive(Debug, Clone, Default)]
pub struct PresentationOptions {
    pub verifiable_credential: Option<OneOrMany<Credential>>,
    pub id: Option<String>,
    pub holder: Option<String>,
    /// Data model version of the envelope. Defaults to the latest.
    pub version: Option<Version>,
}

/// Wrap credentials into an unsigned presentation.
///
/// Every credential must pass [`check_credential`] (without temporal
/// bounds), and so must the resulting envelope.
pub fn create_presentation(options: PresentationOptions) -> Result<Presentation, Error> {
    let version = options.version.unwrap_or_default();
    let credentials = options.verifiable_credential.map(OneOrMany::into_vec);
    if let Some(ref credentials) = credentials {
        for credential in credentials {
            check_credential(credential, &CheckOptions::default())?;
        }
    }
    let presentation = Presentation {
        context: version.contexts(),
        id: options.id,
        type_: OneOrMany::Many(vec![VERIFIABLE_PRESENTATION_TYPE.to_string()]),
        holder: options.holder,
        verifiable_credential: credentials.map(OneOrMany::Many),
        proof: None,
        property_set: None,
    };
    check_presentation(&presentation)?;
    Ok(presentation)
}

/// Options for [`sign_presentation`].
#[derive(Default)]
pub struct SignPresentationOptions<'a> {
    pub presentation: Presentation,
    pub suite: Option<&'a dyn ProofSuite>,
    /// Defaults to the authentication purpose built from `proof_options`.
    pub purpose: Option<ProofPurpose>,
    pub proof_options: ProofOptions,
    pub loader: Option<&'a dyn DocumentLoader>,
}

/// Sign a presentation, by default for authentication with a challenge.
pub async fn sign_presentation(options: SignPresentationOptions<'_>) -> Result<Presentation, Error> {
    let suite = options.suite.ok_or(ConfigError::MissingSuite)?;
    if suite.verification_method().is_none() {
        return Err(ConfigError::MissingVerificationMethod.into());
    }
    let purpose = match options.purpose {
        Some(purpose) => purpose,
        None => options.proof_options.authentication_purpose()?,
    };
    let loader = match options.loader {
        Some(loader) => loader,
        None => default_loader(),
    };
    let mut presentation = options.presentation;
    check_presentation(&presentation)?;
    log::debug!(
        "signing presentation {:?} for purpose {}",
        presentation.id,
        purpose.term()
    );
    let proof = LinkedDataProofs::sign(&presentation, suite, &purpose, loader).await?;
    presentation.add_proof(proof);
    Ok(presentation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{Context, CREDENTIALS_V1_CONTEXT, CREDENTIALS_V2_CONTEXT};
    use serde_json::json;

    fn credential() -> Credential {
        serde_json::from_value(json!({
            "@context": ["https://www.w3.org/2018/credentials/v1"],
            "id": "urn:uuid:07aa969e-b40d-4c1b-ab46-ded252003ded",
            "type": ["VerifiableCredential"],
            "issuer": "did:example:issuer",
            "issuanceDate": "2020-08-19T21:41:50Z",
            "credentialSubject": {"id": "did:example:holder", "name": "Alice"}
        }))
        .unwrap()
    }

    #[test]
    fn single_credential_becomes_sequence() {
        let presentation = create_presentation(PresentationOptions {
            verifiable_credential: Some(OneOrMany::One(credential())),
            holder: Some("did:example:holder".to_string()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(
            presentation.context,
            OneOrMany::Many(vec![Context::from(CREDENTIALS_V2_CONTEXT)])
        );
        assert_eq!(
            presentation.verifiable_credential,
            Some(OneOrMany::Many(vec![credential()]))
        );
        assert!(check_presentation(&presentation).is_ok());
    }

    #[test]
    fn version_selects_context() {
        let presentation = create_presentation(PresentationOptions {
            version: Some(Version::V1),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(
            presentation.context.first().and_then(Context::as_uri),
            Some(CREDENTIALS_V1_CONTEXT)
        );
        assert!(presentation.verifiable_credential.is_none());
        assert_eq!(
            serde_json::to_value(&presentation).unwrap(),
            json!({
                "@context": [CREDENTIALS_V1_CONTEXT],
                "type": ["VerifiablePresentation"]
            })
        );
    }

    #[test]
    fn invalid_credential_is_rejected() {
        let mut invalid = credential();
        invalid.credential_subject = Some(serde_json::from_value(json!({})).unwrap());
        let err = create_presentation(PresentationOptions {
            verifiable_credential: Some(OneOrMany::Many(vec![credential(), invalid])),
            ..Default::default()
        })
        .unwrap_err();
        assert!(err.to_string().contains("must make a claim"));

        assert!(matches!(
            create_presentation(PresentationOptions {
                holder: Some("holder".to_string()),
                ..Default::default()
            }),
            Err(Error::InvalidURI { .. })
        ));
    }
}
