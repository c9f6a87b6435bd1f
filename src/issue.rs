use chrono::prelude::*;

use crate::context::Version;
use crate::date::date_to_seconds_string;
use crate::error::{ConfigError, Error};
use crate::loader::{default_loader, DocumentLoader};
use crate::one_or_many::OneOrMany;
use crate::proofs::LinkedDataProofs;
use crate::purpose::ProofPurpose;
use crate::suite::ProofSuite;
use crate::validation::{check_credential, CheckOptions};
use crate::vc::{Credential, LinkedDataDocument};

/// Options for [`issue`].
#[derive(Default)]
pub struct IssueOptions<'a> {
    pub credential: Option<Credential>,
    pub suite: Option<&'a dyn ProofSuite>,
    /// Defaults to the issuance (`assertionMethod`) purpose.
    pub purpose: Option<ProofPurpose>,
    pub loader: Option<&'a dyn DocumentLoader>,
    /// Issuance time. When given, the credential must not be dated after it.
    pub now: Option<DateTime<Utc>>,
}

/// Validate and sign a credential.
///
/// A version 1.0 credential without `issuanceDate` is dated `now`, in whole
/// seconds. The returned credential carries the new proof after any it had.
pub async fn issue(options: IssueOptions<'_>) -> Result<Credential, Error> {
    let suite = options.suite.ok_or(ConfigError::MissingSuite)?;
    if suite.verification_method().is_none() {
        return Err(ConfigError::MissingVerificationMethod.into());
    }
    let mut credential = options.credential.ok_or(ConfigError::MissingCredential)?;
    let loader = match options.loader {
        Some(loader) => loader,
        None => default_loader(),
    };

    if credential.version() == Some(Version::V1) && credential.issuance_date.is_none() {
        let now = options.now.unwrap_or_else(Utc::now);
        credential.issuance_date = Some(OneOrMany::One(date_to_seconds_string(&now)));
    }
    check_credential(&credential, &CheckOptions::issue_at(options.now))?;

    let purpose = options.purpose.unwrap_or_default();
    log::debug!(
        "issuing credential {:?} for purpose {}",
        credential.id,
        purpose.term()
    );
    let proof = LinkedDataProofs::sign(&credential, suite, &purpose, loader).await?;
    credential.add_proof(proof);
    Ok(credential)
}
