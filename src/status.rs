use async_trait::async_trait;

use crate::error::Error;
use crate::loader::DocumentLoader;
use crate::vc::Credential;

#[derive(Debug, Clone, Default)]
pub struct StatusResult {
    /// False when the credential is revoked, suspended or its status is unknown.
    pub verified: bool,
    pub error: Option<Error>,
}

impl StatusResult {
    pub fn verified() -> Self {
        Self {
            verified: true,
            error: None,
        }
    }

    pub fn failed(error: Error) -> Self {
        Self {
            verified: false,
            error: Some(error),
        }
    }
}

/// Checks the `credentialStatus` of a credential whose proof already verified.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait StatusChecker: Sync {
    async fn check_status(
        &self,
        credential: &Credential,
        loader: &dyn DocumentLoader,
    ) -> Result<StatusResult, Error>;
}

/// Run a status check, capturing a failed check as an unverified result.
pub async fn check_status(
    checker: &dyn StatusChecker,
    credential: &Credential,
    loader: &dyn DocumentLoader,
) -> StatusResult {
    match checker.check_status(credential, loader).await {
        Ok(result) => result,
        Err(err) => {
            log::warn!("unable to check credential status: {}", err);
            StatusResult::failed(err)
        }
    }
}
