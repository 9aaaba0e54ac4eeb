use crate::Credential;
use async_trait::async_trait;
use manta_core::utils::Redact;
use manta_core::{Context, ProvideCredential, Result};
use std::fmt::{Debug, Formatter};

/// StaticCredentialProvider provides a credential from PEM key material given at initialization time.
pub struct StaticCredentialProvider {
    user: String,
    pem: String,
}

impl Debug for StaticCredentialProvider {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticCredentialProvider")
            .field("user", &self.user)
            .field("pem", &Redact::from(&self.pem))
            .finish()
    }
}

impl StaticCredentialProvider {
    /// Create a new StaticCredentialProvider with the given user and PEM private key.
    pub fn new(user: &str, pem: &str) -> Self {
        Self {
            user: user.to_string(),
            pem: pem.to_string(),
        }
    }
}

#[async_trait]
impl ProvideCredential for StaticCredentialProvider {
    type Credential = Credential;

    async fn provide_credential(&self, _ctx: &Context) -> Result<Option<Self::Credential>> {
        Credential::from_pem(&self.user, &self.pem).map(Some)
    }
}
