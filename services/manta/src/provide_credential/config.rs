use crate::{Config, Credential};
use async_trait::async_trait;
use log::debug;
use manta_core::{Context, ProvideCredential, Result};

/// ConfigCredentialProvider loads the private key named by a [`Config`].
///
/// The key file is read through [`Context::file_read`]. When `key_id` is set
/// it must match the fingerprint of the loaded key.
#[derive(Debug)]
pub struct ConfigCredentialProvider {
    config: Config,
}

impl ConfigCredentialProvider {
    /// Create a new ConfigCredentialProvider.
    pub fn new(config: Config) -> Self {
        Self { config }
    }
}

#[async_trait]
impl ProvideCredential for ConfigCredentialProvider {
    type Credential = Credential;

    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
        let (Some(user), Some(key_path)) = (&self.config.user, self.config.expanded_key_path(ctx)?)
        else {
            debug!("incomplete config, skipping");
            return Ok(None);
        };

        debug!("loading private key for {user} from config");
        let pem = ctx.file_read_as_string(&key_path).await?;
        let cred = Credential::from_pem(user, &pem)?;
        if let Some(key_id) = &self.config.key_id {
            cred.ensure_fingerprint(key_id)?;
        }
        Ok(Some(cred))
    }
}
