use std::path::PathBuf;

use clap::Args;
use common::prelude::Address;
use sms::{Ownership, PushOptions, SecretIdentity, SecretKind, SmsError};

use crate::op::ContextError;

#[derive(Args, Debug, Clone)]
pub struct Push {
    /// Secret kind: web3, web2, requester or app
    #[arg(long)]
    pub kind: SecretKind,

    /// Dataset or app address; web2 and requester secrets default to the signer's own
    #[arg(long)]
    pub address: Option<String>,

    /// Secret name (web2 and requester secrets)
    #[arg(long)]
    pub name: Option<String>,

    /// Secret value (or use --value-file)
    #[arg(long, group = "secret_value")]
    pub value: Option<String>,

    /// Read the secret value from a file, pushed byte for byte (or use --value)
    #[arg(long, group = "secret_value")]
    pub value_file: Option<PathBuf>,

    /// Overwrite an existing web2 secret
    #[arg(long)]
    pub force_update: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum PushError {
    #[error(transparent)]
    Context(#[from] ContextError),

    #[error(transparent)]
    Sms(#[from] SmsError),

    #[error("failed to read secret value: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode result: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Either --value or --value-file must be provided")]
    NoValue,

    #[error("--address is required for {0} secrets")]
    NoAddress(SecretKind),
}

impl Push {
    /// Identity to push under; self-service kinds fall back to `signer`
    fn identity(&self, signer: Option<Address>) -> Result<SecretIdentity, PushError> {
        let address = match (&self.address, self.kind.namespace().ownership) {
            (Some(address), _) => address.clone(),
            (None, Ownership::Signer) => signer
                .map(|a| a.to_checksum())
                .ok_or(PushError::NoAddress(self.kind))?,
            (None, Ownership::Resource) => return Err(PushError::NoAddress(self.kind)),
        };
        Ok(SecretIdentity {
            address,
            name: self.name.clone(),
        })
    }

    fn value(&self) -> Result<String, PushError> {
        if let Some(value) = &self.value {
            return Ok(value.clone());
        }
        let path = self.value_file.as_ref().ok_or(PushError::NoValue)?;
        Ok(std::fs::read_to_string(path)?)
    }
}

#[async_trait::async_trait]
impl crate::op::Op for Push {
    type Error = PushError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let value = self.value()?;
        let client = ctx.signed_client()?;
        let identity = self.identity(client.signer_address())?;
        let options = PushOptions {
            force_update: self.force_update,
        };

        let result = client.push(self.kind, &identity, &value, options).await?;
        Ok(serde_json::to_string(&result)?)
    }
}
