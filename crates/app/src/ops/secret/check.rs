use std::fmt;

use clap::Args;
use sms::{SecretIdentity, SecretKind, SmsError};

use crate::op::ContextError;

#[derive(Args, Debug, Clone)]
pub struct Check {
    /// Secret kind: web3, web2, requester or app
    #[arg(long)]
    pub kind: SecretKind,

    /// Dataset, owner, requester or app address
    #[arg(long)]
    pub address: String,

    /// Secret name (web2 and requester secrets)
    #[arg(long)]
    pub name: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum CheckError {
    #[error(transparent)]
    Context(#[from] ContextError),

    #[error(transparent)]
    Sms(#[from] SmsError),
}

#[derive(Debug)]
pub struct CheckOutput {
    pub kind: SecretKind,
    pub identity: SecretIdentity,
    pub exists: bool,
}

impl fmt::Display for CheckOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} secret for {}", self.kind, self.identity.address)?;
        if let Some(name) = &self.identity.name {
            write!(f, " named `{name}`")?;
        }
        let status = if self.exists { "exists" } else { "not found" };
        write!(f, ": {status}")
    }
}

#[async_trait::async_trait]
impl crate::op::Op for Check {
    type Error = CheckError;
    type Output = CheckOutput;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let client = ctx.client()?;
        let identity = SecretIdentity {
            address: self.address.clone(),
            name: self.name.clone(),
        };

        let exists = client.check_exists(self.kind, &identity).await?;

        Ok(CheckOutput {
            kind: self.kind,
            identity,
            exists,
        })
    }
}
