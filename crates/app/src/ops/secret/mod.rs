use clap::{Args, Subcommand};

pub mod check;
pub mod push;

use crate::op::Op;

crate::command_enum! {
    (Check, check::Check),
    (Push, push::Push),
}

pub type SecretCommand = Command;

#[derive(Args, Debug, Clone)]
pub struct Secret {
    #[command(subcommand)]
    pub command: SecretCommand,
}

#[async_trait::async_trait]
impl Op for Secret {
    type Error = OpError;
    type Output = OpOutput;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        self.command.execute(ctx).await
    }
}
