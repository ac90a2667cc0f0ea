use clap::Args;

use crate::state::{AppState, StateError};

/// Print the address secrets are pushed as
#[derive(Args, Debug, Clone)]
pub struct Address;

#[derive(Debug, thiserror::Error)]
pub enum AddressError {
    #[error(transparent)]
    State(#[from] StateError),
}

#[async_trait::async_trait]
impl crate::op::Op for Address {
    type Error = AddressError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let state = AppState::load(ctx.config_path.clone())?;
        Ok(state.load_key()?.address().to_checksum())
    }
}
