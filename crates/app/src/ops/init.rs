use clap::Args;
use common::prelude::{KeyError, WalletKey};
use url::Url;

use crate::state::{AppConfig, AppState, SmsUrls};

#[derive(Args, Debug, Clone)]
pub struct Init {
    /// Import this hex private key instead of generating a new one
    #[arg(long)]
    pub private_key: Option<String>,

    /// SMS URL for the scone framework
    #[arg(long)]
    pub scone_url: Option<Url>,

    /// SMS URL for the gramine framework
    #[arg(long)]
    pub gramine_url: Option<Url>,

    /// Per-request timeout in seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error("init failed: {0}")]
    StateFailed(#[from] crate::state::StateError),

    #[error("invalid private key: {0}")]
    InvalidKey(#[from] KeyError),
}

impl Init {
    fn config(&self, ctx: &crate::op::OpContext) -> AppConfig {
        let defaults = AppConfig::default();
        AppConfig {
            tee_framework: ctx.tee_framework.unwrap_or(defaults.tee_framework),
            timeout_secs: self.timeout_secs.unwrap_or(defaults.timeout_secs),
            sms: SmsUrls {
                scone: self.scone_url.clone().unwrap_or(defaults.sms.scone),
                gramine: self.gramine_url.clone().unwrap_or(defaults.sms.gramine),
            },
        }
    }
}

#[async_trait::async_trait]
impl crate::op::Op for Init {
    type Error = InitError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let key = match &self.private_key {
            Some(hex) => WalletKey::from_hex(hex)?,
            None => WalletKey::generate(),
        };

        let state = AppState::init(ctx.config_path.clone(), &key, Some(self.config(ctx)))?;
        tracing::info!(address = %key.address(), dir = %state.sms_dir.display(), "initialized state");

        let output = format!(
            "Initialized sms directory at: {}\n\
             - Key: {}\n\
             - Config: {}\n\
             - Address: {}\n\
             - TEE framework: {}\n\
             - Scone SMS: {}\n\
             - Gramine SMS: {}",
            state.sms_dir.display(),
            state.key_path.display(),
            state.config_path.display(),
            key.address(),
            state.config.tee_framework,
            state.config.sms.scone,
            state.config.sms.gramine,
        );

        Ok(output)
    }
}
