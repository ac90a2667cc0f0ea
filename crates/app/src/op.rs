use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use sms::{ReqwestTransport, SecretExistenceCache, SmsClient, TransportError};
use url::Url;

use crate::state::{AppConfig, AppState, StateError, TeeFramework};

/// Resolve the service URL.
///
/// Priority: explicit `--sms-url` > `--tee-framework` > configured framework.
pub fn resolve_sms_url(
    explicit: Option<&Url>,
    framework: Option<TeeFramework>,
    config: &AppConfig,
) -> Url {
    match explicit {
        Some(url) => url.clone(),
        None => config.sms_url(framework).clone(),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ContextError {
    #[error(transparent)]
    State(#[from] StateError),

    #[error("failed to build http client: {0}")]
    Transport(#[from] TransportError),
}

#[derive(Clone)]
pub struct OpContext {
    /// Optional custom config path (defaults to ~/.sms)
    pub config_path: Option<PathBuf>,
    /// Overrides the configured service URL
    pub sms_url: Option<Url>,
    /// Overrides the configured TEE framework
    pub tee_framework: Option<TeeFramework>,
    /// Shared by every client this context hands out
    pub cache: SecretExistenceCache,
}

impl OpContext {
    pub fn new(
        config_path: Option<PathBuf>,
        sms_url: Option<Url>,
        tee_framework: Option<TeeFramework>,
    ) -> Self {
        Self {
            config_path,
            sms_url,
            tee_framework,
            cache: SecretExistenceCache::new(),
        }
    }

    /// Configuration from the state directory, or defaults if there is none.
    ///
    /// Checks work without `sms init`; anything else wrong with the state
    /// directory is still an error.
    pub fn config(&self) -> Result<AppConfig, StateError> {
        match AppState::load(self.config_path.clone()) {
            Ok(state) => Ok(state.config),
            Err(StateError::NotInitialized) => Ok(AppConfig::default()),
            Err(e) => Err(e),
        }
    }

    /// Unsigned client, enough for existence checks
    pub fn client(&self) -> Result<SmsClient, ContextError> {
        let config = self.config()?;
        self.build_client(&config)
    }

    /// Client signing with the wallet key from the state directory
    pub fn signed_client(&self) -> Result<SmsClient, ContextError> {
        let state = AppState::load(self.config_path.clone())?;
        let key = state.load_key()?;
        Ok(self.build_client(&state.config)?.with_signer(Arc::new(key)))
    }

    fn build_client(&self, config: &AppConfig) -> Result<SmsClient, ContextError> {
        let url = resolve_sms_url(self.sms_url.as_ref(), self.tee_framework, config);
        let transport = ReqwestTransport::with_timeout(Duration::from_secs(config.timeout_secs))?;
        tracing::debug!(sms = %url, "using secret management service");
        Ok(SmsClient::new(&url, Arc::new(transport)).with_cache(self.cache.clone()))
    }
}

#[async_trait::async_trait]
pub trait Op: Send + Sync {
    type Error: Error + Send + Sync + 'static;
    type Output;

    async fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error>;
}

#[macro_export]
macro_rules! command_enum {
    ($(($variant:ident, $type:ty)),* $(,)?) => {
        #[derive(Subcommand, Debug, Clone)]
        pub enum Command {
            $($variant($type),)*
        }

        #[derive(Debug)]
        pub enum OpOutput {
            $($variant(<$type as $crate::op::Op>::Output),)*
        }

        #[derive(Debug, thiserror::Error)]
        pub enum OpError {
            $(
                #[error(transparent)]
                $variant(<$type as $crate::op::Op>::Error),
            )*
        }

        #[async_trait::async_trait]
        impl $crate::op::Op for Command {
            type Output = OpOutput;
            type Error = OpError;

            async fn execute(&self, ctx: &$crate::op::OpContext) -> Result<Self::Output, Self::Error> {
                match self {
                    $(
                        Command::$variant(op) => {
                            op.execute(ctx).await
                                .map(OpOutput::$variant)
                                .map_err(OpError::$variant)
                        },
                    )*
                }
            }
        }

        impl std::fmt::Display for OpOutput {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(
                        OpOutput::$variant(output) => write!(f, "{}", output),
                    )*
                }
            }
        }
    };
}
