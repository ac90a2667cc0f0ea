pub use clap::Parser;

use std::path::PathBuf;
use url::Url;

use crate::state::TeeFramework;

#[derive(Parser, Debug)]
#[command(name = "sms")]
#[command(about = "Check and push secrets on a secret management service")]
pub struct Args {
    /// Path to the sms config directory (defaults to ~/.sms)
    #[arg(long, global = true)]
    pub config_path: Option<PathBuf>,

    /// Service URL, overriding the one configured for the TEE framework
    #[arg(long, global = true)]
    pub sms_url: Option<Url>,

    /// TEE framework whose service to talk to (defaults to the configured one)
    #[arg(long, global = true, value_enum)]
    pub tee_framework: Option<TeeFramework>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: crate::Command,
}
