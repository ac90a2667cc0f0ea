use std::convert::Infallible;

use clap::Args;

#[derive(Args, Debug, Clone)]
pub struct Version;

/// Build metadata recorded by build.rs
pub fn build_info() -> String {
    format!(
        "sms {} ({})\n\
         - Profile: {}\n\
         - Target: {}\n\
         - Built: {}\n\
         - Compiler: {}",
        env!("CARGO_PKG_VERSION"),
        env!("SMS_REPO_VERSION"),
        env!("SMS_BUILD_PROFILE"),
        env!("SMS_BUILD_TARGET"),
        env!("SMS_BUILD_TIMESTAMP"),
        env!("SMS_RUST_VERSION"),
    )
}

#[async_trait::async_trait]
impl crate::op::Op for Version {
    type Error = Infallible;
    type Output = String;

    async fn execute(&self, _ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        Ok(build_info())
    }
}
