use std::env;
use std::process::Command;

/// Run a command and return its trimmed stdout if it succeeded
fn command_output(program: &str, args: &[&str]) -> Option<String> {
    let output = Command::new(program).args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let text = String::from_utf8(output.stdout).ok()?;
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

fn emit(key: &str, value: &str) {
    println!("cargo:rustc-env={key}={value}");
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-env-changed=CI_BUILD_REF");

    let profile = env::var("PROFILE").unwrap_or_else(|_| "unknown".to_string());
    emit("SMS_BUILD_PROFILE", &profile);

    let version = env::var("CI_BUILD_REF")
        .ok()
        .filter(|v| !v.is_empty())
        .or_else(|| command_output("git", &["describe", "--always", "--dirty", "--tags"]))
        .unwrap_or_else(|| env::var("CARGO_PKG_VERSION").unwrap_or_else(|_| "unknown".into()));
    emit("SMS_REPO_VERSION", &version);

    emit("SMS_BUILD_TIMESTAMP", &chrono::Utc::now().to_rfc3339());

    let rustc = command_output("rustc", &["--version"]).unwrap_or_else(|| "unknown".into());
    emit("SMS_RUST_VERSION", &rustc);

    let target = env::var("TARGET").unwrap_or_else(|_| "unknown".to_string());
    emit("SMS_BUILD_TARGET", &target);
}
