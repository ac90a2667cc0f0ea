use std::{fs, path::PathBuf};

use clap::ValueEnum;
use common::prelude::WalletKey;
use serde::{Deserialize, Serialize};
use url::Url;

pub const APP_NAME: &str = "sms";
pub const CONFIG_FILE_NAME: &str = "config.toml";
pub const KEY_FILE_NAME: &str = "key.pem";

const DEFAULT_SCONE_SMS_URL: &str = "https://sms.scone.v8-bellecour.iex.ec";
const DEFAULT_GRAMINE_SMS_URL: &str = "https://sms.gramine.v8-bellecour.iex.ec";

/// Trusted execution framework a task runs under; each has its own SMS
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TeeFramework {
    #[default]
    Scone,
    Gramine,
}

impl std::fmt::Display for TeeFramework {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TeeFramework::Scone => write!(f, "scone"),
            TeeFramework::Gramine => write!(f, "gramine"),
        }
    }
}

/// Service URL per TEE framework
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmsUrls {
    #[serde(default = "default_scone_url")]
    pub scone: Url,
    #[serde(default = "default_gramine_url")]
    pub gramine: Url,
}

impl SmsUrls {
    pub fn for_framework(&self, framework: TeeFramework) -> &Url {
        match framework {
            TeeFramework::Scone => &self.scone,
            TeeFramework::Gramine => &self.gramine,
        }
    }
}

impl Default for SmsUrls {
    fn default() -> Self {
        Self {
            scone: default_scone_url(),
            gramine: default_gramine_url(),
        }
    }
}

fn default_scone_url() -> Url {
    Url::parse(DEFAULT_SCONE_SMS_URL).expect("hardcoded URL must parse")
}

fn default_gramine_url() -> Url {
    Url::parse(DEFAULT_GRAMINE_SMS_URL).expect("hardcoded URL must parse")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Framework used when none is given on the command line
    #[serde(default)]
    pub tee_framework: TeeFramework,
    /// Per-request timeout for calls to the service
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub sms: SmsUrls,
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            tee_framework: TeeFramework::default(),
            timeout_secs: default_timeout_secs(),
            sms: SmsUrls::default(),
        }
    }
}

impl AppConfig {
    /// Service URL for `framework`, or for the configured one
    pub fn sms_url(&self, framework: Option<TeeFramework>) -> &Url {
        self.sms.for_framework(framework.unwrap_or(self.tee_framework))
    }
}

#[derive(Debug, Clone)]
pub struct AppState {
    /// Path to the sms directory (~/.sms)
    pub sms_dir: PathBuf,
    /// Path to the wallet key PEM file
    pub key_path: PathBuf,
    /// Path to the config file
    pub config_path: PathBuf,
    /// Loaded configuration
    pub config: AppConfig,
}

impl AppState {
    /// Get the sms directory path (custom or default ~/.sms)
    pub fn sms_dir(custom_path: Option<PathBuf>) -> Result<PathBuf, StateError> {
        if let Some(path) = custom_path {
            return Ok(path);
        }

        let home = dirs::home_dir().ok_or(StateError::NoHomeDirectory)?;
        Ok(home.join(format!(".{}", APP_NAME)))
    }

    /// Initialize a new state directory holding `key` and `config`
    pub fn init(
        custom_path: Option<PathBuf>,
        key: &WalletKey,
        config: Option<AppConfig>,
    ) -> Result<Self, StateError> {
        let sms_dir = Self::sms_dir(custom_path)?;

        if sms_dir.exists() {
            return Err(StateError::AlreadyInitialized);
        }

        fs::create_dir_all(&sms_dir)?;

        let key_path = sms_dir.join(KEY_FILE_NAME);
        fs::write(&key_path, key.to_pem())?;

        let config = config.unwrap_or_default();
        let config_path = sms_dir.join(CONFIG_FILE_NAME);
        fs::write(&config_path, toml::to_string_pretty(&config)?)?;

        Ok(Self {
            sms_dir,
            key_path,
            config_path,
            config,
        })
    }

    /// Load existing state from the sms directory
    pub fn load(custom_path: Option<PathBuf>) -> Result<Self, StateError> {
        let sms_dir = Self::sms_dir(custom_path)?;

        if !sms_dir.exists() {
            return Err(StateError::NotInitialized);
        }

        let key_path = sms_dir.join(KEY_FILE_NAME);
        let config_path = sms_dir.join(CONFIG_FILE_NAME);

        if !key_path.exists() {
            return Err(StateError::MissingFile(KEY_FILE_NAME.to_string()));
        }
        if !config_path.exists() {
            return Err(StateError::MissingFile(CONFIG_FILE_NAME.to_string()));
        }

        let config_toml = fs::read_to_string(&config_path)?;
        let config: AppConfig = toml::from_str(&config_toml)?;

        Ok(Self {
            sms_dir,
            key_path,
            config_path,
            config,
        })
    }

    /// Load the wallet key from the key file
    pub fn load_key(&self) -> Result<WalletKey, StateError> {
        let pem = fs::read_to_string(&self.key_path)?;
        let key = WalletKey::from_pem(&pem).map_err(|e| StateError::InvalidKey(e.to_string()))?;
        Ok(key)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("sms directory not initialized. Run 'sms init' first")]
    NotInitialized,

    #[error("sms directory already initialized")]
    AlreadyInitialized,

    #[error("no home directory found")]
    NoHomeDirectory,

    #[error("missing required file: {0}")]
    MissingFile(String),

    #[error("invalid key: {0}")]
    InvalidKey(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("TOML deserialization error: {0}")]
    TomlDe(#[from] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALICE_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    #[test]
    fn test_default_urls_parse() {
        let urls = SmsUrls::default();
        assert_eq!(urls.scone.as_str(), "https://sms.scone.v8-bellecour.iex.ec/");
        assert_eq!(
            urls.gramine.as_str(),
            "https://sms.gramine.v8-bellecour.iex.ec/"
        );
    }

    #[test]
    fn test_sms_url_follows_framework() {
        let config = AppConfig {
            tee_framework: TeeFramework::Gramine,
            ..Default::default()
        };
        assert_eq!(config.sms_url(None), &config.sms.gramine);
        assert_eq!(config.sms_url(Some(TeeFramework::Scone)), &config.sms.scone);
    }

    #[test]
    fn test_init_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state");
        let key = WalletKey::from_hex(ALICE_KEY).unwrap();
        let config = AppConfig {
            tee_framework: TeeFramework::Gramine,
            timeout_secs: 5,
            ..Default::default()
        };

        let state = AppState::init(Some(path.clone()), &key, Some(config.clone())).unwrap();
        assert!(state.key_path.exists());
        assert!(state.config_path.exists());

        let loaded = AppState::load(Some(path)).unwrap();
        assert_eq!(loaded.config, config);
        assert_eq!(loaded.load_key().unwrap().address(), key.address());
    }

    #[test]
    fn test_init_twice_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state");
        let key = WalletKey::generate();

        AppState::init(Some(path.clone()), &key, None).unwrap();
        let err = AppState::init(Some(path), &key, None).unwrap_err();
        assert!(matches!(err, StateError::AlreadyInitialized));
    }

    #[test]
    fn test_load_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let err = AppState::load(Some(dir.path().join("nope"))).unwrap_err();
        assert!(matches!(err, StateError::NotInitialized));
    }

    #[test]
    fn test_load_missing_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state");
        AppState::init(Some(path.clone()), &WalletKey::generate(), None).unwrap();
        fs::remove_file(path.join(KEY_FILE_NAME)).unwrap();

        let err = AppState::load(Some(path)).unwrap_err();
        assert!(matches!(err, StateError::MissingFile(f) if f == KEY_FILE_NAME));
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            tee_framework = "gramine"

            [sms]
            gramine = "https://sms.example.com"
            "#,
        )
        .unwrap();
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.sms.scone, SmsUrls::default().scone);
        assert_eq!(config.sms_url(None).as_str(), "https://sms.example.com/");
    }
}
