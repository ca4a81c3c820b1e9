use std::collections::HashMap;
use std::env;
use std::env::current_dir;
use std::fmt::Display;

use config::Config;
use config::ConfigError;
use secrecy::Secret;
use serde::Deserialize;
use serde_aux::field_attributes::deserialize_number_from_string;

use crate::domain::ProtectionConfig;

/// Global configuration, loaded from the `configuration` directory. See
/// `get_configuration`.
#[derive(Deserialize, Clone)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub protection: ProtectionSettings,
}

/// Server configuration
#[derive(Deserialize, Clone)]
pub struct ApplicationSettings {
    /// Should be localhost on dev machine, 0.0.0.0 on prod
    pub host: String,

    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
}

/// The raw (not yet validated) protection settings: which top-level folders
/// require a password, and the realm announced in challenges.
///
/// This is the deserialization target only; the engine consumes the validated
/// `ProtectionConfig` produced by `snapshot`. The folder map is supplied at
/// deploy time -- baked into the config files, or overridden per folder with
/// env vars (`APP_PROTECTION__FOLDERS__docs=pw`; the `config` crate lowercases
/// env keys, so only all-lowercase folder names can be targeted this way --
/// mixed-case folders must live in the yaml files). An empty/absent map simply
/// disables protection.
#[derive(Deserialize, Clone)]
pub struct ProtectionSettings {
    #[serde(default = "default_realm")]
    pub realm: String,

    #[serde(default)]
    pub folders: HashMap<String, Secret<String>>,
}

fn default_realm() -> String {
    "Restricted".to_string()
}

impl ProtectionSettings {
    /// Validate into the immutable snapshot the engine reads on every request.
    /// Bad folder names (embedded `/` etc.) are rejected here, at load time,
    /// rather than silently never matching at request time.
    pub fn snapshot(self) -> Result<ProtectionConfig, anyhow::Error> {
        ProtectionConfig::new(self.realm, self.folders).map_err(anyhow::Error::msg)
    }
}

pub enum Environment {
    Local,
    Production,
}

impl Display for Environment {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Environment::Local => "local",
                Environment::Production => "production",
            }
        )?;
        Ok(())
    }
}

impl TryFrom<String> for Environment {
    type Error = String;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "production" => Ok(Self::Production),
            e => Err(format!("Invalid: {e}")),
        }
    }
}

/// Load yaml configuration files at `<project_root>/configuration`.
///
/// All required fields must be present in these files, otherwise
/// initialisation fails immediately and the server does not start. Folder
/// names are validated later, in `ProtectionSettings::snapshot`.
pub fn get_configuration() -> Result<Settings, ConfigError> {
    let cfg_dir = current_dir()
        .expect("could not get current dir")
        .join("configuration");

    let env: Environment = env::var("APP_ENVIRONMENT")
        .unwrap_or("local".to_string())
        .try_into()
        .expect("could not initiate Environment struct");

    let settings = Config::builder()
        .add_source(config::File::from(cfg_dir.join("base.yaml")))
        .add_source(config::File::from(cfg_dir.join(format!("{env}.yaml"))))
        .add_source(
            // env vars are -always- parsed as String; `serde-aux` is required
            // to parse other types.
            //
            // `APP_APPLICATION__PORT=5001` -> `Settings.application.port`
            // `APP_PROTECTION__FOLDERS__docs=pw` -> one folder password
            // (env keys are lowercased, so this only works for all-lowercase
            // folder names; anything mixed-case must go in the yaml files)
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    settings.try_deserialize::<Settings>()
}
