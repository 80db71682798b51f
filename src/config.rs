use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    fmt,
    path::{Path, PathBuf},
};
use tracing::debug;

use crate::{
    environment::EnvMap,
    error::{ConfigError, Result},
};

pub const CONFIG_ENV_VAR: &str = "EBSYNTH_CONFIG";
pub const CONFIG_FILE_NAME: &str = "environments.toml";

const EMBEDDED_REGISTRY: &str = include_str!("../assets/environments.toml");

/// Application-wide naming inputs shared by every environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppSettings {
    pub application_base_name: String,
    pub assets_prefix: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            application_base_name: "app".to_string(),
            assets_prefix: "app-assets".to_string(),
        }
    }
}

/// The registry file as written on disk.
#[derive(Debug, Clone, Deserialize)]
pub struct RegistryFile {
    pub app: AppSection,

    #[serde(default)]
    pub defaults: Layer,

    /// Alias → account id. Environments may name an alias or a literal id.
    #[serde(default)]
    pub accounts: BTreeMap<String, String>,

    #[serde(default)]
    pub profiles: BTreeMap<String, Layer>,

    #[serde(default)]
    pub environments: Vec<EnvironmentEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppSection {
    pub name: String,

    /// Defaults to `{name}-assets`.
    #[serde(default)]
    pub assets_prefix: Option<String>,
}

impl AppSection {
    pub fn settings(&self) -> AppSettings {
        AppSettings {
            application_base_name: self.name.clone(),
            assets_prefix: self
                .assets_prefix
                .clone()
                .unwrap_or_else(|| format!("{}-assets", self.name)),
        }
    }
}

/// A partial environment record. `[defaults]`, each `[profiles.*]` and each
/// `[[environments]]` entry are layers; later layers win field by field and
/// `env` maps merge key by key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Layer {
    #[serde(default)]
    pub account: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub high_availability: Option<bool>,
    #[serde(default)]
    pub instance_class: Option<String>,
    #[serde(default)]
    pub min_capacity: Option<u32>,
    #[serde(default)]
    pub max_capacity: Option<u32>,
    #[serde(default)]
    pub runtime_version: Option<String>,
    #[serde(default)]
    pub certificate_ref: Option<String>,
    #[serde(default)]
    pub env: EnvMap,
}

impl Layer {
    pub fn merged(&self, over: &Layer) -> Layer {
        let mut env = self.env.clone();
        env.extend(over.env.iter().map(|(k, v)| (k.clone(), v.clone())));

        Layer {
            account: over.account.clone().or_else(|| self.account.clone()),
            region: over.region.clone().or_else(|| self.region.clone()),
            high_availability: over.high_availability.or(self.high_availability),
            instance_class: over
                .instance_class
                .clone()
                .or_else(|| self.instance_class.clone()),
            min_capacity: over.min_capacity.or(self.min_capacity),
            max_capacity: over.max_capacity.or(self.max_capacity),
            runtime_version: over
                .runtime_version
                .clone()
                .or_else(|| self.runtime_version.clone()),
            certificate_ref: over
                .certificate_ref
                .clone()
                .or_else(|| self.certificate_ref.clone()),
            env,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct EnvironmentEntry {
    pub name: String,

    /// Name of a `[profiles.*]` table to layer between `[defaults]` and this entry.
    #[serde(default)]
    pub profile: Option<String>,

    #[serde(flatten)]
    pub layer: Layer,
}

impl RegistryFile {
    pub fn from_toml_str(text: &str, origin: &str) -> Result<Self> {
        toml::from_str(text).map_err(|source| ConfigError::Parse {
            origin: origin.to_string(),
            source,
        })
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text, &path.display().to_string())
    }

    pub fn embedded() -> Result<Self> {
        Self::from_toml_str(EMBEDDED_REGISTRY, "<embedded>")
    }

    pub fn load(source: &RegistrySource) -> Result<Self> {
        match source {
            RegistrySource::File(p) => Self::load_from_path(p),
            RegistrySource::Embedded => Self::embedded(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrySource {
    File(PathBuf),
    Embedded,
}

impl fmt::Display for RegistrySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistrySource::File(p) => write!(f, "{}", p.display()),
            RegistrySource::Embedded => write!(f, "<embedded>"),
        }
    }
}

pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("ebsynth").join(CONFIG_FILE_NAME))
}

/// Registry path precedence:
/// 1) CLI --config (must exist)
/// 2) EBSYNTH_CONFIG (must exist)
/// 3) ./environments.toml
/// 4) user config dir, ebsynth/environments.toml
/// 5) the registry compiled into the binary
pub fn locate_registry(cli_config: Option<&Path>) -> Result<RegistrySource> {
    let env_config = std::env::var(CONFIG_ENV_VAR)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .map(PathBuf::from);

    locate_registry_from(
        cli_config,
        env_config.as_deref(),
        Path::new("."),
        user_config_path().as_deref(),
    )
}

pub(crate) fn locate_registry_from(
    cli_config: Option<&Path>,
    env_config: Option<&Path>,
    cwd: &Path,
    user_config: Option<&Path>,
) -> Result<RegistrySource> {
    for (origin, p) in [("--config", cli_config), (CONFIG_ENV_VAR, env_config)] {
        if let Some(p) = p {
            if !p.exists() {
                return Err(ConfigError::Io {
                    path: p.to_path_buf(),
                    source: std::io::Error::new(
                        std::io::ErrorKind::NotFound,
                        format!("{origin} points at a file that does not exist"),
                    ),
                });
            }
            debug!(path = %p.display(), origin, "using registry file");
            return Ok(RegistrySource::File(p.to_path_buf()));
        }
    }

    let local = cwd.join(CONFIG_FILE_NAME);
    if local.is_file() {
        debug!(path = %local.display(), "using registry file from working directory");
        return Ok(RegistrySource::File(local));
    }

    if let Some(p) = user_config.filter(|p| p.is_file()) {
        debug!(path = %p.display(), "using registry file from user config dir");
        return Ok(RegistrySource::File(p.to_path_buf()));
    }

    debug!("using embedded registry");
    Ok(RegistrySource::Embedded)
}
