use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;

use crate::error::{ConfigError, Result};

pub type EnvMap = BTreeMap<String, String>;

pub const DEFAULT_MIN_CAPACITY: u32 = 2;
pub const DEFAULT_MAX_CAPACITY: u32 = 4;

/// One deployment target.
///
/// Records are built with [`EnvironmentSpec::new`] and the consuming `with_*`
/// helpers, so a shared base (e.g. the production blue/green pair) is cloned
/// and overridden instead of mutated in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentSpec {
    pub name: String,
    pub account_id: String,
    pub region: String,
    pub high_availability: bool,
    pub instance_class: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_capacity: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_capacity: Option<u32>,
    pub runtime_version: String,
    #[serde(default)]
    pub environment_variables: EnvMap,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate_ref: Option<String>,
}

impl EnvironmentSpec {
    pub fn new(
        name: impl Into<String>,
        account_id: impl Into<String>,
        region: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            account_id: account_id.into(),
            region: region.into(),
            high_availability: false,
            instance_class: String::new(),
            min_capacity: None,
            max_capacity: None,
            runtime_version: String::new(),
            environment_variables: EnvMap::new(),
            certificate_ref: None,
        }
    }

    pub fn renamed(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_account(mut self, account_id: impl Into<String>, region: impl Into<String>) -> Self {
        self.account_id = account_id.into();
        self.region = region.into();
        self
    }

    pub fn with_high_availability(mut self, on: bool) -> Self {
        self.high_availability = on;
        self
    }

    pub fn with_instance_class(mut self, class: impl Into<String>) -> Self {
        self.instance_class = class.into();
        self
    }

    pub fn with_capacity(mut self, min: Option<u32>, max: Option<u32>) -> Self {
        self.min_capacity = min;
        self.max_capacity = max;
        self
    }

    pub fn with_runtime_version(mut self, version: impl Into<String>) -> Self {
        self.runtime_version = version.into();
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.environment_variables.insert(key.into(), value.into());
        self
    }

    pub fn with_envs<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.environment_variables
            .extend(vars.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn with_certificate(mut self, certificate_ref: impl Into<String>) -> Self {
        self.certificate_ref = Some(certificate_ref.into());
        self
    }

    /// Capacity bounds after defaults are applied.
    pub fn effective_capacity(&self) -> (u32, u32) {
        (
            self.min_capacity.unwrap_or(DEFAULT_MIN_CAPACITY),
            self.max_capacity.unwrap_or(DEFAULT_MAX_CAPACITY),
        )
    }

    /// A blank reference counts as no certificate, so an environment entry can
    /// clear one inherited from its profile with `certificate_ref = ""`.
    pub fn certificate(&self) -> Option<&str> {
        self.certificate_ref
            .as_deref()
            .filter(|c| !c.trim().is_empty())
    }

    /// The certificate only counts when there is a load balancer to attach it to.
    pub fn secure_listener_certificate(&self) -> Option<&str> {
        if self.high_availability {
            self.certificate()
        } else {
            None
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::EmptyField {
                environment: self.name.clone(),
                field: "name",
            });
        }

        let required = [
            ("account_id", &self.account_id),
            ("region", &self.region),
            ("instance_class", &self.instance_class),
            ("runtime_version", &self.runtime_version),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::EmptyField {
                    environment: self.name.clone(),
                    field,
                });
            }
        }

        if self.high_availability {
            let (min, max) = self.effective_capacity();
            if min > max {
                return Err(ConfigError::InvalidCapacity {
                    environment: self.name.clone(),
                    min,
                    max,
                });
            }
        } else {
            if self.certificate().is_some() {
                warn!(
                    environment = %self.name,
                    "certificate_ref ignored: single-instance environments have no load balancer"
                );
            }
            if self.min_capacity.is_some() || self.max_capacity.is_some() {
                warn!(
                    environment = %self.name,
                    "capacity bounds ignored: environment is not high-availability"
                );
            }
        }

        Ok(())
    }
}
