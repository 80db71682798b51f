use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{config::AppSettings, environment::EnvironmentSpec};

pub mod grants;
pub mod names;
pub mod settings;

pub use grants::{access_grants, Access, AccessGrant, GrantTarget};
pub use settings::{baseline_settings, env_var_settings, high_availability_settings, listener_settings};

/// The provider rejects the whole environment if this drifts from its catalog,
/// and only at apply time.
pub fn platform_arn(region: &str, runtime_version: &str) -> String {
    format!(
        "arn:aws:elasticbeanstalk:{region}::platform/Node.js {runtime_version} running on 64bit Amazon Linux 2023"
    )
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionSetting {
    pub namespace: String,
    pub option_name: String,
    pub value: String,
}

impl OptionSetting {
    pub fn new(
        namespace: impl Into<String>,
        option_name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            option_name: option_name.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedNames {
    pub application_name: String,
    pub environment_name: String,
    pub instance_profile_name: String,
    pub instance_role_name: String,
    pub service_role_name: String,
    pub versions_bucket: String,
    pub assets_bucket: String,
    pub platform_arn: String,
    pub secret_path_prefix: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigDescriptor {
    pub application: String,
    pub environment: String,
    pub account_id: String,
    pub region: String,
    pub high_availability: bool,
    pub names: DerivedNames,
    pub settings: Vec<OptionSetting>,
    pub access_grants: Vec<AccessGrant>,
}

impl ConfigDescriptor {
    pub fn setting(&self, namespace: &str, option_name: &str) -> Option<&str> {
        self.settings
            .iter()
            .find(|s| s.namespace == namespace && s.option_name == option_name)
            .map(|s| s.value.as_str())
    }

    pub fn settings_in<'a>(&'a self, namespace: &'a str) -> impl Iterator<Item = &'a OptionSetting> + 'a {
        self.settings.iter().filter(move |s| s.namespace == namespace)
    }
}

pub fn derive_names(app: &AppSettings, spec: &EnvironmentSpec) -> DerivedNames {
    let base = app.application_base_name.as_str();
    let env = spec.name.as_str();

    DerivedNames {
        application_name: names::application_name(base, env),
        environment_name: names::application_name(base, env),
        instance_profile_name: names::instance_profile_name(base, env),
        instance_role_name: names::instance_role_name(base, env),
        service_role_name: names::service_role_name(base, env),
        versions_bucket: names::versions_bucket(base, env, &spec.account_id),
        assets_bucket: names::assets_bucket(&app.assets_prefix, env),
        platform_arn: platform_arn(&spec.region, &spec.runtime_version),
        secret_path_prefix: names::secret_path_prefix(base, env),
    }
}

/// Expand one environment into its descriptor.
///
/// Settings come out in a fixed order: baseline, high-availability block,
/// HTTPS listener, then environment variables in key order. `spec` is
/// expected to have passed [`EnvironmentSpec::validate`].
pub fn build_descriptor(app: &AppSettings, spec: &EnvironmentSpec) -> ConfigDescriptor {
    let names = derive_names(app, spec);

    let mut settings = baseline_settings(spec, &names);
    settings.extend(high_availability_settings(spec));
    settings.extend(listener_settings(spec));
    settings.extend(env_var_settings(spec));

    let access_grants = access_grants(spec, &names);

    debug!(
        environment = %spec.name,
        settings = settings.len(),
        high_availability = spec.high_availability,
        "built descriptor"
    );

    ConfigDescriptor {
        application: app.application_base_name.clone(),
        environment: spec.name.clone(),
        account_id: spec.account_id.clone(),
        region: spec.region.clone(),
        high_availability: spec.high_availability,
        names,
        settings,
        access_grants,
    }
}
