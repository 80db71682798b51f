use std::collections::BTreeSet;

use glob::Pattern;
use tracing::{debug, warn};

use crate::{
    config::{AppSettings, Layer, RegistryFile},
    environment::{EnvMap, EnvironmentSpec},
    error::{ConfigError, Result},
    resolve::Resolver,
};

/// The canonical, ordered set of deployment targets.
///
/// Construction validates everything up front; a registry that exists is
/// one every descriptor can be built from.
#[derive(Debug, Clone)]
pub struct EnvironmentRegistry {
    app: AppSettings,
    specs: Vec<EnvironmentSpec>,
}

impl EnvironmentRegistry {
    pub fn new(app: AppSettings, specs: Vec<EnvironmentSpec>) -> Result<Self> {
        if app.application_base_name.trim().is_empty() {
            return Err(ConfigError::EmptyField {
                environment: "[app]".to_string(),
                field: "application_base_name",
            });
        }

        let mut seen = BTreeSet::new();
        for spec in &specs {
            if !seen.insert(spec.name.as_str()) {
                return Err(ConfigError::DuplicateEnvironment {
                    name: spec.name.clone(),
                });
            }
        }

        for spec in &specs {
            spec.validate()?;
        }

        if specs.is_empty() {
            warn!("registry declares no environments");
        }

        Ok(Self { app, specs })
    }

    pub fn from_config(file: &RegistryFile) -> Result<Self> {
        let app = file.app.settings();
        let mut specs = Vec::with_capacity(file.environments.len());

        for entry in &file.environments {
            let mut layer = file.defaults.clone();
            if let Some(profile) = &entry.profile {
                let p = file
                    .profiles
                    .get(profile)
                    .ok_or_else(|| ConfigError::UnknownProfile {
                        environment: entry.name.clone(),
                        profile: profile.clone(),
                    })?;
                layer = layer.merged(p);
            }
            let layer = layer.merged(&entry.layer);

            let spec = spec_from_layer(&app, file, &entry.name, &layer)?;
            debug!(
                environment = %spec.name,
                account = %spec.account_id,
                profile = entry.profile.as_deref().unwrap_or("-"),
                "resolved environment"
            );
            specs.push(spec);
        }

        Self::new(app, specs)
    }

    pub fn app(&self) -> &AppSettings {
        &self.app
    }

    /// Declaration order.
    pub fn list_environments(&self) -> &[EnvironmentSpec] {
        &self.specs
    }

    pub fn get(&self, name: &str) -> Option<&EnvironmentSpec> {
        self.specs.iter().find(|s| s.name == name)
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    pub fn select(&self, pattern: &Pattern) -> Vec<&EnvironmentSpec> {
        self.specs
            .iter()
            .filter(|s| pattern.matches(&s.name))
            .collect()
    }
}

fn spec_from_layer(
    app: &AppSettings,
    file: &RegistryFile,
    name: &str,
    layer: &Layer,
) -> Result<EnvironmentSpec> {
    let missing = |field: &'static str| ConfigError::MissingField {
        environment: name.to_string(),
        field,
    };

    let account_ref = layer.account.as_deref().ok_or_else(|| missing("account"))?;
    let account_id = file
        .accounts
        .get(account_ref)
        .cloned()
        .unwrap_or_else(|| account_ref.to_string());
    let region = layer.region.clone().ok_or_else(|| missing("region"))?;
    let instance_class = layer
        .instance_class
        .clone()
        .ok_or_else(|| missing("instance_class"))?;
    let runtime_version = layer
        .runtime_version
        .clone()
        .ok_or_else(|| missing("runtime_version"))?;

    let r = Resolver::new(app, name, &account_id, &region).with_runtime(&runtime_version);
    let mut env = EnvMap::new();
    for (k, v) in &layer.env {
        env.insert(k.clone(), r.resolve(v)?);
    }

    let mut spec = EnvironmentSpec::new(name, account_id.clone(), region.clone())
        .with_high_availability(layer.high_availability.unwrap_or(false))
        .with_instance_class(instance_class)
        .with_capacity(layer.min_capacity, layer.max_capacity)
        .with_runtime_version(runtime_version.clone())
        .with_envs(env);
    if let Some(cert) = &layer.certificate_ref {
        spec = spec.with_certificate(cert.clone());
    }

    Ok(spec)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(name: &str) -> EnvironmentSpec {
        EnvironmentSpec::new(name, "335274136775", "us-east-2")
            .with_instance_class("t4g.small")
            .with_runtime_version("24")
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let err = EnvironmentRegistry::new(AppSettings::default(), vec![spec("dev"), spec("dev")])
            .unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateEnvironment { ref name } if name == "dev"));
    }

    #[test]
    fn test_shared_account_allowed() {
        let blue = spec("production-blue").with_account("427814061976", "us-east-2");
        let green = blue.clone().renamed("production-green");
        let reg = EnvironmentRegistry::new(AppSettings::default(), vec![blue, green]).unwrap();
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn test_invalid_spec_fails_whole_registry() {
        let bad = spec("prod")
            .with_high_availability(true)
            .with_capacity(Some(8), Some(2));
        let err = EnvironmentRegistry::new(AppSettings::default(), vec![spec("dev"), bad])
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidCapacity { .. }));
    }

    #[test]
    fn test_declaration_order_and_lookup() {
        let reg = EnvironmentRegistry::new(
            AppSettings::default(),
            vec![spec("zeta"), spec("alpha"), spec("mid")],
        )
        .unwrap();
        let names: Vec<_> = reg.list_environments().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["zeta", "alpha", "mid"]);
        assert!(reg.get("alpha").is_some());
        assert!(reg.get("nope").is_none());
    }

    #[test]
    fn test_select_by_glob() {
        let reg = EnvironmentRegistry::new(
            AppSettings::default(),
            vec![spec("dev"), spec("production-blue"), spec("production-green")],
        )
        .unwrap();
        let picked = reg.select(&Pattern::new("production-*").unwrap());
        assert_eq!(picked.len(), 2);
        assert!(reg.select(&Pattern::new("qa").unwrap()).is_empty());
    }

    #[test]
    fn test_from_embedded_config() {
        let file = RegistryFile::embedded().unwrap();
        let reg = EnvironmentRegistry::from_config(&file).unwrap();

        let names: Vec<_> = reg.list_environments().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(
            names,
            ["dev", "staging", "sandbox", "production-blue", "production-green"]
        );

        let dev = reg.get("dev").unwrap();
        assert_eq!(dev.account_id, "335274136775");
        assert!(!dev.high_availability);
        assert_eq!(dev.instance_class, "t4g.small");
        assert_eq!(dev.environment_variables["NODE_ENV"], "development");
        assert_eq!(dev.environment_variables["S3_BUCKET"], "breederhq-assets-dev");
        assert_eq!(dev.environment_variables["AWS_REGION"], "us-east-2");
        assert_eq!(dev.environment_variables["AWS_SECRET_NAME"], "breederhq-api/dev");
        assert_eq!(dev.environment_variables["APP_URL"], "https://dev.breederhq.com");
        assert_eq!(dev.environment_variables["RESEND_FROM_NAME"], "BreederHQ (dev)");

        let blue = reg.get("production-blue").unwrap();
        let green = reg.get("production-green").unwrap();
        assert_eq!(blue.account_id, "427814061976");
        assert_eq!(blue.account_id, green.account_id);
        assert!(blue.high_availability);
        assert_eq!(blue.effective_capacity(), (1, 10));
        assert_eq!(blue.instance_class, "t4g.medium");
        assert_eq!(blue.environment_variables["LOG_LEVEL"], "warn");
        assert_eq!(green.environment_variables["S3_BUCKET"], "breederhq-assets-production-green");
        assert_eq!(green.environment_variables["APP_URL"], "https://app.breederhq.com");
        assert_eq!(green.environment_variables["AWS_SECRET_NAME"], "breederhq-api/production-green");
    }

    #[test]
    fn test_from_config_errors() {
        let unknown_profile = r#"
            [app]
            name = "shop"
            [[environments]]
            name = "dev"
            profile = "nope"
        "#;
        let file = RegistryFile::from_toml_str(unknown_profile, "test").unwrap();
        assert!(matches!(
            EnvironmentRegistry::from_config(&file).unwrap_err(),
            ConfigError::UnknownProfile { .. }
        ));

        let missing_region = r#"
            [app]
            name = "shop"
            [[environments]]
            name = "dev"
            account = "123456789012"
            instance_class = "t4g.small"
            runtime_version = "24"
        "#;
        let file = RegistryFile::from_toml_str(missing_region, "test").unwrap();
        assert!(matches!(
            EnvironmentRegistry::from_config(&file).unwrap_err(),
            ConfigError::MissingField { field: "region", .. }
        ));

        let duplicate = r#"
            [app]
            name = "shop"
            [defaults]
            account = "123456789012"
            region = "eu-west-1"
            instance_class = "t4g.small"
            runtime_version = "22"
            [[environments]]
            name = "dev"
            [[environments]]
            name = "dev"
        "#;
        let file = RegistryFile::from_toml_str(duplicate, "test").unwrap();
        assert!(matches!(
            EnvironmentRegistry::from_config(&file).unwrap_err(),
            ConfigError::DuplicateEnvironment { .. }
        ));
    }

    #[test]
    fn test_literal_account_and_bad_token() {
        let text = r#"
            [app]
            name = "shop"
            [defaults]
            account = "123456789012"
            region = "eu-west-1"
            instance_class = "t4g.small"
            runtime_version = "22"
            [[environments]]
            name = "qa"
            [environments.env]
            SECRET_NAME = "{secret_path}"
        "#;
        let file = RegistryFile::from_toml_str(text, "test").unwrap();
        let reg = EnvironmentRegistry::from_config(&file).unwrap();
        let qa = reg.get("qa").unwrap();
        assert_eq!(qa.account_id, "123456789012");
        assert_eq!(qa.environment_variables["SECRET_NAME"], "shop/qa");

        let bad = text.replace("{secret_path}", "{bogus}");
        let file = RegistryFile::from_toml_str(&bad, "test").unwrap();
        assert!(matches!(
            EnvironmentRegistry::from_config(&file).unwrap_err(),
            ConfigError::UnknownToken { .. }
        ));
    }

    #[test]
    fn test_blank_certificate_clears_profile_listener() {
        use crate::descriptor::{build_descriptor, settings::NS_HTTPS_LISTENER};

        let text = r#"
            [app]
            name = "shop"
            [defaults]
            account = "123456789012"
            region = "eu-west-1"
            instance_class = "t4g.medium"
            runtime_version = "22"
            [profiles.production]
            high_availability = true
            certificate_ref = "arn:aws:acm:eu-west-1:123456789012:certificate/abc"
            [[environments]]
            name = "production-blue"
            profile = "production"
            [[environments]]
            name = "production-green"
            profile = "production"
            certificate_ref = ""
        "#;
        let file = RegistryFile::from_toml_str(text, "test").unwrap();
        let reg = EnvironmentRegistry::from_config(&file).unwrap();

        let blue = build_descriptor(reg.app(), reg.get("production-blue").unwrap());
        assert_eq!(blue.settings_in(NS_HTTPS_LISTENER).count(), 3);

        let green = build_descriptor(reg.app(), reg.get("production-green").unwrap());
        assert_eq!(green.settings_in(NS_HTTPS_LISTENER).count(), 0);
        assert!(green.settings.iter().all(|s| s.option_name != "SSLCertificateId"));
    }
}
