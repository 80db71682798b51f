use serde::{Deserialize, Serialize};

use crate::environment::EnvironmentSpec;

use super::{names, DerivedNames};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrantTarget {
    VersionsBucket,
    AssetsBucket,
    Secrets,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Access {
    Read,
    Write,
    Delete,
    List,
}

/// Declared access intent of the instance role towards one storage area or
/// secret path. Rendered into an inline role policy by the template emitter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessGrant {
    pub target: GrantTarget,
    pub access: Vec<Access>,
    pub actions: Vec<String>,
    pub resources: Vec<String>,
}

pub fn access_grants(spec: &EnvironmentSpec, derived: &DerivedNames) -> Vec<AccessGrant> {
    let versions_arn = names::bucket_arn(&derived.versions_bucket);
    let assets_arn = names::bucket_arn(&derived.assets_bucket);

    vec![
        AccessGrant {
            target: GrantTarget::VersionsBucket,
            access: vec![Access::Read, Access::Write],
            actions: strings(&["s3:GetObject", "s3:PutObject"]),
            resources: vec![format!("{versions_arn}/*")],
        },
        AccessGrant {
            target: GrantTarget::AssetsBucket,
            access: vec![Access::Read, Access::Write, Access::Delete, Access::List],
            actions: strings(&[
                "s3:GetObject",
                "s3:PutObject",
                "s3:DeleteObject",
                "s3:ListBucket",
            ]),
            resources: vec![assets_arn.clone(), format!("{assets_arn}/*")],
        },
        AccessGrant {
            target: GrantTarget::Secrets,
            access: vec![Access::Read],
            actions: strings(&["secretsmanager:GetSecretValue"]),
            resources: vec![names::secret_arn_pattern(
                &spec.region,
                &spec.account_id,
                &derived.secret_path_prefix,
            )],
        },
    ]
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
