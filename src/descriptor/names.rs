// Resource naming. Every identifier handed to the provider is derived here so
// the conventions stay in one place.

pub fn application_name(base: &str, env: &str) -> String {
    format!("{base}-{env}")
}

pub fn instance_profile_name(base: &str, env: &str) -> String {
    format!("{base}-{env}-instance-profile")
}

pub fn instance_role_name(base: &str, env: &str) -> String {
    format!("{base}-{env}-instance-role")
}

pub fn service_role_name(base: &str, env: &str) -> String {
    format!("{base}-{env}-service-role")
}

/// Bucket names are global, so the account id is folded in.
pub fn versions_bucket(base: &str, env: &str, account: &str) -> String {
    format!("{base}-{env}-versions-{account}")
}

pub fn assets_bucket(prefix: &str, env: &str) -> String {
    format!("{prefix}-{env}")
}

pub fn secret_path_prefix(base: &str, env: &str) -> String {
    format!("{base}/{env}")
}

pub fn bucket_arn(bucket: &str) -> String {
    format!("arn:aws:s3:::{bucket}")
}

pub fn secret_arn_pattern(region: &str, account: &str, secret_prefix: &str) -> String {
    format!("arn:aws:secretsmanager:{region}:{account}:secret:{secret_prefix}*")
}
