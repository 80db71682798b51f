use regex::Regex;
use std::fmt;

use crate::descriptor::ConfigDescriptor;

/// Advisory naming checks against the provider's documented rules.
///
/// Findings never fail synthesis: the provider stays the authority and any
/// real violation surfaces when the descriptor is applied.
pub struct Linter {
    bucket: Regex,
    environment: Regex,
    iam_name: Regex,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LintWarning {
    pub environment: String,
    pub subject: &'static str,
    pub value: String,
    pub message: String,
}

impl fmt::Display for LintWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} '{}' {}",
            self.environment, self.subject, self.value, self.message
        )
    }
}

impl Linter {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            bucket: Regex::new(r"^[a-z0-9][a-z0-9.-]{1,61}[a-z0-9]$")?,
            environment: Regex::new(r"^[A-Za-z0-9][A-Za-z0-9-]{2,38}[A-Za-z0-9]$")?,
            iam_name: Regex::new(r"^[\w+=,.@-]+$")?,
        })
    }

    pub fn check(&self, d: &ConfigDescriptor) -> Vec<LintWarning> {
        let n = &d.names;
        let mut out = Vec::new();
        let mut warn = |subject: &'static str, value: &str, message: &str| {
            out.push(LintWarning {
                environment: d.environment.clone(),
                subject,
                value: value.to_string(),
                message: message.to_string(),
            });
        };

        for (subject, bucket) in [
            ("versions bucket", &n.versions_bucket),
            ("assets bucket", &n.assets_bucket),
        ] {
            if !self.bucket.is_match(bucket) {
                warn(
                    subject,
                    bucket,
                    "must be 3-63 characters of lowercase letters, digits, '.' or '-', starting and ending alphanumeric",
                );
            } else if bucket.contains("..") {
                warn(subject, bucket, "must not contain consecutive periods");
            }
        }

        if !self.environment.is_match(&n.environment_name) {
            warn(
                "environment name",
                &n.environment_name,
                "must be 4-40 characters of letters, digits or '-', not starting or ending with '-'",
            );
        }

        if n.application_name.chars().count() > 100 {
            warn("application name", &n.application_name, "exceeds 100 characters");
        }

        for (subject, name, max) in [
            ("instance role", &n.instance_role_name, 64),
            ("service role", &n.service_role_name, 64),
            ("instance profile", &n.instance_profile_name, 128),
        ] {
            if name.len() > max {
                warn(subject, name, &format!("exceeds {max} characters"));
            }
            if !self.iam_name.is_match(name) {
                warn(subject, name, "contains characters outside [A-Za-z0-9+=,.@_-]");
            }
        }

        out
    }
}
