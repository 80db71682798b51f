use crate::environment::EnvironmentSpec;

use super::{DerivedNames, OptionSetting};

pub const NS_LAUNCH: &str = "aws:autoscaling:launchconfiguration";
pub const NS_ENVIRONMENT: &str = "aws:elasticbeanstalk:environment";
pub const NS_HEALTH: &str = "aws:elasticbeanstalk:healthreporting:system";
pub const NS_COMMAND: &str = "aws:elasticbeanstalk:command";
pub const NS_ASG: &str = "aws:autoscaling:asg";
pub const NS_LOAD_BALANCER: &str = "aws:elb:loadbalancer";
pub const NS_TRIGGER: &str = "aws:autoscaling:trigger";
pub const NS_HTTPS_LISTENER: &str = "aws:elb:listener:443";
pub const NS_APP_ENV: &str = "aws:elasticbeanstalk:application:environment";

// Scaling policy. Changing any of these is a design change, not a parameter.
pub const ROLLING_BATCH_PERCENT: u32 = 30;
pub const SCALE_MEASURE: &str = "CPUUtilization";
pub const SCALE_STATISTIC: &str = "Average";
pub const SCALE_UNIT: &str = "Percent";
pub const SCALE_UPPER_THRESHOLD: u32 = 75;
pub const SCALE_LOWER_THRESHOLD: u32 = 25;

pub const LISTENER_PROTOCOL: &str = "HTTPS";
pub const LISTENER_INSTANCE_PORT: u16 = 80;

/// Settings every environment gets.
pub fn baseline_settings(spec: &EnvironmentSpec, names: &DerivedNames) -> Vec<OptionSetting> {
    let (env_type, policy) = if spec.high_availability {
        ("LoadBalanced", "Rolling")
    } else {
        ("SingleInstance", "AllAtOnce")
    };

    vec![
        OptionSetting::new(NS_LAUNCH, "InstanceType", &spec.instance_class),
        OptionSetting::new(NS_LAUNCH, "IamInstanceProfile", &names.instance_profile_name),
        OptionSetting::new(NS_ENVIRONMENT, "ServiceRole", &names.service_role_name),
        OptionSetting::new(NS_ENVIRONMENT, "EnvironmentType", env_type),
        OptionSetting::new(NS_HEALTH, "SystemType", "enhanced"),
        OptionSetting::new(NS_COMMAND, "DeploymentPolicy", policy),
    ]
}

/// Capacity, rolling batches, cross-zone balancing and the CPU scaling trigger.
/// Empty for single-instance environments.
pub fn high_availability_settings(spec: &EnvironmentSpec) -> Vec<OptionSetting> {
    if !spec.high_availability {
        return Vec::new();
    }

    let (min, max) = spec.effective_capacity();

    vec![
        OptionSetting::new(NS_ASG, "MinSize", min.to_string()),
        OptionSetting::new(NS_ASG, "MaxSize", max.to_string()),
        OptionSetting::new(NS_COMMAND, "BatchSizeType", "Percentage"),
        OptionSetting::new(NS_COMMAND, "BatchSize", ROLLING_BATCH_PERCENT.to_string()),
        OptionSetting::new(NS_LOAD_BALANCER, "CrossZone", "true"),
        OptionSetting::new(NS_TRIGGER, "MeasureName", SCALE_MEASURE),
        OptionSetting::new(NS_TRIGGER, "Statistic", SCALE_STATISTIC),
        OptionSetting::new(NS_TRIGGER, "Unit", SCALE_UNIT),
        OptionSetting::new(NS_TRIGGER, "UpperThreshold", SCALE_UPPER_THRESHOLD.to_string()),
        OptionSetting::new(NS_TRIGGER, "LowerThreshold", SCALE_LOWER_THRESHOLD.to_string()),
    ]
}

/// HTTPS on 443 forwarded to the instance port. Only under high availability.
pub fn listener_settings(spec: &EnvironmentSpec) -> Vec<OptionSetting> {
    let Some(cert) = spec.secure_listener_certificate() else {
        return Vec::new();
    };

    vec![
        OptionSetting::new(NS_HTTPS_LISTENER, "ListenerProtocol", LISTENER_PROTOCOL),
        OptionSetting::new(
            NS_HTTPS_LISTENER,
            "InstancePort",
            LISTENER_INSTANCE_PORT.to_string(),
        ),
        OptionSetting::new(NS_HTTPS_LISTENER, "SSLCertificateId", cert),
    ]
}

pub fn env_var_settings(spec: &EnvironmentSpec) -> Vec<OptionSetting> {
    spec.environment_variables
        .iter()
        .map(|(k, v)| OptionSetting::new(NS_APP_ENV, k, v))
        .collect()
}
