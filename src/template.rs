use serde_json::{json, Map, Value};

use crate::descriptor::{ConfigDescriptor, GrantTarget};

pub const INSTANCE_ROLE_MANAGED_POLICIES: [&str; 3] = [
    "AWSElasticBeanstalkWebTier",
    "AWSElasticBeanstalkMulticontainerDocker",
    "AWSElasticBeanstalkWorkerTier",
];

pub const SERVICE_ROLE_MANAGED_POLICIES: [&str; 2] = [
    "service-role/AWSElasticBeanstalkEnhancedHealth",
    "service-role/AWSElasticBeanstalkService",
];

/// Render a descriptor as the resource graph the provisioning engine applies:
/// versions bucket, application, roles, instance profile and the environment,
/// which depends on the application.
pub fn render_template(d: &ConfigDescriptor) -> Value {
    let n = &d.names;

    let mut resources = Map::new();

    resources.insert(
        "AppBucket".into(),
        json!({
            "Type": "AWS::S3::Bucket",
            "DeletionPolicy": "Delete",
            "UpdateReplacePolicy": "Delete",
            "Properties": {
                "BucketName": n.versions_bucket,
                "VersioningConfiguration": { "Status": "Enabled" },
            },
        }),
    );

    resources.insert(
        "Application".into(),
        json!({
            "Type": "AWS::ElasticBeanstalk::Application",
            "Properties": {
                "ApplicationName": n.application_name,
                "Description": format!("{} - {} environment", d.application, d.environment),
            },
        }),
    );

    resources.insert(
        "InstanceRole".into(),
        json!({
            "Type": "AWS::IAM::Role",
            "Properties": {
                "RoleName": n.instance_role_name,
                "AssumeRolePolicyDocument": assume_role("ec2.amazonaws.com"),
                "ManagedPolicyArns": managed_policy_arns(&INSTANCE_ROLE_MANAGED_POLICIES),
                "Policies": [{
                    "PolicyName": format!("{}-access", n.application_name),
                    "PolicyDocument": grants_policy(d),
                }],
            },
        }),
    );

    resources.insert(
        "InstanceProfile".into(),
        json!({
            "Type": "AWS::IAM::InstanceProfile",
            "Properties": {
                "InstanceProfileName": n.instance_profile_name,
                "Roles": [{ "Ref": "InstanceRole" }],
            },
        }),
    );

    resources.insert(
        "ServiceRole".into(),
        json!({
            "Type": "AWS::IAM::Role",
            "Properties": {
                "RoleName": n.service_role_name,
                "AssumeRolePolicyDocument": assume_role("elasticbeanstalk.amazonaws.com"),
                "ManagedPolicyArns": managed_policy_arns(&SERVICE_ROLE_MANAGED_POLICIES),
            },
        }),
    );

    let option_settings: Vec<Value> = d
        .settings
        .iter()
        .map(|s| {
            json!({
                "Namespace": s.namespace,
                "OptionName": s.option_name,
                "Value": s.value,
            })
        })
        .collect();

    resources.insert(
        "Environment".into(),
        json!({
            "Type": "AWS::ElasticBeanstalk::Environment",
            "DependsOn": ["Application", "InstanceProfile", "ServiceRole"],
            "Properties": {
                "EnvironmentName": n.environment_name,
                "ApplicationName": { "Ref": "Application" },
                "PlatformArn": n.platform_arn,
                "Description": format!("{} environment for {}", d.environment, d.application),
                "OptionSettings": option_settings,
            },
        }),
    );

    json!({
        "AWSTemplateFormatVersion": "2010-09-09",
        "Description": format!(
            "{} ({}). Empty the {} bucket before deleting this stack.",
            n.application_name, d.region, n.versions_bucket
        ),
        "Resources": Value::Object(resources),
        "Outputs": {
            "ApplicationName": {
                "Description": "Elastic Beanstalk Application Name",
                "Value": { "Ref": "Application" },
            },
            "EnvironmentName": {
                "Description": "Elastic Beanstalk Environment Name",
                "Value": { "Ref": "Environment" },
            },
            "EnvironmentURL": {
                "Description": "Environment URL",
                "Value": { "Fn::Join": ["", ["http://", { "Fn::GetAtt": ["Environment", "EndpointURL"] }]] },
            },
            "AppVersionsBucket": {
                "Description": "S3 Bucket for application versions",
                "Value": { "Ref": "AppBucket" },
            },
        },
    })
}

fn assume_role(service: &str) -> Value {
    json!({
        "Version": "2012-10-17",
        "Statement": [{
            "Effect": "Allow",
            "Principal": { "Service": service },
            "Action": "sts:AssumeRole",
        }],
    })
}

fn managed_policy_arns(names: &[&str]) -> Vec<String> {
    names
        .iter()
        .map(|p| format!("arn:aws:iam::aws:policy/{p}"))
        .collect()
}

fn grants_policy(d: &ConfigDescriptor) -> Value {
    let statements: Vec<Value> = d
        .access_grants
        .iter()
        .map(|g| {
            let sid = match g.target {
                GrantTarget::VersionsBucket => "VersionsBucket",
                GrantTarget::AssetsBucket => "AssetsBucket",
                GrantTarget::Secrets => "Secrets",
            };
            json!({
                "Sid": sid,
                "Effect": "Allow",
                "Action": g.actions,
                "Resource": g.resources,
            })
        })
        .collect();

    json!({
        "Version": "2012-10-17",
        "Statement": statements,
    })
}
