use anyhow::{Context, Result};
use aws_sdk_autoscaling as autoscaling;
use autoscaling::{
    types::{BlockDeviceMapping, InstanceMonitoring, LaunchConfiguration},
    Client,
};
use tracing::info;

/// Owned field-set for a launch configuration clone. Absent optional
/// fields on the source default to an empty IAM profile and `false` for
/// public-IP association.
#[derive(Debug, Clone, PartialEq)]
pub struct LaunchConfigData {
    pub name: String,
    pub image_id: String,
    pub key_name: Option<String>,
    pub security_groups: Vec<String>,
    pub instance_type: String,
    pub iam_instance_profile: String,
    pub associate_public_ip_address: bool,
    pub user_data: Option<String>,
    pub ebs_optimized: bool,
    pub instance_monitoring_enabled: Option<bool>,
    pub block_device_mappings: Vec<BlockDeviceMapping>,
}

/// Copy `src`'s instance settings into a new configuration carrying
/// `image_id` under `name`.
pub fn clone_launch_config(src: &LaunchConfiguration, image_id: &str, name: &str) -> LaunchConfigData {
    LaunchConfigData {
        name: name.to_string(),
        image_id: image_id.to_string(),
        key_name: src.key_name().map(String::from),
        security_groups: src.security_groups().unwrap_or_default().to_vec(),
        instance_type: src.instance_type().unwrap_or_default().to_string(),
        iam_instance_profile: src.iam_instance_profile().unwrap_or_default().to_string(),
        associate_public_ip_address: src.associate_public_ip_address().unwrap_or(false),
        user_data: src.user_data().map(String::from),
        ebs_optimized: src.ebs_optimized().unwrap_or(false),
        instance_monitoring_enabled: src.instance_monitoring().and_then(|m| m.enabled()),
        block_device_mappings: src.block_device_mappings().unwrap_or_default().to_vec(),
    }
}

/// The configuration with the maximum creation time.
pub fn latest_launch_config(mut configs: Vec<LaunchConfiguration>) -> Option<LaunchConfiguration> {
    configs.sort_by_key(|c| {
        c.created_time()
            .map(|t| (t.secs(), t.subsec_nanos()))
            .unwrap_or((i64::MIN, 0))
    });
    configs.pop()
}

/// Fetch every launch configuration in the account/region.
pub async fn describe_launch_configs(client: &Client) -> Result<Vec<LaunchConfiguration>> {
    let mut configs = Vec::new();
    let mut next_token: Option<String> = None;
    loop {
        let res = client
            .describe_launch_configurations()
            .set_next_token(next_token.take())
            .send()
            .await
            .context("describing launch configurations")?;
        configs.extend(res.launch_configurations().unwrap_or_default().iter().cloned());
        next_token = res.next_token().map(String::from);
        if next_token.is_none() {
            break;
        }
    }
    Ok(configs)
}

pub async fn create_launch_config(client: &Client, data: &LaunchConfigData) -> Result<()> {
    info!(name = %data.name, image_id = %data.image_id, "creating launch configuration");
    let mut req = client
        .create_launch_configuration()
        .launch_configuration_name(&data.name)
        .image_id(&data.image_id)
        .set_key_name(data.key_name.clone())
        .set_security_groups(Some(data.security_groups.clone()))
        .set_user_data(data.user_data.clone())
        .associate_public_ip_address(data.associate_public_ip_address)
        .ebs_optimized(data.ebs_optimized);
    if !data.instance_type.is_empty() {
        req = req.instance_type(&data.instance_type);
    }
    // An absent profile is recorded as "" but must not be sent as one.
    if !data.iam_instance_profile.is_empty() {
        req = req.iam_instance_profile(&data.iam_instance_profile);
    }
    if let Some(enabled) = data.instance_monitoring_enabled {
        req = req.instance_monitoring(InstanceMonitoring::builder().enabled(enabled).build());
    }
    if !data.block_device_mappings.is_empty() {
        req = req.set_block_device_mappings(Some(data.block_device_mappings.clone()));
    }
    req.send()
        .await
        .with_context(|| format!("creating launch configuration {}", data.name))?;
    Ok(())
}

/// Point `asg_name` at an existing launch configuration.
pub async fn attach_launch_config(client: &Client, asg_name: &str, lc_name: &str) -> Result<()> {
    client
        .update_auto_scaling_group()
        .auto_scaling_group_name(asg_name)
        .launch_configuration_name(lc_name)
        .send()
        .await
        .with_context(|| format!("pointing {asg_name} at {lc_name}"))?;
    info!(asg_name, lc_name, "auto scaling group updated");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use autoscaling::primitives::DateTime;

    fn config(name: &str, created_secs: i64) -> LaunchConfiguration {
        LaunchConfiguration::builder()
            .launch_configuration_name(name)
            .created_time(DateTime::from_secs(created_secs))
            .build()
    }

    #[test]
    fn latest_picks_max_created_time() {
        let configs = vec![
            config("web-20240101-000000", 1_704_067_200),
            config("web-20240301-000000", 1_709_251_200),
            config("web-20240201-000000", 1_706_745_600),
        ];
        let latest = latest_launch_config(configs).unwrap();
        assert_eq!(latest.launch_configuration_name(), Some("web-20240301-000000"));
    }

    #[test]
    fn latest_of_none_is_none() {
        assert!(latest_launch_config(vec![]).is_none());
    }

    #[test]
    fn clone_preserves_present_fields() {
        let src = LaunchConfiguration::builder()
            .launch_configuration_name("web-20240101-000000")
            .image_id("ami-0aaa")
            .key_name("ops")
            .security_groups("sg-1")
            .security_groups("sg-2")
            .instance_type("m5.large")
            .iam_instance_profile("arn:aws:iam::123456789012:instance-profile/web")
            .associate_public_ip_address(true)
            .user_data("IyEvYmluL2Jhc2gK")
            .ebs_optimized(true)
            .instance_monitoring(InstanceMonitoring::builder().enabled(true).build())
            .block_device_mappings(
                BlockDeviceMapping::builder().device_name("/dev/xvda").build(),
            )
            .build();

        let data = clone_launch_config(&src, "ami-0bbb", "web-20240201-000000");

        assert_eq!(data.name, "web-20240201-000000");
        assert_eq!(data.image_id, "ami-0bbb");
        assert_eq!(data.key_name.as_deref(), Some("ops"));
        assert_eq!(data.security_groups, vec!["sg-1", "sg-2"]);
        assert_eq!(data.instance_type, "m5.large");
        assert_eq!(
            data.iam_instance_profile,
            "arn:aws:iam::123456789012:instance-profile/web"
        );
        assert!(data.associate_public_ip_address);
        assert_eq!(data.user_data.as_deref(), Some("IyEvYmluL2Jhc2gK"));
        assert!(data.ebs_optimized);
        assert_eq!(data.instance_monitoring_enabled, Some(true));
        assert_eq!(data.block_device_mappings.len(), 1);
        assert_eq!(
            data.block_device_mappings[0].device_name(),
            Some("/dev/xvda")
        );
    }

    #[test]
    fn clone_defaults_absent_fields() {
        let src = LaunchConfiguration::builder()
            .launch_configuration_name("web-20240101-000000")
            .image_id("ami-0aaa")
            .instance_type("t3.micro")
            .build();

        let data = clone_launch_config(&src, "ami-0bbb", "web-20240201-000000");

        assert_eq!(data.key_name, None);
        assert!(data.security_groups.is_empty());
        assert_eq!(data.iam_instance_profile, "");
        assert!(!data.associate_public_ip_address);
        assert_eq!(data.user_data, None);
        assert!(!data.ebs_optimized);
        assert_eq!(data.instance_monitoring_enabled, None);
        assert!(data.block_device_mappings.is_empty());
    }
}
