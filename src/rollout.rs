use anyhow::{Context, Result};
use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_autoscaling as autoscaling;
use aws_sdk_autoscaling::types::LaunchConfiguration;
use aws_sdk_ec2 as ec2;
use chrono::Local;
use clap::ValueEnum;
use tracing::info;

use crate::aws::autoscaling::{
    attach_launch_config, clone_launch_config, create_launch_config, describe_launch_configs,
    latest_launch_config, LaunchConfigData,
};
use crate::aws::ec2::{bump_launch_template, create_image};
use crate::timestamp_name;

/// Which fleet-update mechanism a rollout drives. A fleet normally uses
/// either launch configurations or a launch template, not both; `Both`
/// updates the two unconditionally.
#[derive(Copy, Clone, PartialEq, Eq, Debug, ValueEnum)]
pub enum RolloutTarget {
    /// Clone the latest launch configuration and repoint the ASG
    LaunchConfig,
    /// New launch template version, promoted to default
    LaunchTemplate,
    /// Update both mechanisms
    Both,
}

impl RolloutTarget {
    pub fn updates_launch_config(self) -> bool {
        matches!(self, RolloutTarget::LaunchConfig | RolloutTarget::Both)
    }

    pub fn updates_launch_template(self) -> bool {
        matches!(self, RolloutTarget::LaunchTemplate | RolloutTarget::Both)
    }
}

pub struct RolloutPlan {
    pub instance_id: String,
    pub name_prefix: String,
    pub asg_name: Option<String>,
    pub launch_template_id: Option<String>,
    pub target: RolloutTarget,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct RolloutReport {
    pub image_id: String,
    pub launch_config_name: Option<String>,
    pub template_version: Option<i64>,
}

/// Provider operations a rollout is built from.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FleetOps {
    async fn create_image(&self, instance_id: &str, name: &str) -> Result<String>;
    async fn latest_launch_config(&self) -> Result<LaunchConfiguration>;
    async fn create_launch_config(&self, data: &LaunchConfigData) -> Result<()>;
    async fn attach_launch_config(&self, asg_name: &str, lc_name: &str) -> Result<()>;
    async fn bump_launch_template(&self, template_id: &str, image_id: &str) -> Result<i64>;
}

pub struct AwsFleetOps {
    ec2: ec2::Client,
    autoscaling: autoscaling::Client,
}

impl AwsFleetOps {
    pub fn new(config: &SdkConfig) -> Self {
        Self {
            ec2: ec2::Client::new(config),
            autoscaling: autoscaling::Client::new(config),
        }
    }
}

#[async_trait]
impl FleetOps for AwsFleetOps {
    async fn create_image(&self, instance_id: &str, name: &str) -> Result<String> {
        create_image(&self.ec2, instance_id, name, true).await
    }

    async fn latest_launch_config(&self) -> Result<LaunchConfiguration> {
        let configs = describe_launch_configs(&self.autoscaling).await?;
        latest_launch_config(configs).context("no launch configurations found")
    }

    async fn create_launch_config(&self, data: &LaunchConfigData) -> Result<()> {
        create_launch_config(&self.autoscaling, data).await
    }

    async fn attach_launch_config(&self, asg_name: &str, lc_name: &str) -> Result<()> {
        attach_launch_config(&self.autoscaling, asg_name, lc_name).await
    }

    async fn bump_launch_template(&self, template_id: &str, image_id: &str) -> Result<i64> {
        bump_launch_template(&self.ec2, template_id, image_id).await
    }
}

/// Image the source instance and roll the result out to the fleet.
///
/// Fixed order: image, then latest-configuration clone and ASG update,
/// then launch template version bump. A failure aborts the remaining
/// steps; resources already created are not rolled back, so a re-run
/// after a partial failure produces a fresh image and configuration
/// under a new timestamp name.
pub async fn run_rollout(ops: &impl FleetOps, plan: &RolloutPlan) -> Result<RolloutReport> {
    let stamp = timestamp_name(&plan.name_prefix, Local::now());
    let image_id = ops.create_image(&plan.instance_id, &stamp).await?;

    let mut report = RolloutReport {
        image_id: image_id.clone(),
        ..Default::default()
    };

    if plan.target.updates_launch_config() {
        let asg_name = plan
            .asg_name
            .as_deref()
            .context("an auto scaling group name is required to update a launch configuration")?;
        let latest = ops.latest_launch_config().await?;
        info!(
            source = latest.launch_configuration_name().unwrap_or("<unnamed>"),
            "cloning latest launch configuration"
        );
        let data = clone_launch_config(&latest, &image_id, &stamp);
        ops.create_launch_config(&data).await?;
        ops.attach_launch_config(asg_name, &data.name).await?;
        report.launch_config_name = Some(data.name);
    }

    if plan.target.updates_launch_template() {
        let template_id = plan
            .launch_template_id
            .as_deref()
            .context("a launch template id is required to update a launch template")?;
        let version = ops.bump_launch_template(template_id, &image_id).await?;
        report.template_version = Some(version);
    }

    Ok(report)
}
