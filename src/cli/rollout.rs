use anyhow::{bail, Result};
use clap::Args;
use serde::{Deserialize, Serialize};

use fleet_rs::aws;
use fleet_rs::rollout::{run_rollout, AwsFleetOps, RolloutPlan, RolloutTarget};

/// Fleet-level defaults, used when the matching flag is not passed.
#[derive(Serialize, Deserialize, Default)]
struct Config {
    asg_name: Option<String>,
    launch_template_id: Option<String>,
}

#[derive(Args)]
pub struct RolloutArgs {
    /// Source EC2 instance id to image
    #[arg(long, short = 'i')]
    instance_id: String,

    /// Auto Scaling Group to point at the new launch configuration
    #[arg(long)]
    asg_name: Option<String>,

    /// Launch template to carry the new image as its default version
    #[arg(long)]
    launch_template_id: Option<String>,

    /// Fleet-update mechanism to drive
    #[arg(long, value_enum, default_value_t = RolloutTarget::Both)]
    target: RolloutTarget,

    /// Prefix for generated image / launch configuration names
    #[arg(long, default_value = "ft-node")]
    name_prefix: String,

    /// EC2 region (default: ambient provider chain)
    #[arg(long, short = 'r')]
    region: Option<String>,
}

impl RolloutArgs {
    pub async fn main(self) -> Result<()> {
        let config: Config = confy::load("fleet-rs", Some("rollout"))?;

        let plan = RolloutPlan {
            instance_id: self.instance_id,
            name_prefix: self.name_prefix,
            asg_name: self.asg_name.or(config.asg_name),
            launch_template_id: self.launch_template_id.or(config.launch_template_id),
            target: self.target,
        };

        if plan.target.updates_launch_config() && plan.asg_name.is_none() {
            bail!("pass --asg-name or set it in the rollout config file");
        }
        if plan.target.updates_launch_template() && plan.launch_template_id.is_none() {
            bail!("pass --launch-template-id or set it in the rollout config file");
        }

        let sdk_config = aws::sdk_config(self.region).await;
        let ops = AwsFleetOps::new(&sdk_config);
        let report = run_rollout(&ops, &plan).await?;

        println!("{}", report.image_id);
        if let Some(name) = &report.launch_config_name {
            println!("{name}");
        }
        if let Some(version) = report.template_version {
            println!("{version}");
        }
        Ok(())
    }
}
