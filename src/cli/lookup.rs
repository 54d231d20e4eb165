use anyhow::{Context, Result};
use aws_sdk_ec2 as ec2;
use clap::Args;
use fleet_rs::{aws, aws::ec2::find_instance_by_private_ip};

#[derive(Args)]
pub struct LookupArgs {
    /// Private IP address of the instance to resolve
    #[arg(long)]
    instance_ip: String,

    /// EC2 region (default: ambient provider chain)
    #[arg(long, short = 'r')]
    region: Option<String>,
}

impl LookupArgs {
    pub async fn main(self) -> Result<()> {
        let config = aws::sdk_config(self.region).await;
        let client = ec2::Client::new(&config);

        let instance = find_instance_by_private_ip(&client, &self.instance_ip).await?;
        let id = instance
            .instance_id()
            .with_context(|| format!("instance matching {} has no id", self.instance_ip))?;
        println!("{id}");
        Ok(())
    }
}
