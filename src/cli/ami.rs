use anyhow::Result;
use aws_sdk_ec2 as ec2;
use chrono::Local;
use clap::Args;
use fleet_rs::{aws, aws::ec2::create_image, timestamp_name};

#[derive(Args)]
pub struct AmiArgs {
    /// Source EC2 instance id
    #[arg(long, short = 'i')]
    instance_id: String,

    /// EC2 region (default: ambient provider chain)
    #[arg(long, short = 'r')]
    region: Option<String>,

    /// Prefix for the generated image name
    #[arg(long, default_value = "ft-node")]
    name_prefix: String,

    /// Let the instance reboot while the image is taken
    #[arg(long)]
    reboot: bool,
}

impl AmiArgs {
    pub async fn main(self) -> Result<()> {
        let config = aws::sdk_config(self.region).await;
        let client = ec2::Client::new(&config);

        let name = timestamp_name(&self.name_prefix, Local::now());
        let image_id = create_image(&client, &self.instance_id, &name, !self.reboot).await?;
        println!("{image_id}");
        Ok(())
    }
}
