use aws_config::{meta::region::RegionProviderChain, SdkConfig};
use aws_types::region::Region;

pub mod autoscaling;
pub mod ec2;

/// Load the ambient SDK configuration. An explicitly passed region wins
/// over the default provider chain.
pub async fn sdk_config(region: Option<String>) -> SdkConfig {
    let provider = RegionProviderChain::first_try(region.map(Region::new)).or_default_provider();
    aws_config::from_env().region(provider).load().await
}
