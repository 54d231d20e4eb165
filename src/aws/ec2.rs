use anyhow::{Context, Result};
use aws_sdk_ec2 as ec2;
use ec2::{
    types::{Filter, Instance, RequestLaunchTemplateData},
    Client,
};
use tracing::info;

/// Request an image of `instance_id`. Image creation is asynchronous on
/// the provider side; this returns as soon as the image id is assigned,
/// without waiting for the image to become available.
pub async fn create_image(
    client: &Client,
    instance_id: &str,
    name: &str,
    no_reboot: bool,
) -> Result<String> {
    info!(instance_id, name, no_reboot, "creating image");
    let res = client
        .create_image()
        .instance_id(instance_id)
        .name(name)
        .no_reboot(no_reboot)
        .send()
        .await
        .with_context(|| format!("image creation failed for {instance_id}"))?;
    let image_id = res
        .image_id()
        .with_context(|| format!("no image id in response for {instance_id}"))?;
    info!(image_id, "image creation initiated");
    Ok(image_id.to_string())
}

/// Find a running instance by its private IP. The first match wins when
/// more than one reservation carries the address.
pub async fn find_instance_by_private_ip(client: &Client, ip: &str) -> Result<Instance> {
    let res = client
        .describe_instances()
        .filters(
            Filter::builder()
                .name("private-ip-address")
                .values(ip)
                .build(),
        )
        .filters(
            Filter::builder()
                .name("instance-state-name")
                .values("running")
                .build(),
        )
        .send()
        .await
        .with_context(|| format!("instance query failed for {ip}"))?;

    res.reservations()
        .into_iter()
        .flatten()
        .flat_map(|r| r.instances().into_iter().flatten())
        .next()
        .cloned()
        .with_context(|| format!("no running instance found with private ip {ip}"))
}

/// Create a new launch template version carrying `image_id` and promote
/// it to the template's default. Returns the new version number.
pub async fn bump_launch_template(
    client: &Client,
    template_id: &str,
    image_id: &str,
) -> Result<i64> {
    let res = client
        .create_launch_template_version()
        .launch_template_id(template_id)
        .source_version("$Latest")
        .launch_template_data(RequestLaunchTemplateData::builder().image_id(image_id).build())
        .send()
        .await
        .with_context(|| format!("creating launch template version on {template_id}"))?;

    let version = res
        .launch_template_version()
        .and_then(|v| v.version_number())
        .with_context(|| format!("no version number in response for {template_id}"))?;

    client
        .modify_launch_template()
        .launch_template_id(template_id)
        .default_version(version.to_string())
        .send()
        .await
        .with_context(|| format!("setting default version {version} on {template_id}"))?;

    info!(template_id, version, "launch template default updated");
    Ok(version)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore = "hits AWS; needs credentials and a running instance"]
    async fn test_find_instance_by_private_ip() {
        let config = crate::aws::sdk_config(None).await;
        let client = Client::new(&config);
        let instance = find_instance_by_private_ip(&client, "10.0.0.10")
            .await
            .unwrap();
        eprintln!("{:?}", instance.instance_id());
    }
}
