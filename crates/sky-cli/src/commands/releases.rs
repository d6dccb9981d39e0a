//! Release listing and rollback

use anyhow::{Context, Result};

use sky_api::ApiClient;

use crate::output::{print_data, print_success};

/// List an app's releases, newest first
pub async fn releases_command(client: &ApiClient, app: &str) -> Result<()> {
    let data = client
        .releases(app)
        .await
        .with_context(|| format!("Failed to list releases for {}", app))?;
    print_data(&data);
    Ok(())
}

/// Roll an app back to a previous release (the latest rollbackable one if no
/// version is given)
pub async fn rollback_command(client: &ApiClient, app: &str, version: Option<&str>) -> Result<()> {
    let data = client
        .rollback(app, version)
        .await
        .with_context(|| format!("Failed to roll back {}", app))?;

    match version {
        Some(version) => print_success(&format!("Rolled {} back to {}", app, version)),
        None => print_success(&format!("Rolled {} back", app)),
    }
    print_data(&data);
    Ok(())
}
