//! App configuration-variable commands

use anyhow::{Context, Result};

use sky_api::ApiClient;

use crate::output::{print_data, print_success};

/// Show an app's config vars
pub async fn config_list_command(client: &ApiClient, app: &str) -> Result<()> {
    let data = client
        .configs(app)
        .await
        .with_context(|| format!("Failed to fetch configs for {}", app))?;
    print_data(&data);
    Ok(())
}

/// Set one config var (restarts the app on the platform side)
pub async fn config_set_command(
    client: &ApiClient,
    app: &str,
    key: &str,
    value: &str,
) -> Result<()> {
    client
        .set_config(app, key, value)
        .await
        .with_context(|| format!("Failed to set {} on {}", key, app))?;
    print_success(&format!("Set {} on {}", key, app));
    Ok(())
}

/// Remove one config var
pub async fn config_unset_command(client: &ApiClient, app: &str, key: &str) -> Result<()> {
    client
        .unset_config(app, key)
        .await
        .with_context(|| format!("Failed to unset {} on {}", key, app))?;
    print_success(&format!("Unset {} on {}", key, app));
    Ok(())
}
