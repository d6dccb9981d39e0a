//! Custom-domain commands

use anyhow::{Context, Result};

use sky_api::ApiClient;

use crate::output::{print_data, print_success};

/// List domains attached to an app
pub async fn domains_list_command(client: &ApiClient, app: &str) -> Result<()> {
    let data = client
        .domains(app)
        .await
        .with_context(|| format!("Failed to list domains for {}", app))?;
    print_data(&data);
    Ok(())
}

/// Attach a fully-qualified domain to an app
pub async fn domains_add_command(client: &ApiClient, app: &str, fqdn: &str) -> Result<()> {
    let data = client
        .add_domain(app, fqdn)
        .await
        .with_context(|| format!("Failed to add {} to {}", fqdn, app))?;
    print_success(&format!("Added {} to {}", fqdn, app));
    print_data(&data);
    Ok(())
}

/// Detach a domain from an app
pub async fn domains_remove_command(client: &ApiClient, app: &str, fqdn: &str) -> Result<()> {
    client
        .remove_domain(app, fqdn)
        .await
        .with_context(|| format!("Failed to remove {} from {}", fqdn, app))?;
    print_success(&format!("Removed {} from {}", fqdn, app));
    Ok(())
}
