//! SSH key management

use anyhow::{Context, Result};

use sky_api::ApiClient;

use crate::output::{print_data, print_success};

/// List the account's SSH keys
pub async fn keys_list_command(client: &ApiClient) -> Result<()> {
    let data = client.ssh_keys().await.context("Failed to list SSH keys")?;
    print_data(&data);
    Ok(())
}

/// Register a public key with the account.
///
/// `key` is either the key material itself or a path to a `.pub` file.
pub async fn keys_add_command(client: &ApiClient, key: &str) -> Result<()> {
    let material = if std::path::Path::new(key).exists() {
        std::fs::read_to_string(key)
            .with_context(|| format!("Failed to read key file {}", key))?
    } else {
        key.to_string()
    };

    client
        .add_ssh_key(material.trim())
        .await
        .context("Failed to add SSH key")?;
    print_success("Added SSH key");
    Ok(())
}

/// Remove a key by its id (see `skylark keys list`)
pub async fn keys_remove_command(client: &ApiClient, id: u64) -> Result<()> {
    client
        .remove_ssh_key(id)
        .await
        .with_context(|| format!("Failed to remove SSH key {}", id))?;
    print_success(&format!("Removed SSH key {}", id));
    Ok(())
}
