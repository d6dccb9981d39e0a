//! Billing commands

use anyhow::{Context, Result};

use sky_api::ApiClient;

use crate::output::{print_data, print_success};

/// Show the account's payment method
pub async fn billing_show_command(client: &ApiClient) -> Result<()> {
    let data = client
        .payment_method()
        .await
        .context("Failed to fetch payment method")?;
    print_data(&data);
    Ok(())
}

/// Replace the payment method with a new card token
pub async fn billing_set_command(client: &ApiClient, token: &str) -> Result<()> {
    client
        .set_payment_method(token)
        .await
        .context("Failed to update payment method")?;
    print_success("Updated payment method");
    Ok(())
}
