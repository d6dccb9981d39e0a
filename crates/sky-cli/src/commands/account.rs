//! Login and logout

use std::io::Write;

use anyhow::{Context, Result};

use sky_api::ApiClient;
use sky_core::credentials::{self, Credentials};

use crate::output::{print_success, print_warning};

/// Prompt for email and password, exchange them for an API key, and store it
pub async fn login_command(host: &str) -> Result<()> {
    let email = prompt("Email: ")?;
    print_warning("Password input is not hidden");
    let password = prompt("Password: ")?;

    let client = ApiClient::anonymous(host);
    let api_key = client
        .obtain_api_key(email.trim(), password.trim())
        .await
        .context("Login failed")?;

    credentials::save(&Credentials {
        email: email.trim().to_string(),
        api_key,
    })
    .context("Failed to store credentials")?;

    print_success(&format!(
        "Logged in as {} (credentials stored in {:?})",
        email.trim(),
        credentials::credentials_path()
    ));
    Ok(())
}

/// Remove stored credentials
pub fn logout_command() -> Result<()> {
    credentials::clear().context("Failed to remove credentials")?;
    print_success("Logged out");
    Ok(())
}

fn prompt(label: &str) -> Result<String> {
    print!("{}", label);
    std::io::stdout().flush()?;

    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;
    Ok(input)
}
