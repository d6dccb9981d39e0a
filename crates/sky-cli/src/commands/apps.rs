//! App management commands

use anyhow::{Context, Result};

use sky_api::ApiClient;

use crate::output::{format_apps, print_data, print_success, print_warning};

/// List the account's apps
pub async fn apps_command(client: &ApiClient) -> Result<()> {
    let apps = client.apps().await.context("Failed to list apps")?;
    println!("{}", format_apps(&apps));
    Ok(())
}

/// Create a new app, optionally with a chosen name
pub async fn create_command(client: &ApiClient, name: Option<&str>) -> Result<()> {
    let data = client
        .create_app(name)
        .await
        .context("Failed to create app")?;

    let assigned = data
        .get("unique_name")
        .and_then(serde_json::Value::as_str)
        .map(str::to_string);
    match assigned {
        Some(name) => print_success(&format!("Created app {}", name)),
        None => print_data(&data),
    }
    Ok(())
}

/// Destroy an app after confirmation
pub async fn destroy_command(client: &ApiClient, app: &str, force: bool) -> Result<()> {
    if !force {
        print_warning(&format!(
            "About to destroy {} and everything in it. This cannot be undone.",
            app
        ));
        print!("Continue? [y/N] ");
        std::io::Write::flush(&mut std::io::stdout())?;

        let mut input = String::new();
        std::io::stdin().read_line(&mut input)?;

        if !input.trim().eq_ignore_ascii_case("y") {
            print_warning("Aborted");
            return Ok(());
        }
    }

    client
        .destroy_app(app)
        .await
        .with_context(|| format!("Failed to destroy {}", app))?;
    print_success(&format!("Destroyed {}", app));
    Ok(())
}

/// Change replica count and/or size
pub async fn scale_command(
    client: &ApiClient,
    app: &str,
    replicas: Option<u32>,
    size: Option<f64>,
) -> Result<()> {
    if replicas.is_none() && size.is_none() {
        anyhow::bail!("Nothing to scale: pass --replicas and/or --size");
    }

    let data = client
        .scale(app, replicas, size)
        .await
        .with_context(|| format!("Failed to scale {}", app))?;
    print_success(&format!("Scaled {}", app));
    print_data(&data);
    Ok(())
}
