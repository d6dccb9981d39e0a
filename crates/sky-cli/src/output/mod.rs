//! Output formatting utilities for the CLI
//!
//! Colored status messages, the app table, and pretty-printed JSON for raw
//! API payloads.

use serde_json::Value;
use tabled::{settings::Style, Table, Tabled};

use sky_api::App;

/// Format a list of apps as an ASCII table
///
/// Returns "No apps" if the account has none.
pub fn format_apps(apps: &[App]) -> String {
    if apps.is_empty() {
        return "No apps".to_string();
    }

    #[derive(Tabled)]
    struct AppRow {
        #[tabled(rename = "NAME")]
        name: String,
        #[tabled(rename = "REPLICAS")]
        replicas: u32,
        #[tabled(rename = "SIZE")]
        size: f64,
        #[tabled(rename = "CLOUD")]
        cloud: String,
        #[tabled(rename = "REGION")]
        region: String,
    }

    let rows: Vec<AppRow> = apps
        .iter()
        .map(|a| AppRow {
            name: a.unique_name.clone(),
            replicas: a.replicas,
            size: a.size,
            cloud: a.cloud.clone().unwrap_or_else(|| "-".to_string()),
            region: a.region.clone().unwrap_or_else(|| "-".to_string()),
        })
        .collect();

    Table::new(rows).with(Style::rounded()).to_string()
}

/// Pretty-print an API payload to stdout
///
/// Null payloads (empty responses) print nothing.
pub fn print_data(data: &Value) {
    if data.is_null() {
        return;
    }
    match serde_json::to_string_pretty(data) {
        Ok(rendered) => println!("{}", rendered),
        Err(_) => println!("{}", data),
    }
}

/// Print a success message in green with a checkmark prefix
pub fn print_success(msg: &str) {
    use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};

    let mut stdout = std::io::stdout();
    let _ = crossterm::execute!(
        stdout,
        SetForegroundColor(Color::Green),
        Print("✓ "),
        ResetColor,
        Print(msg),
        Print("\n")
    );
}

/// Print an error message in red with an X prefix
pub fn print_error(msg: &str) {
    use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};

    let mut stderr = std::io::stderr();
    let _ = crossterm::execute!(
        stderr,
        SetForegroundColor(Color::Red),
        Print("✗ "),
        ResetColor,
        Print(msg),
        Print("\n")
    );
}

/// Print a warning message in yellow with a warning symbol prefix
pub fn print_warning(msg: &str) {
    use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};

    let mut stderr = std::io::stderr();
    let _ = crossterm::execute!(
        stderr,
        SetForegroundColor(Color::Yellow),
        Print("⚠ "),
        ResetColor,
        Print(msg),
        Print("\n")
    );
}

/// Print an informational message in cyan with an info symbol prefix
pub fn print_info(msg: &str) {
    use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};

    let mut stdout = std::io::stdout();
    let _ = crossterm::execute!(
        stdout,
        SetForegroundColor(Color::Cyan),
        Print("ℹ "),
        ResetColor,
        Print(msg),
        Print("\n")
    );
}
