//! CLI command implementations

mod account;
mod apps;
mod billing;
mod config;
mod domains;
mod keys;
mod observer;
mod releases;

pub use account::{login_command, logout_command};
pub use apps::{apps_command, create_command, destroy_command, scale_command};
pub use billing::{billing_set_command, billing_show_command};
pub use config::{config_list_command, config_set_command, config_unset_command};
pub use domains::{domains_add_command, domains_list_command, domains_remove_command};
pub use keys::{keys_add_command, keys_list_command, keys_remove_command};
pub use observer::observer_command;
pub use releases::{releases_command, rollback_command};
