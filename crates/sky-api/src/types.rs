//! API payload types

use serde::Deserialize;

/// An application as reported by the control plane
#[derive(Debug, Clone, Deserialize)]
pub struct App {
    /// Globally unique app name
    pub unique_name: String,
    /// Number of running replicas
    #[serde(default)]
    pub replicas: u32,
    /// Replica size in memory units
    #[serde(default)]
    pub size: f64,
    /// Cloud the app runs in
    #[serde(default)]
    pub cloud: Option<String>,
    /// Region within the cloud
    #[serde(default)]
    pub region: Option<String>,
}
