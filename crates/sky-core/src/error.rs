//! Core error types for Skylark

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while discovering facts about a remote node over SSH
#[derive(Error, Debug)]
pub enum DiscoveryError {
    /// A remote command exited non-zero
    #[error("Remote command `{command}` failed: {detail}")]
    Command { command: String, detail: String },

    /// A remote command could not be spawned at all
    #[error("Failed to run remote command `{command}`: {source}")]
    Spawn {
        command: String,
        source: std::io::Error,
    },

    /// Command output was not valid UTF-8
    #[error("Remote command `{command}` produced non-UTF-8 output")]
    Output { command: String },

    /// The listing ran but a required field never matched
    #[error("{field} not found in discovery listing")]
    MissingField { field: &'static str },
}

/// Errors raised while installing or removing local routing state
#[derive(Error, Debug)]
pub enum RoutingError {
    /// A routing command exited non-zero
    #[error("Routing command `{command}` failed with {status}")]
    Command { command: String, status: String },

    /// A routing command could not be spawned
    #[error("Failed to run routing command `{command}`: {source}")]
    Spawn {
        command: String,
        source: std::io::Error,
    },
}

/// Errors raised while opening or tearing down the SSH tunnel
#[derive(Error, Debug)]
pub enum TunnelError {
    /// The background tunnel process failed to start
    #[error("SSH tunnel to {target} failed to start with {status}")]
    OpenFailed { target: String, status: String },

    /// A tunnel command could not be spawned
    #[error("Failed to run tunnel command `{command}`: {source}")]
    Spawn {
        command: String,
        source: std::io::Error,
    },

    /// No process was found listening on the tunnel port at teardown
    #[error("No process found listening on port {port}")]
    NotFound { port: u16 },

    /// Killing the tunnel process failed
    #[error("Failed to kill tunnel process {pid}")]
    KillFailed { pid: String },
}

/// Startup-time platform detection errors
#[derive(Error, Debug)]
pub enum PlatformError {
    /// The OS identification command reported an unsupported platform
    #[error("Unknown platform: {0}")]
    Unknown(String),

    /// The OS identification command itself failed
    #[error("Failed to identify platform: {0}")]
    Detect(String),
}

/// Top-level error for an observer session
#[derive(Error, Debug)]
pub enum ObserverError {
    /// Remote fact discovery failed
    #[error("Discovery failed: {0}")]
    Discovery(#[from] DiscoveryError),

    /// Installing or removing routing state failed
    #[error("Routing failed: {0}")]
    Routing(#[from] RoutingError),

    /// Tunnel setup failed
    #[error("Tunnel failed: {0}")]
    Tunnel(#[from] TunnelError),

    /// The local observer tool could not be launched
    #[error("Failed to launch observer tool: {0}")]
    Launch(String),
}

/// Errors from the control-plane API client
#[derive(Error, Debug)]
pub enum ApiError {
    /// Transport-level failure
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a non-success status
    #[error("API returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    /// The response body did not have the expected shape
    #[error("Malformed API response: {0}")]
    Malformed(String),
}

/// Credentials-file errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Credentials file not found
    #[error("Not logged in (no credentials at {0}). Run `skylark login` first")]
    NotFound(PathBuf),

    /// Invalid credentials file
    #[error("Invalid credentials: {0}")]
    Invalid(String),

    /// TOML parse error
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// TOML serialize error
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
}
