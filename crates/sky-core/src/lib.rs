//! sky-core: Shared abstractions for the Skylark CLI
//!
//! This crate provides the error taxonomy, the credentials store, and the
//! error-reporting trait used by the API client, the observer session, and
//! the CLI binary.

pub mod credentials;
pub mod error;
pub mod telemetry;

pub use credentials::Credentials;
pub use error::{
    ApiError, ConfigError, DiscoveryError, ObserverError, PlatformError, RoutingError, TunnelError,
};
pub use telemetry::{ErrorReporter, LogReporter};
