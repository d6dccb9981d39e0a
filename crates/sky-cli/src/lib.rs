//! sky-cli: Command-line interface for Skylark
//!
//! Provides the `skylark` CLI for managing apps on the platform and for
//! running the remote observer session.

pub mod commands;
pub mod output;
