//! Remote command execution
//!
//! Discovery runs a handful of one-shot commands on the remote node. The
//! [`Remote`] trait is the seam that lets the session and discovery logic be
//! exercised against canned output in tests.

use std::process::Command;

use sky_core::DiscoveryError;

/// One-shot command execution on a remote host
pub trait Remote {
    /// Run `command` remotely and return its trimmed-as-is stdout.
    ///
    /// A non-zero exit is a [`DiscoveryError::Command`].
    fn run(&self, command: &str) -> Result<String, DiscoveryError>;
}

/// Executes commands over the system `ssh` binary
#[derive(Debug, Clone)]
pub struct SshRemote {
    /// `user@host` identity of the remote node
    target: String,
}

impl SshRemote {
    /// Create a remote channel to `user@host`
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
        }
    }

    /// The `user@host` this channel points at
    pub fn target(&self) -> &str {
        &self.target
    }
}

impl Remote for SshRemote {
    fn run(&self, command: &str) -> Result<String, DiscoveryError> {
        tracing::debug!(target = %self.target, command, "running remote command");

        let output = Command::new("ssh")
            .arg(&self.target)
            .arg("--")
            .args(command.split_whitespace())
            .output()
            .map_err(|source| DiscoveryError::Spawn {
                command: command.to_string(),
                source,
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(DiscoveryError::Command {
                command: command.to_string(),
                detail: format!("{} ({})", stderr.trim(), output.status),
            });
        }

        String::from_utf8(output.stdout).map_err(|_| DiscoveryError::Output {
            command: command.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_is_preserved() {
        let remote = SshRemote::new("root@203.0.113.7");
        assert_eq!(remote.target(), "root@203.0.113.7");
    }
}
