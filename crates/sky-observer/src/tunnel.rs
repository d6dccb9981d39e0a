//! Tunnel lifecycle
//!
//! The tunnel is a deliberately detached `ssh -f -N` process forwarding the
//! epmd and application ports to the remote node. Because no handle is
//! retained, teardown locates the process by the resource it holds (the
//! local listener on the application port) and kills it. That lookup can
//! race with an unrelated process binding the same port between check and
//! kill; the window is narrow because the port was only just allocated for
//! this session, and teardown is best-effort by design.

use std::process::Command;

use sky_core::TunnelError;

/// Port-forwarding tunnel to the remote node
pub trait Tunnel {
    /// Start a detached background process forwarding local `app_port` and
    /// `epmd_port` to the same ports on `target`. Returns once forwarding is
    /// established; the process keeps running after the call.
    fn open(&self, app_port: u16, epmd_port: u16, target: &str) -> Result<(), TunnelError>;

    /// Find whichever process holds the local listener on `app_port` and
    /// forcibly terminate it.
    fn close(&self, app_port: u16) -> Result<(), TunnelError>;
}

/// Tunnel over the system `ssh` binary
#[derive(Debug, Default, Clone, Copy)]
pub struct SshTunnel;

impl Tunnel for SshTunnel {
    fn open(&self, app_port: u16, epmd_port: u16, target: &str) -> Result<(), TunnelError> {
        let app_forward = format!("{port}:localhost:{port}", port = app_port);
        let epmd_forward = format!("{port}:localhost:{port}", port = epmd_port);
        tracing::debug!(%target, app_port, epmd_port, "opening ssh tunnel");

        // -f backgrounds ssh after authentication, so a successful status
        // means the forwards are up and the process has detached.
        let status = Command::new("ssh")
            .args(["-L", &app_forward, "-L", &epmd_forward, target, "-f", "-N"])
            .status()
            .map_err(|source| TunnelError::Spawn {
                command: format!("ssh -L {} -L {} {} -f -N", app_forward, epmd_forward, target),
                source,
            })?;

        if !status.success() {
            return Err(TunnelError::OpenFailed {
                target: target.to_string(),
                status: status.to_string(),
            });
        }
        Ok(())
    }

    fn close(&self, app_port: u16) -> Result<(), TunnelError> {
        let spec = format!("tcp:{}", app_port);
        let output = Command::new("lsof")
            .args(["-wni", &spec, "-t"])
            .output()
            .map_err(|source| TunnelError::Spawn {
                command: format!("lsof -wni {} -t", spec),
                source,
            })?;

        // lsof exits non-zero when nothing matches.
        if !output.status.success() {
            return Err(TunnelError::NotFound { port: app_port });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let pids: Vec<&str> = stdout.split_whitespace().collect();
        if pids.is_empty() {
            return Err(TunnelError::NotFound { port: app_port });
        }

        for pid in pids {
            tracing::debug!(pid, app_port, "killing tunnel process");
            let status = Command::new("kill")
                .args(["-9", pid])
                .status()
                .map_err(|source| TunnelError::Spawn {
                    command: format!("kill -9 {}", pid),
                    source,
                })?;
            if !status.success() {
                return Err(TunnelError::KillFailed {
                    pid: pid.to_string(),
                });
            }
        }
        Ok(())
    }
}
