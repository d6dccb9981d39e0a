//! Remote observer session command

use anyhow::{Context, Result};

use sky_core::LogReporter;
use sky_observer::{detect_platform, ErlLauncher, ObserverSession, SshRemote, SshTunnel};

use crate::output::{print_info, print_success};

/// Attach a local Erlang observer to a production node.
///
/// Detects the host platform first; an unsupported platform aborts before
/// any remote command, routing change, or tunnel is attempted. Routing and
/// tunnel state are torn down on every exit path, including failures during
/// setup and the user quitting the observer GUI.
pub fn observer_command(app_name: &str, ssh_ip: &str) -> Result<()> {
    let platform = detect_platform().context("Cannot start an observer session")?;
    let router = platform.router();

    let remote = SshRemote::new(format!("root@{}", ssh_ip));
    let tunnel = SshTunnel;
    let launcher = ErlLauncher;
    let reporter = LogReporter;

    print_info(&format!(
        "Starting observer session for {} via {} (routing changes require sudo)",
        app_name, ssh_ip
    ));

    let session = ObserverSession::new(&remote, router.as_ref(), &tunnel, &launcher, &reporter);
    session
        .run(app_name, remote.target())
        .context("Observer session failed")?;

    print_success("Observer session finished; routing and tunnel cleaned up");
    Ok(())
}
