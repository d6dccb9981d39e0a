//! Platform routing
//!
//! Makes the pod's internal IP locally reachable by redirecting traffic for
//! it to 127.0.0.1, where the SSH tunnel is listening. Two variants exist,
//! one per supported host OS; the variant is chosen once at startup and both
//! operations require elevated privileges and mutate host-global network
//! state. Every `route_to_localhost` must be paired with exactly one
//! `unroute_to_localhost`.

use std::io::Write;
use std::process::{Command, Stdio};

use sky_core::{PlatformError, RoutingError};

use crate::EPMD_PORT;

/// Host platform, detected once at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Linux,
    Darwin,
}

impl Platform {
    /// Map an OS identification string (`uname -s`, lowercased) to a platform
    pub fn from_uname(name: &str) -> Result<Self, PlatformError> {
        match name.trim().to_lowercase().as_str() {
            "linux" => Ok(Platform::Linux),
            "darwin" => Ok(Platform::Darwin),
            other => Err(PlatformError::Unknown(other.to_string())),
        }
    }

    /// Build the router variant for this platform
    pub fn router(self) -> Box<dyn Router> {
        match self {
            Platform::Linux => Box::new(LinuxRouter),
            Platform::Darwin => Box::new(DarwinRouter),
        }
    }
}

/// Detect the host platform by running `uname -s`.
///
/// Any platform other than linux or darwin is a fatal startup error; the
/// session must not proceed without a router variant.
pub fn detect_platform() -> Result<Platform, PlatformError> {
    let output = Command::new("uname")
        .arg("-s")
        .output()
        .map_err(|e| PlatformError::Detect(e.to_string()))?;

    if !output.status.success() {
        return Err(PlatformError::Detect(format!(
            "uname exited with {}",
            output.status
        )));
    }

    let name = String::from_utf8_lossy(&output.stdout).to_string();
    Platform::from_uname(&name)
}

/// Local routing capability: redirect traffic for a remote-looking address
/// to localhost, and undo it
pub trait Router {
    /// Install a rule redirecting traffic destined for `ip` to 127.0.0.1.
    ///
    /// `app_port` is the session's dynamically assigned application port;
    /// the epmd port is fixed. Only the darwin variant needs the ports.
    fn route_to_localhost(&self, ip: &str, app_port: u16) -> Result<(), RoutingError>;

    /// Remove the redirection for `ip`
    fn unroute_to_localhost(&self, ip: &str) -> Result<(), RoutingError>;
}

/// Run a privileged routing command, checking only its exit status
fn cast(program: &str, args: &[&str]) -> Result<(), RoutingError> {
    let rendered = format!("{} {}", program, args.join(" "));
    tracing::debug!(command = %rendered, "running routing command");

    let status = Command::new(program)
        .args(args)
        .status()
        .map_err(|source| RoutingError::Spawn {
            command: rendered.clone(),
            source,
        })?;

    if !status.success() {
        return Err(RoutingError::Command {
            command: rendered,
            status: status.to_string(),
        });
    }
    Ok(())
}

/// Linux variant: NAT output redirection via iptables, symmetric add/delete
pub struct LinuxRouter;

impl Router for LinuxRouter {
    fn route_to_localhost(&self, ip: &str, _app_port: u16) -> Result<(), RoutingError> {
        cast(
            "sudo",
            &[
                "iptables", "-t", "nat", "-A", "OUTPUT", "-p", "all", "-d", ip, "-j", "DNAT",
                "--to-destination", "127.0.0.1",
            ],
        )
    }

    fn unroute_to_localhost(&self, ip: &str) -> Result<(), RoutingError> {
        cast(
            "sudo",
            &[
                "iptables", "-t", "nat", "-D", "OUTPUT", "-p", "all", "-d", ip, "-j", "DNAT",
                "--to-destination", "127.0.0.1",
            ],
        )
    }
}

/// Darwin variant: pf redirect rules plus a lo0 alias carrying the pod IP.
///
/// Unroute removes the alias and reloads the filter from /etc/pf.conf, which
/// is not a precise undo of the loaded rules. That asymmetry is inherited
/// behavior; see DESIGN.md.
pub struct DarwinRouter;

/// Render the pf ruleset redirecting the epmd and app ports to localhost.
///
/// The epmd rule matches any destination: the distribution protocol also
/// registers against the local epmd through the same port, and a
/// destination-scoped rule breaks that registration.
fn pf_rules(ip: &str, app_port: u16) -> String {
    format!(
        "rdr pass on lo0 inet proto tcp from any to any port {epmd} -> 127.0.0.1 port {epmd}\n\
         rdr pass on lo0 inet proto tcp from any to {ip} port {app} -> 127.0.0.1 port {app}\n",
        epmd = EPMD_PORT,
        ip = ip,
        app = app_port,
    )
}

impl Router for DarwinRouter {
    fn route_to_localhost(&self, ip: &str, app_port: u16) -> Result<(), RoutingError> {
        let rules = pf_rules(ip, app_port);
        tracing::debug!(%rules, "loading pf ruleset");

        let command = "sudo pfctl -ef -".to_string();
        let mut child = Command::new("sudo")
            .args(["pfctl", "-ef", "-"])
            .stdin(Stdio::piped())
            .spawn()
            .map_err(|source| RoutingError::Spawn {
                command: command.clone(),
                source,
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(rules.as_bytes())
                .map_err(|source| RoutingError::Spawn {
                    command: command.clone(),
                    source,
                })?;
        }

        let status = child.wait().map_err(|source| RoutingError::Spawn {
            command: command.clone(),
            source,
        })?;
        if !status.success() {
            return Err(RoutingError::Command {
                command,
                status: status.to_string(),
            });
        }

        cast(
            "sudo",
            &["ifconfig", "lo0", ip, "netmask", "255.255.255.255", "alias"],
        )
    }

    fn unroute_to_localhost(&self, ip: &str) -> Result<(), RoutingError> {
        cast(
            "sudo",
            &["ifconfig", "lo0", ip, "netmask", "255.255.255.255", "-alias"],
        )?;
        cast("sudo", &["pfctl", "-ef", "/etc/pf.conf"])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linux_uname_selects_linux_variant() {
        assert_eq!(Platform::from_uname("linux").unwrap(), Platform::Linux);
        // uname -s reports capitalized names; selection lowercases.
        assert_eq!(Platform::from_uname("Linux\n").unwrap(), Platform::Linux);
    }

    #[test]
    fn darwin_uname_selects_darwin_variant() {
        assert_eq!(Platform::from_uname("Darwin\n").unwrap(), Platform::Darwin);
    }

    #[test]
    fn unknown_uname_is_fatal() {
        match Platform::from_uname("FreeBSD") {
            Err(PlatformError::Unknown(name)) => assert_eq!(name, "freebsd"),
            other => panic!("expected Unknown, got {:?}", other),
        }
    }

    #[test]
    fn pf_ruleset_carries_ip_and_ports() {
        let rules = pf_rules("10.244.7.124", 36606);
        assert!(rules.contains("from any to any port 4369 -> 127.0.0.1 port 4369"));
        assert!(rules.contains("from any to 10.244.7.124 port 36606 -> 127.0.0.1 port 36606"));
    }
}
