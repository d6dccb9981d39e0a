//! Remote fact discovery
//!
//! A session needs four facts about the remote node before it can do
//! anything: the Erlang cookie, the pod's internal IP, the epmd port, and the
//! dynamically assigned distribution port of the target application. The
//! first two are read from well-known files; the ports come from parsing
//! `epmd -names` output.

use once_cell::sync::Lazy;
use regex::Regex;

use sky_core::DiscoveryError;

use crate::remote::Remote;

/// Remote file holding the node's Erlang cookie
pub const COOKIE_PATH: &str = "/observer/ERLANG_COOKIE";

/// Remote file holding the pod's internal IP
pub const POD_IP_PATH: &str = "/observer/MY_POD_IP";

static EPMD_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^epmd: up and running on port (\d+) with data:$")
        .expect("epmd line pattern is valid")
});

/// Facts discovered about the remote node, immutable for the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeFacts {
    /// Shared secret required to attach to the node
    pub cookie: String,
    /// Internal IP of the pod, as the node itself knows it
    pub pod_ip: String,
    /// Port of the Erlang port mapper daemon
    pub epmd_port: u16,
    /// Dynamically assigned distribution port of the target application
    pub app_port: u16,
}

/// Discover all facts needed for an observer session.
///
/// Fails hard if any remote command fails or if the `epmd -names` listing
/// lacks either required line; a partially populated result is never
/// returned.
pub fn discover(remote: &dyn Remote, app_name: &str) -> Result<NodeFacts, DiscoveryError> {
    let cookie = remote.run(&format!("cat {}", COOKIE_PATH))?.trim().to_string();
    let pod_ip = remote.run(&format!("cat {}", POD_IP_PATH))?.trim().to_string();

    let listing = remote.run("epmd -names")?;
    let (epmd_port, app_port) = parse_names(&listing, app_name)?;

    Ok(NodeFacts {
        cookie,
        pod_ip,
        epmd_port,
        app_port,
    })
}

/// Parse `epmd -names` output into (epmd port, app port).
///
/// Line-oriented and order-independent; unrelated lines are ignored. A
/// listing missing either line yields a [`DiscoveryError::MissingField`]
/// naming the absent field.
pub fn parse_names(output: &str, app_name: &str) -> Result<(u16, u16), DiscoveryError> {
    let app_line = Regex::new(&format!(
        r"^name {} at port (\d+)$",
        regex::escape(app_name)
    ))
    .expect("app line pattern is valid for escaped input");

    let mut epmd_port = None;
    let mut app_port = None;

    for line in output.lines() {
        if let Some(captures) = EPMD_LINE.captures(line) {
            epmd_port = captures[1].parse::<u16>().ok();
        }
        if let Some(captures) = app_line.captures(line) {
            app_port = captures[1].parse::<u16>().ok();
        }
    }

    let epmd_port = epmd_port.ok_or(DiscoveryError::MissingField { field: "epmd port" })?;
    let app_port = app_port.ok_or(DiscoveryError::MissingField { field: "app port" })?;

    Ok((epmd_port, app_port))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_both_ports() {
        let output = "epmd: up and running on port 4369 with data:\nname myapp at port 36606\n";
        let (epmd, app) = parse_names(output, "myapp").unwrap();
        assert_eq!(epmd, 4369);
        assert_eq!(app, 36606);
    }

    #[test]
    fn line_order_does_not_matter() {
        let output = "name myapp at port 36606\nepmd: up and running on port 4369 with data:\n";
        let (epmd, app) = parse_names(output, "myapp").unwrap();
        assert_eq!(epmd, 4369);
        assert_eq!(app, 36606);
    }

    #[test]
    fn unrelated_lines_are_ignored() {
        let output = "some banner\n\
                      epmd: up and running on port 4369 with data:\n\
                      name otherapp at port 40001\n\
                      name myapp at port 36606\n\
                      trailing noise\n";
        let (epmd, app) = parse_names(output, "myapp").unwrap();
        assert_eq!(epmd, 4369);
        assert_eq!(app, 36606);
    }

    #[test]
    fn missing_epmd_line_names_the_field() {
        let output = "name myapp at port 36606\n";
        match parse_names(output, "myapp") {
            Err(DiscoveryError::MissingField { field }) => assert_eq!(field, "epmd port"),
            other => panic!("expected MissingField, got {:?}", other),
        }
    }

    #[test]
    fn missing_app_line_names_the_field() {
        let output = "epmd: up and running on port 4369 with data:\n";
        match parse_names(output, "myapp") {
            Err(DiscoveryError::MissingField { field }) => assert_eq!(field, "app port"),
            other => panic!("expected MissingField, got {:?}", other),
        }
    }

    #[test]
    fn app_name_is_matched_literally() {
        // A name that happens to be a regex metacharacter sequence must not
        // match other lines.
        let output = "epmd: up and running on port 4369 with data:\nname myXapp at port 36606\n";
        assert!(parse_names(output, "my.app").is_err());
    }

    struct FakeRemote;

    impl Remote for FakeRemote {
        fn run(&self, command: &str) -> Result<String, DiscoveryError> {
            Ok(match command {
                "cat /observer/ERLANG_COOKIE" => "  s3cret-cookie \n".to_string(),
                "cat /observer/MY_POD_IP" => "10.244.7.124\n".to_string(),
                "epmd -names" => {
                    "epmd: up and running on port 4369 with data:\nname myapp at port 36606\n"
                        .to_string()
                }
                other => panic!("unexpected command: {}", other),
            })
        }
    }

    #[test]
    fn discover_trims_and_populates_all_fields() {
        let facts = discover(&FakeRemote, "myapp").unwrap();
        assert_eq!(
            facts,
            NodeFacts {
                cookie: "s3cret-cookie".to_string(),
                pod_ip: "10.244.7.124".to_string(),
                epmd_port: 4369,
                app_port: 36606,
            }
        );
    }

    struct FailingRemote;

    impl Remote for FailingRemote {
        fn run(&self, command: &str) -> Result<String, DiscoveryError> {
            Err(DiscoveryError::Command {
                command: command.to_string(),
                detail: "connection refused".to_string(),
            })
        }
    }

    #[test]
    fn discover_propagates_command_failure() {
        match discover(&FailingRemote, "myapp") {
            Err(DiscoveryError::Command { .. }) => {}
            other => panic!("expected Command error, got {:?}", other),
        }
    }
}
