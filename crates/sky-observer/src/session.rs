//! Session orchestration
//!
//! Sequences discovery, routing, tunnel, and the blocking tool launch, and
//! guarantees that acquired host-global state is released on every exit
//! path. Each acquisition pushes its release action onto a cleanup stack;
//! the stack runs in reverse acquisition order whether the sequence
//! succeeded or failed, release failures are logged without masking the
//! original error, and the original error decides the exit code.

use std::process::Command;

use uuid::Uuid;

use sky_core::{ErrorReporter, ObserverError};

use crate::facts::{self, NodeFacts};
use crate::remote::Remote;
use crate::router::Router;
use crate::tunnel::Tunnel;

/// Launches the local observation tool against the tunneled node
pub trait Launcher {
    /// Run the tool in the foreground, blocking until the user exits it
    fn launch(&self, facts: &NodeFacts, app_name: &str) -> Result<(), ObserverError>;
}

/// Launches `erl -run observer` with a random hidden node name
#[derive(Debug, Default, Clone, Copy)]
pub struct ErlLauncher;

impl Launcher for ErlLauncher {
    fn launch(&self, facts: &NodeFacts, app_name: &str) -> Result<(), ObserverError> {
        let node_name = format!("{}@{}", Uuid::new_v4(), facts.pod_ip);

        println!("Starting observer as {}", node_name);
        println!("In the 'Node' menu, click 'Connect Node'");
        println!("Enter: {}@{}", app_name, facts.pod_ip);

        let status = Command::new("erl")
            .args([
                "-name",
                &node_name,
                "-setcookie",
                &facts.cookie,
                "-hidden",
                "-run",
                "observer",
            ])
            .status()
            .map_err(|e| ObserverError::Launch(e.to_string()))?;

        if !status.success() {
            return Err(ObserverError::Launch(format!("erl exited with {}", status)));
        }
        Ok(())
    }
}

type Release<'a> = Box<dyn FnOnce() -> Result<(), ObserverError> + 'a>;

/// Release actions for acquired resources, run LIFO on every exit path
struct CleanupStack<'a> {
    actions: Vec<(&'static str, Release<'a>)>,
}

impl<'a> CleanupStack<'a> {
    fn new() -> Self {
        Self {
            actions: Vec::new(),
        }
    }

    fn push(&mut self, label: &'static str, release: Release<'a>) {
        self.actions.push((label, release));
    }

    /// Run all releases in reverse acquisition order. Failures are logged
    /// and do not stop the remaining releases.
    fn run(self) {
        for (label, release) in self.actions.into_iter().rev() {
            tracing::info!(resource = label, "cleaning up");
            if let Err(error) = release() {
                tracing::warn!(resource = label, %error, "cleanup failed");
            }
        }
    }
}

/// Orchestrates one observer session against a remote node
pub struct ObserverSession<'a> {
    remote: &'a dyn Remote,
    router: &'a dyn Router,
    tunnel: &'a dyn Tunnel,
    launcher: &'a dyn Launcher,
    reporter: &'a dyn ErrorReporter,
}

impl<'a> ObserverSession<'a> {
    pub fn new(
        remote: &'a dyn Remote,
        router: &'a dyn Router,
        tunnel: &'a dyn Tunnel,
        launcher: &'a dyn Launcher,
        reporter: &'a dyn ErrorReporter,
    ) -> Self {
        Self {
            remote,
            router,
            tunnel,
            launcher,
            reporter,
        }
    }

    /// Run the full session: discover, route, tunnel, launch, clean up.
    ///
    /// The reporter is invoked exactly once if the session fails, after all
    /// cleanup has been attempted.
    pub fn run(&self, app_name: &str, ssh_target: &str) -> Result<(), ObserverError> {
        let result = self.execute(app_name, ssh_target);
        if let Err(error) = &result {
            self.reporter.report(error);
        }
        result
    }

    fn execute(&self, app_name: &str, ssh_target: &str) -> Result<(), ObserverError> {
        tracing::info!(app_name, "fetching pod ip, cookie, and ports");
        // Nothing is acquired yet; a discovery failure needs no cleanup.
        let facts = facts::discover(self.remote, app_name)?;
        tracing::info!(
            pod_ip = %facts.pod_ip,
            epmd_port = facts.epmd_port,
            app_port = facts.app_port,
            "discovered node facts"
        );

        let mut cleanup = CleanupStack::new();
        let result = self.acquire_and_launch(&facts, app_name, ssh_target, &mut cleanup);
        cleanup.run();
        result
    }

    fn acquire_and_launch(
        &self,
        facts: &NodeFacts,
        app_name: &str,
        ssh_target: &str,
        cleanup: &mut CleanupStack<'a>,
    ) -> Result<(), ObserverError> {
        tracing::info!(pod_ip = %facts.pod_ip, "routing pod ip to 127.0.0.1");
        self.router.route_to_localhost(&facts.pod_ip, facts.app_port)?;
        {
            let router = self.router;
            let ip = facts.pod_ip.clone();
            cleanup.push(
                "route",
                Box::new(move || router.unroute_to_localhost(&ip).map_err(Into::into)),
            );
        }

        tracing::info!(
            app_port = facts.app_port,
            epmd_port = facts.epmd_port,
            "opening ssh tunnel"
        );
        self.tunnel.open(facts.app_port, facts.epmd_port, ssh_target)?;
        {
            let tunnel = self.tunnel;
            let app_port = facts.app_port;
            cleanup.push(
                "tunnel",
                Box::new(move || tunnel.close(app_port).map_err(Into::into)),
            );
        }

        self.launcher.launch(facts, app_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::cell::Cell;

    use sky_core::{DiscoveryError, RoutingError, TunnelError};

    struct ScriptRemote {
        fail: bool,
    }

    impl Remote for ScriptRemote {
        fn run(&self, command: &str) -> Result<String, DiscoveryError> {
            if self.fail {
                return Err(DiscoveryError::Command {
                    command: command.to_string(),
                    detail: "connection refused".to_string(),
                });
            }
            Ok(match command {
                "cat /observer/ERLANG_COOKIE" => "cookie\n".to_string(),
                "cat /observer/MY_POD_IP" => "10.244.7.124\n".to_string(),
                "epmd -names" => {
                    "epmd: up and running on port 4369 with data:\nname myapp at port 36606\n"
                        .to_string()
                }
                other => panic!("unexpected command: {}", other),
            })
        }
    }

    #[derive(Default)]
    struct ScriptRouter {
        fail_route: bool,
        route_calls: Cell<usize>,
        unroute_calls: Cell<usize>,
    }

    impl Router for ScriptRouter {
        fn route_to_localhost(&self, _ip: &str, _app_port: u16) -> Result<(), RoutingError> {
            self.route_calls.set(self.route_calls.get() + 1);
            if self.fail_route {
                return Err(RoutingError::Command {
                    command: "iptables".to_string(),
                    status: "exit status: 1".to_string(),
                });
            }
            Ok(())
        }

        fn unroute_to_localhost(&self, _ip: &str) -> Result<(), RoutingError> {
            self.unroute_calls.set(self.unroute_calls.get() + 1);
            Ok(())
        }
    }

    #[derive(Default)]
    struct ScriptTunnel {
        fail_open: bool,
        fail_close: bool,
        open_calls: Cell<usize>,
        close_calls: Cell<usize>,
    }

    impl Tunnel for ScriptTunnel {
        fn open(&self, _app_port: u16, _epmd_port: u16, target: &str) -> Result<(), TunnelError> {
            self.open_calls.set(self.open_calls.get() + 1);
            if self.fail_open {
                return Err(TunnelError::OpenFailed {
                    target: target.to_string(),
                    status: "exit status: 255".to_string(),
                });
            }
            Ok(())
        }

        fn close(&self, app_port: u16) -> Result<(), TunnelError> {
            self.close_calls.set(self.close_calls.get() + 1);
            if self.fail_close {
                return Err(TunnelError::NotFound { port: app_port });
            }
            Ok(())
        }
    }

    #[derive(Default)]
    struct ScriptLauncher {
        fail: bool,
        launch_calls: Cell<usize>,
    }

    impl Launcher for ScriptLauncher {
        fn launch(&self, _facts: &NodeFacts, _app_name: &str) -> Result<(), ObserverError> {
            self.launch_calls.set(self.launch_calls.get() + 1);
            if self.fail {
                return Err(ObserverError::Launch("erl exited with 1".to_string()));
            }
            Ok(())
        }
    }

    #[derive(Default)]
    struct CountingReporter {
        reports: Cell<usize>,
    }

    impl ErrorReporter for CountingReporter {
        fn report(&self, _error: &dyn std::error::Error) {
            self.reports.set(self.reports.get() + 1);
        }
    }

    fn session<'a>(
        remote: &'a ScriptRemote,
        router: &'a ScriptRouter,
        tunnel: &'a ScriptTunnel,
        launcher: &'a ScriptLauncher,
        reporter: &'a CountingReporter,
    ) -> ObserverSession<'a> {
        ObserverSession::new(remote, router, tunnel, launcher, reporter)
    }

    #[test]
    fn full_success_cleans_up_both_resources_once() {
        let remote = ScriptRemote { fail: false };
        let router = ScriptRouter::default();
        let tunnel = ScriptTunnel::default();
        let launcher = ScriptLauncher::default();
        let reporter = CountingReporter::default();

        let result = session(&remote, &router, &tunnel, &launcher, &reporter)
            .run("myapp", "root@203.0.113.7");

        assert!(result.is_ok());
        assert_eq!(router.route_calls.get(), 1);
        assert_eq!(router.unroute_calls.get(), 1);
        assert_eq!(tunnel.open_calls.get(), 1);
        assert_eq!(tunnel.close_calls.get(), 1);
        assert_eq!(launcher.launch_calls.get(), 1);
        assert_eq!(reporter.reports.get(), 0);
    }

    #[test]
    fn discovery_failure_acquires_nothing() {
        let remote = ScriptRemote { fail: true };
        let router = ScriptRouter::default();
        let tunnel = ScriptTunnel::default();
        let launcher = ScriptLauncher::default();
        let reporter = CountingReporter::default();

        let result = session(&remote, &router, &tunnel, &launcher, &reporter)
            .run("myapp", "root@203.0.113.7");

        assert!(matches!(result, Err(ObserverError::Discovery(_))));
        assert_eq!(router.route_calls.get(), 0);
        assert_eq!(router.unroute_calls.get(), 0);
        assert_eq!(tunnel.open_calls.get(), 0);
        assert_eq!(tunnel.close_calls.get(), 0);
        assert_eq!(launcher.launch_calls.get(), 0);
        assert_eq!(reporter.reports.get(), 1);
    }

    #[test]
    fn tunnel_failure_unroutes_but_never_closes() {
        let remote = ScriptRemote { fail: false };
        let router = ScriptRouter::default();
        let tunnel = ScriptTunnel {
            fail_open: true,
            ..Default::default()
        };
        let launcher = ScriptLauncher::default();
        let reporter = CountingReporter::default();

        let result = session(&remote, &router, &tunnel, &launcher, &reporter)
            .run("myapp", "root@203.0.113.7");

        assert!(matches!(result, Err(ObserverError::Tunnel(_))));
        assert_eq!(router.unroute_calls.get(), 1);
        assert_eq!(tunnel.close_calls.get(), 0);
        assert_eq!(launcher.launch_calls.get(), 0);
        assert_eq!(reporter.reports.get(), 1);
    }

    #[test]
    fn route_failure_propagates_with_nothing_to_undo() {
        let remote = ScriptRemote { fail: false };
        let router = ScriptRouter {
            fail_route: true,
            ..Default::default()
        };
        let tunnel = ScriptTunnel::default();
        let launcher = ScriptLauncher::default();
        let reporter = CountingReporter::default();

        let result = session(&remote, &router, &tunnel, &launcher, &reporter)
            .run("myapp", "root@203.0.113.7");

        assert!(matches!(result, Err(ObserverError::Routing(_))));
        assert_eq!(router.unroute_calls.get(), 0);
        assert_eq!(tunnel.open_calls.get(), 0);
        assert_eq!(tunnel.close_calls.get(), 0);
        assert_eq!(reporter.reports.get(), 1);
    }

    #[test]
    fn launch_failure_still_cleans_up_both() {
        let remote = ScriptRemote { fail: false };
        let router = ScriptRouter::default();
        let tunnel = ScriptTunnel::default();
        let launcher = ScriptLauncher {
            fail: true,
            ..Default::default()
        };
        let reporter = CountingReporter::default();

        let result = session(&remote, &router, &tunnel, &launcher, &reporter)
            .run("myapp", "root@203.0.113.7");

        assert!(matches!(result, Err(ObserverError::Launch(_))));
        assert_eq!(router.unroute_calls.get(), 1);
        assert_eq!(tunnel.close_calls.get(), 1);
        assert_eq!(reporter.reports.get(), 1);
    }

    #[test]
    fn cleanup_failure_does_not_mask_the_original_error() {
        let remote = ScriptRemote { fail: false };
        let router = ScriptRouter::default();
        let tunnel = ScriptTunnel {
            fail_close: true,
            ..Default::default()
        };
        let launcher = ScriptLauncher {
            fail: true,
            ..Default::default()
        };
        let reporter = CountingReporter::default();

        let result = session(&remote, &router, &tunnel, &launcher, &reporter)
            .run("myapp", "root@203.0.113.7");

        // The launch error survives even though closing the tunnel failed,
        // and the unroute release still ran after the failed close.
        assert!(matches!(result, Err(ObserverError::Launch(_))));
        assert_eq!(tunnel.close_calls.get(), 1);
        assert_eq!(router.unroute_calls.get(), 1);
        assert_eq!(reporter.reports.get(), 1);
    }
}
