//! sky-observer: the remote observer session
//!
//! Attaching a local Erlang `observer` GUI to a production node takes four
//! steps, each with real state and cleanup obligations:
//!
//! 1. **Discovery** — read the node's cookie, pod IP, and the epmd/app ports
//!    over SSH ([`facts`]).
//! 2. **Routing** — rewrite local NAT/loopback rules so traffic to the pod IP
//!    resolves to localhost ([`router`]).
//! 3. **Tunnel** — forward the epmd and app ports over a detached SSH process
//!    ([`tunnel`]).
//! 4. **Launch** — run `erl -run observer` against the tunneled node, then
//!    tear everything down regardless of how the launch ended ([`session`]).
//!
//! Routing and tunnel state are host-global; the session guarantees both are
//! released on every exit path short of SIGKILL.

pub mod facts;
pub mod remote;
pub mod router;
pub mod session;
pub mod tunnel;

pub use facts::{discover, NodeFacts};
pub use remote::{Remote, SshRemote};
pub use router::{detect_platform, Platform, Router};
pub use session::{ErlLauncher, Launcher, ObserverSession};
pub use tunnel::{SshTunnel, Tunnel};

/// Well-known port of the Erlang port mapper daemon
pub const EPMD_PORT: u16 = 4369;
