//! Symmetric rendezvous: two processes, one port, no arbiter.
//!
//! Both sides run the same [`Rendezvous::negotiate`]. Each tries to bind
//! the shared port:
//!
//! ```text
//!  bind ok ──► race { accept (wins ties) | connect-with-retry (dialer only) }
//!    │              accept  ──► Host
//!    │              connect ──► Peer
//!    └ AddrInUse ──► connect-with-retry ──► Peer
//!    └ other     ──► NoughtsError::Bind
//! ```
//!
//! A bound side never connects out to an address this machine owns
//! (loopback, or any local interface), since it would only reach its own
//! listener. When the target is another machine, both sides may bind;
//! only the side with the lower address dials, the other just listens,
//! so the two never end up accepting each other's connections. The
//! losing branch of the race is dropped, which closes any socket it had
//! opened.

use std::io;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, UdpSocket};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, info};

use crate::error::NoughtsError;
use crate::message::Role;
use crate::network::channel::MoveChannel;

/// Lowest port accepted for a rendezvous by convention.
pub const MIN_PORT: u16 = 5000;

// ── RendezvousConfig ─────────────────────────────────────────────

/// Tunables for [`Rendezvous`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RendezvousConfig {
    /// Local interface to bind the shared port on.
    pub bind_ip: IpAddr,
    /// Pause between refused connect attempts, in milliseconds.
    pub retry_interval_ms: u64,
    /// Per-attempt connect timeout, in milliseconds.
    pub connect_timeout_ms: u64,
    /// Overall deadline for the whole negotiation. `None` waits forever.
    pub deadline_ms: Option<u64>,
}

impl Default for RendezvousConfig {
    fn default() -> Self {
        Self {
            bind_ip: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            retry_interval_ms: 1000,
            connect_timeout_ms: 1000,
            deadline_ms: None,
        }
    }
}

impl RendezvousConfig {
    pub fn retry_interval(&self) -> Duration {
        Duration::from_millis(self.retry_interval_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn deadline(&self) -> Option<Duration> {
        self.deadline_ms.map(Duration::from_millis)
    }
}

// ── Rendezvous ───────────────────────────────────────────────────

/// Negotiates a connected channel and a role against one target.
#[derive(Debug, Clone)]
pub struct Rendezvous {
    target: SocketAddr,
    config: RendezvousConfig,
    /// Skip the locality check; lets two loopback addresses stand in for
    /// two machines.
    assume_remote: bool,
}

impl Rendezvous {
    /// Rendezvous with an already-resolved target.
    pub fn new(target: SocketAddr, config: RendezvousConfig) -> Self {
        Self {
            target,
            config,
            assume_remote: false,
        }
    }

    #[cfg(test)]
    fn assuming_remote_target(mut self) -> Self {
        self.assume_remote = true;
        self
    }

    /// Resolve `host:port` and build a negotiator for it.
    ///
    /// Fails with [`NoughtsError::InvalidPort`] for ports below
    /// [`MIN_PORT`] and [`NoughtsError::InvalidAddress`] when the host
    /// does not resolve.
    pub async fn resolve(
        host: &str,
        port: u16,
        config: RendezvousConfig,
    ) -> Result<Self, NoughtsError> {
        if port < MIN_PORT {
            return Err(NoughtsError::InvalidPort {
                port,
                min: MIN_PORT,
            });
        }
        let addrs: Vec<SocketAddr> = tokio::net::lookup_host((host, port))
            .await
            .map_err(|e| NoughtsError::InvalidAddress(format!("{host}: {e}")))?
            .collect();
        // Prefer the bind address family so "localhost" does not resolve
        // to ::1 while the counterpart listens on 0.0.0.0.
        let target = addrs
            .iter()
            .find(|a| a.is_ipv4() == config.bind_ip.is_ipv4())
            .or_else(|| addrs.first())
            .copied()
            .ok_or_else(|| NoughtsError::InvalidAddress(format!("{host}: no addresses")))?;
        Ok(Self::new(target, config))
    }

    /// The local address the shared port is bound on.
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.config.bind_ip, self.target.port())
    }

    /// Returns `true` when the target lives on this machine: a loopback
    /// address, or one bound to a local interface.
    pub fn target_is_local(&self) -> bool {
        let ip = self.target.ip();
        ip.is_loopback() || ip.is_unspecified() || owns_address(ip)
    }

    /// Whether the bound side races a connect against its accept.
    ///
    /// Never for a local target. For a remote one, only the side whose
    /// own address sorts lower dials; the higher one waits to be dialled.
    fn dials_out(&self) -> bool {
        if !self.assume_remote && self.target_is_local() {
            return false;
        }
        match self.local_ip() {
            Some(own) => own < self.target.ip(),
            None => true,
        }
    }

    /// The address the counterpart sees us as.
    fn local_ip(&self) -> Option<IpAddr> {
        if self.config.bind_ip.is_unspecified() {
            route_source(self.target)
        } else {
            Some(self.config.bind_ip)
        }
    }

    /// Run the negotiation to completion, honouring the configured
    /// deadline if there is one.
    pub async fn negotiate(&self) -> Result<(MoveChannel, Role), NoughtsError> {
        match self.config.deadline() {
            Some(deadline) => tokio::time::timeout(deadline, self.negotiate_unbounded())
                .await
                .map_err(|_| NoughtsError::Timeout(deadline))?,
            None => self.negotiate_unbounded().await,
        }
    }

    async fn negotiate_unbounded(&self) -> Result<(MoveChannel, Role), NoughtsError> {
        let bind_addr = self.bind_addr();
        info!("binding {bind_addr} for rendezvous with {}", self.target);

        let (stream, role) = match TcpListener::bind(bind_addr).await {
            Ok(listener) => self.race(listener).await?,
            Err(e) if e.kind() == io::ErrorKind::AddrInUse => {
                info!("port {} already bound here; connecting out only", bind_addr.port());
                (self.connect_with_retry().await, Role::Peer)
            }
            Err(source) => {
                return Err(NoughtsError::Bind {
                    addr: bind_addr,
                    source,
                });
            }
        };

        stream.set_nodelay(true)?;
        info!(
            "connected to {} as {role} ({})",
            stream.peer_addr()?,
            role.legacy_name()
        );
        Ok((MoveChannel::new(stream), role))
    }

    /// Accept and connect concurrently; accept wins a tie.
    async fn race(&self, listener: TcpListener) -> Result<(TcpStream, Role), NoughtsError> {
        let connect_out = self.dials_out();
        if connect_out {
            debug!("racing accept against connect to {}", self.target);
        } else {
            debug!("waiting for {} to connect", self.target);
        }

        let connect = self.connect_with_retry();
        tokio::pin!(connect);

        tokio::select! {
            biased;
            accepted = listener.accept() => {
                let (stream, from) = accepted.map_err(NoughtsError::Accept)?;
                debug!("accepted inbound connection from {from}");
                Ok((stream, Role::Host))
            }
            stream = &mut connect, if connect_out => Ok((stream, Role::Peer)),
        }
    }

    /// Keep connecting to the target until an attempt succeeds.
    ///
    /// Refusals and per-attempt timeouts are expected while the
    /// counterpart is not up yet; they are logged and retried.
    async fn connect_with_retry(&self) -> TcpStream {
        let mut attempt: u64 = 0;
        loop {
            attempt += 1;
            match tokio::time::timeout(
                self.config.connect_timeout(),
                TcpStream::connect(self.target),
            )
            .await
            {
                Ok(Ok(stream)) => {
                    debug!("connect attempt {attempt} to {} succeeded", self.target);
                    return stream;
                }
                Ok(Err(e)) => debug!("connect attempt {attempt} to {}: {e}", self.target),
                Err(_) => debug!("connect attempt {attempt} to {} timed out", self.target),
            }
            tokio::time::sleep(self.config.retry_interval()).await;
        }
    }
}

/// Returns `true` if `ip` is assigned to an interface of this machine.
fn owns_address(ip: IpAddr) -> bool {
    std::net::TcpListener::bind(SocketAddr::new(ip, 0)).is_ok()
}

/// Local address the kernel would use to reach `target`. A UDP
/// `connect` only selects a route; nothing is sent.
fn route_source(target: SocketAddr) -> Option<IpAddr> {
    let any = match target {
        SocketAddr::V4(_) => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
        SocketAddr::V6(_) => IpAddr::V6(Ipv6Addr::UNSPECIFIED),
    };
    let socket = UdpSocket::bind(SocketAddr::new(any, 0)).ok()?;
    socket.connect(target).ok()?;
    socket.local_addr().ok().map(|addr| addr.ip())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Move;

    fn fast_config() -> RendezvousConfig {
        RendezvousConfig {
            bind_ip: IpAddr::V4(Ipv4Addr::LOCALHOST),
            retry_interval_ms: 20,
            connect_timeout_ms: 200,
            deadline_ms: Some(5_000),
        }
    }

    #[test]
    fn default_config_polls_every_second() {
        let cfg = RendezvousConfig::default();
        assert_eq!(cfg.retry_interval(), Duration::from_secs(1));
        assert!(cfg.deadline().is_none());
        assert!(cfg.bind_ip.is_unspecified());
    }

    #[tokio::test]
    async fn resolve_rejects_low_port() {
        let err = Rendezvous::resolve("localhost", 80, fast_config())
            .await
            .unwrap_err();
        assert!(matches!(err, NoughtsError::InvalidPort { port: 80, .. }));
    }

    #[tokio::test]
    async fn resolve_localhost_is_local() {
        let rv = Rendezvous::resolve("127.0.0.1", 5001, fast_config())
            .await
            .unwrap();
        assert!(rv.target_is_local());
        assert_eq!(rv.bind_addr().port(), 5001);
    }

    #[test]
    fn remote_target_is_not_local() {
        let rv = Rendezvous::new("192.0.2.10:5001".parse().unwrap(), fast_config());
        assert!(!rv.target_is_local());
    }

    #[test]
    fn own_interface_address_is_local() {
        // The address used to reach the outside world belongs to us.
        let Some(own) = route_source("192.0.2.10:9".parse().unwrap()) else {
            return;
        };
        let mut cfg = fast_config();
        cfg.bind_ip = IpAddr::V4(Ipv4Addr::UNSPECIFIED);
        let rv = Rendezvous::new(SocketAddr::new(own, 5001), cfg);
        assert!(rv.target_is_local());
        assert!(!rv.dials_out());
    }

    #[test]
    fn only_the_lower_address_dials() {
        let mut low = fast_config();
        low.bind_ip = IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1));
        let mut high = fast_config();
        high.bind_ip = IpAddr::V4(Ipv4Addr::new(127, 0, 0, 2));

        let a = Rendezvous::new("127.0.0.2:5001".parse().unwrap(), low).assuming_remote_target();
        let b = Rendezvous::new("127.0.0.1:5001".parse().unwrap(), high).assuming_remote_target();
        assert!(a.dials_out());
        assert!(!b.dials_out());

        // Without the override both are on this machine: nobody dials.
        let local = Rendezvous::new("127.0.0.1:5001".parse().unwrap(), fast_config());
        assert!(!local.dials_out());
    }

    #[tokio::test]
    async fn both_bound_sides_pair_up() {
        let port = {
            let l = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            l.local_addr().unwrap().port()
        };
        let mut cfg_a = fast_config();
        cfg_a.bind_ip = IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1));
        let mut cfg_b = fast_config();
        cfg_b.bind_ip = IpAddr::V4(Ipv4Addr::new(127, 0, 0, 2));

        // Each binds its own address and targets the other's, as two
        // machines would.
        let a = Rendezvous::new(SocketAddr::from(([127, 0, 0, 2], port)), cfg_a)
            .assuming_remote_target();
        let b = Rendezvous::new(SocketAddr::from(([127, 0, 0, 1], port)), cfg_b)
            .assuming_remote_target();

        let (ra, rb) = tokio::join!(a.negotiate(), b.negotiate());
        let (mut chan_a, role_a) = ra.unwrap();
        let (mut chan_b, role_b) = rb.unwrap();
        assert_eq!(role_a, Role::Peer);
        assert_eq!(role_b, Role::Host);

        chan_a.send(Move::new(4).unwrap()).await.unwrap();
        assert_eq!(chan_b.receive().await.unwrap().cell(), 4);
        chan_b.send(Move::new(0).unwrap()).await.unwrap();
        assert_eq!(chan_a.receive().await.unwrap().cell(), 0);
    }

    #[tokio::test]
    async fn lone_process_hits_deadline() {
        let port = {
            let l = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            l.local_addr().unwrap().port()
        };
        let mut cfg = fast_config();
        cfg.deadline_ms = Some(300);
        let rv = Rendezvous::new(SocketAddr::from(([127, 0, 0, 1], port)), cfg);

        // Binds, then waits for an inbound connection that never comes.
        let err = rv.negotiate().await.unwrap_err();
        assert!(matches!(err, NoughtsError::Timeout(_)));
        assert_eq!(err.phase(), crate::error::Phase::Rendezvous);
    }
}
