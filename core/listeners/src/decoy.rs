// Path and File Name : /home/netsnare/rebuild/core/listeners/src/decoy.rs
// Author: Qv9Xw2LpTzK4dRmY7cHgUeB1nJf8oAiS5kWxZ3tMqD0
// Details of functionality of this file: Direct-socket decoy listener - binds a fixed port, drives the protocol state machine per connection and records frames

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use netsnare_emulation::{connect_banner, step, Protocol};
use netsnare_recorder::SessionHistory;

/// Best-effort mapping of a connecting peer address to a fleet actor. When
/// traffic arrives via an edge relay this resolves the relaying actor, not
/// the true attacker.
pub trait ActorResolver: Send + Sync {
    fn resolve(&self, ip: &str) -> Option<Uuid>;
}

impl ActorResolver for netsnare_fleet::FleetRegistry {
    fn resolve(&self, ip: &str) -> Option<Uuid> {
        self.resolve_by_ip(ip)
    }
}

/// One decoy listener per protocol on a fixed port.
pub struct DecoyListener {
    protocol: Protocol,
    addr: SocketAddr,
    history: Arc<SessionHistory>,
    resolver: Arc<dyn ActorResolver>,
    idle_timeout: Duration,
}

/// A successfully bound decoy, ready to serve.
pub struct BoundDecoy {
    protocol: Protocol,
    listener: TcpListener,
    history: Arc<SessionHistory>,
    resolver: Arc<dyn ActorResolver>,
    idle_timeout: Duration,
}

impl DecoyListener {
    pub fn new(
        protocol: Protocol,
        addr: SocketAddr,
        history: Arc<SessionHistory>,
        resolver: Arc<dyn ActorResolver>,
        idle_timeout: Duration,
    ) -> Self {
        Self {
            protocol,
            addr,
            history,
            resolver,
            idle_timeout,
        }
    }

    pub async fn bind(self) -> std::io::Result<BoundDecoy> {
        let listener = TcpListener::bind(self.addr).await?;
        info!(
            "{} decoy listening on {}",
            self.protocol,
            listener.local_addr()?
        );
        Ok(BoundDecoy {
            protocol: self.protocol,
            listener,
            history: self.history,
            resolver: self.resolver,
            idle_timeout: self.idle_timeout,
        })
    }

    /// Bind and serve in the background. A port already occupied costs this
    /// one listener, never the process.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            let protocol = self.protocol;
            let addr = self.addr;
            match self.bind().await {
                Ok(bound) => bound.serve().await,
                Err(e) => {
                    error!(
                        "Failed to bind {} decoy on {}: {} - continuing without this listener",
                        protocol, addr, e
                    );
                }
            }
        })
    }
}

impl BoundDecoy {
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub async fn serve(self) {
        loop {
            match self.listener.accept().await {
                Ok((stream, peer)) => {
                    let protocol = self.protocol;
                    let history = self.history.clone();
                    let resolver = self.resolver.clone();
                    let idle_timeout = self.idle_timeout;
                    tokio::spawn(async move {
                        handle_connection(protocol, stream, peer, history, resolver, idle_timeout)
                            .await;
                    });
                }
                Err(e) => {
                    warn!("{} decoy accept failed: {}", self.protocol, e);
                }
            }
        }
    }
}

async fn handle_connection(
    protocol: Protocol,
    mut stream: TcpStream,
    peer: SocketAddr,
    history: Arc<SessionHistory>,
    resolver: Arc<dyn ActorResolver>,
    idle_timeout: Duration,
) {
    let attacker_ip = peer.ip().to_string();
    let actor_id = resolver.resolve(&attacker_ip);
    let session = history.open(protocol, attacker_ip.clone(), actor_id);
    debug!(
        "{} decoy connection from {} (session {})",
        protocol,
        peer,
        session.id()
    );

    let (banner, mut state) = connect_banner(protocol);
    if !banner.is_empty() {
        if stream.write_all(banner.as_bytes()).await.is_err() {
            session.close();
            return;
        }
        session.record_output(banner);
    }

    let mut buf = [0u8; 2048];
    loop {
        let read = tokio::time::timeout(idle_timeout, stream.read(&mut buf)).await;
        let n = match read {
            Err(_) => {
                debug!("Session {} idle-closed", session.id());
                break;
            }
            Ok(Err(_)) | Ok(Ok(0)) => break,
            Ok(Ok(n)) => n,
        };

        let input = String::from_utf8_lossy(&buf[..n]).to_string();
        session.record_input(&input);

        let reply = step(protocol, state, &input);
        state = reply.next;

        // Scheduled send: the sleep lives in this connection's task only and
        // dies with it, so other connections are never held up.
        if let Some(delay) = reply.delay {
            tokio::time::sleep(delay).await;
        }
        if stream.write_all(reply.output.as_bytes()).await.is_err() {
            break;
        }
        session.record_output(&reply.output);

        if reply.closed {
            break;
        }
    }

    session.close();
    debug!("Session {} closed", session.id());
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::time::Instant;

    use tokio::io::AsyncReadExt;

    use netsnare_recorder::Direction;

    struct NoResolver;

    impl ActorResolver for NoResolver {
        fn resolve(&self, _ip: &str) -> Option<Uuid> {
            None
        }
    }

    async fn start(
        protocol: Protocol,
        history: Arc<SessionHistory>,
    ) -> (SocketAddr, JoinHandle<()>) {
        let listener = DecoyListener::new(
            protocol,
            "127.0.0.1:0".parse().unwrap(),
            history,
            Arc::new(NoResolver),
            Duration::from_secs(5),
        );
        let bound = listener.bind().await.unwrap();
        let addr = bound.local_addr().unwrap();
        let task = tokio::spawn(bound.serve());
        (addr, task)
    }

    async fn read_reply(stream: &mut TcpStream) -> String {
        let mut buf = [0u8; 1024];
        let n = stream.read(&mut buf).await.unwrap();
        String::from_utf8_lossy(&buf[..n]).to_string()
    }

    #[tokio::test]
    async fn test_ftp_decoy_full_session() {
        let history = Arc::new(SessionHistory::new(50));
        let (addr, server) = start(Protocol::Ftp, history.clone()).await;

        let mut stream = TcpStream::connect(addr).await.unwrap();
        assert_eq!(read_reply(&mut stream).await, "220 (vsFTPd 2.3.4)\r\n");

        stream.write_all(b"USER admin\r\n").await.unwrap();
        assert_eq!(
            read_reply(&mut stream).await,
            "331 Please specify the password.\r\n"
        );

        let started = Instant::now();
        stream.write_all(b"PASS admin\r\n").await.unwrap();
        assert_eq!(read_reply(&mut stream).await, "530 Login incorrect.\r\n");
        assert!(started.elapsed() >= Duration::from_millis(400));

        stream.write_all(b"QUIT\r\n").await.unwrap();
        assert_eq!(read_reply(&mut stream).await, "221 Goodbye.\r\n");

        // Server closes the socket after QUIT.
        let mut buf = [0u8; 16];
        assert_eq!(stream.read(&mut buf).await.unwrap(), 0);

        // Give the connection task a beat to seal the session.
        tokio::time::sleep(Duration::from_millis(50)).await;

        let sessions = history.list_recent();
        assert_eq!(sessions.len(), 1);
        let session = &sessions[0];
        assert!(session.closed);
        assert_eq!(session.frames.len(), 7);
        assert_eq!(session.frames[0].direction, Direction::Output);
        assert_eq!(session.frames[0].data, "220 (vsFTPd 2.3.4)\r\n");
        assert_eq!(session.frames[6].data, "221 Goodbye.\r\n");

        server.abort();
    }

    #[tokio::test]
    async fn test_redis_decoy_sends_no_banner() {
        let history = Arc::new(SessionHistory::new(50));
        let (addr, server) = start(Protocol::Redis, history.clone()).await;

        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream.write_all(b"CONFIG GET dir\r\n").await.unwrap();
        assert_eq!(
            read_reply(&mut stream).await,
            "-NOAUTH Authentication required.\r\n"
        );

        stream.write_all(b"QUIT\r\n").await.unwrap();
        assert_eq!(read_reply(&mut stream).await, "+OK\r\n");

        tokio::time::sleep(Duration::from_millis(50)).await;
        let session = &history.list_recent()[0];
        // No banner frame for the silent Redis-like decoy.
        assert_eq!(session.frames[0].direction, Direction::Input);
        assert_eq!(session.frames.len(), 4);

        server.abort();
    }

    #[tokio::test]
    async fn test_bind_conflict_is_not_fatal() {
        let history = Arc::new(SessionHistory::new(50));
        let (addr, server) = start(Protocol::Ftp, history.clone()).await;

        // Second decoy on the occupied port: spawn must swallow the failure.
        let conflicting = DecoyListener::new(
            Protocol::Ftp,
            addr,
            history,
            Arc::new(NoResolver),
            Duration::from_secs(5),
        );
        conflicting.spawn().await.unwrap();

        server.abort();
    }

    #[tokio::test]
    async fn test_concurrent_connections_are_independent() {
        let history = Arc::new(SessionHistory::new(50));
        let (addr, server) = start(Protocol::Telnet, history.clone()).await;

        let mut a = TcpStream::connect(addr).await.unwrap();
        let mut b = TcpStream::connect(addr).await.unwrap();
        read_reply(&mut a).await;
        read_reply(&mut b).await;

        // Put A into its delayed failed-login reply, then drive B; B must
        // answer immediately while A is still sleeping.
        a.write_all(b"root").await.unwrap();
        read_reply(&mut a).await;
        a.write_all(b"toor").await.unwrap();

        let started = Instant::now();
        b.write_all(b"admin").await.unwrap();
        assert_eq!(read_reply(&mut b).await, "Password: ");
        assert!(started.elapsed() < Duration::from_millis(500));

        assert_eq!(read_reply(&mut a).await, "\r\nLogin incorrect\r\n\r\nserver login: ");
        assert_eq!(history.len(), 2);

        server.abort();
    }
}
