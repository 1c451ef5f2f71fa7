// Path and File Name : /home/netsnare/rebuild/core/trap/src/engine.rs
// Author: Qv9Xw2LpTzK4dRmY7cHgUeB1nJf8oAiS5kWxZ3tMqD0
// Details of functionality of this file: Trap session engine - decoy socket terminates at the edge, state machine evaluated centrally

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use tracing::{debug, info};
use uuid::Uuid;

use netsnare_emulation::{connect_banner, step, EmulationState, Protocol};
use netsnare_recorder::{SessionHandle, SessionHistory};

/// Reply shape the edge relay writes back to its local socket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrapReply {
    pub output: String,
    pub closed: bool,
}

struct TrapSession {
    protocol: Protocol,
    state: EmulationState,
    handle: Arc<SessionHandle>,
    last_seen: Instant,
}

/// Active trap-session table over the shared emulators and history ring.
///
/// The caller is an unattended remote relay with no operator watching for
/// exceptions, so every lookup failure degrades to a generic closing reply
/// instead of an error.
pub struct TrapEngine {
    active: DashMap<Uuid, TrapSession>,
    history: Arc<SessionHistory>,
}

impl TrapEngine {
    /// Reply for unknown or expired session ids. Closing keeps the relay's
    /// socket loop from spinning on a dead session.
    const FALLBACK_OUTPUT: &'static str = "-ERR service unavailable\r\n";

    pub fn new(history: Arc<SessionHistory>) -> Self {
        Self {
            active: DashMap::new(),
            history,
        }
    }

    /// Allocate a trap session and return the connect-time banner. The
    /// banner (possibly empty, e.g. Redis-like) is the first OUTPUT frame.
    pub fn init(
        &self,
        protocol: Protocol,
        actor_id: Option<Uuid>,
        attacker_ip: Option<String>,
    ) -> (Uuid, String) {
        let attacker_ip = attacker_ip.unwrap_or_else(|| "unknown".to_string());
        let (banner, state) = connect_banner(protocol);

        let handle = self.history.open(protocol, attacker_ip, actor_id);
        handle.record_output(banner);

        let session_id = handle.id();
        self.active.insert(
            session_id,
            TrapSession {
                protocol,
                state,
                handle,
                last_seen: Instant::now(),
            },
        );
        info!("Trap session {} opened ({})", session_id, protocol);
        (session_id, banner.to_string())
    }

    /// Drive one input chunk through the session's state machine. The
    /// emulator's artificial delay is honored here so the relayed reply
    /// carries the same timing fidelity as a direct socket.
    pub async fn interact(&self, session_id: Uuid, input: &str) -> TrapReply {
        let (reply, handle) = {
            let mut entry = match self.active.get_mut(&session_id) {
                Some(entry) => entry,
                None => {
                    debug!("Interact on unknown trap session {}", session_id);
                    return TrapReply {
                        output: Self::FALLBACK_OUTPUT.to_string(),
                        closed: true,
                    };
                }
            };

            entry.last_seen = Instant::now();
            entry.handle.record_input(input);
            let reply = step(entry.protocol, entry.state, input);
            entry.state = reply.next;
            (reply, entry.handle.clone())
        };

        if reply.closed {
            // The completed session stays queryable in history.
            self.active.remove(&session_id);
        }

        if let Some(delay) = reply.delay {
            tokio::time::sleep(delay).await;
        }
        handle.record_output(&reply.output);
        if reply.closed {
            handle.close();
            info!("Trap session {} closed", session_id);
        }

        TrapReply {
            output: reply.output,
            closed: reply.closed,
        }
    }

    /// Evict sessions the relay abandoned. A Telnet-style machine never
    /// reaches a closing state on its own, so without this sweep the active
    /// table only grows. Evicted sessions stay queryable in history, marked
    /// closed; later interacts get the fallback reply.
    pub fn expire_idle(&self, idle: Duration) -> usize {
        let mut expired = Vec::new();
        self.active.retain(|id, session| {
            if session.last_seen.elapsed() > idle {
                expired.push((*id, session.handle.clone()));
                false
            } else {
                true
            }
        });
        for (id, handle) in &expired {
            handle.close();
            info!("Trap session {} expired after idle timeout", id);
        }
        expired.len()
    }

    pub fn active_sessions(&self) -> usize {
        self.active.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use netsnare_recorder::Direction;

    fn engine() -> TrapEngine {
        TrapEngine::new(Arc::new(SessionHistory::new(50)))
    }

    #[tokio::test]
    async fn test_telnet_trap_round_trip() {
        let engine = engine();
        let (session_id, output) = engine.init(Protocol::Telnet, None, None);
        assert_eq!(output, "\r\nUbuntu 20.04.6 LTS\r\nserver login: ");

        let reply = engine.interact(session_id, "root").await;
        assert_eq!(reply.output, "Password: ");
        assert!(!reply.closed);

        let started = std::time::Instant::now();
        let reply = engine.interact(session_id, "toor").await;
        assert_eq!(reply.output, "\r\nLogin incorrect\r\n\r\nserver login: ");
        assert!(!reply.closed);
        // The failed-login delay is honored on the tunneled path too.
        assert!(started.elapsed() >= std::time::Duration::from_millis(700));
    }

    #[tokio::test]
    async fn test_unknown_session_returns_fallback() {
        let engine = engine();
        let reply = engine.interact(Uuid::new_v4(), "USER admin").await;
        assert_eq!(reply.output, "-ERR service unavailable\r\n");
        assert!(reply.closed);
    }

    #[tokio::test]
    async fn test_expired_session_returns_fallback() {
        let engine = engine();
        let (session_id, _) = engine.init(Protocol::Redis, None, None);

        let reply = engine.interact(session_id, "QUIT").await;
        assert!(reply.closed);
        assert_eq!(engine.active_sessions(), 0);

        // Interacting again after closure degrades gracefully.
        let reply = engine.interact(session_id, "PING").await;
        assert_eq!(reply.output, "-ERR service unavailable\r\n");
        assert!(reply.closed);
    }

    #[tokio::test]
    async fn test_idle_session_is_expired_and_answers_fallback() {
        let history = Arc::new(SessionHistory::new(50));
        let engine = TrapEngine::new(history.clone());
        let (session_id, _) = engine.init(Protocol::Telnet, None, None);

        // A generous window keeps the fresh session alive.
        assert_eq!(engine.expire_idle(Duration::from_secs(300)), 0);
        assert_eq!(engine.active_sessions(), 1);

        // A zero window expires it immediately.
        assert_eq!(engine.expire_idle(Duration::ZERO), 1);
        assert_eq!(engine.active_sessions(), 0);

        let reply = engine.interact(session_id, "root").await;
        assert_eq!(reply.output, "-ERR service unavailable\r\n");
        assert!(reply.closed);

        // The abandoned session stays in history, marked closed.
        let sessions = history.list_recent();
        assert_eq!(sessions.len(), 1);
        assert!(sessions[0].closed);
    }

    #[tokio::test]
    async fn test_closed_session_remains_in_history() {
        let history = Arc::new(SessionHistory::new(50));
        let engine = TrapEngine::new(history.clone());
        let (session_id, _) = engine.init(Protocol::Ftp, None, Some("1.2.3.4".to_string()));

        engine.interact(session_id, "QUIT\r\n").await;

        let sessions = history.list_recent();
        assert_eq!(sessions.len(), 1);
        let session = &sessions[0];
        assert_eq!(session.id, session_id);
        assert!(session.closed);
        assert_eq!(session.attacker_ip, "1.2.3.4");
        // Banner out, QUIT in, goodbye out.
        assert_eq!(session.frames.len(), 3);
        assert_eq!(session.frames[2].direction, Direction::Output);
        assert_eq!(session.frames[2].data, "221 Goodbye.\r\n");
    }

    #[tokio::test]
    async fn test_redis_trap_has_empty_banner_frame() {
        let history = Arc::new(SessionHistory::new(50));
        let engine = TrapEngine::new(history.clone());
        let (_, output) = engine.init(Protocol::Redis, None, None);
        assert_eq!(output, "");

        let session = &history.list_recent()[0];
        assert_eq!(session.frames.len(), 1);
        assert_eq!(session.frames[0].data, "");
    }
}
