// Path and File Name : /home/netsnare/rebuild/core/recorder/src/history.rs
// Author: Qv9Xw2LpTzK4dRmY7cHgUeB1nJf8oAiS5kWxZ3tMqD0
// Details of functionality of this file: Bounded session history ring - atomic insertion/eviction shared by all decoy emulators

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;
use uuid::Uuid;

use netsnare_emulation::Protocol;

use crate::session::{SessionHandle, SessionRecord};

/// Bounded, newest-first history of captured sessions. Eviction follows
/// insertion order, not closure order: a long-lived session can age out of
/// the ring while its connection is still being driven.
pub struct SessionHistory {
    capacity: usize,
    inner: RwLock<VecDeque<Arc<SessionHandle>>>,
}

impl SessionHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            inner: RwLock::new(VecDeque::new()),
        }
    }

    /// Open a new session and insert it into the ring in one step.
    pub fn open(
        &self,
        protocol: Protocol,
        attacker_ip: String,
        actor_id: Option<Uuid>,
    ) -> Arc<SessionHandle> {
        let handle = Arc::new(SessionHandle::new(protocol, attacker_ip, actor_id));
        self.append(handle.clone());
        handle
    }

    /// Insert an already-created session. Oldest entry is evicted under the
    /// same write lock, so concurrent accepts never lose or duplicate entries.
    pub fn append(&self, handle: Arc<SessionHandle>) {
        let mut ring = self.inner.write();
        ring.push_front(handle);
        while ring.len() > self.capacity {
            if let Some(evicted) = ring.pop_back() {
                debug!("Evicted session {} from history ring", evicted.id());
            }
        }
    }

    pub fn get(&self, id: Uuid) -> Option<Arc<SessionHandle>> {
        self.inner.read().iter().find(|h| h.id() == id).cloned()
    }

    /// Newest-first snapshots of every retained session.
    pub fn list_recent(&self) -> Vec<SessionRecord> {
        self.inner.read().iter().map(|h| h.snapshot()).collect()
    }

    pub fn remove(&self, id: Uuid) -> bool {
        let mut ring = self.inner.write();
        let before = ring.len();
        ring.retain(|h| h.id() != id);
        ring.len() < before
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }
}
