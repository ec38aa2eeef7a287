//! Visitor session store
//!
//! One [`VisitorSession`] stands for one browser session: its own access
//! record, route progress, chat conversation, open camera scans, and active
//! language. Sessions never share state. A session ends when the visitor
//! deletes it or when it sits idle past the configured timeout.

use chrono::Utc;
use mcn_common::access::AccessGate;
use mcn_common::chat::ChatConversation;
use mcn_common::events::{EventBus, McnEvent};
use mcn_common::messages;
use mcn_common::progress::{MarkSeen, RouteCompleted, RouteProgressTracker};
use mcn_common::scan::{CameraLease, ScanSession};
use mcn_common::{ArtworkId, Catalog, Language, RouteId};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info};
use uuid::Uuid;

/// Session handle shared between concurrent requests
pub type SharedSession = Arc<Mutex<VisitorSession>>;

/// Camera scans a session may hold open at once; opening one more closes
/// the oldest
pub const MAX_OPEN_SCANS: usize = 4;

/// Camera held on behalf of a browser
///
/// Releasing it tells the client, over the session's event stream, to stop
/// its video stream.
#[derive(Debug)]
pub struct ClientCamera {
    session_id: Uuid,
    scan_id: Uuid,
    events: EventBus,
}

impl CameraLease for ClientCamera {
    fn release(&mut self) {
        debug!(session_id = %self.session_id, scan_id = %self.scan_id, "Camera released");
        self.events.emit_lossy(McnEvent::CameraReleased {
            session_id: self.session_id,
            scan_id: self.scan_id,
            timestamp: Utc::now(),
        });
    }
}

/// State of one visitor
pub struct VisitorSession {
    id: Uuid,
    pub language: Language,
    pub gate: AccessGate,
    pub tracker: RouteProgressTracker,
    pub chat: ChatConversation,
    pub scans: HashMap<Uuid, ScanSession<ClientCamera>>,
    /// Scan ids, oldest first
    scan_order: VecDeque<Uuid>,
    completions: Arc<std::sync::Mutex<Vec<RouteCompleted>>>,
    events: EventBus,
}

impl VisitorSession {
    fn new(id: Uuid, catalog: Arc<Catalog>, language: Language, events: EventBus) -> Self {
        let completions: Arc<std::sync::Mutex<Vec<RouteCompleted>>> = Arc::default();
        let mut tracker = RouteProgressTracker::new(catalog.clone());
        let inbox = completions.clone();
        tracker.subscribe(Arc::new(move |notice: &RouteCompleted| {
            if let Ok(mut pending) = inbox.lock() {
                pending.push(notice.clone());
            }
        }));

        Self {
            id,
            language,
            gate: AccessGate::new(catalog),
            tracker,
            chat: ChatConversation::new(language),
            scans: HashMap::new(),
            scan_order: VecDeque::new(),
            completions,
            events,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Mark an artwork seen and publish any first-time completion
    ///
    /// Returns the outcome and, when this mark completed the route for the
    /// first time in the session, the localized acknowledgment.
    pub fn mark_seen(
        &mut self,
        route_id: &RouteId,
        artwork_id: &ArtworkId,
    ) -> (MarkSeen, Option<String>) {
        let outcome = self.tracker.mark_seen(route_id, artwork_id);

        let notices: Vec<RouteCompleted> = match self.completions.lock() {
            Ok(mut pending) => pending.drain(..).collect(),
            Err(_) => Vec::new(),
        };

        let mut acknowledgment = None;
        for notice in notices {
            let message = messages::route_completed(self.language).to_string();
            info!(session_id = %self.id, route_id = %notice.route_id, "Route completion published");
            self.events.emit_lossy(McnEvent::RouteCompleted {
                session_id: self.id,
                route_id: notice.route_id.clone(),
                message: message.clone(),
                timestamp: notice.completed_at,
            });
            acknowledgment = Some(message);
        }

        (outcome, acknowledgment)
    }

    /// Publish that an artwork is unlocked for this session
    pub fn announce_access(&self, artwork_id: &ArtworkId) {
        self.events.emit_lossy(McnEvent::AccessGranted {
            session_id: self.id,
            artwork_id: artwork_id.clone(),
            timestamp: Utc::now(),
        });
    }

    /// Start a camera scan; the returned id addresses it in later requests
    ///
    /// Scans that already ended are forgotten here, so an accepted scan
    /// keeps answering `ignored` to late frames until the next one opens.
    pub fn open_scan(&mut self) -> Uuid {
        self.scans.retain(|_, scan| scan.is_scanning());
        let scans = &self.scans;
        self.scan_order.retain(|id| scans.contains_key(id));
        while self.scan_order.len() >= MAX_OPEN_SCANS {
            let Some(oldest) = self.scan_order.pop_front() else {
                break;
            };
            debug!(session_id = %self.id, scan_id = %oldest, "Closing oldest open scan");
            self.close_scan(&oldest);
        }

        let scan_id = Uuid::new_v4();
        let camera = ClientCamera {
            session_id: self.id,
            scan_id,
            events: self.events.clone(),
        };
        self.scans.insert(scan_id, ScanSession::open(scan_id, camera));
        self.scan_order.push_back(scan_id);
        scan_id
    }

    /// Close and forget a scan; returns false if it was unknown
    pub fn close_scan(&mut self, scan_id: &Uuid) -> bool {
        self.scan_order.retain(|id| id != scan_id);
        match self.scans.remove(scan_id) {
            Some(mut scan) => {
                scan.close();
                true
            }
            None => false,
        }
    }
}

impl std::fmt::Debug for VisitorSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VisitorSession")
            .field("id", &self.id)
            .field("language", &self.language)
            .field("granted", &self.gate.record().len())
            .field("scans", &self.scans.len())
            .finish()
    }
}

struct SessionEntry {
    session: SharedSession,
    last_seen: Instant,
}

/// All live visitor sessions
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, SessionEntry>>>,
    catalog: Arc<Catalog>,
    events: EventBus,
    idle_timeout: Duration,
}

impl SessionStore {
    pub fn new(catalog: Arc<Catalog>, events: EventBus, idle_timeout: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            catalog,
            events,
            idle_timeout,
        }
    }

    /// Create a session with an empty access record
    pub async fn create(&self, language: Language) -> (Uuid, SharedSession) {
        let id = Uuid::new_v4();
        let session = Arc::new(Mutex::new(VisitorSession::new(
            id,
            self.catalog.clone(),
            language,
            self.events.clone(),
        )));

        self.sessions.write().await.insert(
            id,
            SessionEntry {
                session: session.clone(),
                last_seen: Instant::now(),
            },
        );
        info!(session_id = %id, language = %language, "Visitor session created");
        (id, session)
    }

    /// Look up a session and mark it active
    pub async fn get(&self, id: &Uuid) -> Option<SharedSession> {
        let mut sessions = self.sessions.write().await;
        let entry = sessions.get_mut(id)?;
        entry.last_seen = Instant::now();
        Some(entry.session.clone())
    }

    /// End a session; open scans release their cameras
    pub async fn remove(&self, id: &Uuid) -> bool {
        let removed = self.sessions.write().await.remove(id).is_some();
        if removed {
            info!(session_id = %id, "Visitor session ended");
            self.announce_end(*id);
        }
        removed
    }

    /// Drop sessions idle for at least the timeout; returns how many
    pub async fn evict_idle(&self) -> usize {
        let mut sessions = self.sessions.write().await;
        let timeout = self.idle_timeout;
        let expired: Vec<Uuid> = sessions
            .iter()
            .filter(|(_, entry)| entry.last_seen.elapsed() >= timeout)
            .map(|(id, _)| *id)
            .collect();
        for id in &expired {
            sessions.remove(id);
            self.announce_end(*id);
        }
        if !expired.is_empty() {
            info!(
                evicted = expired.len(),
                remaining = sessions.len(),
                "Evicted idle visitor sessions"
            );
        }
        expired.len()
    }

    /// True if the session is live; does not count as activity
    pub async fn contains(&self, id: &Uuid) -> bool {
        self.sessions.read().await.contains_key(id)
    }

    fn announce_end(&self, session_id: Uuid) {
        self.events.emit_lossy(McnEvent::SessionEnded {
            session_id,
            timestamp: Utc::now(),
        });
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    /// Run [`SessionStore::evict_idle`] every `interval`
    pub fn spawn_sweeper(&self, interval: Duration) -> JoinHandle<()> {
        let store = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                store.evict_idle().await;
            }
        })
    }
}
